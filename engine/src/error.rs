//! Error types for compiling, parsing and dispatching.
//!
//! The engine separates four failure families:
//!
//! - [`ConfigError`] — the handler graph cannot be turned into a parser.
//!   A programmer error, reported when the engine is built.
//! - [`ParseFailure`] — the command line does not match the parser, or help
//!   was requested. Printed with usage text; the process exits.
//! - [`DispatchError`] — resolving the parsed arguments against the handler
//!   graph failed, or a handler returned an error. Handler errors are carried
//!   unchanged.
//! - [`ArgumentError`] — a handler asked for an argument it did not declare,
//!   or with the wrong type.

use cmdspec_core::ValidationError;
use thiserror::Error;

/// Errors raised while adapting a handler graph or registering it with a
/// parser backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A handler or operation has no description to derive help from.
    #[error("missing documentation for '{0}': every handler and operation needs a description")]
    MissingDocumentation(String),

    /// The specification tree is structurally invalid.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// The parser backend refused a registration.
    #[error("parser backend rejected '{path}': {reason}")]
    Backend { path: String, reason: String },
}

/// Why parsing stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseFailureKind {
    /// `-h`/`--help` was given; not an error.
    Help,
    /// The command line did not match the parser.
    Usage,
    /// The parsed selection does not name a known command.
    InvalidSelection,
}

/// A terminal parse outcome: message plus usage, and an exit status.
///
/// Help requests exit with `0`, everything else with `1`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ParseFailure {
    kind: ParseFailureKind,
    message: String,
}

impl ParseFailure {
    pub fn help(message: impl Into<String>) -> Self {
        Self {
            kind: ParseFailureKind::Help,
            message: message.into(),
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self {
            kind: ParseFailureKind::Usage,
            message: message.into(),
        }
    }

    pub fn invalid_selection(message: impl Into<String>) -> Self {
        Self {
            kind: ParseFailureKind::InvalidSelection,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ParseFailureKind {
        self.kind
    }

    /// Rendered text, usage included.
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_help(&self) -> bool {
        self.kind == ParseFailureKind::Help
    }

    pub fn exit_code(&self) -> i32 {
        match self.kind {
            ParseFailureKind::Help => 0,
            ParseFailureKind::Usage | ParseFailureKind::InvalidSelection => 1,
        }
    }

    /// Prints the message (stdout for help, stderr otherwise) and exits.
    pub fn exit(&self) -> ! {
        let text = self.message.trim_end();
        if self.is_help() {
            println!("{text}");
        } else {
            eprintln!("{text}");
        }
        std::process::exit(self.exit_code())
    }
}

/// Errors raised while resolving a dispatch path.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The selection at a command level is absent or unknown.
    #[error(
        "invalid command selection under '{}': {}",
        .path.join(" "),
        .selection.as_deref().unwrap_or("<none>")
    )]
    InvalidSelection {
        /// Command names from the root to the level that failed.
        path: Vec<String>,
        selection: Option<String>,
    },

    /// The parsed arguments stop before the handler graph does.
    #[error("no parsed arguments for command depth {0}")]
    MissingScope(usize),

    /// A nested handler was handed a receiver of the wrong type.
    #[error("handler receiver is not a {expected}")]
    ReceiverMismatch { expected: &'static str },

    /// A constructor or operation failed; carried unchanged.
    #[error(transparent)]
    Handler(#[from] anyhow::Error),
}

/// Typed argument access failures inside handlers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentError {
    #[error("argument '{0}' was not declared")]
    Missing(String),

    #[error("argument '{name}' is {found}, expected {expected}")]
    WrongType {
        name: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// Errors while rendering a reported result.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Errors while loading engine configuration files.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Everything [`Engine::execute`](crate::Engine::execute) can fail with.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Help, a parse error, or an unknown selection; print and exit.
    #[error(transparent)]
    Usage(#[from] ParseFailure),

    /// Dispatch could not proceed for a reason other than user input.
    #[error(transparent)]
    Dispatch(DispatchError),

    /// The terminal result could not be rendered.
    #[error(transparent)]
    Report(#[from] ReportError),

    /// A handler failed; carried unchanged.
    #[error(transparent)]
    Handler(anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(ParseFailure::help("usage").exit_code(), 0);
        assert_eq!(ParseFailure::usage("bad flag").exit_code(), 1);
        assert_eq!(ParseFailure::invalid_selection("nope").exit_code(), 1);
    }

    #[test]
    fn test_invalid_selection_message() {
        let err = DispatchError::InvalidSelection {
            path: vec!["app".into(), "status".into()],
            selection: None,
        };
        assert_eq!(
            err.to_string(),
            "invalid command selection under 'app status': <none>"
        );
    }

    #[test]
    fn test_handler_error_keeps_identity() {
        #[derive(Debug, Error)]
        #[error("disk full")]
        struct DiskFull;

        let err = DispatchError::from(anyhow::Error::new(DiskFull));
        assert_eq!(err.to_string(), "disk full");
        let DispatchError::Handler(inner) = err else {
            panic!("expected handler error");
        };
        assert!(inner.downcast_ref::<DiskFull>().is_some());
    }
}
