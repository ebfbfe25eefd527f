//! The compile → parse → dispatch → report pipeline.

use cmdspec_core::SpecNode;
use tracing::debug;

use crate::adapter::{CommandModel, adapt};
use crate::backend::{ParserBackend, compile_parser};
use crate::clap_backend::ClapBackend;
use crate::dispatch::{Dispatcher, Outcome};
use crate::error::{ConfigError, DispatchError, EngineError, ParseFailure};
use crate::handler::Handler;
use crate::parsed::ParsedArguments;
use crate::report::{ReportOptions, render_result};

/// A finished run: the dispatch outcome and the rendered report, if any.
#[derive(Debug)]
pub struct Execution {
    pub outcome: Outcome,
    /// Rendered return value when reporting is enabled and there was one.
    pub report: Option<String>,
}

/// A compiled application.
///
/// # Examples
///
/// ```
/// use cmdspec_core::ValueType;
/// use cmdspec_engine::{Engine, Handler, HandlerMetadata, ReportOptions, ResultFormat};
///
/// struct Greeter { name: String }
///
/// let handler = Handler::root(
///     HandlerMetadata::new("greet", "Greet someone").param("name", ValueType::String),
///     |args| Ok(Greeter { name: args.string("name")? }),
/// )
/// .operation(HandlerMetadata::new("hello", "Say hello"), |g, _| {
///     Ok(Some(format!("hello {}", g.name).into()))
/// });
///
/// let engine = Engine::new(handler, ReportOptions::printing(ResultFormat::Json)).unwrap();
/// let run = engine.execute(["world", "hello"]).unwrap();
/// assert_eq!(run.report.as_deref(), Some("hello world"));
/// ```
pub struct Engine<B: ParserBackend = ClapBackend> {
    model: CommandModel,
    parser: B,
    report: ReportOptions,
}

impl Engine<ClapBackend> {
    /// Adapts `handler` and compiles it with the clap backend.
    pub fn new<T: 'static>(handler: Handler<T>, report: ReportOptions) -> Result<Self, ConfigError> {
        Self::with_backend(handler, report)
    }
}

impl<B: ParserBackend> Engine<B> {
    /// Adapts `handler` and compiles it with backend `B`.
    pub fn with_backend<T: 'static>(handler: Handler<T>, report: ReportOptions) -> Result<Self, ConfigError> {
        let model = adapt(handler)?;
        let parser = compile_parser::<B>(&model.spec)?;
        debug!(command = %model.spec.name, "engine ready");
        Ok(Self {
            model,
            parser,
            report,
        })
    }

    pub fn spec(&self) -> &SpecNode {
        &self.model.spec
    }

    pub fn model(&self) -> &CommandModel {
        &self.model
    }

    pub fn parser(&self) -> &B {
        &self.parser
    }

    pub fn report_options(&self) -> &ReportOptions {
        &self.report
    }

    pub fn parse(&self, argv: &[String]) -> Result<ParsedArguments, ParseFailure> {
        self.parser.parse(argv)
    }

    pub fn dispatch(&self, parsed: &ParsedArguments) -> Result<Outcome, DispatchError> {
        Dispatcher::new(&self.model).dispatch(parsed)
    }

    /// Parses `argv` (program name excluded), dispatches, and renders the
    /// result.
    ///
    /// Unknown or missing selections come back as [`EngineError::Usage`] with
    /// the usage of the level where resolution stopped, just like parse
    /// errors.
    pub fn execute<I, S>(&self, argv: I) -> Result<Execution, EngineError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let argv: Vec<String> = argv.into_iter().map(Into::into).collect();
        let parsed = self.parse(&argv)?;

        let outcome = self.dispatch(&parsed).map_err(|err| match err {
            DispatchError::InvalidSelection { path, selection } => {
                let message = match selection {
                    Some(s) => format!("error: unrecognized command '{s}'"),
                    None => "error: a command is required".to_string(),
                };
                let usage = self.parser.usage(&path);
                EngineError::Usage(ParseFailure::invalid_selection(format!("{message}\n\n{usage}")))
            }
            DispatchError::Handler(err) => EngineError::Handler(err),
            other => EngineError::Dispatch(other),
        })?;

        let report = match (&outcome.output, self.report.print_return) {
            (Some(value), true) => render_result(value, self.report.format)?,
            _ => None,
        };
        Ok(Execution { outcome, report })
    }

    /// Runs `argv` to completion as a process would.
    ///
    /// Prints the report to stdout. Help exits with `0`; parse and selection
    /// errors print usage and exit with `1`. Handler errors are returned
    /// untouched.
    pub fn run_from<I, S>(&self, argv: I) -> anyhow::Result<Outcome>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        match self.execute(argv) {
            Ok(execution) => {
                if let Some(report) = &execution.report {
                    println!("{report}");
                }
                Ok(execution.outcome)
            }
            Err(EngineError::Usage(failure)) => failure.exit(),
            Err(EngineError::Handler(err)) => Err(err),
            Err(other) => Err(other.into()),
        }
    }

    /// [`run_from`](Self::run_from) with the process arguments.
    pub fn run(&self) -> anyhow::Result<Outcome> {
        self.run_from(std::env::args().skip(1))
    }
}
