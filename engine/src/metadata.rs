//! Handler metadata: names, parameter lists and documentation directives.
//!
//! A handler describes itself through [`MetadataProvider`]. The description is
//! free text in which lines starting with `:` are directives rather than help:
//!
//! ```text
//! Manage widgets
//! :param name: Widget to operate on
//! :alias w:
//! ```
//!
//! `:param NAME: text` documents a parameter, `:alias NAME:` adds one alias,
//! and `:easycli_ignore:` (or the shorter `:cli_ignore:`) hides the handler
//! from the command tree.

use std::sync::LazyLock;

use cmdspec_core::{ArgValue, ValueType};
use regex::Regex;

static PARAM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*:param\s+([^:\s]+):[ \t]*(.*)$").expect("static regex must compile")
});

static ALIAS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m):alias\s+(.*):").expect("static regex must compile"));

const IGNORE_MARKERS: [&str; 2] = [":easycli_ignore:", ":cli_ignore:"];

/// One declared parameter, before the positional/flag split.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDeclaration {
    pub name: String,
    pub declared_type: ValueType,
    /// `Some` when the declaration supplies a default.
    pub default: Option<ArgValue>,
}

impl ParameterDeclaration {
    /// A parameter without a default.
    pub fn required(name: &str, declared_type: ValueType) -> Self {
        Self {
            name: name.to_string(),
            declared_type,
            default: None,
        }
    }

    /// A parameter with a default. `ArgValue::Null` stands for an explicit
    /// "no value" default.
    pub fn optional(name: &str, declared_type: ValueType, default: impl Into<ArgValue>) -> Self {
        Self {
            name: name.to_string(),
            declared_type,
            default: Some(default.into()),
        }
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }
}

/// Source of everything the adapter needs to know about a handler.
///
/// Only the declared name, description and parameter list are required; the
/// rest is derived from the description.
pub trait MetadataProvider {
    fn declared_name(&self) -> &str;

    fn description(&self) -> &str;

    fn parameters(&self) -> &[ParameterDeclaration];

    /// Command name: lower-cased, `_` rendered as `-`.
    fn command_name(&self) -> String {
        self.declared_name().to_lowercase().replace('_', "-")
    }

    /// Description without directive lines, folded onto one line.
    fn help_string(&self) -> String {
        self.description()
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with(':'))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Help text for one parameter from its `:param` directives.
    fn help_for(&self, parameter: &str) -> String {
        PARAM_RE
            .captures_iter(self.description())
            .filter(|caps| &caps[1] == parameter)
            .map(|caps| caps[2].trim().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn aliases(&self) -> Vec<String> {
        ALIAS_RE
            .captures_iter(self.description())
            .map(|caps| caps[1].trim().to_string())
            .collect()
    }

    /// Marked with `:easycli_ignore:` or `:cli_ignore:`.
    fn is_excluded(&self) -> bool {
        let description = self.description();
        IGNORE_MARKERS.iter().any(|marker| description.contains(marker))
    }

    /// Names starting with `_` are internal and never exposed.
    fn is_internal(&self) -> bool {
        self.declared_name().starts_with('_')
    }
}

/// Declarative metadata, written by the application author.
///
/// # Examples
///
/// ```
/// use cmdspec_core::{ArgValue, ValueType};
/// use cmdspec_engine::{HandlerMetadata, MetadataProvider};
///
/// let meta = HandlerMetadata::new("validate_config", "Validate the config\n:alias vc:")
///     .param("path", ValueType::String)
///     .param_with_default("strict", ValueType::Boolean, false);
///
/// assert_eq!(meta.command_name(), "validate-config");
/// assert_eq!(meta.help_string(), "Validate the config");
/// assert_eq!(meta.aliases(), vec!["vc"]);
/// assert_eq!(meta.parameters()[1].default, Some(ArgValue::Bool(false)));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HandlerMetadata {
    name: String,
    description: String,
    parameters: Vec<ParameterDeclaration>,
}

impl HandlerMetadata {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            parameters: Vec::new(),
        }
    }

    pub fn param(mut self, name: &str, declared_type: ValueType) -> Self {
        self.parameters
            .push(ParameterDeclaration::required(name, declared_type));
        self
    }

    pub fn param_with_default(
        mut self,
        name: &str,
        declared_type: ValueType,
        default: impl Into<ArgValue>,
    ) -> Self {
        self.parameters
            .push(ParameterDeclaration::optional(name, declared_type, default));
        self
    }

    pub fn declaration(mut self, declaration: ParameterDeclaration) -> Self {
        self.parameters.push(declaration);
        self
    }
}

impl MetadataProvider for HandlerMetadata {
    fn declared_name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters(&self) -> &[ParameterDeclaration] {
        &self.parameters
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "
        Print the suffix
        :param suffix_one: First part of the suffix
        :param prefix: Prefix to print
        :param suffix_one: defaults to 'Default Suffix'
        :alias f:
        :alias fu:
    ";

    #[test]
    fn test_help_string_skips_directives() {
        let meta = HandlerMetadata::new("foo", DOC);
        assert_eq!(meta.help_string(), "Print the suffix");
    }

    #[test]
    fn test_param_help_joins_repeated_directives() {
        let meta = HandlerMetadata::new("foo", DOC);
        assert_eq!(
            meta.help_for("suffix_one"),
            "First part of the suffix, defaults to 'Default Suffix'"
        );
        assert_eq!(meta.help_for("prefix"), "Prefix to print");
        assert_eq!(meta.help_for("missing"), "");
    }

    #[test]
    fn test_aliases_one_per_directive() {
        let meta = HandlerMetadata::new("foo", DOC);
        assert_eq!(meta.aliases(), vec!["f", "fu"]);
    }

    #[test]
    fn test_ignore_marker_and_internal_names() {
        assert!(HandlerMetadata::new("secret", "Hidden\n:easycli_ignore:").is_excluded());
        assert!(HandlerMetadata::new("secret", "Hidden\n:cli_ignore:").is_excluded());
        assert!(!HandlerMetadata::new("secret", "Visible").is_excluded());
        assert!(HandlerMetadata::new("_helper", "Internal").is_internal());
    }

    #[test]
    fn test_command_name_normalization() {
        assert_eq!(HandlerMetadata::new("SubcommandClass", "x").command_name(), "subcommandclass");
        assert_eq!(HandlerMetadata::new("validate_config", "x").command_name(), "validate-config");
    }
}
