//! Specification type definitions for command tree modeling.
//!
//! This module defines the data model shared by every stage of the engine:
//! normalized parameter descriptors, the flag and positional definitions they
//! compile into, and the immutable [`SpecNode`] tree. The types serialize with
//! [`serde`] so a compiled tree can be exported as JSON or YAML.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Declared value type of a parameter.
///
/// Metadata providers may declare any type; the compiler narrows everything
/// it does not understand to [`ValueType::String`]. A [`Custom`] type never
/// survives compilation.
///
/// [`Custom`]: ValueType::Custom
///
/// # Examples
///
/// ```
/// use cmdspec_core::ValueType;
///
/// assert_eq!(ValueType::default(), ValueType::String);
/// assert!(ValueType::List.is_list());
/// assert_eq!(ValueType::Custom("Path".into()).normalized(), ValueType::String);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    /// Free text (the default).
    #[default]
    String,
    /// Signed integer.
    Integer,
    /// Presence switch.
    Boolean,
    /// One or more string tokens.
    List,
    /// Any other declared type, kept only until compilation.
    Custom(String),
}

impl ValueType {
    /// Returns `true` for list-shaped types.
    pub fn is_list(&self) -> bool {
        matches!(self, ValueType::List)
    }

    /// Narrows unknown types to [`ValueType::String`].
    pub fn normalized(&self) -> ValueType {
        match self {
            ValueType::Custom(_) => ValueType::String,
            other => other.clone(),
        }
    }
}

/// A parsed or default argument value.
///
/// Serializes untagged, so values render as plain JSON scalars and arrays.
///
/// # Examples
///
/// ```
/// use cmdspec_core::ArgValue;
///
/// let count = ArgValue::from(3);
/// assert_eq!(count.as_int(), Some(3));
/// assert_eq!(count.to_string(), "3");
///
/// let files = ArgValue::from(vec!["a.txt".to_string(), "b.txt".to_string()]);
/// assert_eq!(files.as_list().map(|l| l.len()), Some(2));
/// assert!(ArgValue::Null.is_null());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgValue {
    /// No value (an explicit `None` default or an absent optional value).
    Null,
    Bool(bool),
    Int(i64),
    Str(String),
    List(Vec<String>),
}

impl ArgValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ArgValue::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ArgValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ArgValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ArgValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            ArgValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Name of the variant, used in type mismatch messages.
    pub fn kind(&self) -> &'static str {
        match self {
            ArgValue::Null => "null",
            ArgValue::Bool(_) => "boolean",
            ArgValue::Int(_) => "integer",
            ArgValue::Str(_) => "string",
            ArgValue::List(_) => "list",
        }
    }

    /// Returns the value as a single command-line literal, if it has one.
    ///
    /// Lists and `Null` have no single-token form.
    pub fn to_literal(&self) -> Option<String> {
        match self {
            ArgValue::Bool(b) => Some(b.to_string()),
            ArgValue::Int(i) => Some(i.to_string()),
            ArgValue::Str(s) => Some(s.clone()),
            ArgValue::Null | ArgValue::List(_) => None,
        }
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Null => f.write_str("none"),
            ArgValue::Bool(b) => write!(f, "{b}"),
            ArgValue::Int(i) => write!(f, "{i}"),
            ArgValue::Str(s) => f.write_str(s),
            ArgValue::List(items) => write!(f, "{}", items.join(" ")),
        }
    }
}

impl From<bool> for ArgValue {
    fn from(value: bool) -> Self {
        ArgValue::Bool(value)
    }
}

impl From<i64> for ArgValue {
    fn from(value: i64) -> Self {
        ArgValue::Int(value)
    }
}

impl From<i32> for ArgValue {
    fn from(value: i32) -> Self {
        ArgValue::Int(i64::from(value))
    }
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        ArgValue::Str(value.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(value: String) -> Self {
        ArgValue::Str(value)
    }
}

impl From<Vec<String>> for ArgValue {
    fn from(value: Vec<String>) -> Self {
        ArgValue::List(value)
    }
}

/// Whether a parameter is matched by name or by position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterKind {
    Flag,
    Positional,
}

/// A normalized parameter, ready for compilation.
///
/// Descriptors are produced once per handler from its metadata and never
/// change afterwards.
///
/// # Examples
///
/// ```
/// use cmdspec_core::{ArgValue, ParameterDescriptor, ParameterKind, ValueType};
///
/// let name = ParameterDescriptor::positional("name", ValueType::String);
/// assert!(name.required);
///
/// let count = ParameterDescriptor::flag("count", ValueType::Integer, ArgValue::Int(3))
///     .with_help("How many widgets");
/// assert_eq!(count.kind, ParameterKind::Flag);
/// assert_eq!(count.default_value, Some(ArgValue::Int(3)));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    /// Parameter name as declared (underscores allowed).
    pub name: String,
    pub kind: ParameterKind,
    /// Declared type, before normalization.
    pub value_type: ValueType,
    /// Default value; `None` for positionals.
    pub default_value: Option<ArgValue>,
    /// Help text, empty when undocumented.
    pub help: String,
    pub required: bool,
}

impl ParameterDescriptor {
    /// Creates a required positional descriptor.
    pub fn positional(name: &str, value_type: ValueType) -> Self {
        Self {
            name: name.to_string(),
            kind: ParameterKind::Positional,
            value_type,
            default_value: None,
            help: String::new(),
            required: true,
        }
    }

    /// Creates an optional flag descriptor with a default value.
    pub fn flag(name: &str, value_type: ValueType, default_value: ArgValue) -> Self {
        Self {
            name: name.to_string(),
            kind: ParameterKind::Flag,
            value_type,
            default_value: Some(default_value),
            help: String::new(),
            required: false,
        }
    }

    /// Adds help text.
    pub fn with_help(mut self, help: &str) -> Self {
        self.help = help.to_string();
        self
    }
}

/// A compiled flag.
///
/// A flag has a long form (`--dry-run`), a short form (`-d`), or both. The
/// `name` is the parameter name the parsed value is stored under.
///
/// # Examples
///
/// ```
/// use cmdspec_core::{FlagDefinition, ValueType};
///
/// let verbose = FlagDefinition::switch("verbose")
///     .with_short('v')
///     .with_help("Enable verbose output");
/// assert_eq!(verbose.names(), vec!["--verbose", "-v"]);
/// assert!(verbose.matches("-v"));
/// assert!(verbose.is_switch);
///
/// let output = FlagDefinition::with_value("output_dir", ValueType::String);
/// assert_eq!(output.canonical_name(), "--output-dir");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlagDefinition {
    /// Parameter name (storage key).
    pub name: String,
    /// Short form (e.g. "-c").
    pub short: Option<String>,
    /// Long form (e.g. "--count").
    pub long: Option<String>,
    /// Normalized value type.
    pub value_type: ValueType,
    pub default_value: Option<ArgValue>,
    pub help: String,
    pub required: bool,
    /// Presence toggles the value; no token is consumed.
    pub is_switch: bool,
    /// Accepts one or more trailing tokens.
    pub variadic: bool,
}

impl FlagDefinition {
    /// Creates a boolean switch with a long form derived from `name`.
    pub fn switch(name: &str) -> Self {
        Self {
            name: name.to_string(),
            short: None,
            long: Some(long_form(name)),
            value_type: ValueType::Boolean,
            default_value: Some(ArgValue::Bool(false)),
            help: String::new(),
            required: false,
            is_switch: true,
            variadic: false,
        }
    }

    /// Creates a value-taking flag with a long form derived from `name`.
    pub fn with_value(name: &str, value_type: ValueType) -> Self {
        let variadic = value_type.is_list();
        Self {
            name: name.to_string(),
            short: None,
            long: Some(long_form(name)),
            value_type,
            default_value: None,
            help: String::new(),
            required: false,
            is_switch: false,
            variadic,
        }
    }

    /// Sets the short form.
    pub fn with_short(mut self, c: char) -> Self {
        self.short = Some(format!("-{c}"));
        self
    }

    /// Removes the long form, leaving the flag short-only.
    pub fn short_only(mut self, c: char) -> Self {
        self.short = Some(format!("-{c}"));
        self.long = None;
        self
    }

    pub fn with_help(mut self, help: &str) -> Self {
        self.help = help.to_string();
        self
    }

    pub fn with_default(mut self, value: ArgValue) -> Self {
        self.default_value = Some(value);
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// All names in registration order: long form first, then short form.
    pub fn names(&self) -> Vec<&str> {
        self.long
            .as_deref()
            .into_iter()
            .chain(self.short.as_deref())
            .collect()
    }

    /// Returns the canonical name (long form preferred, falls back to short).
    pub fn canonical_name(&self) -> &str {
        self.long
            .as_deref()
            .or(self.short.as_deref())
            .unwrap_or("unknown")
    }

    /// The short form as a character, if any.
    pub fn short_char(&self) -> Option<char> {
        self.short.as_deref().and_then(|s| s.strip_prefix('-'))?.chars().next()
    }

    /// The long form without its leading dashes, if any.
    pub fn long_name(&self) -> Option<&str> {
        self.long.as_deref().and_then(|l| l.strip_prefix("--"))
    }

    /// Checks if this flag matches a given string (short or long form).
    pub fn matches(&self, s: &str) -> bool {
        self.short.as_deref() == Some(s) || self.long.as_deref() == Some(s)
    }
}

/// A compiled positional argument.
///
/// # Examples
///
/// ```
/// use cmdspec_core::{PositionalDefinition, ValueType};
///
/// let files = PositionalDefinition::new("files", ValueType::List);
/// assert!(files.variadic);
/// assert_eq!(files.metavar(), "FILES");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionalDefinition {
    pub name: String,
    /// Normalized value type; a variadic positional reports `List`.
    pub value_type: ValueType,
    pub help: String,
    /// Binds one or more trailing tokens.
    pub variadic: bool,
}

impl PositionalDefinition {
    pub fn new(name: &str, value_type: ValueType) -> Self {
        let variadic = value_type.is_list();
        Self {
            name: name.to_string(),
            value_type,
            help: String::new(),
            variadic,
        }
    }

    pub fn with_help(mut self, help: &str) -> Self {
        self.help = help.to_string();
        self
    }

    /// Placeholder shown in usage text.
    pub fn metavar(&self) -> String {
        self.name.to_uppercase()
    }
}

/// Immutable description of one command level.
///
/// Produced by [`SpecBuilder::build`](crate::SpecBuilder::build). Children are
/// owned by their parent; aliases resolve to the same child as its name.
///
/// # Examples
///
/// ```
/// use cmdspec_core::*;
///
/// let mut status = SpecBuilder::new("status", "Show status");
/// status.add_alias("st");
///
/// let mut root = SpecBuilder::new("app", "Demo application");
/// root.add_flag(FlagDefinition::switch("verbose").with_short('v'));
/// root.add_child(status);
/// let spec = root.build();
///
/// assert_eq!(spec.find_child("st").map(|c| c.name.as_str()), Some("status"));
/// assert!(spec.find_flag("--verbose").is_some());
/// assert_eq!(spec.child_names(), vec!["status"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpecNode {
    pub name: String,
    pub description: String,
    pub aliases: Vec<String>,
    pub flags: Vec<FlagDefinition>,
    pub positionals: Vec<PositionalDefinition>,
    pub children: Vec<SpecNode>,
}

impl SpecNode {
    /// Finds a direct child by name or alias.
    pub fn find_child(&self, name: &str) -> Option<&SpecNode> {
        self.children.iter().find(|c| c.answers_to(name))
    }

    /// Returns `true` if `name` is this node's name or one of its aliases.
    pub fn answers_to(&self, name: &str) -> bool {
        self.name == name || self.aliases.iter().any(|a| a == name)
    }

    /// Finds a flag by short or long form.
    pub fn find_flag(&self, flag: &str) -> Option<&FlagDefinition> {
        self.flags.iter().find(|f| f.matches(flag))
    }

    pub fn child_names(&self) -> Vec<&str> {
        self.children.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Follows a path of child names or aliases from this node.
    pub fn descend<S: AsRef<str>>(&self, path: &[S]) -> Option<&SpecNode> {
        path.iter()
            .try_fold(self, |node, segment| node.find_child(segment.as_ref()))
    }
}

/// Renders a parameter name as a long flag (`dry_run` → `--dry-run`).
pub fn long_form(name: &str) -> String {
    format!("--{}", name.replace('_', "-"))
}
