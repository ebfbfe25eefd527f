//! Compilation of parameter descriptors into flag and positional definitions.
//!
//! Short forms are handed out by a [`ShortNameAllocator`] that lives for one
//! command level. It starts with `h` taken (help) and remembers every short
//! form assigned to the sibling flags compiled before.

use crate::{
    ArgValue, FlagDefinition, ParameterDescriptor, ParameterKind, PositionalDefinition, ValueType,
    long_form,
};

/// Character reserved for `-h`/`--help` in every scope.
pub const HELP_SHORT: char = 'h';

/// Tracks the short flag characters already taken within one node.
///
/// # Examples
///
/// ```
/// use cmdspec_core::ShortNameAllocator;
///
/// let mut shorts = ShortNameAllocator::new();
/// assert_eq!(shorts.allocate("color"), Some('c'));
/// assert_eq!(shorts.allocate("compress"), Some('o'));
/// assert_eq!(shorts.allocate("hush"), Some('u'));
/// assert!(shorts.is_reserved('h'));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortNameAllocator {
    reserved: Vec<char>,
}

impl Default for ShortNameAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl ShortNameAllocator {
    /// Creates an allocator with only the help character taken.
    pub fn new() -> Self {
        Self {
            reserved: vec![HELP_SHORT],
        }
    }

    /// Picks the first free character of `name`, scanning left to right.
    ///
    /// Returns `None` once every character is taken; the flag then keeps
    /// its long form only.
    pub fn allocate(&mut self, name: &str) -> Option<char> {
        let c = name
            .chars()
            .find(|c| c.is_ascii_alphanumeric() && !self.reserved.contains(c))?;
        self.reserved.push(c);
        Some(c)
    }

    /// Marks `c` as taken. Returns `false` if it already was.
    pub fn reserve(&mut self, c: char) -> bool {
        if self.reserved.contains(&c) {
            return false;
        }
        self.reserved.push(c);
        true
    }

    pub fn is_reserved(&self, c: char) -> bool {
        self.reserved.contains(&c)
    }

    /// Taken characters in the order they were handed out.
    pub fn reserved(&self) -> &[char] {
        &self.reserved
    }
}

/// Result of compiling one descriptor.
#[derive(Debug, Clone, PartialEq)]
pub enum CompiledParameter {
    Flag(FlagDefinition),
    Positional(PositionalDefinition),
}

impl CompiledParameter {
    pub fn name(&self) -> &str {
        match self {
            CompiledParameter::Flag(f) => &f.name,
            CompiledParameter::Positional(p) => &p.name,
        }
    }
}

/// Compiles a descriptor, drawing short forms from `shorts`.
///
/// Positionals: lists become variadic, integers stay integers, every other
/// type is taken as text. Flags: booleans become switches, lists become
/// variadic, unknown types are taken as text. A one-character flag name gets
/// only a short form and does not go through allocation, though its character
/// is marked as taken.
///
/// # Examples
///
/// ```
/// use cmdspec_core::*;
///
/// let mut shorts = ShortNameAllocator::new();
/// let count = ParameterDescriptor::flag("count", ValueType::Integer, ArgValue::Int(3));
/// let CompiledParameter::Flag(flag) = compile_parameter(&count, &mut shorts) else {
///     panic!("expected a flag");
/// };
/// assert_eq!(flag.names(), vec!["--count", "-c"]);
/// assert_eq!(flag.default_value, Some(ArgValue::Int(3)));
/// ```
pub fn compile_parameter(
    descriptor: &ParameterDescriptor,
    shorts: &mut ShortNameAllocator,
) -> CompiledParameter {
    match descriptor.kind {
        ParameterKind::Positional => CompiledParameter::Positional(compile_positional(descriptor)),
        ParameterKind::Flag => CompiledParameter::Flag(compile_flag(descriptor, shorts)),
    }
}

fn compile_positional(descriptor: &ParameterDescriptor) -> PositionalDefinition {
    let value_type = match descriptor.value_type {
        ValueType::List => ValueType::List,
        ValueType::Integer => ValueType::Integer,
        _ => ValueType::String,
    };
    PositionalDefinition::new(&descriptor.name, value_type).with_help(&descriptor.help)
}

fn compile_flag(descriptor: &ParameterDescriptor, shorts: &mut ShortNameAllocator) -> FlagDefinition {
    let value_type = descriptor.value_type.normalized();
    let is_switch = value_type == ValueType::Boolean;

    let mut chars = descriptor.name.chars();
    let (short, long) = match (chars.next(), chars.next()) {
        (Some(only), None) => {
            shorts.reserve(only);
            (Some(format!("-{only}")), None)
        }
        _ => (
            shorts.allocate(&descriptor.name).map(|c| format!("-{c}")),
            Some(long_form(&descriptor.name)),
        ),
    };

    let default_value = match (&descriptor.default_value, is_switch) {
        (None, true) => Some(ArgValue::Bool(false)),
        (default, _) => default.clone(),
    };

    FlagDefinition {
        name: descriptor.name.clone(),
        short,
        long,
        variadic: value_type.is_list(),
        value_type,
        default_value,
        help: descriptor.help.clone(),
        required: descriptor.required,
        is_switch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flag(name: &str, value_type: ValueType, default: ArgValue) -> ParameterDescriptor {
        ParameterDescriptor::flag(name, value_type, default)
    }

    fn compile_flag_def(desc: &ParameterDescriptor, shorts: &mut ShortNameAllocator) -> FlagDefinition {
        match compile_parameter(desc, shorts) {
            CompiledParameter::Flag(f) => f,
            other => panic!("expected flag, got {other:?}"),
        }
    }

    #[test]
    fn test_color_and_compress_do_not_share_short_form() {
        let mut shorts = ShortNameAllocator::new();
        let color = compile_flag_def(&flag("color", ValueType::Boolean, ArgValue::Bool(false)), &mut shorts);
        let compress =
            compile_flag_def(&flag("compress", ValueType::Boolean, ArgValue::Bool(false)), &mut shorts);

        assert_eq!(color.short.as_deref(), Some("-c"));
        assert_eq!(compress.short.as_deref(), Some("-o"));
    }

    #[test]
    fn test_compress_skips_every_taken_character() {
        let mut shorts = ShortNameAllocator::new();
        shorts.reserve('c');
        shorts.reserve('o');
        let compress =
            compile_flag_def(&flag("compress", ValueType::Boolean, ArgValue::Bool(false)), &mut shorts);

        assert_eq!(compress.short.as_deref(), Some("-m"));
    }

    #[test]
    fn test_exhausted_name_falls_back_to_long_form_only() {
        let mut shorts = ShortNameAllocator::new();
        shorts.reserve('a');
        shorts.reserve('b');
        let ba = compile_flag_def(&flag("ba", ValueType::String, ArgValue::Null), &mut shorts);

        assert_eq!(ba.short, None);
        assert_eq!(ba.long.as_deref(), Some("--ba"));
    }

    #[test]
    fn test_help_character_is_never_allocated() {
        let mut shorts = ShortNameAllocator::new();
        let hosts = compile_flag_def(&flag("hosts", ValueType::List, ArgValue::Null), &mut shorts);

        assert_eq!(hosts.short.as_deref(), Some("-o"));
        assert!(hosts.variadic);
        assert_eq!(hosts.value_type, ValueType::List);
    }

    #[test]
    fn test_single_character_flag_is_short_only_and_reserves() {
        let mut shorts = ShortNameAllocator::new();
        let x = compile_flag_def(&flag("x", ValueType::Integer, ArgValue::Int(0)), &mut shorts);
        let xray = compile_flag_def(&flag("xray", ValueType::Boolean, ArgValue::Bool(false)), &mut shorts);

        assert_eq!(x.names(), vec!["-x"]);
        assert_eq!(xray.short.as_deref(), Some("-r"));
    }

    #[test]
    fn test_underscores_render_as_hyphens() {
        let mut shorts = ShortNameAllocator::new();
        let suffix = compile_flag_def(
            &flag("suffix_one", ValueType::String, ArgValue::from("Default Suffix")),
            &mut shorts,
        );

        assert_eq!(suffix.long.as_deref(), Some("--suffix-one"));
        assert_eq!(suffix.name, "suffix_one");
        assert_eq!(suffix.short.as_deref(), Some("-s"));
    }

    #[test]
    fn test_unknown_flag_type_falls_back_to_string() {
        let mut shorts = ShortNameAllocator::new();
        let path = compile_flag_def(
            &flag("path", ValueType::Custom("PathBuf".into()), ArgValue::Null),
            &mut shorts,
        );

        assert_eq!(path.value_type, ValueType::String);
        assert!(!path.is_switch);
    }

    #[test]
    fn test_positional_type_normalization() {
        let mut shorts = ShortNameAllocator::new();
        let cases = [
            (ValueType::String, ValueType::String, false),
            (ValueType::Integer, ValueType::Integer, false),
            (ValueType::List, ValueType::List, true),
            (ValueType::Boolean, ValueType::String, false),
            (ValueType::Custom("Url".into()), ValueType::String, false),
        ];
        for (declared, expected, variadic) in cases {
            let desc = ParameterDescriptor::positional("value", declared);
            let CompiledParameter::Positional(p) = compile_parameter(&desc, &mut shorts) else {
                panic!("expected positional");
            };
            assert_eq!(p.value_type, expected);
            assert_eq!(p.variadic, variadic);
        }
        assert_eq!(shorts.reserved(), ['h']);
    }
}
