//! Command specification trees and the parameter compiler.
//!
//! This crate defines the data model for declarative command-line
//! applications:
//!
//! - [`ParameterDescriptor`] — a normalized parameter (name, kind, type,
//!   default, help).
//! - [`FlagDefinition`] / [`PositionalDefinition`] — what a descriptor compiles
//!   into, see [`compile_parameter`].
//! - [`SpecNode`] — an immutable command level with flags, positionals,
//!   aliases and child commands, assembled with a [`SpecBuilder`].
//!
//! Validation ([`validate_spec`]) catches configuration errors such as
//! duplicate flags, help shadowing, colliding aliases and misplaced variadic
//! positionals before a tree is handed to a parser backend.
//!
//! Manual pages ([`render_manpages`]) render a tree as groff text.
//!
//! # Example
//!
//! ```
//! use cmdspec_core::*;
//!
//! let mut shorts = ShortNameAllocator::new();
//! let mut root = SpecBuilder::new("widgets", "Manage widgets");
//!
//! for descriptor in [
//!     ParameterDescriptor::positional("name", ValueType::String),
//!     ParameterDescriptor::flag("count", ValueType::Integer, ArgValue::Int(3)),
//! ] {
//!     match compile_parameter(&descriptor, &mut shorts) {
//!         CompiledParameter::Flag(flag) => root.add_flag(flag),
//!         CompiledParameter::Positional(pos) => root.add_positional(pos),
//!     };
//! }
//!
//! let spec = root.build();
//! assert_eq!(spec.positionals[0].name, "name");
//! assert_eq!(spec.find_flag("-c").map(|f| f.name.as_str()), Some("count"));
//! assert!(validate_spec(&spec).is_empty());
//! ```

mod builder;
mod compiler;
mod manpage;
mod types;
mod validate;

pub use builder::SpecBuilder;
pub use compiler::{CompiledParameter, HELP_SHORT, ShortNameAllocator, compile_parameter};
pub use manpage::{render_manpages, render_page, synopsis};
pub use types::*;
pub use validate::{ValidationError, validate_spec};
