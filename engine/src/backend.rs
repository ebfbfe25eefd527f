//! Parser backend seam and the tree compiler that drives it.

use cmdspec_core::{FlagDefinition, PositionalDefinition, SpecNode, validate_spec};
use tracing::debug;

use crate::error::{ConfigError, ParseFailure};
use crate::parsed::{ParsedArguments, ROOT_SLOT};

/// An argument parser that can be configured one command level at a time.
///
/// A backend value is one scope: the root parser, or a nested parser that is
/// handed to its parent through [`register_choice`](Self::register_choice).
pub trait ParserBackend: Sized {
    /// Creates an empty scope for one command level.
    fn scope(name: &str, description: &str) -> Self;

    fn register_flag(&mut self, flag: &FlagDefinition) -> Result<(), ConfigError>;

    /// Registers the positional at `index` (declaration order).
    fn register_positional(
        &mut self,
        index: usize,
        positional: &PositionalDefinition,
    ) -> Result<(), ConfigError>;

    /// Makes this scope select a child; the choice is recorded under `slot`.
    fn register_sub_selector(&mut self, slot: &str) -> Result<(), ConfigError>;

    /// Adds a child scope reachable by `name` and every alias.
    fn register_choice(
        &mut self,
        name: &str,
        aliases: &[String],
        nested: Self,
    ) -> Result<(), ConfigError>;

    /// Parses a command line, program name excluded.
    fn parse(&self, argv: &[String]) -> Result<ParsedArguments, ParseFailure>;

    /// Usage text for the scope reached by following `path` from the root.
    fn usage(&self, path: &[String]) -> String;
}

/// Validates `root` and registers it, depth first, with a new backend.
///
/// The root's selection slot is [`ROOT_SLOT`]; every other level uses its
/// own name.
pub fn compile_parser<B: ParserBackend>(root: &SpecNode) -> Result<B, ConfigError> {
    if let Some(first) = validate_spec(root).into_iter().next() {
        return Err(first.into());
    }
    compile_node(root, ROOT_SLOT)
}

fn compile_node<B: ParserBackend>(node: &SpecNode, slot: &str) -> Result<B, ConfigError> {
    let mut backend = B::scope(&node.name, &node.description);

    for flag in &node.flags {
        backend.register_flag(flag)?;
    }
    for (index, positional) in node.positionals.iter().enumerate() {
        backend.register_positional(index, positional)?;
    }

    if !node.children.is_empty() {
        backend.register_sub_selector(slot)?;
        for child in &node.children {
            let nested = compile_node::<B>(child, &child.name)?;
            backend.register_choice(&child.name, &child.aliases, nested)?;
        }
    }

    debug!(
        command = %node.name,
        flags = node.flags.len(),
        positionals = node.positionals.len(),
        children = node.children.len(),
        "registered command scope"
    );
    Ok(backend)
}
