//! Incremental construction of [`SpecNode`] trees.
//!
//! A [`SpecBuilder`] is mutable while a command level is being assembled and
//! owns the builders of its children. [`SpecBuilder::build`] takes a deep
//! snapshot; the builder stays usable and building it again without changes
//! yields an identical tree.

use crate::{FlagDefinition, PositionalDefinition, SpecNode};

/// Mutable builder for one command level and its subtree.
///
/// # Examples
///
/// ```
/// use cmdspec_core::*;
///
/// let mut show = SpecBuilder::new("show", "Show the current status");
/// show.add_alias("sh");
/// show.add_alias("sh"); // duplicates are ignored
///
/// let mut root = SpecBuilder::new("app", "Demo application");
/// root.add_flag(FlagDefinition::switch("verbose").with_short('v'));
/// root.add_positional(PositionalDefinition::new("target", ValueType::String));
/// root.add_child(show);
///
/// let first = root.build();
/// let second = root.build();
/// assert_eq!(first, second);
/// assert_eq!(first.children[0].aliases, vec!["sh"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SpecBuilder {
    name: String,
    description: String,
    aliases: Vec<String>,
    flags: Vec<FlagDefinition>,
    positionals: Vec<PositionalDefinition>,
    children: Vec<SpecBuilder>,
}

impl SpecBuilder {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Registers an alias, silently ignoring repeats.
    ///
    /// Collisions with sibling names are not checked here; they surface when
    /// the finished tree is validated for a parser backend.
    pub fn add_alias(&mut self, alias: &str) -> &mut Self {
        if !self.aliases.iter().any(|a| a == alias) {
            self.aliases.push(alias.to_string());
        }
        self
    }

    pub fn add_flag(&mut self, flag: FlagDefinition) -> &mut Self {
        self.flags.push(flag);
        self
    }

    pub fn add_positional(&mut self, positional: PositionalDefinition) -> &mut Self {
        self.positionals.push(positional);
        self
    }

    pub fn add_child(&mut self, child: SpecBuilder) -> &mut Self {
        self.children.push(child);
        self
    }

    /// Snapshots the builder and its whole subtree.
    pub fn build(&self) -> SpecNode {
        SpecNode {
            name: self.name.clone(),
            description: self.description.clone(),
            aliases: self.aliases.clone(),
            flags: self.flags.clone(),
            positionals: self.positionals.clone(),
            children: self.children.iter().map(SpecBuilder::build).collect(),
        }
    }
}
