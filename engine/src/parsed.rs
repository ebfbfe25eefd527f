//! Parsed argument values, one scope per command depth.

use std::collections::BTreeMap;

use cmdspec_core::ArgValue;
use serde::{Serialize, Serializer};

/// Slot the root records its selected child under.
pub const ROOT_SLOT: &str = "subcommand";

/// Values matched at one command depth.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedScope {
    /// Key the selected child is recorded under: [`ROOT_SLOT`] at the root,
    /// the command's own name below it. `None` for leaf commands.
    pub slot: Option<String>,
    /// Parameter values keyed by parameter name.
    pub values: BTreeMap<String, ArgValue>,
    /// Canonical name of the selected child, if one was given.
    pub selection: Option<String>,
}

impl ParsedScope {
    pub fn new(slot: Option<&str>) -> Self {
        Self {
            slot: slot.map(str::to_string),
            ..Self::default()
        }
    }

    pub fn with_value(mut self, name: &str, value: impl Into<ArgValue>) -> Self {
        self.values.insert(name.to_string(), value.into());
        self
    }

    pub fn with_selection(mut self, selection: &str) -> Self {
        self.selection = Some(selection.to_string());
        self
    }
}

/// Result of parsing one command line.
///
/// Scope `0` belongs to the root; each selected child adds the next scope.
/// Serializes as a flat map of parameter values plus one selection key per
/// depth, e.g. `{"subcommand": "status", "status": "show", "verbose": false}`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedArguments {
    scopes: Vec<ParsedScope>,
}

impl ParsedArguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_scope(&mut self, scope: ParsedScope) {
        self.scopes.push(scope);
    }

    pub fn scope(&self, depth: usize) -> Option<&ParsedScope> {
        self.scopes.get(depth)
    }

    pub fn scopes(&self) -> &[ParsedScope] {
        &self.scopes
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Selected child names from the root down.
    pub fn selected_path(&self) -> Vec<&str> {
        self.scopes
            .iter()
            .map_while(|scope| scope.selection.as_deref())
            .collect()
    }

    /// Value recorded under `slot`, if any scope uses that slot.
    pub fn selection(&self, slot: &str) -> Option<&str> {
        self.scopes
            .iter()
            .find(|scope| scope.slot.as_deref() == Some(slot))
            .and_then(|scope| scope.selection.as_deref())
    }

    /// Looks a value up by name, deepest scope first.
    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.scopes.iter().rev().find_map(|scope| scope.values.get(name))
    }

    /// Flattens every scope into one map. Deeper scopes win on name clashes.
    pub fn to_flat_map(&self) -> BTreeMap<String, ArgValue> {
        let mut flat = BTreeMap::new();
        for scope in &self.scopes {
            for (name, value) in &scope.values {
                flat.insert(name.clone(), value.clone());
            }
            if let (Some(slot), Some(selection)) = (&scope.slot, &scope.selection) {
                flat.insert(slot.clone(), ArgValue::Str(selection.clone()));
            }
        }
        flat
    }
}

impl Serialize for ParsedArguments {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_flat_map().serialize(serializer)
    }
}
