//! Structural validation of specification trees.
//!
//! Catches the configuration errors a parser backend would otherwise trip
//! over at registration time: malformed or duplicate flags, flags that shadow
//! `-h`/`--help`, sibling commands whose names or aliases collide, and
//! variadic positionals that are not last.
//!
//! # Examples
//!
//! ```
//! use cmdspec_core::*;
//!
//! let mut root = SpecBuilder::new("app", "Demo");
//! root.add_flag(FlagDefinition::switch("verbose").with_short('v'));
//! assert!(validate_spec(&root.build()).is_empty());
//!
//! // Invalid: a flag claims the help short form
//! let mut bad = SpecBuilder::new("app", "Demo");
//! bad.add_flag(FlagDefinition::switch("host").with_short('h'));
//! assert!(!validate_spec(&bad.build()).is_empty());
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::{FlagDefinition, HELP_SHORT, PositionalDefinition, SpecNode};

/// Specification validation errors.
///
/// Every variant names the command path (space separated, root first) where
/// the problem was found.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A command name is empty or whitespace-only.
    #[error("command name cannot be empty (under '{0}')")]
    EmptyCommandName(String),
    /// An alias is empty or whitespace-only.
    #[error("empty alias on command '{0}'")]
    EmptyAlias(String),
    /// Short flag is not a dash followed by exactly one character.
    #[error("invalid short flag format on '{path}': {flag}")]
    InvalidShortFlag { path: String, flag: String },
    /// Long flag does not start with `--` or is too short.
    #[error("invalid long flag format on '{path}': {flag}")]
    InvalidLongFlag { path: String, flag: String },
    /// A flag has neither short nor long form.
    #[error("flag '{name}' on '{path}' must define a short or long form")]
    MissingFlagName { path: String, name: String },
    /// A flag uses `-h` or `--help`.
    #[error("flag {flag} on '{path}' shadows the help flag")]
    ReservedHelpFlag { path: String, flag: String },
    /// Two flags in the same command share a form.
    #[error("duplicate flag in '{path}': {flag}")]
    DuplicateFlag { path: String, flag: String },
    /// Two parameters of the same command share a storage name.
    #[error("duplicate parameter in '{path}': {name}")]
    DuplicateParameter { path: String, name: String },
    /// Two sibling commands share a name or alias.
    #[error("duplicate command name or alias in '{path}': {name}")]
    DuplicateCommand { path: String, name: String },
    /// A variadic positional is followed by another positional.
    #[error("variadic positional '{name}' in '{path}' must be the last positional")]
    VariadicNotLast { path: String, name: String },
}

/// Validates a specification tree.
///
/// Walks every node and collects every problem found; an empty vector means
/// the tree can be registered with a parser backend.
///
/// # Examples
///
/// ```
/// use cmdspec_core::*;
///
/// let mut root = SpecBuilder::new("app", "Demo");
/// let mut status = SpecBuilder::new("status", "Show status");
/// status.add_alias("list");
/// root.add_child(status);
/// root.add_child(SpecBuilder::new("list", "List things"));
///
/// let errors = validate_spec(&root.build());
/// assert!(matches!(errors[0], ValidationError::DuplicateCommand { .. }));
/// ```
pub fn validate_spec(spec: &SpecNode) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if spec.name.trim().is_empty() {
        errors.push(ValidationError::EmptyCommandName(String::new()));
    }

    let mut path = vec![spec.name.clone()];
    validate_node(spec, &mut path, &mut errors);

    errors
}

fn validate_node(node: &SpecNode, path: &mut Vec<String>, errors: &mut Vec<ValidationError>) {
    let here = path.join(" ");

    errors.extend(validate_flags(&node.flags, &here));
    errors.extend(validate_positionals(&node.positionals, &here));
    errors.extend(validate_parameter_names(node, &here));

    let mut seen: HashSet<&str> = HashSet::new();
    for child in &node.children {
        let name = child.name.trim();
        if name.is_empty() {
            errors.push(ValidationError::EmptyCommandName(here.clone()));
        } else if !seen.insert(name) {
            errors.push(ValidationError::DuplicateCommand {
                path: here.clone(),
                name: name.to_string(),
            });
        }

        for alias in &child.aliases {
            let alias = alias.trim();
            if alias.is_empty() {
                errors.push(ValidationError::EmptyAlias(format!("{here} {name}")));
            } else if !seen.insert(alias) {
                errors.push(ValidationError::DuplicateCommand {
                    path: here.clone(),
                    name: alias.to_string(),
                });
            }
        }

        path.push(name.to_string());
        validate_node(child, path, errors);
        path.pop();
    }
}

fn validate_flags(flags: &[FlagDefinition], path: &str) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for flag in flags {
        if flag.short.is_none() && flag.long.is_none() {
            errors.push(ValidationError::MissingFlagName {
                path: path.to_string(),
                name: flag.name.clone(),
            });
            continue;
        }

        if let Some(short) = &flag.short {
            if !short.starts_with('-') || short.starts_with("--") || short.chars().count() != 2 {
                errors.push(ValidationError::InvalidShortFlag {
                    path: path.to_string(),
                    flag: short.clone(),
                });
            } else if flag.short_char() == Some(HELP_SHORT) {
                errors.push(ValidationError::ReservedHelpFlag {
                    path: path.to_string(),
                    flag: short.clone(),
                });
            } else if !seen.insert(short.clone()) {
                errors.push(ValidationError::DuplicateFlag {
                    path: path.to_string(),
                    flag: short.clone(),
                });
            }
        }

        if let Some(long) = &flag.long {
            if !long.starts_with("--") || long.len() < 3 {
                errors.push(ValidationError::InvalidLongFlag {
                    path: path.to_string(),
                    flag: long.clone(),
                });
            } else if long == "--help" {
                errors.push(ValidationError::ReservedHelpFlag {
                    path: path.to_string(),
                    flag: long.clone(),
                });
            } else if !seen.insert(long.clone()) {
                errors.push(ValidationError::DuplicateFlag {
                    path: path.to_string(),
                    flag: long.clone(),
                });
            }
        }
    }

    errors
}

fn validate_positionals(positionals: &[PositionalDefinition], path: &str) -> Vec<ValidationError> {
    let last = positionals.len().saturating_sub(1);
    positionals
        .iter()
        .enumerate()
        .filter(|(index, p)| p.variadic && *index != last)
        .map(|(_, p)| ValidationError::VariadicNotLast {
            path: path.to_string(),
            name: p.name.clone(),
        })
        .collect()
}

fn validate_parameter_names(node: &SpecNode, path: &str) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    let names = node
        .flags
        .iter()
        .map(|f| f.name.as_str())
        .chain(node.positionals.iter().map(|p| p.name.as_str()));
    for name in names {
        if name == "help" {
            errors.push(ValidationError::ReservedHelpFlag {
                path: path.to_string(),
                flag: name.to_string(),
            });
        } else if !seen.insert(name) {
            errors.push(ValidationError::DuplicateParameter {
                path: path.to_string(),
                name: name.to_string(),
            });
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SpecBuilder, ValueType};

    #[test]
    fn test_accepts_valid_nested_spec() {
        let mut leaf = SpecBuilder::new("show", "Show");
        leaf.add_alias("sh");
        let mut mid = SpecBuilder::new("status", "Status");
        mid.add_child(leaf);
        let mut root = SpecBuilder::new("app", "Root");
        root.add_flag(FlagDefinition::switch("verbose").with_short('v'));
        root.add_child(mid);

        assert!(validate_spec(&root.build()).is_empty());
    }

    #[test]
    fn test_rejects_duplicate_short_flag() {
        let mut root = SpecBuilder::new("app", "Root");
        root.add_flag(FlagDefinition::switch("color").with_short('c'));
        root.add_flag(FlagDefinition::switch("c").short_only('c'));

        let errors = validate_spec(&root.build());
        assert_eq!(
            errors,
            vec![ValidationError::DuplicateFlag {
                path: "app".to_string(),
                flag: "-c".to_string()
            }]
        );
    }

    #[test]
    fn test_rejects_help_long_form() {
        let mut root = SpecBuilder::new("app", "Root");
        root.add_flag(FlagDefinition::switch("help"));

        let errors = validate_spec(&root.build());
        assert!(matches!(errors[0], ValidationError::ReservedHelpFlag { .. }));
    }

    #[test]
    fn test_rejects_alias_colliding_with_sibling_alias() {
        let mut first = SpecBuilder::new("delete", "Delete");
        first.add_alias("rm");
        let mut second = SpecBuilder::new("remove", "Remove");
        second.add_alias("rm");
        let mut root = SpecBuilder::new("app", "Root");
        root.add_child(first).add_child(second);

        let errors = validate_spec(&root.build());
        assert_eq!(
            errors,
            vec![ValidationError::DuplicateCommand {
                path: "app".to_string(),
                name: "rm".to_string()
            }]
        );
    }

    #[test]
    fn test_rejects_variadic_positional_not_last() {
        let mut leaf = SpecBuilder::new("copy", "Copy");
        leaf.add_positional(PositionalDefinition::new("sources", ValueType::List));
        leaf.add_positional(PositionalDefinition::new("dest", ValueType::String));
        let mut root = SpecBuilder::new("app", "Root");
        root.add_child(leaf);

        let errors = validate_spec(&root.build());
        assert_eq!(
            errors,
            vec![ValidationError::VariadicNotLast {
                path: "app copy".to_string(),
                name: "sources".to_string()
            }]
        );
    }

    #[test]
    fn test_collects_every_problem() {
        let mut copy = SpecBuilder::new("copy", "Copy");
        copy.add_flag(FlagDefinition::switch("host").with_short('h'));
        copy.add_positional(PositionalDefinition::new("sources", ValueType::List));
        copy.add_positional(PositionalDefinition::new("dest", ValueType::String));
        let mut root = SpecBuilder::new("app", "Root");
        root.add_flag(FlagDefinition::switch("color").with_short('c'));
        root.add_flag(FlagDefinition::switch("c").short_only('c'));
        root.add_child(copy).add_child(SpecBuilder::new("copy", "Again"));

        let errors = validate_spec(&root.build());
        assert_eq!(
            errors,
            vec![
                ValidationError::DuplicateFlag {
                    path: "app".to_string(),
                    flag: "-c".to_string()
                },
                ValidationError::ReservedHelpFlag {
                    path: "app copy".to_string(),
                    flag: "-h".to_string()
                },
                ValidationError::VariadicNotLast {
                    path: "app copy".to_string(),
                    name: "sources".to_string()
                },
                ValidationError::DuplicateCommand {
                    path: "app".to_string(),
                    name: "copy".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_rejects_empty_alias() {
        let mut leaf = SpecBuilder::new("copy", "Copy");
        leaf.add_alias(" ");
        let mut root = SpecBuilder::new("app", "Root");
        root.add_child(leaf);

        let errors = validate_spec(&root.build());
        assert_eq!(errors, vec![ValidationError::EmptyAlias("app copy".to_string())]);
    }
}
