//! [`ParserBackend`] on top of the clap builder API.

use std::collections::{BTreeMap, HashSet};
use std::iter;

use clap::error::ErrorKind;
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use cmdspec_core::{ArgValue, FlagDefinition, PositionalDefinition, ValueType};
use tracing::debug;

use crate::backend::ParserBackend;
use crate::error::{ConfigError, ParseFailure};
use crate::parsed::{ParsedArguments, ParsedScope};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Switch,
    Single,
    Many,
}

#[derive(Debug, Clone)]
struct Param {
    id: String,
    shape: Shape,
    value_type: ValueType,
    default: Option<ArgValue>,
}

impl Param {
    /// Reads this parameter back out of clap's matches.
    fn extract(&self, matches: &ArgMatches) -> Result<ArgValue, ParseFailure> {
        let fallback = || self.default.clone().unwrap_or(ArgValue::Null);
        let value = match self.shape {
            Shape::Switch => {
                let present = matches
                    .try_get_one::<bool>(&self.id)
                    .map_err(internal)?
                    .copied()
                    .unwrap_or(false);
                let default = self.default.as_ref().and_then(ArgValue::as_bool).unwrap_or(false);
                ArgValue::Bool(present || default)
            }
            Shape::Many => matches
                .try_get_many::<String>(&self.id)
                .map_err(internal)?
                .map(|values| ArgValue::List(values.cloned().collect()))
                .unwrap_or_else(fallback),
            Shape::Single if self.value_type == ValueType::Integer => matches
                .try_get_one::<i64>(&self.id)
                .map_err(internal)?
                .map(|v| ArgValue::Int(*v))
                .unwrap_or_else(fallback),
            Shape::Single => matches
                .try_get_one::<String>(&self.id)
                .map_err(internal)?
                .map(|v| ArgValue::Str(v.clone()))
                .unwrap_or_else(fallback),
        };
        Ok(value)
    }
}

fn internal(err: clap::parser::MatchesError) -> ParseFailure {
    ParseFailure::usage(format!("error: {err}"))
}

/// What the backend remembers about one scope to rebuild values per depth.
#[derive(Debug, Clone, Default)]
struct Layout {
    slot: Option<String>,
    params: Vec<Param>,
    children: BTreeMap<String, Layout>,
}

/// Clap-backed parser.
///
/// Every scope keeps clap's `-h`/`--help`; the `help` subcommand and the
/// version flag are disabled so they cannot shadow user commands.
#[derive(Debug, Clone)]
pub struct ClapBackend {
    command: Command,
    layout: Layout,
    taken: HashSet<String>,
}

impl ClapBackend {
    /// The configured clap command, for callers that want clap's own output.
    pub fn command(&self) -> &Command {
        &self.command
    }

    fn with_command(&mut self, f: impl FnOnce(Command) -> Command) {
        self.command = f(std::mem::take(&mut self.command));
    }

    fn claim(&mut self, key: String) -> Result<(), ConfigError> {
        if self.taken.insert(key.clone()) {
            Ok(())
        } else {
            Err(ConfigError::Backend {
                path: self.command.get_name().to_string(),
                reason: format!("'{key}' is registered twice"),
            })
        }
    }

    /// Converts a clap error, making sure every parse error carries usage.
    fn failure(&self, err: clap::Error) -> ParseFailure {
        let mut text = err.render().to_string();
        match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ParseFailure::help(text),
            _ => {
                if !text.contains("Usage:") {
                    text.push('\n');
                    text.push_str(&self.command.clone().render_usage().to_string());
                }
                ParseFailure::usage(text)
            }
        }
    }

    fn argv(&self, args: &[String]) -> Vec<String> {
        iter::once(self.command.get_name().to_string())
            .chain(args.iter().cloned())
            .collect()
    }
}

fn typed(arg: Arg, value_type: &ValueType) -> Arg {
    match value_type {
        ValueType::Integer => arg.value_parser(value_parser!(i64)),
        _ => arg.value_parser(value_parser!(String)),
    }
}

fn collect(layout: &Layout, matches: &ArgMatches, parsed: &mut ParsedArguments) -> Result<(), ParseFailure> {
    let mut scope = ParsedScope::new(layout.slot.as_deref());
    for param in &layout.params {
        scope.values.insert(param.id.clone(), param.extract(matches)?);
    }

    let selected = matches.subcommand();
    scope.selection = selected.map(|(name, _)| name.to_string());
    parsed.push_scope(scope);

    if let Some((name, sub_matches)) = selected {
        if let Some(child) = layout.children.get(name) {
            collect(child, sub_matches, parsed)?;
        }
    }
    Ok(())
}

impl ParserBackend for ClapBackend {
    fn scope(name: &str, description: &str) -> Self {
        let command = Command::new(name.to_string())
            .about(description.to_string())
            .disable_help_subcommand(true)
            .disable_version_flag(true);
        Self {
            command,
            layout: Layout::default(),
            taken: HashSet::new(),
        }
    }

    fn register_flag(&mut self, flag: &FlagDefinition) -> Result<(), ConfigError> {
        for form in flag.names() {
            self.claim(form.to_string())?;
        }
        self.claim(flag.name.clone())?;

        let mut arg = Arg::new(flag.name.clone())
            .help(flag.help.clone())
            .required(flag.required);
        if let Some(long) = flag.long_name() {
            arg = arg.long(long.to_string());
        }
        if let Some(short) = flag.short_char() {
            arg = arg.short(short);
        }

        let shape = if flag.is_switch {
            arg = arg.action(ArgAction::SetTrue);
            Shape::Switch
        } else {
            arg = typed(arg, &flag.value_type).value_name(flag.name.to_uppercase());
            if let Some(literal) = flag.default_value.as_ref().and_then(ArgValue::to_literal) {
                arg = arg.default_value(literal);
            }
            if flag.variadic {
                arg = arg.action(ArgAction::Set).num_args(1..);
                Shape::Many
            } else {
                arg = arg.action(ArgAction::Set);
                Shape::Single
            }
        };

        self.with_command(|command| command.arg(arg));
        self.layout.params.push(Param {
            id: flag.name.clone(),
            shape,
            value_type: flag.value_type.clone(),
            default: flag.default_value.clone(),
        });
        Ok(())
    }

    fn register_positional(
        &mut self,
        index: usize,
        positional: &PositionalDefinition,
    ) -> Result<(), ConfigError> {
        self.claim(positional.name.clone())?;

        let mut arg = typed(Arg::new(positional.name.clone()), &positional.value_type)
            .help(positional.help.clone())
            .value_name(positional.metavar())
            .required(true)
            .index(index + 1);
        let shape = if positional.variadic {
            arg = arg.action(ArgAction::Set).num_args(1..);
            Shape::Many
        } else {
            arg = arg.action(ArgAction::Set);
            Shape::Single
        };

        self.with_command(|command| command.arg(arg));
        self.layout.params.push(Param {
            id: positional.name.clone(),
            shape,
            value_type: positional.value_type.clone(),
            default: None,
        });
        Ok(())
    }

    fn register_sub_selector(&mut self, slot: &str) -> Result<(), ConfigError> {
        self.layout.slot = Some(slot.to_string());
        // A variadic positional stops at the first command name.
        self.with_command(|command| command.subcommand_precedence_over_arg(true));
        Ok(())
    }

    fn register_choice(
        &mut self,
        name: &str,
        aliases: &[String],
        nested: Self,
    ) -> Result<(), ConfigError> {
        if self.layout.slot.is_none() {
            return Err(ConfigError::Backend {
                path: self.command.get_name().to_string(),
                reason: format!("choice '{name}' registered before a selector"),
            });
        }
        for key in iter::once(name).chain(aliases.iter().map(String::as_str)) {
            self.claim(format!("command:{key}"))?;
        }

        let sub = nested.command.visible_aliases(aliases.to_vec());
        self.with_command(|command| command.subcommand(sub));
        self.layout.children.insert(name.to_string(), nested.layout);
        Ok(())
    }

    fn parse(&self, argv: &[String]) -> Result<ParsedArguments, ParseFailure> {
        let matches = self
            .command
            .clone()
            .try_get_matches_from(self.argv(argv))
            .map_err(|err| self.failure(err))?;

        let mut parsed = ParsedArguments::new();
        collect(&self.layout, &matches, &mut parsed)?;
        debug!(path = ?parsed.selected_path(), "parsed command line");
        Ok(parsed)
    }

    fn usage(&self, path: &[String]) -> String {
        let mut args = path.to_vec();
        args.push("--help".to_string());
        match self.command.clone().try_get_matches_from(self.argv(&args)) {
            Err(err) if err.kind() == ErrorKind::DisplayHelp => err.render().to_string(),
            _ => self.command.clone().render_usage().to_string(),
        }
    }
}
