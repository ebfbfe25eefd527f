//! Turns a handler graph into a specification tree and its dispatch bindings.
//!
//! Every handler becomes one [`SpecNode`]; its parameters are split into
//! positionals and flags and compiled with a fresh [`ShortNameAllocator`].
//! Each exposed operation or nested handler becomes a child node, and is
//! entered into the parent's dispatch map under its name and every alias.

use std::collections::BTreeMap;
use std::fmt;
use std::iter;
use std::rc::Rc;

use cmdspec_core::{
    ArgValue, CompiledParameter, ParameterDescriptor, ShortNameAllocator, SpecBuilder, SpecNode,
    compile_parameter,
};
use tracing::{debug, warn};

use crate::error::ConfigError;
use crate::handler::{Constructor, ErasedHandler, Handler, Invoker, Member};
use crate::metadata::{MetadataProvider, ParameterDeclaration};

/// A leaf operation paired with its node.
pub struct OperationBinding {
    pub node: Rc<SpecNode>,
    pub(crate) invoke: Invoker,
}

/// What a dispatch key resolves to.
#[derive(Clone)]
pub enum Target {
    Nested(Rc<HandlerBinding>),
    Operation(Rc<OperationBinding>),
}

impl Target {
    pub fn node(&self) -> &SpecNode {
        match self {
            Target::Nested(binding) => &binding.node,
            Target::Operation(op) => &op.node,
        }
    }

    /// Returns `true` if both targets are the same binding.
    pub fn same_as(&self, other: &Target) -> bool {
        match (self, other) {
            (Target::Nested(a), Target::Nested(b)) => Rc::ptr_eq(a, b),
            (Target::Operation(a), Target::Operation(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// A handler paired with its node and dispatch map.
///
/// The map holds one entry per child name and one per alias; aliases point
/// at the same target as the name.
pub struct HandlerBinding {
    pub node: Rc<SpecNode>,
    pub(crate) constructor: Constructor,
    pub operations: BTreeMap<String, Target>,
}

impl HandlerBinding {
    pub fn resolve(&self, selection: &str) -> Option<&Target> {
        self.operations.get(selection)
    }
}

impl fmt::Debug for HandlerBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerBinding")
            .field("node", &self.node.name)
            .field("operations", &self.operations.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// The adapted application: specification tree plus root binding.
pub struct CommandModel {
    pub spec: Rc<SpecNode>,
    pub root: Rc<HandlerBinding>,
}

/// Splits declarations into positionals and flags.
///
/// With `n` declarations of which `k` carry a default, the first `n - k`
/// become positionals and the last `k` become flags. The `k` defaults are
/// handed to those flags in declaration order, whichever declaration they
/// came from.
///
/// # Examples
///
/// ```
/// use cmdspec_core::{ArgValue, ParameterKind, ValueType};
/// use cmdspec_engine::{ParameterDeclaration, split_parameters};
///
/// let declared = [
///     ParameterDeclaration::required("name", ValueType::String),
///     ParameterDeclaration::optional("count", ValueType::Integer, 3),
/// ];
/// let split = split_parameters(&declared);
/// assert_eq!(split[0].kind, ParameterKind::Positional);
/// assert_eq!(split[1].kind, ParameterKind::Flag);
/// assert_eq!(split[1].default_value, Some(ArgValue::Int(3)));
/// ```
pub fn split_parameters(declarations: &[ParameterDeclaration]) -> Vec<ParameterDescriptor> {
    let defaults: Vec<ArgValue> = declarations
        .iter()
        .filter_map(|d| d.default.clone())
        .collect();
    let (positionals, flags) = declarations.split_at(declarations.len() - defaults.len());

    positionals
        .iter()
        .map(|d| ParameterDescriptor::positional(&d.name, d.declared_type.clone()))
        .chain(
            flags
                .iter()
                .zip(defaults)
                .map(|(d, default)| ParameterDescriptor::flag(&d.name, d.declared_type.clone(), default)),
        )
        .collect()
}

/// Splits a provider's parameters and attaches their `:param` help.
pub fn describe_parameters(metadata: &dyn MetadataProvider) -> Vec<ParameterDescriptor> {
    split_parameters(metadata.parameters())
        .into_iter()
        .map(|d| {
            let help = metadata.help_for(&d.name);
            d.with_help(&help)
        })
        .collect()
}

/// Adapts a root handler.
pub fn adapt<T: 'static>(handler: Handler<T>) -> Result<CommandModel, ConfigError> {
    let (builder, root) = adapt_handler(handler.into_erased())?;
    let spec = Rc::new(builder.build());
    debug!(command = %spec.name, children = spec.children.len(), "adapted handler graph");
    Ok(CommandModel { spec, root })
}

fn adapt_handler(handler: ErasedHandler) -> Result<(SpecBuilder, Rc<HandlerBinding>), ConfigError> {
    let mut builder = node_builder(handler.metadata.as_ref())?;
    let mut operations = BTreeMap::new();

    for member in handler.members {
        let metadata = member.metadata();
        if metadata.is_internal() {
            debug!(name = metadata.declared_name(), "skipping internal member");
            continue;
        }
        if metadata.is_excluded() {
            warn!(name = metadata.declared_name(), "member excluded from the command tree");
            continue;
        }

        let (child, target) = match member {
            Member::Child(nested) => {
                let (child, binding) = adapt_handler(nested)?;
                (child, Target::Nested(binding))
            }
            Member::Operation(op) => {
                let child = node_builder(op.metadata.as_ref())?;
                let node = Rc::new(child.build());
                let binding = OperationBinding {
                    node,
                    invoke: op.invoke,
                };
                (child, Target::Operation(Rc::new(binding)))
            }
        };

        for key in iter::once(child.name()).chain(child.aliases().iter().map(String::as_str)) {
            operations
                .entry(key.to_string())
                .or_insert_with(|| target.clone());
        }
        debug!(parent = builder.name(), child = child.name(), aliases = ?child.aliases(), "bound child");
        builder.add_child(child);
    }

    let node = Rc::new(builder.build());
    let binding = HandlerBinding {
        node,
        constructor: handler.constructor,
        operations,
    };
    Ok((builder, Rc::new(binding)))
}

fn node_builder(metadata: &dyn MetadataProvider) -> Result<SpecBuilder, ConfigError> {
    let help = metadata.help_string();
    if help.is_empty() {
        return Err(ConfigError::MissingDocumentation(
            metadata.declared_name().to_string(),
        ));
    }

    let mut builder = SpecBuilder::new(&metadata.command_name(), &help);
    for alias in metadata.aliases() {
        builder.add_alias(&alias);
    }

    let mut shorts = ShortNameAllocator::new();
    for descriptor in describe_parameters(metadata) {
        match compile_parameter(&descriptor, &mut shorts) {
            CompiledParameter::Flag(flag) => builder.add_flag(flag),
            CompiledParameter::Positional(positional) => builder.add_positional(positional),
        };
    }
    Ok(builder)
}
