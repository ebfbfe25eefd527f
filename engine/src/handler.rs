//! Handler graph declaration.
//!
//! An application declares its commands as a tree of [`Handler`]s. Each
//! handler has metadata (name, description, parameters) and a constructor
//! that builds a handler instance from its matched arguments. A handler
//! exposes operations (leaf commands invoked on its instance) and nested
//! child handlers, whose constructors receive the parent instance.
//!
//! ```
//! use cmdspec_core::ValueType;
//! use cmdspec_engine::{Handler, HandlerMetadata};
//!
//! struct App { verbose: bool }
//! struct Status { verbose: bool }
//!
//! let status = Handler::nested(
//!     HandlerMetadata::new("status", "Inspect status"),
//!     |app: &App, _args| Ok(Status { verbose: app.verbose }),
//! )
//! .operation(HandlerMetadata::new("show", "Show the status"), |status, _args| {
//!     Ok(Some(serde_json::json!({ "verbose": status.verbose })))
//! });
//!
//! let app = Handler::root(
//!     HandlerMetadata::new("app", "Demo application")
//!         .param_with_default("verbose", ValueType::Boolean, false),
//!     |args| Ok(App { verbose: args.switch("verbose")? }),
//! )
//! .child(status);
//! # let _ = app;
//! ```

use std::any::{Any, type_name};
use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::rc::Rc;

use cmdspec_core::{ArgValue, SpecNode};
use serde_json::Value;

use crate::error::{ArgumentError, DispatchError};
use crate::metadata::MetadataProvider;
use crate::parsed::ParsedScope;

pub(crate) type Constructor =
    Rc<dyn Fn(Option<&dyn Any>, &Arguments) -> Result<Box<dyn Any>, DispatchError>>;

pub(crate) type Invoker = Rc<dyn Fn(&dyn Any, &Arguments) -> Result<Option<Value>, DispatchError>>;

/// Arguments handed to a constructor or operation.
///
/// Positionals keep their declaration order; flags are keyed by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    positionals: Vec<(String, ArgValue)>,
    flags: BTreeMap<String, ArgValue>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_positional(mut self, name: &str, value: impl Into<ArgValue>) -> Self {
        self.positionals.push((name.to_string(), value.into()));
        self
    }

    pub fn with_flag(mut self, name: &str, value: impl Into<ArgValue>) -> Self {
        self.flags.insert(name.to_string(), value.into());
        self
    }

    /// Picks this node's parameters out of a parsed scope.
    ///
    /// Flags that were not parsed fall back to their default, positionals to
    /// `Null`.
    pub(crate) fn for_node(node: &SpecNode, scope: &ParsedScope) -> Self {
        let positionals = node
            .positionals
            .iter()
            .map(|p| {
                let value = scope.values.get(&p.name).cloned().unwrap_or(ArgValue::Null);
                (p.name.clone(), value)
            })
            .collect();
        let flags = node
            .flags
            .iter()
            .map(|f| {
                let value = scope
                    .values
                    .get(&f.name)
                    .or(f.default_value.as_ref())
                    .cloned()
                    .unwrap_or(ArgValue::Null);
                (f.name.clone(), value)
            })
            .collect();
        Self { positionals, flags }
    }

    pub fn positionals(&self) -> &[(String, ArgValue)] {
        &self.positionals
    }

    pub fn flags(&self) -> &BTreeMap<String, ArgValue> {
        &self.flags
    }

    pub fn get(&self, name: &str) -> Result<&ArgValue, ArgumentError> {
        self.positionals
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
            .or_else(|| self.flags.get(name))
            .ok_or_else(|| ArgumentError::Missing(name.to_string()))
    }

    pub fn string(&self, name: &str) -> Result<String, ArgumentError> {
        let value = self.get(name)?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| wrong_type(name, "string", value))
    }

    /// Like [`Arguments::string`], but `Null` reads as `None`.
    pub fn optional_string(&self, name: &str) -> Result<Option<String>, ArgumentError> {
        match self.get(name)? {
            ArgValue::Null => Ok(None),
            ArgValue::Str(s) => Ok(Some(s.clone())),
            other => Err(wrong_type(name, "string", other)),
        }
    }

    pub fn integer(&self, name: &str) -> Result<i64, ArgumentError> {
        let value = self.get(name)?;
        value.as_int().ok_or_else(|| wrong_type(name, "integer", value))
    }

    pub fn switch(&self, name: &str) -> Result<bool, ArgumentError> {
        let value = self.get(name)?;
        value.as_bool().ok_or_else(|| wrong_type(name, "boolean", value))
    }

    /// List values; `Null` reads as an empty list.
    pub fn list(&self, name: &str) -> Result<Vec<String>, ArgumentError> {
        match self.get(name)? {
            ArgValue::Null => Ok(Vec::new()),
            ArgValue::List(items) => Ok(items.clone()),
            other => Err(wrong_type(name, "list", other)),
        }
    }
}

fn wrong_type(name: &str, expected: &'static str, found: &ArgValue) -> ArgumentError {
    ArgumentError::WrongType {
        name: name.to_string(),
        expected,
        found: found.kind(),
    }
}

pub(crate) struct OperationDecl {
    pub(crate) metadata: Box<dyn MetadataProvider>,
    pub(crate) invoke: Invoker,
}

pub(crate) enum Member {
    Operation(OperationDecl),
    Child(ErasedHandler),
}

impl Member {
    pub(crate) fn metadata(&self) -> &dyn MetadataProvider {
        match self {
            Member::Operation(op) => op.metadata.as_ref(),
            Member::Child(child) => child.metadata.as_ref(),
        }
    }
}

pub(crate) struct ErasedHandler {
    pub(crate) metadata: Box<dyn MetadataProvider>,
    pub(crate) constructor: Constructor,
    pub(crate) members: Vec<Member>,
}

/// A handler producing instances of `T`, nested under a parent of type `P`.
///
/// Root handlers have `P = ()`. Operations and children are exposed in the
/// order they are added.
pub struct Handler<T, P = ()> {
    inner: ErasedHandler,
    _marker: PhantomData<fn(&P) -> T>,
}

impl<T: 'static> Handler<T, ()> {
    /// A root handler, constructed from its own arguments only.
    pub fn root<M, F>(metadata: M, construct: F) -> Self
    where
        M: MetadataProvider + 'static,
        F: Fn(&Arguments) -> anyhow::Result<T> + 'static,
    {
        let constructor: Constructor = Rc::new(move |_receiver: Option<&dyn Any>, args: &Arguments| {
            let instance = construct(args)?;
            Ok(Box::new(instance) as Box<dyn Any>)
        });
        Self::from_parts(metadata, constructor)
    }
}

impl<T: 'static, P: 'static> Handler<T, P> {
    /// A child handler, constructed from the parent instance and its own
    /// arguments.
    pub fn nested<M, F>(metadata: M, construct: F) -> Self
    where
        M: MetadataProvider + 'static,
        F: Fn(&P, &Arguments) -> anyhow::Result<T> + 'static,
    {
        let constructor: Constructor = Rc::new(move |receiver: Option<&dyn Any>, args: &Arguments| {
            let parent = receiver
                .and_then(|r| r.downcast_ref::<P>())
                .ok_or(DispatchError::ReceiverMismatch {
                    expected: type_name::<P>(),
                })?;
            let instance = construct(parent, args)?;
            Ok(Box::new(instance) as Box<dyn Any>)
        });
        Self::from_parts(metadata, constructor)
    }

    fn from_parts<M: MetadataProvider + 'static>(metadata: M, constructor: Constructor) -> Self {
        Self {
            inner: ErasedHandler {
                metadata: Box::new(metadata),
                constructor,
                members: Vec::new(),
            },
            _marker: PhantomData,
        }
    }

    /// Adds a leaf operation invoked on this handler's instance.
    ///
    /// The returned value, if any, is what result reporting prints.
    pub fn operation<M, F>(mut self, metadata: M, invoke: F) -> Self
    where
        M: MetadataProvider + 'static,
        F: Fn(&T, &Arguments) -> anyhow::Result<Option<Value>> + 'static,
    {
        let invoke: Invoker = Rc::new(move |receiver: &dyn Any, args: &Arguments| {
            let instance = receiver
                .downcast_ref::<T>()
                .ok_or(DispatchError::ReceiverMismatch {
                    expected: type_name::<T>(),
                })?;
            Ok(invoke(instance, args)?)
        });
        self.inner.members.push(Member::Operation(OperationDecl {
            metadata: Box::new(metadata),
            invoke,
        }));
        self
    }

    /// Adds a nested handler that receives this handler's instance.
    pub fn child<C: 'static>(mut self, child: Handler<C, T>) -> Self {
        self.inner.members.push(Member::Child(child.inner));
        self
    }

    pub fn metadata(&self) -> &dyn MetadataProvider {
        self.inner.metadata.as_ref()
    }

    pub(crate) fn into_erased(self) -> ErasedHandler {
        self.inner
    }
}
