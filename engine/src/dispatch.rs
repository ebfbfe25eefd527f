//! Resolution of parsed arguments against a handler graph.
//!
//! The dispatcher walks the bindings one depth at a time. At every level it
//! constructs the handler from that level's arguments, reads the selection
//! recorded for the level and moves on to the selected child, handing the
//! new instance down as the child's receiver. A selected operation ends the
//! walk and is invoked on the last instance.

use std::any::Any;

use serde_json::Value;
use tracing::{debug, info};

use crate::adapter::{CommandModel, HandlerBinding, OperationBinding, Target};
use crate::error::DispatchError;
use crate::handler::Arguments;
use crate::parsed::ParsedArguments;

/// Result of a completed dispatch.
pub struct Outcome {
    /// Canonical names of the selected commands, root excluded.
    pub path: Vec<String>,
    /// Value returned by the terminal operation, if one ran and returned.
    pub output: Option<Value>,
    /// The deepest handler instance constructed.
    pub instance: Box<dyn Any>,
}

impl Outcome {
    /// Borrows the final instance as `T`.
    pub fn instance<T: 'static>(&self) -> Option<&T> {
        self.instance.downcast_ref::<T>()
    }
}

impl std::fmt::Debug for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Outcome")
            .field("path", &self.path)
            .field("output", &self.output)
            .finish_non_exhaustive()
    }
}

enum State<'m> {
    AtNode {
        binding: &'m HandlerBinding,
        depth: usize,
        receiver: Option<Box<dyn Any>>,
    },
    Resolved {
        instance: Box<dyn Any>,
        operation: Option<(&'m OperationBinding, usize)>,
    },
    Failed(DispatchError),
}

/// Walks a [`CommandModel`] for one set of parsed arguments.
pub struct Dispatcher<'m> {
    model: &'m CommandModel,
}

impl<'m> Dispatcher<'m> {
    pub fn new(model: &'m CommandModel) -> Self {
        Self { model }
    }

    /// Runs the walk to completion.
    ///
    /// Exactly one constructor runs per level on the selected path, root
    /// first, followed by at most one operation.
    pub fn dispatch(&self, parsed: &ParsedArguments) -> Result<Outcome, DispatchError> {
        let model = self.model;
        let mut path = Vec::new();
        let mut state = State::AtNode {
            binding: model.root.as_ref(),
            depth: 0,
            receiver: None,
        };

        loop {
            state = match state {
                State::AtNode {
                    binding,
                    depth,
                    receiver,
                } => step(binding, depth, receiver, parsed, &mut path),
                State::Resolved {
                    instance,
                    operation,
                } => return finish(instance, operation, parsed, path),
                State::Failed(err) => return Err(err),
            };
        }
    }
}

fn step<'m>(
    binding: &'m HandlerBinding,
    depth: usize,
    receiver: Option<Box<dyn Any>>,
    parsed: &ParsedArguments,
    path: &mut Vec<String>,
) -> State<'m> {
    let Some(scope) = parsed.scope(depth) else {
        return State::Failed(DispatchError::MissingScope(depth));
    };

    let args = Arguments::for_node(&binding.node, scope);
    debug!(command = %binding.node.name, depth, "constructing handler");
    let instance = match (binding.constructor)(receiver.as_deref(), &args) {
        Ok(instance) => instance,
        Err(err) => return State::Failed(err),
    };

    if binding.operations.is_empty() {
        return State::Resolved {
            instance,
            operation: None,
        };
    }

    let selection = scope.selection.as_deref();
    match selection.and_then(|s| binding.resolve(s)) {
        None => State::Failed(DispatchError::InvalidSelection {
            path: path.clone(),
            selection: selection.map(str::to_string),
        }),
        Some(Target::Nested(child)) => {
            path.push(child.node.name.clone());
            State::AtNode {
                binding: child.as_ref(),
                depth: depth + 1,
                receiver: Some(instance),
            }
        }
        Some(Target::Operation(op)) => {
            path.push(op.node.name.clone());
            State::Resolved {
                instance,
                operation: Some((op.as_ref(), depth + 1)),
            }
        }
    }
}

fn finish(
    instance: Box<dyn Any>,
    operation: Option<(&OperationBinding, usize)>,
    parsed: &ParsedArguments,
    path: Vec<String>,
) -> Result<Outcome, DispatchError> {
    let output = match operation {
        Some((op, depth)) => {
            let scope = parsed.scope(depth).ok_or(DispatchError::MissingScope(depth))?;
            let args = Arguments::for_node(&op.node, scope);
            debug!(operation = %op.node.name, "invoking operation");
            (op.invoke)(instance.as_ref(), &args)?
        }
        None => None,
    };

    info!(path = %path.join(" "), "dispatched");
    Ok(Outcome {
        path,
        output,
        instance,
    })
}
