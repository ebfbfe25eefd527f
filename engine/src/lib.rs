//! Compile handler graphs into command-line parsers and dispatch them.
//!
//! An application describes its commands as a tree of [`Handler`]s. The
//! engine turns that tree into a [`SpecNode`](cmdspec_core::SpecNode) tree
//! ([`adapt`]), registers it with a [`ParserBackend`] ([`compile_parser`]),
//! parses a command line into [`ParsedArguments`] and walks the handler tree
//! with a [`Dispatcher`], constructing one handler per level and invoking the
//! selected operation.
//!
//! [`Engine`] ties the stages together:
//!
//! ```
//! use cmdspec_core::ValueType;
//! use cmdspec_engine::{Engine, Handler, HandlerMetadata, ReportOptions};
//!
//! struct Widgets { name: String, count: i64 }
//!
//! let handler = Handler::root(
//!     HandlerMetadata::new("widgets", "Manage widgets")
//!         .param("name", ValueType::String)
//!         .param_with_default("count", ValueType::Integer, 3),
//!     |args| Ok(Widgets { name: args.string("name")?, count: args.integer("count")? }),
//! );
//!
//! let engine = Engine::new(handler, ReportOptions::default()).unwrap();
//! let run = engine.execute(["widget", "-c", "5"]).unwrap();
//! let widgets = run.outcome.instance::<Widgets>().unwrap();
//! assert_eq!((widgets.name.as_str(), widgets.count), ("widget", 5));
//! ```

mod adapter;
mod backend;
mod clap_backend;
mod config;
mod dispatch;
mod engine;
mod error;
mod handler;
mod metadata;
mod parsed;
mod report;

pub use adapter::{
    CommandModel, HandlerBinding, OperationBinding, Target, adapt, describe_parameters,
    split_parameters,
};
pub use backend::{ParserBackend, compile_parser};
pub use clap_backend::ClapBackend;
pub use config::{EngineConfig, LogConfig};
pub use dispatch::{Dispatcher, Outcome};
pub use engine::{Engine, Execution};
pub use error::{
    ArgumentError, ConfigError, ConfigFileError, DispatchError, EngineError, ParseFailure,
    ParseFailureKind, ReportError,
};
pub use handler::{Arguments, Handler};
pub use metadata::{HandlerMetadata, MetadataProvider, ParameterDeclaration};
pub use parsed::{ParsedArguments, ParsedScope, ROOT_SLOT};
pub use report::{ReportOptions, ResultFormat, render_result};
