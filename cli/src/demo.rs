//! Bundled demonstration application.
//!
//! ```text
//! testapp [--debug]
//! ├── foo [--suffix-one TEXT]
//! ├── validate-config [--path FILE]
//! ├── echo (say) WORDS...
//! └── subcommandclass [--debug]
//!     ├── bar [--prefix TEXT]
//!     └── baz [--debug]
//!         └── barry [--prefix TEXT]
//! ```

use std::path::PathBuf;

use cmdspec_core::{ArgValue, ValueType};
use cmdspec_engine::{EngineConfig, Handler, HandlerMetadata};
use serde_json::Value;
use tracing::{debug, info};

pub const APP_NAME: &str = "testapp";

pub struct TestApp {
    debug: bool,
}

pub struct SubcommandClass {
    debug: bool,
}

pub struct Baz {
    debug: bool,
}

/// Builds the demo handler graph.
pub fn app() -> Handler<TestApp> {
    Handler::root(
        HandlerMetadata::new(
            "TestApp",
            "CLI app for exercising the command engine\n:param debug: Enable debug output",
        )
        .param_with_default("debug", ValueType::Boolean, false),
        |args| {
            let enabled = args.switch("debug")?;
            debug!(enabled, "constructed top level handler");
            Ok(TestApp { debug: enabled })
        },
    )
    .operation(
        HandlerMetadata::new("foo", "Foo command\n:param suffix_one: Text appended to the greeting")
            .param_with_default("suffix_one", ValueType::String, "Default Suffix"),
        |_, args| {
            let suffix = args.string("suffix_one")?;
            info!("Foo! {suffix}.");
            Ok(Some(Value::String(format!("Foo! {suffix}."))))
        },
    )
    .operation(
        HandlerMetadata::new(
            "validate_config",
            "Load and validate an engine configuration file\n:param path: YAML file to check",
        )
        .param_with_default("path", ValueType::String, ArgValue::Null),
        validate_config,
    )
    .operation(
        HandlerMetadata::new("echo", "Echo words back as a list\n:alias say:\n:param words: Words to echo")
            .param("words", ValueType::List),
        |_, args| Ok(Some(serde_json::to_value(args.list("words")?)?)),
    )
    .operation(
        HandlerMetadata::new("_reset", "Internal reset hook"),
        |_, _| Ok(None),
    )
    .operation(
        HandlerMetadata::new("legacy", "Removed command\n:easycli_ignore:"),
        |_, _| Ok(None),
    )
    .child(subcommand_class())
}

fn validate_config(app: &TestApp, args: &cmdspec_engine::Arguments) -> anyhow::Result<Option<Value>> {
    let config = match args.optional_string("path")? {
        Some(path) => EngineConfig::load(PathBuf::from(path))?,
        None => EngineConfig::default(),
    };
    debug!(debug = app.debug, ?config, "validated configuration");
    Ok(Some(serde_json::to_value(&config)?))
}

fn subcommand_class() -> Handler<SubcommandClass, TestApp> {
    Handler::nested(
        HandlerMetadata::new("SubcommandClass", "A subcommand class\n:param debug: Enable debug output")
            .param_with_default("debug", ValueType::Boolean, false),
        |parent: &TestApp, args| {
            Ok(SubcommandClass {
                debug: parent.debug || args.switch("debug")?,
            })
        },
    )
    .operation(
        HandlerMetadata::new("bar", "Bar command\n:param prefix: Text printed before the greeting")
            .param_with_default("prefix", ValueType::String, "Default Prefix"),
        |this, args| {
            let prefix = args.string("prefix")?;
            debug!(debug = this.debug, "running bar");
            Ok(Some(Value::String(format!("{prefix}. Bar!"))))
        },
    )
    .child(baz())
}

fn baz() -> Handler<Baz, SubcommandClass> {
    Handler::nested(
        HandlerMetadata::new("Baz", "More nesting\n:param debug: Enable debug output")
            .param_with_default("debug", ValueType::Boolean, false),
        |parent: &SubcommandClass, args| {
            Ok(Baz {
                debug: parent.debug || args.switch("debug")?,
            })
        },
    )
    .operation(
        HandlerMetadata::new("barry", "Barry command\n:param prefix: Text printed before the greeting")
            .param_with_default("prefix", ValueType::String, "Default Prefix"),
        |this, args| {
            let prefix = args.string("prefix")?;
            debug!(debug = this.debug, "running barry");
            Ok(Some(Value::String(format!("{prefix}. BarBaz!"))))
        },
    )
}
