use std::cell::RefCell;
use std::rc::Rc;

use cmdspec_core::{ArgValue, ParameterKind, SpecBuilder, ValueType, validate_spec};
use cmdspec_engine::{
    ConfigError, Engine, EngineError, Handler, HandlerMetadata, ParameterDeclaration,
    ParseFailureKind, ReportOptions, ResultFormat, split_parameters,
};

type Log = Rc<RefCell<Vec<String>>>;

fn new_log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

fn entries(log: &Log) -> Vec<String> {
    log.borrow().clone()
}

struct Root {
    verbose: bool,
    log: Log,
}

struct Status {
    verbose: bool,
    log: Log,
}

/// root(verbose=false) -> status -> show, with `st` as an alias of status.
fn status_app(log: &Log) -> Engine {
    let status = Handler::nested(
        HandlerMetadata::new("status", "Inspect status\n:alias st:"),
        |root: &Root, _| {
            root.log.borrow_mut().push("construct status".into());
            Ok(Status {
                verbose: root.verbose,
                log: root.log.clone(),
            })
        },
    )
    .operation(
        HandlerMetadata::new("show", "Show the status\n:param limit: Lines to show")
            .param_with_default("limit", ValueType::Integer, 10),
        |status, args| {
            let limit = args.integer("limit")?;
            status
                .log
                .borrow_mut()
                .push(format!("show verbose={} limit={limit}", status.verbose));
            Ok(Some(serde_json::json!({ "verbose": status.verbose, "limit": limit })))
        },
    );

    let root_log = log.clone();
    let root = Handler::root(
        HandlerMetadata::new("app", "Demo application\n:param verbose: Chatty output")
            .param_with_default("verbose", ValueType::Boolean, false),
        move |args| {
            let verbose = args.switch("verbose")?;
            root_log.borrow_mut().push(format!("construct app verbose={verbose}"));
            Ok(Root {
                verbose,
                log: root_log.clone(),
            })
        },
    )
    .child(status);

    Engine::new(root, ReportOptions::printing(ResultFormat::Json)).unwrap()
}

#[test]
fn scenario_a_nested_operation_sees_root_default() {
    let log = new_log();
    let run = status_app(&log).execute(["status", "show"]).unwrap();

    assert_eq!(run.outcome.path, vec!["status", "show"]);
    assert_eq!(
        entries(&log),
        vec![
            "construct app verbose=false",
            "construct status",
            "show verbose=false limit=10",
        ]
    );
}

#[test]
fn scenario_b_positional_and_integer_flag() {
    let calls = new_log();
    let seen = calls.clone();
    let handler = Handler::root(
        HandlerMetadata::new("widgets", "Manage widgets")
            .param("name", ValueType::String)
            .param_with_default("count", ValueType::Integer, 3),
        move |args| {
            seen.borrow_mut().push(format!(
                "name={} count={}",
                args.string("name")?,
                args.integer("count")?
            ));
            Ok(())
        },
    );
    let engine = Engine::new(handler, ReportOptions::default()).unwrap();

    let spec = engine.spec();
    assert_eq!(spec.positionals[0].name, "name");
    let count = spec.find_flag("--count").unwrap();
    assert_eq!(count.short.as_deref(), Some("-c"));
    assert_eq!(count.default_value, Some(ArgValue::Int(3)));

    engine.execute(["widget", "--count", "5"]).unwrap();
    engine.execute(["gadget"]).unwrap();
    assert_eq!(entries(&calls), vec!["name=widget count=5", "name=gadget count=3"]);

    let err = engine.execute(Vec::<String>::new()).unwrap_err();
    assert!(matches!(err, EngineError::Usage(ref f) if f.exit_code() == 1));
}

#[test]
fn scenario_c_short_forms_skip_taken_characters() {
    let handler = Handler::root(
        HandlerMetadata::new("pack", "Pack files")
            .param_with_default("color", ValueType::Boolean, false)
            .param_with_default("compress", ValueType::Boolean, false)
            .param_with_default("oc", ValueType::Boolean, false),
        |_| Ok(()),
    );
    let engine = Engine::new(handler, ReportOptions::default()).unwrap();
    let shorts: Vec<_> = engine
        .spec()
        .flags
        .iter()
        .map(|f| (f.name.as_str(), f.short.as_deref()))
        .collect();

    assert_eq!(
        shorts,
        vec![("color", Some("-c")), ("compress", Some("-o")), ("oc", None)]
    );
}

#[test]
fn scenario_d_help_at_any_depth_constructs_nothing() {
    for argv in [vec!["--help"], vec!["status", "--help"], vec!["status", "show", "-h"]] {
        let log = new_log();
        let err = status_app(&log).execute(argv.clone()).unwrap_err();

        let EngineError::Usage(failure) = err else {
            panic!("expected help for {argv:?}");
        };
        assert_eq!(failure.kind(), ParseFailureKind::Help);
        assert_eq!(failure.exit_code(), 0);
        assert!(failure.message().contains("Usage"));
        assert!(entries(&log).is_empty(), "{argv:?} constructed a handler");
    }
}

#[test]
fn scenario_e_unknown_command_exits_one() {
    let log = new_log();
    let err = status_app(&log).execute(["unknown-command"]).unwrap_err();

    let EngineError::Usage(failure) = err else {
        panic!("expected a usage failure");
    };
    assert_eq!(failure.exit_code(), 1);
    assert!(failure.message().contains("Usage"));
    assert!(entries(&log).is_empty());
}

#[test]
fn p1_split_counts_trailing_defaults() {
    let declared = vec![
        ParameterDeclaration::required("a", ValueType::String),
        ParameterDeclaration::optional("b", ValueType::String, "x"),
        ParameterDeclaration::required("c", ValueType::String),
        ParameterDeclaration::optional("d", ValueType::Integer, 1),
        ParameterDeclaration::optional("e", ValueType::Boolean, false),
    ];
    let n = declared.len();
    let k = declared.iter().filter(|d| d.has_default()).count();

    let kinds: Vec<_> = split_parameters(&declared).into_iter().map(|d| d.kind).collect();
    assert_eq!(kinds[..n - k], vec![ParameterKind::Positional; n - k][..]);
    assert_eq!(kinds[n - k..], vec![ParameterKind::Flag; k][..]);
}

#[test]
fn p2_short_forms_are_unique_and_never_h() {
    let handler = Handler::root(
        HandlerMetadata::new("hosts", "Manage hosts")
            .param_with_default("host", ValueType::String, "localhost")
            .param_with_default("hops", ValueType::Integer, 3)
            .param_with_default("hush", ValueType::Boolean, false)
            .param_with_default("ohs", ValueType::Boolean, false),
        |_| Ok(()),
    );
    let engine = Engine::new(handler, ReportOptions::default()).unwrap();

    let shorts: Vec<&str> = engine
        .spec()
        .flags
        .iter()
        .filter_map(|f| f.short.as_deref())
        .collect();
    let mut unique = shorts.clone();
    unique.sort_unstable();
    unique.dedup();
    assert_eq!(unique.len(), shorts.len());
    assert!(!shorts.contains(&"-h"));
    assert!(validate_spec(engine.spec()).is_empty());
}

#[test]
fn p3_alias_reaches_the_same_binding() {
    let by_name = new_log();
    let by_alias = new_log();

    let name_engine = status_app(&by_name);
    let alias_engine = status_app(&by_alias);
    let a = name_engine.execute(["-v", "status", "show", "-l", "4"]).unwrap();
    let b = alias_engine.execute(["-v", "st", "show", "-l", "4"]).unwrap();

    assert_eq!(a.outcome.path, b.outcome.path);
    assert_eq!(a.report, b.report);
    assert_eq!(entries(&by_name), entries(&by_alias));

    let ops = &name_engine.model().root.operations;
    assert!(ops["st"].same_as(&ops["status"]));
}

#[test]
fn p4_build_is_idempotent() {
    let mut leaf = SpecBuilder::new("show", "Show");
    leaf.add_alias("sh").add_alias("sh");
    let mut root = SpecBuilder::new("app", "App");
    root.add_child(leaf);

    let first = root.build();
    let second = root.build();
    assert_eq!(first, second);
    assert_eq!(first.children[0].aliases, vec!["sh"]);
}

#[test]
fn p5_one_constructor_per_level_in_order() {
    let log = new_log();
    status_app(&log).execute(["status", "show"]).unwrap();

    let constructed: Vec<_> = entries(&log)
        .into_iter()
        .filter(|e| e.starts_with("construct"))
        .collect();
    assert_eq!(constructed, vec!["construct app verbose=false", "construct status"]);
    assert_eq!(entries(&log).iter().filter(|e| e.starts_with("show")).count(), 1);
    assert!(entries(&log).last().unwrap().starts_with("show"));
}

#[test]
fn variadic_constructor_parameter_leaves_room_for_a_command() {
    struct Files(Vec<String>);

    let handler = Handler::root(
        HandlerMetadata::new("app", "App").param("files", ValueType::List),
        |args| Ok(Files(args.list("files")?)),
    )
    .operation(HandlerMetadata::new("show", "Show the files"), |files, _| {
        Ok(Some(serde_json::json!(files.0)))
    });
    let engine = Engine::new(handler, ReportOptions::printing(ResultFormat::Json)).unwrap();

    let run = engine.execute(["a", "b", "show"]).unwrap();
    assert_eq!(run.outcome.path, vec!["show"]);
    assert_eq!(run.report.as_deref(), Some(r#"["a","b"]"#));
}

#[test]
fn colliding_aliases_are_a_configuration_error() {
    let handler = Handler::root(HandlerMetadata::new("app", "App"), |_| Ok(()))
        .operation(HandlerMetadata::new("delete", "Delete\n:alias rm:"), |_, _| Ok(None))
        .operation(HandlerMetadata::new("remove", "Remove\n:alias rm:"), |_, _| Ok(None));

    let err = Engine::new(handler, ReportOptions::default()).err().unwrap();
    assert!(matches!(err, ConfigError::Invalid(_)), "{err}");
}

#[test]
fn handler_errors_keep_their_identity() {
    #[derive(Debug, thiserror::Error)]
    #[error("widget store is locked")]
    struct Locked;

    let handler = Handler::root(HandlerMetadata::new("app", "App"), |_| Ok(()))
        .operation(HandlerMetadata::new("sync", "Sync widgets"), |_, _| Err(Locked.into()));
    let engine = Engine::new(handler, ReportOptions::default()).unwrap();

    let EngineError::Handler(err) = engine.execute(["sync"]).unwrap_err() else {
        panic!("expected a handler error");
    };
    assert!(err.downcast_ref::<Locked>().is_some());
}

#[test]
fn structured_results_render_as_yaml() {
    let handler = Handler::root(HandlerMetadata::new("app", "App"), |_| Ok(()))
        .operation(HandlerMetadata::new("list", "List widgets"), |_, _| {
            Ok(Some(serde_json::json!(["a", "b"])))
        });
    let engine = Engine::new(handler, ReportOptions::printing(ResultFormat::Yaml)).unwrap();

    let run = engine.execute(["list"]).unwrap();
    assert_eq!(run.report.as_deref(), Some("- a\n- b"));
}
