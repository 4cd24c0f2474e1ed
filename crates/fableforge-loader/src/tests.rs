//! End-to-end tests for the loader pipeline: a real file on disk, a
//! minimal registered event + effect, and assertions on the resulting
//! `Script` state — exercising spec.md §4.8 steps 1-8 together rather than
//! in isolation.

use super::*;
use fableforge_core::class::Type;
use fableforge_core::event::EventContext;
use fableforge_core::expr::ExprHandle;
use fableforge_core::interner::Symbol;
use fableforge_core::match_context::MatchContext;
use fableforge_core::registry_info::{EventInfo, NamedPatternType, StatementInfo};
use fableforge_core::statement::{Statement, WalkResult};
use fableforge_core::value::Value;
use std::collections::HashMap;
use std::io::Write as _;
use std::sync::Arc;

#[derive(Debug)]
struct StubEvent;

impl fableforge_core::registry_info::EventInstance for StubEvent {
    fn init(&mut self, _captures: Vec<ExprHandle>) -> bool {
        true
    }
    fn handled_contexts(&self) -> &[fableforge_core::class::ClassId] {
        &[]
    }
}

#[derive(Debug, Default)]
struct StubEffect {
    next: Option<fableforge_core::statement::StmtHandle>,
}

impl Statement for StubEffect {
    fn init(&mut self, _captures: Vec<ExprHandle>, _pattern_index: usize, _parse_result: &MatchContext) -> bool {
        true
    }
    fn walk(&self, _ctx: &dyn EventContext) -> WalkResult {
        WalkResult::Continue
    }
    fn set_next(&mut self, next: Option<fableforge_core::statement::StmtHandle>) {
        self.next = next;
    }
    fn next(&self) -> Option<&fableforge_core::statement::StmtHandle> {
        self.next.as_ref()
    }
}

fn test_engine() -> Engine {
    let mut engine = Engine::new();

    let number_class = Symbol::from_raw(0);
    engine.register_type(
        Type::new(number_class, "number", "numbers")
            .with_literal_parser(Arc::new(|s| s.parse::<f64>().ok().map(Value::Number))),
    );
    engine.register_pattern_type(NamedPatternType {
        name: "object",
        pattern_type: fableforge_core::class::PatternType::single(number_class),
    });

    let event_class = Symbol::from_raw(1);
    let event_pattern = engine.compile_pattern_source("on load").unwrap();
    engine
        .events
        .register(EventInfo {
            syntax: fableforge_core::registry_info::SyntaxInfo {
                registerer: "test".to_string(),
                class: event_class,
                priority: 0,
                patterns: vec![event_pattern],
                data_bag: HashMap::new(),
            },
            handled_contexts: Vec::new(),
            loading_priority: 0,
            factory: Arc::new(|| Box::new(StubEvent)),
        })
        .unwrap();

    let effect_class = Symbol::from_raw(2);
    let effect_pattern = engine.compile_pattern_source("set %object% to %object%").unwrap();
    engine
        .statements
        .register(StatementInfo {
            syntax: fableforge_core::registry_info::SyntaxInfo {
                registerer: "test".to_string(),
                class: effect_class,
                priority: 0,
                patterns: vec![effect_pattern],
                data_bag: HashMap::new(),
            },
            factory: Arc::new(|| Box::new(StubEffect::default())),
            is_section: false,
        })
        .unwrap();

    let bool_class = Symbol::from_raw(3);
    engine.register_type(Type::new(bool_class, "boolean", "booleans"));
    engine.set_bool_class(bool_class);

    engine
}

fn write_script(dir: &tempfile::TempDir, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(body.as_bytes()).unwrap();
    path
}

#[test]
fn load_script_installs_one_trigger_for_one_matching_block() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_script(&dir, "a.sk", "on load:\n\tset {x} to 5\n");
    let mut engine = test_engine();
    let mut script = Script::new(&path);
    let options = ScriptLoadOptions::default();

    let result = load_script(&mut script, &mut engine, &options, LoadHooks::default()).unwrap();
    assert!(result.loaded);
    assert!(!result.has_errors(), "unexpected diagnostics: {:?}", result.log.entries());
    assert!(script.is_loaded());
    assert_eq!(script.triggers().unwrap().len(), 1);
}

#[test]
fn code_outside_a_trigger_is_a_structure_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_script(&dir, "b.sk", "set {x} to 5\n");
    let mut engine = test_engine();
    let mut script = Script::new(&path);
    let options = ScriptLoadOptions::default();

    let result = load_script(&mut script, &mut engine, &options, LoadHooks::default()).unwrap();
    assert!(result.loaded);
    assert_eq!(script.triggers().unwrap().len(), 0);
    assert!(result
        .log
        .entries()
        .iter()
        .any(|d| d.message.contains("code outside a trigger")));
}

#[test]
fn load_on_an_already_loaded_script_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_script(&dir, "c.sk", "on load:\n\tset {x} to 5\n");
    let mut engine = test_engine();
    let mut script = Script::new(&path);
    let options = ScriptLoadOptions::default();

    load_script(&mut script, &mut engine, &options, LoadHooks::default()).unwrap();
    let second = load_script(&mut script, &mut engine, &options, LoadHooks::default());
    assert!(matches!(second, Err(LoaderError::AlreadyLoaded { .. })));
}

#[test]
fn unload_then_reload_preserves_script_identity() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_script(&dir, "d.sk", "on load:\n\tset {x} to 5\n");
    let mut engine = test_engine();
    let mut script = Script::new(&path);
    let options = ScriptLoadOptions::default();

    load_script(&mut script, &mut engine, &options, LoadHooks::default()).unwrap();
    assert_eq!(script.name(), "d");

    unload_script(&mut script, |_| {}).unwrap();
    assert!(!script.is_loaded());
    assert!(matches!(unload_script(&mut script, |_| {}), Err(LoaderError::AlreadyUnloaded { .. })));

    let result = reload_script(&mut script, &mut engine, &options, LoadHooks::default()).unwrap();
    assert!(result.loaded);
    assert_eq!(script.name(), "d");
    assert_eq!(script.triggers().unwrap().len(), 1);
}

#[test]
fn reload_fires_on_unload_for_every_prior_trigger_before_replacing_them() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_script(
        &dir,
        "e.sk",
        "on load:\n\tset {x} to 1\non load:\n\tset {x} to 2\n",
    );
    let mut engine = test_engine();
    let mut script = Script::new(&path);
    let options = ScriptLoadOptions::default();

    load_script(&mut script, &mut engine, &options, LoadHooks::default()).unwrap();
    assert_eq!(script.triggers().unwrap().len(), 2);

    write_script(&dir, "e.sk", "on load:\n\tset {x} to 1\n");

    let mut unloaded_count = 0;
    let mut on_unload = |_trigger: &fableforge_core::script::Trigger| unloaded_count += 1;
    let result = reload_script(
        &mut script,
        &mut engine,
        &options,
        LoadHooks {
            on_unload: Some(&mut on_unload),
            ..LoadHooks::default()
        },
    )
    .unwrap();

    assert_eq!(unloaded_count, 2, "on_unload must fire for both original triggers");
    assert!(result.loaded);
    assert_eq!(script.name(), "e");
    assert_eq!(script.triggers().unwrap().len(), 1);
}

#[test]
fn nested_if_body_loads_without_diagnostics() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_script(&dir, "f.sk", "on load:\n\tif true:\n\t\tset {x} to 1\n");
    let mut engine = test_engine();
    let mut script = Script::new(&path);
    let options = ScriptLoadOptions::default();

    let result = load_script(&mut script, &mut engine, &options, LoadHooks::default()).unwrap();
    assert!(!result.has_errors(), "unexpected diagnostics: {:?}", result.log.entries());
    assert_eq!(script.triggers().unwrap().len(), 1);
}

#[test]
fn a_low_max_recursion_depth_reports_an_exception_for_deeply_nested_ifs() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_script(
        &dir,
        "g.sk",
        "on load:\n\tif true:\n\t\tif true:\n\t\t\tif true:\n\t\t\t\tset {x} to 1\n",
    );
    let mut engine = test_engine();
    let mut script = Script::new(&path);
    let options = ScriptLoadOptions {
        max_recursion_depth: 2,
        ..ScriptLoadOptions::default()
    };

    let result = load_script(&mut script, &mut engine, &options, LoadHooks::default()).unwrap();
    assert!(result
        .log
        .entries()
        .iter()
        .any(|d| d.message.contains("recursion depth exceeded")));
}

#[derive(Debug, Default)]
struct MarkerEffect {
    label: &'static str,
    order: Arc<std::sync::Mutex<Vec<&'static str>>>,
    next: Option<fableforge_core::statement::StmtHandle>,
}

impl Statement for MarkerEffect {
    fn init(&mut self, _captures: Vec<ExprHandle>, _pattern_index: usize, _parse_result: &MatchContext) -> bool {
        self.order.lock().unwrap().push(self.label);
        true
    }
    fn walk(&self, _ctx: &dyn EventContext) -> WalkResult {
        WalkResult::Continue
    }
    fn set_next(&mut self, next: Option<fableforge_core::statement::StmtHandle>) {
        self.next = next;
    }
    fn next(&self) -> Option<&fableforge_core::statement::StmtHandle> {
        self.next.as_ref()
    }
}

#[test]
fn trigger_finalization_respects_descending_loading_priority_not_source_order() {
    let dir = tempfile::tempdir().unwrap();
    // The low-priority event's block appears first in the file; if bodies
    // were finalized in source order the "low" marker would be pushed
    // before "high". Spec §8 property 8 requires the opposite.
    let path = write_script(&dir, "h.sk", "on low:\n\tmark low\non high:\n\tmark high\n");

    let mut engine = test_engine();
    let order: Arc<std::sync::Mutex<Vec<&'static str>>> = Arc::new(std::sync::Mutex::new(Vec::new()));

    let low_event = engine.compile_pattern_source("on low").unwrap();
    engine
        .events
        .register(EventInfo {
            syntax: fableforge_core::registry_info::SyntaxInfo {
                registerer: "test".to_string(),
                class: Symbol::from_raw(10),
                priority: 0,
                patterns: vec![low_event],
                data_bag: HashMap::new(),
            },
            handled_contexts: Vec::new(),
            loading_priority: 1,
            factory: Arc::new(|| Box::new(StubEvent)),
        })
        .unwrap();
    let high_event = engine.compile_pattern_source("on high").unwrap();
    engine
        .events
        .register(EventInfo {
            syntax: fableforge_core::registry_info::SyntaxInfo {
                registerer: "test".to_string(),
                class: Symbol::from_raw(11),
                priority: 0,
                patterns: vec![high_event],
                data_bag: HashMap::new(),
            },
            handled_contexts: Vec::new(),
            loading_priority: 10,
            factory: Arc::new(|| Box::new(StubEvent)),
        })
        .unwrap();

    for (label, class_id) in [("low", 20), ("high", 21)] {
        let pattern = engine.compile_pattern_source(&format!("mark {label}")).unwrap();
        let order = order.clone();
        engine
            .statements
            .register(StatementInfo {
                syntax: fableforge_core::registry_info::SyntaxInfo {
                    registerer: "test".to_string(),
                    class: Symbol::from_raw(class_id),
                    priority: 0,
                    patterns: vec![pattern],
                    data_bag: HashMap::new(),
                },
                factory: Arc::new(move || {
                    Box::new(MarkerEffect {
                        label,
                        order: order.clone(),
                        next: None,
                    })
                }),
                is_section: false,
            })
            .unwrap();
    }

    let mut script = Script::new(&path);
    let options = ScriptLoadOptions::default();
    let result = load_script(&mut script, &mut engine, &options, LoadHooks::default()).unwrap();
    assert!(!result.has_errors(), "unexpected diagnostics: {:?}", result.log.entries());

    assert_eq!(*order.lock().unwrap(), vec!["high", "low"]);
}

#[test]
fn if_else_both_branches_load_without_diagnostics() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_script(
        &dir,
        "i.sk",
        "on load:\n\tif true:\n\t\tset {x} to 1\n\telse:\n\t\tset {x} to 2\n",
    );
    let mut engine = test_engine();
    let mut script = Script::new(&path);
    let options = ScriptLoadOptions::default();

    let result = load_script(&mut script, &mut engine, &options, LoadHooks::default()).unwrap();
    assert!(!result.has_errors(), "unexpected diagnostics: {:?}", result.log.entries());
    assert_eq!(script.triggers().unwrap().len(), 1);
}

#[test]
fn stray_else_after_an_accepted_trigger_is_a_structure_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_script(&dir, "j.sk", "on load:\n\tset {x} to 5\nelse:\n\tset {x} to 6\n");
    let mut engine = test_engine();
    let mut script = Script::new(&path);
    let options = ScriptLoadOptions::default();

    let result = load_script(&mut script, &mut engine, &options, LoadHooks::default()).unwrap();
    assert_eq!(script.triggers().unwrap().len(), 1);
    assert!(result
        .log
        .entries()
        .iter()
        .any(|d| d.message.contains("must be placed after an 'if'")));
}

#[test]
fn missing_file_returns_ok_with_an_unloaded_script_and_a_diagnostic() {
    let mut engine = test_engine();
    let mut script = Script::new("/nonexistent/path/for/this/test.sk");
    let options = ScriptLoadOptions::default();

    let result = load_script(&mut script, &mut engine, &options, LoadHooks::default()).unwrap();
    assert!(!result.loaded);
    assert!(!script.is_loaded());
    assert!(result.has_errors());
}
