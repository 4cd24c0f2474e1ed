//! The script loader (spec.md §4.8 "Script loader lifecycle"): turns a
//! source file on disk into a loaded [`Script`], and back.
//!
//! This crate is the seam between the pure parsing pieces in
//! `fableforge-syntax` and a host application: it owns file I/O, the
//! process-wide script registry, and the load/unload/reload state machine.
//! Everything it does is spelled out as a numbered procedure in spec.md
//! §4.8 — the module layout below follows that procedure step for step
//! rather than the teacher's module names, since this is new functionality
//! with no direct teacher counterpart; the *shape* (one crate-wide
//! `thiserror` enum, `tracing` spans at the public entry points, `toml`
//! config) is the teacher's.

mod error;
mod options;
mod registry;

#[cfg(test)]
mod tests;

pub use error::LoaderError;
pub use options::ScriptLoadOptions;
pub use registry::ScriptRegistry;

use fableforge_core::diagnostics::{DiagnosticLog, ErrorKind};
use fableforge_core::event::{EventBus, TriggerId};
use fableforge_core::script::{Script, Trigger};
use fableforge_syntax::{
    build_file_tree, dangling_conditional_header, load_items, parse_trigger_restricted, Engine, FileElement,
    UnloadedTrigger,
};
use std::sync::atomic::{AtomicU64, Ordering};

/// Outcome of one `load_script`/`reload_script` call (spec.md §4.8 step 8
/// `ScriptLoadResult(log, script)`). The script itself isn't embedded here
/// — callers already hold the `&mut Script` they passed in, or (via
/// [`ScriptRegistry`]) an `Arc<Mutex<Script>>` — so this just carries the
/// load's diagnostics and whether it actually left the script loaded.
#[derive(Debug)]
pub struct ScriptLoadResult {
    pub log: DiagnosticLog,
    pub loaded: bool,
}

impl ScriptLoadResult {
    pub fn has_errors(&self) -> bool {
        self.log.has_errors()
    }
}

/// Optional collaborators invoked during finalize (spec.md §4.8 step 6
/// "optionally dispatch `addon.handle_trigger(trigger)` and
/// `event.register(trigger, event_bus)`"). Both are genuinely optional —
/// a host with no addon system and no event bus yet can load scripts with
/// `LoadHooks::default()`.
#[derive(Default)]
pub struct LoadHooks<'a> {
    pub event_bus: Option<&'a mut dyn EventBus>,
    pub on_trigger: Option<&'a mut dyn FnMut(&Trigger)>,
    /// Run on each trigger of the *previous* load before `reload_script`
    /// unloads it (spec.md §3 "`unload` returns to the unloaded state,
    /// invoking an `on_unload` hook on each trigger"). Unused by
    /// `load_script` itself — only `reload_script` consults it.
    pub on_unload: Option<&'a mut dyn FnMut(&Trigger)>,
}

static NEXT_TRIGGER_ID: AtomicU64 = AtomicU64::new(1);

/// Implements spec.md §4.8 `load_script(script, log)` steps 1-8.
///
/// # Errors
/// Returns [`LoaderError::AlreadyLoaded`] if `script` is already loaded —
/// step 1's "programmer error, distinct from user diagnostic". Everything
/// else, including I/O failure (step 2), comes back as `Ok` with a
/// `ScriptLoadResult` whose log records what went wrong, matching step 2's
/// literal "return a failed `ScriptLoadResult` carrying the log".
pub fn load_script(
    script: &mut Script,
    engine: &mut Engine,
    options: &ScriptLoadOptions,
    mut hooks: LoadHooks<'_>,
) -> Result<ScriptLoadResult, LoaderError> {
    if script.is_loaded() {
        return Err(LoaderError::AlreadyLoaded {
            path: script.path().to_path_buf(),
        });
    }

    let span = tracing::info_span!("load_script", path = %script.path().display());
    let _enter = span.enter();

    let mut log = DiagnosticLog::for_script(script.path());
    log.set_max_recursion_depth(options.max_recursion_depth);

    let source = match std::fs::read_to_string(script.path()) {
        Ok(source) => source,
        Err(source) => {
            let err = LoaderError::Io {
                path: script.path().to_path_buf(),
                source,
            };
            tracing::warn!(error = %err, "script read failed");
            log.error(ErrorKind::Exception, 0, err.to_string());
            return Ok(ScriptLoadResult { log, loaded: false });
        }
    };

    let tree = build_file_tree(&source, &mut log);
    let top_level = match &tree {
        FileElement::Section { children, .. } => children.as_slice(),
        _ => &[],
    };

    let restricted_seed = options.restricted_classes(|name| engine.class_by_name(name));

    let mut unloaded: Vec<UnloadedTrigger<'_>> = Vec::new();
    for element in top_level {
        match element {
            FileElement::Void { .. } => continue,
            FileElement::Section { line, header, children } => {
                if dangling_conditional_header(header) {
                    // Scenario S5: a top-level `else`/`else if` can't belong to any
                    // trigger — give it the same structure error load_items gives a
                    // misplaced one nested under a trigger, instead of trying (and
                    // failing) to match it against the event registry.
                    log.error(
                        ErrorKind::StructureError,
                        *line,
                        "An 'else' must be placed after an 'if' or an 'else if'",
                    );
                    continue;
                }
                if let Some(trigger) = parse_trigger_restricted(engine, header, children, *line, &mut log, &restricted_seed) {
                    unloaded.push(trigger);
                }
            }
            FileElement::Simple { line, .. } => {
                log.error(ErrorKind::StructureError, *line, "Can't have code outside of a trigger");
            }
        }
    }

    // Step 5: descending loading_priority, stable within equal priority.
    unloaded.sort_by_key(|t| std::cmp::Reverse(t.loading_priority + options.extra_trigger_priority_offset));

    // Step 6 (finalize): *now* parse each trigger's body, in the priority
    // order step 5 just established — `load_section`/`load_items` recursion
    // happens here, not during the cold parse, so a higher-priority trigger
    // appearing later in the file still finalizes before a lower-priority
    // one that appears earlier (spec §8 property 8).
    let mut triggers = Vec::with_capacity(unloaded.len());
    for UnloadedTrigger { event, children, line, mut state, .. } in unloaded {
        let body = log.recurse("matching", |log| load_items(engine, children, &mut state, log));
        let trigger = Trigger::new(event, body, line);

        let trigger_id = TriggerId(NEXT_TRIGGER_ID.fetch_add(1, Ordering::Relaxed));
        if let Some(on_trigger) = hooks.on_trigger.as_deref_mut() {
            on_trigger(&trigger);
        }
        if let Some(bus) = hooks.event_bus.as_deref_mut() {
            if let Some(&class) = trigger.event().handled_contexts().first() {
                bus.register(trigger_id, class);
            }
        }
        triggers.push(trigger);
    }

    let loaded_count = triggers.len();
    script.load(triggers);
    tracing::info!(triggers = loaded_count, errors = log.has_errors(), "script loaded");

    Ok(ScriptLoadResult { log, loaded: true })
}

/// Implements spec.md §4.8 "`unload`: invoke `on_unload` on each trigger,
/// clear the trigger set, flip `loaded` false."
///
/// # Errors
/// Returns [`LoaderError::AlreadyUnloaded`] if `script` isn't loaded.
pub fn unload_script(script: &mut Script, mut on_unload: impl FnMut(&Trigger)) -> Result<(), LoaderError> {
    if !script.is_loaded() {
        return Err(LoaderError::AlreadyUnloaded {
            path: script.path().to_path_buf(),
        });
    }
    let span = tracing::info_span!("unload_script", path = %script.path().display());
    let _enter = span.enter();
    script.unload(&mut on_unload);
    Ok(())
}

/// Implements spec.md §4.8 "`reload`: if loaded, unload; then
/// `load_script(script, fresh_log)`." Script identity (the `Script` value
/// itself) is preserved — only its trigger set is replaced.
pub fn reload_script(
    script: &mut Script,
    engine: &mut Engine,
    options: &ScriptLoadOptions,
    mut hooks: LoadHooks<'_>,
) -> Result<ScriptLoadResult, LoaderError> {
    if script.is_loaded() {
        match hooks.on_unload.take() {
            Some(hook) => unload_script(script, |t| hook(t))?,
            None => unload_script(script, |_| {})?,
        }
    }
    load_script(script, engine, options, hooks)
}
