//! The process-wide script registry (spec.md §5 "the only shared,
//! thread-safe structure is the script registry (a concurrent map keyed by
//! path); its operations are `get`, `insert-if-absent`, `remove`"), and
//! `get_or_load_script` built on top of it.
//!
//! No crate in the retrieved pack reaches for a concurrent-map crate (no
//! `dashmap` anywhere in `examples/*/Cargo.toml`), so this follows the
//! pack's actual practice: a `std::sync::Mutex` around a `HashMap`. Lock
//! scope is kept to the insert-or-fetch step so two distinct-path loads
//! never block each other past that point, matching spec.md §5 "two
//! concurrent `load_script` calls for distinct paths may proceed in
//! parallel".

use crate::{load_script, LoadHooks, LoaderError, ScriptLoadOptions, ScriptLoadResult};
use fableforge_core::diagnostics::DiagnosticLog;
use fableforge_core::script::Script;
use fableforge_syntax::Engine;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// A process-wide table of `Script`s keyed by path.
#[derive(Default)]
pub struct ScriptRegistry {
    scripts: Mutex<HashMap<PathBuf, Arc<Mutex<Script>>>>,
}

/// What `get_or_load_script` handed back: the (possibly newly loaded)
/// script plus the diagnostics from whichever call actually did the
/// loading. `result` is `None` when an already-loaded script was returned
/// without this call doing any work (spec.md §4.8 "if the process-wide
/// registry has a loaded `Script` at `path`, return it").
pub struct ScriptHandle {
    pub script: Arc<Mutex<Script>>,
    pub result: Option<ScriptLoadResult>,
}

impl ScriptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// `get` (spec.md §5).
    pub fn get(&self, path: &Path) -> Option<Arc<Mutex<Script>>> {
        self.scripts.lock().unwrap().get(path).cloned()
    }

    /// `remove` (spec.md §5). Does not unload the script first — callers
    /// that want `on_unload` to run should call [`crate::unload_script`]
    /// before removing, or rely on the returned handle's `Drop`.
    pub fn remove(&self, path: &Path) -> Option<Arc<Mutex<Script>>> {
        self.scripts.lock().unwrap().remove(path)
    }

    /// Implements spec.md §4.8 `get_or_load_script(path, options)`.
    ///
    /// The at-most-one-loaded race (§5: "the loser of the race observes the
    /// winner's loaded script and returns it unchanged") is resolved by
    /// locking the per-script mutex before checking `is_loaded()`: the
    /// registry-wide lock is held only long enough to insert-or-fetch the
    /// `Arc<Mutex<Script>>`, so a second concurrent call for the same path
    /// blocks on the per-script lock, not the whole registry, and sees the
    /// first call's finished result once it acquires it.
    pub fn get_or_load_script(&self, path: impl Into<PathBuf>, engine: &mut Engine, options: &ScriptLoadOptions) -> ScriptHandle {
        let path = path.into();
        let entry = {
            let mut scripts = self.scripts.lock().unwrap();
            scripts
                .entry(path.clone())
                .or_insert_with(|| Arc::new(Mutex::new(Script::new(path.clone()))))
                .clone()
        };

        let mut guard = entry.lock().unwrap();
        if guard.is_loaded() {
            tracing::debug!(path = %path.display(), "script already loaded, reusing");
            drop(guard);
            return ScriptHandle { script: entry, result: None };
        }

        let result = match load_script(&mut guard, engine, options, LoadHooks::default()) {
            Ok(result) => result,
            Err(LoaderError::AlreadyLoaded { path }) => {
                // Can't happen: we just checked `is_loaded()` under the
                // same lock. Kept as a log line rather than a panic since
                // it would indicate a bug in this function, not in a
                // caller, and a script handle is still safe to hand back.
                tracing::error!(path = %path.display(), "unreachable: already-loaded race in get_or_load_script");
                ScriptLoadResult {
                    log: DiagnosticLog::for_script(path),
                    loaded: guard.is_loaded(),
                }
            }
            Err(other) => {
                tracing::error!(error = %other, "load_script failed");
                ScriptLoadResult {
                    log: DiagnosticLog::for_script(path),
                    loaded: false,
                }
            }
        };
        drop(guard);

        ScriptHandle {
            script: entry,
            result: Some(result),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_script(dir: &tempfile::TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn get_or_load_script_returns_same_identity_on_repeat_calls() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_script(&dir, "a.sk", "on load:\n\tset {x} to 1\n");
        let registry = ScriptRegistry::new();
        let mut engine = Engine::new();
        let options = ScriptLoadOptions::default();

        let first = registry.get_or_load_script(&path, &mut engine, &options);
        assert!(first.result.is_some());

        let second = registry.get_or_load_script(&path, &mut engine, &options);
        assert!(second.result.is_none(), "second call should reuse the loaded script");
        assert!(Arc::ptr_eq(&first.script, &second.script));
    }

    #[test]
    fn missing_file_leaves_script_unloaded_with_a_diagnostic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.sk");
        let registry = ScriptRegistry::new();
        let mut engine = Engine::new();
        let options = ScriptLoadOptions::default();

        let handle = registry.get_or_load_script(&path, &mut engine, &options);
        let result = handle.result.expect("first call always attempts a load");
        assert!(!result.loaded);
        assert!(result.has_errors());
    }
}
