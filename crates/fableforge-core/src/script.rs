//! Scripts and triggers (spec §3 `Script`, `Trigger`).

use crate::registry_info::EventInstance;
use crate::statement::StmtHandle;
use std::path::{Path, PathBuf};

/// One top-level script block bound to an event, owning a statement chain
/// (GLOSSARY "Trigger").
#[derive(Debug)]
pub struct Trigger {
    event: Box<dyn EventInstance>,
    head: Option<StmtHandle>,
    line: u32,
}

impl Trigger {
    pub fn new(event: Box<dyn EventInstance>, head: Option<StmtHandle>, line: u32) -> Self {
        Self { event, head, line }
    }

    pub fn event(&self) -> &dyn EventInstance {
        self.event.as_ref()
    }

    pub fn head(&self) -> Option<&StmtHandle> {
        self.head.as_ref()
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    /// Invoked by `Script::unload` (spec §3 "invoking an `on_unload` hook
    /// on each trigger"). There is no general-purpose runtime hook type in
    /// this crate (execution is out of scope); callers pass whatever
    /// closure their host application needs run at unload.
    pub fn on_unload(&self, mut hook: impl FnMut(&Trigger)) {
        hook(self);
    }
}

/// Identified by its absolute path (spec §3 `Script`).
///
/// Invariant: `loaded <=> triggers.is_some()`. Violating it (double-load,
/// double-unload) is a programmer error, not a user diagnostic — callers
/// get a descriptive panic rather than a silently wrong state, matching
/// spec §3's "is a programmer error" framing.
#[derive(Debug)]
pub struct Script {
    path: PathBuf,
    name: String,
    triggers: Option<Vec<Trigger>>,
}

impl Script {
    /// Creates a script in the unloaded state. `name` is derived by
    /// stripping one extension from the file name (spec §3).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = derive_name(&path);
        Self {
            path,
            name,
            triggers: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_loaded(&self) -> bool {
        self.triggers.is_some()
    }

    pub fn triggers(&self) -> Option<&[Trigger]> {
        self.triggers.as_deref()
    }

    /// Installs a finalized trigger set, transitioning to loaded.
    ///
    /// # Panics
    /// Panics if the script is already loaded (spec §3: "Calling `load` on
    /// a loaded script ... is a programmer error").
    pub fn load(&mut self, triggers: Vec<Trigger>) {
        assert!(
            self.triggers.is_none(),
            "load() called on already-loaded script {:?}",
            self.path
        );
        self.triggers = Some(triggers);
    }

    /// Returns to the unloaded state, running `on_unload_hook` against
    /// every trigger first.
    ///
    /// # Panics
    /// Panics if the script is already unloaded (spec §3: "... or
    /// `unload` on an unloaded one, is a programmer error").
    pub fn unload(&mut self, mut on_unload_hook: impl FnMut(&Trigger)) {
        let triggers = self
            .triggers
            .take()
            .unwrap_or_else(|| panic!("unload() called on already-unloaded script {:?}", self.path));
        for trigger in &triggers {
            trigger.on_unload(&mut on_unload_hook);
        }
    }
}

fn derive_name(path: &Path) -> String {
    match path.file_stem() {
        Some(stem) => stem.to_string_lossy().into_owned(),
        None => path.to_string_lossy().into_owned(),
    }
}
