//! Scoped diagnostic collection (spec §7: "the log supports `recurse()` /
//! `callback()` pairs that scope diagnostics to a sub-parse so that
//! discard is precise").

use super::message::{Diagnostic, ErrorKind, Verbosity};
use std::path::{Path, PathBuf};

/// A point in the log's history, returned by [`DiagnosticLog::checkpoint`]
/// and consumed by [`DiagnosticLog::discard_since`] /
/// [`DiagnosticLog::keep_since`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint(usize);

/// Accumulates diagnostics for one script load, with a context-trail stack
/// (spec §9 "current context (matching, initializing, constraint-checking,
/// restricted-syntaxes, no-match)") and precise discard of diagnostics from
/// an abandoned candidate (spec §7 propagation rule).
#[derive(Debug, Default)]
pub struct DiagnosticLog {
    entries: Vec<Diagnostic>,
    context_trail: Vec<String>,
    script: Option<PathBuf>,
    /// Nesting depth of open `recurse` scopes, stamped onto every
    /// diagnostic pushed while it's non-zero (spec.md §9 "recursion
    /// depth").
    depth: usize,
    /// `ScriptLoadOptions.max_recursion_depth`, or `0` for no bound. `recurse`
    /// reports an exception once, the first time `depth` exceeds it, rather
    /// than unwinding `f` — the generic return type gives `recurse` no value
    /// to hand back early, so this is detection of a pathologically deep
    /// script rather than a hard stack guard.
    max_depth: usize,
    max_depth_reported: bool,
}

impl DiagnosticLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_script(path: impl Into<PathBuf>) -> Self {
        Self {
            script: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn script(&self) -> Option<&Path> {
        self.script.as_deref()
    }

    /// Sets the recursion-depth bound `recurse` watches for (spec.md §9
    /// "restricted-syntaxes"/"Configuration" `max_recursion_depth`). `0`
    /// disables the check, matching `ScriptLoadOptions`'s default.
    pub fn set_max_recursion_depth(&mut self, max: u32) {
        self.max_depth = max as usize;
        self.max_depth_reported = false;
    }

    pub fn push(&mut self, mut diagnostic: Diagnostic) {
        diagnostic.context_trail = self.context_trail.clone();
        diagnostic.recursion_depth = self.depth;
        diagnostic.script = diagnostic.script.or_else(|| self.script.clone());
        self.entries.push(diagnostic);
    }

    pub fn error(&mut self, kind: ErrorKind, line: u32, message: impl Into<String>) {
        self.push(Diagnostic::error(kind, message, line));
    }

    pub fn warn(&mut self, line: u32, message: impl Into<String>) {
        self.push(Diagnostic::new(message, Verbosity::Warning, line));
    }

    /// Scopes `f`'s diagnostics under an extra context-trail label, then
    /// pops the label back off regardless of how `f` returns (spec §9
    /// "context_trail").
    pub fn recurse<T>(&mut self, label: impl Into<String>, f: impl FnOnce(&mut Self) -> T) -> T {
        self.context_trail.push(label.into());
        self.depth += 1;
        if self.max_depth > 0 && self.depth > self.max_depth && !self.max_depth_reported {
            self.max_depth_reported = true;
            let max_depth = self.max_depth;
            self.error(
                ErrorKind::Exception,
                0,
                format!("recursion depth exceeded the configured maximum of {max_depth}"),
            );
        }
        let result = f(self);
        self.depth -= 1;
        self.context_trail.pop();
        result
    }

    /// Marks the current length so a caller can later discard or keep
    /// everything pushed since (spec §7: a semantic diagnostic from a
    /// failed candidate is discarded once a later candidate succeeds).
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.entries.len())
    }

    pub fn discard_since(&mut self, checkpoint: Checkpoint) {
        self.entries.truncate(checkpoint.0);
    }

    /// Runs `f`, and only keeps its diagnostics if `f` reports success.
    /// This is the "callback" half of the recurse/callback pairing: the
    /// caller supplies what counts as success.
    pub fn callback<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> (T, bool),
    ) -> T {
        let checkpoint = self.checkpoint();
        let (value, keep) = f(self);
        if !keep {
            self.discard_since(checkpoint);
        }
        value
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.entries
            .iter()
            .any(|d| d.verbosity == Verbosity::Error)
    }
}
