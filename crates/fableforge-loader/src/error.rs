//! The loader's fatal-fault type (SPEC_FULL.md "Error handling"): the small
//! closed set of *programmer errors* spec.md §3/§8 calls fatal, plus I/O
//! failure opening a script file. User-facing diagnostics never come
//! through here — those accumulate in a [`fableforge_core::diagnostics::DiagnosticLog`]
//! instead, per the severity split spec.md §7/§9 draws between the two.

use std::path::PathBuf;

/// Mirrors the teacher's one-crate-wide-error-enum-per-layer convention
/// (`plotnik-lib::Error`, `plotnik-compiler::Error`).
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    /// Calling `load_script` directly on an already-loaded script (spec.md
    /// §4.8 step 1). `get_or_load_script` never hits this path itself — it
    /// checks `is_loaded()` first and returns the existing script instead.
    #[error("script at {path:?} is already loaded")]
    AlreadyLoaded { path: PathBuf },

    /// Calling `unload_script` on a script that isn't loaded.
    #[error("script at {path:?} is already unloaded")]
    AlreadyUnloaded { path: PathBuf },

    /// Opening the script file failed (spec.md §4.8 step 2). Surfaced to
    /// the caller as an `EXCEPTION` diagnostic inside the returned
    /// `ScriptLoadResult` rather than as this `Err` variant — `load_script`
    /// only returns `Err` for the programmer-error cases above — but the
    /// message text is produced from this variant's `Display` impl so both
    /// paths share one wording.
    #[error("failed to read script {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
