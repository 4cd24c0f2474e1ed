//! Subcommand implementations. Each mirrors the teacher's `commands::check`
//! shape: take a small args struct, do the work, print diagnostics, set the
//! process exit code — no shared `run` trait, just a function per command.

pub mod check;
pub mod load;
pub mod reload;

use fableforge_loader::ScriptLoadOptions;
use fableforge_syntax::Engine;
use std::path::Path;

/// A script loaded through this CLI never has any statements or events
/// registered against its `Engine` — there's no host application here to
/// supply a standard library of triggers/effects, so every loaded script
/// reduces to NO_MATCH diagnostics on its bodies. This binary exists to
/// exercise the loader's file/registry/lifecycle machinery, not to run
/// actual scripts; a real host embeds `fableforge-loader` with its own
/// populated `Engine`.
pub fn bare_engine() -> Engine {
    Engine::new()
}

/// Reads `ScriptLoadOptions` from `config_path` if given and present,
/// falling back to defaults otherwise (per `cli.rs`'s `--config` doc
/// comment). A present-but-malformed file is reported and exits the
/// process — unlike a merely-absent one, that's a user mistake worth
/// surfacing.
pub fn load_options(config_path: Option<&Path>) -> ScriptLoadOptions {
    let Some(path) = config_path else {
        return ScriptLoadOptions::default();
    };
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(_) => return ScriptLoadOptions::default(),
    };
    match ScriptLoadOptions::from_toml_str(&source) {
        Ok(options) => options,
        Err(err) => {
            eprintln!("error: invalid config at {}: {err}", path.display());
            std::process::exit(1);
        }
    }
}
