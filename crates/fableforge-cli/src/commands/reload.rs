use std::path::PathBuf;

pub struct ReloadArgs {
    pub path: PathBuf,
    pub config: Option<PathBuf>,
    pub colored: bool,
}

/// `fableforge reload <path>`: load, then immediately unload and reload —
/// useful for exercising spec.md §4.8's reload procedure (and its
/// identity-preservation guarantee) without a long-running host process.
pub fn run(args: ReloadArgs) {
    let mut engine = super::bare_engine();
    let options = super::load_options(args.config.as_deref());
    let mut script = fableforge_core::script::Script::new(&args.path);

    if let Err(err) = fableforge_loader::load_script(
        &mut script,
        &mut engine,
        &options,
        fableforge_loader::LoadHooks::default(),
    ) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }

    let result = match fableforge_loader::reload_script(
        &mut script,
        &mut engine,
        &options,
        fableforge_loader::LoadHooks::default(),
    ) {
        Ok(result) => result,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };

    super::load::print_diagnostics(&args.path, result.log.entries(), args.colored);

    if !result.loaded {
        std::process::exit(1);
    }
    println!(
        "reloaded '{}' ({} trigger{})",
        script.name(),
        script.triggers().map_or(0, <[_]>::len),
        if script.triggers().map_or(0, <[_]>::len) == 1 { "" } else { "s" }
    );
}
