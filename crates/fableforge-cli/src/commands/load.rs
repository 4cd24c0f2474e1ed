use crate::diagnostics_printer;
use std::path::PathBuf;

pub struct LoadArgs {
    pub path: PathBuf,
    pub config: Option<PathBuf>,
    pub colored: bool,
}

/// `fableforge load <path>`: load once and print whatever diagnostics came
/// out, successful or not. Always exits 0 — `check` is the subcommand that
/// turns diagnostics into a failing exit code.
pub fn run(args: LoadArgs) {
    let mut engine = super::bare_engine();
    let options = super::load_options(args.config.as_deref());
    let mut script = fableforge_core::script::Script::new(&args.path);

    let result = match fableforge_loader::load_script(
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

    print_diagnostics(&args.path, result.log.entries(), args.colored);

    if !result.loaded {
        std::process::exit(1);
    }
    println!(
        "loaded '{}' ({} trigger{})",
        script.name(),
        script.triggers().map_or(0, <[_]>::len),
        if script.triggers().map_or(0, <[_]>::len) == 1 { "" } else { "s" }
    );
}

pub(super) fn print_diagnostics(path: &std::path::Path, entries: &[fableforge_core::diagnostics::Diagnostic], colored: bool) {
    if entries.is_empty() {
        return;
    }
    match std::fs::read_to_string(path) {
        Ok(source) => {
            eprint!("{}", diagnostics_printer::render(entries, &source, &path.display().to_string(), colored));
        }
        Err(_) => {
            for diag in entries {
                eprintln!("{diag}");
            }
        }
    }
}
