use std::path::PathBuf;

pub struct CheckArgs {
    pub path: PathBuf,
    pub config: Option<PathBuf>,
    pub colored: bool,
}

/// `fableforge check <path>`: load once, print diagnostics, exit non-zero
/// if the load produced any error-severity ones. Silent on success, like
/// `cargo check`.
pub fn run(args: CheckArgs) {
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

    let has_errors = result.has_errors();
    super::load::print_diagnostics(&args.path, result.log.entries(), args.colored);

    if !result.loaded || has_errors {
        std::process::exit(1);
    }
}
