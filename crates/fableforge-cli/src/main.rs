mod cli;
mod commands;
mod diagnostics_printer;

use clap::Parser;
use cli::{Cli, Command};

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let colored = cli.color.should_colorize();

    match cli.command {
        Command::Load { path } => commands::load::run(commands::load::LoadArgs {
            path,
            config: cli.config,
            colored,
        }),
        Command::Check { path } => commands::check::run(commands::check::CheckArgs {
            path,
            config: cli.config,
            colored,
        }),
        Command::Reload { path } => commands::reload::run(commands::reload::ReloadArgs {
            path,
            config: cli.config,
            colored,
        }),
    }
}
