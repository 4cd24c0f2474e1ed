//! Command-line surface (clap derive, matching the teacher's `plotnik-cli`
//! convention of a `Parser`/`Subcommand` pair in its own module).

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    pub fn should_colorize(self) -> bool {
        match self {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => std::io::IsTerminal::is_terminal(&std::io::stderr()),
        }
    }
}

#[derive(Parser)]
#[command(name = "fableforge", bin_name = "fableforge")]
#[command(about = "Driver for loading and inspecting scripts without a host application")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to a fableforge.toml with ScriptLoadOptions. Defaults are used
    /// if omitted or if the file doesn't exist.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, default_value = "auto", value_name = "WHEN")]
    pub color: ColorChoice,
}

#[derive(Subcommand)]
pub enum Command {
    /// Load a script and print any diagnostics.
    Load { path: PathBuf },
    /// Load a script and exit non-zero if it produced any error diagnostics.
    Check { path: PathBuf },
    /// Load a script, then immediately unload and reload it.
    Reload { path: PathBuf },
}
