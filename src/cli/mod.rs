//! Command-line parsing for the wage/CPI pipeline.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! cleaning and storage code.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::store::Backend;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "wcpi", version, about = "Icelandic wage index / CPI pipeline (PX-Web -> SQL -> CSV)")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every subcommand.
#[derive(Debug, Args, Clone)]
pub struct GlobalArgs {
    /// Base directory holding `data/raw` and `data/processed` (env: WAGE_CPI_DATA_DIR).
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// SQLite database file (env: WAGE_CPI_DB; default: <data-dir>/iceland_wage_cpi.sqlite).
    #[arg(long, global = true, value_name = "FILE")]
    pub db: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch both series from Statistics Iceland into `data/raw/`.
    Fetch,
    /// Clean the raw files, run quality checks and load the store.
    Load(LoadArgs),
    /// Export the merged view from the SQLite store to CSV.
    Export,
    /// Fetch, load and export in one go.
    Run(RunArgs),
}

#[derive(Debug, Args, Clone)]
pub struct LoadArgs {
    /// Storage backend.
    #[arg(long, value_enum, default_value_t = Backend::Sqlite)]
    pub backend: Backend,
}

#[derive(Debug, Args, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub load: LoadArgs,

    /// Reuse the raw files already in `data/raw/` instead of fetching.
    #[arg(long)]
    pub skip_fetch: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_run_with_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["wcpi", "run", "--skip-fetch", "--backend", "memory", "--data-dir", "/tmp/w", "-vv"]);
        assert_eq!(cli.global.data_dir, Some(PathBuf::from("/tmp/w")));
        assert_eq!(cli.global.verbose, 2);
        match cli.command {
            Command::Run(args) => {
                assert!(args.skip_fetch);
                assert_eq!(args.load.backend, Backend::Memory);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn load_defaults_to_sqlite() {
        let cli = Cli::parse_from(["wcpi", "load"]);
        assert!(matches!(cli.command, Command::Load(LoadArgs { backend: Backend::Sqlite })));
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
