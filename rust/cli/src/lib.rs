//! # duelbench CLI
//!
//! Thin command line over [`duelbench_arena`]: resolves the configuration
//! (defaults, `DUELBENCH_CONFIG` TOML file, `DUELBENCH_*` variables, flags),
//! builds the contestants and prints the report.
//!
//! ## Subcommands
//!
//! - `duel --a KIND --b KIND [--pairs N] [--seed S]`: one match
//! - `matrix --agent KIND --agent KIND ...`: round robin
//! - `deal [--seed S]`: deal and check down one hand
//! - `cfg`: resolved configuration with sources
//!
//! Exit codes are `0` on success, `2` on errors and `130` when stopped with
//! Ctrl+C.
//!
//! ```
//! use std::io;
//! let args = vec!["duelbench", "deal", "--seed", "42"];
//! let code = duelbench_cli::run(args, &mut io::stdout(), &mut io::stderr());
//! assert_eq!(code, 0);
//! ```

use clap::Parser;
use std::io::Write;

pub mod cli;
mod commands;
mod config;
mod error;
pub mod exit_code;
pub mod ui;

use cli::{Commands, DuelbenchCli};
use commands::{
    DuelArgs, MatrixArgs, handle_cfg_command, handle_deal_command, handle_duel_command,
    handle_matrix_command,
};

pub use error::CliError;

const COMMANDS: &[&str] = &["duel", "matrix", "deal", "cfg"];

/// Parses `args` and runs the subcommand, returning the process exit code.
pub fn run<I, S>(args: I, out: &mut dyn Write, err: &mut dyn Write) -> i32
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let argv: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();

    let cli = match DuelbenchCli::try_parse_from(&argv) {
        Ok(cli) => cli,
        Err(e) => return usage_error(e, out, err),
    };
    // a second call in the same process keeps the first subscriber
    let _ = duelbench_arena::logging::init_logging(cli.log_json);

    let result = match cli.cmd {
        Commands::Cfg => handle_cfg_command(out),
        Commands::Deal { seed } => handle_deal_command(seed, out),
        Commands::Duel {
            a,
            b,
            pairs,
            seed,
            history,
            db,
            immediate,
            max_seconds,
            probe,
            json,
        } => handle_duel_command(
            &DuelArgs {
                a,
                b,
                pairs,
                seed,
                history,
                db,
                immediate,
                max_seconds,
                probe,
                json,
            },
            out,
            err,
        ),
        Commands::Matrix {
            agents,
            pairs,
            seed,
            db,
            json,
        } => handle_matrix_command(
            &MatrixArgs {
                agents,
                pairs,
                seed,
                db,
                json,
            },
            out,
            err,
        ),
    };

    match result {
        Ok(()) => exit_code::SUCCESS,
        Err(e) => {
            if ui::write_error(err, &e.to_string()).is_err() {
                return exit_code::ERROR;
            }
            e.exit_code()
        }
    }
}

fn usage_error(e: clap::Error, out: &mut dyn Write, err: &mut dyn Write) -> i32 {
    use clap::error::ErrorKind;

    // Help and version go to stdout and exit 0
    if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
        return match write!(out, "{}", e) {
            Ok(()) => exit_code::SUCCESS,
            Err(_) => exit_code::ERROR,
        };
    }
    let mut report = || -> std::io::Result<()> {
        writeln!(err, "{}", e)?;
        writeln!(err)?;
        writeln!(err, "Usage: duelbench <command> [options]\n")?;
        writeln!(err, "Commands:")?;
        for c in COMMANDS {
            writeln!(err, "  {}", c)?;
        }
        writeln!(err, "\nFor full help, run: duelbench --help")
    };
    let _ = report();
    exit_code::ERROR
}
