//! [Command-line interface](Cli) (CLI) of the main binary.

use crate::{RenameArgs, ReportArgs, WorkflowArgs};
use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

// ----------------------------------------------------------------------------
// CLI Entry Point
// ----------------------------------------------------------------------------

/// The command-line interface (CLI).
/// ---
/// The CLI is intended for parsing user input from the command-line in the main function.
/// This is achieved with the `parse` function, which parses the command line arguments from
/// [`std::env::args`](https://doc.rust-lang.org/std/env/fn.args.html).
/// ```no_run
/// use clap::Parser;
/// let args = maba16s::Cli::parse();
/// ```
/// The command-line arguments from `std::env::args` are simply a vector of space separated
/// strings. Here is a manual example of setting the command-line input:
/// ```rust
/// use clap::Parser;
/// use maba16s::{cli::Command, Cli};
///
/// let input =
///     ["maba16s", "report", "-i", "output/reports", "-o", "output", "--grid-columns", "6"];
/// let args = Cli::parse_from(input);
/// match args.command {
///     Command::Report(args) => assert_eq!(args.options.grid_columns, 6),
///     _ => unreachable!(),
/// }
/// ```
#[derive(Debug, Deserialize, Parser, Serialize)]
#[clap(name = "maba16s", author, version)]
#[clap(about = "Maastricht Bacterial 16S workflow.")]
pub struct Cli {
    #[clap(subcommand)]
    /// Pass CLI arguments to a particular [Command].
    #[clap(help = "Set the command.")]
    pub command: Command,

    /// Set the output [Verbosity] level.
    #[clap(short = 'v', long)]
    #[clap(value_enum, default_value_t = Verbosity::default())]
    #[clap(hide_possible_values = false)]
    #[clap(global = true)]
    #[clap(help = "Set the output verbosity level.")]
    pub verbosity: Verbosity,
}

/// CLI [commands](#variants). Used to decide which runtime [Command](#variants) the CLI
/// arguments should be passed to.
#[derive(Debug, Deserialize, Serialize, Subcommand)]
pub enum Command {
    /// Pass CLI arguments to the barcode directory [rename](crate::rename()).
    #[clap(about = "Rename barcode directories to sample names supplied in a spreadsheet.")]
    Rename(RenameArgs),
    /// Pass CLI arguments to the [workflow](crate::workflow::run()), followed by the report.
    #[clap(about = "Run the entire workflow on 16S sequenced samples.")]
    Snakemake(WorkflowArgs),
    /// Pass CLI arguments to the [report](crate::report()) pipeline.
    #[clap(about = "Summarize per-sample report spreadsheets as charts and tables.")]
    Report(ReportArgs),
}

// -----------------------------------------------------------------------------
// Verbosity
// -----------------------------------------------------------------------------

/// The output verbosity level.
#[derive(Clone, Debug, Default, Deserialize, Serialize, ValueEnum)]
pub enum Verbosity {
    #[default]
    Info,
    Warn,
    Debug,
    Error,
}

impl Display for Verbosity {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        // Convert to lowercase for RUST_LOG env var compatibility
        let lowercase = format!("{:?}", self).to_lowercase();
        write!(f, "{lowercase}")
    }
}
