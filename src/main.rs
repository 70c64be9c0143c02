use clap::Parser;
use color_eyre::eyre::{Report, Result};
use maba16s::{cli::Command, Cli};

fn main() -> Result<(), Report> {
    // ------------------------------------------------------------------------
    // CLI Setup

    // Parse CLI parameters
    let args = Cli::parse();

    // initialize color_eyre crate for colorized logs
    color_eyre::install()?;

    // Set logging/verbosity level via RUST_LOG
    std::env::set_var("RUST_LOG", args.verbosity.to_string());

    // initialize env_logger crate for logging/verbosity level
    env_logger::init();

    // check which CLI command we're running (rename, snakemake, report)
    match args.command {
        Command::Rename(args) => _ = maba16s::rename(&args)?,
        Command::Snakemake(args) => _ = maba16s::workflow::run(&args)?,
        Command::Report(args) => _ = maba16s::report(&args)?,
    }

    Ok(())
}
