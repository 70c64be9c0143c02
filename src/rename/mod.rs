//! Rename barcode directories to the sample names of a mapping spreadsheet.

#[cfg(test)]
mod tests;

use clap::Parser;
use color_eyre::eyre::{eyre, Report, Result, WrapErr};
use color_eyre::Help;
use log::{info, warn};
use maba16s_table::Table;
use maba16s_utils as utils;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::path::{Path, PathBuf};

// ----------------------------------------------------------------------------
// RenameArgs
// ----------------------------------------------------------------------------

/// Rename barcode directories to sample names supplied in a spreadsheet.
#[derive(Clone, Debug, Deserialize, Parser, PartialEq, Serialize)]
pub struct RenameArgs {
    /// Directory containing one sub-directory per barcode (ex. `fastq_pass`).
    #[clap(short = 'i', long, required = true)]
    pub input_dir: PathBuf,

    /// Delimited mapping of barcodes (first column) to sample names.
    ///
    /// `.csv` files are comma-delimited, all other files are tab-delimited.
    #[clap(long, required = true)]
    pub spreadsheet: PathBuf,

    /// Column of the spreadsheet with the sample names.
    #[clap(long, default_value_t = RenameArgs::default().sample_column)]
    pub sample_column: String,
}

impl Default for RenameArgs {
    fn default() -> Self {
        RenameArgs::new()
    }
}

impl RenameArgs {
    pub fn new() -> Self {
        RenameArgs {
            input_dir: PathBuf::new(),
            spreadsheet: PathBuf::new(),
            sample_column: "SampleID".to_string(),
        }
    }
}

/// A barcode directory that was renamed to its sample name.
#[derive(Clone, Debug, PartialEq)]
pub struct Rename {
    pub barcode: String,
    pub sample: String,
    pub from: PathBuf,
    pub to: PathBuf,
}

// ----------------------------------------------------------------------------
// Rename
// ----------------------------------------------------------------------------

/// Read the (barcode, sample) pairs of a mapping spreadsheet, in file order.
pub fn read_mapping<P>(path: &P, sample_column: &str) -> Result<Vec<(String, String)>, Report>
where
    P: AsRef<Path> + Debug,
{
    let delim = utils::get_delimiter(path).unwrap_or('\t');
    let table = Table::read(path, Some(delim))?;

    let barcode_column = table
        .headers
        .first()
        .cloned()
        .ok_or_else(|| eyre!("Mapping spreadsheet has no columns: {path:?}"))?;
    let barcodes = table.get_column(&barcode_column)?;
    let samples = table
        .get_column(&sample_column.to_string())
        .wrap_err_with(|| format!("Failed to find sample names in: {path:?}"))
        .suggestion("Use --sample-column to name the column with the sample names.")?;

    let mapping = barcodes
        .into_iter()
        .zip(samples)
        .map(|(barcode, sample)| (barcode.clone(), sample.clone()))
        .collect();

    Ok(mapping)
}

/// Rename each `<input_dir>/<barcode>` directory of the mapping to `<input_dir>/<sample>`.
///
/// Missing barcode directories, and samples whose directory already exists, are
/// reported as warnings and skipped. Returns the renames that were performed.
pub fn rename(args: &RenameArgs) -> Result<Vec<Rename>, Report> {
    let mapping = read_mapping(&args.spreadsheet, &args.sample_column)?;

    let mut renames = Vec::new();
    for (barcode, sample) in mapping {
        let from = args.input_dir.join(&barcode);
        let to = args.input_dir.join(&sample);

        if !from.exists() {
            let from = utils::absolute_path(&from)?;
            warn!("Directory {} not found for sample {sample}", from.display());
            continue;
        }
        if to.exists() {
            warn!("Directory {} already exists, skipping barcode {barcode}", to.display());
            continue;
        }

        info!("Renaming {} to {}", from.display(), to.display());
        std::fs::rename(&from, &to)
            .wrap_err_with(|| format!("Failed to rename {from:?} to {to:?}"))?;
        renames.push(Rename { barcode, sample, from, to });
    }

    Ok(renames)
}
