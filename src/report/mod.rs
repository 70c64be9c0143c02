//! Summarize per-sample report spreadsheets as a species abundance chart and tables.

pub mod abundance;
pub mod chart;
pub mod convert;
pub mod dominance;
pub mod grid;
pub mod manifest;
pub mod merge;
pub mod project;

#[cfg(test)]
pub(crate) mod fixtures;
#[cfg(test)]
mod tests;

use clap::{Args as ClapArgs, Parser, ValueEnum};
use color_eyre::eyre::{Report, Result, WrapErr};
use log::info;
use maba16s_utils as utils;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use strum::{Display, EnumString};

#[doc(inline)]
pub use manifest::{Manifest, Sample};

// ----------------------------------------------------------------------------
// ReportArgs
// ----------------------------------------------------------------------------

/// Summarize a directory of per-sample report spreadsheets.
#[derive(Clone, Debug, Deserialize, Parser, PartialEq, Serialize)]
pub struct ReportArgs {
    /// Directory of per-sample report spreadsheets (.xlsx).
    #[clap(short = 'i', long, required = true)]
    pub input_dir: PathBuf,

    /// Output directory.
    ///
    /// If the directory does not exist, it will be created.
    #[clap(short = 'o', long, required = true)]
    pub output_dir: PathBuf,

    #[clap(flatten)]
    pub options: ReportOptions,
}

impl Default for ReportArgs {
    fn default() -> Self {
        ReportArgs::new()
    }
}

impl ReportArgs {
    pub fn new() -> Self {
        ReportArgs {
            input_dir: PathBuf::new(),
            output_dir: PathBuf::new(),
            options: ReportOptions::default(),
        }
    }
}

// ----------------------------------------------------------------------------
// ReportOptions
// ----------------------------------------------------------------------------

/// Column names, thresholds and rendering options of the report.
#[derive(Clone, Debug, Deserialize, ClapArgs, PartialEq, Serialize)]
#[serde(default)]
pub struct ReportOptions {
    /// Column with the taxonomic label (blast hit) of each report row.
    #[clap(long, default_value_t = ReportOptions::default().hit_column)]
    pub hit_column: String,

    /// Column with the number of reads of each report row.
    #[clap(long, default_value_t = ReportOptions::default().count_column)]
    pub count_column: String,

    /// Column added to the merged table with the sample (barcode) of each row.
    #[clap(long, default_value_t = ReportOptions::default().sample_column)]
    pub sample_column: String,

    /// Label that low abundance species are collapsed into.
    #[clap(long, default_value_t = ReportOptions::default().other_label)]
    pub other_label: String,

    /// Species at or below this percentage of a sample are collapsed into the other label.
    #[clap(long, default_value_t = ReportOptions::default().collapse_threshold)]
    pub collapse_threshold: f64,

    /// How the percentage of a collapsed row is derived.
    #[clap(long, value_enum, default_value_t = PercentageMode::default())]
    pub percentage_mode: PercentageMode,

    /// Taxon summarized in the presence/absence image.
    #[clap(long, default_value_t = ReportOptions::default().taxon)]
    pub taxon: String,

    /// A sample is dominated by the taxon when its percentage is strictly above this value.
    #[clap(long, default_value_t = ReportOptions::default().dominance_threshold)]
    pub dominance_threshold: f64,

    /// Number of samples per row of the presence/absence image.
    #[clap(long, default_value_t = ReportOptions::default().grid_columns)]
    pub grid_columns: usize,

    /// TrueType font for the presence/absence image, otherwise a system font is used.
    #[clap(long)]
    pub font: Option<PathBuf>,

    /// Read all report options from a JSON file, as written to `report_args.json`.
    #[clap(long)]
    #[serde(skip)]
    pub config: Option<PathBuf>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        ReportOptions {
            hit_column: "blast_hit".to_string(),
            count_column: "num_reads".to_string(),
            sample_column: "Barcode".to_string(),
            other_label: "Other species <1%".to_string(),
            collapse_threshold: 1.0,
            percentage_mode: PercentageMode::default(),
            taxon: "Lactobacillus crispatus".to_string(),
            dominance_threshold: 60.0,
            grid_columns: 4,
            font: None,
            config: None,
        }
    }
}

impl ReportOptions {
    /// Returns the options from the `--config` JSON file if one was given,
    /// otherwise a copy of self.
    pub fn resolve(&self) -> Result<ReportOptions, Report> {
        match &self.config {
            Some(path) => {
                info!("Importing report options: {path:?}");
                ReportOptions::read(path)
            }
            None => Ok(self.clone()),
        }
    }

    /// Reads [`ReportOptions`] from a JSON file.
    ///
    /// Options missing from the file take their default value.
    pub fn read<P>(path: &P) -> Result<ReportOptions, Report>
    where
        P: AsRef<Path> + Debug,
    {
        let input = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read report options: {path:?}."))?;
        let options = serde_json::from_str(&input)
            .wrap_err_with(|| format!("Failed to deserialize report options: {input}"))?;
        Ok(options)
    }

    /// Write [`ReportOptions`] to a JSON file.
    pub fn write<P>(&self, path: &P) -> Result<(), Report>
    where
        P: AsRef<Path> + Debug,
    {
        utils::create_parent_dir(path)?;
        let output = serde_json::to_string_pretty(self)
            .wrap_err_with(|| format!("Failed to serialize report options: {self:?}"))?;
        std::fs::write(path, output)
            .wrap_err_with(|| format!("Failed to write report options: {path:?}"))?;
        Ok(())
    }
}

/// How the percentage of a row is derived after low abundance species are collapsed.
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Display, EnumString, PartialEq, Serialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PercentageMode {
    /// Sum the already rounded percentages (and total reads) of the collapsed rows.
    #[default]
    Summed,
    /// Recompute the percentage from the summed read count and the sample total.
    Recomputed,
}

// ----------------------------------------------------------------------------
// Output Paths
// ----------------------------------------------------------------------------

/// File paths written by the [`report`] pipeline, relative to the output directory.
#[derive(Clone, Debug, PartialEq)]
pub struct ReportPaths {
    pub converted_dir: PathBuf,
    pub processed_dir: PathBuf,
    pub merged: PathBuf,
    pub chart: PathBuf,
    pub percentages: PathBuf,
    pub dominance_table: PathBuf,
    pub dominance_image: PathBuf,
    pub options: PathBuf,
}

impl ReportPaths {
    pub fn new(output_dir: &Path) -> Self {
        ReportPaths {
            converted_dir: output_dir.join("converted_csv"),
            processed_dir: output_dir.join("processed_csv"),
            merged: output_dir.join("merged_data.csv"),
            chart: output_dir.join("stacked_bar_plot.html"),
            percentages: output_dir.join("species_percentages.csv"),
            dominance_table: output_dir.join("crispatus_presence_absence.csv"),
            dominance_image: output_dir.join("crispatus_presence_absence.png"),
            options: output_dir.join("report_args.json"),
        }
    }
}

// ----------------------------------------------------------------------------
// Report
// ----------------------------------------------------------------------------

/// Run the reporting pipeline on a directory of per-sample report spreadsheets.
///
/// Every output is overwritten, so the pipeline can safely be rerun on the same directory.
pub fn report(args: &ReportArgs) -> Result<ReportPaths, Report> {
    let options = args.options.resolve()?;
    let paths = ReportPaths::new(&args.output_dir);

    utils::create_dir(&args.output_dir)?;
    options.write(&paths.options)?;

    info!("Converting spreadsheets: {:?}", args.input_dir);
    let converted = convert::convert_dir(&args.input_dir, &paths.converted_dir)?;

    info!("Selecting columns: {}, {}", options.hit_column, options.count_column);
    let columns = [options.hit_column.clone(), options.count_column.clone()];
    let processed = project::project_dir(&converted, &paths.processed_dir, &columns)?;

    info!("Merging {} samples: {:?}", processed.len(), paths.merged);
    let merged = merge::merge(&processed, &paths.merged, &options.sample_column)?;

    info!("Calculating species percentages: {:?}", paths.percentages);
    let abundances = abundance::consolidate(&merged, &options)?;
    let abundances = abundance::collapse(abundances, &options);
    abundance::to_table(&abundances, &options).write(&paths.percentages, Some(','))?;

    info!("Plotting species percentages: {:?}", paths.chart);
    let colors = abundance::label_colors(&abundances);
    chart::write_html(&abundances, &colors, &paths.chart)?;

    info!("Summarizing {} dominance: {:?}", options.taxon, paths.dominance_image);
    let records = dominance::classify_file(&paths.percentages, &options)?;
    let table = dominance::to_table(&records, &options);
    table.write(&paths.dominance_table, Some(','))?;
    info!("{} dominance:\n{}", options.taxon, table.to_markdown());
    grid::write_png(&records, &options, &paths.dominance_image)?;

    info!("Done.");
    Ok(paths)
}
