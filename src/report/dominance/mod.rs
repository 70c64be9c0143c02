//! Presence/absence of a dominant taxon in each sample.

#[cfg(test)]
mod tests;

use crate::report::abundance::PERCENTAGE_COLUMN;
use crate::report::ReportOptions;
use color_eyre::eyre::{Report, Result, WrapErr};
use itertools::Itertools;
use log::debug;
use maba16s_table::Table;
use std::fmt::Debug;
use std::path::{Path, PathBuf};

/// Column of the dominance flag in the dominance table.
pub const DOMINANT_COLUMN: &str = "dominant";

/// Whether the target taxon dominates one sample.
#[derive(Clone, Debug, PartialEq)]
pub struct Dominance {
    pub sample: String,
    /// Percentage of the target taxon in the sample.
    pub percentage: f64,
    /// True when the percentage is strictly above the dominance threshold.
    pub dominant: bool,
}

/// Read a consolidated percentage table and [classify] each sample.
pub fn classify_file<P>(path: &P, options: &ReportOptions) -> Result<Vec<Dominance>, Report>
where
    P: AsRef<Path> + Debug,
{
    let table = Table::read(path, Some(','))?;
    classify(&table, options)
}

/// Classify each sample of a consolidated percentage table by the target taxon.
///
/// Samples are returned in order of first appearance. Only the first row of the taxon
/// in a sample is considered, and samples without the taxon are omitted.
pub fn classify(
    table: &Table<String, PathBuf>,
    options: &ReportOptions,
) -> Result<Vec<Dominance>, Report> {
    let sample_i = table.get_header_index(&options.sample_column)?;
    let label_i = table.get_header_index(&options.hit_column)?;
    let percentage_i = table.get_header_index(&PERCENTAGE_COLUMN.to_string())?;

    let samples = table.rows.iter().map(|row| row[sample_i].as_str()).unique().collect_vec();

    let mut records = Vec::new();
    for sample in samples {
        let Some((row_i, row)) = table
            .rows
            .iter()
            .enumerate()
            .find(|(_, row)| row[sample_i] == sample && row[label_i] == options.taxon)
        else {
            debug!("{sample}: {} not found", options.taxon);
            continue;
        };

        let value = &row[percentage_i];
        let percentage = value.trim().parse::<f64>().wrap_err_with(|| {
            format!("Invalid {PERCENTAGE_COLUMN} in row {}: {value:?}", row_i + 1)
        })?;
        let dominant = percentage > options.dominance_threshold;
        debug!("{sample}: {} {percentage:.2}% dominant={dominant}", options.taxon);

        records.push(Dominance { sample: sample.to_string(), percentage, dominant });
    }

    Ok(records)
}

/// Convert dominance records to a table of sample, dominance flag and percentage.
pub fn to_table(records: &[Dominance], options: &ReportOptions) -> Table<String, PathBuf> {
    let mut table = Table::new();
    table.headers = vec![
        options.sample_column.clone(),
        DOMINANT_COLUMN.to_string(),
        PERCENTAGE_COLUMN.to_string(),
    ];
    table.rows = records
        .iter()
        .map(|r| vec![r.sample.clone(), r.dominant.to_string(), format!("{:.2}", r.percentage)])
        .collect_vec();
    table
}
