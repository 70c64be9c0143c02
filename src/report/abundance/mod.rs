//! Species read counts and percentages per sample.
//!
//! The merged table is consolidated into one [`Abundance`] per (sample, label) pair,
//! in which the read counts are summed and expressed as a percentage of the sample's
//! total reads. Labels at or below [`ReportOptions::collapse_threshold`] percent are then
//! [collapsed](collapse) into a single [`ReportOptions::other_label`] row per sample.
//!
//! Rows are ordered by sample, then label.


use crate::report::{PercentageMode, ReportOptions};
use color_eyre::eyre::{eyre, Report, Result, WrapErr};
use itertools::Itertools;
use log::debug;
use maba16s_table::Table;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Column of the sample total reads in the consolidated percentage table.
pub const TOTAL_READS_COLUMN: &str = "Total_reads";
/// Column of the percentage in the consolidated percentage table.
pub const PERCENTAGE_COLUMN: &str = "Percentage";

/// Plotly's qualitative color palette.
pub const PALETTE: [&str; 10] = [
    "#636EFA", "#EF553B", "#00CC96", "#AB63FA", "#FFA15A", "#19D3F3", "#FF6692", "#B6E880",
    "#FF97FF", "#FECB52",
];

/// The reads of one label (blast hit) within one sample.
#[derive(Clone, Debug, PartialEq)]
pub struct Abundance {
    pub sample: String,
    pub label: String,
    pub reads: u64,
    /// Total reads of the sample.
    pub total_reads: u64,
    /// Percentage of the sample's total reads, rounded to 2 decimals.
    pub percentage: f64,
}

/// Group the merged table by (sample, label), summing reads and computing percentages.
///
/// Rows without a sample or label are dropped. An empty read count is counted as zero.
pub fn consolidate(
    merged: &Table<String, PathBuf>,
    options: &ReportOptions,
) -> Result<Vec<Abundance>, Report> {
    let sample_i = merged.get_header_index(&options.sample_column)?;
    let label_i = merged.get_header_index(&options.hit_column)?;
    let reads_i = merged.get_header_index(&options.count_column)?;

    let mut groups: BTreeMap<(String, String), u64> = BTreeMap::new();
    for (row_i, row) in merged.rows.iter().enumerate() {
        let (sample, label) = (&row[sample_i], &row[label_i]);
        if sample.is_empty() || label.is_empty() {
            debug!("Dropping row {row_i} without a sample or label: {row:?}");
            continue;
        }
        let reads = parse_reads(&row[reads_i]).wrap_err_with(|| {
            format!("Invalid {} in row {} of {:?}", options.count_column, row_i + 1, merged.path)
        })?;
        *groups.entry((sample.clone(), label.clone())).or_default() += reads;
    }

    let mut totals: BTreeMap<&str, u64> = BTreeMap::new();
    groups.iter().for_each(|((sample, _), reads)| {
        *totals.entry(sample.as_str()).or_default() += reads;
    });

    let abundances = groups
        .iter()
        .map(|((sample, label), reads)| {
            let total_reads = totals[sample.as_str()];
            Abundance {
                sample: sample.clone(),
                label: label.clone(),
                reads: *reads,
                total_reads,
                percentage: percentage(*reads, total_reads),
            }
        })
        .collect_vec();

    Ok(abundances)
}

/// Relabel rows at or below the collapse threshold, then regroup by (sample, label).
///
/// In [`PercentageMode::Summed`] the reads, total reads and percentages of regrouped rows
/// are all summed, so the percentages of a sample can drift away from 100. In
/// [`PercentageMode::Recomputed`] the percentage is recomputed from the summed reads.
pub fn collapse(abundances: Vec<Abundance>, options: &ReportOptions) -> Vec<Abundance> {
    let mut groups: BTreeMap<(String, String), Abundance> = BTreeMap::new();

    for mut abundance in abundances {
        if abundance.percentage <= options.collapse_threshold {
            abundance.label = options.other_label.clone();
        }
        match groups.entry((abundance.sample.clone(), abundance.label.clone())) {
            Entry::Vacant(entry) => {
                entry.insert(abundance);
            }
            Entry::Occupied(mut entry) => {
                let group = entry.get_mut();
                group.reads += abundance.reads;
                if options.percentage_mode == PercentageMode::Summed {
                    group.total_reads += abundance.total_reads;
                    group.percentage += abundance.percentage;
                }
            }
        }
    }

    let mut collapsed = groups.into_values().collect_vec();
    if options.percentage_mode == PercentageMode::Recomputed {
        collapsed.iter_mut().for_each(|a| a.percentage = percentage(a.reads, a.total_reads));
    }
    collapsed
}

/// Assign each label a color from the [`PALETTE`], in order of first appearance.
///
/// Colors are reused cyclically when there are more labels than colors.
pub fn label_colors(abundances: &[Abundance]) -> Vec<(String, &'static str)> {
    abundances
        .iter()
        .map(|a| a.label.as_str())
        .unique()
        .enumerate()
        .map(|(i, label)| (label.to_string(), PALETTE[i % PALETTE.len()]))
        .collect_vec()
}

/// Convert abundances to the consolidated percentage table, with percentages to 2 decimals.
pub fn to_table(abundances: &[Abundance], options: &ReportOptions) -> Table<String, PathBuf> {
    let mut table = Table::new();
    table.headers = vec![
        options.sample_column.clone(),
        options.hit_column.clone(),
        options.count_column.clone(),
        TOTAL_READS_COLUMN.to_string(),
        PERCENTAGE_COLUMN.to_string(),
    ];
    table.rows = abundances
        .iter()
        .map(|a| {
            vec![
                a.sample.clone(),
                a.label.clone(),
                a.reads.to_string(),
                a.total_reads.to_string(),
                format!("{:.2}", a.percentage),
            ]
        })
        .collect_vec();
    table
}

/// Returns `reads` as a percentage of `total_reads`, rounded to 2 decimals.
///
/// A sample without reads has 0 percent of every label.
pub fn percentage(reads: u64, total_reads: u64) -> f64 {
    match total_reads {
        0 => 0.0,
        _ => round_percentage((reads as f64 / total_reads as f64) * 100.0),
    }
}

/// Round to 2 decimals, with ties rounded to the nearest even digit.
///
/// ```rust
/// use maba16s::report::abundance::round_percentage;
///
/// assert_eq!(round_percentage(0.125), 0.12);
/// assert_eq!(round_percentage(0.375), 0.38);
/// assert_eq!(round_percentage(100.0 / 3.0), 33.33);
/// ```
pub fn round_percentage(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Parse a read count, which may have been written as an integral float (`90.0`).
pub fn parse_reads(value: &str) -> Result<u64, Report> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(0);
    }
    if let Ok(reads) = value.parse::<u64>() {
        return Ok(reads);
    }
    match value.parse::<f64>() {
        Ok(reads) if reads.is_finite() && reads >= 0.0 && reads.fract() == 0.0 => Ok(reads as u64),
        _ => Err(eyre!("Read count is not a non-negative integer: {value:?}")),
    }
}
