//! Concatenate per-sample tables into one table, tagged by sample.

use crate::report::Manifest;
use color_eyre::eyre::{eyre, Report, Result, WrapErr};
use color_eyre::Help;
use log::debug;
use maba16s_table::Table;
use std::fmt::Debug;
use std::path::{Path, PathBuf};

/// Concatenate the tables of the manifest, in manifest order, and write the result to `output`.
///
/// A `sample_column` holding the sample name of each table is appended to every row.
pub fn merge<P>(
    input: &Manifest,
    output: &P,
    sample_column: &str,
) -> Result<Table<String, PathBuf>, Report>
where
    P: AsRef<Path> + Debug,
{
    if input.is_empty() {
        return Err(eyre!("No tables were found to merge.")
            .suggestion("Check that the workflow produced one report spreadsheet per sample."));
    }

    let mut merged = Table::new();
    for sample in input.iter() {
        let mut table = Table::read(&sample.path, Some(','))?;
        if table.headers.iter().any(|h| h == sample_column) {
            return Err(eyre!("Table already has a {sample_column:?} column: {:?}", sample.path));
        }
        debug!("Merging {} rows of sample {}", table.rows.len(), sample.name);
        let column = vec![sample.name.clone(); table.rows.len()];
        table.add_column(sample_column.to_string(), column)?;
        merged.append(table).wrap_err_with(|| {
            format!("Failed to merge sample {}: {:?}", sample.name, sample.path)
        })?;
    }

    merged.write(output, Some(','))?;
    merged.path = Some(output.as_ref().to_path_buf());

    Ok(merged)
}
