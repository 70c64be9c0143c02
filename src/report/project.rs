//! Reduce per-sample tables to the blast hit and read count columns.

use crate::report::Manifest;
use color_eyre::eyre::{Report, Result, WrapErr};
use log::debug;
use maba16s_table::Table;
use maba16s_utils as utils;
use std::fmt::Debug;
use std::path::{Path, PathBuf};

/// Write each table of the manifest to `output_dir`, keeping only `columns` in the given order.
pub fn project_dir<P>(
    input: &Manifest,
    output_dir: &P,
    columns: &[String],
) -> Result<Manifest, Report>
where
    P: AsRef<Path> + Debug,
{
    utils::create_dir(output_dir)?;

    let mut output = Manifest::new();
    for sample in input.iter() {
        let file_name = sample
            .path
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(format!("{}.csv", sample.name)));
        let path = output_dir.as_ref().join(file_name);
        project_file(&sample.path, &path, columns)?;
        output.push(path)?;
    }

    Ok(output)
}

/// Keep only `columns` of a comma-separated table, preserving the row order.
pub fn project_file<P, Q>(
    input: &P,
    output: &Q,
    columns: &[String],
) -> Result<Table<String, PathBuf>, Report>
where
    P: AsRef<Path> + Debug,
    Q: AsRef<Path> + Debug,
{
    debug!("Selecting columns {columns:?} from {input:?}");
    let table = Table::read(input, Some(','))?
        .select(columns)
        .wrap_err_with(|| format!("Report is missing a required column: {input:?}"))?;
    table.write(output, Some(','))?;
    Ok(table)
}
