//! Convert report spreadsheets to comma-separated tables.

use crate::report::Manifest;
use calamine::{open_workbook_auto, Data, Reader};
use color_eyre::eyre::{eyre, Report, Result, WrapErr};
use itertools::Itertools;
use log::{debug, warn};
use maba16s_table::Table;
use maba16s_utils as utils;
use std::fmt::Debug;
use std::path::{Path, PathBuf};

/// File extensions recognized as spreadsheets.
pub const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "ods"];

/// Convert every spreadsheet in `input_dir` to `<sample>.csv` in `output_dir`.
///
/// Files that are not spreadsheets are ignored. The first spreadsheet that
/// cannot be read aborts the conversion.
pub fn convert_dir<P, Q>(input_dir: &P, output_dir: &Q) -> Result<Manifest, Report>
where
    P: AsRef<Path> + Debug,
    Q: AsRef<Path> + Debug,
{
    let input = Manifest::from_dir(input_dir, SPREADSHEET_EXTENSIONS)?;
    if input.is_empty() {
        warn!("No spreadsheets were found in: {input_dir:?}");
    }
    utils::create_dir(output_dir)?;

    let mut output = Manifest::new();
    for sample in input.iter() {
        let path = output_dir.as_ref().join(format!("{}.csv", sample.name));
        convert_file(&sample.path, &path)?;
        output.push(path)?;
    }

    Ok(output)
}

/// Convert the first worksheet of a spreadsheet to a comma-separated table.
pub fn convert_file<P, Q>(input: &P, output: &Q) -> Result<(), Report>
where
    P: AsRef<Path> + Debug,
    Q: AsRef<Path> + Debug,
{
    debug!("Converting {input:?} to {output:?}");
    read_spreadsheet(input)?.write(output, Some(','))
}

/// Read the first worksheet of a spreadsheet, using its first row as the headers.
pub fn read_spreadsheet<P>(path: &P) -> Result<Table<String, PathBuf>, Report>
where
    P: AsRef<Path> + Debug,
{
    let mut workbook = open_workbook_auto(path)
        .wrap_err_with(|| format!("Failed to open spreadsheet: {path:?}"))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| eyre!("Spreadsheet has no worksheets: {path:?}"))?
        .wrap_err_with(|| format!("Failed to read worksheet: {path:?}"))?;

    let mut rows = range.rows().map(|row| row.iter().map(cell_to_string).collect_vec());

    let mut table = Table::new();
    if let Some(headers) = rows.next() {
        table.headers = headers;
    }
    rows.try_for_each(|row| table.add_row(row))?;
    table.path = Some(path.as_ref().to_path_buf());

    Ok(table)
}

/// Format a spreadsheet cell the way it is written to a csv file.
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        // integral values have no fractional part, 90.0 => "90"
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(true) => "True".to_string(),
        Data::Bool(false) => "False".to_string(),
        other => other.to_string(),
    }
}
