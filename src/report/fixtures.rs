//! Report spreadsheets and tables for unit tests.

use color_eyre::eyre::{Report, Result};
use maba16s_table::Table;
use rust_xlsxwriter::Workbook;
use std::path::{Path, PathBuf};

/// Write a report spreadsheet with `blast_hit`, `num_reads` and `avg_identity` columns.
pub fn write_report(path: &Path, rows: &[(&str, f64)]) -> Result<(), Report> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    for (col, header) in ["blast_hit", "num_reads", "avg_identity"].into_iter().enumerate() {
        worksheet.write_string(0, col as u16, header)?;
    }
    for (i, (hit, reads)) in rows.iter().enumerate() {
        let row = i as u32 + 1;
        worksheet.write_string(row, 0, *hit)?;
        worksheet.write_number(row, 1, *reads)?;
        worksheet.write_number(row, 2, 99.5)?;
    }
    workbook.save(path)?;
    Ok(())
}

/// A merged table of (sample, blast hit, reads) rows.
pub fn merged(rows: &[(&str, &str, &str)]) -> Result<Table<String, PathBuf>, Report> {
    let mut table = Table::new();
    table.headers = ["blast_hit", "num_reads", "Barcode"].map(String::from).to_vec();
    for (sample, hit, reads) in rows {
        table.add_row([hit, reads, sample].map(|v| v.to_string()))?;
    }
    Ok(table)
}

/// A consolidated percentage table of (sample, blast hit, percentage) rows.
pub fn percentages(rows: &[(&str, &str, &str)]) -> Result<Table<String, PathBuf>, Report> {
    let mut table = Table::new();
    let headers = ["Barcode", "blast_hit", "num_reads", "Total_reads", "Percentage"];
    table.headers = headers.map(String::from).to_vec();
    for (sample, hit, percentage) in rows {
        table.add_row([sample, hit, &"0", &"0", percentage].map(|v| v.to_string()))?;
    }
    Ok(table)
}
