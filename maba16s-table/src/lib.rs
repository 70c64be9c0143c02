//! Create and manipulate a row-based [`Table`].

use color_eyre::eyre::{eyre, Report, Result, WrapErr};
use color_eyre::Help;
use itertools::Itertools;
use maba16s_utils as utils;
use serde::{Deserialize, Serialize};
use std::cmp::PartialEq;
use std::fmt::{Debug, Display};
use std::path::{Path, PathBuf};

/// A row-based [`Table`] of generic data.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Table<T, P> {
    /// Names of the table columns.
    pub headers: Vec<T>,
    /// Rows of table values.
    pub rows: Vec<Vec<T>>,
    /// Optional file path for where the table was read from.
    pub path: Option<P>,
}

impl<T, P> Default for Table<T, P>
where
    T: Clone + Display + Debug + PartialEq<T>,
    P: AsRef<Path> + Clone + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, P> Table<T, P>
where
    T: Clone + Display + Debug + PartialEq<T>,
    P: AsRef<Path> + Clone + Debug,
{
    /// Returns a new row-based [`Table`] with empty headers and rows.
    ///
    /// ## Examples
    ///
    /// ```
    /// use maba16s_table::Table;
    /// use std::path::PathBuf;
    ///
    /// let mut table: Table<&str, PathBuf> = Table::new();
    /// table.headers = vec!["1", "2", "3"];
    /// table.add_row(vec!["A", "B", "C"])?;
    /// # assert_eq!(table.rows, vec![vec!["A", "B", "C"]]);
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    ///
    /// | 1 | 2 | 3 |
    /// |---|---|---|
    /// | A | B | C |
    pub fn new() -> Self {
        Table { headers: Vec::new(), rows: Vec::new(), path: None }
    }

    /// Add a new row to the table.
    ///
    /// The row must be as wide as the headers, when headers are present.
    ///
    /// ## Examples
    ///
    /// ```
    /// use maba16s_table::Table;
    /// use std::path::PathBuf;
    ///
    /// let mut table: Table<&str, PathBuf> = Table::new();
    /// table.headers = vec!["1", "2", "3"];
    /// table.add_row(["A", "B", "C"])?;
    /// table.add_row(["D", "E", "F"])?;
    /// assert!(table.add_row(["G"]).is_err());
    /// # assert_eq!(table.rows, [["A", "B", "C"], ["D", "E", "F"]]);
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    ///
    /// | 1 | 2 | 3 |
    /// |---|---|---|
    /// | A | B | C |
    /// | D | E | F |
    ///
    pub fn add_row<I>(&mut self, row: I) -> Result<(), Report>
    where
        I: IntoIterator<Item = T>,
    {
        let row = row.into_iter().collect::<Vec<T>>();
        let ex = match self.headers.is_empty() {
            true => self.rows.first().map(|r| r.len()),
            false => Some(self.headers.len()),
        };
        if let Some(ex) = ex {
            let new = row.len();
            if ex != new {
                return Err(eyre!("New row size ({new}) does not match existing table ({ex})."));
            }
        }
        self.rows.push(row);
        Ok(())
    }

    /// Adds a new column to the [`Table`].
    ///
    /// ## Examples
    ///
    /// ```
    /// use maba16s_table::Table;
    /// use std::path::PathBuf;
    ///
    /// let mut table: Table<&str, PathBuf> = Table::new();
    /// table.headers = vec!["1", "2", "3"];
    /// table.add_row(["A", "B", "C"])?;
    /// table.add_column("4", vec!["D"])?;
    ///
    /// assert_eq!(table.get_column(&"4")?, [&"D"]);
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    ///
    /// | 1 | 2 | 3 | 4 |
    /// |---|---|---|---|
    /// | A | B | C | D |
    ///
    pub fn add_column<I>(&mut self, header: T, column: I) -> Result<(), Report>
    where
        I: IntoIterator<Item = T>,
    {
        let column = column.into_iter().collect::<Vec<T>>();
        let ex = self.rows.len();
        let new = column.len();

        if ex != new {
            return Err(eyre!("New column size ({new}) does not match existing table ({ex})."));
        }

        self.headers.push(header);

        column.into_iter().zip(self.rows.iter_mut()).for_each(|(val, row)| {
            row.push(val);
        });
        Ok(())
    }

    /// Returns a [`Vec`] of [`Table`] values under a header.
    ///
    /// ## Examples
    ///
    /// ```
    /// use maba16s_table::Table;
    /// use std::path::PathBuf;
    ///
    /// let mut table: Table<&str, PathBuf> = Table::new();
    /// table.headers = vec!["1", "2", "3"];
    /// table.add_row(["A", "B", "C"])?;
    /// table.add_row(["D", "E", "F"])?;
    ///
    /// assert_eq!(table.get_column(&"1")?, [&"A", &"D"]);
    /// assert_eq!(table.get_column(&"3")?, [&"C", &"F"]);
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn get_column(&self, header: &T) -> Result<Vec<&T>, Report> {
        let header_i = self.get_header_index(header)?;
        let column = self.rows.iter().map(|row| &row[header_i]).collect();
        Ok(column)
    }

    /// Returns the column index (0-based) of the header in the [`Table`].
    ///
    /// ## Examples
    ///
    /// ```
    /// use maba16s_table::Table;
    /// use std::path::PathBuf;
    ///
    /// let mut table: Table<&str, PathBuf> = Table::new();
    /// table.headers = vec!["1", "2", "3"];
    ///
    /// assert_eq!(table.get_header_index(&"1")?, 0);
    /// assert_eq!(table.get_header_index(&"3")?, 2);
    /// assert!(table.get_header_index(&"4").is_err());
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn get_header_index(&self, header: &T) -> Result<usize, Report> {
        let pos = self.headers.iter().position(|h| h == header).ok_or_else(|| {
            eyre!("Column '{header}' was not found in table: {:?}.", self.path)
                .suggestion(format!("Available columns: {}", self.headers.iter().join(", ")))
        })?;

        Ok(pos)
    }

    /// Returns a new [`Table`] with only the requested columns, in the requested order.
    ///
    /// ## Examples
    ///
    /// ```
    /// use maba16s_table::Table;
    /// use std::path::PathBuf;
    ///
    /// let mut table: Table<&str, PathBuf> = Table::new();
    /// table.headers = vec!["1", "2", "3"];
    /// table.add_row(["A", "B", "C"])?;
    /// table.add_row(["D", "E", "F"])?;
    ///
    /// let selected = table.select(&["3", "1"])?;
    /// assert_eq!(selected.headers, ["3", "1"]);
    /// assert_eq!(selected.rows, [["C", "A"], ["F", "D"]]);
    /// assert!(table.select(&["4"]).is_err());
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn select(&self, headers: &[T]) -> Result<Table<T, P>, Report> {
        let indices =
            headers.iter().map(|h| self.get_header_index(h)).collect::<Result<Vec<_>, _>>()?;
        let rows = self
            .rows
            .iter()
            .map(|row| indices.iter().map(|i| row[*i].clone()).collect_vec())
            .collect_vec();

        Ok(Table { headers: headers.to_vec(), rows, path: self.path.clone() })
    }

    /// Appends all rows of `other` to this [`Table`].
    ///
    /// An empty table takes on the headers of `other`, otherwise the headers must match.
    ///
    /// ## Examples
    ///
    /// ```
    /// use maba16s_table::Table;
    /// use std::path::PathBuf;
    ///
    /// let mut a: Table<&str, PathBuf> = Table::new();
    /// a.headers = vec!["1", "2"];
    /// a.add_row(["A", "B"])?;
    ///
    /// let mut merged = Table::new();
    /// merged.append(a.clone())?;
    /// merged.append(a)?;
    /// assert_eq!(merged.rows.len(), 2);
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn append(&mut self, other: Table<T, P>) -> Result<(), Report> {
        if self.headers.is_empty() && self.rows.is_empty() {
            self.headers = other.headers;
        } else if self.headers != other.headers {
            return Err(eyre!(
                "Table headers do not match: [{}] and [{}] ({:?}).",
                self.headers.iter().join(", "),
                other.headers.iter().join(", "),
                other.path,
            ));
        }
        other.rows.into_iter().try_for_each(|row| self.add_row(row))
    }

    /// Write [`Table`] to file [`Path`].
    ///
    /// If a delimiter is not provided, it is identified from the file extension.
    /// Values containing the delimiter or quotes are quoted.
    ///
    /// ## Examples
    ///
    /// ```
    /// use maba16s_table::Table;
    /// use std::path::PathBuf;
    /// use tempfile::TempDir;
    ///
    /// let mut table: Table<&str, PathBuf> = Table::new();
    /// table.headers = vec!["1", "2", "3"];
    /// table.add_row(["A", "B", "C"])?;
    ///
    /// let tmp = TempDir::new()?;
    /// let path = tmp.path().join("table.tsv");
    /// table.write(&path, None)?;
    /// assert_eq!(std::fs::read_to_string(&path)?, "1\t2\t3\nA\tB\tC\n");
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn write<Q>(&self, path: &Q, delim: Option<char>) -> Result<(), Report>
    where
        Q: AsRef<Path> + Debug,
    {
        utils::create_parent_dir(path)?;

        // if not provided, lookup delimiter from file extension
        let delim = match delim {
            Some(c) => c,
            None => utils::get_delimiter(path)?,
        };
        let delim = u8::try_from(delim)
            .wrap_err_with(|| format!("Delimiter must be a single byte character: {delim:?}"))?;

        let mut writer = csv::WriterBuilder::new()
            .delimiter(delim)
            .from_path(path)
            .wrap_err_with(|| format!("Unable to create file: {path:?}"))?;

        // write headers
        writer
            .write_record(self.headers.iter().map(|h| h.to_string()))
            .wrap_err_with(|| format!("Unable to write table headers: {path:?}"))?;

        // write regular rows
        self.rows.iter().try_for_each(|row| {
            writer
                .write_record(row.iter().map(|v| v.to_string()))
                .wrap_err_with(|| format!("Unable to write table row: {row:?}"))
        })?;

        writer.flush().wrap_err_with(|| format!("Unable to write file: {path:?}"))?;
        Ok(())
    }

    /// Convert table to markdown format.
    ///
    /// ```
    /// use maba16s_table::Table;
    /// use std::path::PathBuf;
    ///
    /// let mut table: Table<&str, PathBuf> = Table::new();
    /// table.headers = vec!["1", "2"];
    /// table.add_row(["A", "BB"])?;
    ///
    /// let expected = "| 1 | 2  |\n|---|----|\n| A | BB |\n";
    /// assert_eq!(table.to_markdown(), expected);
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn to_markdown(&self) -> String {
        // get the maximum width of each column, +2 to add space on either side
        let col_widths = self
            .headers
            .iter()
            .enumerate()
            .map(|(col_i, header)| {
                let header_width = header.to_string().chars().count();
                self.rows
                    .iter()
                    .map(|row| row[col_i].to_string().chars().count())
                    .chain(std::iter::once(header_width))
                    .max()
                    .unwrap_or(header_width)
                    + 2
            })
            .collect_vec();

        let format_line = |values: Vec<String>| {
            let cells = values
                .iter()
                .zip(col_widths.iter())
                .map(|(value, width)| format!(" {value:<w$} ", w = width - 2))
                .join("|");
            format!("|{cells}|\n")
        };

        let mut markdown = format_line(self.headers.iter().map(|h| h.to_string()).collect());
        // frame in between headers and rows
        let frame = col_widths.iter().map(|w| "-".repeat(*w)).join("|");
        markdown.push_str(&format!("|{frame}|\n"));

        for row in &self.rows {
            markdown.push_str(&format_line(row.iter().map(|v| v.to_string()).collect()));
        }

        markdown
    }
}

impl Table<String, PathBuf> {
    /// Read a delimited file into a [`Table`] of owned strings.
    ///
    /// The first record is used as the headers. If a delimiter is not
    /// provided, it is identified from the file extension.
    ///
    /// ## Examples
    ///
    /// ```
    /// use maba16s_table::Table;
    /// use tempfile::TempDir;
    ///
    /// let tmp = TempDir::new()?;
    /// let path = tmp.path().join("table.csv");
    /// std::fs::write(&path, "1,2,3\nA,\"B,b\",C\n")?;
    ///
    /// let table = Table::read(&path, None)?;
    /// assert_eq!(table.headers, ["1", "2", "3"]);
    /// assert_eq!(table.rows, [["A", "B,b", "C"]]);
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn read<Q>(path: &Q, delim: Option<char>) -> Result<Self, Report>
    where
        Q: AsRef<Path> + Debug,
    {
        // if not provided, lookup delimiter from file extension
        let delim = match delim {
            Some(c) => c,
            None => utils::get_delimiter(path)?,
        };
        let delim = u8::try_from(delim)
            .wrap_err_with(|| format!("Delimiter must be a single byte character: {delim:?}"))?;

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delim)
            .has_headers(true)
            .from_path(path)
            .wrap_err_with(|| eyre!("Failed to read file: {path:?}"))?;

        let mut table = Table::new();
        table.headers = reader
            .headers()
            .wrap_err_with(|| eyre!("Failed to parse table headers: {path:?}"))?
            .iter()
            .map(String::from)
            .collect_vec();

        for record in reader.records() {
            let record = record.wrap_err_with(|| eyre!("Failed to parse table row: {path:?}"))?;
            table.rows.push(record.iter().map(String::from).collect_vec());
        }

        table.path = Some(path.as_ref().to_path_buf());

        Ok(table)
    }
}
