//! File-system helpers shared by the `maba16s` crates.

use color_eyre::eyre::{eyre, ContextCompat, Report, Result, WrapErr};
use color_eyre::Help;
use log::debug;
use std::fmt::Debug;
use std::path::{Path, PathBuf};

/// Get delimiter based on file extension.
///
/// ## Arguments
///
/// - `path` - File path.
///
/// ## Examples
///
/// - `.tsv` => `\t`
/// - `.txt` => `\t`
/// - `.csv` => `,`
///
/// Note that `.txt` is assumed to be tab-delimited!
///
/// ```rust
/// use maba16s_utils::get_delimiter;
///
/// assert_eq!(get_delimiter(&"file.tsv")?, '\t');
/// assert_eq!(get_delimiter(&"file.csv")?, ',');
/// assert_eq!(get_delimiter(&"file.txt")?, '\t');
/// assert!(get_delimiter(&"file").is_err());
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn get_delimiter<P>(path: &P) -> Result<char, Report>
where
    P: AsRef<Path> + Debug,
{
    let ext = path
        .as_ref()
        .extension()
        .wrap_err_with(|| format!("Failed to get file extension: {path:?}"))?
        .to_str()
        .wrap_err_with(|| format!("Failed to convert file extension to str: {path:?}"))?;
    // convert extension to the expected delimiter
    match ext {
        "tsv" | "txt" => Ok('\t'),
        "csv" => Ok(','),
        _ext => {
            Err(eyre!("Unknown file extension: {_ext:?}").suggestion("Options: tsv, csv, or txt"))
        }
    }
}

/// Returns the file name of `path` without its final extension.
///
/// ```rust
/// use maba16s_utils::file_stem;
///
/// assert_eq!(file_stem(&"reports/barcode01.xlsx")?, "barcode01");
/// assert_eq!(file_stem(&"reports/sample.v2.csv")?, "sample.v2");
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn file_stem<P>(path: &P) -> Result<String, Report>
where
    P: AsRef<Path> + Debug,
{
    let stem = path
        .as_ref()
        .file_stem()
        .wrap_err_with(|| format!("Failed to get file stem: {path:?}"))?
        .to_str()
        .wrap_err_with(|| format!("Failed to convert file stem to str: {path:?}"))?;
    Ok(stem.to_string())
}

/// Create a directory, and all of its parents, if it does not already exist.
pub fn create_dir<P>(path: &P) -> Result<(), Report>
where
    P: AsRef<Path> + Debug,
{
    if !path.as_ref().exists() {
        debug!("Creating directory: {path:?}");
        std::fs::create_dir_all(path)
            .wrap_err_with(|| format!("Failed to create directory: {path:?}"))?;
    }
    Ok(())
}

/// Create the parent directory of a file path, if it does not already exist.
pub fn create_parent_dir<P>(path: &P) -> Result<(), Report>
where
    P: AsRef<Path> + Debug,
{
    match path.as_ref().parent() {
        Some(parent) if !parent.as_os_str().is_empty() => create_dir(&parent),
        _ => Ok(()),
    }
}

/// Returns `path` as an absolute path, without resolving symlinks.
///
/// The path does not need to exist.
///
/// ```rust
/// use maba16s_utils::absolute_path;
///
/// let path = absolute_path(&"output")?;
/// assert!(path.is_absolute());
/// assert!(path.ends_with("output"));
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn absolute_path<P>(path: &P) -> Result<PathBuf, Report>
where
    P: AsRef<Path> + Debug,
{
    std::path::absolute(path).wrap_err_with(|| format!("Failed to get absolute path: {path:?}"))
}
