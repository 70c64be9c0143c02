//! Explicit listing of per-sample files and the sample names derived from them.

use color_eyre::eyre::{eyre, Report, Result, WrapErr};
use itertools::Itertools;
use log::debug;
use maba16s_utils as utils;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::path::{Path, PathBuf};

/// A per-sample file, named by the stem of its file name.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Sample {
    pub name: String,
    pub path: PathBuf,
}

/// An ordered collection of per-sample files, with unique sample names.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Manifest {
    pub samples: Vec<Sample>,
}

impl Manifest {
    pub fn new() -> Self {
        Manifest { samples: Vec::new() }
    }

    /// List the files in `dir` that have one of the `extensions`, sorted by file name.
    ///
    /// Hidden files and spreadsheet lock files (`~$name.xlsx`) are skipped.
    pub fn from_dir<P>(dir: &P, extensions: &[&str]) -> Result<Self, Report>
    where
        P: AsRef<Path> + Debug,
    {
        let entries = std::fs::read_dir(dir)
            .wrap_err_with(|| format!("Failed to read directory: {dir:?}"))?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<Result<Vec<_>, _>>()
            .wrap_err_with(|| format!("Failed to read directory entries: {dir:?}"))?;

        let mut manifest = Manifest::new();
        for path in entries.into_iter().sorted_by_key(|p| p.file_name().map(|n| n.to_os_string())) {
            if !path.is_file() {
                continue;
            }
            let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            if file_name.starts_with('.') || file_name.starts_with("~$") {
                debug!("Skipping hidden or lock file: {path:?}");
                continue;
            }
            let matches = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)));
            if !matches {
                debug!("Skipping file without extension {extensions:?}: {path:?}");
                continue;
            }
            manifest.push(path)?;
        }

        Ok(manifest)
    }

    /// Add a file, named by its file stem.
    pub fn push(&mut self, path: PathBuf) -> Result<(), Report> {
        let name = utils::file_stem(&path)?;
        if let Some(existing) = self.samples.iter().find(|s| s.name == name) {
            return Err(eyre!(
                "Sample {name:?} is provided by more than one file: {:?} and {path:?}",
                existing.path
            ));
        }
        self.samples.push(Sample { name, path });
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
