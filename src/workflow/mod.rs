//! Run the snakemake workflow on sequenced samples, followed by the [report](crate::report()).
//!
//! The workflow is configured through `config/config.yaml` in the workflow directory,
//! which lists the input samples and the output directory:
//!
//! ```yaml
//! SAMPLES:
//!   BC01: /data/BC01.fastq
//!   BC02: /data/BC02.fastq
//! parameters:
//!   outdir: /data/output
//! ```
//!
//! A pre-flight workflow first checks that the samples are suitable, then the main
//! workflow writes one report spreadsheet per sample to `<outdir>/reports`.


use crate::report::{report, ReportArgs, ReportOptions, ReportPaths};
use clap::Parser;
use color_eyre::eyre::{eyre, Report, Result, WrapErr};
use color_eyre::Help;
use log::{debug, info, warn};
use maba16s_utils as utils;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

/// Snakefile of the pre-flight workflow, relative to the workflow directory.
pub const PRECHECK_SNAKEFILE: &str = "Snakefile_check_suitable_samples.smk";
/// Directory of the report spreadsheets, relative to the output directory.
pub const REPORTS_DIR: &str = "reports";

// ----------------------------------------------------------------------------
// WorkflowArgs
// ----------------------------------------------------------------------------

/// Run the entire workflow on 16S sequenced samples.
#[derive(Clone, Debug, Deserialize, Parser, PartialEq, Serialize)]
pub struct WorkflowArgs {
    /// Input sample files, named by their file stem.
    #[clap(short = 'i', long, required = true, num_args = 1..)]
    pub input: Vec<PathBuf>,

    /// Number of CPU cores to use.
    #[clap(long, required = true)]
    pub cores: usize,

    /// Output directory.
    #[clap(short = 'o', long, required = true)]
    pub output_dir: PathBuf,

    /// Extra parameters passed to snakemake, as one whitespace-separated string.
    ///
    /// Quotes are not interpreted, so a single value cannot contain whitespace.
    #[clap(long, allow_hyphen_values = true)]
    pub snakemake_params: Option<String>,

    /// Directory with the Snakefiles, where `config/config.yaml` is written.
    #[clap(long, default_value = ".")]
    pub workflow_dir: PathBuf,

    /// Snakemake executable.
    #[clap(long, default_value_t = WorkflowArgs::default().executable)]
    pub executable: String,

    #[clap(flatten)]
    pub report: ReportOptions,
}

impl Default for WorkflowArgs {
    fn default() -> Self {
        WorkflowArgs::new()
    }
}

impl WorkflowArgs {
    pub fn new() -> Self {
        WorkflowArgs {
            input: Vec::new(),
            cores: 1,
            output_dir: PathBuf::new(),
            snakemake_params: None,
            workflow_dir: PathBuf::from("."),
            executable: "snakemake".to_string(),
            report: ReportOptions::default(),
        }
    }

    /// Extra snakemake parameters, split on whitespace.
    ///
    /// Quotes are passed through unchanged and do not group words.
    pub fn params(&self) -> Vec<String> {
        self.snakemake_params
            .as_deref()
            .map(|p| p.split_whitespace().map(String::from).collect())
            .unwrap_or_default()
    }
}

// ----------------------------------------------------------------------------
// WorkflowConfig
// ----------------------------------------------------------------------------

/// Configuration file of the snakemake workflow.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct WorkflowConfig {
    #[serde(rename = "SAMPLES")]
    pub samples: BTreeMap<String, PathBuf>,
    pub parameters: Parameters,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Parameters {
    pub outdir: PathBuf,
}

impl WorkflowConfig {
    /// Create a config of absolute sample and output paths.
    ///
    /// Samples are named by file stem. When two inputs share a stem, the last one is kept.
    pub fn new<P>(input: &[PathBuf], output_dir: &P) -> Result<Self, Report>
    where
        P: AsRef<Path> + Debug,
    {
        let mut samples = BTreeMap::new();
        for path in input {
            let name = utils::file_stem(path)?;
            let path = utils::absolute_path(path)?;
            if let Some(previous) = samples.insert(name.clone(), path) {
                warn!("Sample {name} is provided by more than one file, ignoring: {previous:?}");
            }
        }
        let outdir = utils::absolute_path(output_dir)?;
        Ok(WorkflowConfig { samples, parameters: Parameters { outdir } })
    }

    /// Reads a [`WorkflowConfig`] from a YAML file.
    pub fn read<P>(path: &P) -> Result<Self, Report>
    where
        P: AsRef<Path> + Debug,
    {
        let input = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read workflow config: {path:?}"))?;
        let config = serde_yaml::from_str(&input)
            .wrap_err_with(|| format!("Failed to deserialize workflow config: {path:?}"))?;
        Ok(config)
    }

    /// Write a [`WorkflowConfig`] to a YAML file.
    pub fn write<P>(&self, path: &P) -> Result<(), Report>
    where
        P: AsRef<Path> + Debug,
    {
        utils::create_parent_dir(path)?;
        let output = serde_yaml::to_string(self)
            .wrap_err_with(|| format!("Failed to serialize workflow config: {self:?}"))?;
        std::fs::write(path, output)
            .wrap_err_with(|| format!("Failed to write workflow config: {path:?}"))?;
        Ok(())
    }
}

/// Path of the workflow config file.
pub fn config_path(workflow_dir: &Path) -> PathBuf {
    workflow_dir.join("config").join("config.yaml")
}

// ----------------------------------------------------------------------------
// Snakemake
// ----------------------------------------------------------------------------

/// Arguments of the pre-flight workflow that checks the samples.
pub fn precheck_args(args: &WorkflowArgs) -> Vec<String> {
    let mut cmd = vec!["--cores".to_string(), args.cores.to_string(), "--use-conda".to_string()];
    cmd.extend(args.params());
    cmd.extend(["--snakefile".to_string(), PRECHECK_SNAKEFILE.to_string()]);
    cmd
}

/// Arguments of the main workflow.
pub fn workflow_args(args: &WorkflowArgs) -> Vec<String> {
    let mut cmd = vec![
        "-p".to_string(),
        "--cores".to_string(),
        args.cores.to_string(),
        "--use-conda".to_string(),
    ];
    cmd.extend(args.params());
    cmd.extend(["--notemp".to_string(), "--keep-going".to_string()]);
    cmd
}

/// Run an executable in `dir`, waiting for it to exit.
pub fn execute<P>(executable: &str, args: &[String], dir: &P) -> Result<ExitStatus, Report>
where
    P: AsRef<Path> + Debug,
{
    info!("Running: {executable} {}", args.join(" "));
    let status = Command::new(executable)
        .args(args)
        .current_dir(dir)
        .status()
        .wrap_err_with(|| format!("Failed to run {executable} in {dir:?}"))
        .suggestion("Check that snakemake is installed, or set --executable.")?;
    debug!("{executable} exited with: {status}");
    Ok(status)
}

/// Write the workflow config, run the pre-flight and main workflows, then the report.
pub fn run(args: &WorkflowArgs) -> Result<ReportPaths, Report> {
    let config = WorkflowConfig::new(&args.input, &args.output_dir)?;
    let path = config_path(&args.workflow_dir);
    info!("Writing workflow config: {path:?}");
    config.write(&path)?;

    let status = execute(&args.executable, &precheck_args(args), &args.workflow_dir)?;
    if !status.success() {
        return Err(eyre!("pre-workflow crashed ({status})"));
    }

    let status = execute(&args.executable, &workflow_args(args), &args.workflow_dir)?;
    if !status.success() {
        let outdir = &config.parameters.outdir;
        return Err(eyre!("Workflow failed ({status})")
            .suggestion(format!("Reports of completed samples are in: {outdir:?}")));
    }

    let report_args = ReportArgs {
        input_dir: config.parameters.outdir.join(REPORTS_DIR),
        output_dir: config.parameters.outdir.clone(),
        options: args.report.clone(),
    };
    report(&report_args)
}
