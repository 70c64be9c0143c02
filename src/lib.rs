//! `maba16s` automates the Maastricht Bacterial 16S workflow.
//!
//! 1. [`rename`] raw sequencer barcode directories to the sample names listed in a spreadsheet.
//! 1. [`workflow::run`] the external snakemake workflow, which turns sequencing reads into one
//!    species abundance report spreadsheet per sample.
//! 1. [`report`] those spreadsheets as a stacked bar chart of species percentages, a consolidated
//!    percentage table and a presence/absence summary of a target taxon.
//!
//! The reporting pipeline is a chain of batch stages which communicate through files:
//!
//! | Stage                                  | Output                                 |
//! |----------------------------------------|----------------------------------------|
//! | [convert](report::convert)             | `converted_csv/<sample>.csv`           |
//! | [project](report::project)             | `processed_csv/<sample>.csv`           |
//! | [merge](report::merge)                 | `merged_data.csv`                      |
//! | [abundance](report::abundance)         | `species_percentages.csv`              |
//! | [chart](report::chart)                 | `stacked_bar_plot.html`                |
//! | [dominance](report::dominance)         | `crispatus_presence_absence.{csv,png}` |

pub mod cli;
pub mod rename;
pub mod report;
pub mod workflow;

#[doc(inline)]
pub use crate::cli::{Cli, Verbosity};
#[doc(inline)]
pub use crate::rename::{rename, RenameArgs};
#[doc(inline)]
pub use crate::report::{report, PercentageMode, ReportArgs, ReportOptions};
#[doc(inline)]
pub use crate::workflow::WorkflowArgs;
