use crate::report::fixtures;
use crate::report::*;
use color_eyre::eyre::{Report, Result};
use itertools::Itertools;
use std::path::Path;
use tempfile::TempDir;

/// Returns the x position and number of segments of each stacked bar in a chart.
fn stacked_bars(html: &str) -> Vec<(usize, String)> {
    html.lines()
        .filter(|line| line.contains("class=\"segment\""))
        .filter_map(|line| line.split(" x=\"").nth(1)?.split('"').next())
        .map(String::from)
        .dedup_with_count()
        .collect_vec()
}

/// Write the two sample reports BC01 (90/10) and BC02 (5/95) to `dir`.
fn write_reports(dir: &Path) -> Result<(), Report> {
    std::fs::create_dir_all(dir)?;
    fixtures::write_report(&dir.join("BC01.xlsx"), &[("SpeciesA", 90.0), ("SpeciesB", 10.0)])?;
    fixtures::write_report(&dir.join("BC02.xlsx"), &[("SpeciesA", 5.0), ("SpeciesB", 95.0)])?;
    Ok(())
}

#[test]
fn report_two_samples() -> Result<(), Report> {
    let tmp = TempDir::new()?;
    let input_dir = tmp.path().join("reports");
    write_reports(&input_dir)?;

    let output_dir = tmp.path().join("output");
    let args = ReportArgs { input_dir, output_dir, ..Default::default() };
    let paths = report(&args)?;

    for path in [
        &paths.merged,
        &paths.chart,
        &paths.percentages,
        &paths.dominance_table,
        &paths.dominance_image,
        &paths.options,
    ] {
        assert!(path.exists(), "{path:?}");
    }
    assert!(paths.converted_dir.join("BC01.csv").exists());
    assert!(paths.processed_dir.join("BC02.csv").exists());

    let observed = std::fs::read_to_string(&paths.percentages)?;
    let expected = "Barcode,blast_hit,num_reads,Total_reads,Percentage\n\
                    BC01,SpeciesA,90,100,90.00\n\
                    BC01,SpeciesB,10,100,10.00\n\
                    BC02,SpeciesA,5,100,5.00\n\
                    BC02,SpeciesB,95,100,95.00\n";
    assert_eq!(observed, expected);

    let html = std::fs::read_to_string(&paths.chart)?;
    assert_eq!(html.matches("class=\"segment\"").count(), 4);
    assert_eq!(html.matches("class=\"legend-item\"").count(), 2);
    // two bars of two segments, one axis label per sample
    let bars = stacked_bars(&html);
    assert_eq!(bars.iter().map(|(n, _)| *n).collect_vec(), [2, 2]);
    assert_ne!(bars[0].1, bars[1].1);
    assert_eq!(html.matches("class=\"sample\"").count(), 2);
    assert!(html.contains(">BC01</text>"));
    assert!(html.contains(">BC02</text>"));

    let merged = std::fs::read_to_string(&paths.merged)?;
    let expected = "blast_hit,num_reads,Barcode\n\
                    SpeciesA,90,BC01\n\
                    SpeciesB,10,BC01\n\
                    SpeciesA,5,BC02\n\
                    SpeciesB,95,BC02\n";
    assert_eq!(merged, expected);

    // neither sample contains the target taxon
    let dominance = std::fs::read_to_string(&paths.dominance_table)?;
    assert_eq!(dominance, "Barcode,dominant,Percentage\n");

    assert_eq!(ReportOptions::read(&paths.options)?, args.options);
    Ok(())
}

#[test]
fn report_is_idempotent() -> Result<(), Report> {
    let tmp = TempDir::new()?;
    let input_dir = tmp.path().join("reports");
    write_reports(&input_dir)?;

    let output_dir = tmp.path().join("output");
    let args = ReportArgs { input_dir, output_dir, ..Default::default() };
    let paths = report(&args)?;
    let first = std::fs::read_to_string(&paths.percentages)?;
    let paths = report(&args)?;
    let second = std::fs::read_to_string(&paths.percentages)?;

    assert_eq!(first, second);
    Ok(())
}

#[test]
fn report_dominance() -> Result<(), Report> {
    let tmp = TempDir::new()?;
    let input_dir = tmp.path().join("reports");
    std::fs::create_dir_all(&input_dir)?;
    let crispatus = "Lactobacillus crispatus";
    let iners = "Lactobacillus iners";
    fixtures::write_report(&input_dir.join("BC01.xlsx"), &[(crispatus, 75.0), (iners, 25.0)])?;
    fixtures::write_report(&input_dir.join("BC02.xlsx"), &[(crispatus, 45.0), (iners, 55.0)])?;
    fixtures::write_report(&input_dir.join("BC03.xlsx"), &[("Gardnerella vaginalis", 10.0)])?;

    let output_dir = tmp.path().join("output");
    let args = ReportArgs { input_dir, output_dir, ..Default::default() };
    let paths = report(&args)?;

    let observed = std::fs::read_to_string(&paths.dominance_table)?;
    let expected = "Barcode,dominant,Percentage\nBC01,true,75.00\nBC02,false,45.00\n";
    assert_eq!(observed, expected);
    Ok(())
}

#[test]
fn report_options_from_config() -> Result<(), Report> {
    let tmp = TempDir::new()?;
    let input_dir = tmp.path().join("reports");
    std::fs::create_dir_all(&input_dir)?;
    let rows = [("SpeciesA", 297.0), ("SpeciesB", 3.0)];
    fixtures::write_report(&input_dir.join("BC01.xlsx"), &rows)?;

    let config = tmp.path().join("options.json");
    std::fs::write(&config, r#"{ "other_label": "Rare", "percentage_mode": "recomputed" }"#)?;

    let output_dir = tmp.path().join("output");
    let mut args = ReportArgs { input_dir, output_dir, ..Default::default() };
    args.options.config = Some(config);
    let paths = report(&args)?;

    let observed = std::fs::read_to_string(&paths.percentages)?;
    let expected = "Barcode,blast_hit,num_reads,Total_reads,Percentage\n\
                    BC01,Rare,3,300,1.00\n\
                    BC01,SpeciesA,297,300,99.00\n";
    assert_eq!(observed, expected);

    let options = ReportOptions::read(&paths.options)?;
    assert_eq!(options.other_label, "Rare");
    assert_eq!(options.percentage_mode, PercentageMode::Recomputed);
    assert_eq!(options.hit_column, "blast_hit");
    Ok(())
}

#[test]
fn report_missing_input_dir() -> Result<(), Report> {
    let tmp = TempDir::new()?;
    let args = ReportArgs {
        input_dir: tmp.path().join("reports"),
        output_dir: tmp.path().join("output"),
        ..Default::default()
    };
    assert!(report(&args).is_err());
    Ok(())
}

#[test]
fn report_empty_input_dir() -> Result<(), Report> {
    let tmp = TempDir::new()?;
    let input_dir = tmp.path().join("reports");
    std::fs::create_dir_all(&input_dir)?;
    std::fs::write(input_dir.join("notes.txt"), "not a report")?;

    let output_dir = tmp.path().join("output");
    let args = ReportArgs { input_dir, output_dir, ..Default::default() };
    assert!(report(&args).is_err());
    Ok(())
}

#[test]
fn percentage_mode_names() -> Result<(), Report> {
    assert_eq!(PercentageMode::default().to_string(), "summed");
    assert_eq!("recomputed".parse::<PercentageMode>()?, PercentageMode::Recomputed);
    assert!("rounded".parse::<PercentageMode>().is_err());
    Ok(())
}
