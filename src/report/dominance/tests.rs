use crate::report::dominance::*;
use crate::report::fixtures;
use crate::report::ReportOptions;
use color_eyre::eyre::{Report, Result};
use tempfile::TempDir;

const CRISPATUS: &str = "Lactobacillus crispatus";

#[test]
fn classify_dominant_absent() -> Result<(), Report> {
    let table = fixtures::percentages(&[
        ("BC01", CRISPATUS, "75.00"),
        ("BC01", "Lactobacillus iners", "25.00"),
        ("BC02", "Gardnerella vaginalis", "100.00"),
        ("BC03", "Lactobacillus gasseri", "55.00"),
        ("BC03", CRISPATUS, "45.00"),
    ])?;
    let observed = classify(&table, &ReportOptions::default())?;

    let expected = vec![
        Dominance { sample: "BC01".into(), percentage: 75.0, dominant: true },
        Dominance { sample: "BC03".into(), percentage: 45.0, dominant: false },
    ];
    assert_eq!(observed, expected);
    Ok(())
}

#[test]
fn classify_threshold_is_exclusive() -> Result<(), Report> {
    let table =
        fixtures::percentages(&[("BC01", CRISPATUS, "60.00"), ("BC02", CRISPATUS, "60.01")])?;
    let observed = classify(&table, &ReportOptions::default())?;

    let dominant = observed.iter().map(|r| r.dominant).collect::<Vec<_>>();
    assert_eq!(dominant, [false, true]);
    Ok(())
}

#[test]
fn classify_first_row_and_first_seen_order() -> Result<(), Report> {
    let table = fixtures::percentages(&[
        ("BC10", CRISPATUS, "10.00"),
        ("BC02", CRISPATUS, "90.00"),
        ("BC10", CRISPATUS, "80.00"),
    ])?;
    let observed = classify(&table, &ReportOptions::default())?;

    let samples = observed.iter().map(|r| (r.sample.as_str(), r.dominant)).collect::<Vec<_>>();
    assert_eq!(samples, [("BC10", false), ("BC02", true)]);
    Ok(())
}

#[test]
fn classify_custom_taxon() -> Result<(), Report> {
    let table = fixtures::percentages(&[
        ("BC01", CRISPATUS, "75.00"),
        ("BC01", "Lactobacillus iners", "25.00"),
    ])?;
    let options = ReportOptions {
        taxon: "Lactobacillus iners".into(),
        dominance_threshold: 20.0,
        ..Default::default()
    };
    let observed = classify(&table, &options)?;
    assert_eq!(observed, [Dominance { sample: "BC01".into(), percentage: 25.0, dominant: true }]);
    Ok(())
}

#[test]
fn classify_missing_column() -> Result<(), Report> {
    let mut table = fixtures::percentages(&[("BC01", CRISPATUS, "75.00")])?;
    table.headers[4] = "Percent".to_string();
    assert!(classify(&table, &ReportOptions::default()).is_err());
    Ok(())
}

#[test]
fn classify_invalid_percentage() -> Result<(), Report> {
    let table = fixtures::percentages(&[("BC01", CRISPATUS, "high")])?;
    assert!(classify(&table, &ReportOptions::default()).is_err());
    Ok(())
}

#[test]
fn classify_file_and_table() -> Result<(), Report> {
    let tmp = TempDir::new()?;
    let path = tmp.path().join("species_percentages.csv");
    let options = ReportOptions::default();
    fixtures::percentages(&[("BC01", CRISPATUS, "75.00"), ("BC02", CRISPATUS, "45.00")])?
        .write(&path, Some(','))?;

    let records = classify_file(&path, &options)?;
    let table = to_table(&records, &options);
    assert_eq!(table.headers, ["Barcode", "dominant", "Percentage"]);
    assert_eq!(table.rows, [["BC01", "true", "75.00"], ["BC02", "false", "45.00"]]);
    Ok(())
}

#[test]
fn classify_orders_by_first_appearance_of_sample() -> Result<(), Report> {
    let table = fixtures::percentages(&[
        ("BC10", "Lactobacillus iners", "30.00"),
        ("BC02", CRISPATUS, "90.00"),
        ("BC10", CRISPATUS, "70.00"),
    ])?;
    let observed = classify(&table, &ReportOptions::default())?;

    let samples = observed.iter().map(|r| r.sample.as_str()).collect::<Vec<_>>();
    assert_eq!(samples, ["BC10", "BC02"]);
    Ok(())
}
