use crate::rename::*;
use color_eyre::eyre::{Report, Result};
use tempfile::TempDir;

fn args(tmp: &TempDir, mapping: &str, file_name: &str) -> Result<RenameArgs, Report> {
    let input_dir = tmp.path().join("fastq_pass");
    std::fs::create_dir_all(&input_dir)?;
    let spreadsheet = tmp.path().join(file_name);
    std::fs::write(&spreadsheet, mapping)?;
    Ok(RenameArgs { input_dir, spreadsheet, ..Default::default() })
}

#[test]
fn rename_barcode_to_sample() -> Result<(), Report> {
    let tmp = TempDir::new()?;
    let args = args(&tmp, "Barcode\tSampleID\nBC01\tSample_X\n", "samples.txt")?;
    std::fs::create_dir(args.input_dir.join("BC01"))?;
    std::fs::write(args.input_dir.join("BC01").join("reads.fastq"), "")?;

    let renames = rename(&args)?;

    assert_eq!(renames.len(), 1);
    assert_eq!(renames[0].barcode, "BC01");
    assert_eq!(renames[0].sample, "Sample_X");
    assert!(!args.input_dir.join("BC01").exists());
    assert!(args.input_dir.join("Sample_X").join("reads.fastq").exists());
    Ok(())
}

#[test]
fn rename_missing_barcode() -> Result<(), Report> {
    let tmp = TempDir::new()?;
    let args = args(&tmp, "Barcode\tSampleID\nBC01\tSample_X\nBC02\tSample_Y\n", "samples.tsv")?;
    std::fs::create_dir(args.input_dir.join("BC02"))?;

    let renames = rename(&args)?;

    let samples = renames.iter().map(|r| r.sample.as_str()).collect::<Vec<_>>();
    assert_eq!(samples, ["Sample_Y"]);
    assert!(!args.input_dir.join("Sample_X").exists());
    Ok(())
}

#[test]
fn rename_existing_destination() -> Result<(), Report> {
    let tmp = TempDir::new()?;
    let args = args(&tmp, "Barcode,SampleID\nBC01,Sample_X\n", "samples.csv")?;
    std::fs::create_dir(args.input_dir.join("BC01"))?;
    std::fs::create_dir(args.input_dir.join("Sample_X"))?;

    let renames = rename(&args)?;

    assert!(renames.is_empty());
    assert!(args.input_dir.join("BC01").exists());
    Ok(())
}

#[test]
fn rename_custom_sample_column() -> Result<(), Report> {
    let tmp = TempDir::new()?;
    let mut args = args(&tmp, "Barcode\tName\nBC01\tSample_X\n", "samples.txt")?;
    std::fs::create_dir(args.input_dir.join("BC01"))?;

    assert!(rename(&args).is_err());
    assert!(args.input_dir.join("BC01").exists());

    args.sample_column = "Name".to_string();
    assert_eq!(rename(&args)?.len(), 1);
    Ok(())
}

#[test]
fn read_mapping_unknown_extension_is_tab_delimited() -> Result<(), Report> {
    let tmp = TempDir::new()?;
    let path = tmp.path().join("samples.sheet");
    std::fs::write(&path, "Barcode\tSampleID\nBC01\tSample_X\nBC02\tSample_Y\n")?;

    let mapping = read_mapping(&path, "SampleID")?;
    let expected =
        [("BC01", "Sample_X"), ("BC02", "Sample_Y")].map(|(b, s)| (b.to_string(), s.to_string()));
    assert_eq!(mapping, expected);
    Ok(())
}

#[test]
fn read_mapping_empty_file() -> Result<(), Report> {
    let tmp = TempDir::new()?;
    let path = tmp.path().join("samples.tsv");
    std::fs::write(&path, "")?;
    assert!(read_mapping(&path, "SampleID").is_err());
    Ok(())
}
