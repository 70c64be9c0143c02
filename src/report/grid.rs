//! Presence/absence grid image of dominance records.
//!
//! Each sample is drawn in a square cell, with the sample name at the top, a circle
//! colored by dominance in the middle, and the dominance label at the bottom.
//!
//! | Dominant | Color |
//! |----------|-------|
//! | yes      | green |
//! | no       | cyan  |

use crate::report::dominance::Dominance;
use crate::report::ReportOptions;
use color_eyre::eyre::{eyre, Report, Result, WrapErr};
use color_eyre::Help;
use log::{debug, warn};
use maba16s_utils as utils;
use raqote::{DrawOptions, DrawTarget, PathBuilder, SolidSource, Source, StrokeStyle};
use rusttype::{point, Font, Scale};
use std::fmt::Debug;
use std::path::{Path, PathBuf};

/// Width and height of one cell, in pixels.
pub const CELL_SIZE: i32 = 200;
pub const DOMINANT_LABEL: &str = "Dominant";
pub const NOT_DOMINANT_LABEL: &str = "Not dominant";

const RADIUS: f32 = 50.0;
const TITLE_SCALE: f32 = 20.0;
const LABEL_SCALE: f32 = 16.0;

const WHITE: SolidSource = SolidSource { r: 0xff, g: 0xff, b: 0xff, a: 0xff };
const BLACK: SolidSource = SolidSource { r: 0x00, g: 0x00, b: 0x00, a: 0xff };
const GREEN: SolidSource = SolidSource { r: 0x00, g: 0x80, b: 0x00, a: 0xff };
const CYAN: SolidSource = SolidSource { r: 0x00, g: 0xff, b: 0xff, a: 0xff };

/// Font files preferred over other fonts in the system font directories.
const PREFERRED_FONTS: [&str; 4] =
    ["DejaVuSans.ttf", "LiberationSans-Regular.ttf", "Arial.ttf", "Helvetica.ttf"];
/// Subdirectories searched below each system font directory.
const FONT_SEARCH_DEPTH: usize = 4;

/// Draw the presence/absence grid and write it as a PNG.
///
/// A font given with `--font` must be readable. Otherwise the first usable system font
/// is used, and without one the grid is drawn without text.
pub fn write_png<P>(records: &[Dominance], options: &ReportOptions, path: &P) -> Result<(), Report>
where
    P: AsRef<Path> + Debug,
{
    let font = match &options.font {
        Some(font_path) => Some(load_font(font_path)?),
        None => discover_font(&system_font_dirs()),
    };
    if font.is_none() {
        warn!("No usable TrueType font was found, the presence/absence image will have no text.");
    }

    if records.is_empty() {
        warn!("No sample contains {}, writing a blank presence/absence image.", options.taxon);
    }

    let dt = draw(records, options.grid_columns, font.as_ref())?;
    utils::create_parent_dir(path)?;
    dt.write_png(path).wrap_err_with(|| format!("Failed to write image: {path:?}"))?;

    Ok(())
}

/// Draw the records in a grid of `columns` cells per row.
///
/// Text is only drawn when a font is provided. Without records, a blank row is drawn.
pub fn draw(
    records: &[Dominance],
    columns: usize,
    font: Option<&Font>,
) -> Result<DrawTarget, Report> {
    if columns == 0 {
        return Err(eyre!("The presence/absence grid needs at least one column."));
    }
    let rows = records.len().div_ceil(columns).max(1);
    let width = i32::try_from(columns)? * CELL_SIZE;
    let height = i32::try_from(rows)? * CELL_SIZE;
    debug!("Drawing {} records in a {width}x{height} grid", records.len());

    let mut dt = DrawTarget::new(width, height);
    dt.clear(WHITE);

    for (i, record) in records.iter().enumerate() {
        let x = (i % columns) as f32 * CELL_SIZE as f32;
        let y = (i / columns) as f32 * CELL_SIZE as f32;
        let center = (x + CELL_SIZE as f32 / 2.0, y + CELL_SIZE as f32 / 2.0 + 5.0);

        let mut pb = PathBuilder::new();
        pb.arc(center.0, center.1, RADIUS, 0.0, 2.0 * std::f32::consts::PI);
        pb.close();
        let circle = pb.finish();

        let fill = if record.dominant { GREEN } else { CYAN };
        dt.fill(&circle, &Source::Solid(fill), &DrawOptions::new());
        let stroke = StrokeStyle { width: 2.0, ..Default::default() };
        dt.stroke(&circle, &Source::Solid(BLACK), &stroke, &DrawOptions::new());

        if let Some(font) = font {
            let label = if record.dominant { DOMINANT_LABEL } else { NOT_DOMINANT_LABEL };
            draw_text(&mut dt, font, &record.sample, TITLE_SCALE, center.0, y + 30.0);
            draw_text(&mut dt, font, label, LABEL_SCALE, center.0, y + CELL_SIZE as f32 - 20.0);
        }
    }

    Ok(dt)
}

/// Draw black text horizontally centered on `x`, with its baseline at `y`.
fn draw_text(dt: &mut DrawTarget, font: &Font, text: &str, size: f32, x: f32, y: f32) {
    let scale = Scale::uniform(size);
    let glyphs = font.layout(text, scale, point(0.0, 0.0)).collect::<Vec<_>>();
    let text_width = glyphs
        .iter()
        .filter_map(|g| g.pixel_bounding_box())
        .map(|bb| bb.max.x)
        .max()
        .unwrap_or(0) as f32;
    let (offset_x, offset_y) = ((x - text_width / 2.0).round() as i32, y.round() as i32);

    let (width, height) = (dt.width(), dt.height());
    let data = dt.get_data_mut();
    for glyph in &glyphs {
        let Some(bb) = glyph.pixel_bounding_box() else { continue };
        glyph.draw(|gx, gy, coverage| {
            let px = offset_x + bb.min.x + gx as i32;
            let py = offset_y + bb.min.y + gy as i32;
            if px < 0 || py < 0 || px >= width || py >= height {
                return;
            }
            let i = (py * width + px) as usize;
            data[i] = blend_black(data[i], coverage);
        });
    }
}

/// Blend black over a premultiplied ARGB pixel with the given coverage.
fn blend_black(pixel: u32, coverage: f32) -> u32 {
    let coverage = coverage.clamp(0.0, 1.0);
    let keep = |channel: u32| ((channel & 0xff) as f32 * (1.0 - coverage)).round() as u32;
    let a = keep(pixel >> 24) + (255.0 * coverage).round() as u32;
    let (r, g, b) = (keep(pixel >> 16), keep(pixel >> 8), keep(pixel));
    (a.min(255) << 24) | (r << 16) | (g << 8) | b
}

/// Read a TrueType font from a file.
pub fn load_font<P>(path: &P) -> Result<Font<'static>, Report>
where
    P: AsRef<Path> + Debug,
{
    let data = std::fs::read(path).wrap_err_with(|| format!("Failed to read font: {path:?}"))?;
    let font = Font::try_from_vec(data)
        .ok_or_else(|| eyre!("Failed to parse font: {path:?}"))
        .suggestion("Provide a TrueType (.ttf) font with --font.")?;
    debug!("Using font: {path:?}");
    Ok(font)
}

/// Standard font directories of Linux, macOS and Windows, plus the user font directories.
pub fn system_font_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![
        PathBuf::from("/usr/share/fonts"),
        PathBuf::from("/usr/local/share/fonts"),
        PathBuf::from("/Library/Fonts"),
        PathBuf::from("/System/Library/Fonts"),
        PathBuf::from("C:\\Windows\\Fonts"),
    ];
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        dirs.push(home.join(".fonts"));
        dirs.push(home.join(".local/share/fonts"));
    }
    dirs
}

/// Returns the TrueType fonts below `dirs`, preferred sans-serif fonts first.
pub fn font_candidates(dirs: &[PathBuf]) -> Vec<PathBuf> {
    let mut fonts = Vec::new();
    dirs.iter().for_each(|dir| collect_fonts(dir, FONT_SEARCH_DEPTH, &mut fonts));
    fonts.sort();

    let rank = |path: &PathBuf| {
        PREFERRED_FONTS
            .iter()
            .position(|name| path.file_name().is_some_and(|f| f == *name))
            .unwrap_or(PREFERRED_FONTS.len())
    };
    fonts.sort_by_key(rank);
    fonts
}

/// Load the first font below `dirs` that parses, skipping unusable fonts with a warning.
pub fn discover_font(dirs: &[PathBuf]) -> Option<Font<'static>> {
    font_candidates(dirs).into_iter().find_map(|path| match load_font(&path) {
        Ok(font) => Some(font),
        Err(e) => {
            warn!("Skipping unusable font {path:?}: {e}");
            None
        }
    })
}

/// Collect `.ttf` files below `dir`, descending at most `depth` subdirectories.
fn collect_fonts(dir: &Path, depth: usize, fonts: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else { return };
    for path in entries.flatten().map(|e| e.path()) {
        if path.is_dir() {
            if depth > 0 {
                collect_fonts(&path, depth - 1, fonts);
            }
        } else if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("ttf")) {
            fonts.push(path);
        }
    }
}
