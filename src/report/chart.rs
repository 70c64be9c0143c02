//! Interactive stacked bar chart of species percentages per sample.
//!
//! The chart is a single self-contained HTML page with an inline SVG. Each segment
//! shows its sample, label and percentage on hover, and clicking a legend entry
//! toggles the visibility of that label.

use crate::report::abundance::Abundance;
use color_eyre::eyre::{Report, Result, WrapErr};
use indoc::formatdoc;
use itertools::Itertools;
use maba16s_utils as utils;
use std::fmt::{Debug, Write};
use std::path::Path;

pub const TITLE: &str = "Stacked Bar Plot of Species Percentage per Barcode";
pub const X_LABEL: &str = "Barcode";
pub const Y_LABEL: &str = "Percentage of Reads";

const BAR_WIDTH: f64 = 48.0;
const BAR_SPACING: f64 = 24.0;
const PLOT_HEIGHT: f64 = 420.0;
const LEFT: f64 = 64.0;
const RIGHT: f64 = 24.0;
const TOP: f64 = 16.0;
const BOTTOM: f64 = 72.0;
const Y_TICKS: usize = 5;

/// Write the stacked bar chart to an HTML file.
pub fn write_html<P>(
    abundances: &[Abundance],
    colors: &[(String, &str)],
    path: &P,
) -> Result<(), Report>
where
    P: AsRef<Path> + Debug,
{
    let html = render_html(abundances, colors)?;
    utils::create_parent_dir(path)?;
    std::fs::write(path, html).wrap_err_with(|| format!("Failed to write chart: {path:?}"))?;
    Ok(())
}

/// Render the stacked bar chart as an HTML page.
///
/// Samples are drawn left to right in order of first appearance. Within a bar, segments
/// are stacked bottom to top in the order of `colors`.
pub fn render_html(abundances: &[Abundance], colors: &[(String, &str)]) -> Result<String, Report> {
    let svg = render_svg(abundances, colors)?;

    let mut legend = String::new();
    for (i, (label, color)) in colors.iter().enumerate() {
        writeln!(
            legend,
            "<li class=\"legend-item\" data-series=\"{i}\" onclick=\"toggleSeries({i})\">\
             <span class=\"swatch\" style=\"background:{color}\"></span>{}</li>",
            escape_html(label)
        )?;
    }

    let html = formatdoc! {r#"
        <!DOCTYPE html>
        <html lang="en">
        <head>
        <meta charset="utf-8">
        <title>{title}</title>
        <style>
        body {{ font-family: sans-serif; margin: 24px; color: #2a3f5f; }}
        h1 {{ font-size: 18px; font-weight: normal; }}
        .chart {{ display: flex; align-items: flex-start; gap: 24px; }}
        .segment:hover {{ opacity: 0.8; }}
        .hidden {{ display: none; }}
        .legend {{ list-style: none; padding: 0; margin: 0; font-size: 13px; }}
        .legend-item {{ cursor: pointer; margin: 4px 0; user-select: none; }}
        .legend-item.off {{ opacity: 0.4; }}
        .swatch {{
          display: inline-block; width: 12px; height: 12px;
          margin-right: 6px; vertical-align: middle;
        }}
        </style>
        </head>
        <body>
        <h1>{title}</h1>
        <div class="chart">
        {svg}
        <ul class="legend">
        {legend}
        </ul>
        </div>
        <script>
        function toggleSeries(i) {{
          document.querySelectorAll('[data-series="' + i + '"]').forEach(function (el) {{
            if (el.classList.contains('legend-item')) {{
              el.classList.toggle('off');
            }} else {{
              el.classList.toggle('hidden');
            }}
          }});
        }}
        </script>
        </body>
        </html>
    "#,
        title = escape_html(TITLE),
        svg = svg.trim_end(),
        legend = legend.trim_end(),
    };

    Ok(html)
}

/// Render the bars, axes and labels as an inline SVG.
fn render_svg(abundances: &[Abundance], colors: &[(String, &str)]) -> Result<String, Report> {
    let samples = abundances.iter().map(|a| a.sample.as_str()).unique().collect_vec();

    // stacks of (series, percentage, abundance) per sample
    let stacks = samples
        .iter()
        .map(|sample| {
            colors
                .iter()
                .enumerate()
                .flat_map(|(series, (label, color))| {
                    abundances
                        .iter()
                        .filter(move |a| a.sample == *sample && a.label == *label)
                        .map(move |a| (series, *color, a))
                })
                .collect_vec()
        })
        .collect_vec();

    let stack_max = stacks
        .iter()
        .map(|stack| stack.iter().map(|(_, _, a)| a.percentage).sum::<f64>())
        .fold(0.0, f64::max);
    let y_max = y_axis_max(stack_max);

    let plot_w = (samples.len().max(1) as f64) * (BAR_WIDTH + BAR_SPACING);
    let (w, h) = (LEFT + plot_w + RIGHT, TOP + PLOT_HEIGHT + BOTTOM);
    let base = TOP + PLOT_HEIGHT;

    let mut out = String::new();
    writeln!(out, "<svg width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">")?;
    writeln!(
        out,
        "<rect x=\"{LEFT}\" y=\"{TOP}\" width=\"{plot_w}\" height=\"{PLOT_HEIGHT}\" \
         fill=\"#e5ecf6\"/>"
    )?;

    // y axis grid and tick labels
    for tick in 0..=Y_TICKS {
        let value = y_max * tick as f64 / Y_TICKS as f64;
        let y = base - value / y_max * PLOT_HEIGHT;
        writeln!(
            out,
            "<line x1=\"{LEFT}\" y1=\"{y}\" x2=\"{}\" y2=\"{y}\" stroke=\"#fff\"/>",
            LEFT + plot_w
        )?;
        writeln!(
            out,
            "<text x=\"{}\" y=\"{}\" font-size=\"11\" text-anchor=\"end\">{value}</text>",
            LEFT - 6.0,
            y + 4.0
        )?;
    }

    for (i, (sample, stack)) in samples.iter().zip(stacks.iter()).enumerate() {
        let x = LEFT + BAR_SPACING / 2.0 + i as f64 * (BAR_WIDTH + BAR_SPACING);
        let mut y = base;
        for (series, color, a) in stack {
            let height = a.percentage / y_max * PLOT_HEIGHT;
            y -= height;
            writeln!(
                out,
                "<rect class=\"segment\" data-series=\"{series}\" x=\"{x}\" y=\"{y}\" \
                 width=\"{BAR_WIDTH}\" height=\"{height}\" fill=\"{color}\">\
                 <title>{}: {} {:.2}%</title></rect>",
                escape_html(sample),
                escape_html(&a.label),
                a.percentage
            )?;
        }
        writeln!(
            out,
            "<text class=\"sample\" x=\"{}\" y=\"{}\" font-size=\"11\" text-anchor=\"end\" \
             transform=\"rotate(-45 {} {})\">{}</text>",
            x + BAR_WIDTH / 2.0,
            base + 14.0,
            x + BAR_WIDTH / 2.0,
            base + 14.0,
            escape_html(sample)
        )?;
    }

    writeln!(
        out,
        "<text x=\"{}\" y=\"{}\" font-size=\"13\" text-anchor=\"middle\">{X_LABEL}</text>",
        LEFT + plot_w / 2.0,
        h - 8.0
    )?;
    writeln!(
        out,
        "<text x=\"14\" y=\"{}\" font-size=\"13\" text-anchor=\"middle\" \
         transform=\"rotate(-90 14 {})\">{Y_LABEL}</text>",
        TOP + PLOT_HEIGHT / 2.0,
        TOP + PLOT_HEIGHT / 2.0
    )?;
    writeln!(out, "</svg>")?;

    Ok(out)
}

/// Upper bound of the y axis: at least 100, rounded up to a multiple of 10.
fn y_axis_max(stack_max: f64) -> f64 {
    ((stack_max.max(100.0) / 10.0).ceil()) * 10.0
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::abundance::label_colors;

    fn abundance(sample: &str, label: &str, percentage: f64) -> Abundance {
        Abundance {
            sample: sample.to_string(),
            label: label.to_string(),
            reads: 0,
            total_reads: 0,
            percentage,
        }
    }

    #[test]
    fn render_html_segments_and_legend() -> Result<(), Report> {
        let abundances = vec![
            abundance("BC01", "SpeciesA", 90.0),
            abundance("BC01", "SpeciesB", 10.0),
            abundance("BC02", "SpeciesA", 5.0),
            abundance("BC02", "SpeciesB", 95.0),
        ];
        let colors = label_colors(&abundances);
        let html = render_html(&abundances, &colors)?;

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(TITLE));
        assert!(html.contains(X_LABEL));
        assert!(html.contains(Y_LABEL));
        assert_eq!(html.matches("class=\"segment\"").count(), 4);
        assert_eq!(html.matches("class=\"legend-item\"").count(), 2);
        assert!(html.contains("<title>BC02: SpeciesB 95.00%</title>"));
        assert!(html.contains("fill=\"#636EFA\""));
        assert!(html.contains("fill=\"#EF553B\""));
        Ok(())
    }

    #[test]
    fn render_html_escapes_labels() -> Result<(), Report> {
        let abundances = vec![abundance("BC01", "Other species <1%", 100.0)];
        let colors = label_colors(&abundances);
        let html = render_html(&abundances, &colors)?;

        assert!(html.contains("Other species &lt;1%"));
        assert!(!html.contains("Other species <1%"));
        Ok(())
    }

    #[test]
    fn render_html_empty() -> Result<(), Report> {
        let html = render_html(&[], &[])?;
        assert_eq!(html.matches("class=\"segment\"").count(), 0);
        Ok(())
    }

    #[test]
    fn y_axis_covers_drift() {
        assert_eq!(y_axis_max(0.0), 100.0);
        assert_eq!(y_axis_max(99.99), 100.0);
        assert_eq!(y_axis_max(100.5), 110.0);
    }
}
