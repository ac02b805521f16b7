//! SVG chart rendering.
//!
//! Every chart function is pure: it takes computed data and returns a [`Chart`]
//! holding a self-contained SVG document. Empty input renders an empty-state chart
//! with a "No data" caption instead of failing.

mod bar;
mod heatmap;
mod line;
mod pie;

pub use bar::{investment_comparison_chart, sector_allocation_chart};
pub use heatmap::correlation_heatmap;
pub use line::{comparative_performance_chart, price_history_chart};
pub use pie::monetary_returns_pie;

use crate::export::ExportError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub(crate) const WIDTH: f64 = 720.0;
pub(crate) const HEIGHT: f64 = 360.0;
pub(crate) const PADDING: f64 = 48.0;
pub(crate) const GRID_COLOR: &str = "#e5e5e5";
pub(crate) const TEXT_COLOR: &str = "#333";

/// Line and bar colors, cycled per series.
pub(crate) const PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// A rendered chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chart {
    /// Chart title, also embedded in the SVG.
    pub title: String,
    /// SVG document.
    pub svg: String,
}

impl Chart {
    pub(crate) fn new(title: impl Into<String>, svg: String) -> Self {
        Self {
            title: title.into(),
            svg,
        }
    }

    /// Whether the chart was rendered without data.
    pub fn is_empty_state(&self) -> bool {
        self.svg.contains(r#"class="empty-state""#)
    }

    /// Write the SVG document to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), ExportError> {
        fs::write(path, &self.svg)?;
        Ok(())
    }
}

pub(crate) fn color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

/// Escape text for embedding in SVG markup.
pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub(crate) fn svg_header(width: f64, height: f64) -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}"><style>text{{font-family:Arial,sans-serif;font-size:11px;fill:{TEXT_COLOR}}}</style><rect width="100%" height="100%" fill="white" />"#,
        w = width,
        h = height,
    )
}

pub(crate) const fn svg_footer() -> &'static str {
    "</svg>"
}

pub(crate) fn title_text(title: &str, width: f64) -> String {
    format!(
        r#"<text x="{x:.2}" y="24" text-anchor="middle" font-size="15" font-weight="bold">{title}</text>"#,
        x = width / 2.0,
        title = escape(title)
    )
}

/// Empty-state chart with the title and a "No data" caption.
pub(crate) fn empty_chart(title: &str) -> Chart {
    let mut svg = svg_header(WIDTH, HEIGHT);
    svg.push_str(&title_text(title, WIDTH));
    svg.push_str(&format!(
        r##"<text class="empty-state" x="{x:.2}" y="{y:.2}" text-anchor="middle" fill="#999">No data</text>"##,
        x = WIDTH / 2.0,
        y = HEIGHT / 2.0
    ));
    svg.push_str(svg_footer());
    Chart::new(title, svg)
}

/// Min and max of the finite values, widened when flat. Optionally includes zero.
pub(crate) fn extent(values: impl IntoIterator<Item = f64>, include_zero: bool) -> Option<(f64, f64)> {
    let mut min_v = f64::INFINITY;
    let mut max_v = f64::NEG_INFINITY;
    for v in values.into_iter().filter(|v| v.is_finite()) {
        min_v = min_v.min(v);
        max_v = max_v.max(v);
    }

    if include_zero {
        min_v = min_v.min(0.0);
        max_v = max_v.max(0.0);
    }

    if !min_v.is_finite() || !max_v.is_finite() {
        return None;
    }

    if min_v == max_v {
        let adjust = if min_v == 0.0 { 1.0 } else { min_v.abs() * 0.1 };
        min_v -= adjust;
        max_v += adjust;
    }

    Some((min_v, max_v))
}

/// Map `value` in `[min_v, max_v]` to a y coordinate inside the padded plot area.
pub(crate) fn scale_y(value: f64, min_v: f64, max_v: f64, height: f64) -> f64 {
    if (max_v - min_v).abs() < f64::EPSILON {
        return height / 2.0;
    }
    let inner_height = height - 2.0 * PADDING;
    let norm = (value - min_v) / (max_v - min_v);
    PADDING + (1.0 - norm) * inner_height
}

/// Horizontal grid lines with value labels on the left axis.
pub(crate) fn y_axis(
    svg: &mut String,
    min_v: f64,
    max_v: f64,
    width: f64,
    height: f64,
    label: impl Fn(f64) -> String,
) {
    const TICKS: usize = 5;
    for i in 0..=TICKS {
        let value = min_v + (max_v - min_v) * (i as f64 / TICKS as f64);
        let y = scale_y(value, min_v, max_v, height);
        svg.push_str(&format!(
            r#"<line x1="{x1:.2}" y1="{y:.2}" x2="{x2:.2}" y2="{y:.2}" stroke="{GRID_COLOR}" stroke-width="1" />"#,
            x1 = PADDING,
            x2 = width - PADDING,
        ));
        svg.push_str(&format!(
            r#"<text x="{x:.2}" y="{y:.2}" text-anchor="end">{text}</text>"#,
            x = PADDING - 6.0,
            y = y + 4.0,
            text = escape(&label(value))
        ));
    }
}

/// Legend swatches in the top-right corner.
pub(crate) fn legend(svg: &mut String, entries: &[(String, &str)], width: f64) {
    let x = width - PADDING - 110.0;
    let mut y = PADDING + 8.0;
    for (label, color) in entries {
        svg.push_str(&format!(
            r#"<rect x="{x:.2}" y="{y:.2}" width="12" height="12" fill="{color}" />"#,
            y = y - 10.0,
        ));
        svg.push_str(&format!(
            r#"<text x="{x:.2}" y="{y:.2}" text-anchor="start">{label}</text>"#,
            x = x + 18.0,
            label = escape(label)
        ));
        y += 16.0;
    }
}

/// Compact axis label for a price or amount.
pub(crate) fn format_axis_value(value: f64) -> String {
    if value.abs() >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if value.abs() >= 10_000.0 {
        format!("{:.0}K", value / 1_000.0)
    } else if value.abs() >= 100.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(escape("S&P <500>"), "S&amp;P &lt;500&gt;");
        assert_eq!(escape(r#""q"'"#), "&quot;q&quot;&#39;");
    }

    #[test]
    fn test_extent_widens_flat_range() {
        assert_eq!(extent([5.0, 5.0], false), Some((4.5, 5.5)));
        assert_eq!(extent([0.0], false), Some((-1.0, 1.0)));
        assert_eq!(extent([f64::NAN], false), None);
    }

    #[test]
    fn test_extent_includes_zero() {
        assert_eq!(extent([3.0, 8.0], true), Some((0.0, 8.0)));
    }

    #[test]
    fn test_scale_y_bounds() {
        assert_eq!(scale_y(10.0, 0.0, 10.0, HEIGHT), PADDING);
        assert_eq!(scale_y(0.0, 0.0, 10.0, HEIGHT), HEIGHT - PADDING);
    }

    #[test]
    fn test_empty_chart() {
        let chart = empty_chart("Nothing <here>");
        assert!(chart.is_empty_state());
        assert!(chart.svg.starts_with("<svg"));
        assert!(chart.svg.ends_with("</svg>"));
        assert!(chart.svg.contains("Nothing &lt;here&gt;"));
    }

    #[test]
    fn test_save_writes_svg() {
        let chart = empty_chart("Saved");
        let path = std::env::temp_dir().join("etfscope_chart_save_test.svg");
        chart.save(&path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, chart.svg);
        std::fs::remove_file(path).ok();
    }
}
