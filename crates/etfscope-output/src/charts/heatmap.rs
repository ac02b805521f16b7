//! Correlation heatmap.

use super::{Chart, PADDING, empty_chart, escape, svg_footer, svg_header, title_text};
use etfscope_metrics::CorrelationMatrix;

const CELL: f64 = 64.0;
const LABEL_SPACE: f64 = 56.0;
const NAN_COLOR: &str = "#d9d9d9";

const COOL: (f64, f64, f64) = (59.0, 76.0, 192.0);
const NEUTRAL: (f64, f64, f64) = (221.0, 221.0, 221.0);
const WARM: (f64, f64, f64) = (180.0, 4.0, 38.0);

fn lerp(a: (f64, f64, f64), b: (f64, f64, f64), t: f64) -> (f64, f64, f64) {
    (
        a.0 + (b.0 - a.0) * t,
        a.1 + (b.1 - a.1) * t,
        a.2 + (b.2 - a.2) * t,
    )
}

/// Cool-warm diverging color for a correlation in `[-1, 1]`.
pub(crate) fn coolwarm(value: f64) -> String {
    if !value.is_finite() {
        return NAN_COLOR.to_string();
    }
    let v = value.clamp(-1.0, 1.0);
    let (r, g, b) = if v < 0.0 {
        lerp(NEUTRAL, COOL, -v)
    } else {
        lerp(NEUTRAL, WARM, v)
    };
    format!("#{:02x}{:02x}{:02x}", r.round() as u8, g.round() as u8, b.round() as u8)
}

/// Square grid of correlations, each cell annotated with two decimals.
pub fn correlation_heatmap(matrix: &CorrelationMatrix) -> Chart {
    const TITLE: &str = "Correlation Heatmap";
    let n = matrix.size();
    if n == 0 {
        return empty_chart(TITLE);
    }

    let grid = CELL * n as f64;
    let left = PADDING + LABEL_SPACE;
    let top = PADDING;
    let width = left + grid + PADDING;
    let height = top + grid + LABEL_SPACE;

    let mut svg = svg_header(width, height);
    svg.push_str(&title_text(TITLE, width));

    let values = matrix.values();
    for (i, row_ticker) in matrix.tickers().iter().enumerate() {
        for j in 0..n {
            let value = values[[i, j]];
            let x = left + CELL * j as f64;
            let y = top + CELL * i as f64;
            let fill = coolwarm(value);
            svg.push_str(&format!(
                r#"<rect x="{x:.2}" y="{y:.2}" width="{CELL}" height="{CELL}" fill="{fill}" stroke="white" />"#
            ));

            let annotation = if value.is_finite() {
                format!("{value:.2}")
            } else {
                "N/A".to_string()
            };
            let text_fill = if value.is_finite() && value.abs() > 0.6 {
                "white"
            } else {
                "#333"
            };
            svg.push_str(&format!(
                r#"<text x="{cx:.2}" y="{cy:.2}" text-anchor="middle" style="fill:{text_fill}">{annotation}</text>"#,
                cx = x + CELL / 2.0,
                cy = y + CELL / 2.0 + 4.0,
            ));
        }

        svg.push_str(&format!(
            r#"<text x="{x:.2}" y="{y:.2}" text-anchor="end">{label}</text>"#,
            x = left - 6.0,
            y = top + CELL * i as f64 + CELL / 2.0 + 4.0,
            label = escape(row_ticker)
        ));
        svg.push_str(&format!(
            r#"<text x="{x:.2}" y="{y:.2}" text-anchor="middle">{label}</text>"#,
            x = left + CELL * i as f64 + CELL / 2.0,
            y = top + grid + 18.0,
            label = escape(row_ticker)
        ));
    }

    svg.push_str(svg_footer());
    Chart::new(TITLE, svg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use etfscope_metrics::correlation_matrix;

    #[test]
    fn test_coolwarm_endpoints() {
        assert_eq!(coolwarm(-1.0), "#3b4cc0");
        assert_eq!(coolwarm(0.0), "#dddddd");
        assert_eq!(coolwarm(1.0), "#b40426");
        assert_eq!(coolwarm(f64::NAN), NAN_COLOR);
    }

    #[test]
    fn test_heatmap_annotates_every_cell() {
        let matrix = correlation_matrix(&[
            ("SPY".to_string(), vec![Some(100.0), Some(110.0), Some(99.0), Some(105.0)]),
            ("QQQ".to_string(), vec![Some(50.0), Some(55.0), Some(49.5), Some(52.5)]),
        ]);
        let chart = correlation_heatmap(&matrix);

        assert_eq!(chart.svg.matches("<rect x=").count(), 4);
        assert_eq!(chart.svg.matches(">1.00</text>").count(), 4);
        assert!(chart.svg.contains(">SPY</text>"));
        assert!(chart.svg.contains(">QQQ</text>"));
    }

    #[test]
    fn test_undefined_correlation_is_marked() {
        let matrix = correlation_matrix(&[
            ("SPY".to_string(), vec![Some(100.0), Some(110.0), Some(99.0)]),
            ("EWZ".to_string(), vec![None, None, None]),
        ]);
        let chart = correlation_heatmap(&matrix);
        assert!(chart.svg.contains(">N/A</text>"));
        assert!(chart.svg.contains(NAN_COLOR));
    }

    #[test]
    fn test_empty_matrix() {
        assert!(correlation_heatmap(&correlation_matrix(&[])).is_empty_state());
    }
}
