//! Bar charts: sector weights and invested vs current worth.

use super::{
    Chart, HEIGHT, PADDING, WIDTH, empty_chart, escape, extent, format_axis_value, legend,
    scale_y, svg_footer, svg_header, title_text, y_axis,
};
use etfscope_data::SectorAllocation;
use etfscope_metrics::Simulation;

const SECTOR_COLOR: &str = "#87ceeb";
const INVESTED_COLOR: &str = "#1f77b4";
const WORTH_COLOR: &str = "#ff7f0e";

/// One bar group per category, one bar per series inside a group.
struct BarGroups<'a> {
    categories: Vec<String>,
    series: Vec<(&'a str, &'a str, Vec<f64>)>,
    rotate_labels: bool,
}

impl BarGroups<'_> {
    fn render(&self, title: &str, y_label: &str, format_value: fn(f64) -> String) -> Chart {
        if self.categories.is_empty() {
            return empty_chart(title);
        }
        let Some((min_v, max_v)) =
            extent(self.series.iter().flat_map(|(_, _, v)| v.iter().copied()), true)
        else {
            return empty_chart(title);
        };

        // Rotated labels need room below the plot.
        let height = if self.rotate_labels { HEIGHT + 80.0 } else { HEIGHT };
        let plot_bottom = height - PADDING;

        let mut svg = svg_header(WIDTH, height);
        svg.push_str(&title_text(title, WIDTH));
        y_axis(&mut svg, min_v, max_v, WIDTH, height, format_value);

        let group_width = (WIDTH - 2.0 * PADDING) / self.categories.len() as f64;
        let bar_width = group_width * 0.8 / self.series.len().max(1) as f64;
        let zero_y = scale_y(0.0, min_v, max_v, height);

        for (c, category) in self.categories.iter().enumerate() {
            let group_x = PADDING + group_width * c as f64 + group_width * 0.1;

            for (s, (_, fill, values)) in self.series.iter().enumerate() {
                let value = values.get(c).copied().unwrap_or(0.0);
                if !value.is_finite() {
                    continue;
                }
                let y = scale_y(value, min_v, max_v, height);
                svg.push_str(&format!(
                    r#"<rect x="{x:.2}" y="{top:.2}" width="{w:.2}" height="{h:.2}" fill="{fill}"><title>{label}: {value}</title></rect>"#,
                    x = group_x + bar_width * s as f64,
                    top = y.min(zero_y),
                    w = bar_width,
                    h = (zero_y - y).abs(),
                    label = escape(category),
                    value = escape(&format_value(value)),
                ));
            }

            let label_x = PADDING + group_width * (c as f64 + 0.5);
            let label_y = plot_bottom + 16.0;
            if self.rotate_labels {
                svg.push_str(&format!(
                    r#"<text x="{label_x:.2}" y="{label_y:.2}" text-anchor="end" transform="rotate(-45 {label_x:.2} {label_y:.2})">{text}</text>"#,
                    text = escape(category)
                ));
            } else {
                svg.push_str(&format!(
                    r#"<text x="{label_x:.2}" y="{label_y:.2}" text-anchor="middle">{text}</text>"#,
                    text = escape(category)
                ));
            }
        }

        svg.push_str(&format!(
            r#"<text x="14" y="{y:.2}" text-anchor="middle" transform="rotate(-90 14 {y:.2})">{y_label}</text>"#,
            y = height / 2.0,
            y_label = escape(y_label)
        ));

        if self.series.len() > 1 {
            let entries: Vec<(String, &str)> = self
                .series
                .iter()
                .map(|(name, fill, _)| ((*name).to_string(), *fill))
                .collect();
            legend(&mut svg, &entries, WIDTH);
        }

        svg.push_str(svg_footer());
        Chart::new(title, svg)
    }
}

fn percent_label(value: f64) -> String {
    format!("{value:.1}%")
}

/// Sector weights of one ticker, one bar per sector.
pub fn sector_allocation_chart(ticker: &str, allocation: &SectorAllocation) -> Chart {
    let title = format!("{ticker} Sector Allocation");
    BarGroups {
        categories: allocation.weights.iter().map(|w| w.sector.clone()).collect(),
        series: vec![(
            "Allocation (%)",
            SECTOR_COLOR,
            allocation.weights.iter().map(|w| w.percent).collect(),
        )],
        rotate_labels: true,
    }
    .render(&title, "Allocation (%)", percent_label)
}

/// Invested amount against current worth, grouped per ticker.
pub fn investment_comparison_chart(simulation: &Simulation) -> Chart {
    BarGroups {
        categories: simulation.positions.iter().map(|p| p.ticker.clone()).collect(),
        series: vec![
            (
                "Invested",
                INVESTED_COLOR,
                simulation.positions.iter().map(|p| p.invested_amount).collect(),
            ),
            (
                "Current Worth",
                WORTH_COLOR,
                simulation.positions.iter().map(|p| p.current_worth).collect(),
            ),
        ],
        rotate_labels: false,
    }
    .render("Investment vs Current Worth", "Amount ($)", format_axis_value)
}
