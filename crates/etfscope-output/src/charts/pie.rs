//! Pie chart of the projected worth per position.

use super::{Chart, HEIGHT, WIDTH, color, empty_chart, escape, svg_footer, svg_header, title_text};
use crate::summary::format_currency;
use etfscope_metrics::Simulation;
use std::f64::consts::{FRAC_PI_2, TAU};

const RADIUS: f64 = 120.0;

fn point(cx: f64, cy: f64, radius: f64, angle: f64) -> (f64, f64) {
    (cx + radius * angle.cos(), cy + radius * angle.sin())
}

/// Current worth of each position. Slices are sized by share of the summed worth;
/// labels show the worth as a percentage of the total investment and in dollars.
pub fn monetary_returns_pie(simulation: &Simulation) -> Chart {
    const TITLE: &str = "Monetary Returns Distribution";

    let slices: Vec<(&str, f64)> = simulation
        .positions
        .iter()
        .filter(|p| p.current_worth.is_finite() && p.current_worth > 0.0)
        .map(|p| (p.ticker.as_str(), p.current_worth))
        .collect();
    let total_worth: f64 = slices.iter().map(|(_, w)| w).sum();
    if slices.is_empty() || total_worth <= 0.0 {
        return empty_chart(TITLE);
    }

    let cx = WIDTH / 2.0;
    let cy = HEIGHT / 2.0 + 16.0;

    let mut svg = svg_header(WIDTH, HEIGHT);
    svg.push_str(&title_text(TITLE, WIDTH));

    // Start at twelve o'clock, counter-clockwise.
    let mut start = -FRAC_PI_2;
    for (i, (ticker, worth)) in slices.iter().enumerate() {
        let sweep = TAU * worth / total_worth;
        let fill = color(i);

        if slices.len() == 1 {
            svg.push_str(&format!(
                r#"<circle cx="{cx:.2}" cy="{cy:.2}" r="{RADIUS}" fill="{fill}" stroke="white" />"#
            ));
        } else {
            let (x0, y0) = point(cx, cy, RADIUS, start);
            let (x1, y1) = point(cx, cy, RADIUS, start - sweep);
            let large_arc = u8::from(sweep > std::f64::consts::PI);
            svg.push_str(&format!(
                r#"<path d="M {cx:.2} {cy:.2} L {x0:.2} {y0:.2} A {RADIUS} {RADIUS} 0 {large_arc} 0 {x1:.2} {y1:.2} Z" fill="{fill}" stroke="white" />"#
            ));
        }

        let share = if simulation.total_investment > 0.0 {
            worth / simulation.total_investment * 100.0
        } else {
            0.0
        };
        let (lx, ly) = point(cx, cy, RADIUS * 1.3, start - sweep / 2.0);
        let anchor = if lx < cx { "end" } else { "start" };
        svg.push_str(&format!(
            r#"<text x="{lx:.2}" y="{ly:.2}" text-anchor="{anchor}">{ticker} {share:.1}% ({amount})</text>"#,
            ticker = escape(ticker),
            amount = format_currency(*worth),
        ));

        start -= sweep;
    }

    svg.push_str(svg_footer());
    Chart::new(TITLE, svg)
}
