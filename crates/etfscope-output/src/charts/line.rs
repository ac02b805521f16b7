//! Price line charts.

use super::{
    Chart, HEIGHT, PADDING, WIDTH, color, empty_chart, extent, format_axis_value, legend, scale_y,
    svg_footer, svg_header, title_text, y_axis,
};
use chrono::NaiveDate;
use etfscope_data::PriceSeries;

/// Maps dates linearly onto the horizontal plot area.
struct DateAxis {
    first: NaiveDate,
    span_days: f64,
}

impl DateAxis {
    fn new<'a>(series: impl IntoIterator<Item = &'a PriceSeries>) -> Option<Self> {
        let mut first: Option<NaiveDate> = None;
        let mut last: Option<NaiveDate> = None;
        for s in series {
            if let (Some(a), Some(b)) = (s.first(), s.last()) {
                first = Some(first.map_or(a.date, |f| f.min(a.date)));
                last = Some(last.map_or(b.date, |l| l.max(b.date)));
            }
        }
        let (first, last) = (first?, last?);
        Some(Self {
            first,
            span_days: (last - first).num_days() as f64,
        })
    }

    fn x(&self, date: NaiveDate) -> f64 {
        if self.span_days <= 0.0 {
            return WIDTH / 2.0;
        }
        let offset = (date - self.first).num_days() as f64;
        PADDING + (WIDTH - 2.0 * PADDING) * (offset / self.span_days)
    }

    fn last(&self) -> NaiveDate {
        self.first + chrono::Duration::days(self.span_days as i64)
    }

    fn labels(&self, svg: &mut String) {
        let mid = self.first + chrono::Duration::days((self.span_days / 2.0) as i64);
        let dates = [self.first, mid, self.last()];
        let anchors = ["start", "middle", "end"];
        for (date, anchor) in dates.iter().zip(anchors) {
            svg.push_str(&format!(
                r#"<text x="{x:.2}" y="{y:.2}" text-anchor="{anchor}">{date}</text>"#,
                x = self.x(*date),
                y = HEIGHT - PADDING + 18.0,
            ));
        }
    }
}

fn polyline(series: &PriceSeries, axis: &DateAxis, min_v: f64, max_v: f64, stroke: &str) -> String {
    let coords = series
        .points()
        .iter()
        .map(|p| format!("{:.2},{:.2}", axis.x(p.date), scale_y(p.close, min_v, max_v, HEIGHT)))
        .collect::<Vec<_>>()
        .join(" ");

    format!(r#"<polyline fill="none" stroke="{stroke}" stroke-width="1.5" points="{coords}" />"#)
}

fn render(title: &str, lines: &[(&str, &PriceSeries)], show_legend: bool) -> Chart {
    let Some(axis) = DateAxis::new(lines.iter().map(|(_, s)| *s)) else {
        return empty_chart(title);
    };
    let Some((min_v, max_v)) = extent(lines.iter().flat_map(|(_, s)| s.closes()), false) else {
        return empty_chart(title);
    };

    let mut svg = svg_header(WIDTH, HEIGHT);
    svg.push_str(&title_text(title, WIDTH));
    y_axis(&mut svg, min_v, max_v, WIDTH, HEIGHT, format_axis_value);

    for (i, (_, series)) in lines.iter().enumerate() {
        svg.push_str(&polyline(series, &axis, min_v, max_v, color(i)));
    }

    axis.labels(&mut svg);
    svg.push_str(&format!(
        r#"<text x="{x:.2}" y="{y:.2}" text-anchor="middle" transform="rotate(-90 {x:.2} {y:.2})">Price</text>"#,
        x = 14.0,
        y = HEIGHT / 2.0
    ));

    if show_legend {
        let entries: Vec<(String, &str)> = lines
            .iter()
            .enumerate()
            .map(|(i, (label, _))| ((*label).to_string(), color(i)))
            .collect();
        legend(&mut svg, &entries, WIDTH);
    }

    svg.push_str(svg_footer());
    Chart::new(title, svg)
}

/// Closing price of one ticker over time.
pub fn price_history_chart(ticker: &str, series: &PriceSeries) -> Chart {
    let title = format!("{ticker} Price History");
    render(&title, &[("Closing Price", series)], true)
}

/// Closing prices of several tickers on a shared date axis.
pub fn comparative_performance_chart(series: &[(&str, &PriceSeries)]) -> Chart {
    render("Comparative Performance of Selected ETFs", series, true)
}
