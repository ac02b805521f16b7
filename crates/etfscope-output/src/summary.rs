//! Metrics and investment summary tables.
//!
//! Both summaries render either as an ASCII table for the terminal or as Markdown.

use etfscope_metrics::{Metrics, Simulation};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder for a metric that could not be computed.
pub const NOT_AVAILABLE: &str = "N/A";

/// Format an amount as US dollars with thousands separators, e.g. `$1,234.56`.
///
/// # Examples
///
/// ```
/// use etfscope_output::format_currency;
///
/// assert_eq!(format_currency(1234.5), "$1,234.50");
/// assert_eq!(format_currency(-500.0), "-$500.00");
/// ```
pub fn format_currency(amount: f64) -> String {
    if !amount.is_finite() {
        return NOT_AVAILABLE.to_string();
    }

    let cents = format!("{:.2}", amount.abs());
    let (whole, fraction) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 && cents != "0.00" { "-" } else { "" };
    format!("{sign}${grouped}.{fraction}")
}

/// Format a fraction as a percentage with two decimals, e.g. `0.1234` as `12.34%`.
pub fn format_percent(fraction: f64) -> String {
    if fraction.is_finite() {
        format!("{:.2}%", fraction * 100.0)
    } else {
        NOT_AVAILABLE.to_string()
    }
}

fn format_metric(value: Option<f64>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), format_percent)
}

/// Metrics of one ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsRow {
    /// Ticker.
    pub ticker: String,
    /// Computed metrics.
    pub metrics: Metrics,
}

/// Per-ticker metrics table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsTable {
    /// Rows in display order.
    pub rows: Vec<MetricsRow>,
}

impl MetricsTable {
    /// Create a table from rows.
    pub const fn new(rows: Vec<MetricsRow>) -> Self {
        Self { rows }
    }

    /// Append a row.
    pub fn push(&mut self, ticker: impl Into<String>, metrics: Metrics) {
        self.rows.push(MetricsRow {
            ticker: ticker.into(),
            metrics,
        });
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Format as ASCII table for terminal display.
    pub fn to_ascii_table(&self) -> String {
        let mut output = String::new();

        output.push_str("\nETF Metrics\n");
        output.push_str(&"=".repeat(64));
        output.push('\n');
        output.push_str(&format!(
            "{:<10} {:>16} {:>16} {:>18}\n",
            "Ticker", "Average Return", "Volatility", "Cumulative Return"
        ));
        output.push_str(&"-".repeat(64));
        output.push('\n');

        for row in &self.rows {
            output.push_str(&format!(
                "{:<10} {:>16} {:>16} {:>18}\n",
                row.ticker,
                format_metric(row.metrics.average_return),
                format_metric(row.metrics.volatility),
                format_metric(row.metrics.cumulative_return),
            ));
        }

        output.push_str(&"=".repeat(64));
        output.push('\n');
        output
    }

    /// Format as Markdown.
    pub fn to_markdown(&self) -> String {
        let mut output = String::from("## ETF Metrics\n\n");
        output.push_str("| Ticker | Average Return | Volatility | Cumulative Return |\n");
        output.push_str("|--------|----------------|------------|-------------------|\n");
        for row in &self.rows {
            output.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                row.ticker,
                format_metric(row.metrics.average_return),
                format_metric(row.metrics.volatility),
                format_metric(row.metrics.cumulative_return),
            ));
        }
        output
    }
}

impl fmt::Display for MetricsTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_ascii_table())
    }
}

/// Investment allocation outcome with totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentSummary {
    /// Simulated positions and totals.
    pub simulation: Simulation,
}

impl InvestmentSummary {
    /// Summarise a simulation.
    pub const fn new(simulation: Simulation) -> Self {
        Self { simulation }
    }

    /// Format as ASCII table for terminal display.
    pub fn to_ascii_table(&self) -> String {
        let sim = &self.simulation;
        let mut output = String::new();

        output.push_str(&format!(
            "\nInvestment Allocation ({} total)\n",
            format_currency(sim.total_investment)
        ));
        output.push_str(&"=".repeat(64));
        output.push('\n');
        output.push_str(&format!(
            "{:<10} {:>10} {:>20} {:>20}\n",
            "Ticker", "Allocation", "Invested", "Current Worth"
        ));
        output.push_str(&"-".repeat(64));
        output.push('\n');

        for p in &sim.positions {
            output.push_str(&format!(
                "{:<10} {:>9}% {:>20} {:>20}\n",
                p.ticker,
                p.allocation_percent,
                format_currency(p.invested_amount),
                format_currency(p.current_worth),
            ));
        }

        output.push_str(&"-".repeat(64));
        output.push('\n');
        output.push_str(&format!(
            "  Total Invested:      {}\n",
            format_currency(sim.total_invested)
        ));
        output.push_str(&format!(
            "  Total Current Worth: {}\n",
            format_currency(sim.total_worth)
        ));
        output.push_str(&format!(
            "  Total Earned:        {}\n",
            format_currency(sim.total_earned())
        ));
        if !sim.excluded.is_empty() {
            output.push_str(&format!("  Excluded:            {}\n", sim.excluded.join(", ")));
        }
        output.push_str(&"=".repeat(64));
        output.push('\n');
        output
    }

    /// Format as Markdown.
    pub fn to_markdown(&self) -> String {
        let sim = &self.simulation;
        let mut output = String::from("## Investment Allocation\n\n");
        output.push_str("| Ticker | Allocation | Invested | Current Worth |\n");
        output.push_str("|--------|------------|----------|---------------|\n");
        for p in &sim.positions {
            output.push_str(&format!(
                "| {} | {}% | {} | {} |\n",
                p.ticker,
                p.allocation_percent,
                format_currency(p.invested_amount),
                format_currency(p.current_worth),
            ));
        }
        output.push('\n');
        output.push_str(&format!(
            "- **Total Invested:** {}\n",
            format_currency(sim.total_invested)
        ));
        output.push_str(&format!(
            "- **Total Current Worth:** {}\n",
            format_currency(sim.total_worth)
        ));
        output.push_str(&format!(
            "- **Total Earned:** {}\n",
            format_currency(sim.total_earned())
        ));
        output
    }
}

impl fmt::Display for InvestmentSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sim = &self.simulation;
        writeln!(f, "Total Invested: {}", format_currency(sim.total_invested))?;
        writeln!(f, "Total Current Worth: {}", format_currency(sim.total_worth))?;
        writeln!(f, "Total Earned: {}", format_currency(sim.total_earned()))?;
        Ok(())
    }
}
