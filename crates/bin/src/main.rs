//! etfscope CLI binary.
//!
//! Each invocation runs the dashboard pipeline once for the given selection.

mod config;

use chrono::{Months, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use config::AppConfig;
use etfscope::data::yahoo::{YahooQuoteProvider, YahooSectorProvider};
use etfscope::data::{Period, Window};
use etfscope::metrics::{AllocationEntry, AllocationPlan};
use etfscope::output::{DEFAULT_CSV_FILE_NAME, format_currency, write_closes_csv};
use etfscope::{
    Dashboard, DashboardRequest, DashboardView, EtfUniverse, TickerStatus, Universe,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "etfscope")]
#[command(about = "ETF performance dashboard with investment allocation simulation", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone)]
struct QueryArgs {
    /// Comma-separated tickers from the allow-list
    #[arg(long, value_delimiter = ',')]
    tickers: Option<Vec<String>>,

    /// Time window: 1y, 3y, 5y, 10y, ytd or custom
    #[arg(long)]
    period: Option<String>,

    /// Start date of a custom window (YYYY-MM-DD)
    #[arg(long)]
    start: Option<NaiveDate>,

    /// End date of a custom window (YYYY-MM-DD)
    #[arg(long)]
    end: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// List the selectable ETFs
    Tickers,

    /// Run the dashboard: metrics, allocation, charts
    Analyze {
        #[command(flatten)]
        query: QueryArgs,

        /// Total investment amount in dollars (0 to 100000)
        #[arg(long)]
        amount: Option<f64>,

        /// Allocation for one ticker as TICKER=PERCENT, repeatable
        #[arg(long = "allocate", value_name = "TICKER=PERCENT")]
        allocations: Vec<AllocationEntry>,

        /// Directory for charts and exports
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Skip sector weights
        #[arg(long)]
        no_sectors: bool,

        /// Skip writing SVG charts
        #[arg(long)]
        no_charts: bool,

        /// Also write the closes CSV
        #[arg(long)]
        export_csv: bool,
    },

    /// Write closing prices of the selection as CSV
    Export {
        #[command(flatten)]
        query: QueryArgs,

        /// Output file
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;
    init_logging(&config.log_filter)?;

    match cli.command {
        Commands::Tickers => list_tickers(),
        Commands::Analyze {
            query,
            amount,
            allocations,
            output_dir,
            format,
            no_sectors,
            no_charts,
            export_csv,
        } => {
            let request = build_request(&query, &config)?
                .with_investment(amount.unwrap_or(config.investment_amount))
                .with_allocation(AllocationPlan::from_entries(allocations))
                .with_sectors(config.fetch_sectors && !no_sectors);
            let output_dir = output_dir.unwrap_or_else(|| config.output_dir.clone());

            let mut dashboard = dashboard(&config)?;
            let view = with_spinner("Fetching price history...", dashboard.run(&request)).await?;

            match format {
                OutputFormat::Text => print_view(&view),
                OutputFormat::Json => println!("{}", view.report()?.to_json()?),
            }

            if !no_charts {
                write_charts(&view, &output_dir)?;
            }
            if export_csv {
                std::fs::create_dir_all(&output_dir)?;
                let path = output_dir.join(DEFAULT_CSV_FILE_NAME);
                write_closes_csv(&view.closes, &path)?;
                eprintln!("Closes written to {}", path.display());
            }
        }
        Commands::Export { query, out } => {
            let request = build_request(&query, &config)?.with_sectors(false);
            let path = out.unwrap_or_else(|| PathBuf::from(DEFAULT_CSV_FILE_NAME));

            let mut dashboard = dashboard(&config)?;
            let closes =
                with_spinner("Fetching price history...", dashboard.closes(&request)).await?;

            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            write_closes_csv(&closes, &path)?;
            println!(
                "Wrote {} rows for {} to {}",
                closes.height(),
                closes.tickers().join(", "),
                path.display()
            );
        }
    }

    Ok(())
}

fn init_logging(default_filter: &str) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_filter))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    Ok(())
}

fn dashboard(
    config: &AppConfig,
) -> Result<Dashboard<YahooQuoteProvider, YahooSectorProvider>, Box<dyn std::error::Error>> {
    Ok(Dashboard::new(
        YahooQuoteProvider::with_rate_limit(config.rate_limit())?,
        YahooSectorProvider::with_rate_limit(config.rate_limit())?,
    ))
}

/// Resolve the window from `--period`, `--start` and `--end`.
///
/// A start or end date without a period selects a custom window. A custom window
/// missing its start defaults to five years before its end; a missing end is today.
fn resolve_window(
    query: &QueryArgs,
    config: &AppConfig,
    today: NaiveDate,
) -> Result<Window, Box<dyn std::error::Error>> {
    let custom_dates = query.start.is_some() || query.end.is_some();
    let period = query
        .period
        .clone()
        .unwrap_or_else(|| {
            if custom_dates {
                "custom".to_string()
            } else {
                config.period.clone()
            }
        });

    if period.trim().eq_ignore_ascii_case("custom") {
        let end = query.end.unwrap_or(today);
        let start = query
            .start
            .or_else(|| end.checked_sub_months(Months::new(60)))
            .unwrap_or(end);
        return Ok(Window::custom(start, end)?);
    }

    if custom_dates {
        return Err("--start/--end require --period custom".into());
    }
    Ok(Window::Named(period.parse::<Period>()?))
}

fn build_request(
    query: &QueryArgs,
    config: &AppConfig,
) -> Result<DashboardRequest, Box<dyn std::error::Error>> {
    let window = resolve_window(query, config, Utc::now().date_naive())?;
    let tickers = query
        .tickers
        .clone()
        .unwrap_or_else(|| config.default_tickers.clone());
    Ok(DashboardRequest::new(&tickers, window))
}

async fn with_spinner<T, E>(
    message: &'static str,
    fut: impl Future<Output = Result<T, E>>,
) -> Result<T, E> {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(message);

    let result = fut.await;
    match &result {
        Ok(_) => pb.finish_and_clear(),
        Err(_) => pb.finish_with_message("Failed!"),
    }
    result
}

fn list_tickers() {
    let universe = EtfUniverse::new();
    let defaults = universe.default_selection();

    println!("\nSelectable ETFs ({}):", universe.size());
    println!("{}", "-".repeat(40));
    for symbol in universe.symbols() {
        let marker = if defaults.contains(&symbol) {
            " (default)"
        } else {
            ""
        };
        println!("  {symbol}{marker}");
    }
}

fn print_view(view: &DashboardView) {
    let tickers: Vec<&str> = view.tickers.iter().map(|t| t.ticker.as_str()).collect();
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║{:^62}║", format!("ANALYSIS FOR: {}", tickers.join(", ")));
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!("Window: {}", view.window);

    for ticker in &view.tickers {
        match &ticker.status {
            TickerStatus::Ready => {
                let points = ticker.series.as_ref().map_or(0, |s| s.len());
                println!("  {:<6} {} price points", ticker.ticker, points);
            }
            TickerStatus::Failed { reason } => {
                println!("  {:<6} unavailable: {}", ticker.ticker, reason);
            }
        }
        if let Some(sectors) = &ticker.sectors {
            for weight in &sectors.weights {
                println!("         {:<24} {:>6.2}%", weight.sector, weight.percent);
            }
        }
    }

    let table = view.metrics_table();
    if !table.is_empty() {
        print!("{}", table.to_ascii_table());
    }
    print!("{}", view.investment_summary().to_ascii_table());

    if view.simulation.total_earned() != 0.0 {
        println!(
            "Earned: {} on {}",
            format_currency(view.simulation.total_earned()),
            format_currency(view.simulation.total_invested)
        );
    }

    for warning in &view.warnings {
        println!("Warning: {warning}");
    }
}

fn write_charts(view: &DashboardView, output_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(output_dir)?;
    let charts = view.charts();
    for named in &charts {
        named.chart.save(&output_dir.join(&named.file_name))?;
    }
    info!(count = charts.len(), dir = %output_dir.display(), "charts written");
    eprintln!("{} charts written to {}", charts.len(), output_dir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(period: Option<&str>, start: Option<NaiveDate>, end: Option<NaiveDate>) -> QueryArgs {
        QueryArgs {
            tickers: None,
            period: period.map(str::to_string),
            start,
            end,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_window_from_config_default() {
        let window = resolve_window(&query(None, None, None), &AppConfig::default(), date(2025, 6, 1))
            .unwrap();
        assert_eq!(window, Window::Named(Period::OneYear));
    }

    #[test]
    fn test_named_period() {
        let window = resolve_window(
            &query(Some("YTD"), None, None),
            &AppConfig::default(),
            date(2025, 6, 1),
        )
        .unwrap();
        assert_eq!(window, Window::Named(Period::YearToDate));
    }

    #[test]
    fn test_dates_imply_custom_window() {
        let window = resolve_window(
            &query(None, Some(date(2024, 1, 1)), Some(date(2024, 6, 30))),
            &AppConfig::default(),
            date(2025, 6, 1),
        )
        .unwrap();
        assert_eq!(window, Window::custom(date(2024, 1, 1), date(2024, 6, 30)).unwrap());
    }

    #[test]
    fn test_custom_defaults_to_five_years() {
        let window = resolve_window(
            &query(Some("custom"), None, None),
            &AppConfig::default(),
            date(2025, 6, 1),
        )
        .unwrap();
        assert_eq!(window, Window::custom(date(2020, 6, 1), date(2025, 6, 1)).unwrap());
    }

    #[test]
    fn test_invalid_windows() {
        let config = AppConfig::default();
        let today = date(2025, 6, 1);

        assert!(resolve_window(&query(Some("2w"), None, None), &config, today).is_err());
        assert!(
            resolve_window(&query(Some("1y"), Some(date(2024, 1, 1)), None), &config, today)
                .is_err()
        );
        assert!(
            resolve_window(
                &query(None, Some(date(2024, 6, 1)), Some(date(2024, 1, 1))),
                &config,
                today
            )
            .is_err()
        );
    }

    #[test]
    fn test_cli_parses_allocations() {
        let cli = Cli::try_parse_from([
            "etfscope",
            "analyze",
            "--tickers",
            "SPY,FXI",
            "--allocate",
            "SPY=60",
            "--allocate",
            "fxi=40",
            "--amount",
            "5000",
        ])
        .unwrap();

        match cli.command {
            Commands::Analyze {
                query,
                amount,
                allocations,
                ..
            } => {
                assert_eq!(query.tickers, Some(vec!["SPY".to_string(), "FXI".to_string()]));
                assert_eq!(amount, Some(5000.0));
                let plan = AllocationPlan::from_entries(allocations);
                assert_eq!(plan.percent("FXI"), 40);
                assert_eq!(plan.total_percent(), 100);
            }
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_cli_rejects_bad_allocation() {
        assert!(Cli::try_parse_from(["etfscope", "analyze", "--allocate", "SPY=150"]).is_err());
    }
}
