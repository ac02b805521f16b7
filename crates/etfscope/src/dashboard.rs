//! The dashboard controller.
//!
//! A [`Dashboard`] turns one [`DashboardRequest`] into a [`DashboardView`] by running
//! the whole pipeline: validate, fetch (memoized), compute metrics, fetch sector
//! weights, simulate the allocation and correlate returns. Every request is
//! recomputed from scratch apart from the price cache held by [`DataAccess`].

use crate::universe::EtfUniverse;
use etfscope_data::{
    ClosePriceFrame, DataAccess, DataError, PriceSeries, QuoteSource, SectorAllocation,
    SectorSource, TickerData, Window,
};
use etfscope_metrics::{
    AllocationPlan, CorrelationMatrix, Metrics, Simulation, compute_metrics, correlation_matrix,
    simulate,
};
use etfscope_output::{
    Chart, DashboardReport, InvestmentSummary, MetricsTable, ReportBuilder, ReportError,
    comparative_performance_chart, correlation_heatmap, investment_comparison_chart,
    monetary_returns_pie, price_history_chart, sector_allocation_chart,
};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Largest accepted investment amount.
pub const MAX_INVESTMENT: f64 = 100_000.0;

/// Investment amount used when none is given.
pub const DEFAULT_INVESTMENT: f64 = 10_000.0;

/// Errors that reject a request before any data is fetched, or abort it afterwards.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// No ticker selected.
    #[error("No tickers selected")]
    NoTickers,

    /// Tickers outside the allow-list.
    #[error("Unknown tickers: {}", .0.join(", "))]
    UnknownTickers(Vec<String>),

    /// Investment amount not finite or outside `[0, MAX_INVESTMENT]`.
    #[error("Investment amount must be between 0 and 100000, got {0}")]
    InvalidInvestment(f64),

    /// Aligning or reading price data failed.
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    /// Building the report failed.
    #[error("Report error: {0}")]
    Report(#[from] ReportError),
}

/// One dashboard query.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardRequest {
    /// Selected tickers, in selection order.
    pub tickers: Vec<String>,
    /// Time window.
    pub window: Window,
    /// Total investment amount in dollars.
    pub investment_amount: f64,
    /// Allocation percentages per ticker.
    pub allocation: AllocationPlan,
    /// Whether to fetch sector weights.
    pub fetch_sectors: bool,
}

impl DashboardRequest {
    /// Request for `tickers` over `window` with the default investment amount,
    /// an empty allocation and sector weights enabled.
    pub fn new<S: AsRef<str>>(tickers: &[S], window: Window) -> Self {
        Self {
            tickers: tickers.iter().map(|t| t.as_ref().to_string()).collect(),
            window,
            investment_amount: DEFAULT_INVESTMENT,
            allocation: AllocationPlan::new(),
            fetch_sectors: true,
        }
    }

    /// Set the investment amount.
    pub const fn with_investment(mut self, amount: f64) -> Self {
        self.investment_amount = amount;
        self
    }

    /// Set the allocation plan.
    pub fn with_allocation(mut self, allocation: AllocationPlan) -> Self {
        self.allocation = allocation;
        self
    }

    /// Enable or disable sector weights.
    pub const fn with_sectors(mut self, fetch_sectors: bool) -> Self {
        self.fetch_sectors = fetch_sectors;
        self
    }

    /// Upper-cased tickers with duplicates removed, in selection order.
    pub fn normalized_tickers(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::with_capacity(self.tickers.len());
        for t in &self.tickers {
            let t = t.trim().to_uppercase();
            if !t.is_empty() && !out.contains(&t) {
                out.push(t);
            }
        }
        out
    }
}

/// Whether a ticker made it through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickerStatus {
    /// Data fetched and all metrics computed.
    Ready,
    /// Data unavailable or metrics not computable.
    Failed {
        /// Human-readable cause.
        reason: String,
    },
}

/// Per-ticker outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct TickerView {
    /// Ticker.
    pub ticker: String,
    /// Pipeline status.
    pub status: TickerStatus,
    /// Fetched closes, absent when the fetch failed.
    pub series: Option<PriceSeries>,
    /// Computed metrics; all absent when the ticker failed.
    pub metrics: Metrics,
    /// Sector weights, absent when disabled or unavailable.
    pub sectors: Option<SectorAllocation>,
}

impl TickerView {
    /// Whether the ticker is ready.
    pub const fn is_ready(&self) -> bool {
        matches!(self.status, TickerStatus::Ready)
    }
}

/// A condition the user should be told about. Never aborts a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardWarning {
    /// Allocation percentages of the selected tickers sum to more than 100.
    OverAllocated {
        /// Sum of the percentages.
        total_percent: u32,
    },
    /// Metrics of a ticker could not be computed.
    MetricsUnavailable {
        /// Ticker.
        ticker: String,
        /// Cause.
        reason: String,
    },
}

impl fmt::Display for DashboardWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OverAllocated { total_percent } => write!(
                f,
                "Total allocation cannot exceed 100% (currently {total_percent}%)"
            ),
            Self::MetricsUnavailable { ticker, reason } => {
                write!(f, "Failed to calculate metrics for {ticker}: {reason}")
            }
        }
    }
}

/// A chart paired with the file name it is saved under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedChart {
    /// File name, e.g. `SPY_price_history.svg`.
    pub file_name: String,
    /// The chart.
    pub chart: Chart,
}

/// Everything one request produced.
#[derive(Debug, Clone)]
pub struct DashboardView {
    /// Window the data was fetched for.
    pub window: Window,
    /// One entry per selected ticker, in selection order.
    pub tickers: Vec<TickerView>,
    /// Allocation outcome over the ready tickers.
    pub simulation: Simulation,
    /// Warnings raised while computing.
    pub warnings: Vec<DashboardWarning>,
    /// Return correlation, present when at least two tickers are selected.
    pub correlation: Option<CorrelationMatrix>,
    /// Closes of all selected tickers aligned on date.
    pub closes: ClosePriceFrame,
}

impl DashboardView {
    /// Ready tickers in selection order.
    pub fn ready(&self) -> impl Iterator<Item = &TickerView> {
        self.tickers.iter().filter(|t| t.is_ready())
    }

    /// View of one ticker.
    pub fn ticker(&self, ticker: &str) -> Option<&TickerView> {
        self.tickers.iter().find(|t| t.ticker == ticker)
    }

    /// Metrics table of the ready tickers.
    pub fn metrics_table(&self) -> MetricsTable {
        let mut table = MetricsTable::default();
        for view in self.ready() {
            table.push(view.ticker.clone(), view.metrics);
        }
        table
    }

    /// Investment summary.
    pub fn investment_summary(&self) -> InvestmentSummary {
        InvestmentSummary::new(self.simulation.clone())
    }

    /// Charts for the view: price history and sectors per ready ticker, comparative
    /// performance and correlation when several tickers are selected, and the
    /// investment charts.
    pub fn charts(&self) -> Vec<NamedChart> {
        let mut charts = Vec::new();
        let mut push = |file_name: String, chart: Chart| {
            charts.push(NamedChart { file_name, chart });
        };

        for view in self.ready() {
            if let Some(series) = &view.series {
                push(
                    format!("{}_price_history.svg", view.ticker),
                    price_history_chart(&view.ticker, series),
                );
            }
            if let Some(sectors) = view.sectors.as_ref().filter(|s| !s.is_empty()) {
                push(
                    format!("{}_sectors.svg", view.ticker),
                    sector_allocation_chart(&view.ticker, sectors),
                );
            }
        }

        if self.tickers.len() > 1 {
            let series: Vec<(&str, &PriceSeries)> = self
                .ready()
                .filter_map(|v| v.series.as_ref().map(|s| (v.ticker.as_str(), s)))
                .collect();
            push(
                "comparative_performance.svg".to_string(),
                comparative_performance_chart(&series),
            );
        }
        if let Some(correlation) = &self.correlation {
            push(
                "correlation_heatmap.svg".to_string(),
                correlation_heatmap(correlation),
            );
        }

        push(
            "investment_comparison.svg".to_string(),
            investment_comparison_chart(&self.simulation),
        );
        push(
            "monetary_returns.svg".to_string(),
            monetary_returns_pie(&self.simulation),
        );

        charts
    }

    /// Serializable report of the view.
    ///
    /// # Errors
    ///
    /// Returns an error if the report cannot be assembled.
    pub fn report(&self) -> Result<DashboardReport, DashboardError> {
        let mut builder = ReportBuilder::new()
            .window(self.window.to_string())
            .tickers(self.tickers.iter().map(|t| t.ticker.clone()).collect())
            .metrics(self.metrics_table())
            .investment(self.investment_summary());

        for sectors in self.ready().filter_map(|t| t.sectors.clone()) {
            builder = builder.sector(sectors);
        }
        if let Some(correlation) = &self.correlation {
            builder = builder.correlation(correlation.clone());
        }
        for warning in &self.warnings {
            builder = builder.warning(warning.to_string());
        }

        Ok(builder.build()?)
    }
}

/// The dashboard controller.
#[derive(Debug)]
pub struct Dashboard<Q, S> {
    universe: EtfUniverse,
    access: DataAccess<Q>,
    sectors: S,
}

impl<Q: QuoteSource, S: SectorSource> Dashboard<Q, S> {
    /// Create a dashboard over the built-in ETF universe.
    pub fn new(quotes: Q, sectors: S) -> Self {
        Self {
            universe: EtfUniverse::new(),
            access: DataAccess::new(quotes),
            sectors,
        }
    }

    /// Replace the ticker universe.
    pub fn with_universe(mut self, universe: EtfUniverse) -> Self {
        self.universe = universe;
        self
    }

    /// The ticker universe.
    pub const fn universe(&self) -> &EtfUniverse {
        &self.universe
    }

    /// The memoized data access.
    pub const fn data_access(&self) -> &DataAccess<Q> {
        &self.access
    }

    fn validate(&self, request: &DashboardRequest) -> Result<Vec<String>, DashboardError> {
        let tickers = request.normalized_tickers();
        if tickers.is_empty() {
            return Err(DashboardError::NoTickers);
        }

        let unknown = self.universe.unknown(&tickers);
        if !unknown.is_empty() {
            return Err(DashboardError::UnknownTickers(unknown));
        }

        let amount = request.investment_amount;
        if !amount.is_finite() || !(0.0..=MAX_INVESTMENT).contains(&amount) {
            return Err(DashboardError::InvalidInvestment(amount));
        }

        Ok(tickers)
    }

    /// Fetch closes only, aligned on date. Used by the CSV export.
    ///
    /// # Errors
    ///
    /// Returns an error if the request is invalid or alignment fails.
    pub async fn closes(&mut self, request: &DashboardRequest) -> Result<ClosePriceFrame, DashboardError> {
        let tickers = self.validate(request)?;
        let data = self.access.fetch(&tickers, &request.window).await;
        Ok(ClosePriceFrame::from_data(&tickers, &data)?)
    }

    /// Run the pipeline for one request.
    ///
    /// # Errors
    ///
    /// Returns an error if the request is invalid or the fetched data cannot be
    /// aligned. Per-ticker failures are reported in the view, never as an error.
    pub async fn run(&mut self, request: &DashboardRequest) -> Result<DashboardView, DashboardError> {
        let tickers = self.validate(request)?;
        info!(tickers = ?tickers, window = %request.window, "running dashboard");

        let data = self.access.fetch(&tickers, &request.window).await;

        let mut warnings = Vec::new();
        let mut views = Vec::with_capacity(tickers.len());
        for ticker in &tickers {
            let (status, series, metrics) = match data.get(ticker) {
                Some(TickerData::Available(series)) => {
                    let metrics = compute_metrics(series);
                    let status = if metrics.is_complete() {
                        TickerStatus::Ready
                    } else {
                        TickerStatus::Failed {
                            reason: format!(
                                "{} price point(s) in the window, at least 2 required",
                                series.len()
                            ),
                        }
                    };
                    (status, Some(series.clone()), metrics)
                }
                Some(TickerData::Unavailable { reason }) => (
                    TickerStatus::Failed {
                        reason: reason.clone(),
                    },
                    None,
                    Metrics::absent(),
                ),
                None => (
                    TickerStatus::Failed {
                        reason: "no data returned".to_string(),
                    },
                    None,
                    Metrics::absent(),
                ),
            };

            if let TickerStatus::Failed { reason } = &status {
                warn!(ticker = %ticker, reason = %reason, "metrics unavailable");
                warnings.push(DashboardWarning::MetricsUnavailable {
                    ticker: ticker.clone(),
                    reason: reason.clone(),
                });
            }

            views.push(TickerView {
                ticker: ticker.clone(),
                status,
                series,
                metrics,
                sectors: None,
            });
        }

        if request.fetch_sectors {
            for view in views.iter_mut().filter(|v| v.is_ready()) {
                match self.sectors.fetch_sector_weights(&view.ticker).await {
                    Ok(sectors) if !sectors.is_empty() => view.sectors = Some(sectors),
                    Ok(_) => debug!(ticker = %view.ticker, "no sector weights"),
                    Err(e) => debug!(ticker = %view.ticker, error = %e, "sector weights unavailable"),
                }
            }
        }

        let selected_plan = request.allocation.restricted_to(&tickers);
        if selected_plan.is_over_allocated() {
            let total_percent = selected_plan.total_percent();
            warn!(total_percent, "allocation exceeds 100%");
            warnings.push(DashboardWarning::OverAllocated { total_percent });
        }

        let ready: Vec<String> = views
            .iter()
            .filter(|v| v.is_ready())
            .map(|v| v.ticker.clone())
            .collect();
        let metrics: BTreeMap<String, Metrics> = views
            .iter()
            .filter(|v| v.is_ready())
            .map(|v| (v.ticker.clone(), v.metrics))
            .collect();
        let simulation = simulate(
            &selected_plan.restricted_to(&ready),
            request.investment_amount,
            &metrics,
        );

        let closes = ClosePriceFrame::from_data(&tickers, &data)?;
        let correlation = if tickers.len() > 1 {
            Some(correlation_matrix(&closes.columns()?))
        } else {
            None
        };

        info!(
            ready = ready.len(),
            failed = tickers.len() - ready.len(),
            total_worth = simulation.total_worth,
            "dashboard complete"
        );

        Ok(DashboardView {
            window: request.window,
            tickers: views,
            simulation,
            warnings,
            correlation,
            closes,
        })
    }
}
