// =============================================================================
// Dashboard Update — form state → (chart, info panel)
// =============================================================================
//
// Every submit recomputes the whole view from the four form inputs; nothing
// is kept between requests. The guard (clicked at least once, symbol and both
// dates present) runs before the provider is touched. Failures never escape
// as errors: the caller always gets a valid, possibly empty, view plus an
// optional message for the page to show.
// =============================================================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::chart::{self, ChartSpec};
use crate::market_data::SymbolMetadata;
use crate::provider::MarketDataProvider;
use crate::types::Indicator;

/// Summary shown when the provider has no business description.
pub const NO_INFORMATION: &str = "No information available.";

// =============================================================================
// Form state
// =============================================================================

fn default_indicator_names() -> Vec<String> {
    vec![Indicator::Close.to_string()]
}

/// Raw values of the dashboard form as the page sends them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormState {
    /// Submit button presses so far in this page session.
    #[serde(default)]
    pub n_clicks: u64,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default = "default_indicator_names")]
    pub indicators: Vec<String>,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            n_clicks: 0,
            symbol: None,
            start_date: None,
            end_date: None,
            indicators: default_indicator_names(),
        }
    }
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl FormState {
    /// Symbol and both dates, if the submit guard passes.
    fn required_fields(&self) -> Option<(&str, &str, &str)> {
        if self.n_clicks == 0 {
            return None;
        }
        Some((
            non_empty(&self.symbol)?,
            non_empty(&self.start_date)?,
            non_empty(&self.end_date)?,
        ))
    }

    /// Selected indicators in selection order; unknown names are skipped.
    pub fn selected_indicators(&self) -> Vec<Indicator> {
        self.indicators
            .iter()
            .filter_map(|name| match name.parse::<Indicator>() {
                Ok(indicator) => Some(indicator),
                Err(e) => {
                    debug!(error = %e, "ignoring indicator");
                    None
                }
            })
            .collect()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("{field} date '{value}' is not a valid YYYY-MM-DD date")]
    InvalidDate { field: &'static str, value: String },

    #[error("end date {end} is before start date {start}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },
}

/// Strict `YYYY-MM-DD`.
pub fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, FormError> {
    let invalid = || FormError::InvalidDate {
        field,
        value: value.to_string(),
    };
    if value.len() != 10 {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| invalid())
}

fn parse_range(start: &str, end: &str) -> Result<(NaiveDate, NaiveDate), FormError> {
    let start = parse_date("start", start)?;
    let end = parse_date("end", end)?;
    if end < start {
        return Err(FormError::InvertedRange { start, end });
    }
    Ok((start, end))
}

// =============================================================================
// Submission state machine
// =============================================================================

/// Idle until the first submit; afterwards every submit goes through Loading
/// and lands on Displayed, even when the fetch produced nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmissionState {
    Idle,
    Loading,
    Displayed,
}

impl Default for SubmissionState {
    fn default() -> Self {
        Self::Idle
    }
}

impl SubmissionState {
    pub fn submit(self) -> Self {
        Self::Loading
    }

    pub fn display(self) -> Self {
        match self {
            Self::Idle => Self::Idle,
            Self::Loading | Self::Displayed => Self::Displayed,
        }
    }

    fn for_clicks(n_clicks: u64) -> Self {
        if n_clicks == 0 {
            Self::Idle
        } else {
            Self::Idle.submit()
        }
    }
}

impl std::fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Loading => write!(f, "Loading"),
            Self::Displayed => write!(f, "Displayed"),
        }
    }
}

// =============================================================================
// View
// =============================================================================

/// Company blurb and logo under the chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoPanel {
    pub summary: String,
    pub logo_url: String,
}

impl From<SymbolMetadata> for InfoPanel {
    fn from(meta: SymbolMetadata) -> Self {
        Self {
            summary: meta.summary.unwrap_or_else(|| NO_INFORMATION.to_string()),
            logo_url: meta.logo_url.unwrap_or_default(),
        }
    }
}

/// Everything the page needs to redraw after a submit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardView {
    pub figure: ChartSpec,
    /// `None` renders as an empty info block.
    pub info: Option<InfoPanel>,
    pub state: SubmissionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DashboardView {
    fn blank(state: SubmissionState) -> Self {
        Self {
            figure: ChartSpec::empty(),
            info: None,
            state,
            error: None,
        }
    }

    fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error = Some(message.into());
        self
    }
}

// =============================================================================
// Update
// =============================================================================

/// Compute the dashboard view for one form submission.
pub async fn update(provider: &dyn MarketDataProvider, form: &FormState) -> DashboardView {
    let state = SubmissionState::for_clicks(form.n_clicks);

    let Some((symbol, start, end)) = form.required_fields() else {
        debug!(n_clicks = form.n_clicks, "submit guard not met, returning empty view");
        return DashboardView::blank(state.display());
    };

    let (start_date, end_date) = match parse_range(start, end) {
        Ok(range) => range,
        Err(e) => {
            warn!(symbol, error = %e, "rejected date range");
            return DashboardView::blank(state.display()).with_error(e.to_string());
        }
    };

    let indicators = form.selected_indicators();
    info!(
        symbol,
        start = %start_date,
        end = %end_date,
        indicators = ?indicators,
        "dashboard update"
    );

    let (history, metadata) = tokio::join!(
        provider.fetch_history(symbol, start_date, end_date),
        provider.fetch_metadata(symbol),
    );

    let series = match history {
        Ok(series) => series,
        Err(e) => {
            warn!(symbol, error = %e, "history fetch failed");
            return DashboardView::blank(state.display())
                .with_error(format!("Could not retrieve data for {symbol}."));
        }
    };

    let figure = chart::render(&series, &indicators);

    if series.is_empty() {
        warn!(symbol, start = %start_date, end = %end_date, "provider returned no rows");
        return DashboardView {
            figure,
            info: None,
            state: state.display(),
            error: Some(format!(
                "No price data for {symbol} between {start_date} and {end_date}."
            )),
        };
    }

    let meta = metadata.unwrap_or_else(|e| {
        warn!(symbol, error = %e, "metadata fetch failed");
        SymbolMetadata::default()
    });

    debug!(
        symbol,
        traces = ?figure.trace_names(),
        points = series.len(),
        "chart rendered"
    );

    DashboardView {
        figure,
        info: Some(InfoPanel::from(meta)),
        state: state.display(),
        error: None,
    }
}
