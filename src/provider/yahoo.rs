// =============================================================================
// Yahoo Finance REST Client — daily history and company profile
// =============================================================================
//
//   GET /v8/finance/chart/{symbol}           daily OHLCV rows
//   GET /v10/finance/quoteSummary/{symbol}   assetProfile (summary, website)
//
// quoteSummary only answers with a session cookie plus the matching crumb:
// the cookie comes from `session_cookie_url`, the crumb from
// `/v1/test/getcrumb`, and both are fetched fresh for every metadata call.
//
// Yahoo answers an unknown symbol with a `chart.error` object (usually with a
// 404). That is reported as an empty series, not as a failure.
// =============================================================================

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Days, NaiveDate, NaiveTime};
use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::config::DashboardConfig;
use crate::market_data::{PriceBar, PriceSeries, SymbolMetadata};
use crate::provider::MarketDataProvider;

/// Logo service the company website's host is appended to.
const LOGO_SERVICE: &str = "https://logo.clearbit.com";

/// Yahoo Finance client implementing [`MarketDataProvider`].
#[derive(Clone)]
pub struct YahooClient {
    base_url: Url,
    session_cookie_url: Url,
    client: reqwest::Client,
}

impl YahooClient {
    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    pub fn new(config: &DashboardConfig) -> Result<Self> {
        let base_url = Url::parse(&config.provider_base_url)
            .with_context(|| format!("invalid provider url '{}'", config.provider_base_url))?;

        let session_cookie_url = Url::parse(&config.session_cookie_url)
            .with_context(|| format!("invalid session cookie url '{}'", config.session_cookie_url))?;

        let mut builder = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .cookie_store(true);
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(std::time::Duration::from_secs(secs));
        }
        let client = builder.build().context("failed to build reqwest client")?;

        debug!(base_url = %base_url, timeout_secs = ?config.request_timeout_secs, "YahooClient initialised");

        Ok(Self {
            base_url,
            session_cookie_url,
            client,
        })
    }

    /// `{base}/{segments..}` with each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("provider url '{}' cannot take a path", self.base_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Pick up a session cookie, then exchange it for a crumb.
    #[instrument(skip(self), name = "yahoo::fetch_crumb")]
    async fn fetch_crumb(&self) -> Result<String> {
        // The cookie host answers 404 while still setting the cookie, so only
        // transport errors matter here.
        self.client
            .get(self.session_cookie_url.clone())
            .send()
            .await
            .context("session cookie request failed")?;

        let resp = self
            .client
            .get(self.endpoint(&["v1", "test", "getcrumb"])?)
            .send()
            .await
            .context("GET /v1/test/getcrumb request failed")?;

        let status = resp.status();
        let crumb = resp.text().await.context("failed to read crumb response")?;
        let crumb = crumb.trim();
        if !status.is_success() || crumb.is_empty() {
            anyhow::bail!("Yahoo GET /v1/test/getcrumb returned {status}: {crumb}");
        }
        Ok(crumb.to_string())
    }
}

#[async_trait]
impl MarketDataProvider for YahooClient {
    /// GET /v8/finance/chart/{symbol} — daily bars in `[start, end)`.
    #[instrument(skip(self), name = "yahoo::fetch_history")]
    async fn fetch_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries> {
        let url = self.endpoint(&["v8", "finance", "chart", symbol])?;
        // Bars are stamped at the exchange open in UTC, which can fall on the
        // previous UTC day. Ask for one extra day each side and cut by local
        // date below.
        let padded_start = start.checked_sub_days(Days::new(1)).unwrap_or(start);
        let padded_end = end.checked_add_days(Days::new(1)).unwrap_or(end);
        let period1 = padded_start.and_time(NaiveTime::MIN).and_utc().timestamp();
        let period2 = padded_end.and_time(NaiveTime::MIN).and_utc().timestamp();

        let resp = self
            .client
            .get(url)
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
                ("events", "div,splits".to_string()),
            ])
            .send()
            .await
            .context("GET /v8/finance/chart request failed")?;

        let status = resp.status();
        let body = resp.text().await.context("failed to read chart response")?;

        let envelope: ChartEnvelope = match serde_json::from_str(&body) {
            Ok(env) => env,
            Err(e) if status.is_success() => {
                return Err(e).context("failed to parse chart response");
            }
            Err(_) => anyhow::bail!("Yahoo GET /v8/finance/chart returned {status}: {body}"),
        };

        if let Some(err) = envelope.chart.error {
            warn!(symbol, status = %status, error = %err, "provider reported no chart data");
            return Ok(PriceSeries::empty());
        }
        if !status.is_success() {
            anyhow::bail!("Yahoo GET /v8/finance/chart returned {status}: {body}");
        }

        let series = envelope
            .chart
            .result
            .into_iter()
            .flatten()
            .next()
            .map(|result| {
                let bars = bars_from_chart(result)
                    .into_iter()
                    .filter(|b| b.date >= start && b.date < end)
                    .collect();
                PriceSeries::new(bars)
            })
            .unwrap_or_default();

        debug!(symbol, rows = series.len(), "history retrieved");
        Ok(series)
    }

    /// GET /v10/finance/quoteSummary/{symbol}?modules=assetProfile.
    #[instrument(skip(self), name = "yahoo::fetch_metadata")]
    async fn fetch_metadata(&self, symbol: &str) -> Result<SymbolMetadata> {
        let url = self.endpoint(&["v10", "finance", "quoteSummary", symbol])?;
        let crumb = self.fetch_crumb().await?;

        let resp = self
            .client
            .get(url)
            .query(&[("modules", "assetProfile"), ("crumb", crumb.as_str())])
            .send()
            .await
            .context("GET /v10/finance/quoteSummary request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Yahoo GET /v10/finance/quoteSummary returned {status}: {body}");
        }

        let envelope: QuoteSummaryEnvelope = resp
            .json()
            .await
            .context("failed to parse quoteSummary response")?;

        let profile = envelope
            .quote_summary
            .result
            .into_iter()
            .flatten()
            .next()
            .and_then(|r| r.asset_profile)
            .unwrap_or_default();

        debug!(symbol, has_summary = profile.long_business_summary.is_some(), "metadata retrieved");
        Ok(metadata_from_profile(profile))
    }
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    #[serde(default)]
    indicators: ChartIndicators,
}

#[derive(Debug, Default, Deserialize)]
struct ChartMeta {
    /// Exchange offset from UTC in seconds.
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Default, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<QuoteColumns>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteColumns {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryEnvelope {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummaryBody,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryBody {
    #[serde(default)]
    result: Option<Vec<QuoteSummaryResult>>,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryResult {
    #[serde(default, rename = "assetProfile")]
    asset_profile: Option<AssetProfile>,
}

#[derive(Debug, Default, Deserialize)]
struct AssetProfile {
    #[serde(default, rename = "longBusinessSummary")]
    long_business_summary: Option<String>,
    #[serde(default)]
    website: Option<String>,
}

// =============================================================================
// Conversion
// =============================================================================

/// Zip the column arrays into bars, dropping any row with a null field.
fn bars_from_chart(result: ChartResult) -> Vec<PriceBar> {
    let Some(quote) = result.indicators.quote.into_iter().next() else {
        return Vec::new();
    };
    let offset = result.meta.gmtoffset;
    let col = |v: &[Option<f64>], i: usize| v.get(i).copied().flatten();

    result
        .timestamp
        .iter()
        .enumerate()
        .filter_map(|(i, &ts)| {
            let date = DateTime::from_timestamp(ts.checked_add(offset)?, 0)?.date_naive();
            Some(PriceBar {
                date,
                open: col(&quote.open, i)?,
                high: col(&quote.high, i)?,
                low: col(&quote.low, i)?,
                close: col(&quote.close, i)?,
                volume: col(&quote.volume, i)?,
            })
        })
        .collect()
}

fn metadata_from_profile(profile: AssetProfile) -> SymbolMetadata {
    let summary = profile
        .long_business_summary
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    let logo_url = profile.website.as_deref().and_then(logo_url_for_website);
    SymbolMetadata { summary, logo_url }
}

/// `https://www.apple.com/` → `https://logo.clearbit.com/apple.com`.
fn logo_url_for_website(website: &str) -> Option<String> {
    let without_scheme = website
        .split_once("://")
        .map_or(website, |(_, rest)| rest);
    let host = without_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default()
        .trim();
    let host = host.strip_prefix("www.").unwrap_or(host);
    if host.is_empty() {
        return None;
    }
    Some(format!("{LOGO_SERVICE}/{host}"))
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Indicator;

    const CHART_JSON: &str = r#"{
        "chart": {
            "result": [{
                "meta": { "symbol": "AAPL", "gmtoffset": -18000 },
                "timestamp": [1672756200, 1672842600, 1672929000],
                "indicators": { "quote": [{
                    "open":   [130.28, 126.89, null],
                    "high":   [130.90, 128.66, 127.77],
                    "low":    [124.17, 125.08, 124.76],
                    "close":  [125.07, 126.36, 125.02],
                    "volume": [112117500, 89113600, 80962700]
                }]}
            }],
            "error": null
        }
    }"#;

    #[test]
    fn chart_rows_become_bars_in_exchange_time() {
        let env: ChartEnvelope = serde_json::from_str(CHART_JSON).unwrap();
        let result = env.chart.result.unwrap().into_iter().next().unwrap();
        let bars = bars_from_chart(result);

        // Third row has a null open and is dropped.
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2023, 1, 3).unwrap());
        assert_eq!(bars[1].date, NaiveDate::from_ymd_opt(2023, 1, 4).unwrap());
        assert!((bars[0].close - 125.07).abs() < 1e-9);
        assert!((bars[1].volume - 89_113_600.0).abs() < 1e-9);
    }

    #[test]
    fn chart_without_quotes_is_empty() {
        let json = r#"{ "chart": { "result": [{ "meta": {}, "indicators": { "quote": [] } }] } }"#;
        let env: ChartEnvelope = serde_json::from_str(json).unwrap();
        let result = env.chart.result.unwrap().into_iter().next().unwrap();
        assert!(bars_from_chart(result).is_empty());
    }

    #[test]
    fn unknown_symbol_error_object_parses() {
        let json = r#"{ "chart": { "result": null, "error": { "code": "Not Found", "description": "No data found, symbol may be delisted" } } }"#;
        let env: ChartEnvelope = serde_json::from_str(json).unwrap();
        assert!(env.chart.result.is_none());
        assert!(env.chart.error.is_some());
    }

    #[test]
    fn profile_maps_to_metadata() {
        let json = r#"{ "quoteSummary": { "result": [{ "assetProfile": {
            "longBusinessSummary": "Apple Inc. designs phones.",
            "website": "https://www.apple.com"
        }}], "error": null } }"#;
        let env: QuoteSummaryEnvelope = serde_json::from_str(json).unwrap();
        let profile = env
            .quote_summary
            .result
            .unwrap()
            .into_iter()
            .next()
            .unwrap()
            .asset_profile
            .unwrap();
        let meta = metadata_from_profile(profile);
        assert_eq!(meta.summary.as_deref(), Some("Apple Inc. designs phones."));
        assert_eq!(meta.logo_url.as_deref(), Some("https://logo.clearbit.com/apple.com"));
    }

    #[test]
    fn blank_profile_has_no_metadata() {
        let meta = metadata_from_profile(AssetProfile {
            long_business_summary: Some("   ".to_string()),
            website: None,
        });
        assert_eq!(meta, SymbolMetadata::default());
    }

    #[test]
    fn logo_url_strips_scheme_www_and_path() {
        assert_eq!(
            logo_url_for_website("http://www.example.com/about?x=1").as_deref(),
            Some("https://logo.clearbit.com/example.com")
        );
        assert_eq!(
            logo_url_for_website("investor.example.org").as_deref(),
            Some("https://logo.clearbit.com/investor.example.org")
        );
        assert!(logo_url_for_website("https://").is_none());
    }

    #[test]
    fn endpoint_encodes_symbol_segment() {
        let client = YahooClient::new(&DashboardConfig::default()).unwrap();
        let url = client.endpoint(&["v8", "finance", "chart", "BRK B"]).unwrap();
        assert_eq!(url.as_str(), "https://query1.finance.yahoo.com/v8/finance/chart/BRK%20B");
    }

    #[test]
    fn overflowing_timestamp_is_dropped() {
        let result = ChartResult {
            meta: ChartMeta { gmtoffset: 3_600 },
            timestamp: vec![i64::MAX],
            indicators: ChartIndicators {
                quote: vec![QuoteColumns {
                    open: vec![Some(1.0)],
                    high: vec![Some(1.0)],
                    low: vec![Some(1.0)],
                    close: vec![Some(1.0)],
                    volume: vec![Some(1.0)],
                }],
            },
        };
        assert!(bars_from_chart(result).is_empty());
    }

    // ---- against a local Yahoo stand-in ------------------------------------

    use std::collections::HashMap;

    use axum::extract::{Path, Query};
    use axum::http::{header, StatusCode};
    use axum::response::{IntoResponse, Response};
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;

    const STUB_CRUMB: &str = "Xk2.crumb";
    /// Sydney in January, UTC+11.
    const ASX_OFFSET: i64 = 39_600;

    fn ymd(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, d).unwrap()
    }

    /// ASX daily bars are stamped 23:00 UTC on the previous day.
    fn asx_stamp(local: NaiveDate) -> i64 {
        local.and_time(NaiveTime::MIN).and_utc().timestamp() - 3_600
    }

    async fn stub_chart(
        Path(symbol): Path<String>,
        Query(q): Query<HashMap<String, String>>,
    ) -> Response {
        match symbol.as_str() {
            "MISSING" => (
                StatusCode::NOT_FOUND,
                Json(json!({ "chart": { "result": null, "error": {
                    "code": "Not Found",
                    "description": "No data found, symbol may be delisted"
                }}})),
            )
                .into_response(),
            "BROKEN" => (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "text/html")],
                "<html><body>Internal Error</body></html>",
            )
                .into_response(),
            "GARBLED" => (StatusCode::OK, "definitely not json").into_response(),
            _ => {
                let bound = |k: &str| q.get(k).and_then(|v| v.parse::<i64>().ok()).unwrap_or(0);
                let (p1, p2) = (bound("period1"), bound("period2"));
                let days: Vec<u32> = (2..=6)
                    .filter(|d| {
                        let ts = asx_stamp(ymd(*d));
                        ts >= p1 && ts < p2
                    })
                    .collect();
                let stamps: Vec<i64> = days.iter().map(|d| asx_stamp(ymd(*d))).collect();
                let px: Vec<f64> = days.iter().map(|d| 40.0 + *d as f64).collect();
                let volume = vec![1_000.0; days.len()];
                Json(json!({ "chart": { "result": [{
                    "meta": { "symbol": symbol, "gmtoffset": ASX_OFFSET },
                    "timestamp": stamps,
                    "indicators": { "quote": [{
                        "open": px, "high": px, "low": px, "close": px, "volume": volume
                    }]}
                }], "error": null }}))
                .into_response()
            }
        }
    }

    async fn stub_cookie() -> Response {
        (
            StatusCode::NOT_FOUND,
            [(header::SET_COOKIE, "A3=d=session; Path=/")],
            "",
        )
            .into_response()
    }

    async fn stub_crumb() -> &'static str {
        STUB_CRUMB
    }

    async fn stub_summary(
        Path(symbol): Path<String>,
        Query(q): Query<HashMap<String, String>>,
    ) -> Response {
        if q.get("crumb").map(String::as_str) != Some(STUB_CRUMB) {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "finance": { "result": null, "error": {
                    "code": "Unauthorized", "description": "Invalid Crumb"
                }}})),
            )
                .into_response();
        }
        if symbol == "BROKEN" {
            return (StatusCode::INTERNAL_SERVER_ERROR, "upstream timeout").into_response();
        }
        Json(json!({ "quoteSummary": { "result": [{ "assetProfile": {
            "longBusinessSummary": "BHP Group Limited operates as a resources company.",
            "website": "https://www.bhp.com"
        }}], "error": null }}))
        .into_response()
    }

    fn stub_router(with_crumb: bool) -> Router {
        let mut app = Router::new()
            .route("/cookie", get(stub_cookie))
            .route("/v8/finance/chart/:symbol", get(stub_chart))
            .route("/v10/finance/quoteSummary/:symbol", get(stub_summary));
        if with_crumb {
            app = app.route("/v1/test/getcrumb", get(stub_crumb));
        }
        app
    }

    async fn client_for(app: Router) -> YahooClient {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        let base = format!("http://{addr}");
        YahooClient::new(&DashboardConfig {
            provider_base_url: base.clone(),
            session_cookie_url: format!("{base}/cookie"),
            ..DashboardConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn east_of_utc_bars_keep_requested_local_days() {
        let client = client_for(stub_router(true)).await;
        let series = client.fetch_history("BHP.AX", ymd(3), ymd(5)).await.unwrap();

        assert_eq!(series.dates(), vec![ymd(3), ymd(4)]);
        assert_eq!(series.column(Indicator::Close), vec![43.0, 44.0]);
    }

    #[tokio::test]
    async fn chart_error_with_404_is_empty_series() {
        let client = client_for(stub_router(true)).await;
        let series = client.fetch_history("MISSING", ymd(3), ymd(5)).await.unwrap();
        assert!(series.is_empty());
    }

    #[tokio::test]
    async fn server_error_with_html_body_is_an_error() {
        let client = client_for(stub_router(true)).await;
        let err = client.fetch_history("BROKEN", ymd(3), ymd(5)).await.unwrap_err();
        assert!(err.to_string().contains("500"), "got {err}");
    }

    #[tokio::test]
    async fn unparsable_success_body_is_an_error() {
        let client = client_for(stub_router(true)).await;
        assert!(client.fetch_history("GARBLED", ymd(3), ymd(5)).await.is_err());
    }

    #[tokio::test]
    async fn metadata_is_fetched_with_crumb() {
        let client = client_for(stub_router(true)).await;
        let meta = client.fetch_metadata("BHP.AX").await.unwrap();
        assert_eq!(
            meta.summary.as_deref(),
            Some("BHP Group Limited operates as a resources company.")
        );
        assert_eq!(meta.logo_url.as_deref(), Some("https://logo.clearbit.com/bhp.com"));
    }

    #[tokio::test]
    async fn metadata_server_error_is_an_error() {
        let client = client_for(stub_router(true)).await;
        let err = client.fetch_metadata("BROKEN").await.unwrap_err();
        assert!(err.to_string().contains("500"), "got {err}");
    }

    #[tokio::test]
    async fn metadata_without_crumb_is_an_error() {
        let client = client_for(stub_router(false)).await;
        let err = client.fetch_metadata("BHP.AX").await.unwrap_err();
        assert!(err.to_string().contains("getcrumb"), "got {err}");
    }
}
