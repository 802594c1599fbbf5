//! Yahoo Finance chart API client for daily price history.
//!
//! Only the daily adjusted close is requested. The chart endpoint wraps
//! every payload in `{"chart": {"result": [...], "error": ...}}`.

use chrono::{DateTime, Duration, NaiveDate};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use super::types::PricePoint;

/// Yahoo Finance API base URL.
const BASE_URL: &str = "https://query1.finance.yahoo.com";

/// The chart endpoint rejects requests without a browser-like agent.
const USER_AGENT: &str = "Mozilla/5.0 (compatible; market-cycles)";

/// Yahoo Finance API errors.
#[derive(Error, Debug)]
pub enum YahooError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("API error [{code}]: {description}")]
    ApiError { code: String, description: String },

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartEnvelope,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteData>,
    #[serde(default)]
    adjclose: Option<Vec<AdjCloseData>>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseData {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

/// Yahoo Finance chart client.
pub struct YahooClient {
    client: Client,
    base_url: String,
}

impl Default for YahooClient {
    fn default() -> Self {
        Self::new()
    }
}

impl YahooClient {
    /// Create a client against the public endpoint.
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    /// Create a client against a different host (mirrors, test servers).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    fn chart_url(&self, symbol: &str) -> String {
        format!("{}/v8/finance/chart/{}", self.base_url, symbol)
    }

    /// Fetch daily adjusted closes for `start..=end`.
    ///
    /// Falls back to the raw close when the response has no adjusted
    /// series. Samples with a null price are skipped.
    pub async fn fetch_adjusted_close(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PricePoint>, YahooError> {
        // period2 is exclusive on the API side
        let period1 = unix_seconds(start).to_string();
        let period2 = unix_seconds(end + Duration::days(1)).to_string();
        let params = [
            ("period1", period1.as_str()),
            ("period2", period2.as_str()),
            ("interval", "1d"),
            ("events", "history"),
        ];

        tracing::info!("Fetching {} daily closes from {} to {}", symbol, start, end);

        let response = self
            .client
            .get(self.chart_url(symbol))
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .query(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(YahooError::ApiError {
                code: status.to_string(),
                description: text,
            });
        }

        let body = response.text().await?;
        let points = parse_chart(&body)?;

        tracing::info!("Fetched {} samples for {}", points.len(), symbol);
        Ok(points)
    }
}

/// Seconds since the Unix epoch at midnight UTC.
fn unix_seconds(date: NaiveDate) -> i64 {
    (date - NaiveDate::default()).num_days() * 86_400
}

/// Parse a chart payload into dated prices.
fn parse_chart(body: &str) -> Result<Vec<PricePoint>, YahooError> {
    let response: ChartResponse = serde_json::from_str(body)
        .map_err(|e| YahooError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

    if let Some(error) = response.chart.error {
        return Err(YahooError::ApiError {
            code: error.code,
            description: error.description,
        });
    }

    let data = response
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| YahooError::InvalidResponse("Empty result array".to_string()))?;

    let adjusted = data
        .indicators
        .adjclose
        .and_then(|a| a.into_iter().next())
        .map(|a| a.adjclose);
    let prices = match adjusted {
        Some(values) => values,
        None => data
            .indicators
            .quote
            .into_iter()
            .next()
            .map(|q| q.close)
            .ok_or_else(|| YahooError::InvalidResponse("No quote data".to_string()))?,
    };

    if prices.len() != data.timestamp.len() {
        return Err(YahooError::InvalidResponse(format!(
            "{} timestamps but {} prices",
            data.timestamp.len(),
            prices.len()
        )));
    }

    let mut points = Vec::with_capacity(prices.len());
    for (&ts, price) in data.timestamp.iter().zip(prices) {
        let Some(price) = price else {
            continue;
        };
        let date = DateTime::from_timestamp(ts, 0)
            .map(|dt| dt.date_naive())
            .ok_or_else(|| YahooError::InvalidResponse(format!("Invalid timestamp {}", ts)))?;
        points.push(PricePoint::new(date, price));
    }

    Ok(points)
}
