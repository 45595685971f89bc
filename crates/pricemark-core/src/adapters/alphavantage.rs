use std::sync::Arc;

use serde::Deserialize;
use time::macros::format_description;
use time::Date;
use tracing::debug;

use crate::data_source::{PriceFetcher, QuoteFuture, SourceError};
use crate::http_client::{HttpClient, HttpRequest};
use crate::{ProviderId, Quote, Symbol, UtcDateTime};

const ALPHAVANTAGE_QUERY_URL: &str = "https://www.alphavantage.co/query";

/// Alpha Vantage `GLOBAL_QUOTE` adapter. Requires an API key.
#[derive(Clone)]
pub struct AlphaVantageAdapter {
    http_client: Arc<dyn HttpClient>,
    api_key: String,
    base_url: String,
    timeout_ms: u64,
}

impl AlphaVantageAdapter {
    pub fn new(http_client: Arc<dyn HttpClient>, api_key: impl Into<String>) -> Self {
        Self {
            http_client,
            api_key: api_key.into(),
            base_url: String::from(ALPHAVANTAGE_QUERY_URL),
            timeout_ms: 10_000,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    fn endpoint(&self, symbol: &Symbol) -> String {
        format!(
            "{}?function=GLOBAL_QUOTE&symbol={}&apikey={}",
            self.base_url,
            urlencoding::encode(symbol.as_str()),
            urlencoding::encode(&self.api_key)
        )
    }

    async fn fetch_quote(&self, symbol: &Symbol) -> Result<Quote, SourceError> {
        if self.api_key.trim().is_empty() {
            return Err(SourceError::invalid_request("alphavantage api key is empty"));
        }

        debug!(provider = "alphavantage", symbol = %symbol, "requesting global quote");
        let request = HttpRequest::get(self.endpoint(symbol)).with_timeout_ms(self.timeout_ms);

        let response = self.http_client.execute(request).await.map_err(|e| {
            SourceError::unavailable(format!("alphavantage transport error: {}", e.message()))
        })?;

        if !response.is_success() {
            return Err(SourceError::unavailable(format!(
                "alphavantage returned status {}",
                response.status
            )));
        }

        parse_global_quote(symbol, &response.body)
    }
}

impl PriceFetcher for AlphaVantageAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Alphavantage
    }

    fn quote<'a>(&'a self, symbol: &'a Symbol) -> QuoteFuture<'a> {
        Box::pin(self.fetch_quote(symbol))
    }
}

fn parse_global_quote(symbol: &Symbol, body: &str) -> Result<Quote, SourceError> {
    let response: AlphaVantageQuoteResponse = serde_json::from_str(body).map_err(|e| {
        SourceError::internal(format!("failed to parse alphavantage response: {e}"))
    })?;

    // Throttled keys get HTTP 200 with an explanatory message instead of data.
    if let Some(message) = response.note.or(response.information) {
        return Err(SourceError::rate_limited(format!(
            "alphavantage refused the request: {message}"
        )));
    }
    if let Some(message) = response.error_message {
        return Err(SourceError::invalid_request(format!(
            "alphavantage rejected the request: {message}"
        )));
    }

    let data = response
        .quote
        .filter(|data| data.price.is_some())
        .ok_or_else(|| SourceError::not_found(format!("alphavantage has no quote for '{symbol}'")))?;

    let price = parse_number("05. price", data.price.as_deref())?
        .ok_or_else(|| SourceError::not_found(format!("alphavantage has no price for '{symbol}'")))?;
    let previous_close = parse_number("08. previous close", data.previous_close.as_deref())?;

    let quoted_symbol = data
        .symbol
        .as_deref()
        .and_then(|raw| Symbol::parse(raw).ok())
        .unwrap_or_else(|| symbol.clone());
    let as_of = data
        .latest_trading_day
        .as_deref()
        .and_then(trading_day)
        .unwrap_or_else(UtcDateTime::now);

    Ok(Quote::new(quoted_symbol, price, as_of)?.with_previous_close(previous_close)?)
}

fn parse_number(field: &str, raw: Option<&str>) -> Result<Option<f64>, SourceError> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        None => Ok(None),
        Some(value) => value.parse::<f64>().map(Some).map_err(|_| {
            SourceError::internal(format!("alphavantage field '{field}' is not a number: {value}"))
        }),
    }
}

fn trading_day(raw: &str) -> Option<UtcDateTime> {
    let date = Date::parse(raw.trim(), format_description!("[year]-[month]-[day]")).ok()?;
    UtcDateTime::from_offset_datetime(date.midnight().assume_utc()).ok()
}

#[derive(Debug, Clone, Deserialize)]
struct AlphaVantageQuoteResponse {
    #[serde(rename = "Global Quote", default)]
    quote: Option<AlphaVantageQuoteData>,
    #[serde(rename = "Note", default)]
    note: Option<String>,
    #[serde(rename = "Information", default)]
    information: Option<String>,
    #[serde(rename = "Error Message", default)]
    error_message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct AlphaVantageQuoteData {
    #[serde(rename = "01. symbol", default)]
    symbol: Option<String>,
    #[serde(rename = "05. price", default)]
    price: Option<String>,
    #[serde(rename = "07. latest trading day", default)]
    latest_trading_day: Option<String>,
    #[serde(rename = "08. previous close", default)]
    previous_close: Option<String>,
}
