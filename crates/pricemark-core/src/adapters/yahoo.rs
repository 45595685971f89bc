use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use crate::data_source::{PriceFetcher, QuoteFuture, SourceError};
use crate::http_client::{HttpClient, HttpRequest, DEFAULT_USER_AGENT};
use crate::{ProviderId, Quote, Symbol, UtcDateTime};

const YAHOO_CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Yahoo Finance chart endpoint adapter. No API key required.
#[derive(Clone)]
pub struct YahooAdapter {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    user_agent: String,
    timeout_ms: u64,
}

impl YahooAdapter {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            base_url: String::from(YAHOO_CHART_URL),
            user_agent: String::from(DEFAULT_USER_AGENT),
            timeout_ms: 10_000,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    fn chart_url(&self, symbol: &Symbol) -> String {
        format!(
            "{}/{}",
            self.base_url,
            urlencoding::encode(symbol.as_str())
        )
    }

    async fn fetch_quote(&self, symbol: &Symbol) -> Result<Quote, SourceError> {
        let request = HttpRequest::get(self.chart_url(symbol))
            .with_header("user-agent", self.user_agent.as_str())
            .with_timeout_ms(self.timeout_ms);
        debug!(provider = "yahoo", url = %request.url, "requesting chart");

        let response = self.http_client.execute(request).await.map_err(|e| {
            if e.retryable() {
                SourceError::unavailable(format!("yahoo transport error: {}", e.message()))
            } else {
                SourceError::internal(format!("yahoo transport error: {}", e.message()))
            }
        })?;

        if !response.is_success() {
            // Unknown symbols come back as 404 with a chart.error body.
            if let Ok(parsed) = serde_json::from_str::<YahooChartResponse>(&response.body) {
                if let Some(error) = parsed.chart.error {
                    return Err(chart_error(symbol, error));
                }
            }
            return Err(match response.status {
                404 => SourceError::not_found(format!("yahoo has no chart for '{symbol}'")),
                429 => SourceError::rate_limited("yahoo returned status 429"),
                status => SourceError::unavailable(format!("yahoo returned status {status}")),
            });
        }

        parse_chart_response(symbol, &response.body)
    }
}

impl PriceFetcher for YahooAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Yahoo
    }

    fn quote<'a>(&'a self, symbol: &'a Symbol) -> QuoteFuture<'a> {
        Box::pin(self.fetch_quote(symbol))
    }
}

/// Validates a chart payload once and converts it into a [`Quote`].
fn parse_chart_response(symbol: &Symbol, body: &str) -> Result<Quote, SourceError> {
    let response: YahooChartResponse = serde_json::from_str(body)
        .map_err(|e| SourceError::internal(format!("failed to parse yahoo chart: {e}")))?;

    if let Some(error) = response.chart.error {
        return Err(chart_error(symbol, error));
    }

    let result = response
        .chart
        .result
        .unwrap_or_default()
        .into_iter()
        .next()
        .ok_or_else(|| SourceError::not_found(format!("yahoo chart for '{symbol}' is empty")))?;

    let meta = result.meta;
    let price = meta
        .regular_market_price
        .filter(|price| price.is_finite())
        .or_else(|| result.indicators.and_then(|indicators| indicators.last_close()))
        .ok_or_else(|| SourceError::unavailable(format!("yahoo chart for '{symbol}' has no price")))?;

    let quoted_symbol = meta
        .symbol
        .as_deref()
        .and_then(|raw| Symbol::parse(raw).ok())
        .unwrap_or_else(|| symbol.clone());
    let as_of = match meta.regular_market_time {
        Some(seconds) => UtcDateTime::from_unix_timestamp(seconds)?,
        None => UtcDateTime::now(),
    };

    let quote = Quote::new(quoted_symbol, price, as_of)?
        .with_previous_close(meta.previous_close.or(meta.chart_previous_close))?
        .with_currency(meta.currency)
        .with_market_state(meta.market_state)
        .with_name(meta.long_name.or(meta.short_name));
    Ok(quote)
}

fn chart_error(symbol: &Symbol, error: YahooChartError) -> SourceError {
    let description = error.description.unwrap_or_else(|| error.code.clone());
    if error.code.eq_ignore_ascii_case("not found") {
        SourceError::not_found(format!("yahoo does not know '{symbol}': {description}"))
    } else {
        SourceError::unavailable(format!("yahoo chart API error: {description}"))
    }
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartResponse {
    chart: YahooChart,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChart {
    #[serde(default)]
    result: Option<Vec<YahooChartResult>>,
    #[serde(default)]
    error: Option<YahooChartError>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartError {
    code: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartResult {
    meta: YahooChartMeta,
    #[serde(default)]
    indicators: Option<YahooChartIndicators>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooChartMeta {
    #[serde(default)]
    symbol: Option<String>,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    regular_market_price: Option<f64>,
    #[serde(default)]
    previous_close: Option<f64>,
    #[serde(default)]
    chart_previous_close: Option<f64>,
    #[serde(default)]
    regular_market_time: Option<i64>,
    #[serde(default)]
    market_state: Option<String>,
    #[serde(default)]
    long_name: Option<String>,
    #[serde(default)]
    short_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartIndicators {
    #[serde(default)]
    quote: Vec<YahooChartQuote>,
}

impl YahooChartIndicators {
    fn last_close(&self) -> Option<f64> {
        self.quote
            .first()?
            .close
            .iter()
            .rev()
            .flatten()
            .copied()
            .find(|close| close.is_finite())
    }
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::SourceErrorKind;
    use crate::http_client::{HttpError, HttpResponse};
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Mutex;

    const CHART_BODY: &str = r#"{
        "chart": {
            "result": [{
                "meta": {
                    "symbol": "ADS.DE",
                    "currency": "EUR",
                    "regularMarketPrice": 212.4,
                    "previousClose": 208.0,
                    "regularMarketTime": 1709285400,
                    "marketState": "REGULAR",
                    "longName": "adidas AG"
                },
                "indicators": { "quote": [{ "close": [207.5, 212.4] }] }
            }],
            "error": null
        }
    }"#;

    #[derive(Debug)]
    struct RecordingHttpClient {
        response: Result<HttpResponse, HttpError>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl RecordingHttpClient {
        fn returning(status: u16, body: &str) -> Self {
            Self {
                response: Ok(HttpResponse {
                    status,
                    body: body.to_owned(),
                }),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                response: Err(HttpError::new("upstream timeout")),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn recorded_requests(&self) -> Vec<HttpRequest> {
            self.requests
                .lock()
                .expect("request store should not be poisoned")
                .clone()
        }
    }

    impl HttpClient for RecordingHttpClient {
        fn execute<'a>(
            &'a self,
            request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
            self.requests
                .lock()
                .expect("request store should not be poisoned")
                .push(request);
            let response = self.response.clone();
            Box::pin(async move { response })
        }
    }

    fn symbol(raw: &str) -> Symbol {
        Symbol::parse(raw).expect("valid symbol")
    }

    #[tokio::test]
    async fn parses_chart_meta_into_quote() {
        let client = Arc::new(RecordingHttpClient::returning(200, CHART_BODY));
        let adapter = YahooAdapter::new(client.clone());

        let quote = adapter.quote(&symbol("ADS.DE")).await.expect("quote should parse");
        assert_eq!(quote.price, 212.4);
        assert_eq!(quote.previous_close, Some(208.0));
        assert_eq!(quote.currency.as_deref(), Some("EUR"));
        assert_eq!(quote.name.as_deref(), Some("adidas AG"));
        assert_eq!(quote.as_of.format_rfc3339(), "2024-03-01T09:30:00Z");

        let requests = client.recorded_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].url,
            "https://query1.finance.yahoo.com/v8/finance/chart/ADS.DE"
        );
        assert_eq!(
            requests[0].headers.get("user-agent").map(String::as_str),
            Some(DEFAULT_USER_AGENT)
        );
    }

    #[tokio::test]
    async fn falls_back_to_last_close_when_market_price_missing() {
        let body = r#"{"chart":{"result":[{"meta":{"symbol":"SAP.DE","chartPreviousClose":170.0},
            "indicators":{"quote":[{"close":[171.0, 173.5, null]}]}}],"error":null}}"#;
        let adapter = YahooAdapter::new(Arc::new(RecordingHttpClient::returning(200, body)));

        let quote = adapter.quote(&symbol("SAP.DE")).await.expect("quote should parse");
        assert_eq!(quote.price, 173.5);
        assert_eq!(quote.previous_close, Some(170.0));
    }

    #[tokio::test]
    async fn unknown_symbol_maps_to_not_found() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        let adapter = YahooAdapter::new(Arc::new(RecordingHttpClient::returning(404, body)));

        let error = adapter.quote(&symbol("NOPE")).await.expect_err("must fail");
        assert_eq!(error.kind(), SourceErrorKind::NotFound);
        assert!(error.message().contains("delisted"));
    }

    #[tokio::test]
    async fn transport_failure_is_retryable_unavailable() {
        let adapter = YahooAdapter::new(Arc::new(RecordingHttpClient::failing()));

        let error = adapter.quote(&symbol("ADS.DE")).await.expect_err("must fail");
        assert_eq!(error.kind(), SourceErrorKind::Unavailable);
        assert!(error.retryable());
    }

    #[tokio::test]
    async fn too_many_requests_is_rate_limited() {
        let adapter = YahooAdapter::new(Arc::new(RecordingHttpClient::returning(429, "Too Many Requests")));

        let error = adapter.quote(&symbol("ADS.DE")).await.expect_err("must fail");
        assert_eq!(error.kind(), SourceErrorKind::RateLimited);
    }

    #[tokio::test]
    async fn symbol_is_url_encoded() {
        let client = Arc::new(RecordingHttpClient::returning(200, CHART_BODY));
        let adapter = YahooAdapter::new(client.clone()).with_base_url("http://localhost:9/chart/");

        let _ = adapter.quote(&symbol("^GDAXI")).await;
        assert_eq!(client.recorded_requests()[0].url, "http://localhost:9/chart/%5EGDAXI");
    }
}
