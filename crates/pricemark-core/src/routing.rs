use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, warn};

use crate::adapters::{AlphaVantageAdapter, YahooAdapter};
use crate::config::Config;
use crate::data_source::{PriceFetcher, SourceError};
use crate::http_client::{HttpClient, ReqwestHttpClient, DEFAULT_USER_AGENT};
use crate::{ProviderId, Quote, Symbol};

/// Source selection strategy for routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceStrategy {
    /// Registered sources in order, falling through on any error.
    Auto,
    /// One source, no fallback.
    Strict(ProviderId),
}

impl SourceStrategy {
    fn is_strict(self) -> bool {
        matches!(self, Self::Strict(_))
    }
}

/// One failed attempt inside a routed call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteError {
    pub provider: Option<ProviderId>,
    pub code: String,
    pub message: String,
    pub retryable: bool,
}

impl RouteError {
    fn from_source(provider: ProviderId, error: &SourceError) -> Self {
        Self {
            provider: Some(provider),
            code: error.code().to_owned(),
            message: error.message().to_owned(),
            retryable: error.retryable(),
        }
    }
}

impl Display for RouteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.provider {
            Some(provider) => write!(f, "{provider}: {} ({})", self.message, self.code),
            None => write!(f, "{} ({})", self.message, self.code),
        }
    }
}

/// Successful routed call.
#[derive(Debug, Clone)]
pub struct RouteSuccess<T> {
    pub data: T,
    pub selected_source: ProviderId,
    pub source_chain: Vec<ProviderId>,
    pub warnings: Vec<String>,
    pub errors: Vec<RouteError>,
    pub latency_ms: u64,
}

/// Failed routed call after exhausting candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteFailure {
    pub source_chain: Vec<ProviderId>,
    pub warnings: Vec<String>,
    pub errors: Vec<RouteError>,
    pub latency_ms: u64,
}

impl Display for RouteFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("no quote source succeeded")?;
        for (index, error) in self.errors.iter().enumerate() {
            let separator = if index == 0 { ": " } else { "; " };
            write!(f, "{separator}{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for RouteFailure {}

pub type RouteResult<T> = Result<RouteSuccess<T>, RouteFailure>;

/// Ordered registry of price fetchers with fallback.
#[derive(Clone)]
pub struct QuoteRouter {
    sources: Vec<Arc<dyn PriceFetcher>>,
}

impl QuoteRouter {
    /// Later registrations of an already present provider are ignored.
    pub fn new(sources: Vec<Arc<dyn PriceFetcher>>) -> Self {
        let mut unique: Vec<Arc<dyn PriceFetcher>> = Vec::with_capacity(sources.len());
        for source in sources {
            if unique.iter().all(|known| known.id() != source.id()) {
                unique.push(source);
            }
        }
        Self { sources: unique }
    }

    pub fn registered_sources(&self) -> Vec<ProviderId> {
        self.sources.iter().map(|source| source.id()).collect()
    }

    /// Fetches `symbol`, trying each planned source at most once.
    pub async fn route_quote(&self, symbol: &Symbol, strategy: SourceStrategy) -> RouteResult<Quote> {
        let started = Instant::now();
        let mut source_chain = Vec::new();
        let mut errors = Vec::new();

        for provider in self.plan_sources(strategy) {
            source_chain.push(provider);
            let Some(source) = self.source(provider) else {
                errors.push(RouteError {
                    provider: Some(provider),
                    code: String::from("source.not_registered"),
                    message: format!("source '{provider}' is not configured"),
                    retryable: false,
                });
                break;
            };

            debug!(provider = %provider, symbol = %symbol, "fetching quote");
            match source.quote(symbol).await {
                Ok(quote) => {
                    let mut warnings = Vec::new();
                    if !errors.is_empty() {
                        warnings.push(format!(
                            "source fallback succeeded with '{}' after {} failed attempt(s)",
                            provider.as_str(),
                            errors.len()
                        ));
                    }

                    return Ok(RouteSuccess {
                        data: quote,
                        selected_source: provider,
                        source_chain,
                        warnings,
                        errors,
                        latency_ms: elapsed_ms(started),
                    });
                }
                Err(error) => {
                    warn!(provider = %provider, symbol = %symbol, code = error.code(), "quote source failed: {}", error.message());
                    errors.push(RouteError::from_source(provider, &error));
                    if strategy.is_strict() {
                        break;
                    }
                }
            }
        }

        if errors.is_empty() {
            errors.push(RouteError {
                provider: None,
                code: String::from("source.no_candidate"),
                message: String::from("no quote sources are configured"),
                retryable: false,
            });
        }

        Err(RouteFailure {
            source_chain,
            warnings: vec![format!("all sources failed for symbol '{symbol}'")],
            errors,
            latency_ms: elapsed_ms(started),
        })
    }

    fn plan_sources(&self, strategy: SourceStrategy) -> Vec<ProviderId> {
        match strategy {
            SourceStrategy::Auto => self.registered_sources(),
            SourceStrategy::Strict(provider) => vec![provider],
        }
    }

    fn source(&self, provider: ProviderId) -> Option<&Arc<dyn PriceFetcher>> {
        self.sources.iter().find(|source| source.id() == provider)
    }
}

/// Builds a [`QuoteRouter`] backed by real HTTP adapters.
///
/// Yahoo is always registered first. Alpha Vantage joins the chain only when
/// an API key is available.
pub struct QuoteRouterBuilder {
    http_client: Option<Arc<dyn HttpClient>>,
    alphavantage_api_key: Option<String>,
    user_agent: String,
    timeout_ms: u64,
    enable_yahoo: bool,
    enable_alphavantage: bool,
}

impl Default for QuoteRouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl QuoteRouterBuilder {
    pub fn new() -> Self {
        Self {
            http_client: None,
            alphavantage_api_key: None,
            user_agent: String::from(DEFAULT_USER_AGENT),
            timeout_ms: crate::config::DEFAULT_TIMEOUT_MS,
            enable_yahoo: true,
            enable_alphavantage: true,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            alphavantage_api_key: config.alphavantage_api_key.clone(),
            user_agent: config.user_agent.clone(),
            timeout_ms: config.timeout_ms,
            ..Self::new()
        }
    }

    /// Shares one transport between all adapters; tests pass a canned client.
    pub fn with_http_client(mut self, http_client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(http_client);
        self
    }

    pub fn with_alphavantage_key(mut self, key: impl Into<String>) -> Self {
        self.alphavantage_api_key = Some(key.into());
        self
    }

    pub fn with_yahoo_enabled(mut self, enabled: bool) -> Self {
        self.enable_yahoo = enabled;
        self
    }

    pub fn with_alphavantage_enabled(mut self, enabled: bool) -> Self {
        self.enable_alphavantage = enabled;
        self
    }

    pub fn build(self) -> QuoteRouter {
        let http_client = self
            .http_client
            .unwrap_or_else(|| Arc::new(ReqwestHttpClient::new(&self.user_agent)));
        let mut sources: Vec<Arc<dyn PriceFetcher>> = Vec::new();

        if self.enable_yahoo {
            sources.push(Arc::new(
                YahooAdapter::new(Arc::clone(&http_client))
                    .with_user_agent(self.user_agent.clone())
                    .with_timeout_ms(self.timeout_ms),
            ));
        }

        if self.enable_alphavantage {
            if let Some(key) = self.alphavantage_api_key {
                sources.push(Arc::new(
                    AlphaVantageAdapter::new(Arc::clone(&http_client), key)
                        .with_timeout_ms(self.timeout_ms),
                ));
            }
        }

        QuoteRouter::new(sources)
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
