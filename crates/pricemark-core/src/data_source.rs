//! Price fetching capability and its error type.
//!
//! Every provider adapter implements [`PriceFetcher`]. Workflows only see the
//! trait, so tests swap in canned fetchers without any network.

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use crate::{ProviderId, Quote, Symbol, ValidationError};

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    Unavailable,
    RateLimited,
    InvalidRequest,
    NotFound,
    Internal,
}

/// Structured source error used by router fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
}

impl SourceError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::RateLimited,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidRequest,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::NotFound,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Internal,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::RateLimited => "source.rate_limited",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
            SourceErrorKind::NotFound => "source.not_found",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

impl From<ValidationError> for SourceError {
    fn from(error: ValidationError) -> Self {
        Self::internal(format!("provider returned an invalid quote: {error}"))
    }
}

pub type QuoteFuture<'a> = Pin<Box<dyn Future<Output = Result<Quote, SourceError>> + Send + 'a>>;

/// Quote provider contract.
///
/// Implementations must be `Send + Sync`; the router shares them behind `Arc`.
pub trait PriceFetcher: Send + Sync {
    fn id(&self) -> ProviderId;

    /// Fetches the latest price snapshot for `symbol`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the provider is unreachable, rate limited,
    /// does not know the symbol, or answers with a payload that fails
    /// validation.
    fn quote<'a>(&'a self, symbol: &'a Symbol) -> QuoteFuture<'a>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_follow_kind() {
        assert_eq!(SourceError::rate_limited("slow down").code(), "source.rate_limited");
        assert_eq!(SourceError::not_found("unknown").code(), "source.not_found");
    }

    #[test]
    fn only_transient_errors_are_retryable() {
        assert!(SourceError::unavailable("down").retryable());
        assert!(SourceError::rate_limited("slow down").retryable());
        assert!(!SourceError::not_found("unknown").retryable());
        assert!(!SourceError::internal("bug").retryable());
    }

    #[test]
    fn display_includes_code() {
        let error = SourceError::unavailable("yahoo returned status 503");
        assert_eq!(error.to_string(), "yahoo returned status 503 (source.unavailable)");
    }
}
