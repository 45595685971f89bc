use serde::{Deserialize, Serialize};

use crate::{PriceSample, Symbol, UtcDateTime, ValidationError};

/// Canonical price snapshot returned by every provider adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: Symbol,
    pub price: f64,
    pub previous_close: Option<f64>,
    pub currency: Option<String>,
    pub market_state: Option<String>,
    pub name: Option<String>,
    pub as_of: UtcDateTime,
}

impl Quote {
    pub fn new(symbol: Symbol, price: f64, as_of: UtcDateTime) -> Result<Self, ValidationError> {
        validate_non_negative("price", price)?;

        Ok(Self {
            symbol,
            price,
            previous_close: None,
            currency: None,
            market_state: None,
            name: None,
            as_of,
        })
    }

    pub fn with_previous_close(mut self, previous_close: Option<f64>) -> Result<Self, ValidationError> {
        if let Some(value) = previous_close {
            validate_non_negative("previous_close", value)?;
        }
        self.previous_close = previous_close;
        Ok(self)
    }

    pub fn with_currency(mut self, currency: Option<String>) -> Self {
        self.currency = non_blank(currency);
        self
    }

    pub fn with_market_state(mut self, market_state: Option<String>) -> Self {
        self.market_state = non_blank(market_state);
        self
    }

    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = non_blank(name);
        self
    }

    /// Absolute move against the previous close.
    pub fn change(&self) -> Option<f64> {
        self.previous_close.map(|close| self.price - close)
    }

    /// Percentage move against the previous close; `None` when the close is zero.
    pub fn change_percent(&self) -> Option<f64> {
        let close = self.previous_close?;
        if close == 0.0 {
            return None;
        }
        Some((self.price - close) / close * 100.0)
    }

    pub fn sample(&self) -> PriceSample {
        PriceSample {
            symbol: self.symbol.as_str().to_owned(),
            price: self.price,
            observed_at: self.as_of,
        }
    }
}

fn validate_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}
