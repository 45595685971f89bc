//! Alert evaluation against a [`ThresholdSpec`].
//!
//! Evaluation is a pure function of the spec and a price. Both comparisons are
//! inclusive: a price exactly on a threshold fires that threshold's alert.

use std::iter::FusedIterator;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{ThresholdSpec, UtcDateTime};

/// A resolved price observation handed to the evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSample {
    pub symbol: String,
    pub price: f64,
    pub observed_at: UtcDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    BelowMinimum,
    AboveMaximum,
}

impl AlertKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BelowMinimum => "below_minimum",
            Self::AboveMaximum => "above_maximum",
        }
    }
}

/// A crossed threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    pub kind: AlertKind,
    pub price: f64,
    pub threshold: f64,
}

/// Where a price sits relative to the configured band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeStatus {
    BelowMinimum,
    Within,
    AboveMaximum,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvaluationError {
    #[error("price {price} is not a finite number")]
    InvalidPrice { price: f64 },

    #[error("price sample for '{sample}' cannot be checked against thresholds for '{expected}'")]
    SymbolMismatch { expected: String, sample: String },
}

/// Lazily yields the alerts for one evaluation: minimum check first, then
/// maximum check. At most two items.
#[derive(Debug, Clone)]
pub struct AlertEvents<'a> {
    spec: &'a ThresholdSpec,
    price: f64,
    next_check: Option<AlertKind>,
}

impl Iterator for AlertEvents<'_> {
    type Item = AlertEvent;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(check) = self.next_check {
            let (fired, threshold) = match check {
                AlertKind::BelowMinimum => {
                    self.next_check = Some(AlertKind::AboveMaximum);
                    let threshold = self.spec.min_threshold();
                    (self.price <= threshold, threshold)
                }
                AlertKind::AboveMaximum => {
                    self.next_check = None;
                    let threshold = self.spec.max_threshold();
                    (self.price >= threshold, threshold)
                }
            };

            if fired {
                return Some(AlertEvent {
                    kind: check,
                    price: self.price,
                    threshold,
                });
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.next_check {
            Some(AlertKind::BelowMinimum) => (0, Some(2)),
            Some(AlertKind::AboveMaximum) => (0, Some(1)),
            None => (0, Some(0)),
        }
    }
}

impl FusedIterator for AlertEvents<'_> {}

/// Compares `price` with both thresholds of `spec`.
///
/// Fails only for NaN or infinite prices; the check happens before any event
/// is produced.
pub fn evaluate(spec: &ThresholdSpec, price: f64) -> Result<AlertEvents<'_>, EvaluationError> {
    if !price.is_finite() {
        return Err(EvaluationError::InvalidPrice { price });
    }

    Ok(AlertEvents {
        spec,
        price,
        next_check: Some(AlertKind::BelowMinimum),
    })
}

/// Like [`evaluate`], for an observation that names its symbol. The symbol
/// must match the spec's symbol, ignoring ASCII case.
pub fn evaluate_sample<'a>(
    spec: &'a ThresholdSpec,
    sample: &PriceSample,
) -> Result<AlertEvents<'a>, EvaluationError> {
    if !sample.symbol.trim().eq_ignore_ascii_case(spec.symbol()) {
        return Err(EvaluationError::SymbolMismatch {
            expected: spec.symbol().to_owned(),
            sample: sample.symbol.clone(),
        });
    }
    evaluate(spec, sample.price)
}

pub fn range_status(spec: &ThresholdSpec, price: f64) -> Result<RangeStatus, EvaluationError> {
    if !price.is_finite() {
        return Err(EvaluationError::InvalidPrice { price });
    }

    Ok(if price <= spec.min_threshold() {
        RangeStatus::BelowMinimum
    } else if price >= spec.max_threshold() {
        RangeStatus::AboveMaximum
    } else {
        RangeStatus::Within
    })
}
