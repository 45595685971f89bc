//! Threshold labels.
//!
//! A watched note carries its configuration in its title:
//!
//! ```text
//! # ADS.DE/min150/max250
//! ```
//!
//! [`parse_threshold_label`] turns such a label into a [`ThresholdSpec`].
//! The grammar is deliberately rigid: exactly three `/`-separated segments,
//! the second `min<number>` and the third `max<number>`, where the number may
//! use `.` or `,` as decimal separator. Anything else is rejected with a
//! [`ParseError`] that names the failing part.

use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

/// Expected label shape, for hints shown next to a [`ParseError`].
pub const LABEL_SHAPE: &str = "SYMBOL/minX/maxY";

/// Which threshold segment of a label is meant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Bound {
    Min,
    Max,
}

impl Bound {
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Min => "min",
            Self::Max => "max",
        }
    }

    const fn position(self) -> usize {
        match self {
            Self::Min => 2,
            Self::Max => 3,
        }
    }
}

impl Display for Bound {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Reasons a label is not a valid threshold specification.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    #[error("label is empty; expected SYMBOL/minX/maxY")]
    EmptyLabel,

    #[error("symbol segment is empty; expected SYMBOL/minX/maxY")]
    EmptySymbol,

    #[error("label has {segments} '/'-separated segment(s), expected exactly 3 (SYMBOL/minX/maxY)")]
    MalformedLabel { segments: usize },

    #[error(
        "segment {} '{segment}' is not a valid {bound} threshold; expected '{bound}' followed by a positive number such as {bound}150 or {bound}120,5",
        .bound.position()
    )]
    MalformedThreshold { bound: Bound, segment: String },

    #[error("minimum {min} must be strictly less than maximum {max}")]
    InvertedThresholds { min: f64, max: f64 },
}

/// Parsed, validated threshold configuration for one symbol.
///
/// Instances only exist in the valid state: the symbol is non-empty and
/// trimmed, both thresholds are positive and finite, and `min < max`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThresholdSpec {
    symbol: String,
    min_threshold: f64,
    max_threshold: f64,
}

impl ThresholdSpec {
    pub fn new(symbol: &str, min_threshold: f64, max_threshold: f64) -> Result<Self, ParseError> {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(ParseError::EmptySymbol);
        }

        let min_threshold = positive(Bound::Min, min_threshold, || min_threshold.to_string())?;
        let max_threshold = positive(Bound::Max, max_threshold, || max_threshold.to_string())?;
        if min_threshold >= max_threshold {
            return Err(ParseError::InvertedThresholds {
                min: min_threshold,
                max: max_threshold,
            });
        }

        Ok(Self {
            symbol: symbol.to_owned(),
            min_threshold,
            max_threshold,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub const fn min_threshold(&self) -> f64 {
        self.min_threshold
    }

    pub const fn max_threshold(&self) -> f64 {
        self.max_threshold
    }

    pub fn midpoint(&self) -> f64 {
        (self.min_threshold + self.max_threshold) / 2.0
    }
}

impl Display for ThresholdSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/min{}/max{}",
            self.symbol, self.min_threshold, self.max_threshold
        )
    }
}

impl FromStr for ThresholdSpec {
    type Err = ParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        parse_threshold_label(value)
    }
}

/// Parses a note title of the form `SYMBOL/minX/maxY`.
///
/// Leading markdown heading markers (`#`, `##`, ...) and surrounding
/// whitespace are ignored.
pub fn parse_threshold_label(raw: &str) -> Result<ThresholdSpec, ParseError> {
    let normalized = normalize(raw);
    if normalized.is_empty() {
        return Err(ParseError::EmptyLabel);
    }

    let segments: Vec<&str> = normalized.split('/').collect();
    let [symbol, min_segment, max_segment] = segments.as_slice() else {
        return Err(ParseError::MalformedLabel {
            segments: segments.len(),
        });
    };

    let symbol = symbol.trim();
    if symbol.is_empty() {
        return Err(ParseError::EmptySymbol);
    }

    let min = threshold_value(Bound::Min, min_segment)?;
    let max = threshold_value(Bound::Max, max_segment)?;

    ThresholdSpec::new(symbol, min, max)
}

/// Same as [`parse_threshold_label`] for hosts whose title may be absent.
pub fn parse_optional_label(raw: Option<&str>) -> Result<ThresholdSpec, ParseError> {
    parse_threshold_label(raw.unwrap_or_default())
}

fn normalize(raw: &str) -> &str {
    match heading_marker().find(raw) {
        Some(found) => raw[found.end()..].trim(),
        None => raw.trim(),
    }
}

fn threshold_value(bound: Bound, segment: &str) -> Result<f64, ParseError> {
    let malformed = || ParseError::MalformedThreshold {
        bound,
        segment: segment.trim().to_owned(),
    };

    let pattern = match bound {
        Bound::Min => min_pattern(),
        Bound::Max => max_pattern(),
    };
    let captures = pattern.captures(segment.trim()).ok_or_else(malformed)?;
    let number = captures.get(1).ok_or_else(malformed)?.as_str();

    let value: f64 = number.replace(',', ".").parse().map_err(|_| malformed())?;
    positive(bound, value, || segment.trim().to_owned())
}

fn positive(bound: Bound, value: f64, segment: impl FnOnce() -> String) -> Result<f64, ParseError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ParseError::MalformedThreshold {
            bound,
            segment: segment(),
        })
    }
}

fn heading_marker() -> &'static Regex {
    static HEADING: OnceLock<Regex> = OnceLock::new();
    HEADING.get_or_init(|| Regex::new(r"^\s*#+\s*").expect("heading regex is valid"))
}

fn min_pattern() -> &'static Regex {
    static MIN: OnceLock<Regex> = OnceLock::new();
    MIN.get_or_init(|| Regex::new(r"(?i)^min\s*(\d+(?:[.,]\d+)?)$").expect("min regex is valid"))
}

fn max_pattern() -> &'static Regex {
    static MAX: OnceLock<Regex> = OnceLock::new();
    MAX.get_or_init(|| Regex::new(r"(?i)^max\s*(\d+(?:[.,]\d+)?)$").expect("max regex is valid"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_label() {
        let spec = parse_threshold_label("ADS.DE/min150/max250").expect("label should parse");
        assert_eq!(spec.symbol(), "ADS.DE");
        assert_eq!(spec.min_threshold(), 150.0);
        assert_eq!(spec.max_threshold(), 250.0);
    }

    #[test]
    fn strips_heading_markers_and_whitespace() {
        let spec = parse_threshold_label("  ### TSLA / MIN 200 / Max300  ").expect("label should parse");
        assert_eq!(spec.symbol(), "TSLA");
        assert_eq!(spec.min_threshold(), 200.0);
        assert_eq!(spec.max_threshold(), 300.0);
    }

    #[test]
    fn accepts_comma_and_dot_decimals() {
        let spec = parse_threshold_label("SAP.DE/min120,5/max180.75").expect("label should parse");
        assert_eq!(spec.min_threshold(), 120.5);
        assert_eq!(spec.max_threshold(), 180.75);
    }

    #[test]
    fn heading_only_label_is_empty() {
        assert_eq!(parse_threshold_label("##   "), Err(ParseError::EmptyLabel));
        assert_eq!(parse_optional_label(None), Err(ParseError::EmptyLabel));
    }

    #[test]
    fn rejects_extra_segments() {
        let err = parse_threshold_label("ADS.DE/min150/max250/extra").expect_err("must fail");
        assert_eq!(err, ParseError::MalformedLabel { segments: 4 });
    }

    #[test]
    fn rejects_blank_symbol() {
        let err = parse_threshold_label("/min150/max250").expect_err("must fail");
        assert_eq!(err, ParseError::EmptySymbol);
    }

    #[test]
    fn reports_which_threshold_is_malformed() {
        let err = parse_threshold_label("ADS.DE/max150/max250").expect_err("must fail");
        assert_eq!(
            err,
            ParseError::MalformedThreshold {
                bound: Bound::Min,
                segment: String::from("max150"),
            }
        );
        assert!(err.to_string().contains("segment 2"));

        let err = parse_threshold_label("ADS.DE/min150/maximum").expect_err("must fail");
        assert!(matches!(
            err,
            ParseError::MalformedThreshold { bound: Bound::Max, .. }
        ));
    }

    #[test]
    fn rejects_zero_and_trailing_garbage() {
        assert!(matches!(
            parse_threshold_label("ADS.DE/min0/max250"),
            Err(ParseError::MalformedThreshold { bound: Bound::Min, .. })
        ));
        assert!(matches!(
            parse_threshold_label("ADS.DE/min150EUR/max250"),
            Err(ParseError::MalformedThreshold { bound: Bound::Min, .. })
        ));
    }

    #[test]
    fn equal_thresholds_are_inverted() {
        let err = parse_threshold_label("ADS.DE/min200/max200").expect_err("must fail");
        assert_eq!(err, ParseError::InvertedThresholds { min: 200.0, max: 200.0 });
    }

    #[test]
    fn from_str_matches_parser() {
        let spec: ThresholdSpec = "# ADS.DE/min150/max250".parse().expect("label should parse");
        assert_eq!(spec.to_string(), "ADS.DE/min150/max250");
    }

    #[test]
    fn constructor_enforces_invariants() {
        assert!(ThresholdSpec::new("X", f64::NAN, 10.0).is_err());
        assert!(ThresholdSpec::new("X", 1.0, f64::INFINITY).is_err());
        assert_eq!(ThresholdSpec::new(" ", 1.0, 2.0), Err(ParseError::EmptySymbol));
    }
}
