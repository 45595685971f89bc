//! Subscription cost notes.
//!
//! Notes tagged as subscriptions follow a loose template:
//!
//! ```text
//! # Netflix
//! Preis/Monat: 13,99
//! Kategorie: Streaming
//! ```
//!
//! English keys (`Price/Month:`, `Price/Year:`, `Category:`) work as well.
//! [`parse_subscription`] extracts one [`Subscription`] per note and
//! [`CostSummary`] aggregates them for [`render_cost_report`].

mod report;

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::notes::{Note, NoteStore, NoteStoreError};

pub use report::{render_cost_report, AppCost, CategoryCost, Charge, CostSummary, MonthCharges};

pub const DEFAULT_CATEGORY: &str = "Sonstiges";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingInterval {
    Monthly,
    Yearly,
}

impl BillingInterval {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Monthly => "month",
            Self::Yearly => "year",
        }
    }

    fn to_yearly(self, price: f64) -> f64 {
        match self {
            Self::Monthly => price * 12.0,
            Self::Yearly => price,
        }
    }

    fn from_yearly(self, yearly: f64) -> f64 {
        match self {
            Self::Monthly => yearly / 12.0,
            Self::Yearly => yearly,
        }
    }
}

/// One paid subscription, priced per `interval`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Subscription {
    pub name: String,
    pub price: f64,
    pub interval: BillingInterval,
    pub category: String,
    pub history: Vec<f64>,
}

impl Subscription {
    pub fn monthly_cost(&self) -> f64 {
        match self.interval {
            BillingInterval::Monthly => self.price,
            BillingInterval::Yearly => self.price / 12.0,
        }
    }

    pub fn yearly_cost(&self) -> f64 {
        self.interval.to_yearly(self.price)
    }
}

/// Extracts the subscription described by `note`.
///
/// Fenced code blocks hide headings and categories, but prices inside them
/// still count as extra charges. The first price outside code sets the
/// billing interval; every other price is folded in after converting through
/// a yearly sum. Returns `None` without a name or a positive price.
pub fn parse_subscription(note: &Note) -> Option<Subscription> {
    let mut name: Option<String> = None;
    let mut primary: Option<(f64, BillingInterval)> = None;
    let mut extras: Vec<(f64, BillingInterval)> = Vec::new();
    let mut category = String::from(DEFAULT_CATEGORY);
    let mut history = Vec::new();
    let mut in_code = false;

    for line in note.content.lines() {
        let line = line.trim();
        if line.starts_with("```") {
            in_code = !in_code;
            continue;
        }

        if !in_code && name.is_none() && line.starts_with('#') {
            let heading = line.trim_start_matches('#').trim();
            if !heading.is_empty() {
                name = Some(heading.to_owned());
            }
        }

        if let Some(captures) = price_pattern().captures(line) {
            let interval = if captures[1].to_lowercase().starts_with('m') {
                BillingInterval::Monthly
            } else {
                BillingInterval::Yearly
            };
            let price = leading_number(&captures[2]);
            match price {
                Some(price) if !in_code && primary.map_or(true, |(known, _)| known == 0.0) => {
                    primary = Some((price, interval));
                }
                Some(price) => extras.push((price, interval)),
                None => {}
            }
        }

        if !in_code {
            if let Some(captures) = category_pattern().captures(line) {
                category = captures[1].trim().to_owned();
            }
        }

        if let Some(captures) = history_pattern().captures(line) {
            history = captures[1]
                .split(',')
                .filter_map(|value| leading_number(value.trim()))
                .collect();
        }
    }

    let name = name.unwrap_or_else(|| note.title().replace('#', "").trim().to_owned());
    let (mut price, interval) = primary.unwrap_or((0.0, BillingInterval::Monthly));
    if !extras.is_empty() {
        let yearly = extras
            .iter()
            .fold(interval.to_yearly(price), |sum, (extra, extra_interval)| {
                sum + extra_interval.to_yearly(*extra)
            });
        price = interval.from_yearly(yearly);
    }

    if name.is_empty() || !price.is_finite() || price <= 0.0 {
        debug!(note = %note.id, "note carries no usable subscription");
        return None;
    }

    Some(Subscription {
        name,
        price,
        interval,
        category,
        history,
    })
}

/// Parses every note tagged `tag`, skipping notes without a usable price.
pub fn collect_subscriptions<S>(store: &S, tag: &str) -> Result<Vec<Subscription>, NoteStoreError>
where
    S: NoteStore + ?Sized,
{
    let notes = store.tagged(tag)?;
    debug!(tag, notes = notes.len(), "scanning subscription notes");
    Ok(notes.iter().filter_map(parse_subscription).collect())
}

/// Reads the leading decimal number of `raw`, accepting one `,` as separator.
fn leading_number(raw: &str) -> Option<f64> {
    let normalized = raw.replacen(',', ".", 1);
    let found = number_prefix().find(&normalized)?;
    found.as_str().parse().ok()
}

fn price_pattern() -> &'static Regex {
    static PRICE: OnceLock<Regex> = OnceLock::new();
    PRICE.get_or_init(|| {
        Regex::new(r"(?i)(?:preis|price)\s*/\s*(monat|jahr|month|year)\s*:\s*([0-9,.]+)")
            .expect("price regex is valid")
    })
}

fn category_pattern() -> &'static Regex {
    static CATEGORY: OnceLock<Regex> = OnceLock::new();
    CATEGORY.get_or_init(|| {
        Regex::new(r"(?i)^(?:kategorie|category)\s*:\s*(.+)").expect("category regex is valid")
    })
}

fn history_pattern() -> &'static Regex {
    static HISTORY: OnceLock<Regex> = OnceLock::new();
    HISTORY.get_or_init(|| {
        Regex::new(r"(?i)(?:verlauf|monthly|monatlich|monatliche\s+kosten).*?[:=\s]+(.+)")
            .expect("history regex is valid")
    })
}

fn number_prefix() -> &'static Regex {
    static NUMBER: OnceLock<Regex> = OnceLock::new();
    NUMBER.get_or_init(|| Regex::new(r"^(?:\d+\.?\d*|\.\d+)").expect("number regex is valid"))
}
