//! Text fragments appended to notes: alert annotations, quote reports and
//! standalone alert notes.

use std::fmt::{Display, Formatter, Write as _};

use serde::Serialize;

use crate::{AlertEvent, AlertKind, NewNote, ProviderId, Quote, ThresholdSpec};

/// One-line annotation for a crossed threshold.
pub fn annotation(symbol: &str, event: &AlertEvent) -> String {
    match event.kind {
        AlertKind::BelowMinimum => format!(
            "🔻 ALERT {symbol}: price {:.2} is at or below the minimum of {:.2}",
            event.price, event.threshold
        ),
        AlertKind::AboveMaximum => format!(
            "🔺 ALERT {symbol}: price {:.2} is at or above the maximum of {:.2}",
            event.price, event.threshold
        ),
    }
}

/// Status line for a price strictly inside the band.
pub fn in_range_annotation(spec: &ThresholdSpec, price: f64) -> String {
    format!(
        "✅ {}: price {:.2} is within the normal range {:.2} to {:.2}",
        spec.symbol(),
        price,
        spec.min_threshold(),
        spec.max_threshold()
    )
}

/// Markdown quote block appended to a note.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteReport {
    pub quote: Quote,
    pub source: Option<ProviderId>,
}

impl QuoteReport {
    pub fn new(quote: Quote, source: Option<ProviderId>) -> Self {
        Self { quote, source }
    }

    fn trend_marker(&self) -> &'static str {
        match self.quote.change() {
            Some(change) if change < 0.0 => "📉",
            _ => "📈",
        }
    }

    fn money(&self, value: f64) -> String {
        match &self.quote.currency {
            Some(currency) => format!("{value:.2} {currency}"),
            None => format!("{value:.2}"),
        }
    }

    fn signed_money(&self, value: f64) -> String {
        let sign = if value >= 0.0 { "+" } else { "" };
        format!("{sign}{}", self.money(value))
    }
}

impl Display for QuoteReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let quote = &self.quote;
        writeln!(f)?;
        writeln!(f, "## {} {} quote", self.trend_marker(), quote.symbol)?;
        writeln!(f, "**Timestamp:** {}", quote.as_of.format_report())?;
        writeln!(f, "**Current price:** {}", self.money(quote.price))?;

        if let Some(close) = quote.previous_close {
            writeln!(f, "**Previous close:** {}", self.money(close))?;
        }
        if let Some(change) = quote.change() {
            write!(f, "**Change:** {}", self.signed_money(change))?;
            if let Some(percent) = quote.change_percent() {
                let sign = if percent >= 0.0 { "+" } else { "" };
                write!(f, " ({sign}{percent:.2}%)")?;
            }
            writeln!(f)?;
        }
        if let Some(state) = &quote.market_state {
            writeln!(f, "**Market state:** {state}")?;
        }
        writeln!(f, "**Symbol:** {}", quote.symbol)?;
        if let Some(name) = &quote.name {
            writeln!(f, "**Name:** {name}")?;
        }
        if let Some(source) = self.source {
            writeln!(f, "**Source:** {source}")?;
        }
        Ok(())
    }
}

/// A separate note announcing one crossed threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlertNote {
    pub title: String,
    pub body: String,
    pub tags: Vec<String>,
}

impl AlertNote {
    pub fn new(
        spec: &ThresholdSpec,
        event: &AlertEvent,
        quote: &Quote,
        watch_title: &str,
        tag: &str,
    ) -> Self {
        let direction = match event.kind {
            AlertKind::BelowMinimum => "below",
            AlertKind::AboveMaximum => "above",
        };
        let title = format!(
            "ALERT {} {direction} {:.2}",
            spec.symbol(),
            event.threshold
        );

        let mut body = annotation(spec.symbol(), event);
        body.push_str("\n\n");
        let _ = writeln!(body, "**Observed:** {}", quote.as_of.format_report());
        let _ = writeln!(body, "**Watch note:** [[{}]]", watch_title.trim_start_matches('#').trim());

        Self {
            title,
            body,
            tags: vec![tag.to_owned()],
        }
    }

    pub fn into_new_note(self) -> NewNote {
        NewNote {
            content: format!("# {}\n\n{}", self.title, self.body),
            tags: self.tags,
        }
    }
}

/// Section appended to a watched note after one evaluation.
pub fn watch_section(spec: &ThresholdSpec, report: &QuoteReport, events: &[AlertEvent]) -> String {
    let mut section = report.to_string();
    section.push('\n');
    if events.is_empty() {
        section.push_str(&in_range_annotation(spec, report.quote.price));
        section.push('\n');
    } else {
        for event in events {
            section.push_str(&annotation(spec.symbol(), event));
            section.push('\n');
        }
    }
    section
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Symbol, UtcDateTime};

    fn quote(price: f64, previous_close: Option<f64>) -> Quote {
        Quote::new(
            Symbol::parse("ADS.DE").expect("valid symbol"),
            price,
            UtcDateTime::parse("2024-03-01T09:30:00Z").expect("valid timestamp"),
        )
        .expect("valid quote")
        .with_previous_close(previous_close)
        .expect("valid close")
        .with_currency(Some(String::from("EUR")))
    }

    fn spec() -> ThresholdSpec {
        ThresholdSpec::new("ADS.DE", 150.0, 250.0).expect("valid spec")
    }

    #[test]
    fn annotations_name_kind_threshold_and_price() {
        let below = AlertEvent {
            kind: AlertKind::BelowMinimum,
            price: 148.2,
            threshold: 150.0,
        };
        assert_eq!(
            annotation("ADS.DE", &below),
            "🔻 ALERT ADS.DE: price 148.20 is at or below the minimum of 150.00"
        );

        let above = AlertEvent {
            kind: AlertKind::AboveMaximum,
            price: 251.0,
            threshold: 250.0,
        };
        assert!(annotation("ADS.DE", &above).contains("at or above the maximum of 250.00"));
    }

    #[test]
    fn report_shows_signed_change_and_trend() {
        let report = QuoteReport::new(quote(190.0, Some(200.0)), Some(ProviderId::Yahoo));
        let text = report.to_string();
        assert!(text.contains("## 📉 ADS.DE quote"));
        assert!(text.contains("**Timestamp:** 01.03.2024, 09:30:00 UTC"));
        assert!(text.contains("**Current price:** 190.00 EUR"));
        assert!(text.contains("**Change:** -10.00 EUR (-5.00%)"));
        assert!(text.contains("**Source:** yahoo"));

        let rising = QuoteReport::new(quote(210.0, Some(200.0)), None).to_string();
        assert!(rising.contains("📈"));
        assert!(rising.contains("**Change:** +10.00 EUR (+5.00%)"));
        assert!(!rising.contains("**Source:**"));
    }

    #[test]
    fn report_omits_missing_fields() {
        let text = QuoteReport::new(quote(210.0, None), None).to_string();
        assert!(!text.contains("Previous close"));
        assert!(!text.contains("Change"));
        assert!(!text.contains("Name"));
    }

    #[test]
    fn alert_note_links_back_to_watch_note() {
        let event = AlertEvent {
            kind: AlertKind::AboveMaximum,
            price: 260.0,
            threshold: 250.0,
        };
        let note = AlertNote::new(&spec(), &event, &quote(260.0, None), "# ADS.DE/min150/max250", "alert");
        assert_eq!(note.title, "ALERT ADS.DE above 250.00");
        assert!(note.body.contains("[[ADS.DE/min150/max250]]"));
        assert_eq!(note.tags, vec![String::from("alert")]);

        let new_note = note.into_new_note();
        assert!(new_note.content.starts_with("# ALERT ADS.DE above 250.00\n\n🔺"));
    }

    #[test]
    fn watch_section_reports_normal_range_without_events() {
        let report = QuoteReport::new(quote(200.0, Some(199.0)), None);
        let section = watch_section(&spec(), &report, &[]);
        assert!(section.ends_with("✅ ADS.DE: price 200.00 is within the normal range 150.00 to 250.00\n"));
    }
}
