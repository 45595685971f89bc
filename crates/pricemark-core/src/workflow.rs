//! Host workflows: watching a threshold note and appending quote reports.

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::marker::{watch_section, AlertNote, QuoteReport};
use crate::notes::{NoteId, NoteStore, NoteStoreError};
use crate::routing::{QuoteRouter, RouteFailure, SourceStrategy};
use crate::{
    evaluate_sample, parse_threshold_label, range_status, AlertEvent, EvaluationError, ParseError,
    ProviderId, Quote, RangeStatus, Symbol, ThresholdSpec, ValidationError,
};

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("note title is not a threshold label: {0}")]
    Label(#[from] ParseError),
    #[error("label symbol is not usable: {0}")]
    Symbol(ValidationError),
    #[error(transparent)]
    Quote(RouteFailure),
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
    #[error(transparent)]
    Store(#[from] NoteStoreError),
}

/// An alert note written during a watch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedNote {
    pub id: NoteId,
    pub title: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct WatchOutcome {
    pub note: NoteId,
    pub spec: ThresholdSpec,
    pub quote: Quote,
    pub status: RangeStatus,
    pub events: Vec<AlertEvent>,
    pub alert_notes: Vec<CreatedNote>,
    pub selected_source: ProviderId,
    pub source_chain: Vec<ProviderId>,
    pub warnings: Vec<String>,
    pub latency_ms: u64,
}

/// Checks a watched note's symbol against the thresholds in its title.
///
/// One run loads the note, parses its title, fetches one quote, appends the
/// report with its alert or in-range annotation, and creates one tagged
/// alert note per crossed threshold. A title that does not parse stops the
/// run before any network access.
pub struct ThresholdWatch<'a> {
    router: &'a QuoteRouter,
    store: &'a dyn NoteStore,
    strategy: SourceStrategy,
    alert_tag: String,
}

impl<'a> ThresholdWatch<'a> {
    pub fn new(router: &'a QuoteRouter, store: &'a dyn NoteStore) -> Self {
        Self {
            router,
            store,
            strategy: SourceStrategy::Auto,
            alert_tag: String::from(crate::config::DEFAULT_ALERT_TAG),
        }
    }

    pub fn with_strategy(mut self, strategy: SourceStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_alert_tag(mut self, tag: impl Into<String>) -> Self {
        self.alert_tag = tag.into();
        self
    }

    pub async fn run(&self, note_id: &NoteId) -> Result<WatchOutcome, WorkflowError> {
        let note = self.store.load(note_id)?;
        let spec = parse_threshold_label(note.title())?;
        let symbol = Symbol::parse(spec.symbol()).map_err(WorkflowError::Symbol)?;
        debug!(note = %note_id, spec = %spec, "watching threshold note");

        let routed = self
            .router
            .route_quote(&symbol, self.strategy)
            .await
            .map_err(WorkflowError::Quote)?;
        let quote = routed.data;

        let sample = quote.sample();
        let events: Vec<AlertEvent> = evaluate_sample(&spec, &sample)?.collect();
        let status = range_status(&spec, sample.price)?;

        let report = QuoteReport::new(quote.clone(), Some(routed.selected_source));
        self.store
            .append(note_id, &watch_section(&spec, &report, &events))?;

        let mut alert_notes = Vec::with_capacity(events.len());
        for event in &events {
            let alert = AlertNote::new(&spec, event, &quote, note.title(), &self.alert_tag);
            let title = alert.title.clone();
            let id = self.store.create(alert.into_new_note())?;
            alert_notes.push(CreatedNote { id, title });
        }

        info!(
            note = %note_id,
            symbol = %symbol,
            price = quote.price,
            alerts = events.len(),
            source = %routed.selected_source,
            "threshold watch finished"
        );

        Ok(WatchOutcome {
            note: note_id.clone(),
            spec,
            quote,
            status,
            events,
            alert_notes,
            selected_source: routed.selected_source,
            source_chain: routed.source_chain,
            warnings: routed.warnings,
            latency_ms: routed.latency_ms,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportOutcome {
    pub report: QuoteReport,
    pub appended_to: Option<NoteId>,
    pub source_chain: Vec<ProviderId>,
    pub warnings: Vec<String>,
    pub latency_ms: u64,
}

/// Fetches one quote and optionally appends its markdown report to a note.
pub struct QuoteReporter<'a> {
    router: &'a QuoteRouter,
    store: &'a dyn NoteStore,
    strategy: SourceStrategy,
}

impl<'a> QuoteReporter<'a> {
    pub fn new(router: &'a QuoteRouter, store: &'a dyn NoteStore) -> Self {
        Self {
            router,
            store,
            strategy: SourceStrategy::Auto,
        }
    }

    pub fn with_strategy(mut self, strategy: SourceStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub async fn run(
        &self,
        symbol: &str,
        note_id: Option<&NoteId>,
    ) -> Result<ReportOutcome, WorkflowError> {
        let symbol = Symbol::parse(symbol).map_err(WorkflowError::Symbol)?;
        // Fail on a missing note before spending a provider request.
        if let Some(id) = note_id {
            self.store.load(id)?;
        }

        let routed = self
            .router
            .route_quote(&symbol, self.strategy)
            .await
            .map_err(WorkflowError::Quote)?;
        let report = QuoteReport::new(routed.data, Some(routed.selected_source));

        if let Some(id) = note_id {
            self.store.append(id, &report.to_string())?;
            info!(note = %id, symbol = %symbol, "quote report appended");
        }

        Ok(ReportOutcome {
            report,
            appended_to: note_id.cloned(),
            source_chain: routed.source_chain,
            warnings: routed.warnings,
            latency_ms: routed.latency_ms,
        })
    }
}
