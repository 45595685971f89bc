//! # Pricemark Core
//!
//! Threshold labels, price alerts and note workflows for stock-quote note
//! automation.
//!
//! ## Overview
//!
//! A watched note carries its configuration in its title, e.g.
//! `# ADS.DE/min150/max250`. This crate provides:
//!
//! - **Label parsing** into a validated [`ThresholdSpec`]
//! - **Alert evaluation** of a price against both thresholds
//! - **Markers and reports** appended to notes
//! - **Quote sources** (Yahoo chart, Alpha Vantage) behind one fetch trait
//! - **Routing** with ordered fallback between sources
//! - **Note storage** and the host workflows built on it
//! - **Subscription cost reports** scanned from tagged notes
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`threshold`] | Label grammar and `ThresholdSpec` |
//! | [`alert`] | Inclusive threshold evaluation |
//! | [`marker`] | Annotations, quote reports, alert notes |
//! | [`domain`] | Symbol, Quote, UtcDateTime |
//! | [`adapters`] | Yahoo and Alpha Vantage adapters |
//! | [`data_source`] | `PriceFetcher` trait and `SourceError` |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`routing`] | Source routing and fallback |
//! | [`notes`] | `NoteStore` trait and stores |
//! | [`workflow`] | Threshold watch and quote report workflows |
//! | [`subscriptions`] | Subscription cost scan and report |
//! | [`config`] | Environment configuration |
//!
//! ## Quick Start
//!
//! ```rust
//! use pricemark_core::{evaluate, parse_threshold_label, AlertKind};
//!
//! let spec = parse_threshold_label("# ADS.DE/min150/max250").unwrap();
//! let events: Vec<_> = evaluate(&spec, 148.0).unwrap().collect();
//! assert_eq!(events.len(), 1);
//! assert_eq!(events[0].kind, AlertKind::BelowMinimum);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  CLI / Host     │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │  Workflows      │────▶│ NoteStore        │
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Quote Router    │────▶│ PriceFetcher     │
//! └─────────────────┘     │ (Yahoo, AV)      │
//!                         └──────────────────┘
//! ```

pub mod adapters;
pub mod alert;
pub mod config;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod marker;
pub mod notes;
pub mod routing;
pub mod source;
pub mod subscriptions;
pub mod threshold;
pub mod workflow;

// Re-export commonly used types at crate root for convenience

pub use adapters::{AlphaVantageAdapter, YahooAdapter};
pub use alert::{
    evaluate, evaluate_sample, range_status, AlertEvent, AlertEvents, AlertKind, EvaluationError,
    PriceSample, RangeStatus,
};
pub use config::Config;
pub use data_source::{PriceFetcher, QuoteFuture, SourceError, SourceErrorKind};
pub use domain::{Quote, Symbol, UtcDateTime};
pub use error::{ConfigError, ValidationError};
pub use http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};
pub use marker::{annotation, in_range_annotation, watch_section, AlertNote, QuoteReport};
pub use notes::{
    DirectoryNoteStore, MemoryNoteStore, NewNote, Note, NoteId, NoteStore, NoteStoreError,
};
pub use routing::{
    QuoteRouter, QuoteRouterBuilder, RouteError, RouteFailure, RouteResult, RouteSuccess,
    SourceStrategy,
};
pub use source::ProviderId;
pub use subscriptions::{
    collect_subscriptions, parse_subscription, render_cost_report, BillingInterval, CostSummary,
    Subscription,
};
pub use threshold::{
    parse_optional_label, parse_threshold_label, Bound, ParseError, ThresholdSpec, LABEL_SHAPE,
};
pub use workflow::{
    CreatedNote, QuoteReporter, ReportOutcome, ThresholdWatch, WatchOutcome, WorkflowError,
};
