use pricemark_core::{
    annotation, in_range_annotation, NoteId, NoteStore, QuoteRouter, SourceStrategy,
    ThresholdWatch, WorkflowError,
};
use serde_json::json;
use tracing::warn;

use crate::cli::WatchArgs;
use crate::error::CliError;

use super::CommandResult;

pub async fn run(
    args: &WatchArgs,
    router: &QuoteRouter,
    store: &dyn NoteStore,
    strategy: SourceStrategy,
    alert_tag: &str,
) -> Result<CommandResult, CliError> {
    let note_id = NoteId::parse(&args.note)?;
    let watch = ThresholdWatch::new(router, store)
        .with_strategy(strategy)
        .with_alert_tag(alert_tag);

    match watch.run(&note_id).await {
        Ok(outcome) => {
            let mut lines = vec![format!(
                "{}: {:.2} via {}",
                outcome.spec, outcome.quote.price, outcome.selected_source
            )];
            if outcome.events.is_empty() {
                lines.push(in_range_annotation(&outcome.spec, outcome.quote.price));
            } else {
                lines.extend(
                    outcome
                        .events
                        .iter()
                        .map(|event| annotation(outcome.spec.symbol(), event)),
                );
            }
            lines.extend(
                outcome
                    .alert_notes
                    .iter()
                    .map(|created| format!("Created alert note '{}': {}", created.id, created.title)),
            );
            let data = serde_json::to_value(&outcome)?;
            Ok(CommandResult::ok(data, lines.join("\n"))
                .with_source_chain(outcome.source_chain)
                .with_warnings(outcome.warnings)
                .with_latency(outcome.latency_ms))
        }
        Err(WorkflowError::Quote(failure)) => {
            warn!(note = %note_id, "no quote available; note left unchanged");
            let text = format!("No quote source succeeded; note '{note_id}' left unchanged.");
            Ok(CommandResult::ok(json!({ "note": note_id, "events": [] }), text)
                .with_source_chain(failure.source_chain)
                .with_warnings(failure.warnings)
                .with_errors(failure.errors)
                .with_latency(failure.latency_ms))
        }
        Err(error) => Err(error.into()),
    }
}
