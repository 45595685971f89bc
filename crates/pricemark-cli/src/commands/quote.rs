use pricemark_core::{
    NoteId, NoteStore, QuoteReporter, QuoteRouter, SourceStrategy, WorkflowError,
};
use serde_json::json;

use crate::cli::QuoteArgs;
use crate::error::CliError;

use super::CommandResult;

pub async fn run(
    args: &QuoteArgs,
    router: &QuoteRouter,
    store: &dyn NoteStore,
    strategy: SourceStrategy,
) -> Result<CommandResult, CliError> {
    let note_id = args.append_to.as_deref().map(NoteId::parse).transpose()?;
    let reporter = QuoteReporter::new(router, store).with_strategy(strategy);

    match reporter.run(&args.symbol, note_id.as_ref()).await {
        Ok(outcome) => {
            let text = match &outcome.appended_to {
                Some(id) => format!("{}\nAppended to note '{id}'.", outcome.report),
                None => outcome.report.to_string(),
            };
            let data = serde_json::to_value(&outcome)?;
            Ok(CommandResult::ok(data, text)
                .with_source_chain(outcome.source_chain)
                .with_warnings(outcome.warnings)
                .with_latency(outcome.latency_ms))
        }
        Err(WorkflowError::Quote(failure)) => {
            let text = format!("No quote source succeeded for {}.", args.symbol.trim());
            Ok(CommandResult::ok(json!({ "report": null }), text)
                .with_source_chain(failure.source_chain)
                .with_warnings(failure.warnings)
                .with_errors(failure.errors)
                .with_latency(failure.latency_ms))
        }
        Err(error) => Err(error.into()),
    }
}
