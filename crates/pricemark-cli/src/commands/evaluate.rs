use pricemark_core::{
    annotation, evaluate, in_range_annotation, parse_threshold_label, range_status, AlertEvent,
};
use serde_json::json;

use crate::cli::EvaluateArgs;
use crate::error::CliError;

use super::CommandResult;

pub fn run(args: &EvaluateArgs) -> Result<CommandResult, CliError> {
    let spec = parse_threshold_label(&args.label)?;
    let events: Vec<AlertEvent> = evaluate(&spec, args.price)?.collect();
    let status = range_status(&spec, args.price)?;

    let text = if events.is_empty() {
        in_range_annotation(&spec, args.price)
    } else {
        events
            .iter()
            .map(|event| annotation(spec.symbol(), event))
            .collect::<Vec<_>>()
            .join("\n")
    };
    let data = json!({
        "spec": spec,
        "price": args.price,
        "status": status,
        "events": events,
    });

    Ok(CommandResult::ok(data, text))
}
