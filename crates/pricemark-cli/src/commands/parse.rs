use pricemark_core::parse_threshold_label;
use serde_json::json;

use crate::cli::ParseArgs;
use crate::error::CliError;

use super::CommandResult;

pub fn run(args: &ParseArgs) -> Result<CommandResult, CliError> {
    let spec = parse_threshold_label(&args.label)?;
    let text = format!(
        "**Symbol:** {}\n**Minimum:** {:.2}\n**Maximum:** {:.2}\n**Midpoint:** {:.2}",
        spec.symbol(),
        spec.min_threshold(),
        spec.max_threshold(),
        spec.midpoint()
    );
    let data = json!({ "spec": spec, "label": spec.to_string() });

    Ok(CommandResult::ok(data, text))
}
