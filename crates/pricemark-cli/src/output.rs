use crate::cli::OutputFormat;
use crate::commands::CommandOutput;
use crate::error::CliError;

pub fn render(output: &CommandOutput, format: OutputFormat, pretty: bool) -> Result<(), CliError> {
    println!("{}", format_output(output, format, pretty)?);
    Ok(())
}

fn format_output(
    output: &CommandOutput,
    format: OutputFormat,
    pretty: bool,
) -> Result<String, CliError> {
    match format {
        OutputFormat::Json if pretty => Ok(serde_json::to_string_pretty(&output.envelope)?),
        OutputFormat::Json => Ok(serde_json::to_string(&output.envelope)?),
        OutputFormat::Text => Ok(render_text(output)),
    }
}

fn render_text(output: &CommandOutput) -> String {
    let mut lines = vec![output.text.clone()];
    for warning in &output.envelope.meta.warnings {
        lines.push(format!("⚠️ {warning}"));
    }
    for error in &output.envelope.errors {
        lines.push(format!("❌ {error}"));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use pricemark_core::{ProviderId, RouteError};
    use serde_json::json;

    use super::*;
    use crate::metadata::{Envelope, Metadata};

    fn output() -> CommandOutput {
        let mut meta = Metadata::new(vec![ProviderId::Yahoo], 5);
        meta.push_warning("source fallback succeeded with alphavantage");
        CommandOutput {
            envelope: Envelope {
                meta,
                data: json!({ "price": 148.2 }),
                errors: vec![RouteError {
                    provider: Some(ProviderId::Yahoo),
                    code: String::from("source.unavailable"),
                    message: String::from("yahoo returned status 503"),
                    retryable: true,
                }],
            },
            text: String::from("**Price:** 148.20"),
        }
    }

    #[test]
    fn text_lists_warnings_and_errors_after_body() {
        let text = format_output(&output(), OutputFormat::Text, false).expect("renders");

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "**Price:** 148.20");
        assert_eq!(lines[1], "⚠️ source fallback succeeded with alphavantage");
        assert_eq!(
            lines[2],
            "❌ yahoo: yahoo returned status 503 (source.unavailable)"
        );
    }

    #[test]
    fn compact_json_is_single_line() {
        let text = format_output(&output(), OutputFormat::Json, false).expect("renders");

        assert_eq!(text.lines().count(), 1);
        let value: serde_json::Value = serde_json::from_str(&text).expect("valid json");
        assert_eq!(value["data"]["price"], 148.2);
        assert_eq!(value["errors"][0]["code"], "source.unavailable");
    }

    #[test]
    fn pretty_json_is_indented() {
        let text = format_output(&output(), OutputFormat::Json, true).expect("renders");
        assert!(text.contains("\n  \"meta\""));
    }
}
