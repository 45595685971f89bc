use pricemark_core::{
    collect_subscriptions, render_cost_report, CostSummary, NoteId, NoteStore,
};
use serde_json::json;

use crate::cli::CostsArgs;
use crate::error::CliError;

use super::CommandResult;

pub fn run(
    args: &CostsArgs,
    store: &dyn NoteStore,
    default_tag: &str,
) -> Result<CommandResult, CliError> {
    let tag = args.tag.as_deref().unwrap_or(default_tag);
    let target = args.write_to.as_deref().map(NoteId::parse).transpose()?;

    let subscriptions = collect_subscriptions(store, tag)?;
    let summary = CostSummary::from_subscriptions(&subscriptions);
    let report = render_cost_report(&summary);

    let mut warnings = Vec::new();
    if summary.is_empty() {
        warnings.push(format!("no notes tagged '{tag}' carry a price line"));
    }

    let text = match &target {
        Some(id) => {
            store.replace(id, &report)?;
            format!("Wrote cost report for {} subscriptions to note '{id}'.", summary.apps.len())
        }
        None => report.clone(),
    };
    let data = json!({
        "tag": tag,
        "summary": summary,
        "report": report,
        "written_to": target,
    });

    Ok(CommandResult::ok(data, text).with_warnings(warnings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricemark_core::MemoryNoteStore;

    fn store() -> MemoryNoteStore {
        let store = MemoryNoteStore::new();
        store.insert(
            NoteId::parse("netflix").expect("valid id"),
            "# Netflix\nPreis/Monat: 13,99\nKategorie: Streaming",
            &["abo"],
        );
        store.insert(
            NoteId::parse("report").expect("valid id"),
            "# Old report",
            &[],
        );
        store
    }

    #[test]
    fn prints_report_by_default() {
        let store = store();
        let args = CostsArgs {
            tag: None,
            write_to: None,
        };

        let result = run(&args, &store, "abo").expect("report builds");

        assert!(result.text.contains("[[Netflix]]"));
        assert!(result.warnings.is_empty());
        assert_eq!(result.data["written_to"], serde_json::Value::Null);
    }

    #[test]
    fn write_to_replaces_target_note() {
        let store = store();
        let args = CostsArgs {
            tag: None,
            write_to: Some(String::from("report")),
        };

        let result = run(&args, &store, "abo").expect("report builds");

        let written = store
            .load(&NoteId::parse("report").expect("valid id"))
            .expect("note exists");
        assert!(written.content.contains("[[Netflix]]"));
        assert!(!written.content.contains("Old report"));
        assert!(result.text.starts_with("Wrote cost report for 1 subscriptions"));
    }

    #[test]
    fn unknown_tag_yields_template_hint_and_warning() {
        let store = store();
        let args = CostsArgs {
            tag: Some(String::from("nothing")),
            write_to: None,
        };

        let result = run(&args, &store, "abo").expect("report builds");

        assert!(result.text.contains("No subscription notes found"));
        assert_eq!(result.warnings.len(), 1);
    }
}
