mod costs;
mod evaluate;
mod parse;
mod quote;
mod watch;

use pricemark_core::{
    Config, DirectoryNoteStore, ProviderId, QuoteRouter, QuoteRouterBuilder, RouteError,
    SourceStrategy,
};
use serde_json::Value;
use tracing::debug;

use crate::cli::{Cli, Command, SourceSelector};
use crate::error::CliError;
use crate::metadata::{Envelope, Metadata};

pub struct CommandResult {
    pub data: Value,
    pub text: String,
    pub warnings: Vec<String>,
    pub errors: Vec<RouteError>,
    pub latency_ms: u64,
    pub source_chain: Vec<ProviderId>,
}

impl CommandResult {
    pub fn ok(data: Value, text: impl Into<String>) -> Self {
        Self {
            data,
            text: text.into(),
            warnings: Vec::new(),
            errors: Vec::new(),
            latency_ms: 0,
            source_chain: Vec::new(),
        }
    }

    pub fn with_source_chain(mut self, source_chain: Vec<ProviderId>) -> Self {
        self.source_chain = source_chain;
        self
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    pub fn with_errors(mut self, errors: Vec<RouteError>) -> Self {
        self.errors.extend(errors);
        self
    }

    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }
}

/// Finished command: the JSON envelope plus its markdown rendering.
pub struct CommandOutput {
    pub envelope: Envelope,
    pub text: String,
}

pub async fn run(cli: &Cli) -> Result<CommandOutput, CliError> {
    let command_result = match &cli.command {
        Command::Parse(args) => parse::run(args)?,
        Command::Evaluate(args) => evaluate::run(args)?,
        Command::Quote(args) => {
            let config = resolve_config(cli)?;
            let store = DirectoryNoteStore::open(config.notes_dir.clone())?;
            let router = build_router(&config);
            quote::run(args, &router, &store, to_source_strategy(cli.source)).await?
        }
        Command::Watch(args) => {
            let config = resolve_config(cli)?;
            let store = DirectoryNoteStore::open(config.notes_dir.clone())?;
            let router = build_router(&config);
            watch::run(
                args,
                &router,
                &store,
                to_source_strategy(cli.source),
                &config.alert_tag,
            )
            .await?
        }
        Command::Costs(args) => {
            let config = resolve_config(cli)?;
            let store = DirectoryNoteStore::open(config.notes_dir.clone())?;
            costs::run(args, &store, &config.subscription_tag)?
        }
    };

    let CommandResult {
        data,
        text,
        warnings,
        errors,
        latency_ms,
        source_chain,
    } = command_result;

    let mut meta = Metadata::new(source_chain, latency_ms);
    for warning in warnings {
        meta.push_warning(warning);
    }

    Ok(CommandOutput {
        envelope: Envelope { meta, data, errors },
        text,
    })
}

/// Environment configuration with command-line overrides applied on top.
fn resolve_config(cli: &Cli) -> Result<Config, CliError> {
    let mut config = Config::from_env()?;
    if let Some(notes_dir) = &cli.notes_dir {
        config = config.with_notes_dir(notes_dir.clone());
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config = config.with_timeout_ms(timeout_ms)?;
    }
    debug!(
        notes_dir = %config.notes_dir.display(),
        timeout_ms = config.timeout_ms,
        alphavantage = config.alphavantage_api_key.is_some(),
        "configuration resolved"
    );
    Ok(config)
}

fn build_router(config: &Config) -> QuoteRouter {
    QuoteRouterBuilder::from_config(config).build()
}

fn to_source_strategy(source: SourceSelector) -> SourceStrategy {
    match source {
        SourceSelector::Auto => SourceStrategy::Auto,
        SourceSelector::Yahoo => SourceStrategy::Strict(ProviderId::Yahoo),
        SourceSelector::Alphavantage => SourceStrategy::Strict(ProviderId::Alphavantage),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_maps_to_router_strategy() {
        assert_eq!(to_source_strategy(SourceSelector::Auto), SourceStrategy::Auto);
        assert_eq!(
            to_source_strategy(SourceSelector::Alphavantage),
            SourceStrategy::Strict(ProviderId::Alphavantage)
        );
    }

    #[test]
    fn builder_accumulates_route_details() {
        let result = CommandResult::ok(Value::Null, "text")
            .with_source_chain(vec![ProviderId::Yahoo])
            .with_warnings(vec![String::from("slow")])
            .with_latency(42);

        assert_eq!(result.source_chain, vec![ProviderId::Yahoo]);
        assert_eq!(result.warnings, vec!["slow"]);
        assert_eq!(result.latency_ms, 42);
        assert!(result.errors.is_empty());
    }
}
