//! CLI argument definitions for pricemark.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `parse` | Parse a threshold label |
//! | `evaluate` | Evaluate a price against a label |
//! | `quote` | Fetch a quote report, optionally appending it to a note |
//! | `watch` | Run the threshold watch on a note |
//! | `costs` | Build the subscription cost report |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `text` | Output format (text, json) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--source` | `auto` | Source selection strategy |
//! | `--notes-dir` | `./notes` | Directory of markdown notes |
//! | `--timeout-ms` | `10000` | Request timeout in ms |
//! | `-v` | off | Debug logging on stderr |

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Threshold alerts and quote reports for markdown notes.
#[derive(Debug, Parser)]
#[command(
    name = "pricemark",
    author,
    version,
    about = "Threshold alerts and quote reports for markdown notes",
    long_about = "pricemark watches notes titled like 'ADS.DE/min150/max250', fetches the \
current price, and appends a report plus alert markers to the note.\n\
\n\
Use 'pricemark <command> --help' for command-specific help."
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Source selection strategy for quote requests.
    #[arg(long, global = true, value_enum, default_value_t = SourceSelector::Auto)]
    pub source: SourceSelector,

    /// Directory holding one markdown file per note [env: PRICEMARK_NOTES_DIR].
    #[arg(long, global = true)]
    pub notes_dir: Option<PathBuf>,

    /// Request timeout budget in milliseconds.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Log debug events to stderr.
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable markdown.
    Text,
    /// Single JSON envelope.
    Json,
}

/// Source selection strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceSelector {
    /// Yahoo first, Alpha Vantage as fallback when a key is configured.
    Auto,
    /// Use Yahoo Finance only.
    Yahoo,
    /// Use Alpha Vantage only.
    Alphavantage,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// 🏷️ Parse a threshold label such as 'ADS.DE/min150/max250'.
    ///
    /// # Examples
    ///
    ///   pricemark parse 'ADS.DE/min150/max250'
    ///   pricemark parse '# SAP.DE/min120,5/max180,75' --format json
    Parse(ParseArgs),

    /// ⚖️ Evaluate a price against a threshold label without fetching.
    ///
    /// # Examples
    ///
    ///   pricemark evaluate 'ADS.DE/min150/max250' 148.20
    Evaluate(EvaluateArgs),

    /// 💰 Fetch a quote report for one symbol.
    ///
    /// # Examples
    ///
    ///   pricemark quote ADS.DE
    ///   pricemark quote ADS.DE --append-to depot
    Quote(QuoteArgs),

    /// 🔔 Check a watched note against the thresholds in its title.
    ///
    /// Appends a quote report and alert markers to the note and creates one
    /// alert note per crossed threshold.
    ///
    /// # Examples
    ///
    ///   pricemark watch adidas
    Watch(WatchArgs),

    /// 📊 Summarize subscription costs from tagged notes.
    ///
    /// # Examples
    ///
    ///   pricemark costs
    ///   pricemark costs --tag abo --write-to abo-report
    Costs(CostsArgs),
}

#[derive(Debug, Args)]
pub struct ParseArgs {
    /// Label text, usually a note title.
    pub label: String,
}

#[derive(Debug, Args)]
pub struct EvaluateArgs {
    /// Label text, usually a note title.
    pub label: String,

    /// Price to compare against both thresholds.
    #[arg(allow_negative_numbers = true)]
    pub price: f64,
}

#[derive(Debug, Args)]
pub struct QuoteArgs {
    /// Market symbol (e.g., ADS.DE, AAPL, ^GDAXI).
    pub symbol: String,

    /// Append the report to this note id.
    #[arg(long, value_name = "NOTE")]
    pub append_to: Option<String>,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Id of the watched note (file name without '.md').
    pub note: String,
}

#[derive(Debug, Args)]
pub struct CostsArgs {
    /// Tag marking subscription notes.
    #[arg(long)]
    pub tag: Option<String>,

    /// Replace this note's content with the report instead of printing it.
    #[arg(long, value_name = "NOTE")]
    pub write_to: Option<String>,
}
