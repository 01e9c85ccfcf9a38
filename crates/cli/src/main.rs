use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use feedlens_anonymizer::{AnonymizationMode, Anonymizer};
use feedlens_ingest::IngestConfig;
use feedlens_parser::{FeedParser, RawLineReader};
use feedlens_store::MappingStore;
use serde::Serialize;
use std::path::PathBuf;

mod report;

use report::InspectReport;

#[derive(Parser)]
#[command(name = "feedlens")]
#[command(about = "Schema discovery for semicolon-delimited feed files", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and anonymize a feed file offline, printing a JSON report
    Inspect {
        /// Feed file to analyze
        file: PathBuf,

        /// Anonymization mode
        #[arg(long, value_enum, default_value_t = ModeFlag::Classified)]
        mode: ModeFlag,

        /// Maximum accepted file size in MB (overrides the environment)
        #[arg(long)]
        max_file_size_mb: Option<u64>,
    },
    /// List persisted field mappings
    Mappings {
        /// Path of the mapping store file
        #[arg(long, default_value = "mappings.json")]
        store: PathBuf,

        /// Show only this message type
        #[arg(long)]
        msg_type: Option<String>,

        /// Include archived versions
        #[arg(long)]
        history: bool,
    },
}

#[derive(Copy, Clone, ValueEnum)]
enum ModeFlag {
    Classified,
    Coarse,
}

impl ModeFlag {
    const fn as_domain(self) -> AnonymizationMode {
        match self {
            ModeFlag::Classified => AnonymizationMode::Classified,
            ModeFlag::Coarse => AnonymizationMode::Coarse,
        }
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let level = if quiet {
        log::LevelFilter::Warn
    } else if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp_secs()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Inspect {
            file,
            mode,
            max_file_size_mb,
        } => inspect(&file, mode.as_domain(), max_file_size_mb),
        Commands::Mappings {
            store,
            msg_type,
            history,
        } => mappings(&store, msg_type.as_deref(), history).await,
    }
}

fn inspect(file: &PathBuf, mode: AnonymizationMode, max_file_size_mb: Option<u64>) -> Result<()> {
    let config = IngestConfig::from_env();
    let max_bytes = max_file_size_mb
        .map_or(config.max_file_size_bytes(), |mb| mb * 1024 * 1024);

    let reader = RawLineReader::new(max_bytes);
    let lines = reader
        .read_lines(file)
        .with_context(|| format!("reading {}", file.display()))?;
    let batch = FeedParser::default().group(lines);
    let anonymizer = Anonymizer::new(mode);

    let report = InspectReport::build(file, &batch, &anonymizer);
    print_json(&report)
}

async fn mappings(store_path: &PathBuf, msg_type: Option<&str>, history: bool) -> Result<()> {
    let store = MappingStore::open(store_path)
        .await
        .with_context(|| format!("opening store {}", store_path.display()))?;

    #[derive(Serialize)]
    struct MappingsOutput {
        active: Vec<feedlens_store::FeedMapping>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        history: Vec<feedlens_store::FeedMappingHistory>,
    }

    let active = match msg_type {
        Some(msg_type) => store.find_by_msg_type(msg_type).await.into_iter().collect(),
        None => store.all_active().await,
    };
    let archived = match (history, msg_type) {
        (false, _) => Vec::new(),
        (true, Some(msg_type)) => store.history_for(msg_type).await,
        // The full archive, so versions of since-deleted types stay
        // reachable.
        (true, None) => store.all_history().await,
    };

    print_json(&MappingsOutput {
        active,
        history: archived,
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
