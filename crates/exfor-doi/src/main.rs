//! EXFOR DOI enrichment - Entry Point
//!
//! `search` queries Crossref for entries without a DOI, `merge` builds the
//! final DOI table, `match-one` inspects a single ad-hoc record.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use exfor_doi::config::Config;
use exfor_doi::diagnostics::{RunLog, TracingSink};
use exfor_doi::models::SourceRecord;
use exfor_doi::pipeline::{BatchDriver, MatchContext, StopSignal, match_record, run_merge};
use exfor_doi::store::{ArtifactStore, FileSource, SourceProvider, records_without_doi};
use exfor_doi::CrossrefClient;

#[derive(Parser, Debug)]
#[command(name = "exfor-doi")]
#[command(about = "Find DOIs for EXFOR entries through the Crossref API")]
#[command(version)]
struct Cli {
    /// Crossref works endpoint
    #[arg(long, env = "CROSSREF_API_URL")]
    base_url: Option<String>,

    /// Contact address sent in the User-Agent
    #[arg(long, env = "CROSSREF_MAILTO")]
    mailto: Option<String>,

    /// Directory for snapshots and exports
    #[arg(long, default_value = "data", env = "EXFOR_DOI_DATA_DIR")]
    data_dir: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Query Crossref for every entry without a DOI
    Search {
        /// EXFOR bibliographic table (.csv or .json)
        #[arg(long)]
        source: PathBuf,

        /// Per-run failure log, truncated on start
        #[arg(long, default_value = "doi_parsing.log")]
        run_log: PathBuf,
    },
    /// Merge accepted matches into the full EXFOR table
    Merge {
        /// EXFOR bibliographic table (.csv or .json)
        #[arg(long)]
        source: PathBuf,
    },
    /// Score Crossref candidates for one record and print them
    MatchOne {
        #[arg(long)]
        title: String,

        /// Author in EXFOR form, e.g. "M.Brischetto"
        #[arg(long)]
        first_author: String,

        #[arg(long)]
        year: Option<String>,

        #[arg(long, default_value = "adhoc")]
        entry_id: String,
    },
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        subscriber.with(tracing_subscriber::fmt::layer().compact()).init();
    }
}

fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = Config::from_env()?;
    if let Some(url) = &cli.base_url {
        config.base_url.clone_from(url);
    }
    if let Some(mailto) = &cli.mailto {
        config = config.with_mailto(mailto);
    }
    Ok(config)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.json_logs);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), command = ?cli.command, "Starting exfor-doi");

    let config = build_config(&cli)?;
    let store = ArtifactStore::new(&cli.data_dir);

    match &cli.command {
        Command::Search { source, run_log } => {
            let records = FileSource::new(source).load_all()?;
            let pending = records_without_doi(&records);
            tracing::info!(total = records.len(), without_doi = pending.len(), "Source table filtered");

            let client = CrossrefClient::new(&config)?;
            let diagnostics = RunLog::create(run_log)?;
            let ctx = MatchContext::new(Arc::new(client), Arc::new(diagnostics), config);

            let stop = StopSignal::new();
            let listener = stop.listen_for_ctrl_c().await;

            let report = BatchDriver::new(&ctx, &store, stop).run(&pending).await?;
            listener.abort();

            println!(
                "processed {} of {} entries: {} most probable, {} accepted, {} failed{}",
                report.processed,
                report.total,
                report.candidates.len(),
                report.accepted.len(),
                report.failed,
                if report.interrupted { " (interrupted)" } else { "" }
            );
        }
        Command::Merge { source } => {
            let table = run_merge(&FileSource::new(source), &store)?;
            println!("wrote {} DOI records to {}", table.len(), store.dir().display());
        }
        Command::MatchOne { title, first_author, year, entry_id } => {
            let mut record = SourceRecord::new(entry_id.as_str())
                .with_title(title.as_str())
                .with_first_author(first_author.as_str());
            record.year.clone_from(year);

            let client = CrossrefClient::new(&config)?;
            let ctx = MatchContext::new(Arc::new(client), Arc::new(TracingSink), config);
            let result = match_record(&ctx, &record).await?;

            let accepted = result.most_probable.as_ref().is_some_and(|m| ctx.acceptance().accepts(m));
            let output = serde_json::json!({
                "candidates": result.candidates,
                "most_probable": result.most_probable,
                "accepted": accepted,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
