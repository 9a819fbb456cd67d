use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use sentix::pipeline::Aggregator;
use sentix::store::SentimentStore;
use sentix_models::{AssetType, SentixConfig, WatchlistEntry};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(
    name = "sentix",
    about = "News sentiment aggregation for a watchlist of market symbols"
)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, default_value = "config/sentix.toml")]
    config: String,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    /// Pretty-print the output JSON
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch, classify and summarize news. Defaults to the whole watchlist.
    Refresh { symbols: Vec<String> },
    /// Print stored summaries without fetching anything
    Summary { symbols: Vec<String> },
    /// Manage the watchlist
    Watch {
        #[command(subcommand)]
        action: WatchCommand,
    },
    /// Article and score counts per symbol
    Status,
}

#[derive(Subcommand, Debug)]
enum WatchCommand {
    Add {
        symbol: String,
        /// stock, forex or crypto
        #[arg(long)]
        asset_type: Option<AssetType>,
    },
    Remove {
        symbol: String,
    },
    List,
    /// Bulk add from a JSON array of {"symbol", "assetType"} objects
    Import {
        file: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    sentix::init_tracing(cli.json_logs);
    dotenvy::dotenv().ok();

    let config: SentixConfig = sentix::load_config(&cli.config)?;

    match cli.command {
        Command::Refresh { symbols } => {
            let pipeline =
                sentix::build_pipeline(&config).context("Failed to build refresh pipeline")?;
            let summaries = sentix::refresh(&pipeline, &symbols).await?;
            print_json(&summaries, cli.pretty)?;
        }
        Command::Summary { symbols } => {
            // Read-only, so no provider credentials are needed.
            let store = sentix::open_store(&config)?;
            let summaries = Aggregator::new(store)
                .summarize_many(Some(symbols.as_slice()))
                .context("Failed to build summaries")?;
            print_json(&summaries, cli.pretty)?;
        }
        Command::Watch { action } => {
            let store = sentix::open_store(&config)?;
            run_watch(&store, action, cli.pretty)?;
        }
        Command::Status => {
            let store = sentix::open_store(&config)?;
            let stats = store.article_stats().context("Failed to read article stats")?;
            let total_scores = store.score_count().context("Failed to count scores")?;
            let symbols: Vec<_> = stats
                .iter()
                .map(|s| {
                    serde_json::json!({
                        "symbol": s.symbol,
                        "articles": s.articles,
                        "scored": s.scored,
                        "unscored": s.unscored,
                    })
                })
                .collect();
            print_json(
                &serde_json::json!({ "symbols": symbols, "totalScores": total_scores }),
                cli.pretty,
            )?;
        }
    }

    Ok(())
}

fn run_watch(store: &SentimentStore, action: WatchCommand, pretty: bool) -> Result<()> {
    match action {
        WatchCommand::Add { symbol, asset_type } => {
            let entry = WatchlistEntry::new(&symbol, asset_type);
            match store.add_symbol(&entry)? {
                Some(added) => print_json(&added, pretty)?,
                None => bail!("{} is already on the watchlist", entry.normalized_symbol()),
            }
        }
        WatchCommand::Remove { symbol } => {
            if !store.remove_symbol(&symbol)? {
                bail!("{} is not on the watchlist", symbol.trim().to_uppercase());
            }
            tracing::info!(symbol = %symbol.trim().to_uppercase(), "Removed from watchlist");
        }
        WatchCommand::List => {
            print_json(&store.list_watchlist()?, pretty)?;
        }
        WatchCommand::Import { file } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read watchlist file: {file}"))?;
            let entries: Vec<WatchlistEntry> = serde_json::from_str(&raw)
                .with_context(|| format!("Failed to parse watchlist file: {file}"))?;
            let result = store.add_symbols(&entries)?;
            tracing::info!(
                added = result.added.len(),
                skipped = result.skipped.len(),
                "Watchlist import complete"
            );
            print_json(&result, pretty)?;
        }
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let output = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{output}");
    Ok(())
}
