mod config;
mod models;
mod notifier;
mod pipeline;
mod scraper;
mod storage;
mod utils;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::AppConfig;
use crate::pipeline::Pipeline;
use crate::storage::SeenStore;

#[derive(Parser)]
#[command(name = "klikenhuur-watch", about = "New-listing alerts for klikenhuur.nl via ntfy", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch the overview once, notify new listings, update the seen-set (cron mode)
    Check {
        /// Report what would be sent without notifying or saving state
        #[arg(long)]
        dry_run: bool,
    },

    /// Fetch and print the current listings without touching state
    List {
        /// Print the listings as a JSON array instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show seen-set statistics
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "klikenhuur_watch=info,warn",
        1 => "klikenhuur_watch=debug,info",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::new(filter))
        .init();

    let config = AppConfig::load()?;

    match cli.command.unwrap_or(Command::Check { dry_run: false }) {
        Command::Check { dry_run } => {
            let _t = utils::Timer::start(format!("ntfy topic {}", config.notify.topic));
            let pipeline = Pipeline::new(&config)?;
            let stats = if dry_run { pipeline.dry_run().await? } else { pipeline.run().await? };
            if stats.fetch_failed && !dry_run {
                warn!("Site unreachable this run; only last_check was refreshed");
            }
            info!(
                "Done: {} listings | {} new | {} notified | {} failed | {} ids seen (+{})",
                stats.listings_found, stats.new_listings, stats.notified, stats.notify_failed,
                stats.seen_after, stats.seen_after - stats.seen_before,
            );
        }

        Command::List { json } => {
            let listings = Pipeline::new(&config)?.preview().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&listings)?);
                return Ok(());
            }
            println!("{} listings:", listings.len());
            for l in &listings {
                let room = l.room_type.as_deref().unwrap_or("-");
                println!("  {:<12} {:<40} EUR {:>8}  {:>5} m2  {:<12} {}",
                    l.id, l.display_name(), l.price, l.area, room, l.badges.join(", "));
            }
        }

        Command::Stats => {
            let store = SeenStore::new(config.storage.seen_path.clone());
            let record = store.load().context("Failed to load seen-set")?;
            println!("─────────────────────────────────");
            println!("  klikenhuur-watch seen-set");
            println!("─────────────────────────────────");
            println!("  File       : {}", store.path().display());
            if record.is_empty() {
                println!("  Seen ids   : 0 (nothing recorded yet)");
            } else {
                println!("  Seen ids   : {}", record.len());
            }
            println!("  Last check : {}", utils::fmt_last_check(record.last_check));
            println!("  ntfy topic : {}", config.notify.topic);
            println!("─────────────────────────────────");
        }
    }

    Ok(())
}
