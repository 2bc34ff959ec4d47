//! Pipeline orchestrator: fetch → extract → novelty filter → notify → persist.
//!
//! ## Run modes
//!
//! `run()`: one check (cron use):
//!   1. Load the seen-set (a corrupt state file aborts the run)
//!   2. Fetch and extract the overview page; a failed fetch counts as zero listings
//!   3. Record unseen ids, notify the ones in allowed cities
//!   4. Save the seen-set, always, with a fresh `last_check`
//!
//! `dry_run()`: steps 1–3 without sending or saving anything.

pub mod novelty;

use crate::config::AppConfig;
use crate::models::Listing;
use crate::notifier::{notify_all, DeliveryReport, Notifier, NotifyOptions, NtfyNotifier};
use crate::scraper::{Extractor, KlikEnHuurScraper, ListingSource};
use crate::storage::SeenStore;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

use self::novelty::{filter_new, CityFilter};

pub struct Pipeline {
    source: Arc<dyn ListingSource>,
    notifier: Arc<dyn Notifier>,
    extractor: Extractor,
    store: SeenStore,
    cities: CityFilter,
    notify_opts: NotifyOptions,
}

impl Pipeline {
    /// Production wiring: klikenhuur.nl in, ntfy out.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let source = Arc::new(
            KlikEnHuurScraper::new(&config.scraper).context("Failed to build scraper")?,
        );
        let notifier = Arc::new(
            NtfyNotifier::new(&config.notify).context("Failed to build ntfy client")?,
        );
        info!("ntfy endpoint: {}", notifier.endpoint());

        Self::with_parts(config, source, notifier)
    }

    pub fn with_parts(
        config: &AppConfig,
        source: Arc<dyn ListingSource>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let cities = CityFilter::new(config.filter.allowed_cities.iter().cloned());
        if cities.is_restricted() {
            info!("Notifying for: {}", config.filter.allowed_cities.join(", "));
        }

        Ok(Self {
            source,
            notifier,
            extractor: Extractor::new(&config.scraper.base_url)?,
            store: SeenStore::new(config.storage.seen_path.clone()),
            cities,
            notify_opts: NotifyOptions::from(&config.notify),
        })
    }

    pub async fn run(&self) -> Result<RunStats> {
        self.execute(false).await
    }

    pub async fn dry_run(&self) -> Result<RunStats> {
        self.execute(true).await
    }

    /// Fetch + extract only. Fetch failures are returned, not swallowed.
    pub async fn preview(&self) -> Result<Vec<Listing>> {
        let html = self.source.fetch_page().await.context("Overview fetch failed")?;
        self.extractor.extract(&html)
    }

    async fn execute(&self, dry_run: bool) -> Result<RunStats> {
        let mut seen = self.store.load().context("Failed to load seen-set")?;
        let mut stats = RunStats { seen_before: seen.len(), ..RunStats::default() };

        // ── 1. Fetch + extract ───────────────────────────────────────────────
        let listings = match self.source.fetch_page().await {
            Ok(html) => self.extractor.extract(&html)?,
            Err(e) => {
                warn!("Overview fetch failed: {}", e);
                stats.fetch_failed = true;
                Vec::new()
            }
        };
        stats.listings_found = listings.len();

        // ── 2. Novelty + notify ──────────────────────────────────────────────
        if listings.is_empty() {
            info!("No listings found or site unreachable");
        } else {
            info!("{} listings found", listings.len());

            let fresh = filter_new(&listings, &mut seen.seen_ids, &self.cities);
            stats.new_listings = fresh.len();

            if fresh.is_empty() {
                info!("No new listings");
            } else if dry_run {
                info!("{} new listings (dry run, not notifying)", fresh.len());
                for l in &fresh {
                    info!("  {} | EUR {} | {}", l.display_name(), l.price, l.url);
                }
            } else {
                info!("{} NEW LISTINGS", fresh.len());
                let DeliveryReport { sent, failed } =
                    notify_all(self.notifier.as_ref(), &fresh, &self.notify_opts).await;
                stats.notified = sent;
                stats.notify_failed = failed;
            }
        }

        stats.seen_after = seen.len();

        // ── 3. Persist ───────────────────────────────────────────────────────
        if dry_run {
            info!("Dry run: seen-set left untouched at {:?}", self.store.path());
        } else {
            self.store.save(&mut seen).context("Failed to save seen-set")?;
        }

        Ok(stats)
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct RunStats {
    pub listings_found: usize,
    pub new_listings: usize,
    pub notified: usize,
    pub notify_failed: usize,
    pub fetch_failed: bool,
    pub seen_before: usize,
    pub seen_after: usize,
}
