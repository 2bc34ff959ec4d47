pub mod cleaner;
pub mod http_client;
pub mod parsers;

use crate::config::ScraperConfig;
use crate::models::Listing;
use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, info};
use url::Url;

use self::cleaner::panel_to_listing;
use self::http_client::{FetchError, HttpClient};
use self::parsers::parse_listing_panels;

// ── Source trait ──────────────────────────────────────────────────────────────

/// Where the overview markup comes from.
#[async_trait]
pub trait ListingSource: Send + Sync {
    async fn fetch_page(&self) -> Result<String, FetchError>;
}

// ── Extractor ─────────────────────────────────────────────────────────────────

/// Turns overview markup into listings. Panels without a detail-link id are
/// dropped; everything else is kept in document order, duplicates included.
pub struct Extractor {
    origin: Url,
}

impl Extractor {
    pub fn new(base_url: &str) -> Result<Self> {
        let origin = Url::parse(base_url)
            .with_context(|| format!("Invalid base_url {:?}", base_url))?;
        Ok(Self { origin })
    }

    pub fn extract(&self, html: &str) -> Result<Vec<Listing>> {
        let panels = parse_listing_panels(html)?;
        let total = panels.len();

        let listings: Vec<Listing> = panels
            .into_iter()
            .filter_map(|p| panel_to_listing(p, &self.origin))
            .collect();

        debug!("{} panels, {} with a listing id", total, listings.len());
        Ok(listings)
    }
}

// ── klikenhuur.nl ─────────────────────────────────────────────────────────────

pub struct KlikEnHuurScraper {
    client: HttpClient,
    index_url: String,
}

impl KlikEnHuurScraper {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        Ok(Self {
            client: HttpClient::new(config).context("Failed to build HTTP client")?,
            index_url: index_url(config)?,
        })
    }
}

/// Overview URL, e.g. /woning-overzicht?livingUnitType=Appartement&page=1&pagesize=240
pub fn index_url(config: &ScraperConfig) -> Result<String> {
    let mut url = Url::parse(&config.base_url)
        .with_context(|| format!("Invalid base_url {:?}", config.base_url))?
        .join(&config.index_path)
        .with_context(|| format!("Invalid index_path {:?}", config.index_path))?;

    url.query_pairs_mut()
        .append_pair("livingUnitType", &config.unit_type)
        .append_pair("page", &config.page.to_string())
        .append_pair("pagesize", &config.page_size.to_string());

    Ok(url.to_string())
}

#[async_trait]
impl ListingSource for KlikEnHuurScraper {
    async fn fetch_page(&self) -> Result<String, FetchError> {
        info!("Fetching overview ({})", self.index_url);
        self.client.get_text(&self.index_url).await
    }
}
