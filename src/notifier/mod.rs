//! Push notifications through ntfy.
//!
//! One POST per listing to `<server>/<topic>`: the body is plain UTF-8 text,
//! title / click-through URL / tags travel as headers.

use crate::config::NotifyConfig;
use crate::models::Listing;
use async_trait::async_trait;
use reqwest::header::HeaderValue;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("request timed out")]
    Timeout,

    #[error("ntfy answered HTTP {0}")]
    Status(u16),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid header value for {0}")]
    Header(&'static str),

    #[error("invalid client setup: {0}")]
    Setup(String),
}

impl From<reqwest::Error> for NotifyError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            NotifyError::Timeout
        } else if let Some(status) = e.status() {
            NotifyError::Status(status.as_u16())
        } else {
            NotifyError::Transport(e.to_string())
        }
    }
}

// ── Message ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub click: String,
    pub tags: String,
}

/// Which optional lines go into the body.
#[derive(Debug, Clone)]
pub struct NotifyOptions {
    pub tags: String,
    pub include_room_type: bool,
    pub include_availability: bool,
    pub include_badges: bool,
}

impl From<&NotifyConfig> for NotifyOptions {
    fn from(c: &NotifyConfig) -> Self {
        Self {
            tags: c.tags.clone(),
            include_room_type: c.include_room_type,
            include_availability: c.include_availability,
            include_badges: c.include_badges,
        }
    }
}

impl Default for NotifyOptions {
    fn default() -> Self {
        Self::from(&NotifyConfig::default())
    }
}

pub fn format_notification(listing: &Listing, opts: &NotifyOptions) -> Notification {
    let mut lines = vec![
        format!("Price: EUR {}/month", listing.price),
        format!("Area: {} m2", listing.area),
    ];

    if opts.include_room_type {
        if let Some(room_type) = listing.room_type.as_deref().filter(|s| !s.is_empty()) {
            lines.push(format!("Type: {}", room_type));
        }
    }
    if opts.include_availability {
        if let Some(availability) = listing.availability.as_deref().filter(|s| !s.is_empty()) {
            lines.push(format!("Available: {}", availability));
        }
    }
    if opts.include_badges && !listing.badges.is_empty() {
        lines.push(format!("Status: {}", listing.badges.join(", ")));
    }

    Notification {
        title: listing.display_name(),
        body: lines.join("\n"),
        click: listing.url.clone(),
        tags: opts.tags.clone(),
    }
}

// ── Sink trait ────────────────────────────────────────────────────────────────

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError>;
}

pub struct NtfyNotifier {
    client: reqwest::Client,
    endpoint: String,
}

impl NtfyNotifier {
    pub fn new(config: &NotifyConfig) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| NotifyError::Setup(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint(&config.server, &config.topic),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// "https://ntfy.sh" + "my-topic" → "https://ntfy.sh/my-topic"
pub fn endpoint(server: &str, topic: &str) -> String {
    format!("{}/{}", server.trim_end_matches('/'), topic.trim_matches('/'))
}

/// Raw bytes so non-ASCII street names survive; ntfy reads headers as UTF-8.
fn header_value(name: &'static str, value: &str) -> Result<HeaderValue, NotifyError> {
    HeaderValue::from_bytes(value.as_bytes()).map_err(|_| NotifyError::Header(name))
}

#[async_trait]
impl Notifier for NtfyNotifier {
    async fn send(&self, n: &Notification) -> Result<(), NotifyError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .header("Title", header_value("Title", &n.title)?)
            .header("Click", header_value("Click", &n.click)?)
            .header("Tags", header_value("Tags", &n.tags)?)
            .body(n.body.clone().into_bytes())
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(NotifyError::Status(status.as_u16()));
        }
        Ok(())
    }
}

// ── Delivery loop ─────────────────────────────────────────────────────────────

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct DeliveryReport {
    pub sent: usize,
    pub failed: usize,
}

/// One attempt per listing, in order. A failed delivery is logged and counted;
/// it never stops the rest.
pub async fn notify_all(
    notifier: &dyn Notifier,
    listings: &[Listing],
    opts: &NotifyOptions,
) -> DeliveryReport {
    let mut report = DeliveryReport::default();

    for listing in listings {
        let n = format_notification(listing, opts);
        match notifier.send(&n).await {
            Ok(()) => {
                info!("Notification sent: {}", n.title);
                report.sent += 1;
            }
            Err(e) => {
                warn!("Notification failed for {} ({}): {}", n.title, listing.id, e);
                report.failed += 1;
            }
        }
    }

    report
}
