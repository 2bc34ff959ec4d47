#[cfg(test)]
pub mod http_stub;

use std::time::Instant;
use tracing::info;

/// A simple wall-clock timer for logging elapsed time.
pub struct Timer {
    label: String,
    start: Instant,
}

impl Timer {
    pub fn start(label: impl Into<String>) -> Self {
        let label = label.into();
        info!("Checking: {}", label);
        Self {
            label,
            start: Instant::now(),
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        info!("Finished: {} (took {:.2?})", self.label, self.start.elapsed());
    }
}

/// "2026-04-01 09:30:00" or "never"
pub fn fmt_last_check(ts: Option<chrono::NaiveDateTime>) -> String {
    ts.map(|t| t.format(crate::storage::TIMESTAMP_FORMAT).to_string())
        .unwrap_or_else(|| "never".into())
}
