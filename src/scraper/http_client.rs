use crate::config::ScraperConfig;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

/// Why the overview page could not be fetched.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("failed to read response body: {0}")]
    Body(String),

    #[error("invalid client setup: {0}")]
    Setup(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if let Some(status) = e.status() {
            FetchError::Status(status.as_u16())
        } else if e.is_body() || e.is_decode() {
            FetchError::Body(e.to_string())
        } else {
            FetchError::Transport(e.to_string())
        }
    }
}

/// Browser-looking GET client. One attempt per call, no retries.
pub struct HttpClient {
    inner: reqwest::Client,
}

impl HttpClient {
    pub fn new(config: &ScraperConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(&config.accept_language)
                .map_err(|e| FetchError::Setup(format!("accept_language: {}", e)))?,
        );

        let inner = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .build()
            .map_err(|e| FetchError::Setup(e.to_string()))?;

        Ok(Self { inner })
    }

    /// Fetch a URL as text. Any non-2xx status is an error.
    pub async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        debug!("GET {}", url);

        let resp = self.inner.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let text = resp.text().await?;
        debug!("GET {} → {} ({} bytes)", url, status, text.len());
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::http_stub::{closed_port_url, serve_once};

    #[test]
    fn test_client_builds_with_defaults() {
        assert!(HttpClient::new(&ScraperConfig::default()).is_ok());
    }

    #[test]
    fn test_rejects_bad_header_value() {
        let config = ScraperConfig {
            accept_language: "en\nUS".to_string(),
            ..ScraperConfig::default()
        };
        assert!(matches!(HttpClient::new(&config), Err(FetchError::Setup(_))));
    }

    #[tokio::test]
    async fn test_sends_browser_headers() {
        let (base, server) = serve_once(200, "<html><body>ok</body></html>").await;
        let config = ScraperConfig { timeout_secs: 5, ..ScraperConfig::default() };
        let client = HttpClient::new(&config).unwrap();

        let text = client.get_text(&format!("{}/woning-overzicht?page=1", base)).await.unwrap();
        assert_eq!(text, "<html><body>ok</body></html>");

        let req = server.await.unwrap();
        assert_eq!(req.method, "GET");
        assert_eq!(req.target, "/woning-overzicht?page=1");
        assert_eq!(req.header("user-agent"), Some(config.user_agent.as_str()));
        assert_eq!(req.header("accept-language"), Some(config.accept_language.as_str()));
        assert_eq!(req.header("accept"), Some(ACCEPT_HTML));
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let (base, server) = serve_once(503, "maintenance").await;
        let config = ScraperConfig { timeout_secs: 5, ..ScraperConfig::default() };
        let client = HttpClient::new(&config).unwrap();

        let err = client.get_text(&base).await.unwrap_err();
        assert!(matches!(err, FetchError::Status(503)));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let config = ScraperConfig { timeout_secs: 2, ..ScraperConfig::default() };
        let client = HttpClient::new(&config).unwrap();
        let err = client.get_text(&closed_port_url().await).await.unwrap_err();
        assert!(matches!(err, FetchError::Transport(_) | FetchError::Timeout));
    }
}
