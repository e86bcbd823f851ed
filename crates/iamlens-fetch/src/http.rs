//! HTTP document source
//!
//! One reqwest client per session, configured from [`LensConfig`]. Every
//! fetch is a single GET: no caching and no retries. Anything other than a
//! 2xx response is a fetch failure carrying the URL.

use std::time::Duration;

use async_trait::async_trait;
use iamlens_core::{DocumentSource, LensConfig, LensError, Result};

pub struct HttpSource {
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(config: &LensConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LensError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl DocumentSource for HttpSource {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let failed = |reason: String| LensError::Fetch {
            url: url.to_string(),
            reason,
        };

        let resp = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| failed(e.to_string()))?;

        let status = resp.status();
        tracing::debug!(url, status = status.as_u16(), "fetched document");
        if !status.is_success() {
            return Err(failed(format!("HTTP {}", status)));
        }

        let body = resp.bytes().await.map_err(|e| failed(e.to_string()))?;
        Ok(body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builds_from_default_config() {
        assert!(HttpSource::new(&LensConfig::default()).is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_fetch_error() {
        let config = LensConfig {
            timeout_secs: 2,
            ..LensConfig::default()
        };
        let source = HttpSource::new(&config).unwrap();
        // Nothing listens on the discard port
        let url = "http://127.0.0.1:9/catalog.json";
        match source.fetch(url).await {
            Err(LensError::Fetch { url: failed, .. }) => assert_eq!(failed, url),
            other => panic!("expected fetch error, got {:?}", other.map(|b| b.len())),
        }
    }

    #[tokio::test]
    async fn test_invalid_url_is_fetch_error() {
        let source = HttpSource::new(&LensConfig::default()).unwrap();
        assert!(matches!(
            source.fetch("not a url").await,
            Err(LensError::Fetch { .. })
        ));
    }
}
