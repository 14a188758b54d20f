use super::{
    error::MediaError,
    http::{HttpClient, HttpRequest},
};
use std::{sync::Arc, time::Duration};
use tracing::info;
use url::Url;

/// Redirect-indirection hosts that never carry an identifier themselves.
pub const SHORT_LINK_HOSTS: &[&str] = &["vm.tiktok.com", "vt.tiktok.com"];

pub const DEFAULT_REDIRECT_TIMEOUT: Duration = Duration::from_secs(10);

pub fn is_short_link(url: &str) -> bool {
    Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(|host| SHORT_LINK_HOSTS.contains(&host)))
        .unwrap_or(false)
}

pub struct UrlNormalizer {
    client: Arc<dyn HttpClient>,
    timeout: Duration,
}

impl UrlNormalizer {
    pub fn new(client: Arc<dyn HttpClient>, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Resolves shortened links to the URL they redirect to. Anything else is returned as is.
    pub async fn normalize(&self, url: &str) -> Result<String, MediaError> {
        if !is_short_link(url) {
            return Ok(url.to_string());
        }

        info!("Shortened link detected, following redirects: {}", url);

        let request = HttpRequest::new(url).timeout(Some(self.timeout));
        let response = self
            .client
            .head(request)
            .await
            .map_err(|e| MediaError::network(format!("redirect resolution failed: {e:#}")))?;

        info!("Resolved shortened link to: {}", response.final_url);
        Ok(response.final_url)
    }
}
