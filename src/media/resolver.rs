use super::{
    error::MediaError,
    http::{HttpClient, HttpRequest},
    types::{ApiResponse, MediaKind, VideoReference},
};
use crate::utils::truncate_chars;
use std::{sync::Arc, time::Duration};
use tracing::{debug, info, warn};

const DEFAULT_API_ENDPOINT: &str =
    "https://tiktok-downloader-download-tiktok-videos-without-watermark.p.rapidapi.com/index";
const DEFAULT_API_HOST: &str =
    "tiktok-downloader-download-tiktok-videos-without-watermark.p.rapidapi.com";

const KEY_HEADER: &str = "x-rapidapi-key";
const HOST_HEADER: &str = "x-rapidapi-host";

/// Characters of an unparseable body kept in the diagnostic log.
const BODY_PREVIEW_CHARS: usize = 500;

#[derive(Debug, Clone)]
pub struct ResolverSettings {
    pub endpoint: String,
    pub api_host: String,
    pub timeout: Option<Duration>,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_API_ENDPOINT.to_string(),
            api_host: DEFAULT_API_HOST.to_string(),
            timeout: None,
        }
    }
}

/// Looks up direct asset URLs for a video through the metadata API.
pub struct MetadataResolver {
    client: Arc<dyn HttpClient>,
    settings: ResolverSettings,
    api_key: Option<String>,
}

impl MetadataResolver {
    pub fn new(
        client: Arc<dyn HttpClient>,
        settings: ResolverSettings,
        api_key: Option<String>,
    ) -> Self {
        Self {
            client,
            settings,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        }
    }

    pub fn credential(&self) -> Result<&str, MediaError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| MediaError::config("missing api credential"))
    }

    /// Returns the direct URL of the requested asset. The API is queried with
    /// the caller's original URL, not the normalized one.
    pub async fn resolve(
        &self,
        reference: &VideoReference,
        kind: MediaKind,
    ) -> Result<String, MediaError> {
        let api_key = self.credential()?;

        info!(
            "Requesting asset URLs for video {} from {}",
            reference.video_id, self.settings.api_host
        );
        debug!("Canonical URL: {}", reference.normalized_url);

        let request = HttpRequest::new(&self.settings.endpoint)
            .query("url", &reference.raw_url)
            .header(KEY_HEADER, api_key)
            .header(HOST_HEADER, &self.settings.api_host)
            .timeout(self.settings.timeout);

        let response = self
            .client
            .get(request)
            .await
            .map_err(|e| MediaError::network(format!("upstream request failed: {e:#}")))?;

        if response.status != 200 {
            return Err(MediaError::network(format!(
                "upstream status {}",
                response.status
            )));
        }

        let payload = ApiResponse::from_slice(&response.body).map_err(|e| {
            let body = String::from_utf8_lossy(&response.body);
            warn!("Failed to parse metadata response: {}", e);
            debug!(
                "Raw metadata response: {}",
                truncate_chars(&body, BODY_PREVIEW_CHARS)
            );
            MediaError::response_format("malformed response")
        })?;

        let asset_url = payload
            .asset_url(kind)
            .ok_or_else(|| MediaError::response_format(format!("no {kind} url in response")))?;

        info!("Found {} URL: {}", kind, asset_url);
        Ok(asset_url.to_string())
    }
}
