mod error;
mod extract;
mod fetcher;
mod http;
mod normalize;
mod report;
mod resolver;
mod types;

pub use error::MediaError;
pub use fetcher::{AssetFetcher, DEFAULT_FILE_PREFIX};
pub use http::ReqwestClient;
pub use normalize::{UrlNormalizer, DEFAULT_REDIRECT_TIMEOUT};
pub use report::{write_outcome, Outcome};
pub use resolver::{MetadataResolver, ResolverSettings};
pub use types::{MediaAsset, MediaKind, VideoReference};

use crate::utils::now_epoch_seconds;
use extract::{extract_video_id, validate_url};
use tracing::{info, warn};

/// Runs one URL through normalization, extraction, metadata lookup and download.
pub struct MediaDownloader {
    normalizer: UrlNormalizer,
    resolver: MetadataResolver,
    fetcher: AssetFetcher,
}

impl MediaDownloader {
    pub fn new(
        normalizer: UrlNormalizer,
        resolver: MetadataResolver,
        fetcher: AssetFetcher,
    ) -> Self {
        Self {
            normalizer,
            resolver,
            fetcher,
        }
    }

    pub async fn download(&self, url: &str, kind: MediaKind) -> Outcome {
        info!(
            "Download requested: kind={}, url={}, timestamp={}",
            kind,
            url,
            now_epoch_seconds()
        );

        let outcome = Outcome::from(self.try_download(url, kind).await);
        match &outcome {
            Outcome::Success(asset) => info!(
                "Download finished: {} -> {} ({} bytes)",
                asset.remote_url,
                asset.local_path.display(),
                asset.size_bytes
            ),
            Outcome::Failure(error) => warn!("Download failed with {}: {}", error.kind, error),
        }
        outcome
    }

    /// Builds the [`VideoReference`] for `url`, resolving shortened links first.
    pub async fn reference(&self, url: &str) -> Result<VideoReference, MediaError> {
        let raw_url = validate_url(url)?;
        let normalized_url = self.normalizer.normalize(raw_url).await?;
        let video_id = extract_video_id(&normalized_url)?;
        info!("Video id: {}", video_id);

        Ok(VideoReference {
            raw_url: raw_url.to_string(),
            normalized_url,
            video_id,
        })
    }

    async fn try_download(&self, url: &str, kind: MediaKind) -> Result<MediaAsset, MediaError> {
        validate_url(url)?;
        // Checked up front so a missing key never costs a redirect lookup.
        self.resolver.credential()?;

        let reference = self.reference(url).await?;
        let asset_url = self.resolver.resolve(&reference, kind).await?;
        let fetched = self
            .fetcher
            .fetch(&asset_url, kind, now_epoch_seconds())
            .await?;
        report::verify_asset(fetched).await
    }
}
