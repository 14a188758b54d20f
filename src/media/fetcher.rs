use super::{
    error::MediaError,
    http::{HttpClient, HttpRequest},
    types::MediaKind,
};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

pub const DEFAULT_FILE_PREFIX: &str = "tiktok";

/// An asset that has been written to disk but not yet verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedAsset {
    pub remote_url: String,
    pub local_path: PathBuf,
    pub kind: MediaKind,
    pub bytes_written: u64,
    pub fetched_at: u64,
}

pub struct AssetFetcher {
    client: Arc<dyn HttpClient>,
    output_dir: PathBuf,
    file_prefix: String,
    timeout: Option<Duration>,
}

impl AssetFetcher {
    pub fn new(
        client: Arc<dyn HttpClient>,
        output_dir: PathBuf,
        file_prefix: String,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            client,
            output_dir,
            file_prefix,
            timeout,
        }
    }

    /// `<output_dir>/<prefix>_<fetched_at>.<ext>`. Two fetches of the same kind
    /// within one second map to the same path and the later one wins.
    pub fn target_path(&self, kind: MediaKind, fetched_at: u64) -> PathBuf {
        self.output_dir.join(format!(
            "{}_{}.{}",
            self.file_prefix,
            fetched_at,
            kind.extension()
        ))
    }

    pub async fn fetch(
        &self,
        remote_url: &str,
        kind: MediaKind,
        fetched_at: u64,
    ) -> Result<FetchedAsset, MediaError> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| MediaError::io(format!("failed to create output directory: {e}")))?;

        info!(
            "Downloading {} from: {} (via {})",
            kind,
            remote_url,
            self.client.name()
        );

        let request = HttpRequest::new(remote_url).timeout(self.timeout);
        let response = self
            .client
            .get(request)
            .await
            .map_err(|e| MediaError::network(format!("asset fetch failed: {e:#}")))?;

        if response.status != 200 {
            return Err(MediaError::network(format!(
                "asset fetch failed: status {}",
                response.status
            )));
        }

        let local_path = self.target_path(kind, fetched_at);
        debug!(
            "Writing {} bytes to {}",
            response.body.len(),
            local_path.display()
        );

        write_file(&local_path, &response.body)
            .await
            .map_err(|e| MediaError::io(format!("failed to persist asset: {e}")))?;

        info!("Saved {} to: {}", kind, local_path.display());

        Ok(FetchedAsset {
            remote_url: remote_url.to_string(),
            local_path,
            kind,
            bytes_written: response.body.len() as u64,
            fetched_at,
        })
    }
}

// The handle is dropped on every return path, including a failed write.
async fn write_file(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(data).await?;
    file.flush().await?;
    file.sync_all().await
}
