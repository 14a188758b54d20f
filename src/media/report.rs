use super::{
    error::MediaError,
    fetcher::FetchedAsset,
    types::{MediaAsset, MediaKind},
};
use serde::{Serialize, Serializer};
use std::io::Write;
use tracing::debug;

/// The single value reported to the caller for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success(MediaAsset),
    Failure(MediaError),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn exit_code(&self) -> u8 {
        if self.is_success() {
            0
        } else {
            1
        }
    }
}

impl From<Result<MediaAsset, MediaError>> for Outcome {
    fn from(result: Result<MediaAsset, MediaError>) -> Self {
        match result {
            Ok(asset) => Outcome::Success(asset),
            Err(error) => Outcome::Failure(error),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SuccessReport<'a> {
    file_path: String,
    #[serde(rename = "type")]
    kind: MediaKind,
    timestamp: u64,
    file_size: u64,
    status: &'a str,
}

#[derive(Serialize)]
struct FailureReport<'a> {
    error: &'a str,
}

impl Serialize for Outcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Outcome::Success(asset) => SuccessReport {
                file_path: asset.local_path.display().to_string(),
                kind: asset.kind,
                timestamp: asset.fetched_at_epoch_seconds,
                file_size: asset.size_bytes,
                status: "success",
            }
            .serialize(serializer),
            Outcome::Failure(error) => FailureReport {
                error: &error.message,
            }
            .serialize(serializer),
        }
    }
}

/// Confirms what actually reached the disk and turns it into a [`MediaAsset`].
pub async fn verify_asset(fetched: FetchedAsset) -> Result<MediaAsset, MediaError> {
    let metadata = tokio::fs::metadata(&fetched.local_path)
        .await
        .map_err(|e| MediaError::io(format!("failed to persist asset: {e}")))?;

    let size_bytes = metadata.len();
    if size_bytes != fetched.bytes_written {
        return Err(MediaError::io(format!(
            "failed to persist asset: wrote {} bytes but found {} on disk",
            fetched.bytes_written, size_bytes
        )));
    }

    debug!(
        "Verified {} ({} bytes)",
        fetched.local_path.display(),
        size_bytes
    );

    Ok(MediaAsset {
        remote_url: fetched.remote_url,
        local_path: fetched.local_path,
        kind: fetched.kind,
        size_bytes,
        fetched_at_epoch_seconds: fetched.fetched_at,
    })
}

/// Writes the outcome as one line of JSON.
pub fn write_outcome<W: Write>(mut writer: W, outcome: &Outcome) -> anyhow::Result<()> {
    serde_json::to_writer(&mut writer, outcome)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
