use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    #[default]
    Video,
    Audio,
}

impl MediaKind {
    pub fn extension(self) -> &'static str {
        match self {
            MediaKind::Video => "mp4",
            MediaKind::Audio => "mp3",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Video => "video",
            MediaKind::Audio => "audio",
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A URL the pipeline has recovered a media identifier from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoReference {
    /// The URL exactly as the caller supplied it. This is what the metadata API receives.
    pub raw_url: String,
    /// The URL after shortened-link resolution; equal to `raw_url` for full links.
    pub normalized_url: String,
    pub video_id: String,
}

/// Payload returned by the metadata API.
///
/// Only the first entry of `video` or `music` is ever consumed. Fields that are
/// present but not lists deserialize as empty.
#[derive(Debug, Default, Deserialize)]
pub struct ApiResponse {
    #[serde(default, deserialize_with = "lenient_list")]
    pub video: Vec<Value>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub music: Vec<Value>,
}

impl ApiResponse {
    /// Parses a response body, which must be a JSON object.
    pub fn from_slice(body: &[u8]) -> serde_json::Result<Self> {
        let value: Value = serde_json::from_slice(body)?;
        if !value.is_object() {
            return Err(serde::de::Error::custom("expected a JSON object"));
        }
        serde_json::from_value(value)
    }

    pub fn asset_url(&self, kind: MediaKind) -> Option<&str> {
        let list = match kind {
            MediaKind::Video => &self.video,
            MediaKind::Audio => &self.music,
        };
        list.first()
            .and_then(Value::as_str)
            .filter(|url| !url.is_empty())
    }
}

fn lenient_list<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(items),
        _ => Ok(Vec::new()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaAsset {
    pub remote_url: String,
    pub local_path: PathBuf,
    pub kind: MediaKind,
    pub size_bytes: u64,
    pub fetched_at_epoch_seconds: u64,
}
