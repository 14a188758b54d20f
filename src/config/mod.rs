use crate::media::{ResolverSettings, DEFAULT_FILE_PREFIX, DEFAULT_REDIRECT_TIMEOUT};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

pub const DEFAULT_OUTPUT_DIR: &str = "downloads";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Text,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub endpoint: String,
    pub host: String,
    /// Used only when `RAPIDAPI_KEY` is not set.
    pub key: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        let settings = ResolverSettings::default();
        Self {
            endpoint: settings.endpoint,
            host: settings.api_host,
            key: None,
            timeout_secs: settings.timeout.map(|timeout| timeout.as_secs()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    pub output_dir: Option<PathBuf>,
    pub file_prefix: String,
    pub timeout_secs: Option<u64>,
    pub redirect_timeout_secs: u64,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
            timeout_secs: None,
            redirect_timeout_secs: DEFAULT_REDIRECT_TIMEOUT.as_secs(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub download: DownloadConfig,
    pub logging: LoggingConfig,
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn get_logging_format(&self) -> LogFormat {
        self.logging.format
    }

    /// The environment value wins over the file; blank values count as unset.
    pub fn api_key(&self, from_env: Option<String>) -> Option<String> {
        let present = |key: &String| !key.trim().is_empty();
        from_env
            .filter(present)
            .or_else(|| self.api.key.clone().filter(present))
    }

    pub fn resolver_settings(&self) -> ResolverSettings {
        ResolverSettings {
            endpoint: self.api.endpoint.clone(),
            api_host: self.api.host.clone(),
            timeout: self.api.timeout_secs.map(Duration::from_secs),
        }
    }

    pub fn redirect_timeout(&self) -> Duration {
        Duration::from_secs(self.download.redirect_timeout_secs)
    }

    pub fn download_timeout(&self) -> Option<Duration> {
        self.download.timeout_secs.map(Duration::from_secs)
    }

    /// Resolves the output directory against `cwd` unless it is already absolute.
    pub fn output_dir(&self, cwd: &Path) -> PathBuf {
        let dir = self
            .download
            .output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));
        if dir.is_absolute() {
            dir
        } else {
            cwd.join(dir)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.get_logging_format(), LogFormat::Json);
        assert_eq!(config.redirect_timeout(), Duration::from_secs(10));
        assert_eq!(config.download_timeout(), None);
        assert_eq!(config.download.file_prefix, "tiktok");
        assert_eq!(
            config.output_dir(Path::new("/work")),
            PathBuf::from("/work/downloads")
        );

        let settings = config.resolver_settings();
        let defaults = ResolverSettings::default();
        assert_eq!(settings.endpoint, defaults.endpoint);
        assert_eq!(settings.api_host, defaults.api_host);
        assert_eq!(settings.timeout, defaults.timeout);
    }

    #[test]
    fn test_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            [api]
            key = "from-file"
            timeout_secs = 20

            [download]
            output_dir = "/var/lib/tikgrab"
            file_prefix = "clip"

            [logging]
            format = "text"
            "#,
        )
        .unwrap();

        assert_eq!(config.api.endpoint, ResolverSettings::default().endpoint);
        assert_eq!(config.api.key.as_deref(), Some("from-file"));
        assert_eq!(
            config.resolver_settings().timeout,
            Some(Duration::from_secs(20))
        );
        assert_eq!(config.download.file_prefix, "clip");
        assert_eq!(config.download.redirect_timeout_secs, 10);
        assert_eq!(
            config.output_dir(Path::new("/work")),
            PathBuf::from("/var/lib/tikgrab")
        );
        assert_eq!(config.get_logging_format(), LogFormat::Text);
    }

    #[test]
    fn test_api_key_precedence() {
        let mut config = Config::default();
        assert_eq!(config.api_key(None), None);
        assert_eq!(config.api_key(Some("  ".to_string())), None);

        config.api.key = Some("file".to_string());
        assert_eq!(config.api_key(None).as_deref(), Some("file"));
        assert_eq!(
            config.api_key(Some("env".to_string())).as_deref(),
            Some("env")
        );
        assert_eq!(config.api_key(Some(String::new())).as_deref(), Some("file"));
        assert_eq!(
            config.api_key(Some(" \t".to_string())).as_deref(),
            Some("file")
        );

        config.api.key = Some("   ".to_string());
        assert_eq!(config.api_key(None), None);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[download]\nredirect_timeout_secs = 3").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.redirect_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_from_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::from_file(&dir.path().join("missing.toml")).is_err());

        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[logging]\nformat = \"xml\"\n").unwrap();
        assert!(Config::from_file(&path).is_err());
    }
}
