use clap::{error::ErrorKind as ClapErrorKind, Parser};
use std::{path::PathBuf, process::ExitCode, sync::Arc};
use tracing::{error, info};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

mod config;
mod media;
mod utils;

use config::{Config, LogFormat};
use media::{
    write_outcome, AssetFetcher, MediaDownloader, MediaError, MediaKind, MetadataResolver,
    Outcome, ReqwestClient, UrlNormalizer,
};

const API_KEY_ENV: &str = "RAPIDAPI_KEY";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TikTok video URL (full or shortened link)
    url: String,

    /// What to download
    #[arg(value_enum, default_value_t = MediaKind::Video)]
    kind: MediaKind,

    /// Path to the config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory downloaded files are written to
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

fn get_config_path(args: &Args) -> Option<PathBuf> {
    if let Some(path) = &args.config {
        return Some(path.clone());
    }

    if let Ok(path) = std::env::var("TIKGRAB_CONFIG") {
        return Some(PathBuf::from(path));
    }

    if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME") {
        let config_path = PathBuf::from(xdg_config_home).join("tikgrab/config.toml");
        if config_path.exists() {
            return Some(config_path);
        }
    }

    if let Some(home) = dirs::home_dir() {
        let config_path = home.join(".config/tikgrab/config.toml");
        if config_path.exists() {
            return Some(config_path);
        }
    }

    None
}

fn init_logging(format: LogFormat) {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    // stdout is reserved for the result object.
    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init(),
    }
}

fn argument_error_message(error: &clap::Error) -> String {
    let rendered = error.render().to_string();
    let first_line = rendered.lines().next().unwrap_or_default().trim();
    format!(
        "invalid arguments: {}",
        first_line.trim_start_matches("error: ")
    )
}

fn build_downloader(
    config: &Config,
    api_key: Option<String>,
) -> Result<MediaDownloader, MediaError> {
    let cwd = std::env::current_dir()
        .map_err(|e| MediaError::io(format!("failed to read working directory: {e}")))?;
    let client = Arc::new(
        ReqwestClient::new().map_err(|e| MediaError::network(format!("{e:#}")))?,
    );

    let output_dir = config.output_dir(&cwd);
    info!("Saving downloads to: {}", output_dir.display());

    Ok(MediaDownloader::new(
        UrlNormalizer::new(client.clone(), config.redirect_timeout()),
        MetadataResolver::new(client.clone(), config.resolver_settings(), api_key),
        AssetFetcher::new(
            client,
            output_dir,
            config.download.file_prefix.clone(),
            config.download_timeout(),
        ),
    ))
}

async fn run(args: Args, config: anyhow::Result<Option<Config>>) -> Outcome {
    let mut config = match config {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            error!("{:#}", e);
            return Outcome::Failure(MediaError::config(format!("{e:#}")));
        }
    };

    if let Some(output_dir) = args.output_dir {
        config.download.output_dir = Some(output_dir);
    }

    let api_key = config.api_key(std::env::var(API_KEY_ENV).ok());

    match build_downloader(&config, api_key) {
        Ok(downloader) => downloader.download(&args.url, args.kind).await,
        Err(e) => Outcome::Failure(e),
    }
}

fn emit(outcome: &Outcome) -> ExitCode {
    if let Err(e) = write_outcome(std::io::stdout().lock(), outcome) {
        error!("Failed to write result: {:#}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::from(outcome.exit_code())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            return emit(&Outcome::Failure(MediaError::input(argument_error_message(
                &e,
            ))));
        }
    };

    let config = get_config_path(&args)
        .map(|path| Config::from_file(&path))
        .transpose();

    let log_format = match &config {
        Ok(Some(config)) => config.get_logging_format(),
        _ => LogFormat::default(),
    };
    init_logging(log_format);

    info!("Starting tikgrab...");

    let outcome = run(args, config).await;
    emit(&outcome)
}
