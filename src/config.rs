//! Centralized application configuration.
//! Combines environment variables and CLI arguments (CLI wins).

use anyhow::{Context, Result};
use clap::Parser;
use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub upload_dir: String,
    pub database_url: String,
    pub classifier_url: String,
    pub storage_url: String,
    pub min_confidence: f64,
    pub max_results: usize,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "Image classification and storage API")]
pub struct Args {
    /// Host to bind to (overrides IMAGE_STORE_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides IMAGE_STORE_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Directory for spooling uploads (overrides IMAGE_STORE_UPLOAD_DIR)
    #[arg(long)]
    pub upload_dir: Option<String>,

    /// Database URL (overrides IMAGE_STORE_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Base URL of the label-detection service (overrides IMAGE_STORE_CLASSIFIER_URL)
    #[arg(long)]
    pub classifier_url: Option<String>,

    /// Base URL of the remote object store (overrides IMAGE_STORE_STORAGE_URL)
    #[arg(long)]
    pub storage_url: Option<String>,

    /// Minimum label confidence to keep (overrides IMAGE_STORE_MIN_CONFIDENCE)
    #[arg(long)]
    pub min_confidence: Option<f64>,

    /// Maximum labels requested per image (overrides IMAGE_STORE_MAX_RESULTS)
    #[arg(long)]
    pub max_results: Option<usize>,

    /// Run migrations and exit
    #[arg(long)]
    pub migrate: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and migrate flag.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        let args = Args::parse();

        // --- Environment fallback ---
        let env_host = env::var("IMAGE_STORE_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = match env::var("IMAGE_STORE_PORT") {
            Ok(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing IMAGE_STORE_PORT value `{}`", value))?,
            Err(env::VarError::NotPresent) => 3000,
            Err(err) => return Err(err).context("reading IMAGE_STORE_PORT"),
        };
        let env_upload_dir =
            env::var("IMAGE_STORE_UPLOAD_DIR").unwrap_or_else(|_| "./data/uploads".into());
        let env_db = env::var("IMAGE_STORE_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./data/meta/image_store.db".into());
        let env_classifier = env::var("IMAGE_STORE_CLASSIFIER_URL")
            .unwrap_or_else(|_| "http://localhost:8081".into());
        let env_storage =
            env::var("IMAGE_STORE_STORAGE_URL").unwrap_or_else(|_| "http://localhost:8082".into());
        let env_min_confidence = match env::var("IMAGE_STORE_MIN_CONFIDENCE") {
            Ok(value) => value
                .parse::<f64>()
                .with_context(|| format!("parsing IMAGE_STORE_MIN_CONFIDENCE value `{}`", value))?,
            Err(env::VarError::NotPresent) => 0.7,
            Err(err) => return Err(err).context("reading IMAGE_STORE_MIN_CONFIDENCE"),
        };
        let env_max_results = match env::var("IMAGE_STORE_MAX_RESULTS") {
            Ok(value) => value
                .parse::<usize>()
                .with_context(|| format!("parsing IMAGE_STORE_MAX_RESULTS value `{}`", value))?,
            Err(env::VarError::NotPresent) => 10,
            Err(err) => return Err(err).context("reading IMAGE_STORE_MAX_RESULTS"),
        };

        // --- Merge ---
        let cfg = Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            upload_dir: args.upload_dir.unwrap_or(env_upload_dir),
            database_url: args.database_url.unwrap_or(env_db),
            classifier_url: args.classifier_url.unwrap_or(env_classifier),
            storage_url: args.storage_url.unwrap_or(env_storage),
            min_confidence: args.min_confidence.unwrap_or(env_min_confidence),
            max_results: args.max_results.unwrap_or(env_max_results),
        };

        Ok((cfg, args.migrate))
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
