//! Configuration management for Lambda functions.

use std::env;
use std::time::Duration;

use crate::{Error, Result};

/// Default decoded size ceiling for a single asset (1 MiB).
pub const DEFAULT_ASSET_MAX_BYTES: usize = 1024 * 1024;
/// Default budget for a single upload.
pub const DEFAULT_UPLOAD_TIMEOUT_MS: u64 = 3_000;
/// Default budget for the whole batch of uploads.
pub const DEFAULT_BATCH_TIMEOUT_MS: u64 = 8_000;

/// Record store connection settings.
///
/// Read-only handlers load only this, so asset settings cannot break them.
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseConfig {
    /// Database host
    pub host: String,
    /// Database name
    pub name: String,
    /// ARN of the secret containing database credentials
    pub secret_arn: String,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    /// AWS region
    pub aws_region: String,
    /// Bucket that receives uploaded event images
    pub asset_bucket: String,
    /// Public base URL for uploaded objects (CDN or bucket endpoint)
    pub asset_base_url: String,
    /// Base URL of the public event pages
    pub event_page_base_url: String,
    /// Asset pipeline budgets
    pub assets: AssetSettings,
}

/// Limits applied by the asset pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetSettings {
    /// Decoded payloads at or above this size are dropped
    pub max_bytes: usize,
    /// Budget for one upload
    pub upload_timeout: Duration,
    /// Budget for the whole batch
    pub batch_timeout: Duration,
    /// Upload speaker photos and sponsor logos as well
    pub include_entity_images: bool,
}

impl Default for AssetSettings {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_ASSET_MAX_BYTES,
            upload_timeout: Duration::from_millis(DEFAULT_UPLOAD_TIMEOUT_MS),
            batch_timeout: Duration::from_millis(DEFAULT_BATCH_TIMEOUT_MS),
            include_entity_images: false,
        }
    }
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            host: required(&lookup, "DATABASE_HOST")?,
            name: lookup("DATABASE_NAME").unwrap_or_else(|| "event_pages".to_string()),
            secret_arn: required(&lookup, "DATABASE_URL_SECRET_ARN")?,
        })
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database = DatabaseConfig::from_lookup(&lookup)?;
        let aws_region = lookup("AWS_REGION").unwrap_or_else(|| "us-east-1".to_string());
        let asset_bucket = required(&lookup, "ASSET_BUCKET")?;
        let asset_base_url = lookup("ASSET_BASE_URL").unwrap_or_else(|| {
            format!("https://{}.s3.{}.amazonaws.com", asset_bucket, aws_region)
        });

        let assets = AssetSettings {
            max_bytes: parse_or(&lookup, "ASSET_MAX_BYTES", DEFAULT_ASSET_MAX_BYTES)?,
            upload_timeout: Duration::from_millis(parse_or(
                &lookup,
                "ASSET_UPLOAD_TIMEOUT_MS",
                DEFAULT_UPLOAD_TIMEOUT_MS,
            )?),
            batch_timeout: Duration::from_millis(parse_or(
                &lookup,
                "ASSET_BATCH_TIMEOUT_MS",
                DEFAULT_BATCH_TIMEOUT_MS,
            )?),
            include_entity_images: parse_or(&lookup, "ASSET_ENTITY_IMAGES", false)?,
        };

        Ok(Self {
            database,
            aws_region,
            asset_bucket,
            asset_base_url: asset_base_url.trim_end_matches('/').to_string(),
            event_page_base_url: required(&lookup, "EVENT_PAGE_BASE_URL")?
                .trim_end_matches('/')
                .to_string(),
            assets,
        })
    }
}

fn required<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| Error::Config(format!("{} not set", key)))
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("{} has an invalid value: {}", key, raw))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("DATABASE_HOST", "db.internal"),
            ("DATABASE_URL_SECRET_ARN", "arn:aws:secretsmanager:us-east-1:1:secret:db"),
            ("ASSET_BUCKET", "event-assets"),
            ("EVENT_PAGE_BASE_URL", "https://events.example.com/"),
        ])
    }

    fn load(env: &HashMap<&'static str, &'static str>) -> Result<Config> {
        Config::from_lookup(|k| env.get(k).map(|v| v.to_string()))
    }

    #[test]
    fn test_defaults() {
        let config = load(&base_env()).unwrap();
        assert_eq!(config.database.name, "event_pages");
        assert_eq!(config.aws_region, "us-east-1");
        assert_eq!(
            config.asset_base_url,
            "https://event-assets.s3.us-east-1.amazonaws.com"
        );
        assert_eq!(config.event_page_base_url, "https://events.example.com");
        assert_eq!(config.assets, AssetSettings::default());
    }

    #[test]
    fn test_asset_overrides() {
        let mut env = base_env();
        env.insert("ASSET_MAX_BYTES", "2048");
        env.insert("ASSET_UPLOAD_TIMEOUT_MS", "150");
        env.insert("ASSET_BATCH_TIMEOUT_MS", "400");
        env.insert("ASSET_ENTITY_IMAGES", "true");
        env.insert("ASSET_BASE_URL", "https://cdn.example.com/");

        let config = load(&env).unwrap();
        assert_eq!(config.assets.max_bytes, 2048);
        assert_eq!(config.assets.upload_timeout, Duration::from_millis(150));
        assert_eq!(config.assets.batch_timeout, Duration::from_millis(400));
        assert!(config.assets.include_entity_images);
        assert_eq!(config.asset_base_url, "https://cdn.example.com");
    }

    #[test]
    fn test_missing_required() {
        let mut env = base_env();
        env.remove("ASSET_BUCKET");
        let err = load(&env).unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg.contains("ASSET_BUCKET")));
    }

    #[test]
    fn test_database_config_ignores_asset_settings() {
        let env = HashMap::from([
            ("DATABASE_HOST", "db.internal"),
            ("DATABASE_URL_SECRET_ARN", "arn:aws:secretsmanager:us-east-1:1:secret:db"),
            ("ASSET_MAX_BYTES", "lots"),
        ]);

        let database = DatabaseConfig::from_lookup(|k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(database.host, "db.internal");
        assert_eq!(database.name, "event_pages");

        assert!(matches!(load(&env), Err(Error::Config(_))));
    }

    #[test]
    fn test_invalid_number() {
        let mut env = base_env();
        env.insert("ASSET_MAX_BYTES", "lots");
        assert!(matches!(load(&env), Err(Error::Config(_))));
    }
}
