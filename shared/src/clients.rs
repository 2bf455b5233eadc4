//! Process-wide service clients.
//!
//! A Lambda process serves many invocations. The SDK config, S3 client and
//! database pool are built on first use and reused until the process exits.
//!
//! Readers only need [`record_store`]; it loads the database settings alone,
//! so a missing bucket or page URL never takes reads and rendering down.

use aws_config::SdkConfig;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

use crate::assets::AssetPipeline;
use crate::blob::{BlobStore, S3BlobStore};
use crate::config::DatabaseConfig;
use crate::secrets::get_database_credentials;
use crate::store::{PgRecordStore, RecordStore};
use crate::{db, Config, Result};

static AWS: OnceCell<SdkConfig> = OnceCell::const_new();
static RECORDS: OnceCell<Arc<dyn RecordStore>> = OnceCell::const_new();
static CLIENTS: OnceCell<Clients> = OnceCell::const_new();

async fn aws() -> &'static SdkConfig {
    AWS.get_or_init(|| aws_config::load_defaults(aws_config::BehaviorVersion::latest()))
        .await
}

/// The process-wide record store, connecting on first call.
pub async fn record_store() -> Result<Arc<dyn RecordStore>> {
    RECORDS
        .get_or_try_init(connect_records)
        .await
        .map(Arc::clone)
}

async fn connect_records() -> Result<Arc<dyn RecordStore>> {
    let config = DatabaseConfig::from_env()?;

    let secrets = aws_sdk_secretsmanager::Client::new(aws().await);
    let creds = get_database_credentials(&secrets, &config.secret_arn).await?;
    let pool = db::create_pool(&config, &creds).await?;

    let records = PgRecordStore::new(pool);
    records.ensure_schema().await?;

    info!(host = %config.host, database = %config.name, "Record store initialized");

    Ok(Arc::new(records))
}

/// Handles used by the ingestion path: records plus asset storage.
pub struct Clients {
    pub config: Config,
    pub blobs: Arc<dyn BlobStore>,
    pub records: Arc<dyn RecordStore>,
}

impl Clients {
    /// The process-wide clients, initializing them on first call.
    pub async fn shared() -> Result<&'static Clients> {
        CLIENTS.get_or_try_init(Clients::connect).await
    }

    async fn connect() -> Result<Self> {
        let config = Config::from_env()?;
        let records = record_store().await?;

        let blobs = S3BlobStore::new(
            aws_sdk_s3::Client::new(aws().await),
            config.asset_bucket.clone(),
            config.asset_base_url.clone(),
        );

        info!(
            bucket = %config.asset_bucket,
            region = %config.aws_region,
            "Clients initialized"
        );

        Ok(Self {
            config,
            blobs: Arc::new(blobs),
            records,
        })
    }

    /// Asset pipeline over the shared blob store.
    pub fn asset_pipeline(&self) -> AssetPipeline {
        AssetPipeline::new(Arc::clone(&self.blobs), self.config.assets.clone())
    }
}
