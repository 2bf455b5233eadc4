//! Shared library for the event page Lambda functions.
//!
//! This crate provides the request normalizer, asset pipeline, record and blob
//! stores, page renderer and HTTP helpers used by every handler.

pub mod assets;
pub mod blob;
pub mod clients;
pub mod config;
pub mod db;
pub mod error;
pub mod http;
pub mod models;
pub mod normalize;
pub mod records;
pub mod render;
pub mod secrets;
pub mod store;

pub use assets::{AssetInput, AssetPipeline, ProcessedAssets};
pub use blob::{BlobStore, MemoryBlobStore, S3BlobStore};
pub use clients::{record_store, Clients};
pub use config::{AssetSettings, Config, DatabaseConfig};
pub use error::{Error, Result};
pub use models::{CreateEventResponse, EventList, EventRecord, EventStatus, Template};
pub use normalize::{normalize_body, NormalizedEvent};
pub use records::build_record;
pub use render::render_page;
pub use store::{MemoryRecordStore, PgRecordStore, RecordStore};
