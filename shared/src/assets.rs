//! Asset pipeline: turns inbound base64 data URIs into public URLs.
//!
//! Uploading is best effort. A malformed or oversized payload, a failed
//! upload, or a blown time budget all degrade to an empty URL for the asset
//! concerned; [`AssetPipeline::process`] never fails. Event creation must not
//! be blocked by images.
//!
//! Two budgets apply:
//! - every upload is raced against `upload_timeout`;
//! - the whole concurrent batch is raced against `batch_timeout`, and when
//!   that fires the canonical empty result is returned for every asset.
//!
//! A timed-out upload future is dropped. If the store already accepted the
//! request the object may still land in the bucket unreferenced.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::time::timeout;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::blob::BlobStore;
use crate::config::AssetSettings;

/// Key prefixes in the asset bucket.
pub mod prefix {
    pub const BANNERS: &str = "banners";
    pub const LOGOS: &str = "logos";
    pub const GALLERY: &str = "gallery";
    pub const SPEAKERS: &str = "speakers";
    pub const SPONSORS: &str = "sponsors";
}

/// Why an asset was dropped. Logged, never returned to callers.
#[derive(Error, Debug, PartialEq)]
pub enum AssetError {
    #[error("not a base64 data URI")]
    MalformedDataUri,
    #[error("payload is not valid base64")]
    InvalidBase64,
    #[error("payload of {size} bytes exceeds the {max} byte limit")]
    TooLarge { size: usize, max: usize },
    #[error("upload timed out")]
    Timeout,
    #[error("upload failed: {0}")]
    Upload(String),
}

/// A validated, decoded data URI.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAsset {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl DecodedAsset {
    pub fn extension(&self) -> &'static str {
        extension_for_mime(&self.mime)
    }
}

/// File extension for a declared MIME type.
pub fn extension_for_mime(mime: &str) -> &'static str {
    match mime {
        "image/png" => "png",
        "image/jpeg" | "image/jpg" | "image/pjpeg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/svg+xml" => "svg",
        "image/avif" => "avif",
        _ => "bin",
    }
}

fn is_mime(value: &str) -> bool {
    let token = |s: &str| {
        !s.is_empty()
            && s.chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    };
    match value.split_once('/') {
        Some((kind, subtype)) => token(kind) && token(subtype),
        None => false,
    }
}

fn strip_prefix_ignore_case<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    let head = value.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &value[prefix.len()..])
}

fn strip_suffix_ignore_case<'a>(value: &'a str, suffix: &str) -> Option<&'a str> {
    let split = value.len().checked_sub(suffix.len())?;
    let tail = value.get(split..)?;
    tail.eq_ignore_ascii_case(suffix).then(|| &value[..split])
}

/// Parse and decode a `data:<type>/<subtype>;base64,<payload>` string.
///
/// Decoded payloads must be strictly smaller than `max_bytes`.
/// The scheme and the `base64` token are matched case-insensitively.
pub fn decode_data_uri(data: &str, max_bytes: usize) -> Result<DecodedAsset, AssetError> {
    let rest =
        strip_prefix_ignore_case(data.trim(), "data:").ok_or(AssetError::MalformedDataUri)?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or(AssetError::MalformedDataUri)?;
    let header =
        strip_suffix_ignore_case(header, ";base64").ok_or(AssetError::MalformedDataUri)?;

    let mime = header.split(';').next().unwrap_or_default().to_ascii_lowercase();
    if !is_mime(&mime) {
        return Err(AssetError::MalformedDataUri);
    }

    let payload: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    if payload.is_empty() {
        return Err(AssetError::MalformedDataUri);
    }

    // Reject before decoding when the encoded length alone proves the size.
    let lower_bound = (payload.len() / 4 * 3).saturating_sub(2);
    if lower_bound >= max_bytes {
        return Err(AssetError::TooLarge {
            size: lower_bound,
            max: max_bytes,
        });
    }

    let bytes = STANDARD
        .decode(payload.as_bytes())
        .map_err(|_| AssetError::InvalidBase64)?;

    if bytes.len() >= max_bytes {
        return Err(AssetError::TooLarge {
            size: bytes.len(),
            max: max_bytes,
        });
    }

    Ok(DecodedAsset { mime, bytes })
}

/// Object key for an asset of an event.
pub fn blob_key(prefix: &str, event_id: &str, extension: &str) -> String {
    format!("{}/{}/{}.{}", prefix, event_id, Uuid::new_v4().simple(), extension)
}

/// Raw assets of one event, as data URIs.
///
/// `speaker_photos` and `sponsor_logos` are index-aligned with the event's
/// speaker and sponsor lists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetInput {
    pub banner: Option<String>,
    pub logo: Option<String>,
    pub gallery: Vec<String>,
    pub speaker_photos: Vec<Option<String>>,
    pub sponsor_logos: Vec<Option<String>>,
}

/// Public URLs produced by the pipeline. Empty string means "no image".
///
/// Every vector has the same length as its counterpart in [`AssetInput`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessedAssets {
    pub hero_image: String,
    pub logo: String,
    pub gallery: Vec<String>,
    pub speaker_photos: Vec<String>,
    pub sponsor_logos: Vec<String>,
}

impl ProcessedAssets {
    /// The canonical result when nothing could be uploaded in time.
    pub fn empty(input: &AssetInput) -> Self {
        Self {
            hero_image: String::new(),
            logo: String::new(),
            gallery: vec![String::new(); input.gallery.len()],
            speaker_photos: vec![String::new(); input.speaker_photos.len()],
            sponsor_logos: vec![String::new(); input.sponsor_logos.len()],
        }
    }

    fn uploaded_count(&self) -> usize {
        std::iter::once(&self.hero_image)
            .chain(std::iter::once(&self.logo))
            .chain(&self.gallery)
            .chain(&self.speaker_photos)
            .chain(&self.sponsor_logos)
            .filter(|url| !url.is_empty())
            .count()
    }
}

/// Concurrent, time-bounded uploader for event assets.
pub struct AssetPipeline {
    blobs: Arc<dyn BlobStore>,
    settings: AssetSettings,
}

impl AssetPipeline {
    pub fn new(blobs: Arc<dyn BlobStore>, settings: AssetSettings) -> Self {
        Self { blobs, settings }
    }

    /// Upload every asset of an event. Never fails.
    #[instrument(skip(self, input))]
    pub async fn process(&self, event_id: &str, input: &AssetInput) -> ProcessedAssets {
        let started = Instant::now();

        let batch = async {
            let (hero_image, logo, gallery, speaker_photos, sponsor_logos) = tokio::join!(
                self.upload_optional(prefix::BANNERS, event_id, input.banner.as_deref()),
                self.upload_optional(prefix::LOGOS, event_id, input.logo.as_deref()),
                join_all(
                    input
                        .gallery
                        .iter()
                        .map(|data| self.upload(prefix::GALLERY, event_id, data))
                ),
                self.upload_entity_images(prefix::SPEAKERS, event_id, &input.speaker_photos),
                self.upload_entity_images(prefix::SPONSORS, event_id, &input.sponsor_logos),
            );

            ProcessedAssets {
                hero_image,
                logo,
                gallery,
                speaker_photos,
                sponsor_logos,
            }
        };

        match timeout(self.settings.batch_timeout, batch).await {
            Ok(processed) => {
                info!(
                    uploaded = processed.uploaded_count(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Asset processing finished"
                );
                processed
            }
            Err(_) => {
                warn!(
                    budget_ms = self.settings.batch_timeout.as_millis() as u64,
                    "Asset batch timed out, continuing without images"
                );
                ProcessedAssets::empty(input)
            }
        }
    }

    async fn upload_entity_images(
        &self,
        prefix: &str,
        event_id: &str,
        images: &[Option<String>],
    ) -> Vec<String> {
        if !self.settings.include_entity_images {
            return vec![String::new(); images.len()];
        }

        join_all(
            images
                .iter()
                .map(|data| self.upload_optional(prefix, event_id, data.as_deref())),
        )
        .await
    }

    async fn upload_optional(&self, prefix: &str, event_id: &str, data: Option<&str>) -> String {
        match data {
            Some(data) if !data.trim().is_empty() => self.upload(prefix, event_id, data).await,
            _ => String::new(),
        }
    }

    async fn upload(&self, prefix: &str, event_id: &str, data: &str) -> String {
        match self.try_upload(prefix, event_id, data).await {
            Ok(url) => url,
            Err(e) => {
                warn!(prefix = %prefix, error = %e, "Dropping asset");
                String::new()
            }
        }
    }

    async fn try_upload(
        &self,
        prefix: &str,
        event_id: &str,
        data: &str,
    ) -> Result<String, AssetError> {
        let asset = decode_data_uri(data, self.settings.max_bytes)?;
        let key = blob_key(prefix, event_id, asset.extension());

        timeout(
            self.settings.upload_timeout,
            self.blobs.put(&key, asset.bytes, &asset.mime),
        )
        .await
        .map_err(|_| AssetError::Timeout)?
        .map_err(|e| AssetError::Upload(e.to_string()))
    }
}
