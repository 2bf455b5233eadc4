//! Builds the persisted record from normalized input and uploaded assets.

use uuid::Uuid;

use crate::assets::ProcessedAssets;
use crate::models::{EventRecord, EventStatus, GalleryItem, Speaker, Sponsor};
use crate::normalize::NormalizedEvent;

/// Generate a new event identifier.
pub fn new_event_id() -> String {
    Uuid::new_v4().to_string()
}

/// Current time in milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Assemble the record to persist.
///
/// Entity images and gallery entries come from `assets`; a gallery entry whose
/// upload produced no URL is left out of the record.
pub fn build_record(
    event_id: &str,
    event: NormalizedEvent,
    assets: ProcessedAssets,
    now_ms: i64,
) -> EventRecord {
    let speakers = event
        .speakers
        .into_iter()
        .enumerate()
        .map(|(i, speaker)| Speaker {
            photo: assets.speaker_photos.get(i).cloned().unwrap_or_default(),
            ..speaker
        })
        .collect();

    let sponsors = event
        .sponsors
        .into_iter()
        .enumerate()
        .map(|(i, sponsor)| Sponsor {
            logo: assets.sponsor_logos.get(i).cloned().unwrap_or_default(),
            ..sponsor
        })
        .collect();

    let gallery = assets
        .gallery
        .into_iter()
        .zip(event.gallery_captions.into_iter().chain(std::iter::repeat(String::new())))
        .filter(|(url, _)| !url.is_empty())
        .map(|(url, caption)| GalleryItem { url, caption })
        .collect();

    EventRecord {
        event_id: event_id.to_string(),
        created_at: now_ms,
        updated_at: now_ms,
        status: EventStatus::Active,
        event_name: event.event_name,
        event_date: event.event_date,
        event_time: event.event_time,
        venue: event.venue,
        description: event.description,
        organizer: event.organizer,
        contact_email: event.contact_email.unwrap_or_default(),
        registration_url: event.registration_url.unwrap_or_default(),
        video_url: event.video_url,
        selected_template: event.template,
        hero_image: assets.hero_image,
        logo: assets.logo,
        speakers,
        sponsors,
        agenda: event.agenda,
        gallery,
    }
}
