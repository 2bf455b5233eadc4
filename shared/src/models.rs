//! Shared data models.

use serde::{Deserialize, Serialize};

/// Maximum number of speakers kept on a record.
pub const MAX_SPEAKERS: usize = 5;
/// Maximum number of sponsors kept on a record.
pub const MAX_SPONSORS: usize = 10;
/// Maximum number of agenda entries kept on a record.
pub const MAX_AGENDA_ITEMS: usize = 20;
/// Maximum number of gallery images kept on a record.
pub const MAX_GALLERY_ITEMS: usize = 10;

/// Lifecycle state of an event. Only `active` exists today.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    #[default]
    Active,
}

/// Page layout used by the renderer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Template {
    #[default]
    #[serde(rename = "1")]
    Classic,
    #[serde(rename = "2")]
    Modern,
    #[serde(rename = "3")]
    Minimal,
}

impl Template {
    /// Parse a selector such as `"2"`.
    pub fn from_selector(selector: &str) -> Option<Self> {
        match selector.trim() {
            "1" => Some(Template::Classic),
            "2" => Some(Template::Modern),
            "3" => Some(Template::Minimal),
            _ => None,
        }
    }

    pub fn selector(&self) -> &'static str {
        match self {
            Template::Classic => "1",
            Template::Modern => "2",
            Template::Minimal => "3",
        }
    }
}

/// Persisted event record, keyed by `event_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub event_id: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub status: EventStatus,
    pub event_name: String,
    pub event_date: String,
    #[serde(default)]
    pub event_time: String,
    #[serde(default)]
    pub venue: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub organizer: String,
    #[serde(default)]
    pub contact_email: String,
    #[serde(default)]
    pub registration_url: String,
    #[serde(default)]
    pub video_url: String,
    #[serde(default)]
    pub selected_template: Template,
    /// Banner URL, empty when no banner was uploaded
    #[serde(default)]
    pub hero_image: String,
    #[serde(default)]
    pub logo: String,
    #[serde(default)]
    pub speakers: Vec<Speaker>,
    #[serde(default)]
    pub sponsors: Vec<Sponsor>,
    #[serde(default)]
    pub agenda: Vec<AgendaItem>,
    #[serde(default)]
    pub gallery: Vec<GalleryItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Speaker {
    pub name: String,
    pub role: String,
    pub bio: String,
    pub photo: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Sponsor {
    pub name: String,
    pub tier: String,
    pub website: String,
    pub logo: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgendaItem {
    pub time: String,
    pub title: String,
    pub speaker: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GalleryItem {
    pub url: String,
    pub caption: String,
}

/// Body of a successful ingestion.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventResponse {
    pub message: String,
    pub event_id: String,
    pub event_url: String,
    pub preview_url: String,
}

/// Body of a listing.
#[derive(Debug, Serialize)]
pub struct EventList {
    pub events: Vec<EventRecord>,
    pub count: usize,
}
