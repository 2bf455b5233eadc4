//! Request normalization.
//!
//! Two generations of the ingestion payload are in circulation. The first used
//! `title`/`date`/`location`/`banner`, the second `eventName`/`eventDate`/
//! `venue`/`bannerBase64`. Both are accepted here and mapped once onto
//! [`NormalizedEvent`]; nothing past this module sees the inbound names.
//!
//! Image slots are read leniently. A value of the wrong JSON type is treated
//! as an absent image, never as a malformed request.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use validator::Validate;

use crate::assets::AssetInput;
use crate::models::{
    AgendaItem, Speaker, Sponsor, Template, MAX_AGENDA_ITEMS, MAX_GALLERY_ITEMS, MAX_SPEAKERS,
    MAX_SPONSORS,
};
use crate::{Error, Result};

/// Inbound payload, accepting field names from both schema generations.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundEvent {
    #[serde(alias = "title")]
    pub event_name: Option<String>,
    #[serde(alias = "date")]
    pub event_date: Option<String>,
    #[serde(alias = "time")]
    pub event_time: Option<String>,
    #[serde(alias = "location")]
    pub venue: Option<String>,
    #[serde(alias = "eventDescription")]
    pub description: Option<String>,
    #[serde(alias = "organizerName")]
    pub organizer: Option<String>,
    #[serde(alias = "email")]
    pub contact_email: Option<String>,
    #[serde(alias = "registrationLink")]
    pub registration_url: Option<String>,
    #[serde(alias = "youtubeUrl")]
    pub video_url: Option<String>,
    /// `"1"` or `1`
    #[serde(alias = "template")]
    pub selected_template: Option<serde_json::Value>,
    #[serde(alias = "banner", default, deserialize_with = "string_or_absent")]
    pub banner_base64: Option<String>,
    #[serde(alias = "logo", default, deserialize_with = "string_or_absent")]
    pub logo_base64: Option<String>,
    pub speakers: Option<Vec<InboundSpeaker>>,
    pub sponsors: Option<Vec<InboundSponsor>>,
    #[serde(alias = "schedule")]
    pub agenda: Option<Vec<InboundAgendaItem>>,
    #[serde(alias = "images", default, deserialize_with = "gallery_items")]
    pub gallery: Vec<InboundGalleryItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundSpeaker {
    pub name: Option<String>,
    #[serde(alias = "title")]
    pub role: Option<String>,
    pub bio: Option<String>,
    #[serde(alias = "photo", default, deserialize_with = "string_or_absent")]
    pub photo_base64: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundSponsor {
    pub name: Option<String>,
    #[serde(alias = "level")]
    pub tier: Option<String>,
    #[serde(alias = "url")]
    pub website: Option<String>,
    #[serde(alias = "logo", default, deserialize_with = "string_or_absent")]
    pub logo_base64: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundAgendaItem {
    pub time: Option<String>,
    pub title: Option<String>,
    pub speaker: Option<String>,
    pub description: Option<String>,
}

/// Gallery entries arrive either as bare data URIs or as objects.
/// Anything else lands in `Other` and is dropped.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum InboundGalleryItem {
    Data(String),
    Item {
        #[serde(
            alias = "imageBase64",
            alias = "data",
            default,
            deserialize_with = "string_or_absent"
        )]
        image: Option<String>,
        #[serde(default, deserialize_with = "string_or_absent")]
        caption: Option<String>,
    },
    Other(serde_json::Value),
}

/// Keep string values, read any other JSON type as absent.
fn string_or_absent<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(data) => Some(data),
        _ => None,
    })
}

/// A gallery that is not an array is read as empty.
fn gallery_items<'de, D>(
    deserializer: D,
) -> std::result::Result<Vec<InboundGalleryItem>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

/// Canonical, validated event input.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct NormalizedEvent {
    #[validate(length(min = 1, max = 200))]
    pub event_name: String,
    pub event_date: String,
    pub event_time: String,
    pub venue: String,
    #[validate(length(max = 5000))]
    pub description: String,
    pub organizer: String,
    #[validate(email)]
    pub contact_email: Option<String>,
    #[validate(url)]
    pub registration_url: Option<String>,
    pub video_url: String,
    pub template: Template,
    /// Speakers with empty `photo`; images travel in `assets`
    pub speakers: Vec<Speaker>,
    /// Sponsors with empty `logo`; images travel in `assets`
    pub sponsors: Vec<Sponsor>,
    pub agenda: Vec<AgendaItem>,
    /// Captions, index-aligned with `assets.gallery`
    pub gallery_captions: Vec<String>,
    pub assets: AssetInput,
}

/// Parse and normalize a raw request body.
pub fn normalize_body(body: &[u8]) -> Result<NormalizedEvent> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(Error::Validation("Missing request body".to_string()));
    }

    let value: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| Error::Validation(format!("Invalid JSON: {}", e)))?;
    if !value.is_object() {
        return Err(Error::Validation("Request body must be a JSON object".to_string()));
    }

    let inbound: InboundEvent = serde_json::from_value(value)
        .map_err(|e| Error::Validation(format!("Invalid event data: {}", e)))?;

    normalize(inbound)
}

/// Map an inbound payload onto the canonical shape and validate it.
pub fn normalize(inbound: InboundEvent) -> Result<NormalizedEvent> {
    let event_name = text(inbound.event_name);
    if event_name.is_empty() {
        return Err(Error::Validation("eventName is required".to_string()));
    }

    let event_date = text(inbound.event_date);
    if event_date.is_empty() {
        return Err(Error::Validation("eventDate is required".to_string()));
    }
    if !is_iso_date(&event_date) {
        return Err(Error::Validation(format!(
            "eventDate must be formatted as YYYY-MM-DD, got {}",
            event_date
        )));
    }

    let template = parse_template(inbound.selected_template.as_ref())?;

    let (speakers, speaker_photos): (Vec<_>, Vec<_>) = inbound
        .speakers
        .unwrap_or_default()
        .into_iter()
        .filter_map(|s| {
            let name = text(s.name);
            (!name.is_empty()).then(|| {
                (
                    Speaker {
                        name,
                        role: text(s.role),
                        bio: text(s.bio),
                        photo: String::new(),
                    },
                    optional(s.photo_base64),
                )
            })
        })
        .take(MAX_SPEAKERS)
        .unzip();

    let (sponsors, sponsor_logos): (Vec<_>, Vec<_>) = inbound
        .sponsors
        .unwrap_or_default()
        .into_iter()
        .filter_map(|s| {
            let name = text(s.name);
            (!name.is_empty()).then(|| {
                (
                    Sponsor {
                        name,
                        tier: text(s.tier),
                        website: text(s.website),
                        logo: String::new(),
                    },
                    optional(s.logo_base64),
                )
            })
        })
        .take(MAX_SPONSORS)
        .unzip();

    let agenda: Vec<AgendaItem> = inbound
        .agenda
        .unwrap_or_default()
        .into_iter()
        .filter_map(|a| {
            let title = text(a.title);
            (!title.is_empty()).then(|| AgendaItem {
                time: text(a.time),
                title,
                speaker: text(a.speaker),
                description: text(a.description),
            })
        })
        .take(MAX_AGENDA_ITEMS)
        .collect();

    let (gallery, gallery_captions): (Vec<_>, Vec<_>) = inbound
        .gallery
        .into_iter()
        .filter_map(|item| match item {
            InboundGalleryItem::Data(data) => optional(Some(data)).map(|d| (d, String::new())),
            InboundGalleryItem::Item { image, caption } => {
                optional(image).map(|d| (d, text(caption)))
            }
            InboundGalleryItem::Other(_) => None,
        })
        .take(MAX_GALLERY_ITEMS)
        .unzip();

    let normalized = NormalizedEvent {
        event_name,
        event_date,
        event_time: text(inbound.event_time),
        venue: text(inbound.venue),
        description: text(inbound.description),
        organizer: text(inbound.organizer),
        contact_email: optional(inbound.contact_email),
        registration_url: optional(inbound.registration_url),
        video_url: text(inbound.video_url),
        template,
        speakers,
        sponsors,
        agenda,
        gallery_captions,
        assets: AssetInput {
            banner: optional(inbound.banner_base64),
            logo: optional(inbound.logo_base64),
            gallery,
            speaker_photos,
            sponsor_logos,
        },
    };

    normalized.validate().map_err(|errors| {
        let mut fields: Vec<String> = errors
            .field_errors()
            .keys()
            .map(|field| field.to_string())
            .collect();
        fields.sort();
        Error::Validation(format!("Invalid value for: {}", fields.join(", ")))
    })?;

    Ok(normalized)
}

fn text(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

fn optional(value: Option<String>) -> Option<String> {
    Some(text(value)).filter(|v| !v.is_empty())
}

fn is_iso_date(value: &str) -> bool {
    value.len() == 10 && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

fn parse_template(value: Option<&serde_json::Value>) -> Result<Template> {
    let selector = match value {
        None | Some(serde_json::Value::Null) => return Ok(Template::default()),
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => return Ok(Template::default()),
        Some(serde_json::Value::String(s)) => s.trim().to_string(),
        Some(serde_json::Value::Number(n)) => n.to_string(),
        Some(other) => other.to_string(),
    };

    Template::from_selector(&selector).ok_or_else(|| {
        Error::Validation(format!(
            "selectedTemplate must be one of 1, 2 or 3, got {}",
            selector
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize_json(json: serde_json::Value) -> Result<NormalizedEvent> {
        normalize_body(json.to_string().as_bytes())
    }

    #[test]
    fn test_current_schema() {
        let event = normalize_json(serde_json::json!({
            "eventName": "  RustConf ",
            "eventDate": "2025-09-02",
            "venue": "Montreal",
            "eventDescription": "Talks",
            "selectedTemplate": "2",
            "bannerBase64": "data:image/png;base64,AAAA",
            "speakers": [{
                "name": "Ana",
                "role": "Keynote",
                "photoBase64": "data:image/png;base64,AAAA"
            }],
            "sponsors": [{"name": "Acme", "tier": "gold"}],
            "agenda": [{"time": "09:00", "title": "Opening"}],
            "gallery": [{"imageBase64": "data:image/png;base64,AAAA", "caption": "Venue"}]
        }))
        .unwrap();

        assert_eq!(event.event_name, "RustConf");
        assert_eq!(event.venue, "Montreal");
        assert_eq!(event.description, "Talks");
        assert_eq!(event.template, Template::Modern);
        assert_eq!(event.assets.banner.as_deref(), Some("data:image/png;base64,AAAA"));
        assert_eq!(event.speakers[0].role, "Keynote");
        assert_eq!(event.speakers[0].photo, "");
        assert_eq!(event.assets.speaker_photos.len(), 1);
        assert_eq!(event.sponsors[0].tier, "gold");
        assert_eq!(event.agenda[0].title, "Opening");
        assert_eq!(event.gallery_captions, vec!["Venue".to_string()]);
    }

    #[test]
    fn test_legacy_schema() {
        let event = normalize_json(serde_json::json!({
            "title": "Meetup",
            "date": "2024-12-31",
            "location": "Berlin",
            "template": 3,
            "banner": "data:image/jpeg;base64,AAAA",
            "speakers": [{"name": "Bo", "title": "Host", "photo": ""}],
            "sponsors": [{"name": "Initech", "level": "silver", "url": "https://initech.example"}],
            "schedule": [{"time": "18:00", "title": "Doors"}],
            "images": ["data:image/png;base64,AAAA"]
        }))
        .unwrap();

        assert_eq!(event.event_name, "Meetup");
        assert_eq!(event.event_date, "2024-12-31");
        assert_eq!(event.venue, "Berlin");
        assert_eq!(event.template, Template::Minimal);
        assert!(event.assets.banner.is_some());
        assert_eq!(event.speakers[0].role, "Host");
        assert_eq!(event.assets.speaker_photos, vec![None]);
        assert_eq!(event.sponsors[0].website, "https://initech.example");
        assert_eq!(event.agenda.len(), 1);
        assert_eq!(event.assets.gallery.len(), 1);
        assert_eq!(event.gallery_captions, vec![String::new()]);
    }

    #[test]
    fn test_missing_name_is_rejected() {
        let err = normalize_json(serde_json::json!({"eventName": "   ", "eventDate": "2025-01-01"}))
            .unwrap_err();
        assert!(matches!(err, Error::Validation(msg) if msg.contains("eventName")));
    }

    #[test]
    fn test_bad_date_is_rejected() {
        for date in ["2025-13-01", "01/02/2025", "2025-1-1", ""] {
            let result = normalize_json(serde_json::json!({"eventName": "X", "eventDate": date}));
            assert!(matches!(result, Err(Error::Validation(_))), "{date}");
        }
    }

    #[test]
    fn test_template_selector() {
        let base = |t: serde_json::Value| {
            normalize_json(serde_json::json!({
                "eventName": "X",
                "eventDate": "2025-01-01",
                "selectedTemplate": t
            }))
        };
        assert_eq!(base(serde_json::json!("1")).unwrap().template, Template::Classic);
        assert_eq!(base(serde_json::json!(2)).unwrap().template, Template::Modern);
        assert_eq!(base(serde_json::Value::Null).unwrap().template, Template::Classic);
        assert!(matches!(base(serde_json::json!("7")), Err(Error::Validation(_))));
        assert!(matches!(base(serde_json::json!(true)), Err(Error::Validation(_))));
    }

    #[test]
    fn test_lists_are_capped_and_blank_entries_dropped() {
        let speakers: Vec<_> = (0..8)
            .map(|i| serde_json::json!({"name": format!("S{i}")}))
            .chain(std::iter::once(serde_json::json!({"name": ""})))
            .collect();
        let sponsors: Vec<_> = (0..12)
            .map(|i| serde_json::json!({"name": format!("P{i}")}))
            .collect();

        let event = normalize_json(serde_json::json!({
            "eventName": "X",
            "eventDate": "2025-01-01",
            "speakers": speakers,
            "sponsors": sponsors,
        }))
        .unwrap();

        assert_eq!(event.speakers.len(), MAX_SPEAKERS);
        assert_eq!(event.assets.speaker_photos.len(), MAX_SPEAKERS);
        assert_eq!(event.sponsors.len(), MAX_SPONSORS);
        assert_eq!(event.sponsors[9].name, "P9");
    }

    #[test]
    fn test_contact_fields_are_validated() {
        let bad_email = normalize_json(serde_json::json!({
            "eventName": "X", "eventDate": "2025-01-01", "contactEmail": "nope"
        }));
        assert!(matches!(bad_email, Err(Error::Validation(msg)) if msg.contains("contact_email")));

        let ok = normalize_json(serde_json::json!({
            "eventName": "X", "eventDate": "2025-01-01",
            "contactEmail": "", "registrationUrl": "https://tickets.example.com/x"
        }))
        .unwrap();
        assert_eq!(ok.contact_email, None);
        assert_eq!(ok.registration_url.as_deref(), Some("https://tickets.example.com/x"));
    }

    #[test]
    fn test_malformed_bodies() {
        assert!(matches!(normalize_body(b""), Err(Error::Validation(_))));
        assert!(matches!(normalize_body(b"{not json"), Err(Error::Validation(_))));
        assert!(matches!(normalize_body(b"[1,2]"), Err(Error::Validation(_))));
        assert!(matches!(
            normalize_body(br#"{"eventName": 5, "eventDate": "2025-01-01"}"#),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_wrongly_typed_images_are_dropped() {
        let event = normalize_json(serde_json::json!({
            "eventName": "Conf",
            "eventDate": "2025-01-01",
            "bannerBase64": {},
            "logoBase64": 42,
            "speakers": [{"name": "Ana", "photoBase64": true}],
            "sponsors": [{"name": "Acme", "logoBase64": ["x"]}],
            "gallery": [
                123,
                "data:image/png;base64,AAAA",
                null,
                {"imageBase64": 7, "caption": "Lost"},
                {"imageBase64": "data:image/png;base64,AAAA", "caption": "Stage"}
            ]
        }))
        .unwrap();

        assert_eq!(event.assets.banner, None);
        assert_eq!(event.assets.logo, None);
        assert_eq!(event.assets.speaker_photos, vec![None]);
        assert_eq!(event.assets.sponsor_logos, vec![None]);
        assert_eq!(event.assets.gallery.len(), 2);
        assert_eq!(event.gallery_captions, vec![String::new(), "Stage".to_string()]);
    }

    #[test]
    fn test_gallery_that_is_not_a_list_is_ignored() {
        let event = normalize_json(serde_json::json!({
            "eventName": "Conf", "eventDate": "2025-01-01", "images": "data:image/png;base64,AAAA"
        }))
        .unwrap();
        assert!(event.assets.gallery.is_empty());
        assert!(event.gallery_captions.is_empty());
    }

    #[test]
    fn test_overlong_name_is_rejected() {
        let result = normalize_json(serde_json::json!({
            "eventName": "x".repeat(201), "eventDate": "2025-01-01"
        }));
        assert!(matches!(result, Err(Error::Validation(_))));
    }
}
