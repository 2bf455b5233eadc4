//! Get Event Lambda - Handles GET /events and GET /events/{eventId}.
//!
//! With an `eventId` (path or query parameter) returns that record, otherwise
//! every stored record, newest first.

use lambda_http::{run, service_fn, Body, Error, Request, Response};
use shared::http::{error_for, error_response, json_response, preflight_response, request_param};
use shared::Error as EventError;
use shared::{record_store, EventList, RecordStore};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Application state shared across requests.
struct AppState {
    records: Arc<dyn RecordStore>,
}

impl AppState {
    async fn new() -> Result<Self, Error> {
        Ok(Self {
            records: record_store().await?,
        })
    }
}

async fn handler(state: Arc<AppState>, event: Request) -> Result<Response<Body>, Error> {
    match event.method().as_str() {
        "OPTIONS" => return preflight_response(),
        "GET" => {}
        _ => return error_response(405, "Method not allowed", None),
    }

    match request_param(&event, &["eventId", "id"]) {
        Some(event_id) => {
            info!(event_id = %event_id, "Fetching event");
            match state.records.get(&event_id).await {
                Ok(Some(record)) => json_response(200, &record),
                Ok(None) => {
                    error_for(&EventError::NotFound(format!("No event with id {}", event_id)))
                }
                Err(e) => {
                    error!(event_id = %event_id, error = %e, "Failed to fetch event");
                    error_for(&e)
                }
            }
        }
        None => match state.records.list().await {
            Ok(events) => {
                info!(count = events.len(), "Listing events");
                json_response(
                    200,
                    &EventList {
                        count: events.len(),
                        events,
                    },
                )
            }
            Err(e) => {
                error!(error = %e, "Failed to list events");
                error_for(&e)
            }
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let state = Arc::new(AppState::new().await?);

    run(service_fn(move |event| {
        let state = Arc::clone(&state);
        async move { handler(state, event).await }
    }))
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use lambda_http::RequestExt;
    use shared::records::build_record;
    use shared::{normalize_body, MemoryRecordStore, ProcessedAssets};
    use std::collections::HashMap;

    async fn seeded() -> (Arc<AppState>, Arc<MemoryRecordStore>) {
        let records = Arc::new(MemoryRecordStore::new());
        for (id, name, created_at) in [("a", "Alpha", 1), ("b", "Beta", 2)] {
            let body =
                serde_json::json!({"eventName": name, "eventDate": "2025-01-01"}).to_string();
            let event = normalize_body(body.as_bytes()).unwrap();
            let assets = ProcessedAssets::empty(&event.assets);
            records
                .create(&build_record(id, event, assets, created_at))
                .await
                .unwrap();
        }
        let state = Arc::new(AppState {
            records: records.clone(),
        });
        (state, records)
    }

    fn get(query: &[(&str, &str)]) -> Request {
        let params: HashMap<String, String> = query
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Request::default().with_query_string_parameters(params)
    }

    fn json_body(response: &Response<Body>) -> serde_json::Value {
        serde_json::from_slice(response.body().as_ref()).unwrap()
    }

    #[tokio::test]
    async fn test_get_single_event() {
        let (state, records) = seeded().await;

        let response = handler(state, get(&[("eventId", "a")])).await.unwrap();

        assert_eq!(response.status(), 200);
        let body = json_body(&response);
        assert_eq!(body["eventName"], "Alpha");
        assert_eq!(body["status"], "active");

        let stored = records.get("a").await.unwrap().unwrap();
        assert_eq!(body, serde_json::to_value(stored).unwrap());
    }

    #[tokio::test]
    async fn test_get_by_path_parameter() {
        let (state, _) = seeded().await;
        let request = Request::default()
            .with_path_parameters(HashMap::from([("eventId".to_string(), "b".to_string())]));

        let response = handler(state, request).await.unwrap();

        assert_eq!(json_body(&response)["eventName"], "Beta");
    }

    #[tokio::test]
    async fn test_unknown_event_is_404() {
        let (state, _) = seeded().await;

        let response = handler(state, get(&[("eventId", "nope")])).await.unwrap();

        assert_eq!(response.status(), 404);
        let body = json_body(&response);
        assert_eq!(body["error"], "Event not found");
        assert_eq!(body["details"], "Not found: No event with id nope");
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
    }

    #[tokio::test]
    async fn test_list_without_id() {
        let (state, _) = seeded().await;

        let response = handler(state, get(&[])).await.unwrap();

        assert_eq!(response.status(), 200);
        let body = json_body(&response);
        assert_eq!(body["count"], 2);
        assert_eq!(body["events"][0]["eventName"], "Beta");
        assert_eq!(body["events"][1]["eventName"], "Alpha");
    }
}
