//! Create Event Lambda - Handles POST /events.
//!
//! Normalizes the submitted event, uploads its images under a time budget,
//! and stores the record with a create-if-absent write. Image problems never
//! fail the request; the record is written with empty image URLs instead.

use lambda_http::{run, service_fn, Body, Error, Request, Response};
use shared::http::{error_for, error_response, json_response, preflight_response};
use shared::records::{new_event_id, now_millis};
use shared::{
    build_record, normalize_body, AssetPipeline, Clients, CreateEventResponse, RecordStore,
};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Application state shared across requests.
struct AppState {
    pipeline: AssetPipeline,
    records: Arc<dyn RecordStore>,
    event_page_base_url: String,
    new_id: fn() -> String,
}

impl AppState {
    async fn new() -> Result<Self, Error> {
        let clients = Clients::shared().await?;

        Ok(Self {
            pipeline: clients.asset_pipeline(),
            records: Arc::clone(&clients.records),
            event_page_base_url: clients.config.event_page_base_url.clone(),
            new_id: new_event_id,
        })
    }
}

async fn handler(state: Arc<AppState>, event: Request) -> Result<Response<Body>, Error> {
    match event.method().as_str() {
        "OPTIONS" => return preflight_response(),
        "POST" => {}
        _ => return error_response(405, "Method not allowed", None),
    }

    let normalized = match normalize_body(event.body().as_ref()) {
        Ok(normalized) => normalized,
        Err(e) => {
            warn!(error = %e, "Rejected event payload");
            return error_for(&e);
        }
    };

    let event_id = (state.new_id)();
    info!(event_id = %event_id, event_name = %normalized.event_name, "Creating event");

    // The record is written only after asset processing has settled.
    let assets = state.pipeline.process(&event_id, &normalized.assets).await;
    let record = build_record(&event_id, normalized, assets, now_millis());

    if let Err(e) = state.records.create(&record).await {
        error!(event_id = %event_id, error = %e, "Failed to store event");
        return error_for(&e);
    }

    info!(event_id = %event_id, has_banner = !record.hero_image.is_empty(), "Event created");

    let event_url = format!("{}/events/{}", state.event_page_base_url, event_id);
    json_response(
        201,
        &CreateEventResponse {
            message: "Event created successfully".to_string(),
            preview_url: format!("{}?preview=true", event_url),
            event_url,
            event_id,
        },
    )
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
