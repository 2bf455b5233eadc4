//! Render Event Lambda - Serves the public HTML page of an event.
//!
//! The identifier comes from the `eventId` path parameter or the `eventId` /
//! `id` query parameter. `?template=` overrides the stored layout.

use lambda_http::{run, service_fn, Body, Error, Request, Response};
use shared::http::{html_response, preflight_response, request_param, text_response};
use shared::{record_store, render_page, RecordStore, Template};
use std::sync::Arc;
use tracing::{error, info, warn};
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
        "GET" | "HEAD" => {}
        _ => return text_response(405, "Method not allowed"),
    }

    let Some(event_id) = request_param(&event, &["eventId", "id"]) else {
        return text_response(400, "Missing eventId");
    };

    let record = match state.records.get(&event_id).await {
        Ok(Some(record)) => record,
        Ok(None) => {
            warn!(event_id = %event_id, "Render requested for unknown event");
            return text_response(404, "Event not found");
        }
        Err(e) => {
            error!(event_id = %event_id, error = %e, "Failed to fetch event");
            return text_response(500, "Internal server error");
        }
    };

    let template = request_param(&event, &["template"])
        .and_then(|selector| Template::from_selector(&selector))
        .unwrap_or(record.selected_template);

    info!(event_id = %event_id, template = template.selector(), "Rendering event");

    html_response(200, render_page(&record, template))
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
