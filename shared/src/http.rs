//! HTTP helpers for Lambda functions.
//!
//! Every response carries permissive CORS headers.

use lambda_http::http::response::Builder;
use lambda_http::{Body, Request, RequestExt, Response};
use serde::Serialize;

use crate::Error;

/// Error body returned to callers.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

fn builder(status: u16) -> Builder {
    Response::builder()
        .status(status)
        .header("access-control-allow-origin", "*")
        .header("access-control-allow-methods", "GET, POST, OPTIONS")
        .header(
            "access-control-allow-headers",
            "Content-Type, Authorization, X-Requested-With",
        )
}

/// Create a JSON response with the given status code and data.
pub fn json_response<T: Serialize>(
    status: u16,
    data: &T,
) -> Result<Response<Body>, lambda_http::Error> {
    Ok(builder(status)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(data)?))?)
}

/// Create a JSON error response.
pub fn error_response(
    status: u16,
    message: impl Into<String>,
    details: Option<String>,
) -> Result<Response<Body>, lambda_http::Error> {
    json_response(
        status,
        &ErrorBody {
            error: message.into(),
            details,
        },
    )
}

/// JSON error response for a domain error.
pub fn error_for(err: &Error) -> Result<Response<Body>, lambda_http::Error> {
    error_response(err.status_code(), err.public_message(), Some(err.to_string()))
}

pub fn text_response(
    status: u16,
    body: impl Into<String>,
) -> Result<Response<Body>, lambda_http::Error> {
    Ok(builder(status)
        .header("content-type", "text/plain; charset=utf-8")
        .body(Body::from(body.into()))?)
}

pub fn html_response(status: u16, html: String) -> Result<Response<Body>, lambda_http::Error> {
    Ok(builder(status)
        .header("content-type", "text/html; charset=utf-8")
        .header("cache-control", "public, max-age=300")
        .body(Body::from(html))?)
}

/// Answer a CORS preflight.
pub fn preflight_response() -> Result<Response<Body>, lambda_http::Error> {
    Ok(builder(204).body(Body::Empty)?)
}

/// First non-blank value among the given names, looking at path parameters
/// before query string parameters.
pub fn request_param(event: &Request, names: &[&str]) -> Option<String> {
    let path = event.path_parameters();
    let query = event.query_string_parameters();

    names
        .iter()
        .find_map(|name| {
            path.first(name)
                .or_else(|| query.first(name))
                .map(str::trim)
                .filter(|v| !v.is_empty())
        })
        .map(str::to_string)
}
