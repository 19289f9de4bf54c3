//! HTTP routes for Peerlink

pub mod health;
pub mod students;
pub mod views;

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Serialize;
use tracing::{error, warn};

use crate::types::PeerlinkError;

pub use health::{health_check, version_info};
pub use students::handle_students_request;

/// JSON response with CORS headers
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    let (status, body) = match serde_json::to_vec(body) {
        Ok(bytes) => (status, Bytes::from(bytes)),
        Err(e) => {
            error!("Failed to serialize response: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Bytes::from_static(br#"{"error":"Internal server error","code":"SERVER_ERROR"}"#),
            )
        }
    };

    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(Full::new(body))
        .unwrap()
}

/// Error body: `{ error, code, field? }`
#[derive(Serialize)]
struct ErrorBody<'a> {
    error: String,
    code: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<&'a str>,
}

/// Map an error to its status and client-safe body
pub fn error_response(err: &PeerlinkError) -> Response<Full<Bytes>> {
    match err {
        PeerlinkError::Database(detail) => warn!("Database failure: {}", detail),
        PeerlinkError::Config(detail) | PeerlinkError::Internal(detail) => {
            error!("Internal failure: {}", detail)
        }
        _ => {}
    }

    let body = ErrorBody {
        error: err.public_message(),
        code: err.code(),
        field: err.field(),
    };
    json_response(err.status_code(), &body)
}
