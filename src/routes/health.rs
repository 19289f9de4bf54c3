//! Health and version endpoints
//!
//! `/api/health` pings the profile store; it answers 200 when the store is
//! reachable and 503 otherwise, with the same body shape either way.

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Serialize;
use std::sync::Arc;

use super::json_response;
use crate::server::AppState;

/// Health response
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// `ok` or `degraded`
    pub status: &'static str,
    pub message: &'static str,
    /// Service version
    pub version: &'static str,
    /// Uptime in seconds
    pub uptime: u64,
    /// Current timestamp
    pub timestamp: String,
    /// Operating mode
    pub mode: &'static str,
    /// Node identifier
    pub node_id: String,
    pub store: StoreHealth,
}

/// Profile store connectivity
#[derive(Serialize)]
pub struct StoreHealth {
    /// `mongodb` or `memory`
    pub backend: &'static str,
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Handle `/api/health`
pub async fn health_check(state: Arc<AppState>) -> Response<Full<Bytes>> {
    let ping = state.store.ping().await;

    let (status, message, http_status) = if ping.is_ok() {
        ("ok", "Peerlink API is running", StatusCode::OK)
    } else {
        ("degraded", "Profile store unreachable", StatusCode::SERVICE_UNAVAILABLE)
    };

    let response = HealthResponse {
        status,
        message,
        version: env!("CARGO_PKG_VERSION"),
        uptime: state.started_at.elapsed().as_secs(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        mode: if state.args.dev_mode {
            "development"
        } else {
            "production"
        },
        node_id: state.args.node_id.to_string(),
        store: StoreHealth {
            backend: state.store_backend,
            connected: ping.is_ok(),
            error: ping.err().map(|e| e.public_message()),
        },
    };

    json_response(http_status, &response)
}

/// Version information for deployment verification
#[derive(Serialize)]
pub struct VersionResponse {
    /// Cargo package version
    pub version: &'static str,
    /// Git commit hash (short)
    pub commit: &'static str,
    /// Git commit hash (full)
    pub commit_full: &'static str,
    /// Build timestamp
    pub build_time: &'static str,
    /// Service name
    pub service: &'static str,
}

/// Handle `/version`
pub fn version_info() -> Response<Full<Bytes>> {
    let response = VersionResponse {
        version: env!("CARGO_PKG_VERSION"),
        commit: option_env!("GIT_COMMIT_SHORT").unwrap_or("unknown"),
        commit_full: option_env!("GIT_COMMIT_FULL").unwrap_or("unknown"),
        build_time: option_env!("BUILD_TIMESTAMP").unwrap_or("unknown"),
        service: "peerlink",
    };

    json_response(StatusCode::OK, &response)
}
