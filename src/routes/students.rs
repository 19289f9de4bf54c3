//! Students API
//!
//! Routes under `/api/students`. Every route requires a bearer token; the
//! verified identity, never the payload, decides whose profile is touched.
//!
//! - `POST  /create-profile`    create the caller's profile (201)
//! - `GET   /profile`           the caller's profile, marking them online
//! - `PATCH /status`            `{ "isOnline": bool }`
//! - `GET   /peers/{stream}`    stream peers, `?limit=`
//! - `POST  /peers/by-skills`   `{ "skills": [..] }`, `?limit=`
//! - `POST  /sign-out`          revoke the caller's tokens, mark offline

use bytes::Bytes;
use http_body_util::{BodyExt, Full, Limited};
use hyper::body::{Body, Incoming};
use hyper::header::AUTHORIZATION;
use hyper::{Method, Request, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};

use super::views::{PeerView, ProfileView};
use super::{error_response, json_response};
use crate::auth::{authenticate, VerifiedIdentity};
use crate::profile::RawSubmission;
use crate::server::AppState;
use crate::types::{PeerlinkError, Result};

/// Path prefix handled here
pub const STUDENTS_PREFIX: &str = "/api/students";

/// Query string for peer listings
#[derive(Debug, Default, Deserialize)]
struct PeerQuery {
    limit: Option<String>,
}

/// Dispatch a request under `/api/students`
pub async fn handle_students_request(
    state: Arc<AppState>,
    req: Request<Incoming>,
) -> Response<Full<Bytes>> {
    match route(state, req).await {
        Ok(response) => response,
        Err(e) => {
            debug!("Students request failed: {} ({})", e, e.code());
            error_response(&e)
        }
    }
}

async fn route(state: Arc<AppState>, req: Request<Incoming>) -> Result<Response<Full<Bytes>>> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let sub_path = path.strip_prefix(STUDENTS_PREFIX).unwrap_or("");

    let auth_header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());
    let caller = authenticate(state.gate.as_ref(), auth_header).await?;

    match (method, sub_path) {
        (Method::POST, "/create-profile") => create_profile(&state, &caller, req).await,
        (Method::GET, "/profile") => get_profile(&state, &caller).await,
        (Method::PATCH, "/status") => update_status(&state, &caller, req).await,
        (Method::POST, "/sign-out") => sign_out(&state, &caller).await,
        (Method::POST, "/peers/by-skills") => peers_by_skills(&state, &caller, req).await,
        (Method::GET, p) if p.starts_with("/peers/") => {
            let raw_stream = &p["/peers/".len()..];
            let stream = urlencoding::decode(raw_stream)
                .map_err(|_| PeerlinkError::BadRequest("Invalid stream in path".to_string()))?
                .into_owned();
            peers_by_stream(&state, &caller, &stream, req.uri().query()).await
        }
        _ => Ok(json_response(
            StatusCode::NOT_FOUND,
            &json!({ "error": "Not Found", "path": path }),
        )),
    }
}

async fn create_profile(
    state: &AppState,
    caller: &VerifiedIdentity,
    req: Request<Incoming>,
) -> Result<Response<Full<Bytes>>> {
    let body = read_json(req, state.args.max_body_bytes).await?;
    let profile = state
        .profiles
        .create_profile(&RawSubmission::new(body), &caller.identity)
        .await?;

    Ok(json_response(
        StatusCode::CREATED,
        &json!({
            "message": "Student profile created successfully",
            "student": ProfileView::from(&profile),
        }),
    ))
}

async fn get_profile(state: &AppState, caller: &VerifiedIdentity) -> Result<Response<Full<Bytes>>> {
    let profile = state.profiles.touch(&caller.identity).await?;

    Ok(json_response(
        StatusCode::OK,
        &json!({
            "message": "Profile retrieved successfully",
            "student": ProfileView::from(&profile),
        }),
    ))
}

async fn update_status(
    state: &AppState,
    caller: &VerifiedIdentity,
    req: Request<Incoming>,
) -> Result<Response<Full<Bytes>>> {
    let body = read_json(req, state.args.max_body_bytes).await?;
    let is_online = body
        .get("isOnline")
        .and_then(Value::as_bool)
        .ok_or_else(|| PeerlinkError::validation("isOnline", "isOnline must be a boolean"))?;

    state.profiles.set_presence(&caller.identity, is_online).await?;

    Ok(json_response(
        StatusCode::OK,
        &json!({
            "message": "Status updated successfully",
            "isOnline": is_online,
        }),
    ))
}

async fn sign_out(state: &AppState, caller: &VerifiedIdentity) -> Result<Response<Full<Bytes>>> {
    state.gate.revoke_sessions(&caller.identity).await?;

    // Signing out without a profile is fine
    match state.profiles.set_presence(&caller.identity, false).await {
        Ok(()) | Err(PeerlinkError::NotFound(_)) => {}
        Err(e) => return Err(e),
    }
    info!("Signed out {}", caller.identity);

    Ok(json_response(
        StatusCode::OK,
        &json!({ "message": "Signed out successfully" }),
    ))
}

async fn peers_by_stream(
    state: &AppState,
    caller: &VerifiedIdentity,
    stream: &str,
    query: Option<&str>,
) -> Result<Response<Full<Bytes>>> {
    guard_complete_profile(state, caller).await?;
    let limit = parse_limit(query);

    let peers = state
        .matcher
        .match_by_stream(&caller.identity, stream, limit)
        .await?;
    info!("{} peers in stream '{}' for {}", peers.len(), stream, caller.identity);

    let views: Vec<PeerView> = peers.iter().map(PeerView::from).collect();
    Ok(json_response(
        StatusCode::OK,
        &json!({
            "message": "Peers retrieved successfully",
            "stream": stream,
            "total": views.len(),
            "peers": views,
        }),
    ))
}

async fn peers_by_skills(
    state: &AppState,
    caller: &VerifiedIdentity,
    req: Request<Incoming>,
) -> Result<Response<Full<Bytes>>> {
    guard_complete_profile(state, caller).await?;
    let limit = parse_limit(req.uri().query());
    let body = read_json(req, state.args.max_body_bytes).await?;

    let skills: Vec<String> = match body.get("skills") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => {
            return Err(PeerlinkError::validation("skills", "Skills array is required"));
        }
    };

    let ranked = state
        .matcher
        .match_by_skills(&caller.identity, &skills, limit)
        .await?;
    info!("{} skill peers for {}", ranked.len(), caller.identity);

    let views: Vec<PeerView> = ranked.iter().map(PeerView::from).collect();
    Ok(json_response(
        StatusCode::OK,
        &json!({
            "message": "Skill-based peers retrieved successfully",
            "searchSkills": skills,
            "total": views.len(),
            "peers": views,
        }),
    ))
}

async fn guard_complete_profile(state: &AppState, caller: &VerifiedIdentity) -> Result<()> {
    if state.args.require_complete_profile {
        state
            .profiles
            .require_complete_profile(&caller.identity)
            .await?;
    }
    Ok(())
}

/// `?limit=` as a page size. Anything that is not a non-negative integer
/// falls back to the default.
fn parse_limit(query: Option<&str>) -> Option<usize> {
    let query: PeerQuery = serde_urlencoded::from_str(query.unwrap_or("")).unwrap_or_default();
    query.limit.and_then(|l| l.trim().parse().ok())
}

/// Read a bounded JSON body
async fn read_json<B>(req: Request<B>, max_bytes: usize) -> Result<Value>
where
    B: Body,
    B::Error: std::error::Error + Send + Sync + 'static,
{
    let bytes = Limited::new(req.into_body(), max_bytes)
        .collect()
        .await
        .map_err(|e| PeerlinkError::BadRequest(format!("Failed to read request body: {}", e)))?
        .to_bytes();

    if bytes.is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_limit() {
        assert_eq!(parse_limit(None), None);
        assert_eq!(parse_limit(Some("limit=5")), Some(5));
        assert_eq!(parse_limit(Some("foo=1&limit=25")), Some(25));
        assert_eq!(parse_limit(Some("limit=abc")), None);
        assert_eq!(parse_limit(Some("limit=-3")), None);
        assert_eq!(parse_limit(Some("limit=0")), Some(0));
    }

    #[tokio::test]
    async fn test_read_json_limits() {
        let req = Request::new(Full::new(Bytes::from_static(br#"{"isOnline":true}"#)));
        let value = read_json(req, 1024).await.unwrap();
        assert_eq!(value["isOnline"], true);

        let req = Request::new(Full::new(Bytes::from(vec![b' '; 64])));
        let err = read_json(req, 16).await.unwrap_err();
        assert_eq!(err.code(), "BAD_REQUEST");

        let req = Request::new(Full::new(Bytes::from_static(b"{not json")));
        let err = read_json(req, 1024).await.unwrap_err();
        assert_eq!(err.code(), "BAD_REQUEST");

        let req = Request::new(Full::new(Bytes::new()));
        assert!(read_json(req, 1024).await.unwrap().is_object());
    }
}
