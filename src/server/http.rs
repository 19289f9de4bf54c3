//! HTTP server implementation
//!
//! Uses hyper http1 with TokioIo, one task per accepted connection.

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::auth::AuthGate;
use crate::config::Args;
use crate::routes::{self, students::STUDENTS_PREFIX};
use crate::services::{PeerMatcher, ProfileService};
use crate::store::ProfileStore;
use crate::types::PeerlinkError;

type BoxBody = http_body_util::combinators::BoxBody<Bytes, hyper::Error>;

/// Shared application state
pub struct AppState {
    pub args: Args,
    /// Profile persistence
    pub store: Arc<dyn ProfileStore>,
    /// Store backend name reported by the health endpoint
    pub store_backend: &'static str,
    /// Token verification
    pub gate: Arc<dyn AuthGate>,
    pub profiles: ProfileService,
    pub matcher: PeerMatcher,
    pub started_at: Instant,
}

impl AppState {
    /// Build the services around `store` using the configured limits and
    /// ranking
    pub fn new(
        args: Args,
        store: Arc<dyn ProfileStore>,
        store_backend: &'static str,
        gate: Arc<dyn AuthGate>,
    ) -> Self {
        let profiles = ProfileService::new(Arc::clone(&store));
        let matcher = PeerMatcher::new(Arc::clone(&store))
            .with_ranking(args.skill_ranking)
            .with_limits(args.peer_limit_default, args.peer_limit_max);

        Self {
            args,
            store,
            store_backend,
            gate,
            profiles,
            matcher,
            started_at: Instant::now(),
        }
    }
}

/// Bind the configured address and serve until the process exits
pub async fn run(state: Arc<AppState>) -> Result<(), PeerlinkError> {
    let listener = TcpListener::bind(state.args.listen).await?;

    info!(
        "Peerlink listening on {} as node {}",
        state.args.listen, state.args.node_id
    );

    if state.args.dev_mode {
        warn!("Development mode enabled - dev token secret accepted");
    }

    serve(listener, state).await
}

/// Accept loop over an already bound listener
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> Result<(), PeerlinkError> {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, addr, req).await }
                    });

                    if let Err(err) = http1::Builder::new()
                        .serve_connection(io, service)
                        .await
                    {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

/// Route incoming HTTP requests
async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> Result<Response<BoxBody>, hyper::Error> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    info!("[{}] {} {}", addr, method, path);

    let response = match (method, path.as_str()) {
        // CORS preflight
        (Method::OPTIONS, _) => preflight_response(),

        (Method::GET, "/api/health") => routes::health_check(Arc::clone(&state)).await,

        // Version info for deployment verification
        (Method::GET, "/version") => routes::version_info(),

        (_, p) if p == STUDENTS_PREFIX || p.starts_with("/api/students/") => {
            routes::handle_students_request(Arc::clone(&state), req).await
        }

        _ => not_found_response(&path),
    };

    Ok(to_boxed(response))
}

/// Convert a Full<Bytes> body to BoxBody
fn to_boxed(response: Response<Full<Bytes>>) -> Response<BoxBody> {
    response.map(|body| body.map_err(|never| match never {}).boxed())
}

/// CORS preflight response
fn preflight_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::OK)
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Headers", "Authorization, Content-Type")
        .header("Access-Control-Allow-Methods", "GET, POST, PATCH, OPTIONS")
        .body(Full::new(Bytes::new()))
        .unwrap()
}

/// Not found response
fn not_found_response(path: &str) -> Response<Full<Bytes>> {
    routes::json_response(
        StatusCode::NOT_FOUND,
        &serde_json::json!({
            "error": "Not Found",
            "path": path,
        }),
    )
}
