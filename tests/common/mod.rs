//! Test harness: a live server over the in-memory store and an HS256 gate

#![allow(dead_code)]

use chrono::Utc;
use clap::Parser;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use peerlink::auth::{GateKey, IdTokenClaims, JwtAuthGate, JwtGateConfig};
use peerlink::config::Args;
use peerlink::server::{self, AppState};
use peerlink::store::MemoryProfileStore;

pub const SECRET: &str = "integration-secret-at-least-32-characters";

pub struct TestServer {
    pub addr: SocketAddr,
    pub store: Arc<MemoryProfileStore>,
}

/// HTTP response status and parsed JSON body (`Null` when empty)
pub struct TestResponse {
    pub status: u16,
    pub headers: String,
    pub body: Value,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::start_with(&[]).await
    }

    /// Start with extra command-line flags
    pub async fn start_with(flags: &[&str]) -> Self {
        let mut argv = vec!["peerlink", "--listen", "127.0.0.1:0", "--auth-jwt-secret", SECRET];
        argv.extend_from_slice(flags);
        let args = Args::try_parse_from(argv).expect("test args parse");

        let gate = Arc::new(
            JwtAuthGate::new(JwtGateConfig {
                key: GateKey::Hs256(SECRET.to_string()),
                issuer: None,
                audience: None,
            })
            .expect("gate"),
        );
        let store = Arc::new(MemoryProfileStore::new());
        let state = Arc::new(AppState::new(args, store.clone(), "memory", gate));

        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(server::serve(listener, state));

        Self { addr, store }
    }

    /// Fresh token for `identity`
    pub fn token(&self, identity: &str) -> String {
        sign(&claims(identity, 3600))
    }

    pub async fn request(
        &self,
        method: &str,
        path: &str,
        auth: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let body = body.map(|b| b.to_string()).unwrap_or_default();
        let mut raw = format!(
            "{method} {path} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\nContent-Type: application/json\r\nContent-Length: {}\r\n",
            self.addr,
            body.len()
        );
        if let Some(auth) = auth {
            raw.push_str(&format!("Authorization: {auth}\r\n"));
        }
        raw.push_str("\r\n");
        raw.push_str(&body);

        let mut stream = TcpStream::connect(self.addr).await.expect("connect");
        stream.write_all(raw.as_bytes()).await.expect("write");
        let mut buf = Vec::new();
        stream.read_to_end(&mut buf).await.expect("read");

        let text = String::from_utf8(buf).expect("utf8 response");
        let (head, payload) = text.split_once("\r\n\r\n").expect("header terminator");
        let status = head
            .split_whitespace()
            .nth(1)
            .and_then(|s| s.parse().ok())
            .expect("status code");
        let body = if payload.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(payload).expect("json body")
        };

        TestResponse {
            status,
            headers: head.to_lowercase(),
            body,
        }
    }

    /// Request authenticated as `identity`
    pub async fn as_user(
        &self,
        identity: &str,
        method: &str,
        path: &str,
        body: Option<Value>,
    ) -> TestResponse {
        let auth = format!("Bearer {}", self.token(identity));
        self.request(method, path, Some(&auth), body).await
    }
}

/// Claims for `identity` valid for `ttl_seconds` from now
pub fn claims(identity: &str, ttl_seconds: u64) -> IdTokenClaims {
    let now = Utc::now().timestamp() as u64;
    IdTokenClaims {
        sub: identity.to_string(),
        email: None,
        email_verified: false,
        iat: now,
        exp: now + ttl_seconds,
        iss: None,
        aud: None,
    }
}

/// HS256 token signed with the server's secret
pub fn sign(claims: &IdTokenClaims) -> String {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .expect("sign")
}

/// Nested submission for a student
pub fn submission(name: &str, email: &str, stream: &str, skills: &[&str]) -> Value {
    serde_json::json!({
        "personalInfo": { "fullName": name, "collegeEmail": email, "rollNumber": format!("R-{name}") },
        "academicDetails": { "stream": stream, "cohort": "2022", "currentYear": "2" },
        "skillsInterests": { "mainSkills": skills }
    })
}
