//! Authentication for Peerlink
//!
//! Provides:
//! - The `AuthGate` contract and bearer header parsing
//! - A JWT implementation for identity tokens from the external provider
//! - Session revocation per identity

pub mod gate;
pub mod jwt;

pub use gate::{authenticate, parse_bearer, AuthError, AuthGate, VerifiedIdentity};
pub use jwt::{GateKey, IdTokenClaims, JwtAuthGate, JwtGateConfig};
