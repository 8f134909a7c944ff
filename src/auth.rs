//! Admin bearer credential verification.
//!
//! Verifies HS256-signed tokens (three dot-separated base64url segments:
//! header, payload, signature). The gateway only verifies credentials —
//! issuance lives elsewhere. Verification is a pure check with no side
//! effects and runs before any subprocess work.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::GatewayError;

type HmacSha256 = Hmac<Sha256>;

/// Claims carried by an admin credential.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminClaims {
    #[serde(default)]
    pub admin: bool,
    /// Expiry as seconds since the Unix epoch.
    pub exp: i64,
    /// Optional subject identifier, logged for audit only.
    #[serde(default)]
    pub sub: Option<String>,
}

/// Verifies `Authorization: Bearer <token>` headers against a shared secret.
#[derive(Clone)]
pub struct AuthGuard {
    secret: Vec<u8>,
}

impl AuthGuard {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Verify a bearer credential and return its claims.
    ///
    /// Recomputes the HMAC-SHA256 signature over `header.payload` and checks
    /// it in constant time, then requires `admin: true` and an unexpired
    /// `exp`. Every failure collapses to `GatewayError::Unauthenticated` so
    /// callers learn nothing about which check tripped.
    pub fn verify(&self, authorization: Option<&str>) -> crate::Result<AdminClaims> {
        let token = authorization
            .and_then(|h| h.strip_prefix("Bearer "))
            .ok_or(GatewayError::Unauthenticated)?;

        let (signing_input, signature_b64) = token
            .rsplit_once('.')
            .ok_or(GatewayError::Unauthenticated)?;

        // Exactly three segments: header.payload.signature
        let mut segments = signing_input.split('.');
        let _header_b64 = segments.next().ok_or(GatewayError::Unauthenticated)?;
        let payload_b64 = segments.next().ok_or(GatewayError::Unauthenticated)?;
        if segments.next().is_some() {
            return Err(GatewayError::Unauthenticated);
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| GatewayError::Unauthenticated)?;

        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|_| GatewayError::Unauthenticated)?;
        mac.update(signing_input.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| GatewayError::Unauthenticated)?;

        let payload = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| GatewayError::Unauthenticated)?;
        let claims: AdminClaims =
            serde_json::from_slice(&payload).map_err(|_| GatewayError::Unauthenticated)?;

        if !claims.admin {
            return Err(GatewayError::Unauthenticated);
        }

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| GatewayError::Unauthenticated)?
            .as_secs() as i64;
        if claims.exp <= now {
            return Err(GatewayError::Unauthenticated);
        }

        Ok(claims)
    }
}

/// Mint a signed token for tests. Lives here so route tests can build valid
/// credentials without duplicating the signing scheme.
#[cfg(test)]
pub(crate) fn mint_token(secret: &[u8], payload: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload_bytes = serde_json::to_vec(payload).expect("payload serializes");
    let payload_b64 = URL_SAFE_NO_PAD.encode(&payload_bytes);
    let signing_input = format!("{}.{}", header, payload_b64);

    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts any key length");
    mac.update(signing_input.as_bytes());
    let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    format!("{}.{}", signing_input, signature)
}
