use axum::http::HeaderMap;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "x-signature";

/// Checks the provider's `X-Signature` header against an HMAC-SHA256 of the raw
/// request body.
#[derive(Clone)]
pub struct SignatureVerifier {
    secret: String,
}

impl SignatureVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self { secret: secret.into() }
    }

    pub fn sign(&self, body: &[u8]) -> Option<String> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes()).ok()?;
        mac.update(body);
        Some(hex::encode(mac.finalize().into_bytes()))
    }

    /// Fails closed: absent header, unreadable header or an empty secret all
    /// count as a mismatch.
    pub fn verify(&self, headers: &HeaderMap, body: &[u8]) -> bool {
        if self.secret.is_empty() {
            tracing::warn!("webhook secret not configured, rejecting signed call");
            return false;
        }

        let provided = match headers.get(SIGNATURE_HEADER).and_then(|h| h.to_str().ok()) {
            Some(v) => v.trim(),
            None => return false,
        };

        match self.sign(body) {
            Some(expected) => expected.as_bytes().ct_eq(provided.as_bytes()).into(),
            None => false,
        }
    }
}
