//! HMAC-SHA256 webhook signatures.
//!
//! The gateway signs every webhook it sends. Each request carries:
//!
//! - `x-webhook-timestamp`: the timestamp the gateway signed with
//! - `x-webhook-signature`: base64 HMAC-SHA256 of `timestamp + raw_body`
//!
//! The signature covers the exact request bytes, so verification must run on
//! the body as received, before any JSON parsing.
//!
//! # Example
//!
//! ```rust
//! use leazo_booking::client::auth::WebhookVerifier;
//!
//! let verifier = WebhookVerifier::new("secret");
//! let body = br#"{"data":{"order":{"order_id":"order_1"}}}"#;
//! let signature = verifier.sign("1700000000", body);
//!
//! assert!(verifier.verify(Some(&signature), Some("1700000000"), body).is_ok());
//! assert!(verifier.verify(Some(&signature), Some("1700000001"), body).is_err());
//! ```

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::Error;

type HmacSha256 = Hmac<Sha256>;

/// Verifier for gateway webhook signatures
#[derive(Clone)]
pub struct WebhookVerifier {
    secret: Vec<u8>,
}

impl std::fmt::Debug for WebhookVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookVerifier").finish_non_exhaustive()
    }
}

impl WebhookVerifier {
    /// Create a verifier keyed by the shared webhook secret
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
        }
    }

    fn mac(&self, timestamp: &str, body: &[u8]) -> HmacSha256 {
        let mut mac =
            HmacSha256::new_from_slice(&self.secret).expect("HMAC can take key of any size");
        mac.update(timestamp.as_bytes());
        mac.update(body);
        mac
    }

    /// Sign a body and return the base64-encoded signature
    ///
    /// This is what the gateway computes; useful for tests and replays.
    pub fn sign(&self, timestamp: &str, body: &[u8]) -> String {
        BASE64.encode(self.mac(timestamp, body).finalize().into_bytes())
    }

    /// Verify a webhook signature in constant time
    ///
    /// # Errors
    ///
    /// Returns [`Error::Signature`] if the signature or timestamp is
    /// missing, the signature is not valid base64, or it does not match.
    pub fn verify(
        &self,
        signature: Option<&str>,
        timestamp: Option<&str>,
        body: &[u8],
    ) -> Result<(), Error> {
        let signature = signature
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::Signature("missing signature".into()))?;
        let timestamp = timestamp
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::Signature("missing timestamp".into()))?;

        let supplied = BASE64
            .decode(signature)
            .map_err(|_| Error::Signature("signature is not valid base64".into()))?;

        self.mac(timestamp, body)
            .verify_slice(&supplied)
            .map_err(|_| Error::Signature("signature mismatch".into()))
    }
}

/// Header names the gateway uses for webhook authentication
#[derive(Debug, Clone)]
pub struct WebhookHeaders;

impl WebhookHeaders {
    /// Header name for the signature
    pub const SIGNATURE_HEADER: &'static str = "x-webhook-signature";
    /// Header name for the timestamp
    pub const TIMESTAMP_HEADER: &'static str = "x-webhook-timestamp";
}
