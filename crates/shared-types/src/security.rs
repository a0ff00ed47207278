//! # Authentication Codec
//!
//! The single implementation of message and request authentication used by
//! every service.
//!
//! ## Security Properties
//!
//! - **HMAC-SHA256 Signatures**: keyed by one shared secret, base64-encoded.
//! - **Constant-Time Verification**: comparisons go through `Mac::verify_slice`.
//! - **Time-Bounded Validity**: timestamps more than [`MAX_CLOCK_SKEW_SECS`]
//!   away from local time (in either direction) are rejected.
//!
//! ## Canonical Forms
//!
//! - Requests sign the text `"{service}:{timestamp}:{body}"` where `body` is
//!   the exact request body bytes.
//! - Envelopes sign [`Envelope::canonical_bytes`].
//!
//! No replay cache is kept: a captured request stays valid for the whole
//! skew window.

use crate::envelope::Envelope;
use crate::errors::AuthError;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::fmt;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

type HmacSha256 = Hmac<Sha256>;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Maximum accepted distance between a timestamp and local time (seconds).
pub const MAX_CLOCK_SKEW_SECS: u64 = 300;

/// Header carrying the caller's service name.
pub const HEADER_SERVICE_NAME: &str = "X-Service-Name";

/// Header carrying the request timestamp (integer seconds).
pub const HEADER_TIMESTAMP: &str = "X-Timestamp";

/// Header carrying the base64 request signature.
pub const HEADER_SIGNATURE: &str = "X-Signature";

/// Secret used when none is configured. Rejected by production validation.
pub const DEV_SHARED_SECRET: &str = "a2a-dev-shared-secret-change-me";

// =============================================================================
// TIME
// =============================================================================

/// Returns the current Unix timestamp in seconds.
pub fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Checks that `timestamp` lies within `max_skew` seconds of `now`.
pub fn validate_timestamp(timestamp: u64, now: u64, max_skew: u64) -> Result<(), AuthError> {
    if timestamp.abs_diff(now) > max_skew {
        return Err(AuthError::StaleTimestamp {
            timestamp,
            now,
            max_skew,
        });
    }
    Ok(())
}

// =============================================================================
// AUTH HEADERS
// =============================================================================

/// The three request headers produced by [`AuthCodec::auth_headers`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthHeaders {
    pub service_name: String,
    pub timestamp: String,
    pub signature: String,
}

impl AuthHeaders {
    /// `(header name, value)` pairs, ready to attach to an HTTP request.
    pub fn pairs(&self) -> [(&'static str, &str); 3] {
        [
            (HEADER_SERVICE_NAME, self.service_name.as_str()),
            (HEADER_TIMESTAMP, self.timestamp.as_str()),
            (HEADER_SIGNATURE, self.signature.as_str()),
        ]
    }
}

// =============================================================================
// CODEC
// =============================================================================

/// Signs and verifies requests and envelopes with a shared secret.
///
/// Cloning is cheap; the secret is reference-counted.
#[derive(Clone)]
pub struct AuthCodec {
    secret: Arc<[u8]>,
    max_skew: u64,
}

impl fmt::Debug for AuthCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthCodec")
            .field("secret", &"<redacted>")
            .field("max_skew", &self.max_skew)
            .finish()
    }
}

impl AuthCodec {
    /// Creates a codec with the default 300 second skew window.
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: Arc::from(secret.as_ref()),
            max_skew: MAX_CLOCK_SKEW_SECS,
        }
    }

    /// Overrides the accepted clock skew.
    pub fn with_max_skew(mut self, max_skew: u64) -> Self {
        self.max_skew = max_skew;
        self
    }

    pub fn max_skew(&self) -> u64 {
        self.max_skew
    }

    fn keyed(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.secret).expect("HMAC can take key of any size")
    }

    /// Base64 HMAC-SHA256 of `bytes`.
    pub fn sign_bytes(&self, bytes: &[u8]) -> String {
        let mut mac = self.keyed();
        mac.update(bytes);
        BASE64.encode(mac.finalize().into_bytes())
    }

    /// Constant-time check of a base64 signature over `bytes`.
    ///
    /// Malformed base64 is simply a mismatch.
    pub fn verify_bytes(&self, bytes: &[u8], signature: &str) -> bool {
        let Ok(raw) = BASE64.decode(signature.trim()) else {
            return false;
        };
        let mut mac = self.keyed();
        mac.update(bytes);
        mac.verify_slice(&raw).is_ok()
    }

    fn request_message(service: &str, timestamp: &str, body: &[u8]) -> Vec<u8> {
        let mut message = Vec::with_capacity(service.len() + timestamp.len() + body.len() + 2);
        message.extend_from_slice(service.as_bytes());
        message.push(b':');
        message.extend_from_slice(timestamp.as_bytes());
        message.push(b':');
        message.extend_from_slice(body);
        message
    }

    /// Signs `"{service}:{timestamp}:{body}"`.
    pub fn sign(&self, service: &str, timestamp: &str, body: &[u8]) -> String {
        self.sign_bytes(&Self::request_message(service, timestamp, body))
    }

    /// Verifies a request signature. Returns false on any mismatch.
    pub fn verify(&self, service: &str, timestamp: &str, signature: &str, body: &[u8]) -> bool {
        self.verify_bytes(&Self::request_message(service, timestamp, body), signature)
    }

    /// Produces auth headers for a request sent now.
    pub fn auth_headers(&self, service: &str, body: &[u8]) -> AuthHeaders {
        self.auth_headers_at(service, body, current_timestamp())
    }

    /// Produces auth headers for a request sent at `timestamp`.
    pub fn auth_headers_at(&self, service: &str, body: &[u8], timestamp: u64) -> AuthHeaders {
        let timestamp = timestamp.to_string();
        let signature = self.sign(service, &timestamp, body);
        AuthHeaders {
            service_name: service.to_string(),
            timestamp,
            signature,
        }
    }

    /// Authenticates an incoming request from its raw header values.
    ///
    /// Returns the caller's service name on success.
    pub fn verify_headers(
        &self,
        service: Option<&str>,
        timestamp: Option<&str>,
        signature: Option<&str>,
        body: &[u8],
        now: u64,
    ) -> Result<String, AuthError> {
        let (Some(service), Some(timestamp), Some(signature)) = (service, timestamp, signature)
        else {
            return Err(AuthError::MissingHeaders);
        };

        let ts: u64 = timestamp
            .trim()
            .parse()
            .map_err(|_| AuthError::InvalidTimestamp(timestamp.to_string()))?;
        validate_timestamp(ts, now, self.max_skew)?;

        if !self.verify(service, timestamp, signature, body) {
            return Err(AuthError::InvalidSignature);
        }
        Ok(service.to_string())
    }

    /// Signature over the envelope's canonical bytes.
    pub fn sign_envelope(&self, envelope: &Envelope) -> String {
        self.sign_bytes(&envelope.canonical_bytes())
    }

    /// Attaches a signature to the envelope.
    pub fn seal(&self, envelope: &mut Envelope) {
        envelope.signature = Some(self.sign_envelope(envelope));
    }

    /// Verifies signature and freshness of an envelope.
    ///
    /// Stale envelopes are rejected whether or not the signature matches.
    pub fn verify_envelope(&self, envelope: &Envelope, now: u64) -> Result<(), AuthError> {
        let signature = envelope
            .signature
            .as_deref()
            .ok_or(AuthError::MissingSignature)?;
        envelope.verify_freshness(now, self.max_skew)?;
        if !self.verify_bytes(&envelope.canonical_bytes(), signature) {
            return Err(AuthError::InvalidSignature);
        }
        Ok(())
    }
}
