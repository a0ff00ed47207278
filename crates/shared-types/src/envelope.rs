//! # Message Envelope
//!
//! The signed, addressed unit exchanged between services.
//!
//! ## Properties
//!
//! - **Identity**: every envelope carries a fresh UUID v4 `id`.
//! - **Addressing**: `sender` and `recipient` are service names.
//! - **Integrity**: the signature covers the canonical serialization of
//!   `(id, sender, recipient, payload, timestamp)`. Changing any of those
//!   fields after signing invalidates the signature.
//! - **Dispatch**: the payload's `type` entry names the message kind. The
//!   string form only exists on the wire; inside a service it is parsed into
//!   [`MessageKind`] before dispatch.

use crate::errors::{AuthError, KindError, PayloadError};
use crate::security::validate_timestamp;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Payload key holding the wire name of the message kind.
pub const TYPE_KEY: &str = "type";

/// JSON object carried by an envelope.
pub type Payload = Map<String, Value>;

/// The signed, addressed message unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Unique message id (UUID v4, string form).
    pub id: String,

    /// Name of the sending service.
    pub sender: String,

    /// Name of the receiving service.
    pub recipient: String,

    /// Message body. Contains a `type` entry naming the message kind.
    pub payload: Payload,

    /// Unix timestamp (seconds) at creation.
    pub timestamp: u64,

    /// Base64 HMAC-SHA256 over [`Envelope::canonical_bytes`]. Absent until sealed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl Envelope {
    /// Creates an unsigned envelope with a fresh id.
    pub fn new(
        sender: impl Into<String>,
        recipient: impl Into<String>,
        payload: Payload,
        timestamp: u64,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            sender: sender.into(),
            recipient: recipient.into(),
            payload,
            timestamp,
            signature: None,
        }
    }

    /// Returns true once a signature has been attached.
    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }

    /// Rejects envelopes created more than `max_skew` seconds away from `now`.
    pub fn verify_freshness(&self, now: u64, max_skew: u64) -> Result<(), AuthError> {
        validate_timestamp(self.timestamp, now, max_skew)
    }

    /// Raw `type` entry of the payload, if present and a string.
    pub fn message_type(&self) -> Option<&str> {
        self.payload.get(TYPE_KEY).and_then(Value::as_str)
    }

    /// Parses the payload's `type` entry into a [`MessageKind`].
    pub fn kind(&self) -> Result<MessageKind, KindError> {
        match self.message_type() {
            Some(raw) => raw.parse(),
            None => Err(KindError::Missing),
        }
    }

    /// Deserializes a single payload field.
    pub fn field<T: DeserializeOwned>(&self, key: &str) -> Result<T, PayloadError> {
        let value = self
            .payload
            .get(key)
            .ok_or_else(|| PayloadError::MissingField(key.to_string()))?;
        serde_json::from_value(value.clone()).map_err(|e| PayloadError::InvalidField {
            field: key.to_string(),
            reason: e.to_string(),
        })
    }

    /// Deserializes the whole payload (the `type` entry is ignored by
    /// structs that do not declare it).
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, PayloadError> {
        serde_json::from_value(Value::Object(self.payload.clone()))
            .map_err(|e| PayloadError::Malformed(e.to_string()))
    }

    /// Deterministic byte form of the signed fields.
    ///
    /// Object keys are emitted in sorted order at every depth with no
    /// insignificant whitespace, so two parties holding equal envelopes
    /// always produce identical bytes regardless of map insertion order.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut out = String::with_capacity(128);
        out.push('{');
        write_string("id", &mut out);
        out.push(':');
        write_string(&self.id, &mut out);
        out.push(',');
        write_string("payload", &mut out);
        out.push(':');
        write_object(&self.payload, &mut out);
        out.push(',');
        write_string("recipient", &mut out);
        out.push(':');
        write_string(&self.recipient, &mut out);
        out.push(',');
        write_string("sender", &mut out);
        out.push(':');
        write_string(&self.sender, &mut out);
        out.push(',');
        write_string("timestamp", &mut out);
        out.push(':');
        out.push_str(&self.timestamp.to_string());
        out.push('}');
        out.into_bytes()
    }
}

// =============================================================================
// CANONICAL JSON
// =============================================================================

fn write_value(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => write_string(s, out),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => write_object(map, out),
    }
}

fn write_object(map: &Map<String, Value>, out: &mut String) {
    let mut keys: Vec<&String> = map.keys().collect();
    keys.sort();
    out.push('{');
    for (i, key) in keys.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_string(key, out);
        out.push(':');
        if let Some(v) = map.get(key) {
            write_value(v, out);
        }
    }
    out.push('}');
}

fn write_string(s: &str, out: &mut String) {
    // serde_json's string escaping is already deterministic.
    match serde_json::to_string(s) {
        Ok(escaped) => out.push_str(&escaped),
        Err(_) => {
            out.push('"');
            out.push_str(s);
            out.push('"');
        }
    }
}

// =============================================================================
// MESSAGE KINDS
// =============================================================================

/// Closed set of message kinds understood by the research services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MessageKind {
    /// Open a research session (aggregation).
    StartResearchSession,
    /// Run a web search (search). May name a `callback_service`.
    PerformSearch,
    /// Extract insights from search results (knowledge).
    ExtractInsights,
    /// Score source credibility (knowledge).
    AnalyzeCredibility,
    /// Detect trend keywords (knowledge).
    IdentifyTrends,
    /// Add results and insights to a session (aggregation).
    AggregateResults,
    /// Produce the final report for a session (aggregation).
    GenerateReport,
    /// Final report delivered back to the requester.
    ReportReady,
}

impl MessageKind {
    /// Every kind, in workflow order.
    pub const ALL: [MessageKind; 8] = [
        MessageKind::StartResearchSession,
        MessageKind::PerformSearch,
        MessageKind::ExtractInsights,
        MessageKind::AnalyzeCredibility,
        MessageKind::IdentifyTrends,
        MessageKind::AggregateResults,
        MessageKind::GenerateReport,
        MessageKind::ReportReady,
    ];

    /// Wire name carried in the payload's `type` entry.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::StartResearchSession => "start_web_research_session",
            MessageKind::PerformSearch => "perform_search",
            MessageKind::ExtractInsights => "extract_web_insights",
            MessageKind::AnalyzeCredibility => "analyze_source_credibility",
            MessageKind::IdentifyTrends => "identify_research_trends",
            MessageKind::AggregateResults => "aggregate_web_results",
            MessageKind::GenerateReport => "generate_web_report",
            MessageKind::ReportReady => "web_report_ready",
        }
    }

    /// Builds a payload tagged with this kind from a JSON object body.
    ///
    /// Non-object bodies are stored under a `data` key.
    pub fn payload(self, body: Value) -> Payload {
        let mut payload = match body {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                let mut map = Map::new();
                map.insert("data".to_string(), other);
                map
            }
        };
        payload.insert(TYPE_KEY.to_string(), Value::String(self.as_str().to_string()));
        payload
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageKind {
    type Err = KindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MessageKind::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| KindError::Unknown(s.to_string()))
    }
}
