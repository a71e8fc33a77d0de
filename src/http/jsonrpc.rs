//! Minimal JSON-RPC envelope parsing.
//!
//! Only the method name is ever consumed. `id` and `params` are kept as raw
//! JSON so they can be logged verbatim but are never interpreted.
//!
//! Any body a lenient JSON reader accepts must still reach the method check:
//! - invalid UTF-8 is replaced with U+FFFD before parsing
//! - keys are visited in document order and the last occurrence wins
//! - field names match case-insensitively (`Method` is `method`)
//! - a `null` field leaves the previous value untouched

use std::fmt;

use serde::de::{self, Deserializer, IgnoredAny, MapAccess, Visitor};
use serde::Deserialize;
use serde_json::value::RawValue;

/// Parsed view of a JSON-RPC request body.
#[derive(Debug, Default)]
pub struct RpcEnvelope {
    /// Protocol version tag (normally "2.0"). Not enforced.
    pub jsonrpc: Option<String>,

    /// Request identifier, opaque.
    pub id: Option<Box<RawValue>>,

    /// Remote procedure name.
    pub method: Option<String>,

    /// Parameters, opaque.
    pub params: Option<Box<RawValue>>,
}

impl RpcEnvelope {
    /// Try to parse a request body as a single JSON-RPC object.
    ///
    /// Returns `None` for empty bodies, batches, scalars, malformed or
    /// trailing data, and for a `method` that is neither a string nor null.
    pub fn parse(body: &[u8]) -> Option<Self> {
        let text = String::from_utf8_lossy(body);
        serde_json::from_str(&text).ok()
    }

    /// The method name; absent or null methods read as the empty string.
    pub fn method(&self) -> &str {
        self.method.as_deref().unwrap_or_default()
    }
}

impl<'de> Deserialize<'de> for RpcEnvelope {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(EnvelopeVisitor)
    }
}

struct EnvelopeVisitor;

impl<'de> Visitor<'de> for EnvelopeVisitor {
    type Value = RpcEnvelope;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON-RPC request object")
    }

    // A bare `null` body decodes to an empty envelope.
    fn visit_unit<E: de::Error>(self) -> Result<RpcEnvelope, E> {
        Ok(RpcEnvelope::default())
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<RpcEnvelope, A::Error> {
        let mut envelope = RpcEnvelope::default();

        while let Some(key) = map.next_key::<String>()? {
            if key.eq_ignore_ascii_case("method") {
                if let Some(method) = map.next_value::<Option<String>>()? {
                    envelope.method = Some(method);
                }
            } else if key.eq_ignore_ascii_case("jsonrpc") {
                // A mistyped version tag does not disqualify the request.
                if let serde_json::Value::String(tag) = map.next_value::<serde_json::Value>()? {
                    envelope.jsonrpc = Some(tag);
                }
            } else if key.eq_ignore_ascii_case("id") {
                envelope.id = Some(map.next_value()?);
            } else if key.eq_ignore_ascii_case("params") {
                envelope.params = Some(map.next_value()?);
            } else {
                map.next_value::<IgnoredAny>()?;
            }
        }

        Ok(envelope)
    }
}
