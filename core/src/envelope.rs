//! Decoder for the `{success, code, message, data, timestampMs}` wrapper the
//! gateway puts around every response body.
//!
//! # Design
//! `data` is held as a `RawValue` and only interpreted once the envelope
//! reports success, so a failure envelope never has to match the caller's
//! result type. A body that is not an envelope at all is treated as a failure
//! whose code is the HTTP status.

use std::fmt;

use serde::de::value::MapAccessDeserializer;
use serde::de::{DeserializeOwned, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::value::RawValue;
use tracing::warn;

use crate::error::{ApiError, Result};
use crate::http::HttpResponse;
use crate::types::nullable;

/// The uniform response wrapper. Absent or `null` fields take their defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Envelope {
    pub success: bool,
    #[serde(deserialize_with = "nullable")]
    pub code: i64,
    #[serde(deserialize_with = "nullable")]
    pub message: String,
    pub data: Option<Box<RawValue>>,
    #[serde(deserialize_with = "nullable")]
    pub timestamp_ms: i64,
}

/// Decode a successful envelope's `data` into `T`.
///
/// A success envelope without `data` is decoded as JSON `null`, which only
/// succeeds for types that accept it (`Option<_>`, `()`).
pub fn decode<T: DeserializeOwned>(response: &HttpResponse) -> Result<T> {
    let data = open(response)?;
    let raw = data.as_deref().map_or("null", RawValue::get);
    Ok(serde_json::from_str(raw)?)
}

/// Accept a successful envelope without looking at its `data`.
pub fn check(response: &HttpResponse) -> Result<()> {
    open(response)?;
    Ok(())
}

/// An envelope that only deserializes from a JSON object. The derived impl
/// would also fill fields by position from an array.
struct ObjectEnvelope(Envelope);

impl<'de> Deserialize<'de> for ObjectEnvelope {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ObjectVisitor;

        impl<'de> Visitor<'de> for ObjectVisitor {
            type Value = ObjectEnvelope;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a response envelope object")
            }

            fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
                Envelope::deserialize(MapAccessDeserializer::new(map)).map(ObjectEnvelope)
            }
        }

        deserializer.deserialize_map(ObjectVisitor)
    }
}

fn open(response: &HttpResponse) -> Result<Option<Box<RawValue>>, ApiError> {
    let envelope = match serde_json::from_slice::<ObjectEnvelope>(&response.body) {
        Ok(ObjectEnvelope(envelope)) => envelope,
        Err(err) => {
            warn!(
                status = response.status,
                error = %err,
                "response body is not a gateway envelope"
            );
            Envelope {
                code: i64::from(response.status),
                message: reason_phrase(response.status).to_string(),
                ..Envelope::default()
            }
        }
    };

    if envelope.success {
        return Ok(envelope.data);
    }

    Err(ApiError {
        status_code: response.status,
        raw: response.body.clone(),
        code: envelope.code,
        message: envelope.message,
    })
}

/// Standard reason phrase for a status code, empty when the code has none.
pub fn reason_phrase(status: u16) -> &'static str {
    http::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("")
}
