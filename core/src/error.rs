//! Error types for the MixPay client.
//!
//! # Design
//! Two tiers. Transport failures (connect, timeout, body read) come straight
//! from reqwest in `Error::Transport`. Everything the gateway reports, plus
//! bodies that are not a readable envelope at all, collapses into the single
//! `ApiError` shape; callers branch on `ApiError::code`, not on variants.

use std::borrow::Cow;

use bytes::Bytes;
use thiserror::Error;

/// Structured failure reported by (or synthesized for) the gateway.
///
/// When the body was a valid envelope, `code` and `message` come from it.
/// Otherwise `code` is the HTTP status and `message` its reason phrase.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "statusCode: {status_code}, raw: {}, code: {code}, message: {message}",
    String::from_utf8_lossy(.raw)
)]
pub struct ApiError {
    pub status_code: u16,
    /// The response body, byte for byte.
    pub raw: Bytes,
    pub code: i64,
    pub message: String,
}

impl ApiError {
    /// `raw` as text, with invalid UTF-8 replaced.
    pub fn raw_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.raw)
    }
}

/// Errors returned by `MixPayClient` parsers and `MixPay` operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The request never produced a response: connection, timeout, or body read.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The gateway answered with a failure envelope or an unreadable body.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A success envelope whose `data` did not match the expected shape.
    #[error("failed to decode response data: {0}")]
    Decode(#[from] serde_json::Error),

    /// The configured base URL is not a valid absolute URL.
    #[error("invalid base url: {0}")]
    Url(#[from] url::ParseError),
}

impl Error {
    /// The structured gateway error, if this is one.
    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            Error::Api(err) => Some(err),
            _ => None,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
