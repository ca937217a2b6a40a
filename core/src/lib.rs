//! Client for the MixPay crypto payment gateway.
//!
//! # Overview
//! Three operations: create a one-time payment, look up a payment result,
//! and list settlement assets. Every gateway response is wrapped in the same
//! `{success, code, message, data, timestampMs}` envelope.
//!
//! # Design
//! - `MixPayClient` is stateless: `build_*` produces an `HttpRequest`,
//!   `parse_*` consumes an `HttpResponse`, so the I/O boundary is explicit.
//! - `MixPay` executes those requests with reqwest. Its futures are the
//!   cancellation handle; there is no retry, signing, or rate limiting.
//! - Failures split into transport errors (from reqwest, untouched) and a
//!   single structured `ApiError` for everything the gateway reports.

pub mod client;
pub mod envelope;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;

pub use client::{MixPayClient, DEFAULT_BASE_URL};
pub use error::{ApiError, Error, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::{MixPay, MixPayBuilder};
pub use types::{
    Asset, ChainAsset, CreateOneTimePaymentRequest, CreateOneTimePaymentResponse,
    GetPaymentResultRequest, ListSettlementAssetsRequest, PaymentResult, PaymentStatus,
};

pub use bytes::Bytes;
pub use rust_decimal::Decimal;
