//! Request and response DTOs for the MixPay gateway.
//!
//! # Design
//! Optional request fields are `Option<_>`: `None` is left out of the encoded
//! request, `Some(v)` is always sent, even when `v` is `false`, `0`, or empty.
//! The gateway treats an absent field differently from an explicit value.
//!
//! Response records default every field so a sparse or partially `null`
//! payload still decodes.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// Prefix of the hosted payment page; the short code is appended.
pub const PAYMENT_LINK_BASE: &str = "https://mixpay.me/code/";

/// Treat an explicit JSON `null` the same as an absent field.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Input for `POST /v1/one_time_payment`.
///
/// The first five fields are required by the gateway but are not checked
/// locally.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOneTimePaymentRequest {
    pub payee_id: String,
    pub quote_asset_id: String,
    pub quote_amount: Decimal,
    pub settlement_asset_id: String,
    pub order_id: String,

    /// Reject payments that do not match the quote exactly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict_mode: Option<bool>,
    /// Force the asset the payer must use.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_asset_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
    /// Lifetime of the payment code, relative to creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expire_seconds: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settlement_memo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_return_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
    /// Absolute expiry as a unix timestamp in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expired_timestamp: Option<i64>,
}

impl CreateOneTimePaymentRequest {
    pub fn new(
        payee_id: impl Into<String>,
        quote_asset_id: impl Into<String>,
        quote_amount: Decimal,
        settlement_asset_id: impl Into<String>,
        order_id: impl Into<String>,
    ) -> Self {
        Self {
            payee_id: payee_id.into(),
            quote_asset_id: quote_asset_id.into(),
            quote_amount,
            settlement_asset_id: settlement_asset_id.into(),
            order_id: order_id.into(),
            ..Self::default()
        }
    }
}

/// Short code returned for a newly created payment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateOneTimePaymentResponse {
    #[serde(deserialize_with = "nullable")]
    pub code: String,
    #[serde(deserialize_with = "nullable")]
    pub code_url: String,
}

impl CreateOneTimePaymentResponse {
    /// Hosted payment page for this code.
    pub fn payment_link(&self) -> String {
        format!("{PAYMENT_LINK_BASE}{}", self.code)
    }
}

/// Lookup keys for `GET /v1/payments_result`.
///
/// Nothing enforces that a key is set; an empty request is sent as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetPaymentResultRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payee_id: Option<String>,
}

impl GetPaymentResultRequest {
    pub fn by_trace_id(trace_id: impl Into<String>) -> Self {
        Self {
            trace_id: Some(trace_id.into()),
            ..Self::default()
        }
    }

    /// Order ids are only unique per payee, so both are sent.
    pub fn by_order_id(order_id: impl Into<String>, payee_id: impl Into<String>) -> Self {
        Self {
            order_id: Some(order_id.into()),
            payee_id: Some(payee_id.into()),
            ..Self::default()
        }
    }
}

/// Lifecycle state of a payment as reported by the gateway.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Unpaid,
    Pending,
    Success,
    Failed,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Flat payment record from `GET /v1/payments_result`.
///
/// Amounts are kept as the gateway's strings. `raw` holds the complete
/// response body for fields not modelled here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PaymentResult {
    #[serde(skip)]
    pub raw: String,
    #[serde(deserialize_with = "nullable")]
    pub status: PaymentStatus,
    #[serde(deserialize_with = "nullable")]
    pub quote_amount: String,
    #[serde(deserialize_with = "nullable")]
    pub quote_symbol: String,
    #[serde(deserialize_with = "nullable")]
    pub quote_asset_id: String,
    #[serde(deserialize_with = "nullable")]
    pub payment_amount: String,
    #[serde(deserialize_with = "nullable")]
    pub payment_symbol: String,
    #[serde(deserialize_with = "nullable")]
    pub payment_asset_id: String,
    #[serde(deserialize_with = "nullable")]
    pub payee: String,
    #[serde(deserialize_with = "nullable")]
    pub payee_id: String,
    #[serde(deserialize_with = "nullable")]
    pub payee_mixin_number: String,
    #[serde(deserialize_with = "nullable")]
    pub payee_avatar_url: String,
    #[serde(deserialize_with = "nullable")]
    pub txid: String,
    /// Sent as either a timestamp or a formatted string.
    pub date: serde_json::Value,
    #[serde(deserialize_with = "nullable")]
    pub surplus_amount: String,
    #[serde(deserialize_with = "nullable")]
    pub surplus_status: String,
    #[serde(deserialize_with = "nullable")]
    pub confirmations: i64,
    #[serde(deserialize_with = "nullable")]
    pub payable_amount: String,
    #[serde(deserialize_with = "nullable")]
    pub failure_code: String,
    #[serde(deserialize_with = "nullable")]
    pub failure_reason: String,
    #[serde(deserialize_with = "nullable")]
    pub return_to: String,
    #[serde(deserialize_with = "nullable")]
    pub trace_id: String,
}

impl PaymentResult {
    pub fn is_paid(&self) -> bool {
        self.status == PaymentStatus::Success
    }
}

/// A settleable asset and the quote range it accepts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Asset {
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub symbol: String,
    #[serde(deserialize_with = "nullable")]
    pub icon_url: String,
    #[serde(deserialize_with = "nullable")]
    pub asset_id: String,
    #[serde(deserialize_with = "nullable")]
    pub is_asset: bool,
    #[serde(deserialize_with = "nullable")]
    pub network: String,
    #[serde(deserialize_with = "nullable")]
    pub is_available: bool,
    #[serde(deserialize_with = "nullable")]
    pub quote_symbol: String,
    #[serde(deserialize_with = "nullable")]
    pub min_quote_amount: Decimal,
    #[serde(deserialize_with = "nullable")]
    pub max_quote_amount: Decimal,
    #[serde(deserialize_with = "nullable")]
    pub chain_asset: ChainAsset,
}

/// The on-chain asset an `Asset` is denominated in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChainAsset {
    #[serde(deserialize_with = "nullable")]
    pub id: String,
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub symbol: String,
    #[serde(deserialize_with = "nullable")]
    pub icon_url: String,
}

/// Filter for `GET /v1/setting/settlement_assets`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSettlementAssetsRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payee_id: Option<String>,
    /// Asset the quote amount is expressed in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote_asset_id: Option<String>,
    /// Amount of `quote_asset_id`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote_amount: Option<Decimal>,
}

impl ListSettlementAssetsRequest {
    pub fn for_payee(payee_id: impl Into<String>) -> Self {
        Self {
            payee_id: Some(payee_id.into()),
            ..Self::default()
        }
    }

    pub fn with_quote(mut self, quote_asset_id: impl Into<String>, quote_amount: Decimal) -> Self {
        self.quote_asset_id = Some(quote_asset_id.into());
        self.quote_amount = Some(quote_amount);
        self
    }

    /// The quote pair, if it takes part in the filter: a non-empty asset id
    /// together with a strictly positive amount.
    pub fn quote(&self) -> Option<(&str, Decimal)> {
        let asset_id = self.quote_asset_id.as_deref().filter(|id| !id.is_empty())?;
        let amount = self.quote_amount.filter(|amount| *amount > Decimal::ZERO)?;
        Some((asset_id, amount))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn payment_link_appends_code() {
        let resp = CreateOneTimePaymentResponse {
            code: "abc".to_string(),
            code_url: "https://x".to_string(),
        };
        assert_eq!(resp.payment_link(), "https://mixpay.me/code/abc");
    }

    #[test]
    fn create_response_reads_camel_case() {
        let resp: CreateOneTimePaymentResponse =
            serde_json::from_str(r#"{"code":"abc","codeUrl":"mixin://pay/abc"}"#).unwrap();
        assert_eq!(resp.code, "abc");
        assert_eq!(resp.code_url, "mixin://pay/abc");
    }

    #[test]
    fn payment_status_falls_back_to_unknown() {
        let result: PaymentResult =
            serde_json::from_str(r#"{"status":"refunded","confirmations":3}"#).unwrap();
        assert_eq!(result.status, PaymentStatus::Unknown);
        assert_eq!(result.confirmations, 3);
        assert!(!result.is_paid());
    }

    #[test]
    fn payment_result_tolerates_nulls_and_missing_fields() {
        let result: PaymentResult = serde_json::from_str(
            r#"{"status":"success","txid":null,"failureCode":null,"date":1700000000}"#,
        )
        .unwrap();
        assert!(result.is_paid());
        assert_eq!(result.txid, "");
        assert_eq!(result.failure_code, "");
        assert_eq!(result.date, serde_json::json!(1700000000));
        assert_eq!(result.raw, "");
    }

    #[test]
    fn asset_reads_decimal_bounds_from_strings_and_numbers() {
        let asset: Asset = serde_json::from_str(
            r#"{
                "name":"Tether USD","symbol":"USDT","assetId":"usdt",
                "isAvailable":true,"minQuoteAmount":"0.000001","maxQuoteAmount":50000,
                "chainAsset":{"id":"eth","name":"Ether","symbol":"ETH","iconUrl":"https://i/eth.png"}
            }"#,
        )
        .unwrap();
        assert_eq!(asset.min_quote_amount, dec("0.000001"));
        assert_eq!(asset.max_quote_amount, dec("50000"));
        assert_eq!(asset.chain_asset.symbol, "ETH");
        assert!(asset.is_available);
        assert!(!asset.is_asset);
    }

    #[test]
    fn quote_requires_id_and_positive_amount() {
        let base = ListSettlementAssetsRequest::default();
        assert_eq!(base.quote(), None);

        let ok = base.clone().with_quote("usd", dec("12.5"));
        assert_eq!(ok.quote(), Some(("usd", dec("12.5"))));

        assert_eq!(base.clone().with_quote("usd", Decimal::ZERO).quote(), None);
        assert_eq!(base.clone().with_quote("usd", dec("-1")).quote(), None);
        assert_eq!(base.clone().with_quote("", dec("1")).quote(), None);

        let id_only = ListSettlementAssetsRequest {
            quote_asset_id: Some("usd".to_string()),
            ..ListSettlementAssetsRequest::default()
        };
        assert_eq!(id_only.quote(), None);
    }

    #[test]
    fn create_request_new_leaves_options_unset() {
        let req = CreateOneTimePaymentRequest::new("payee", "usd", dec("10"), "usdt", "order-1");
        assert_eq!(req.payee_id, "payee");
        assert!(req.strict_mode.is_none());
        assert!(req.expire_seconds.is_none());
        assert!(req.callback_url.is_none());
    }
}
