//! Stateless request builder and response parser for the MixPay gateway.
//!
//! # Design
//! `MixPayClient` holds only a `base_url`. Each operation is split into a
//! `build_*` method that produces an `HttpRequest` and a `parse_*` method that
//! consumes an `HttpResponse`. `MixPay` runs the round-trip with reqwest, but
//! any host can execute the request and hand back the response.

use std::collections::BTreeMap;

use crate::envelope;
use crate::error::Result;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{
    Asset, CreateOneTimePaymentRequest, CreateOneTimePaymentResponse, GetPaymentResultRequest,
    ListSettlementAssetsRequest, PaymentResult,
};

pub const DEFAULT_BASE_URL: &str = "https://api.mixpay.me";

pub const ONE_TIME_PAYMENT_PATH: &str = "/v1/one_time_payment";
pub const PAYMENTS_RESULT_PATH: &str = "/v1/payments_result";
pub const SETTLEMENT_ASSETS_PATH: &str = "/v1/setting/settlement_assets";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Synchronous, stateless client for the MixPay gateway.
///
/// Builds `HttpRequest` values and parses `HttpResponse` values without
/// touching the network.
#[derive(Debug, Clone)]
pub struct MixPayClient {
    base_url: String,
}

impl Default for MixPayClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl MixPayClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_create_one_time_payment(&self, input: &CreateOneTimePaymentRequest) -> HttpRequest {
        let mut form = Params::default();
        form.set("payeeId", &input.payee_id);
        form.set("quoteAmount", input.quote_amount);
        form.set("quoteAssetId", &input.quote_asset_id);
        form.set("settlementAssetId", &input.settlement_asset_id);
        form.set("orderId", &input.order_id);

        form.set_opt("strictMode", input.strict_mode);
        form.set_opt("paymentAssetId", input.payment_asset_id.as_ref());
        form.set_opt("remark", input.remark.as_ref());
        form.set_opt("expireSeconds", input.expire_seconds);
        form.set_opt("traceId", input.trace_id.as_ref());
        form.set_opt("settlementMemo", input.settlement_memo.as_ref());
        form.set_opt("returnTo", input.return_to.as_ref());
        form.set_opt("failedReturnTo", input.failed_return_to.as_ref());
        form.set_opt("callbackUrl", input.callback_url.as_ref());
        form.set_opt("expiredTimestamp", input.expired_timestamp);

        HttpRequest {
            method: HttpMethod::Post,
            url: format!("{}{ONE_TIME_PAYMENT_PATH}", self.base_url),
            headers: vec![("content-type".to_string(), FORM_CONTENT_TYPE.to_string())],
            body: Some(form.encode()),
        }
    }

    pub fn build_get_payment_result(&self, input: &GetPaymentResultRequest) -> HttpRequest {
        let mut query = Params::default();
        query.set_opt("traceId", input.trace_id.as_ref());
        query.set_opt("orderId", input.order_id.as_ref());
        query.set_opt("payeeId", input.payee_id.as_ref());
        self.get(PAYMENTS_RESULT_PATH, &query)
    }

    /// `None` lists every settlement asset. A quote asset id without a
    /// positive amount is dropped from the query rather than rejected.
    pub fn build_list_settlement_assets(&self, input: Option<&ListSettlementAssetsRequest>) -> HttpRequest {
        let mut query = Params::default();
        if let Some(filter) = input {
            query.set_opt("payeeId", filter.payee_id.as_ref());
            if let Some((asset_id, amount)) = filter.quote() {
                query.set("quoteAssetId", asset_id);
                query.set("quoteAmount", amount.normalize());
            }
        }
        self.get(SETTLEMENT_ASSETS_PATH, &query)
    }

    pub fn parse_create_one_time_payment(&self, response: HttpResponse) -> Result<CreateOneTimePaymentResponse> {
        envelope::decode(&response)
    }

    /// The returned record keeps the whole response body in `raw`. A body
    /// that decoded as JSON is UTF-8, so the conversion is lossless.
    pub fn parse_get_payment_result(&self, response: HttpResponse) -> Result<PaymentResult> {
        let mut result: PaymentResult = envelope::decode(&response)?;
        result.raw = String::from_utf8_lossy(&response.body).into_owned();
        Ok(result)
    }

    pub fn parse_list_settlement_assets(&self, response: HttpResponse) -> Result<Vec<Asset>> {
        envelope::decode(&response)
    }

    fn get(&self, path: &str, query: &Params) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: format!("{}{path}?{}", self.base_url, query.encode()),
            headers: Vec::new(),
            body: None,
        }
    }
}

/// Form/query parameters, encoded in key order.
#[derive(Debug, Default)]
struct Params(BTreeMap<&'static str, String>);

impl Params {
    fn set(&mut self, key: &'static str, value: impl ToString) {
        self.0.insert(key, value.to_string());
    }

    fn set_opt(&mut self, key: &'static str, value: Option<impl ToString>) {
        if let Some(value) = value {
            self.set(key, value);
        }
    }

    fn encode(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.0.iter())
            .finish()
    }
}
