//! Async executor for `MixPayClient` requests, backed by reqwest.
//!
//! # Design
//! `MixPay` pairs a `reqwest::Client` with the stateless `MixPayClient`; each
//! operation is build, execute, parse. There is no retry and no shared state
//! beyond reqwest's connection pool, so a `MixPay` can be cloned freely and
//! used from many tasks at once.
//!
//! Cancellation belongs to the caller: dropping an operation's future (for
//! example through `tokio::time::timeout`) aborts the in-flight request.

use std::time::Duration;

use tracing::debug;

use crate::client::{MixPayClient, DEFAULT_BASE_URL};
use crate::error::Result;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{
    Asset, CreateOneTimePaymentRequest, CreateOneTimePaymentResponse, GetPaymentResultRequest,
    ListSettlementAssetsRequest, PaymentResult,
};

/// Async client for the MixPay gateway.
#[derive(Debug, Clone)]
pub struct MixPay {
    http: reqwest::Client,
    api: MixPayClient,
}

/// Builder for `MixPay`.
#[derive(Debug, Default)]
pub struct MixPayBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    client: Option<reqwest::Client>,
}

impl MixPayBuilder {
    /// Gateway host, e.g. `https://api.mixpay.me`.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Upper bound for each request, reported as a transport error.
    /// Ignored when a custom client is supplied.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Ignored when a custom client is supplied.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Use an existing reqwest client instead of building one.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    pub fn build(self) -> Result<MixPay> {
        let base_url = self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        url::Url::parse(&base_url)?;

        let http = match self.client {
            Some(client) => client,
            None => {
                let mut builder = reqwest::Client::builder();
                if let Some(timeout) = self.timeout {
                    builder = builder.timeout(timeout);
                }
                if let Some(user_agent) = self.user_agent {
                    builder = builder.user_agent(user_agent);
                }
                builder.build()?
            }
        };

        Ok(MixPay {
            http,
            api: MixPayClient::new(&base_url),
        })
    }
}

impl Default for MixPay {
    fn default() -> Self {
        Self::new()
    }
}

impl MixPay {
    /// Client for the production gateway with reqwest defaults.
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
            api: MixPayClient::default(),
        }
    }

    pub fn builder() -> MixPayBuilder {
        MixPayBuilder::default()
    }

    /// The underlying request builder and parser.
    pub fn api(&self) -> &MixPayClient {
        &self.api
    }

    pub async fn create_one_time_payment(
        &self,
        input: &CreateOneTimePaymentRequest,
    ) -> Result<CreateOneTimePaymentResponse> {
        let response = self.execute(self.api.build_create_one_time_payment(input)).await?;
        self.api.parse_create_one_time_payment(response)
    }

    pub async fn get_payment_result(&self, input: &GetPaymentResultRequest) -> Result<PaymentResult> {
        let response = self.execute(self.api.build_get_payment_result(input)).await?;
        self.api.parse_get_payment_result(response)
    }

    pub async fn list_settlement_assets(
        &self,
        input: Option<&ListSettlementAssetsRequest>,
    ) -> Result<Vec<Asset>> {
        let response = self.execute(self.api.build_list_settlement_assets(input)).await?;
        self.api.parse_list_settlement_assets(response)
    }

    /// Send a request and buffer the whole response body.
    ///
    /// Non-2xx statuses are returned as data; only failures to get a
    /// complete response are errors here.
    pub async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
        };
        debug!(method = request.method.as_str(), url = %request.url, "sending mixpay request");

        let mut builder = self.http.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.bytes().await?;

        debug!(status, bytes = body.len(), "received mixpay response");
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
