use std::{
    collections::HashMap,
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Form, Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;
use uuid::Uuid;

/// Envelope code for a missing or malformed parameter.
pub const CODE_INVALID_PARAM: i64 = 10001;
/// Envelope code for an unknown payment.
pub const CODE_NOT_FOUND: i64 = 10004;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub success: bool,
    pub code: i64,
    pub message: String,
    pub data: Value,
    pub timestamp_ms: i64,
}

/// A stored one-time payment, serialized as the payments_result record.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub trace_id: String,
    pub code: String,
    pub order_id: String,
    pub payee_id: String,
    pub quote_amount: String,
    pub quote_asset_id: String,
    pub settlement_asset_id: String,
    pub status: String,
    pub txid: String,
    pub confirmations: i64,
    pub return_to: String,
    pub remark: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainAsset {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub icon_url: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub name: String,
    pub symbol: String,
    pub icon_url: String,
    pub asset_id: String,
    pub is_asset: bool,
    pub network: String,
    pub is_available: bool,
    pub quote_symbol: String,
    pub min_quote_amount: Decimal,
    pub max_quote_amount: Decimal,
    pub chain_asset: ChainAsset,
}

pub type Db = Arc<RwLock<HashMap<String, Payment>>>;

type Reply = (StatusCode, Json<Envelope>);

const REQUIRED_CREATE_FIELDS: [&str; 5] = [
    "payeeId",
    "quoteAmount",
    "quoteAssetId",
    "settlementAssetId",
    "orderId",
];

pub fn app() -> Router {
    router(Db::default())
}

/// Router over a caller-owned store, so tests can inspect or settle payments.
pub fn router(db: Db) -> Router {
    Router::new()
        .route("/v1/one_time_payment", post(create_payment))
        .route("/v1/payments_result", get(payment_result))
        .route("/v1/setting/settlement_assets", get(settlement_assets))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    serve(listener, Db::default()).await
}

pub async fn serve(listener: TcpListener, db: Db) -> Result<(), std::io::Error> {
    axum::serve(listener, router(db)).await
}

/// Mark a stored payment as paid. Returns false if the trace id is unknown.
pub async fn settle(db: &Db, trace_id: &str, txid: &str) -> bool {
    let mut payments = db.write().await;
    match payments.get_mut(trace_id) {
        Some(payment) => {
            payment.status = "success".to_string();
            payment.txid = txid.to_string();
            payment.confirmations = 1;
            true
        }
        None => false,
    }
}

/// The fixed catalogue served by the settlement assets endpoint.
pub fn catalogue() -> Vec<Asset> {
    let eth = ChainAsset {
        id: "43d61dcd-e413-450d-80b8-101d5e903357".to_string(),
        name: "Ether".to_string(),
        symbol: "ETH".to_string(),
        icon_url: "https://images.mixin.one/eth.png".to_string(),
    };
    let btc = ChainAsset {
        id: "c6d0c728-2624-429b-8e0d-d9d19b6592fa".to_string(),
        name: "Bitcoin".to_string(),
        symbol: "BTC".to_string(),
        icon_url: "https://images.mixin.one/btc.png".to_string(),
    };
    vec![
        Asset {
            name: "Tether USD".to_string(),
            symbol: "USDT".to_string(),
            icon_url: "https://images.mixin.one/usdt.png".to_string(),
            asset_id: "4d8c508b-91c5-375b-92b0-ee702ed2dac5".to_string(),
            is_asset: true,
            network: "ERC20".to_string(),
            is_available: true,
            quote_symbol: "USD".to_string(),
            min_quote_amount: Decimal::new(1, 2),
            max_quote_amount: Decimal::new(50_000, 0),
            chain_asset: eth,
        },
        Asset {
            name: "Bitcoin".to_string(),
            symbol: "BTC".to_string(),
            icon_url: "https://images.mixin.one/btc.png".to_string(),
            asset_id: btc.id.clone(),
            is_asset: true,
            network: "Bitcoin".to_string(),
            is_available: true,
            quote_symbol: "USD".to_string(),
            min_quote_amount: Decimal::new(5, 0),
            max_quote_amount: Decimal::new(100_000, 0),
            chain_asset: btc,
        },
    ]
}

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}

fn ok(data: Value) -> Reply {
    (
        StatusCode::OK,
        Json(Envelope {
            success: true,
            code: 0,
            message: String::new(),
            data,
            timestamp_ms: now_ms(),
        }),
    )
}

fn fail(status: StatusCode, code: i64, message: impl Into<String>) -> Reply {
    (
        status,
        Json(Envelope {
            success: false,
            code,
            message: message.into(),
            data: Value::Null,
            timestamp_ms: now_ms(),
        }),
    )
}

fn non_empty<'a>(params: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    params.get(key).map(String::as_str).filter(|v| !v.is_empty())
}

async fn create_payment(
    State(db): State<Db>,
    Form(form): Form<HashMap<String, String>>,
) -> Reply {
    if let Some(missing) = REQUIRED_CREATE_FIELDS
        .iter()
        .find(|key| non_empty(&form, key).is_none())
    {
        return fail(StatusCode::BAD_REQUEST, CODE_INVALID_PARAM, format!("{missing} is required"));
    }

    let quote_amount = form["quoteAmount"].clone();
    match quote_amount.parse::<Decimal>() {
        Ok(amount) if amount > Decimal::ZERO => {}
        _ => return fail(StatusCode::BAD_REQUEST, CODE_INVALID_PARAM, "quoteAmount is invalid"),
    }

    let code = Uuid::new_v4().simple().to_string()[..12].to_string();
    let trace_id = non_empty(&form, "traceId")
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let payment = Payment {
        trace_id: trace_id.clone(),
        code: code.clone(),
        order_id: form["orderId"].clone(),
        payee_id: form["payeeId"].clone(),
        quote_amount,
        quote_asset_id: form["quoteAssetId"].clone(),
        settlement_asset_id: form["settlementAssetId"].clone(),
        status: "unpaid".to_string(),
        txid: String::new(),
        confirmations: 0,
        return_to: form.get("returnTo").cloned().unwrap_or_default(),
        remark: form.get("remark").cloned().unwrap_or_default(),
    };
    info!(trace_id = %trace_id, code = %code, "created one-time payment");
    db.write().await.insert(trace_id, payment);

    ok(json!({
        "code": code,
        "codeUrl": format!("mixin://mixpay.me/pay/{code}"),
    }))
}

async fn payment_result(
    State(db): State<Db>,
    Query(params): Query<HashMap<String, String>>,
) -> Reply {
    let payments = db.read().await;
    let found = match (non_empty(&params, "traceId"), non_empty(&params, "orderId")) {
        (Some(trace_id), _) => payments.get(trace_id),
        (None, Some(order_id)) => {
            let payee_id = non_empty(&params, "payeeId");
            payments
                .values()
                .find(|p| p.order_id == order_id && payee_id.map_or(true, |id| p.payee_id == id))
        }
        (None, None) => {
            return fail(
                StatusCode::BAD_REQUEST,
                CODE_INVALID_PARAM,
                "traceId or orderId is required",
            )
        }
    };

    match found {
        Some(payment) => ok(json!(payment)),
        None => fail(StatusCode::NOT_FOUND, CODE_NOT_FOUND, "payment not found"),
    }
}

async fn settlement_assets(Query(params): Query<HashMap<String, String>>) -> Reply {
    let mut assets = catalogue();
    let quote = non_empty(&params, "quoteAssetId")
        .zip(non_empty(&params, "quoteAmount").and_then(|a| a.parse::<Decimal>().ok()));
    if let Some((_, amount)) = quote {
        for asset in &mut assets {
            asset.is_available = asset.min_quote_amount <= amount && amount <= asset.max_quote_amount;
        }
    }
    ok(json!(assets))
}
