pub mod issue;
pub mod records;
pub mod redeem;

use axum::http::StatusCode;
use axum::routing::{post, put};
use axum::Router;
use std::sync::Arc;

use crate::state::AppState;

pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/v1/promotions/issue",
            post(issue::issue_promotion_token),
        )
        .route(
            "/api/v1/promotions/redeem",
            post(redeem::redeem_promotion),
        )
        .route("/api/v1/promotions", put(records::put_promotion_record))
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn metrics() -> Result<String, StatusCode> {
    prometheus::TextEncoder::new()
        .encode_to_string(&prometheus::gather())
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}
