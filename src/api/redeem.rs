// ============================================================================
// REDEEM ENDPOINT - Business scanner submits decoded QR content
// ============================================================================

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::domains::promotions::models::{RedemptionResult, ScannerContext};
use crate::state::AppState;

/// Request body for redeeming a scanned promotion
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemRequest {
    /// Raw decoded barcode content, opaque to the scanner UI
    pub content: String,
    pub scanner_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemResponse {
    pub success: bool,
    #[serde(flatten)]
    pub result: RedemptionResult,
}

/// Redeem a scanned promotion QR
///
/// # Endpoint
/// POST /api/v1/promotions/redeem
///
/// # Returns
/// - 200 OK: final outcome, accepted or rejected with a reason code
/// - 503 Service Unavailable: store unreachable, the scanner may retry
pub async fn redeem_promotion(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RedeemRequest>,
) -> impl IntoResponse {
    let request_id = Uuid::new_v4();
    let scanner = ScannerContext {
        scanner_id: payload
            .scanner_id
            .unwrap_or_else(|| "unknown".to_string()),
    };

    info!(%request_id, scanner_id = %scanner.scanner_id, "processing redemption scan");

    let result = state
        .redemption_service
        .redeem(&payload.content, &scanner)
        .await;

    let status = match result {
        RedemptionResult::TransientError => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::OK,
    };

    (
        status,
        Json(RedeemResponse {
            success: result == RedemptionResult::Accepted,
            result,
        }),
    )
}
