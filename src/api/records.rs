// ============================================================================
// RECORDS ENDPOINT - Seed/replace promotion records in the active store
// ============================================================================

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

use crate::domains::promotions::models::PromotionRecord;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct RecordResponse {
    pub success: bool,
}

/// Create or replace a promotion record
///
/// Earning a promotion happens upstream of this service; this endpoint is
/// the CRUD seam that upstream (or a fixture loader in the mock
/// configuration) uses to push records in.
///
/// # Endpoint
/// PUT /api/v1/promotions
pub async fn put_promotion_record(
    State(state): State<Arc<AppState>>,
    Json(record): Json<PromotionRecord>,
) -> impl IntoResponse {
    let promotion_id = record.promotion_id.clone();

    match state.promotion_store.put(record).await {
        Ok(()) => {
            info!(%promotion_id, "promotion record stored");
            (StatusCode::CREATED, Json(RecordResponse { success: true }))
        }
        Err(err) => {
            error!(%promotion_id, error = %err, "failed to store promotion record");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(RecordResponse { success: false }),
            )
        }
    }
}
