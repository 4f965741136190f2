// ============================================================================
// ISSUE ENDPOINT - Mint promotion QR tokens for the customer app
// ============================================================================

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

use crate::domains::promotions::issuance::{IssuanceError, VenueContext};
use crate::state::AppState;

/// Request body for minting a promotion token
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueRequest {
    pub promo_id: String,
    pub customer_id: String,
    pub business_id: String,
    pub business_name: String,
    pub promo_type: String,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Response with the signed token and its rendered QR image
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueResponse {
    pub success: bool,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub qr_png_base64: String,
}

/// Mint a promotion QR token
///
/// # Endpoint
/// POST /api/v1/promotions/issue
///
/// # Returns
/// - 201 Created: token plus PNG payload, ready for display
/// - 400 Bad Request: a required claim field is missing or empty
/// - 500 Internal Server Error: QR rendering failed
pub async fn issue_promotion_token(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<IssueRequest>,
) -> Result<(StatusCode, Json<IssueResponse>), ApiError> {
    let venue = VenueContext {
        business_id: payload.business_id,
        business_name: payload.business_name,
        promo_type: payload.promo_type,
        expires_at: payload.expires_at,
    };

    let issued = state
        .issuance_service
        .issue(&payload.promo_id, &payload.customer_id, &venue)?;

    // An issuance failure above means no QR is ever rendered.
    let png = state.qr_renderer.render_png(&issued.token).map_err(|e| {
        error!("failed to render promotion QR: {e:#}");
        ApiError::InternalError("could not render QR image".to_string())
    })?;

    info!(promo_id = %payload.promo_id, "promotion token issued via API");

    let expires_at = issued.claim.expires_at;
    Ok((
        StatusCode::CREATED,
        Json(IssueResponse {
            success: true,
            token: issued.token,
            expires_at,
            qr_png_base64: STANDARD.encode(png),
        }),
    ))
}

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    InternalError(String),
}

impl From<IssuanceError> for ApiError {
    fn from(err: IssuanceError) -> Self {
        match err {
            IssuanceError::MissingField { .. } | IssuanceError::ExpiryNotAfterCreation { .. } => {
                ApiError::BadRequest(err.to_string())
            }
            IssuanceError::Signing(_) => {
                error!("token signing failed: {err}");
                ApiError::InternalError("could not sign promotion token".to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(serde_json::json!({
            "success": false,
            "error": message,
        }));

        (status, body).into_response()
    }
}
