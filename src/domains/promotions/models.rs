use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of content carried inside the signed QR envelope.
///
/// Order tickets share the same envelope but are handled by a different
/// scanner flow; the redemption path only honors `PROMOTION`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QrType {
    Promotion,
    Order,
}

/// Claim set signed into a promotion token.
///
/// This is the wire contract the customer app and the business scanner must
/// agree on, so field names are fixed camelCase JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionClaim {
    pub qr_type: QrType,
    pub promo_id: String,
    pub customer_id: String,
    pub business_id: String,
    pub business_name: String,
    pub promo_type: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Always false at issuance. The authoritative used/unused fact lives in
    /// the promotion store; verification never trusts this flag.
    pub used: bool,
    pub nonce: String,
}

/// Store-side promotion entity, the record of truth for redemption state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionRecord {
    pub promotion_id: String,
    pub user_id: String,
    pub venue_name: String,
    pub promotion_expire_date: DateTime<Utc>,
    pub is_used: bool,
}

/// Record state as seen by the scanner. Only `Active` can transition, to
/// `Used`, and at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromotionState {
    Active,
    Expired,
    Used,
}

impl PromotionRecord {
    pub fn state(&self, now: DateTime<Utc>) -> PromotionState {
        if self.is_used {
            PromotionState::Used
        } else if now >= self.promotion_expire_date {
            PromotionState::Expired
        } else {
            PromotionState::Active
        }
    }
}

/// Machine-readable rejection codes, distinct from any user-facing copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectReason {
    InvalidToken,
    NotFound,
    Expired,
    AlreadyUsed,
    UnrecognizedContent,
}

impl RejectReason {
    /// Label used for logs and metrics.
    pub fn code(&self) -> &'static str {
        match self {
            RejectReason::InvalidToken => "invalid_token",
            RejectReason::NotFound => "not_found",
            RejectReason::Expired => "expired",
            RejectReason::AlreadyUsed => "already_used",
            RejectReason::UnrecognizedContent => "unrecognized_content",
        }
    }
}

/// Outcome of a redemption attempt. `TransientError` is the only variant
/// that should prompt the scanner to retry; every rejection is final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RedemptionResult {
    Accepted,
    Rejected { reason: RejectReason },
    TransientError,
}

/// Authenticated caller identity on the scanner side. Opaque to the
/// redemption core; carried through for logging and store-level auth.
#[derive(Debug, Clone)]
pub struct ScannerContext {
    pub scanner_id: String,
}
