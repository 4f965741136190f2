use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};

use super::models::{
    PromotionState, QrType, RedemptionResult, RejectReason, ScannerContext,
};
use super::token::{TokenError, TokenSigner};
use crate::observability::metrics::record_redemption_attempt;
use crate::store::{PromotionStore, StoreError};

/// Unsigned fallback envelope still emitted by older customer apps.
///
/// It carries no signature, so content on this path is accepted as-is and
/// the store-level checks are the only defense. Kept for backward
/// compatibility; every acceptance is logged.
#[derive(Debug, Deserialize)]
struct LegacyEnvelope {
    #[serde(rename = "promotionId")]
    promotion_id: String,
    #[serde(rename = "userId")]
    user_id: String,
}

/// Business-side redemption state machine.
///
/// Verification (signature, then token-level expiry) always runs before any
/// store access, so a forged token never learns whether a record exists.
/// The store's `is_used` flag is the single source of truth; the claim's
/// embedded `used` field is never consulted.
pub struct RedemptionService {
    verifier: TokenSigner,
    store: Arc<dyn PromotionStore>,
}

impl RedemptionService {
    pub fn new(verifier: TokenSigner, store: Arc<dyn PromotionStore>) -> Self {
        Self { verifier, store }
    }

    pub async fn redeem(&self, decoded: &str, scanner: &ScannerContext) -> RedemptionResult {
        let (promo_id, customer_id) = match self.extract_identity(decoded, scanner) {
            Ok(identity) => identity,
            Err(reason) => return self.rejected(reason),
        };

        let record = match self.store.get(&promo_id, &customer_id).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                info!(
                    scanner_id = %scanner.scanner_id,
                    promo_id = %promo_id,
                    "promotion record not found"
                );
                return self.rejected(RejectReason::NotFound);
            }
            Err(err) => return self.transient(err, scanner),
        };

        match record.state(Utc::now()) {
            PromotionState::Expired => return self.rejected(RejectReason::Expired),
            PromotionState::Used => return self.rejected(RejectReason::AlreadyUsed),
            PromotionState::Active => {}
        }

        // The read above is advisory; only the compare-and-set decides who
        // wins under a double scan.
        match self.store.compare_and_set_used(&promo_id, &customer_id).await {
            Ok(true) => {
                info!(
                    scanner_id = %scanner.scanner_id,
                    promo_id = %promo_id,
                    customer_id = %customer_id,
                    "promotion redeemed"
                );
                record_redemption_attempt("accepted");
                RedemptionResult::Accepted
            }
            Ok(false) => self.rejected(RejectReason::AlreadyUsed),
            Err(err) => self.transient(err, scanner),
        }
    }

    /// Resolve the scanned content to a `(promoId, customerId)` pair, via
    /// the signed envelope or the legacy plain-JSON fallback.
    fn extract_identity(
        &self,
        decoded: &str,
        scanner: &ScannerContext,
    ) -> Result<(String, String), RejectReason> {
        if decoded.split('.').count() == 3 {
            return match self.verifier.verify(decoded) {
                Ok(claim) if claim.qr_type != QrType::Promotion => {
                    warn!(
                        scanner_id = %scanner.scanner_id,
                        qr_type = ?claim.qr_type,
                        "scanned QR is not a promotion"
                    );
                    Err(RejectReason::UnrecognizedContent)
                }
                Ok(claim) => Ok((claim.promo_id, claim.customer_id)),
                Err(TokenError::Expired { expired_at }) => {
                    info!(
                        scanner_id = %scanner.scanner_id,
                        %expired_at,
                        "promotion token expired"
                    );
                    Err(RejectReason::Expired)
                }
                Err(err) => {
                    warn!(
                        scanner_id = %scanner.scanner_id,
                        reason = err.reason_code(),
                        "rejected promotion token"
                    );
                    Err(RejectReason::InvalidToken)
                }
            };
        }

        match serde_json::from_str::<LegacyEnvelope>(decoded) {
            Ok(envelope) => {
                warn!(
                    scanner_id = %scanner.scanner_id,
                    promotion_id = %envelope.promotion_id,
                    "accepting unsigned legacy envelope"
                );
                Ok((envelope.promotion_id, envelope.user_id))
            }
            Err(_) => Err(RejectReason::UnrecognizedContent),
        }
    }

    fn rejected(&self, reason: RejectReason) -> RedemptionResult {
        record_redemption_attempt(reason.code());
        RedemptionResult::Rejected { reason }
    }

    fn transient(&self, err: StoreError, scanner: &ScannerContext) -> RedemptionResult {
        warn!(
            scanner_id = %scanner.scanner_id,
            error = %err,
            "promotion store unavailable during redemption"
        );
        record_redemption_attempt("transient_error");
        RedemptionResult::TransientError
    }
}
