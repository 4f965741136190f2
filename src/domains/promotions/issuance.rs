use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::models::{PromotionClaim, QrType};
use super::token::{TokenError, TokenSigner};
use crate::observability::metrics::record_token_issued;

/// Floor for token lifetime when the promotion carries no expiry of its
/// own. A token must stay scannable for at least the walk to the counter.
pub const MIN_TOKEN_LIFETIME_SECONDS: i64 = 3600;

/// Venue-side fields supplied by the caller at issuance time.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VenueContext {
    pub business_id: String,
    pub business_name: String,
    pub promo_type: String,
    /// The promotion's own expiry when known; otherwise the minimum
    /// lifetime floor applies.
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub claim: PromotionClaim,
}

#[derive(Debug, thiserror::Error)]
pub enum IssuanceError {
    #[error("required claim field is missing or empty: {field}")]
    MissingField { field: &'static str },

    #[error("promotion expiry {expires_at} is not after issuance time {created_at}")]
    ExpiryNotAfterCreation {
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    },

    #[error("token signing failed: {0}")]
    Signing(#[from] TokenError),
}

/// Mints signed promotion tokens for display as QR codes on the customer
/// device. Issuance never touches the promotion store; the record stays
/// unused until an actual redemption.
pub struct IssuanceService {
    signer: TokenSigner,
    min_lifetime: Duration,
}

impl IssuanceService {
    pub fn new(signer: TokenSigner, min_lifetime_seconds: i64) -> Self {
        Self {
            signer,
            min_lifetime: Duration::seconds(min_lifetime_seconds.max(MIN_TOKEN_LIFETIME_SECONDS)),
        }
    }

    pub fn issue(
        &self,
        promo_id: &str,
        customer_id: &str,
        venue: &VenueContext,
    ) -> Result<IssuedToken, IssuanceError> {
        let claim = self.build_claim(promo_id, customer_id, venue, Utc::now())?;
        let token = self.signer.sign(&claim)?;

        info!(
            promo_id = %claim.promo_id,
            business_id = %claim.business_id,
            expires_at = %claim.expires_at,
            "issued promotion token"
        );
        record_token_issued();

        Ok(IssuedToken { token, claim })
    }

    /// Field validation runs to completion before any signing work, so a
    /// caller can never end up rendering a QR code over an incomplete
    /// claim.
    fn build_claim(
        &self,
        promo_id: &str,
        customer_id: &str,
        venue: &VenueContext,
        created_at: DateTime<Utc>,
    ) -> Result<PromotionClaim, IssuanceError> {
        require_non_empty(promo_id, "promoId")?;
        require_non_empty(customer_id, "customerId")?;
        require_non_empty(&venue.business_id, "businessId")?;
        require_non_empty(&venue.business_name, "businessName")?;
        require_non_empty(&venue.promo_type, "promoType")?;

        let expires_at = venue
            .expires_at
            .unwrap_or_else(|| created_at + self.min_lifetime);
        if expires_at <= created_at {
            return Err(IssuanceError::ExpiryNotAfterCreation {
                created_at,
                expires_at,
            });
        }

        Ok(PromotionClaim {
            qr_type: QrType::Promotion,
            promo_id: promo_id.to_string(),
            customer_id: customer_id.to_string(),
            business_id: venue.business_id.clone(),
            business_name: venue.business_name.clone(),
            promo_type: venue.promo_type.clone(),
            created_at,
            expires_at,
            used: false,
            nonce: generate_nonce(created_at),
        })
    }
}

/// Millisecond timestamp plus a random component, so two issuances for the
/// same promotion within the same millisecond still get distinct nonces.
fn generate_nonce(created_at: DateTime<Utc>) -> String {
    let mut rng = rand::thread_rng();
    format!(
        "{:x}-{:08x}",
        created_at.timestamp_millis(),
        rng.gen::<u32>()
    )
}

fn require_non_empty(value: &str, field: &'static str) -> Result<(), IssuanceError> {
    if value.trim().is_empty() {
        Err(IssuanceError::MissingField { field })
    } else {
        Ok(())
    }
}
