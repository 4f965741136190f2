use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use super::models::PromotionClaim;

type HmacSha256 = Hmac<Sha256>;

/// Envelope header carried as the first token segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenHeader {
    pub alg: String,
    pub typ: String,
}

impl Default for TokenHeader {
    fn default() -> Self {
        Self {
            alg: "HS256".to_string(),
            typ: "QR".to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token is not a three-segment signed envelope")]
    Malformed,

    #[error("token signature does not match")]
    SignatureMismatch,

    #[error("token expired at {expired_at}")]
    Expired { expired_at: DateTime<Utc> },

    #[error("claim serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("signing key was rejected")]
    InvalidKey,
}

impl TokenError {
    /// Short reason code for structured logs. Callers surface a single
    /// uniform "invalid token" outcome; the distinction stays internal.
    pub fn reason_code(&self) -> &'static str {
        match self {
            TokenError::Malformed => "malformed",
            TokenError::SignatureMismatch => "signature_mismatch",
            TokenError::Expired { .. } => "expired",
            TokenError::Serialization(_) => "serialization",
            TokenError::InvalidKey => "invalid_key",
        }
    }
}

/// Signs and verifies promotion tokens with the per-environment symmetric
/// secret.
///
/// Wire format: `base64url(header) "." base64url(claim) "." base64url(sig)`
/// with no padding, where `sig` is HMAC-SHA256 over the first two segments.
/// Encoding is deterministic: the same claim and secret always produce the
/// same token bytes.
#[derive(Clone)]
pub struct TokenSigner {
    secret: String,
}

impl TokenSigner {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    pub fn sign(&self, claim: &PromotionClaim) -> Result<String, TokenError> {
        let header = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&TokenHeader::default())?);
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(claim)?);
        let signature = self.signature_for(&header, &payload)?;
        Ok(format!("{header}.{payload}.{signature}"))
    }

    /// Verify against the current wall clock.
    pub fn verify(&self, token: &str) -> Result<PromotionClaim, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// The signature is checked before the claim segment is decoded, so
    /// tampered content never reaches the JSON layer. Expiry is exclusive:
    /// a claim whose `expiresAt` equals `now` is already rejected.
    pub fn verify_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<PromotionClaim, TokenError> {
        let mut segments = token.split('.');
        let (header, payload, signature) = match (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) {
            (Some(h), Some(p), Some(s), None) => (h, p, s),
            _ => return Err(TokenError::Malformed),
        };

        let carried = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| TokenError::Malformed)?;
        let mut mac = self.mac()?;
        mac.update(header.as_bytes());
        mac.update(b".");
        mac.update(payload.as_bytes());
        mac.verify_slice(&carried)
            .map_err(|_| TokenError::SignatureMismatch)?;

        let claim_bytes = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| TokenError::Malformed)?;
        let claim: PromotionClaim =
            serde_json::from_slice(&claim_bytes).map_err(|_| TokenError::Malformed)?;

        if claim.expires_at <= now {
            return Err(TokenError::Expired {
                expired_at: claim.expires_at,
            });
        }

        Ok(claim)
    }

    fn signature_for(&self, header: &str, payload: &str) -> Result<String, TokenError> {
        let mut mac = self.mac()?;
        mac.update(header.as_bytes());
        mac.update(b".");
        mac.update(payload.as_bytes());
        Ok(URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes()))
    }

    fn mac(&self) -> Result<HmacSha256, TokenError> {
        HmacSha256::new_from_slice(self.secret.as_bytes()).map_err(|_| TokenError::InvalidKey)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::promotions::models::QrType;
    use chrono::Duration;

    const SECRET: &str = "test-secret";

    fn sample_claim(expires_at: DateTime<Utc>) -> PromotionClaim {
        PromotionClaim {
            qr_type: QrType::Promotion,
            promo_id: "P1".to_string(),
            customer_id: "U1".to_string(),
            business_id: "B1".to_string(),
            business_name: "Cafe X".to_string(),
            promo_type: "FREE_COFFEE".to_string(),
            created_at: expires_at - Duration::days(30),
            expires_at,
            used: false,
            nonce: "1700000000000-deadbeef".to_string(),
        }
    }

    #[test]
    fn test_sign_verify_round_trip() {
        let signer = TokenSigner::new(SECRET);
        let claim = sample_claim(Utc::now() + Duration::days(30));

        let token = signer.sign(&claim).unwrap();
        let verified = signer.verify(&token).unwrap();

        assert_eq!(verified, claim);
    }

    #[test]
    fn test_signing_is_deterministic() {
        let signer = TokenSigner::new(SECRET);
        let claim = sample_claim(Utc::now() + Duration::days(1));

        assert_eq!(signer.sign(&claim).unwrap(), signer.sign(&claim).unwrap());
    }

    #[test]
    fn test_token_has_three_url_safe_segments() {
        let signer = TokenSigner::new(SECRET);
        let token = signer
            .sign(&sample_claim(Utc::now() + Duration::days(1)))
            .unwrap();

        let segments: Vec<&str> = token.split('.').collect();
        assert_eq!(segments.len(), 3);
        for segment in segments {
            assert!(!segment.is_empty());
            assert!(!segment.contains('='));
            assert!(!segment.contains('+'));
            assert!(!segment.contains('/'));
        }
    }

    #[test]
    fn test_tampered_signature_is_rejected() {
        let signer = TokenSigner::new(SECRET);
        let token = signer
            .sign(&sample_claim(Utc::now() + Duration::days(1)))
            .unwrap();

        let mut parts: Vec<String> = token.split('.').map(String::from).collect();
        let first = parts[2].remove(0);
        parts[2].insert(0, if first == 'A' { 'B' } else { 'A' });

        assert!(matches!(
            signer.verify(&parts.join(".")),
            Err(TokenError::SignatureMismatch)
        ));
    }

    #[test]
    fn test_tampered_payload_is_rejected() {
        let signer = TokenSigner::new(SECRET);
        let token = signer
            .sign(&sample_claim(Utc::now() + Duration::days(1)))
            .unwrap();

        let mut parts: Vec<String> = token.split('.').map(String::from).collect();
        let flipped = parts[1].remove(0);
        parts[1].insert(0, if flipped == 'A' { 'B' } else { 'A' });
        let tampered = parts.join(".");

        assert!(matches!(
            signer.verify(&tampered),
            Err(TokenError::SignatureMismatch)
        ));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = TokenSigner::new(SECRET)
            .sign(&sample_claim(Utc::now() + Duration::days(1)))
            .unwrap();

        assert!(matches!(
            TokenSigner::new("other-secret").verify(&token),
            Err(TokenError::SignatureMismatch)
        ));
    }

    #[test]
    fn test_wrong_segment_count_is_malformed() {
        let signer = TokenSigner::new(SECRET);

        assert!(matches!(
            signer.verify("only-one-segment"),
            Err(TokenError::Malformed)
        ));
        assert!(matches!(signer.verify("a.b"), Err(TokenError::Malformed)));
        assert!(matches!(
            signer.verify("a.b.c.d"),
            Err(TokenError::Malformed)
        ));
    }

    #[test]
    fn test_expiry_boundary_is_exclusive() {
        let signer = TokenSigner::new(SECRET);
        let expires_at = Utc::now() + Duration::days(1);
        let token = signer.sign(&sample_claim(expires_at)).unwrap();

        assert!(matches!(
            signer.verify_at(&token, expires_at),
            Err(TokenError::Expired { .. })
        ));
        assert!(signer
            .verify_at(&token, expires_at - Duration::microseconds(1))
            .is_ok());
    }

    #[test]
    fn test_signature_checked_before_expiry() {
        // A tampered token that is also expired must read as a signature
        // failure, not as expired.
        let signer = TokenSigner::new(SECRET);
        let token = signer
            .sign(&sample_claim(Utc::now() - Duration::days(1)))
            .unwrap();

        let mut parts: Vec<String> = token.split('.').map(String::from).collect();
        let flipped = parts[1].remove(0);
        parts[1].insert(0, if flipped == 'A' { 'B' } else { 'A' });

        assert!(matches!(
            signer.verify(&parts.join(".")),
            Err(TokenError::SignatureMismatch)
        ));
    }

    #[test]
    fn test_claim_wire_format_is_camel_case() {
        let claim = sample_claim(Utc::now() + Duration::days(1));
        let value = serde_json::to_value(&claim).unwrap();

        assert_eq!(value["qrType"], serde_json::json!("PROMOTION"));
        assert!(value.get("promoId").is_some());
        assert!(value.get("customerId").is_some());
        assert!(value.get("businessId").is_some());
        assert!(value.get("businessName").is_some());
        assert!(value.get("promoType").is_some());
        assert!(value.get("createdAt").is_some());
        assert!(value.get("expiresAt").is_some());
        assert!(value.get("used").is_some());
        assert!(value.get("nonce").is_some());
    }
}
