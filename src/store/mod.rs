//! Promotion store: the record of truth for redemption state.
//!
//! Two implementations, selected once at startup: an in-memory fixture for
//! the mock configuration and tests, and an HTTP client for the real
//! backend.

pub mod memory;
pub mod remote;

pub use memory::InMemoryPromotionStore;
pub use remote::RemotePromotionStore;

use async_trait::async_trait;

use crate::domains::promotions::models::PromotionRecord;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("promotion store unavailable: {0}")]
    Unavailable(String),

    #[error("promotion store request timed out")]
    Timeout,

    #[error("promotion store returned a malformed record: {0}")]
    MalformedRecord(String),
}

/// Minimal contract the redemption path needs from persistence.
///
/// `compare_and_set_used` is the only mutation redemption performs and must
/// be atomic per record: two racing calls may never both return `true`.
#[async_trait]
pub trait PromotionStore: Send + Sync {
    async fn get(
        &self,
        promotion_id: &str,
        user_id: &str,
    ) -> Result<Option<PromotionRecord>, StoreError>;

    /// Flips `is_used` from false to true. Returns `false` when the record
    /// is already used or absent.
    async fn compare_and_set_used(
        &self,
        promotion_id: &str,
        user_id: &str,
    ) -> Result<bool, StoreError>;

    /// Creates or replaces a record. Record creation itself (earning the
    /// promotion) happens outside the redemption core; this exists for the
    /// fixture store and backend synchronization.
    async fn put(&self, record: PromotionRecord) -> Result<(), StoreError>;
}
