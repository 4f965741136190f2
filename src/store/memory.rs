use async_trait::async_trait;
use dashmap::DashMap;

use super::{PromotionStore, StoreError};
use crate::domains::promotions::models::PromotionRecord;

/// In-memory promotion store backing the mock configuration and tests.
///
/// `DashMap::get_mut` holds the shard lock for the whole read-modify-write,
/// which gives `compare_and_set_used` its per-record atomicity.
#[derive(Debug, Default)]
pub struct InMemoryPromotionStore {
    records: DashMap<(String, String), PromotionRecord>,
}

impl InMemoryPromotionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PromotionStore for InMemoryPromotionStore {
    async fn get(
        &self,
        promotion_id: &str,
        user_id: &str,
    ) -> Result<Option<PromotionRecord>, StoreError> {
        let key = (promotion_id.to_string(), user_id.to_string());
        Ok(self.records.get(&key).map(|entry| entry.value().clone()))
    }

    async fn compare_and_set_used(
        &self,
        promotion_id: &str,
        user_id: &str,
    ) -> Result<bool, StoreError> {
        let key = (promotion_id.to_string(), user_id.to_string());
        match self.records.get_mut(&key) {
            Some(mut record) if !record.is_used => {
                record.is_used = true;
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Ok(false),
        }
    }

    async fn put(&self, record: PromotionRecord) -> Result<(), StoreError> {
        let key = (record.promotion_id.clone(), record.user_id.clone());
        self.records.insert(key, record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use std::sync::Arc;

    fn record() -> PromotionRecord {
        PromotionRecord {
            promotion_id: "P1".to_string(),
            user_id: "U1".to_string(),
            venue_name: "Cafe X".to_string(),
            promotion_expire_date: Utc::now() + Duration::days(30),
            is_used: false,
        }
    }

    #[tokio::test]
    async fn test_compare_and_set_flips_exactly_once() {
        let store = InMemoryPromotionStore::new();
        store.put(record()).await.unwrap();

        assert!(store.compare_and_set_used("P1", "U1").await.unwrap());
        assert!(!store.compare_and_set_used("P1", "U1").await.unwrap());
        assert!(store.get("P1", "U1").await.unwrap().unwrap().is_used);
    }

    #[tokio::test]
    async fn test_compare_and_set_on_missing_record_is_false() {
        let store = InMemoryPromotionStore::new();
        assert!(!store.compare_and_set_used("P1", "U1").await.unwrap());
    }

    #[tokio::test]
    async fn test_get_misses_on_wrong_user() {
        let store = InMemoryPromotionStore::new();
        store.put(record()).await.unwrap();

        assert!(store.get("P1", "U2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_compare_and_set_has_single_winner() {
        let store = Arc::new(InMemoryPromotionStore::new());
        store.put(record()).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.compare_and_set_used("P1", "U1").await.unwrap()
            }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }
}
