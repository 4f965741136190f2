use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{PromotionStore, StoreError};
use crate::domains::promotions::models::PromotionRecord;

/// HTTP client for the real promotion backend.
///
/// Mapping: 404 is an absent record, 409 is a lost compare-and-set, and
/// timeouts or 5xx responses become transient errors the scanner may retry.
/// A timeout is never reported as a successful update.
pub struct RemotePromotionStore {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CasRequest<'a> {
    user_id: &'a str,
    expected_used: bool,
}

#[derive(Debug, Deserialize)]
struct CasResponse {
    updated: bool,
}

impl RemotePromotionStore {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Unavailable(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn with_auth(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    fn map_transport_error(err: reqwest::Error) -> StoreError {
        if err.is_timeout() {
            StoreError::Timeout
        } else {
            StoreError::Unavailable(err.to_string())
        }
    }
}

#[async_trait]
impl PromotionStore for RemotePromotionStore {
    async fn get(
        &self,
        promotion_id: &str,
        user_id: &str,
    ) -> Result<Option<PromotionRecord>, StoreError> {
        let url = format!(
            "{}/api/v1/promotions/{}?userId={}",
            self.base_url, promotion_id, user_id
        );

        let response = self
            .with_auth(self.client.get(&url))
            .send()
            .await
            .map_err(Self::map_transport_error)?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let record = response
                    .json::<PromotionRecord>()
                    .await
                    .map_err(|e| StoreError::MalformedRecord(e.to_string()))?;
                Ok(Some(record))
            }
            status => {
                warn!(%status, promotion_id, "promotion lookup failed");
                Err(StoreError::Unavailable(format!(
                    "promotion lookup returned {status}"
                )))
            }
        }
    }

    async fn compare_and_set_used(
        &self,
        promotion_id: &str,
        user_id: &str,
    ) -> Result<bool, StoreError> {
        let url = format!(
            "{}/api/v1/promotions/{}/redeem",
            self.base_url, promotion_id
        );

        let response = self
            .with_auth(self.client.post(&url))
            .json(&CasRequest {
                user_id,
                expected_used: false,
            })
            .send()
            .await
            .map_err(Self::map_transport_error)?;

        match response.status() {
            StatusCode::CONFLICT | StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => {
                let body = response
                    .json::<CasResponse>()
                    .await
                    .map_err(|e| StoreError::MalformedRecord(e.to_string()))?;
                Ok(body.updated)
            }
            status => {
                warn!(%status, promotion_id, "promotion update failed");
                Err(StoreError::Unavailable(format!(
                    "promotion update returned {status}"
                )))
            }
        }
    }

    async fn put(&self, record: PromotionRecord) -> Result<(), StoreError> {
        let url = format!(
            "{}/api/v1/promotions/{}",
            self.base_url, record.promotion_id
        );

        let response = self
            .with_auth(self.client.put(&url))
            .json(&record)
            .send()
            .await
            .map_err(Self::map_transport_error)?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(StoreError::Unavailable(format!(
                "promotion write returned {}",
                response.status()
            )))
        }
    }
}
