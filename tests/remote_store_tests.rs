// ============================================================================
// REMOTE STORE TESTS - HTTP promotion backend client against wiremock
// ============================================================================

use std::time::Duration;

use chrono::Utc;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use brewpass_ws::domains::promotions::models::PromotionRecord;
use brewpass_ws::store::{PromotionStore, RemotePromotionStore, StoreError};

fn sample_record() -> PromotionRecord {
    PromotionRecord {
        promotion_id: "P1".to_string(),
        user_id: "U1".to_string(),
        venue_name: "Cafe X".to_string(),
        promotion_expire_date: Utc::now() + chrono::Duration::days(30),
        is_used: false,
    }
}

fn store_for(server: &MockServer, api_key: Option<&str>) -> RemotePromotionStore {
    RemotePromotionStore::new(
        server.uri(),
        api_key.map(String::from),
        Duration::from_secs(5),
    )
    .unwrap()
}

#[tokio::test]
async fn test_lookup_returns_record() {
    let server = MockServer::start().await;
    let record = sample_record();

    Mock::given(method("GET"))
        .and(path("/api/v1/promotions/P1"))
        .and(query_param("userId", "U1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&record))
        .mount(&server)
        .await;

    let found = store_for(&server, None).get("P1", "U1").await.unwrap();
    assert_eq!(found, Some(record));
}

#[tokio::test]
async fn test_lookup_maps_404_to_absent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/promotions/P404"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let found = store_for(&server, None).get("P404", "U1").await.unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn test_lookup_maps_5xx_to_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/promotions/P1"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = store_for(&server, None).get("P1", "U1").await.unwrap_err();
    assert!(matches!(err, StoreError::Unavailable(_)));
}

#[tokio::test]
async fn test_compare_and_set_reports_update() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/promotions/P1/redeem"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "updated": true })),
        )
        .mount(&server)
        .await;

    assert!(store_for(&server, None)
        .compare_and_set_used("P1", "U1")
        .await
        .unwrap());
}

#[tokio::test]
async fn test_compare_and_set_maps_conflict_to_lost_race() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/promotions/P1/redeem"))
        .respond_with(ResponseTemplate::new(409))
        .mount(&server)
        .await;

    assert!(!store_for(&server, None)
        .compare_and_set_used("P1", "U1")
        .await
        .unwrap());
}

#[tokio::test]
async fn test_scanner_credential_is_sent_as_bearer() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/promotions/P1"))
        .and(header("authorization", "Bearer scanner-key"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let found = store_for(&server, Some("scanner-key"))
        .get("P1", "U1")
        .await
        .unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn test_put_record_round_trips() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/v1/promotions/P1"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;

    store_for(&server, None).put(sample_record()).await.unwrap();
}
