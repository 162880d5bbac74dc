//! Integration tests for the fulfillment webhook pipeline.
//!
//! The axum handlers are exercised directly as async functions; no listener
//! is started. Every webhook reply must be HTTP 200 with a valid envelope.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use herbarium::cache::{CacheManager, CacheStore, MemoryCacheStore};
use herbarium::config::LookupConfig;
use herbarium::source::{SourceError, Table, TableSource};
use herbarium::webhook::server::{cache_status, clear_cache, handle_webhook, rebuild_cache, AppState};
use herbarium::webhook::{MSG_CACHE_NOT_READY, MSG_INTERNAL_ERROR, MSG_QUERY_NOT_FOUND};
use serde_json::{json, Value};
use std::sync::Arc;

struct StaticSource {
    table: Table,
}

impl TableSource for StaticSource {
    fn open_table(&self, _table: &str) -> Result<Table, SourceError> {
        Ok(self.table.clone())
    }

    fn source_id(&self) -> String {
        "static".to_string()
    }
}

fn ginger_state() -> Arc<AppState> {
    let source = StaticSource {
        table: Table {
            header: ["code", "herb", "effect", "description", "loe", "ref"]
                .iter()
                .map(|h| (*h).to_string())
                .collect(),
            rows: vec![
                vec!["H1", "Ginger", "Digestive aid", "Root", "High", "ref1"]
                    .into_iter()
                    .map(String::from)
                    .collect(),
            ],
        },
    };
    let config = LookupConfig { source_id: "static".to_string(), ..LookupConfig::default() };
    let manager = Arc::new(CacheManager::new(
        Arc::new(MemoryCacheStore::new()) as Arc<dyn CacheStore>,
        Arc::new(source) as Arc<dyn TableSource>,
        config,
    ));
    Arc::new(AppState::new(manager).expect("State construction should succeed"))
}

fn fulfillment_body(intent: &str, parameters: Value) -> Bytes {
    serde_json::to_vec(&json!({
        "queryResult": {
            "intent": { "displayName": intent },
            "outputContexts": [ { "name": "ctx", "parameters": parameters } ]
        }
    }))
    .expect("Body should serialize")
    .into()
}

async fn webhook_reply(state: Arc<AppState>, body: Bytes) -> Value {
    let response = handle_webhook(State(state), body).await;
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Body should be readable");
    serde_json::from_slice(&bytes).expect("Reply should be valid JSON")
}

fn fulfillment_text(reply: &Value) -> &str {
    reply["fulfillmentText"].as_str().expect("Reply should carry fulfillmentText")
}

#[tokio::test]
async fn test_scenario_c_cache_not_ready_before_any_build() {
    let state = ginger_state();
    let reply = webhook_reply(state, fulfillment_body("herb_info", json!({ "herb": "h1" }))).await;
    assert_eq!(fulfillment_text(&reply), MSG_CACHE_NOT_READY);
}

#[tokio::test]
async fn test_scenario_d_foreign_intent_is_a_silent_ack() {
    let state = ginger_state();
    let reply = webhook_reply(state, fulfillment_body("weather", json!({ "herb": "h1" }))).await;
    assert_eq!(reply, json!({}));
}

#[tokio::test]
async fn test_scenario_e_missing_query_parameter() {
    let state = ginger_state();
    let reply = webhook_reply(state, fulfillment_body("herb_info", json!({}))).await;
    assert_eq!(fulfillment_text(&reply), MSG_QUERY_NOT_FOUND);
}

#[tokio::test]
async fn test_code_query_resolves_to_row_summary() {
    let state = ginger_state();
    state.manager.get_or_build(true).expect("Build should succeed");

    let reply =
        webhook_reply(Arc::clone(&state), fulfillment_body("herb_info", json!({ "herb": "h1" })))
            .await;
    let text = fulfillment_text(&reply);
    assert!(text.contains("Herb: Ginger (code: H1)"));
    assert!(text.contains("Effect: Digestive aid"));

    // The envelope carries the same text in the messages list.
    assert_eq!(reply["fulfillmentMessages"][0]["text"]["text"][0].as_str(), Some(text));
}

#[tokio::test]
async fn test_name_query_resolves_case_insensitively() {
    let state = ginger_state();
    state.manager.get_or_build(true).expect("Build should succeed");

    let reply = webhook_reply(
        Arc::clone(&state),
        fulfillment_body("herb_info", json!({ "herb": "GINGER" })),
    )
    .await;
    assert!(fulfillment_text(&reply).contains("Ginger"));
}

#[tokio::test]
async fn test_unknown_herb_reply_embeds_the_raw_query() {
    let state = ginger_state();
    state.manager.get_or_build(true).expect("Build should succeed");

    let reply = webhook_reply(
        Arc::clone(&state),
        fulfillment_body("herb_info", json!({ "herb": "valerian" })),
    )
    .await;
    assert!(fulfillment_text(&reply).contains("\"valerian\""));
}

#[tokio::test]
async fn test_fallback_parameter_is_used_when_no_exact_form_exists() {
    let state = ginger_state();
    state.manager.get_or_build(true).expect("Build should succeed");

    let reply = webhook_reply(
        Arc::clone(&state),
        fulfillment_body("herb_info", json!({ "herb.original": "ginger" })),
    )
    .await;
    assert!(fulfillment_text(&reply).contains("Ginger"));
}

#[tokio::test]
async fn test_malformed_payload_yields_the_generic_error_envelope() {
    let state = ginger_state();
    let reply = webhook_reply(state, Bytes::from_static(b"this is not json")).await;
    assert_eq!(fulfillment_text(&reply), MSG_INTERNAL_ERROR);
}

#[tokio::test]
async fn test_admin_rebuild_reports_the_built_snapshot() {
    let state = ginger_state();

    let response = rebuild_cache(State(Arc::clone(&state)))
        .await
        .expect("Rebuild should succeed");
    assert_eq!(response.0.rows, 1);

    let status = cache_status(State(state)).await;
    assert!(status.0.populated);
    assert_eq!(status.0.rows, Some(1));
}

#[tokio::test]
async fn test_admin_clear_empties_the_cache() {
    let state = ginger_state();
    state.manager.get_or_build(true).expect("Build should succeed");

    clear_cache(State(Arc::clone(&state))).await.expect("Clear should succeed");

    let status = cache_status(State(state)).await;
    assert!(!status.0.populated);
    assert_eq!(status.0.rows, None);
}

#[tokio::test]
async fn test_rebuild_failure_surfaces_as_an_admin_error() {
    struct FailingSource;
    impl TableSource for FailingSource {
        fn open_table(&self, table: &str) -> Result<Table, SourceError> {
            Err(SourceError::TableNotFound(table.to_string()))
        }
        fn source_id(&self) -> String {
            "failing".to_string()
        }
    }

    let config = LookupConfig { source_id: "failing".to_string(), ..LookupConfig::default() };
    let manager = Arc::new(CacheManager::new(
        Arc::new(MemoryCacheStore::new()) as Arc<dyn CacheStore>,
        Arc::new(FailingSource) as Arc<dyn TableSource>,
        config,
    ));
    let state = Arc::new(AppState::new(manager).expect("State construction should succeed"));

    let result = rebuild_cache(State(Arc::clone(&state))).await;
    let error = match result {
        Err(error) => error,
        Ok(_) => panic!("Rebuild against a failing source should error"),
    };
    assert_eq!(error.into_response().status(), StatusCode::BAD_GATEWAY);

    // The webhook still answers gracefully afterwards.
    let reply = webhook_reply(state, fulfillment_body("herb_info", json!({ "herb": "h1" }))).await;
    assert_eq!(fulfillment_text(&reply), MSG_CACHE_NOT_READY);
}
