//! Axum server for the fulfillment webhook and the administrative cache
//! endpoints.
//!
//! The webhook route always answers HTTP 200 with a valid envelope; any
//! failure inside the pipeline is converted to the generic error message at
//! this boundary. The admin routes surface build failures as JSON errors,
//! since their callers are operators, not the conversational platform.

use crate::cache::{CacheManager, CacheRead};
use crate::lookup::{LookupOutcome, LookupService};
use crate::webhook::{
    classify_field, envelope::WebhookRequest, format_row_summary, not_found_message,
    WebhookResponse, MSG_CACHE_NOT_READY, MSG_INTERNAL_ERROR, MSG_QUERY_NOT_FOUND,
};
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use regex::Regex;
use serde::Serialize;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Generic success response for admin operations
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub message: String,
}

/// Error response for admin operations
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Response after a cache rebuild
#[derive(Debug, Serialize)]
pub struct RebuildResponse {
    pub message: String,
    pub rows: usize,
    pub table: String,
    pub built_at: String,
}

/// Response describing the current cache entry
#[derive(Debug, Serialize)]
pub struct CacheStatusResponse {
    pub populated: bool,
    pub rows: Option<usize>,
    pub built_at: Option<String>,
    pub source_id: Option<String>,
    pub table: String,
    pub ttl_secs: u64,
}

/// Shared application state
pub struct AppState {
    pub manager: Arc<CacheManager>,
    pub lookup: LookupService,
    pub code_regex: Regex,
}

impl AppState {
    /// Fails when the configured code pattern does not compile; running
    /// `LookupConfig::validate` at startup rules that out.
    pub fn new(manager: Arc<CacheManager>) -> Result<Self, crate::config::ConfigError> {
        let code_regex = manager.config().code_regex()?;
        Ok(Self { lookup: LookupService::new(Arc::clone(&manager)), manager, code_regex })
    }
}

/// Custom error type for the admin API
#[derive(Debug)]
pub enum ApiError {
    BuildFailed(String),
    StoreFailed(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BuildFailed(msg) => (StatusCode::BAD_GATEWAY, msg),
            ApiError::StoreFailed(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

/// Create the router with the webhook and admin routes.
pub fn create_server(manager: Arc<CacheManager>) -> Result<Router, crate::config::ConfigError> {
    let state = Arc::new(AppState::new(manager)?);

    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Ok(Router::new()
        .route("/webhook", post(handle_webhook))
        .route("/admin/cache/rebuild", post(rebuild_cache))
        .route("/admin/cache", delete(clear_cache))
        .route("/admin/cache/status", get(cache_status))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state))
}

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    Json(SuccessResponse { message: "Herbarium webhook is running".to_string() })
}

/// What the webhook pipeline decided to answer with.
enum WebhookReply {
    /// Intent prefix did not match: acknowledge with an empty object.
    Silent,
    Text(String),
}

/// POST /webhook - Dialogflow fulfillment entry point
///
/// The body is taken as raw bytes and parsed inside the pipeline so that
/// even a malformed payload ends in the generic error envelope instead of a
/// framework rejection. The pipeline does synchronous store I/O, so it runs
/// on the blocking pool like the rebuild path does.
pub async fn handle_webhook(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let reply = match tokio::task::spawn_blocking(move || process_webhook(&state, &body)).await {
        Ok(Ok(reply)) => reply,
        Ok(Err(e)) => {
            tracing::error!(error = %e, "Webhook pipeline failed");
            WebhookReply::Text(MSG_INTERNAL_ERROR.to_string())
        }
        Err(e) => {
            tracing::error!(error = %e, "Webhook task failed");
            WebhookReply::Text(MSG_INTERNAL_ERROR.to_string())
        }
    };

    match reply {
        WebhookReply::Silent => Json(serde_json::json!({})).into_response(),
        WebhookReply::Text(text) => Json(WebhookResponse::with_text(text)).into_response(),
    }
}

/// Run one request through extract -> classify -> resolve. Any error
/// propagated from here is mapped to the generic message by the caller.
fn process_webhook(
    state: &AppState,
    body: &[u8],
) -> Result<WebhookReply, Box<dyn std::error::Error + Send + Sync>> {
    let request: WebhookRequest = serde_json::from_slice(body)?;
    let config = state.manager.config();

    let intent = &request.query_result.intent.display_name;
    tracing::debug!(intent = %intent, "Fulfillment request received");

    if !intent.starts_with(&config.intent_prefix) {
        return Ok(WebhookReply::Silent);
    }

    let query =
        match crate::webhook::extract_query(&request.query_result.output_contexts, &config.query_field)
        {
            Some(query) => query,
            None => {
                tracing::debug!("No query text in any output context");
                return Ok(WebhookReply::Text(MSG_QUERY_NOT_FOUND.to_string()));
            }
        };

    let field = classify_field(&query, &state.code_regex, config);
    tracing::debug!(query = %query, field, "Query classified");

    let text = match state.lookup.find(field, &query)? {
        LookupOutcome::CacheEmpty => {
            tracing::info!(query = %query, "Lookup deferred, cache not populated");
            MSG_CACHE_NOT_READY.to_string()
        }
        LookupOutcome::Found(row) => {
            tracing::info!(query = %query, code = row.get("code"), "Lookup hit");
            format_row_summary(&row)
        }
        LookupOutcome::NotFound => {
            tracing::info!(query = %query, "Lookup miss");
            not_found_message(&query)
        }
    };

    Ok(WebhookReply::Text(text))
}

/// POST /admin/cache/rebuild - Force a rebuild from the source of truth
pub async fn rebuild_cache(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RebuildResponse>, ApiError> {
    let manager = Arc::clone(&state.manager);

    // Source reads can be slow; keep them off the request executor.
    let snapshot = tokio::task::spawn_blocking(move || manager.get_or_build(true))
        .await
        .map_err(|e| ApiError::Internal(format!("Rebuild task failed: {}", e)))?
        .map_err(|e| ApiError::BuildFailed(e.to_string()))?;

    Ok(Json(RebuildResponse {
        message: "Cache rebuilt".to_string(),
        rows: snapshot.meta.rows,
        table: snapshot.meta.table_name,
        built_at: snapshot.meta.built_at,
    }))
}

/// DELETE /admin/cache - Remove the cache entry
pub async fn clear_cache(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SuccessResponse>, ApiError> {
    state.manager.invalidate().map_err(|e| ApiError::StoreFailed(e.to_string()))?;
    Ok(Json(SuccessResponse { message: "Cache cleared".to_string() }))
}

/// GET /admin/cache/status - Inspect the current cache entry
pub async fn cache_status(State(state): State<Arc<AppState>>) -> Json<CacheStatusResponse> {
    let config = state.manager.config();
    let response = match state.manager.read_only() {
        CacheRead::Snapshot(snapshot) => CacheStatusResponse {
            populated: true,
            rows: Some(snapshot.meta.rows),
            built_at: Some(snapshot.meta.built_at),
            source_id: Some(snapshot.meta.source_id),
            table: config.table_name.clone(),
            ttl_secs: config.cache_ttl_secs,
        },
        CacheRead::Empty => CacheStatusResponse {
            populated: false,
            rows: None,
            built_at: None,
            source_id: None,
            table: config.table_name.clone(),
            ttl_secs: config.cache_ttl_secs,
        },
    };

    Json(response)
}

/// Start the HTTP server on the specified address
pub async fn start_server(
    addr: &str,
    manager: Arc<CacheManager>,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_server(manager)?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    println!("Herbarium webhook server listening on http://{}", addr);
    println!();
    println!("Available endpoints:");
    println!("  POST   /webhook               - Dialogflow fulfillment webhook");
    println!("  POST   /admin/cache/rebuild   - Rebuild the cache from the source");
    println!("  DELETE /admin/cache           - Clear the cache entry");
    println!("  GET    /admin/cache/status    - Inspect the cache entry");
    println!("  GET    /health                - Health check");
    println!();

    axum::serve(listener, app).await?;

    Ok(())
}
