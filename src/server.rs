//! JSON HTTP API over the recommendation engine.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/train` | Rebuild the model from the current catalog |
//! | `GET`  | `/recommend/item/{id}?k=` | Items most similar to a catalog item |
//! | `GET`  | `/recommend/keywords?q=&k=` | Items most similar to a free-text query |
//! | `GET`  | `/recommend/category/{id}?k=` | Aggregated recommendations for a category |
//! | `GET`  | `/recommend/group/{id}?k=` | Aggregated recommendations for a product group |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! All error responses share one schema:
//!
//! ```json
//! { "error": { "code": "item_not_found", "message": "no item with id 42" } }
//! ```
//!
//! Error codes: `bad_request` (400), `item_not_found` / `empty_group` (404),
//! `stale_index` / `empty_catalog` (409), `model_not_trained` (503),
//! `internal` (500).
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted to support browser-based
//! storefront clients.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use simrec_core::models::ScoredItem;
use simrec_core::{RecommendError, Recommender};

use crate::config::Config;
use crate::engine::build_recommender;
use crate::scheduler::spawn_refresh_task;

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
struct AppState {
    recommender: Arc<Recommender>,
    /// Result count used when the caller does not pass `?k=`.
    default_k: usize,
}

/// Starts the HTTP server.
///
/// Binds to the address configured in `[server].bind` and registers all
/// route handlers. When `[scheduler].enabled` is set, also spawns the
/// periodic model refresh task. The server runs indefinitely until the
/// process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let recommender = Arc::new(build_recommender(config).await?);

    if config.scheduler.enabled {
        spawn_refresh_task(recommender.clone(), &config.scheduler);
    }

    let state = AppState {
        recommender,
        default_k: config.recommend.default_k,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/train", post(handle_train))
        .route("/recommend/item/{id}", get(handle_recommend_item))
        .route("/recommend/keywords", get(handle_recommend_keywords))
        .route("/recommend/category/{id}", get(handle_recommend_category))
        .route("/recommend/group/{id}", get(handle_recommend_group))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state);

    let bind_addr = &config.server.bind;
    println!("Recommendation server listening on http://{}", bind_addr);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    /// Machine-readable error code (e.g., `"item_not_found"`).
    code: String,
    /// Human-readable error message.
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<RecommendError> for AppError {
    fn from(err: RecommendError) -> Self {
        let (status, code) = match &err {
            RecommendError::ItemNotFound(_) => (StatusCode::NOT_FOUND, "item_not_found"),
            RecommendError::EmptyGroup => (StatusCode::NOT_FOUND, "empty_group"),
            RecommendError::ModelNotTrained => (StatusCode::SERVICE_UNAVAILABLE, "model_not_trained"),
            // The catalog changed under an unrefreshed index.
            RecommendError::ItemNotIndexed(_) => (StatusCode::CONFLICT, "stale_index"),
            RecommendError::EmptyCatalog | RecommendError::EmptyCorpus => {
                (StatusCode::CONFLICT, "empty_catalog")
            }
            RecommendError::Catalog(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        };
        AppError {
            status,
            code: code.to_string(),
            message: err.to_string(),
        }
    }
}

/// Constructs a 400 Bad Request error.
fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

// ============ GET /health ============

/// JSON response body for `GET /health`.
#[derive(Serialize)]
struct HealthResponse {
    /// Always `"ok"` when the server is running.
    status: String,
    /// The crate version from `Cargo.toml`.
    version: String,
    /// Whether a trained model snapshot is currently live.
    model_loaded: bool,
}

async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        model_loaded: state.recommender.current().is_some(),
    })
}

// ============ POST /train ============

/// JSON response body for `POST /train`.
#[derive(Serialize)]
struct TrainResponse {
    /// Number of items in the freshly built index.
    items_indexed: usize,
}

async fn handle_train(State(state): State<AppState>) -> Result<Json<TrainResponse>, AppError> {
    let snapshot = state.recommender.train().await?;
    println!("Model trained over {} items", snapshot.len());
    Ok(Json(TrainResponse {
        items_indexed: snapshot.len(),
    }))
}

// ============ GET /recommend/* ============

/// Query parameters shared by the recommendation endpoints.
#[derive(Deserialize)]
struct RecommendParams {
    /// Maximum number of results.
    k: Option<usize>,
    /// Free-text query (keywords endpoint only).
    q: Option<String>,
}

/// JSON response body for the recommendation endpoints.
#[derive(Serialize)]
struct RecommendResponse {
    recommendations: Vec<ScoredItem>,
}

fn resolve_k(params: &RecommendParams, default_k: usize) -> Result<usize, AppError> {
    match params.k {
        Some(0) => Err(bad_request("k must be >= 1")),
        Some(k) => Ok(k),
        None => Ok(default_k),
    }
}

async fn handle_recommend_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(params): Query<RecommendParams>,
) -> Result<Json<RecommendResponse>, AppError> {
    let k = resolve_k(&params, state.default_k)?;
    let recommendations = state.recommender.recommend_for_item(id, k).await?;
    Ok(Json(RecommendResponse { recommendations }))
}

async fn handle_recommend_keywords(
    State(state): State<AppState>,
    Query(params): Query<RecommendParams>,
) -> Result<Json<RecommendResponse>, AppError> {
    let k = resolve_k(&params, state.default_k)?;
    let query = match params.q.as_deref() {
        Some(q) if !q.trim().is_empty() => q,
        _ => return Err(bad_request("query parameter 'q' must not be empty")),
    };
    let recommendations = state.recommender.recommend_for_keywords(query, k).await?;
    Ok(Json(RecommendResponse { recommendations }))
}

async fn handle_recommend_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(params): Query<RecommendParams>,
) -> Result<Json<RecommendResponse>, AppError> {
    let k = resolve_k(&params, state.default_k)?;
    let recommendations = state.recommender.recommend_for_category(id, k).await?;
    Ok(Json(RecommendResponse { recommendations }))
}

async fn handle_recommend_group(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(params): Query<RecommendParams>,
) -> Result<Json<RecommendResponse>, AppError> {
    let k = resolve_k(&params, state.default_k)?;
    let recommendations = state.recommender.recommend_for_group(id, k).await?;
    Ok(Json(RecommendResponse { recommendations }))
}
