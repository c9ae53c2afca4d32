pub mod config;
pub mod error;
pub mod fetcher;
pub mod github;
pub mod issue;
pub mod observer;
pub mod query;
pub mod view_model;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use config::AppConfig;
use error::IssuesError;
use fetcher::IssueSource;
use github::GitHubClient;
use observer::TracingListener;
use query::{QueryParameters, QueryUpdate};
use serde::Serialize;
use std::sync::Arc;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use view_model::{IssuesView, IssuesViewModel};

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
pub struct FetchAccepted {
    generation: u64,
}

/// Shared application state accessible to all request handlers.
pub struct AppState {
    /// The single view-model every handler reads and drives.
    pub view_model: Arc<IssuesViewModel>,
    /// Application configuration loaded from environment variables.
    pub config: AppConfig,
}

impl AppState {
    /// Initializes the application state backed by the GitHub API.
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let client = GitHubClient::new(&config.api_base_url(), config.github_token.clone())?;
        Ok(Self::with_source(config, Arc::new(client)))
    }

    /// Initializes the application state with an arbitrary issue source.
    pub fn with_source(config: AppConfig, source: Arc<dyn IssueSource>) -> Self {
        let view_model = Arc::new(IssuesViewModel::new(
            source,
            config.api_base_url(),
            config.initial_query(),
        ));
        view_model.subscribe(Arc::new(TracingListener));
        Self { view_model, config }
    }
}

pub fn create_app(state: Arc<AppState>) -> Router {
    let serve_dir = ServeDir::new("dist").not_found_service(ServeFile::new("dist/index.html"));

    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/query", get(get_query).put(update_query))
        .route("/api/issues", get(get_issues))
        .route("/api/issues/fetch", post(fetch_issues))
        .fallback_service(serve_dir)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "issues-search",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn get_query(State(state): State<Arc<AppState>>) -> Json<QueryParameters> {
    Json(state.view_model.query())
}

pub async fn update_query(
    State(state): State<Arc<AppState>>,
    Json(update): Json<QueryUpdate>,
) -> Json<QueryParameters> {
    Json(state.view_model.update_query(update))
}

pub async fn get_issues(State(state): State<Arc<AppState>>) -> Json<IssuesView> {
    Json(state.view_model.snapshot())
}

pub async fn fetch_issues(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<FetchAccepted>), (StatusCode, String)> {
    match state.view_model.trigger_fetch() {
        Ok(generation) => Ok((StatusCode::ACCEPTED, Json(FetchAccepted { generation }))),
        Err(e @ IssuesError::InvalidParameters(_)) => {
            tracing::warn!("Rejected fetch: {}", e);
            Err((StatusCode::BAD_REQUEST, e.to_string()))
        }
        Err(e) => {
            tracing::error!("Failed to start fetch: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error".to_string(),
            ))
        }
    }
}
