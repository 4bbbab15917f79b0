//! HTTP route assembly.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::ai::{GeminiClient, GenerativeClient};
use crate::config::Config;
use crate::db;
use crate::task::TaskStore;

use super::ai as ai_api;
use super::tasks as tasks_api;

/// Request body limit (10 KiB); all endpoints accept small JSON payloads.
const BODY_LIMIT: usize = 10 * 1024;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub tasks: TaskStore,
    /// Generative text provider behind the pipeline seam.
    pub generator: Arc<dyn GenerativeClient>,
}

/// Start the HTTP server.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let conn = db::open(&config.database_path)?;
    let generator: Arc<dyn GenerativeClient> =
        Arc::new(GeminiClient::new(config.gemini_model.clone()));

    let state = Arc::new(AppState {
        tasks: TaskStore::new(conn),
        generator,
        config: config.clone(),
    });

    let app = router(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route(
            "/api/tasks",
            post(tasks_api::create_task).get(tasks_api::list_tasks),
        )
        .route(
            "/api/tasks/:id",
            get(tasks_api::get_task)
                .patch(tasks_api::update_task)
                .delete(tasks_api::delete_task),
        )
        .route("/api/tasks/:id/complete", post(tasks_api::complete_task))
        .route("/api/ai/enhance", post(ai_api::enhance))
        .route("/api/ai/tasks", post(ai_api::suggest_subtasks))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
