//! AI generation endpoints.
//!
//! The provider credential arrives in the `x-api-key` header and is passed
//! through to the pipeline untouched; its shape is validated there, before
//! any network call. Successful generations create one task record per item,
//! sequentially, before the response is returned.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;

use crate::ai::{self, GeneratedTask};
use crate::task::Task;

use super::routes::AppState;
use super::types::{ApiError, EnhanceRequest, SubtasksRequest};

fn api_key(headers: &HeaderMap) -> &str {
    headers
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

async fn create_from_generated(
    state: &AppState,
    generated: &GeneratedTask,
) -> Result<(), ApiError> {
    let task = Task::create(
        &generated.title,
        Some(generated.description.clone()),
        Some(generated.category),
        Some(generated.priority),
        generated.suggested_deadline.as_deref(),
    )?;
    state.tasks.create(&task).await?;
    Ok(())
}

/// `POST /api/ai/enhance` - turn free text into one structured task.
pub async fn enhance(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<EnhanceRequest>,
) -> Result<(StatusCode, Json<GeneratedTask>), ApiError> {
    let generated =
        ai::enhance_task(state.generator.as_ref(), &req.text, api_key(&headers)).await?;

    create_from_generated(&state, &generated).await?;

    Ok((StatusCode::CREATED, Json(generated)))
}

/// `POST /api/ai/tasks` - break a title into subtasks and create them all.
pub async fn suggest_subtasks(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<SubtasksRequest>,
) -> Result<(StatusCode, Json<Vec<GeneratedTask>>), ApiError> {
    let generated =
        ai::suggest_subtasks(state.generator.as_ref(), &req.title, api_key(&headers)).await?;

    for task in &generated {
        create_from_generated(&state, task).await?;
    }

    Ok((StatusCode::CREATED, Json(generated)))
}
