//! Task CRUD handlers.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use crate::task::{ListParams, Task, TaskUpdate};

use super::routes::AppState;
use super::types::{
    ApiError, CreateTaskRequest, ListTasksQuery, PaginatedResponse, TaskResponse,
    UpdateTaskRequest,
};

/// The create and update contracts both require a 3+ character title.
fn check_title_length(title: &str) -> Result<(), ApiError> {
    if title.trim().chars().count() < 3 {
        return Err(ApiError::BadRequest(
            "Title must be at least 3 characters long".to_string(),
        ));
    }
    Ok(())
}

pub async fn create_task(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<TaskResponse>), ApiError> {
    check_title_length(&req.title)?;

    let task = Task::create(
        &req.title,
        req.description,
        req.category,
        req.priority,
        req.suggested_deadline.as_deref(),
    )?;
    state.tasks.create(&task).await?;

    Ok((StatusCode::CREATED, Json(task.into())))
}

pub async fn list_tasks(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListTasksQuery>,
) -> Result<Json<PaginatedResponse<TaskResponse>>, ApiError> {
    let params = ListParams {
        page: query.page.unwrap_or(1),
        limit: query.limit.unwrap_or(10),
        search: query.search,
        completed: query.completed,
        priority: query.priority,
        category: query.category,
        sort: query.sort.unwrap_or_default(),
    };

    let page = state.tasks.list(&params).await?;
    Ok(Json(PaginatedResponse {
        data: page.items.into_iter().map(Into::into).collect(),
        meta: page.meta,
    }))
}

pub async fn get_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<TaskResponse>, ApiError> {
    let task = state.tasks.get(id).await?;
    Ok(Json(task.into()))
}

pub async fn update_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> Result<Json<TaskResponse>, ApiError> {
    if let Some(title) = &req.title {
        check_title_length(title)?;
    }

    let mut task = state.tasks.get(id).await?;
    task.apply(TaskUpdate {
        title: req.title,
        description: req.description,
        category: req.category,
        priority: req.priority,
        deadline: req.suggested_deadline,
        is_completed: req.is_completed,
    })?;
    state.tasks.update(&task).await?;
    Ok(Json(task.into()))
}

pub async fn complete_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<TaskResponse>, ApiError> {
    let mut task = state.tasks.get(id).await?;
    task.complete()?;
    state.tasks.update(&task).await?;
    Ok(Json(task.into()))
}

pub async fn delete_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.tasks.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
