//! Request/response DTOs and the API error envelope.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::ai::AiError;
use crate::task::{Category, PageMeta, Priority, SortOrder, Task, TaskError};

/// JSON error envelope shared by all endpoints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub status_code: u16,
    pub message: String,
    pub error: String,
}

/// Handler error type. Maps the closed domain error sets onto HTTP statuses
/// with one exhaustive match; nothing is registered at runtime.
#[derive(Debug)]
pub enum ApiError {
    Task(TaskError),
    Ai(AiError),
    BadRequest(String),
}

impl From<TaskError> for ApiError {
    fn from(err: TaskError) -> Self {
        ApiError::Task(err)
    }
}

impl From<AiError> for ApiError {
    fn from(err: AiError) -> Self {
        ApiError::Ai(err)
    }
}

impl ApiError {
    fn status_and_message(self) -> (StatusCode, String) {
        match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Task(err) => match err {
                TaskError::TitleRequired => (StatusCode::BAD_REQUEST, err.to_string()),
                TaskError::AlreadyCompleted => (StatusCode::CONFLICT, err.to_string()),
                TaskError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
                TaskError::Storage(e) => {
                    tracing::error!("Storage failure: {}", e);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal server error".to_string(),
                    )
                }
            },
            ApiError::Ai(err) => match err {
                AiError::Validation(message) => (StatusCode::BAD_REQUEST, message),
                AiError::QuotaExceeded => (StatusCode::TOO_MANY_REQUESTS, err.to_string()),
                AiError::Generation => (StatusCode::BAD_GATEWAY, err.to_string()),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        let body = ErrorBody {
            status_code: status.as_u16(),
            message,
            error: status.canonical_reason().unwrap_or("Error").to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub suggested_deadline: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub priority: Option<Priority>,
    /// Absent means "leave unchanged"; explicit null clears the deadline.
    #[serde(default, deserialize_with = "double_option")]
    pub suggested_deadline: Option<Option<String>>,
    pub is_completed: Option<bool>,
}

fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    pub id: Uuid,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    pub suggested_deadline: Option<DateTime<Utc>>,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            category: task.category,
            priority: task.priority,
            suggested_deadline: task.deadline,
            is_completed: task.is_completed,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

/// `{ data, meta }` list envelope.
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListTasksQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub completed: Option<bool>,
    pub priority: Option<Priority>,
    pub category: Option<Category>,
    pub sort: Option<SortOrder>,
}

#[derive(Debug, Deserialize)]
pub struct EnhanceRequest {
    /// Raw text to infer a task from.
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct SubtasksRequest {
    /// Task title to break down.
    pub title: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: ApiError) -> StatusCode {
        err.status_and_message().0
    }

    #[test]
    fn error_kinds_map_to_distinct_statuses() {
        assert_eq!(
            status_of(ApiError::Ai(AiError::Validation("too long".to_string()))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(ApiError::Ai(AiError::QuotaExceeded)),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            status_of(ApiError::Ai(AiError::Generation)),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn task_errors_map_to_expected_statuses() {
        assert_eq!(
            status_of(ApiError::Task(TaskError::TitleRequired)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(ApiError::Task(TaskError::AlreadyCompleted)),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(ApiError::Task(TaskError::NotFound(Uuid::new_v4()))),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn update_request_distinguishes_null_from_absent() {
        let with_null: UpdateTaskRequest =
            serde_json::from_str(r#"{"suggestedDeadline": null}"#).unwrap();
        assert_eq!(with_null.suggested_deadline, Some(None));

        let absent: UpdateTaskRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.suggested_deadline, None);
    }
}
