//! Task API endpoints
//!
//! RESTful API for task CRUD operations.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use tasklist_core::task::{NewTask, Pagination, Task, TaskFilter, TaskPatch, TaskStatus};
use tasklist_core::Error;

use crate::state::AppState;

const DATE_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    pub due_date: String,
}

/// Partial update; absent or empty fields keep their current value
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTaskRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListTasksQuery {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct TaskMessageResponse {
    pub message: String,
    pub task: Task,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct PaginationResponse {
    pub current_page: u32,
    pub total_pages: u64,
    pub total_tasks: u64,
}

#[derive(Debug, Serialize)]
pub struct ListTasksResponse {
    pub tasks: Vec<Task>,
    pub pagination: PaginationResponse,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(message: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// Map a core error to a response; store failures only expose `failure`
fn api_error(failure: &'static str) -> impl Fn(Error) -> ApiError {
    move |err| {
        let (status, message) = match &err {
            Error::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
            Error::ValidationFailed(_) => (StatusCode::BAD_REQUEST, err.to_string()),
            Error::StoreUnavailable(e) => {
                tracing::error!(error = %e, "{}", failure);
                (StatusCode::INTERNAL_SERVER_ERROR, failure.to_string())
            }
        };

        (status, Json(ErrorResponse { error: message }))
    }
}

/// Treat missing and blank text the same way
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

fn parse_status(raw: Option<String>) -> Result<Option<TaskStatus>, ApiError> {
    non_blank(raw)
        .map(|raw| raw.parse::<TaskStatus>())
        .transpose()
        .map_err(api_error("Invalid status"))
}

fn parse_due_date(raw: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| bad_request(format!("due_date must be YYYY-MM-DD (got {:?})", raw)))
}

fn parse_id(id: Result<Path<i64>, PathRejection>) -> Result<i64, ApiError> {
    id.map(|Path(id)| id)
        .map_err(|_| bad_request("task id must be an integer"))
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/tasks - List tasks with optional filters and pagination
async fn list_tasks(
    State(state): State<AppState>,
    query: Result<Query<ListTasksQuery>, QueryRejection>,
) -> Result<Json<ListTasksResponse>, ApiError> {
    let Query(query) = query.map_err(|e| bad_request(e.body_text()))?;

    let mut filter = TaskFilter::default();
    if let Some(status) = parse_status(query.status)? {
        filter = filter.with_status(status);
    }
    if let Some(search) = non_blank(query.search) {
        filter = filter.with_search(search);
    }

    let pagination = Pagination::new(
        query.page.unwrap_or(Pagination::DEFAULT_PAGE),
        query.limit.unwrap_or(Pagination::DEFAULT_LIMIT),
    );

    let page = state
        .tasks()
        .list(&filter, pagination)
        .await
        .map_err(api_error("Failed to retrieve tasks"))?;

    let pagination = PaginationResponse {
        current_page: page.page,
        total_pages: page.total_pages(),
        total_tasks: page.total,
    };

    Ok(Json(ListTasksResponse {
        tasks: page.tasks,
        pagination,
    }))
}

/// POST /api/tasks - Create a new task
async fn create_task(
    State(state): State<AppState>,
    body: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TaskMessageResponse>), ApiError> {
    let Json(req) = body.map_err(|e| bad_request(e.body_text()))?;

    let mut task = NewTask::new(req.title, parse_due_date(&req.due_date)?);
    if let Some(description) = non_blank(req.description) {
        task = task.with_description(description);
    }
    if let Some(status) = parse_status(req.status)? {
        task = task.with_status(status);
    }

    let created = state
        .tasks()
        .create(task)
        .await
        .map_err(api_error("Failed to create task"))?;

    Ok((
        StatusCode::CREATED,
        Json(TaskMessageResponse {
            message: "Task created successfully".to_string(),
            task: created,
        }),
    ))
}

/// GET /api/tasks/{id} - Get a single task
async fn get_task(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Task>, ApiError> {
    let id = parse_id(id)?;
    let task = state
        .tasks()
        .get(id)
        .await
        .map_err(api_error("Failed to retrieve task"))?;
    Ok(Json(task))
}

/// PUT/PATCH /api/tasks/{id} - Merge supplied fields into a task
async fn update_task(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> Result<Json<TaskMessageResponse>, ApiError> {
    let id = parse_id(id)?;
    let Json(req) = body.map_err(|e| bad_request(e.body_text()))?;

    let patch = TaskPatch {
        title: non_blank(req.title),
        description: non_blank(req.description),
        status: parse_status(req.status)?,
        due_date: non_blank(req.due_date)
            .map(|raw| parse_due_date(&raw))
            .transpose()?,
    };

    let updated = state
        .tasks()
        .update(id, patch)
        .await
        .map_err(api_error("Failed to update task"))?;

    Ok(Json(TaskMessageResponse {
        message: "Task updated successfully".to_string(),
        task: updated,
    }))
}

/// DELETE /api/tasks/{id} - Delete a task
async fn delete_task(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_id(id)?;
    state
        .tasks()
        .delete(id)
        .await
        .map_err(api_error("Failed to delete task"))?;

    Ok(Json(MessageResponse {
        message: "Task deleted successfully".to_string(),
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route(
            "/api/tasks/{id}",
            get(get_task)
                .put(update_task)
                .patch(update_task)
                .delete(delete_task),
        )
}
