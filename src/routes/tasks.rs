//! Task and subtask endpoints.

use axum::extract::{Path, State};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use validator::Validate;

use crate::auth::CurrentUser;
use crate::models::{Category, Subtask, Task};
use crate::patch::{merge, Patch};
use crate::routes::categories::ensure_category;
use crate::schemas::{SubtaskCreate, SubtaskPatch, SubtaskResponse, TaskCreate, TaskPatch, TaskResponse};
use crate::state::AppState;
use crate::{Error, Result};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tasks/", post(create_task).get(list_tasks))
        .route("/tasks/:task_id", get(get_task).put(update_task).delete(delete_task))
        .route("/tasks/:task_id/subtasks/", post(create_subtask))
        .route(
            "/tasks/subtasks/:subtask_id",
            put(update_subtask).delete(delete_subtask),
        )
}

/// Fetch a task scoped to its owner, or fail with not-found.
pub(crate) async fn fetch_task(pool: &SqlitePool, task_id: i64, owner: i64) -> Result<Task> {
    let task: Option<Task> = sqlx::query_as(
        "SELECT id, user_id, category_id, title, description, priority, status, \
                recurrence_type, recurrence_end_date, due_date, color_code \
         FROM tasks WHERE id = $1 AND user_id = $2",
    )
    .bind(task_id)
    .bind(owner)
    .fetch_optional(pool)
    .await?;

    task.ok_or_else(|| Error::NotFound("Task not found.".to_string()))
}

/// Attach the related category and subtasks to a task row.
async fn load_task_response(pool: &SqlitePool, task: Task) -> Result<TaskResponse> {
    let category: Option<Category> = match task.category_id {
        Some(category_id) => {
            sqlx::query_as("SELECT id, user_id, name, color_code FROM categories WHERE id = $1")
                .bind(category_id)
                .fetch_optional(pool)
                .await?
        }
        None => None,
    };

    let subtasks: Vec<Subtask> = sqlx::query_as(
        "SELECT id, task_id, title, is_completed FROM subtasks WHERE task_id = $1 ORDER BY id",
    )
    .bind(task.id)
    .fetch_all(pool)
    .await?;

    Ok(TaskResponse::assemble(task, category, subtasks))
}

async fn create_task(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<TaskCreate>,
) -> Result<Json<TaskResponse>> {
    body.validate().map_err(|e| Error::Validation(e.to_string()))?;

    if let Some(category_id) = body.category_id {
        ensure_category(&state.pool, category_id, user.id).await?;
    }

    let task: Task = sqlx::query_as(
        "INSERT INTO tasks (user_id, category_id, title, description, priority, status, \
                            recurrence_type, recurrence_end_date, due_date, color_code) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
         RETURNING id, user_id, category_id, title, description, priority, status, \
                   recurrence_type, recurrence_end_date, due_date, color_code",
    )
    .bind(user.id)
    .bind(body.category_id)
    .bind(&body.title)
    .bind(&body.description)
    .bind(body.priority)
    .bind(body.status)
    .bind(body.recurrence_type)
    .bind(body.recurrence_end_date)
    .bind(body.due_date)
    .bind(&body.color_code)
    .fetch_one(&state.pool)
    .await?;

    let response = load_task_response(&state.pool, task).await?;
    Ok(Json(response))
}

async fn list_tasks(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<TaskResponse>>> {
    let tasks: Vec<Task> = sqlx::query_as(
        "SELECT id, user_id, category_id, title, description, priority, status, \
                recurrence_type, recurrence_end_date, due_date, color_code \
         FROM tasks WHERE user_id = $1 ORDER BY id",
    )
    .bind(user.id)
    .fetch_all(&state.pool)
    .await?;

    let mut responses = Vec::with_capacity(tasks.len());
    for task in tasks {
        responses.push(load_task_response(&state.pool, task).await?);
    }
    Ok(Json(responses))
}

async fn get_task(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(task_id): Path<i64>,
) -> Result<Json<TaskResponse>> {
    let task = fetch_task(&state.pool, task_id, user.id).await?;
    let response = load_task_response(&state.pool, task).await?;
    Ok(Json(response))
}

async fn update_task(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(task_id): Path<i64>,
    Json(body): Json<TaskPatch>,
) -> Result<Json<TaskResponse>> {
    let mut task = fetch_task(&state.pool, task_id, user.id).await?;

    if let Patch::Value(category_id) = body.category_id {
        ensure_category(&state.pool, category_id, user.id).await?;
    }

    merge(&mut task.title, body.title);
    body.description.apply_to(&mut task.description);
    merge(&mut task.priority, body.priority);
    merge(&mut task.status, body.status);
    merge(&mut task.recurrence_type, body.recurrence_type);
    body.recurrence_end_date.apply_to(&mut task.recurrence_end_date);
    body.due_date.apply_to(&mut task.due_date);
    merge(&mut task.color_code, body.color_code);
    body.category_id.apply_to(&mut task.category_id);

    sqlx::query(
        "UPDATE tasks SET category_id = $1, title = $2, description = $3, priority = $4, \
                          status = $5, recurrence_type = $6, recurrence_end_date = $7, \
                          due_date = $8, color_code = $9 \
         WHERE id = $10 AND user_id = $11",
    )
    .bind(task.category_id)
    .bind(&task.title)
    .bind(&task.description)
    .bind(task.priority)
    .bind(task.status)
    .bind(task.recurrence_type)
    .bind(task.recurrence_end_date)
    .bind(task.due_date)
    .bind(&task.color_code)
    .bind(task.id)
    .bind(user.id)
    .execute(&state.pool)
    .await?;

    let response = load_task_response(&state.pool, task).await?;
    Ok(Json(response))
}

async fn delete_task(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(task_id): Path<i64>,
) -> Result<Json<Value>> {
    let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
        .bind(task_id)
        .bind(user.id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound("Task not found.".to_string()));
    }

    Ok(Json(json!({ "detail": "Task deleted" })))
}

async fn create_subtask(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(task_id): Path<i64>,
    Json(body): Json<SubtaskCreate>,
) -> Result<Json<SubtaskResponse>> {
    body.validate().map_err(|e| Error::Validation(e.to_string()))?;

    // The parent must exist and belong to the caller.
    fetch_task(&state.pool, task_id, user.id).await?;

    let subtask: Subtask = sqlx::query_as(
        "INSERT INTO subtasks (task_id, title, is_completed) VALUES ($1, $2, $3) \
         RETURNING id, task_id, title, is_completed",
    )
    .bind(task_id)
    .bind(&body.title)
    .bind(body.is_completed)
    .fetch_one(&state.pool)
    .await?;

    Ok(Json(subtask.into()))
}

async fn update_subtask(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(subtask_id): Path<i64>,
    Json(body): Json<SubtaskPatch>,
) -> Result<Json<SubtaskResponse>> {
    let subtask: Option<Subtask> = sqlx::query_as(
        "SELECT s.id, s.task_id, s.title, s.is_completed \
         FROM subtasks s JOIN tasks t ON t.id = s.task_id \
         WHERE s.id = $1 AND t.user_id = $2",
    )
    .bind(subtask_id)
    .bind(user.id)
    .fetch_optional(&state.pool)
    .await?;

    let mut subtask = subtask.ok_or_else(|| Error::NotFound("Subtask not found.".to_string()))?;

    merge(&mut subtask.title, body.title);
    merge(&mut subtask.is_completed, body.is_completed);

    sqlx::query("UPDATE subtasks SET title = $1, is_completed = $2 WHERE id = $3")
        .bind(&subtask.title)
        .bind(subtask.is_completed)
        .bind(subtask.id)
        .execute(&state.pool)
        .await?;

    Ok(Json(subtask.into()))
}

async fn delete_subtask(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(subtask_id): Path<i64>,
) -> Result<Json<Value>> {
    let result = sqlx::query(
        "DELETE FROM subtasks WHERE id = $1 \
         AND task_id IN (SELECT id FROM tasks WHERE user_id = $2)",
    )
    .bind(subtask_id)
    .bind(user.id)
    .execute(&state.pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound("Subtask not found.".to_string()));
    }

    Ok(Json(json!({ "detail": "Subtask deleted" })))
}
