//! Natural-language ingestion (experimental).
//!
//! Free text goes into the fixed instructional template, the generative
//! model replies with JSON, and we either hand the parse back verbatim
//! (`/ai/parse`) or coerce it into records owned by the caller
//! (`/ai/process`). A reply that is not valid JSON is not an error: the
//! handler degrades to a diagnostic payload carrying the raw text.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tracing::info;

use crate::auth::CurrentUser;
use crate::genai::build_prompt;
use crate::models::{Priority, Recurrence, TaskStatus};
use crate::state::AppState;
use crate::{Error, Result};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/ai/parse", post(parse))
        .route("/ai/process", post(process))
}

#[derive(Debug, Deserialize)]
struct AiRequest {
    text: String,
}

/// The shape the prompt instructs the model to produce. Lenient on
/// purpose: absent sections default to empty, absent fields to null.
#[derive(Debug, Default, Deserialize)]
struct ParsedBatch {
    #[serde(default)]
    tasks: Vec<ParsedTask>,
    #[serde(default)]
    events: Vec<ParsedEvent>,
    #[serde(default)]
    notes: Vec<ParsedNote>,
    #[serde(default)]
    subtasks: Vec<ParsedSubtask>,
}

#[derive(Debug, Deserialize)]
struct ParsedTask {
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    priority_id: Option<i64>,
    #[serde(default)]
    status_id: Option<i64>,
    #[serde(default)]
    recurrence_type_id: Option<i64>,
    #[serde(default)]
    due_date: Option<NaiveDateTime>,
    #[serde(default)]
    color_code: Option<String>,
    #[serde(default)]
    recurrence_end_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
struct ParsedEvent {
    title: String,
    start_time: NaiveDateTime,
    end_time: NaiveDateTime,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    color_code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ParsedNote {
    title: String,
    content: String,
    #[serde(default)]
    event_lookup: Option<EventLookup>,
}

#[derive(Debug, Deserialize)]
struct ParsedSubtask {
    title: String,
    #[serde(default)]
    is_completed: bool,
    #[serde(default)]
    task_lookup: Option<TaskLookup>,
}

/// Lookup-by-title stand-in for an event the client has no id for yet.
#[derive(Debug, Deserialize)]
struct EventLookup {
    title: String,
    date: NaiveDate,
}

/// Lookup-by-title stand-in for a task the client has no id for yet.
#[derive(Debug, Deserialize)]
struct TaskLookup {
    title: String,
    #[serde(default)]
    due_date: Option<NaiveDateTime>,
}

#[derive(Debug, Default)]
struct IngestSummary {
    tasks: usize,
    events: usize,
    notes: usize,
    subtasks: usize,
    skipped_subtasks: usize,
}

fn diagnostic(raw: String) -> Json<Value> {
    Json(json!({
        "error": "model returned invalid JSON",
        "raw_output": raw,
    }))
}

async fn parse(
    State(state): State<AppState>,
    _user: CurrentUser,
    Json(body): Json<AiRequest>,
) -> Result<Json<Value>> {
    if body.text.trim().is_empty() {
        return Err(Error::Validation("Text cannot be empty.".to_string()));
    }

    let raw = state.generator.generate(&build_prompt(&body.text)).await?;

    match serde_json::from_str::<Value>(&raw) {
        Ok(parsed) => Ok(Json(parsed)),
        Err(_) => Ok(diagnostic(raw)),
    }
}

async fn process(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<AiRequest>,
) -> Result<Json<Value>> {
    if body.text.trim().is_empty() {
        return Err(Error::Validation("Text cannot be empty.".to_string()));
    }

    let raw = state.generator.generate(&build_prompt(&body.text)).await?;

    let batch: ParsedBatch = match serde_json::from_str(&raw) {
        Ok(batch) => batch,
        Err(_) => return Ok(diagnostic(raw)),
    };

    let summary = insert_batch(&state.pool, user.id, batch).await?;
    info!(
        "ingested for user {}: {} tasks, {} events, {} notes, {} subtasks ({} skipped)",
        user.id, summary.tasks, summary.events, summary.notes, summary.subtasks,
        summary.skipped_subtasks
    );

    Ok(Json(json!({
        "message": "Parsed input stored.",
        "created": {
            "tasks": summary.tasks,
            "events": summary.events,
            "notes": summary.notes,
            "subtasks": summary.subtasks,
        },
        "skipped_subtasks": summary.skipped_subtasks,
    })))
}

/// Insert everything the model extracted, owned by the caller.
///
/// Tasks and events go first so that lookup objects on notes and subtasks
/// can resolve against records created in the same batch.
async fn insert_batch(pool: &SqlitePool, owner: i64, batch: ParsedBatch) -> Result<IngestSummary> {
    let mut summary = IngestSummary::default();

    for task in batch.tasks {
        let priority = resolve_priority(pool, task.priority_id).await?;
        let status = resolve_status(pool, task.status_id).await?;
        let recurrence = resolve_recurrence(pool, task.recurrence_type_id).await?;

        sqlx::query(
            "INSERT INTO tasks (user_id, category_id, title, description, priority, status, \
                                recurrence_type, recurrence_end_date, due_date, color_code) \
             VALUES ($1, NULL, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(owner)
        .bind(&task.title)
        .bind(&task.description)
        .bind(priority)
        .bind(status)
        .bind(recurrence)
        .bind(task.recurrence_end_date)
        .bind(task.due_date)
        .bind(task.color_code.as_deref().unwrap_or("#3498db"))
        .execute(pool)
        .await?;
        summary.tasks += 1;
    }

    for event in batch.events {
        sqlx::query(
            "INSERT INTO events (user_id, title, start_time, end_time, location, color_code) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(owner)
        .bind(&event.title)
        .bind(event.start_time)
        .bind(event.end_time)
        .bind(&event.location)
        .bind(event.color_code.as_deref().unwrap_or("#3498db"))
        .execute(pool)
        .await?;
        summary.events += 1;
    }

    for note in batch.notes {
        let event_id = match &note.event_lookup {
            Some(lookup) => find_event(pool, owner, lookup).await?,
            None => None,
        };

        sqlx::query(
            "INSERT INTO notes (user_id, category_id, event_id, title, content, color_code, \
                                created_at) \
             VALUES ($1, NULL, $2, $3, $4, '#3498db', $5)",
        )
        .bind(owner)
        .bind(event_id)
        .bind(&note.title)
        .bind(&note.content)
        .bind(chrono::Utc::now().naive_utc())
        .execute(pool)
        .await?;
        summary.notes += 1;
    }

    for subtask in batch.subtasks {
        let task_id = match &subtask.task_lookup {
            Some(lookup) => find_task(pool, owner, lookup).await?,
            None => None,
        };

        // A subtask cannot exist without a parent task.
        let Some(task_id) = task_id else {
            summary.skipped_subtasks += 1;
            continue;
        };

        sqlx::query("INSERT INTO subtasks (task_id, title, is_completed) VALUES ($1, $2, $3)")
            .bind(task_id)
            .bind(&subtask.title)
            .bind(subtask.is_completed)
            .execute(pool)
            .await?;
        summary.subtasks += 1;
    }

    Ok(summary)
}

async fn resolve_priority(pool: &SqlitePool, id: Option<i64>) -> Result<Priority> {
    let Some(id) = id else {
        return Ok(Priority::default());
    };
    let code: Option<String> = sqlx::query_scalar("SELECT code FROM priority_levels WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(code.and_then(|c| Priority::from_code(&c)).unwrap_or_default())
}

async fn resolve_status(pool: &SqlitePool, id: Option<i64>) -> Result<TaskStatus> {
    let Some(id) = id else {
        return Ok(TaskStatus::default());
    };
    let code: Option<String> = sqlx::query_scalar("SELECT code FROM task_statuses WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(code.and_then(|c| TaskStatus::from_code(&c)).unwrap_or_default())
}

async fn resolve_recurrence(pool: &SqlitePool, id: Option<i64>) -> Result<Recurrence> {
    let Some(id) = id else {
        return Ok(Recurrence::default());
    };
    let code: Option<String> = sqlx::query_scalar("SELECT code FROM recurrence_types WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(code.and_then(|c| Recurrence::from_code(&c)).unwrap_or_default())
}

async fn find_event(pool: &SqlitePool, owner: i64, lookup: &EventLookup) -> Result<Option<i64>> {
    let id: Option<i64> = sqlx::query_scalar(
        "SELECT id FROM events \
         WHERE user_id = $1 AND title = $2 AND date(start_time) = $3 \
         ORDER BY id LIMIT 1",
    )
    .bind(owner)
    .bind(&lookup.title)
    .bind(lookup.date)
    .fetch_optional(pool)
    .await?;
    Ok(id)
}

async fn find_task(pool: &SqlitePool, owner: i64, lookup: &TaskLookup) -> Result<Option<i64>> {
    let id: Option<i64> = match lookup.due_date {
        Some(due_date) => {
            sqlx::query_scalar(
                "SELECT id FROM tasks \
                 WHERE user_id = $1 AND title = $2 AND due_date = $3 \
                 ORDER BY id LIMIT 1",
            )
            .bind(owner)
            .bind(&lookup.title)
            .bind(due_date)
            .fetch_optional(pool)
            .await?
        }
        None => {
            sqlx::query_scalar(
                "SELECT id FROM tasks WHERE user_id = $1 AND title = $2 ORDER BY id LIMIT 1",
            )
            .bind(owner)
            .bind(&lookup.title)
            .fetch_optional(pool)
            .await?
        }
    };
    Ok(id)
}
