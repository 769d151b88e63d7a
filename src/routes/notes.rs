//! Note endpoints.

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use validator::Validate;

use crate::auth::CurrentUser;
use crate::models::Note;
use crate::patch::{merge, Patch};
use crate::routes::categories::ensure_category;
use crate::routes::events::ensure_event;
use crate::schemas::{NoteCreate, NotePatch, NoteResponse};
use crate::state::AppState;
use crate::{Error, Result};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/notes/", post(create_note).get(list_notes))
        .route("/notes/:note_id", get(get_note).put(update_note).delete(delete_note))
}

async fn fetch_note(pool: &SqlitePool, note_id: i64, owner: i64) -> Result<Note> {
    let note: Option<Note> = sqlx::query_as(
        "SELECT id, user_id, category_id, event_id, title, content, color_code, created_at \
         FROM notes WHERE id = $1 AND user_id = $2",
    )
    .bind(note_id)
    .bind(owner)
    .fetch_optional(pool)
    .await?;

    note.ok_or_else(|| Error::NotFound("Note not found.".to_string()))
}

async fn create_note(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<NoteCreate>,
) -> Result<Json<NoteResponse>> {
    body.validate().map_err(|e| Error::Validation(e.to_string()))?;

    if let Some(category_id) = body.category_id {
        ensure_category(&state.pool, category_id, user.id).await?;
    }
    if let Some(event_id) = body.event_id {
        ensure_event(&state.pool, event_id, user.id).await?;
    }

    let note: Note = sqlx::query_as(
        "INSERT INTO notes (user_id, category_id, event_id, title, content, color_code, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         RETURNING id, user_id, category_id, event_id, title, content, color_code, created_at",
    )
    .bind(user.id)
    .bind(body.category_id)
    .bind(body.event_id)
    .bind(&body.title)
    .bind(&body.content)
    .bind(&body.color_code)
    .bind(Utc::now().naive_utc())
    .fetch_one(&state.pool)
    .await?;

    Ok(Json(note.into()))
}

async fn list_notes(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<NoteResponse>>> {
    let notes: Vec<Note> = sqlx::query_as(
        "SELECT id, user_id, category_id, event_id, title, content, color_code, created_at \
         FROM notes WHERE user_id = $1 ORDER BY id",
    )
    .bind(user.id)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(notes.into_iter().map(NoteResponse::from).collect()))
}

async fn get_note(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(note_id): Path<i64>,
) -> Result<Json<NoteResponse>> {
    let note = fetch_note(&state.pool, note_id, user.id).await?;
    Ok(Json(note.into()))
}

async fn update_note(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(note_id): Path<i64>,
    Json(body): Json<NotePatch>,
) -> Result<Json<NoteResponse>> {
    let mut note = fetch_note(&state.pool, note_id, user.id).await?;

    if let Patch::Value(category_id) = body.category_id {
        ensure_category(&state.pool, category_id, user.id).await?;
    }
    if let Patch::Value(event_id) = body.event_id {
        ensure_event(&state.pool, event_id, user.id).await?;
    }

    merge(&mut note.title, body.title);
    merge(&mut note.content, body.content);
    body.category_id.apply_to(&mut note.category_id);
    body.event_id.apply_to(&mut note.event_id);
    merge(&mut note.color_code, body.color_code);

    sqlx::query(
        "UPDATE notes SET category_id = $1, event_id = $2, title = $3, content = $4, \
                          color_code = $5 \
         WHERE id = $6 AND user_id = $7",
    )
    .bind(note.category_id)
    .bind(note.event_id)
    .bind(&note.title)
    .bind(&note.content)
    .bind(&note.color_code)
    .bind(note.id)
    .bind(user.id)
    .execute(&state.pool)
    .await?;

    Ok(Json(note.into()))
}

async fn delete_note(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(note_id): Path<i64>,
) -> Result<Json<Value>> {
    let result = sqlx::query("DELETE FROM notes WHERE id = $1 AND user_id = $2")
        .bind(note_id)
        .bind(user.id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound("Note not found.".to_string()));
    }

    Ok(Json(json!({ "detail": "Note deleted" })))
}
