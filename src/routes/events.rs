//! Event endpoints.

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use validator::Validate;

use crate::auth::CurrentUser;
use crate::models::Event;
use crate::patch::merge;
use crate::schemas::{EventCreate, EventPatch, EventResponse};
use crate::state::AppState;
use crate::{Error, Result};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/events/", post(create_event).get(list_events))
        .route("/events/:event_id", get(get_event).put(update_event).delete(delete_event))
}

/// Fetch an event scoped to its owner, or fail with not-found.
pub(crate) async fn fetch_event(pool: &SqlitePool, event_id: i64, owner: i64) -> Result<Event> {
    let event: Option<Event> = sqlx::query_as(
        "SELECT id, user_id, title, start_time, end_time, location, color_code \
         FROM events WHERE id = $1 AND user_id = $2",
    )
    .bind(event_id)
    .bind(owner)
    .fetch_optional(pool)
    .await?;

    event.ok_or_else(|| Error::NotFound("Event not found.".to_string()))
}

/// Verify a referenced event exists for the owner.
pub(crate) async fn ensure_event(pool: &SqlitePool, event_id: i64, owner: i64) -> Result<()> {
    fetch_event(pool, event_id, owner).await.map(|_| ())
}

async fn create_event(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<EventCreate>,
) -> Result<Json<EventResponse>> {
    body.validate().map_err(|e| Error::Validation(e.to_string()))?;

    let event: Event = sqlx::query_as(
        "INSERT INTO events (user_id, title, start_time, end_time, location, color_code) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING id, user_id, title, start_time, end_time, location, color_code",
    )
    .bind(user.id)
    .bind(&body.title)
    .bind(body.start_time)
    .bind(body.end_time)
    .bind(&body.location)
    .bind(&body.color_code)
    .fetch_one(&state.pool)
    .await?;

    Ok(Json(event.into()))
}

async fn list_events(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<EventResponse>>> {
    let events: Vec<Event> = sqlx::query_as(
        "SELECT id, user_id, title, start_time, end_time, location, color_code \
         FROM events WHERE user_id = $1 ORDER BY id",
    )
    .bind(user.id)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(events.into_iter().map(EventResponse::from).collect()))
}

async fn get_event(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(event_id): Path<i64>,
) -> Result<Json<EventResponse>> {
    let event = fetch_event(&state.pool, event_id, user.id).await?;
    Ok(Json(event.into()))
}

async fn update_event(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(event_id): Path<i64>,
    Json(body): Json<EventPatch>,
) -> Result<Json<EventResponse>> {
    let mut event = fetch_event(&state.pool, event_id, user.id).await?;

    merge(&mut event.title, body.title);
    merge(&mut event.start_time, body.start_time);
    merge(&mut event.end_time, body.end_time);
    body.location.apply_to(&mut event.location);
    merge(&mut event.color_code, body.color_code);

    sqlx::query(
        "UPDATE events SET title = $1, start_time = $2, end_time = $3, location = $4, \
                           color_code = $5 \
         WHERE id = $6 AND user_id = $7",
    )
    .bind(&event.title)
    .bind(event.start_time)
    .bind(event.end_time)
    .bind(&event.location)
    .bind(&event.color_code)
    .bind(event.id)
    .bind(user.id)
    .execute(&state.pool)
    .await?;

    Ok(Json(event.into()))
}

async fn delete_event(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(event_id): Path<i64>,
) -> Result<Json<Value>> {
    let result = sqlx::query("DELETE FROM events WHERE id = $1 AND user_id = $2")
        .bind(event_id)
        .bind(user.id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound("Event not found.".to_string()));
    }

    Ok(Json(json!({ "detail": "Event deleted" })))
}
