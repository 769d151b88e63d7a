//! Auth endpoints: registration, login, and the current account.

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::info;
use validator::Validate;

use crate::auth::CurrentUser;
use crate::error::is_unique_violation;
use crate::models::User;
use crate::schemas::{LoginRequest, LoginResponse, RegisterRequest, UserResponse};
use crate::state::AppState;
use crate::{Error, Result};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me).delete(delete_me))
}

async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<Json<UserResponse>> {
    body.validate().map_err(|e| Error::Validation(e.to_string()))?;

    let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE email = $1")
        .bind(&body.email)
        .fetch_optional(&state.pool)
        .await?;
    if existing.is_some() {
        return Err(Error::Conflict("Email already registered.".to_string()));
    }

    let user: User = sqlx::query_as(
        "INSERT INTO users (username, email, password_hash, birth_date, created_at) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING id, username, email, password_hash, birth_date, created_at",
    )
    .bind(&body.username)
    .bind(&body.email)
    .bind(&body.password)
    .bind(body.birth_date)
    .bind(Utc::now().naive_utc())
    .fetch_one(&state.pool)
    .await
    .map_err(|e| {
        // Concurrent registration can still lose the race after the pre-check.
        if is_unique_violation(&e) {
            Error::Conflict("Email already registered.".to_string())
        } else {
            e.into()
        }
    })?;

    info!("registered user {} ({})", user.id, user.email);
    Ok(Json(user.into()))
}

async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let user: Option<User> = sqlx::query_as(
        "SELECT id, username, email, password_hash, birth_date, created_at \
         FROM users WHERE email = $1",
    )
    .bind(&body.email)
    .fetch_optional(&state.pool)
    .await?;

    let Some(user) = user else {
        return Err(Error::NotFound("User not found.".to_string()));
    };

    if user.password_hash != body.password {
        return Err(Error::Auth("Incorrect password.".to_string()));
    }

    let token = state.auth.issue(&user)?;
    Ok(Json(LoginResponse {
        message: "Login successful.".to_string(),
        user_id: user.id,
        token,
    }))
}

async fn me(State(state): State<AppState>, user: CurrentUser) -> Result<Json<UserResponse>> {
    let row: Option<User> = sqlx::query_as(
        "SELECT id, username, email, password_hash, birth_date, created_at \
         FROM users WHERE id = $1",
    )
    .bind(user.id)
    .fetch_optional(&state.pool)
    .await?;

    row.map(|u| Json(u.into()))
        .ok_or_else(|| Error::NotFound("User not found.".to_string()))
}

async fn delete_me(State(state): State<AppState>, user: CurrentUser) -> Result<Json<Value>> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user.id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound("User not found.".to_string()));
    }

    info!("deleted user {} and all owned records", user.id);
    Ok(Json(json!({ "detail": "User deleted" })))
}
