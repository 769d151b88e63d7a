//! Category endpoints.

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use validator::Validate;

use crate::auth::CurrentUser;
use crate::models::Category;
use crate::patch::merge;
use crate::schemas::{CategoryCreate, CategoryPatch, CategoryResponse};
use crate::state::AppState;
use crate::{Error, Result};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories/", post(create_category).get(list_categories))
        .route(
            "/categories/:category_id",
            get(get_category).put(update_category).delete(delete_category),
        )
}

/// Fetch a category scoped to its owner, or fail with not-found.
pub(crate) async fn fetch_category(
    pool: &SqlitePool,
    category_id: i64,
    owner: i64,
) -> Result<Category> {
    let category: Option<Category> = sqlx::query_as(
        "SELECT id, user_id, name, color_code FROM categories WHERE id = $1 AND user_id = $2",
    )
    .bind(category_id)
    .bind(owner)
    .fetch_optional(pool)
    .await?;

    category.ok_or_else(|| Error::NotFound("Category not found.".to_string()))
}

/// Verify a referenced category exists for the owner.
pub(crate) async fn ensure_category(pool: &SqlitePool, category_id: i64, owner: i64) -> Result<()> {
    fetch_category(pool, category_id, owner).await.map(|_| ())
}

async fn create_category(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<CategoryCreate>,
) -> Result<Json<CategoryResponse>> {
    body.validate().map_err(|e| Error::Validation(e.to_string()))?;

    let category: Category = sqlx::query_as(
        "INSERT INTO categories (user_id, name, color_code) VALUES ($1, $2, $3) \
         RETURNING id, user_id, name, color_code",
    )
    .bind(user.id)
    .bind(&body.name)
    .bind(&body.color_code)
    .fetch_one(&state.pool)
    .await?;

    Ok(Json(category.into()))
}

async fn list_categories(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<CategoryResponse>>> {
    let categories: Vec<Category> = sqlx::query_as(
        "SELECT id, user_id, name, color_code FROM categories WHERE user_id = $1 ORDER BY id",
    )
    .bind(user.id)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(categories.into_iter().map(CategoryResponse::from).collect()))
}

async fn get_category(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(category_id): Path<i64>,
) -> Result<Json<CategoryResponse>> {
    let category = fetch_category(&state.pool, category_id, user.id).await?;
    Ok(Json(category.into()))
}

async fn update_category(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(category_id): Path<i64>,
    Json(body): Json<CategoryPatch>,
) -> Result<Json<CategoryResponse>> {
    let mut category = fetch_category(&state.pool, category_id, user.id).await?;

    merge(&mut category.name, body.name);
    merge(&mut category.color_code, body.color_code);

    sqlx::query("UPDATE categories SET name = $1, color_code = $2 WHERE id = $3 AND user_id = $4")
        .bind(&category.name)
        .bind(&category.color_code)
        .bind(category.id)
        .bind(user.id)
        .execute(&state.pool)
        .await?;

    Ok(Json(category.into()))
}

async fn delete_category(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(category_id): Path<i64>,
) -> Result<Json<Value>> {
    let result = sqlx::query("DELETE FROM categories WHERE id = $1 AND user_id = $2")
        .bind(category_id)
        .bind(user.id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound("Category not found.".to_string()));
    }

    Ok(Json(json!({ "detail": "Category deleted" })))
}
