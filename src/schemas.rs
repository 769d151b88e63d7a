//! Request and response shapes for every entity family.
//!
//! Create types reject missing required fields and fill defaults; patch
//! types carry exclude-unset partial updates (see [`crate::patch`]);
//! response types serialize persisted rows, with `TaskResponse` embedding
//! its category and subtasks.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{Category, Event, Note, Priority, Recurrence, Subtask, Task, TaskStatus, User};
use crate::patch::Patch;

pub fn default_color() -> String {
    "#3498db".to_string()
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub user_id: i64,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub birth_date: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            birth_date: user.birth_date,
            created_at: user.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct CategoryCreate {
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(default = "default_color")]
    pub color_code: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub color_code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub id: i64,
    pub name: String,
    pub color_code: String,
    pub user_id: i64,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            color_code: category.color_code,
            user_id: category.user_id,
        }
    }
}

// ---------------------------------------------------------------------------
// Tasks and subtasks
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct TaskCreate {
    #[validate(length(min = 1))]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub recurrence_type: Recurrence,
    #[serde(default)]
    pub recurrence_end_date: Option<NaiveDate>,
    #[serde(default)]
    pub due_date: Option<NaiveDateTime>,
    #[serde(default = "default_color")]
    pub color_code: String,
    #[serde(default)]
    pub category_id: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TaskPatch {
    pub title: Option<String>,
    #[serde(default)]
    pub description: Patch<String>,
    pub priority: Option<Priority>,
    pub status: Option<TaskStatus>,
    pub recurrence_type: Option<Recurrence>,
    #[serde(default)]
    pub recurrence_end_date: Patch<NaiveDate>,
    #[serde(default)]
    pub due_date: Patch<NaiveDateTime>,
    pub color_code: Option<String>,
    #[serde(default)]
    pub category_id: Patch<i64>,
}

#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub status: TaskStatus,
    pub recurrence_type: Recurrence,
    pub recurrence_end_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDateTime>,
    pub color_code: String,
    pub user_id: i64,
    pub category: Option<CategoryResponse>,
    pub subtasks: Vec<SubtaskResponse>,
}

impl TaskResponse {
    /// Assemble the response from the task row and its related records.
    pub fn assemble(task: Task, category: Option<Category>, subtasks: Vec<Subtask>) -> Self {
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            priority: task.priority,
            status: task.status,
            recurrence_type: task.recurrence_type,
            recurrence_end_date: task.recurrence_end_date,
            due_date: task.due_date,
            color_code: task.color_code,
            user_id: task.user_id,
            category: category.map(CategoryResponse::from),
            subtasks: subtasks.into_iter().map(SubtaskResponse::from).collect(),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct SubtaskCreate {
    #[validate(length(min = 1))]
    pub title: String,
    #[serde(default)]
    pub is_completed: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct SubtaskPatch {
    pub title: Option<String>,
    pub is_completed: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct SubtaskResponse {
    pub id: i64,
    pub title: String,
    pub is_completed: bool,
    pub task_id: i64,
}

impl From<Subtask> for SubtaskResponse {
    fn from(subtask: Subtask) -> Self {
        Self {
            id: subtask.id,
            title: subtask.title,
            is_completed: subtask.is_completed,
            task_id: subtask.task_id,
        }
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct EventCreate {
    #[validate(length(min = 1))]
    pub title: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default = "default_color")]
    pub color_code: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct EventPatch {
    pub title: Option<String>,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    #[serde(default)]
    pub location: Patch<String>,
    pub color_code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EventResponse {
    pub id: i64,
    pub title: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub location: Option<String>,
    pub color_code: String,
    pub user_id: i64,
}

impl From<Event> for EventResponse {
    fn from(event: Event) -> Self {
        Self {
            id: event.id,
            title: event.title,
            start_time: event.start_time,
            end_time: event.end_time,
            location: event.location,
            color_code: event.color_code,
            user_id: event.user_id,
        }
    }
}

// ---------------------------------------------------------------------------
// Notes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct NoteCreate {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub content: String,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub event_id: Option<i64>,
    #[serde(default = "default_color")]
    pub color_code: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    #[serde(default)]
    pub category_id: Patch<i64>,
    #[serde(default)]
    pub event_id: Patch<i64>,
    pub color_code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NoteResponse {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub category_id: Option<i64>,
    pub event_id: Option<i64>,
    pub color_code: String,
    pub user_id: i64,
    pub created_at: NaiveDateTime,
}

impl From<Note> for NoteResponse {
    fn from(note: Note) -> Self {
        Self {
            id: note.id,
            title: note.title,
            content: note.content,
            category_id: note.category_id,
            event_id: note.event_id,
            color_code: note.color_code,
            user_id: note.user_id,
            created_at: note.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_create_fills_defaults() {
        let body: TaskCreate = serde_json::from_str(r#"{"title": "Buy milk"}"#).unwrap();
        assert_eq!(body.priority, Priority::Medium);
        assert_eq!(body.status, TaskStatus::Pending);
        assert_eq!(body.recurrence_type, Recurrence::None);
        assert_eq!(body.color_code, "#3498db");
        assert!(body.due_date.is_none());
        assert!(body.category_id.is_none());
    }

    #[test]
    fn task_patch_distinguishes_absent_from_null() {
        let body: TaskPatch =
            serde_json::from_str(r#"{"title": "New title", "due_date": null}"#).unwrap();
        assert_eq!(body.title.as_deref(), Some("New title"));
        assert_eq!(body.due_date, Patch::Null);
        assert!(body.description.is_missing());
        assert!(body.category_id.is_missing());
    }

    #[test]
    fn register_rejects_malformed_email() {
        let body: RegisterRequest = serde_json::from_str(
            r#"{"username": "a", "email": "not-an-email", "password": "p"}"#,
        )
        .unwrap();
        assert!(body.validate().is_err());
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let result = serde_json::from_str::<EventCreate>(r#"{"title": "Standup"}"#);
        assert!(result.is_err());
    }
}
