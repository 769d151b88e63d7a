//! Database row types and the task enumerations.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Task priority, stored as its code (`LOW`/`MEDIUM`/`HIGH`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    #[sqlx(rename = "LOW")]
    Low,
    #[default]
    #[sqlx(rename = "MEDIUM")]
    Medium,
    #[sqlx(rename = "HIGH")]
    High,
}

impl Priority {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "LOW" => Some(Self::Low),
            "MEDIUM" => Some(Self::Medium),
            "HIGH" => Some(Self::High),
            _ => None,
        }
    }
}

/// Task status, stored as its code (`PENDING`/`COMPLETED`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskStatus {
    #[default]
    #[sqlx(rename = "PENDING")]
    Pending,
    #[sqlx(rename = "COMPLETED")]
    Completed,
}

impl TaskStatus {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "PENDING" => Some(Self::Pending),
            "COMPLETED" => Some(Self::Completed),
            _ => None,
        }
    }
}

/// Task recurrence, stored as its code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
pub enum Recurrence {
    #[default]
    #[sqlx(rename = "NONE")]
    None,
    #[sqlx(rename = "DAILY")]
    Daily,
    #[sqlx(rename = "WEEKLY")]
    Weekly,
    #[sqlx(rename = "WEEKDAYS")]
    Weekdays,
    #[sqlx(rename = "WEEKENDS")]
    Weekends,
}

impl Recurrence {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "NONE" => Some(Self::None),
            "DAILY" => Some(Self::Daily),
            "WEEKLY" => Some(Self::Weekly),
            "WEEKDAYS" => Some(Self::Weekdays),
            "WEEKENDS" => Some(Self::Weekends),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub birth_date: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, FromRow)]
pub struct Category {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub color_code: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct Task {
    pub id: i64,
    pub user_id: i64,
    pub category_id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub status: TaskStatus,
    pub recurrence_type: Recurrence,
    pub recurrence_end_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDateTime>,
    pub color_code: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct Subtask {
    pub id: i64,
    pub task_id: i64,
    pub title: String,
    pub is_completed: bool,
}

#[derive(Debug, Clone, FromRow)]
pub struct Event {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub location: Option<String>,
    pub color_code: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct Note {
    pub id: i64,
    pub user_id: i64,
    pub category_id: Option<i64>,
    pub event_id: Option<i64>,
    pub title: String,
    pub content: String,
    pub color_code: String,
    pub created_at: NaiveDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enum_codes_round_trip() {
        assert_eq!(Priority::from_code("HIGH"), Some(Priority::High));
        assert_eq!(TaskStatus::from_code("COMPLETED"), Some(TaskStatus::Completed));
        assert_eq!(Recurrence::from_code("WEEKDAYS"), Some(Recurrence::Weekdays));
        assert_eq!(Priority::from_code("URGENT"), None);
    }

    #[test]
    fn enums_serialize_as_codes() {
        assert_eq!(serde_json::to_string(&Priority::Medium).unwrap(), "\"MEDIUM\"");
        assert_eq!(serde_json::to_string(&TaskStatus::Pending).unwrap(), "\"PENDING\"");
        assert_eq!(serde_json::to_string(&Recurrence::None).unwrap(), "\"NONE\"");
    }
}
