//! Todo/calendar backend.
//!
//! CRUD endpoints for users, tasks, subtasks, categories, events, and notes
//! over SQLite, plus an experimental endpoint that forwards free text to a
//! hosted generative model and coerces its reply into records.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod genai;
pub mod models;
pub mod patch;
pub mod routes;
pub mod schemas;
pub mod state;

pub use error::{Error, Result};
pub use state::AppState;
