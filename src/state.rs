//! Application state shared across requests.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::AuthKeys;
use crate::genai::TextGenerator;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub auth: AuthKeys,
    pub generator: Arc<dyn TextGenerator>,
}
