//! Configuration loaded from environment variables at startup.

use std::env;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection string
    pub database_url: String,
    /// Address the HTTP server binds to
    pub bind_addr: String,
    /// Secret used to sign and verify auth tokens
    pub jwt_secret: String,
    /// API key for the hosted generative model; AI endpoints degrade to 502 when unset
    pub google_api_key: Option<String>,
    /// Model identifier for the generative endpoint
    pub gemini_model: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set, using an insecure development secret");
            "insecure-dev-secret".to_string()
        });

        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://todo.db".to_string()),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string()),
            jwt_secret,
            google_api_key: env::var("GOOGLE_API_KEY").ok(),
            gemini_model: env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-2.5-flash".to_string()),
        }
    }
}
