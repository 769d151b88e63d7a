//! Client for the hosted generative model.
//!
//! The model is an injected collaborator behind [`TextGenerator`] so the
//! ingestion handlers can be exercised with a fake; the production
//! implementation calls the Gemini `generateContent` endpoint.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::{Error, Result};

const GENERATE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Something that turns a prompt into generated text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Gemini-backed generator.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            model,
        }
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{GENERATE_URL}/{}:generateContent", self.model);
        let body = json!({ "contents": [{ "parts": [{ "text": prompt }] }] });

        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("model request failed: {e}")))?
            .error_for_status()
            .map_err(|e| Error::Upstream(format!("model request failed: {e}")))?;

        let reply: Value = response
            .json()
            .await
            .map_err(|e| Error::Upstream(format!("unreadable model reply: {e}")))?;

        reply["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| Error::Upstream("model reply had no text candidate".to_string()))
    }
}

/// Placeholder generator used when no API key is configured.
pub struct UnconfiguredGenerator;

#[async_trait]
impl TextGenerator for UnconfiguredGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        Err(Error::Upstream(
            "GOOGLE_API_KEY is not configured; AI endpoints are disabled".to_string(),
        ))
    }
}

const PROMPT_TEMPLATE: &str = r##"You are a task parsing assistant for a todo app.

The user may describe tasks, events, notes and subtasks in natural language.
If a note references an event, or a subtask references a task, use a lookup object instead of an id.
Extract them and convert into the following STRICT JSON format:

{
  "tasks": [
    {
      "title": "...",
      "description": "... or null",
      "priority_id": "LOW=1|MEDIUM=2|HIGH=3 and default MEDIUM=2",
      "status_id": "PENDING=1|COMPLETED=2",
      "recurrence_type_id": "NONE=1|DAILY=2|WEEKLY=3|WEEKDAYS=4|WEEKENDS=5",
      "due_date": "YYYY-MM-DDTHH:MM:SS or null",
      "color_code": "#RRGGBB or default #3498db",
      "recurrence_end_date": "YYYY-MM-DD or null"
    }
  ],

  "events": [
    {
      "title": "...",
      "start_time": "YYYY-MM-DDTHH:MM:SS",
      "end_time": "YYYY-MM-DDTHH:MM:SS",
      "location": "string or null",
      "color_code": "#RRGGBB or default #3498db"
    }
  ],

  "notes": [
    {
      "title": "...",
      "content": "...",
      "event_lookup": {"title": "...", "date": "YYYY-MM-DD"} or null
    }
  ],

  "subtasks": [
    {
      "title": "...",
      "is_completed": false,
      "task_lookup": {"title": "...", "due_date": "YYYY-MM-DDTHH:MM:SS or null"} or null
    }
  ]
}

RULES:
- Always return strict JSON.
- No explanation, no markdown.
- Missing fields must be null.
- Detect whether user text describes tasks, events, notes, or subtasks.
- NO hallucination allowed.

User text:
"""{user_text}"""
"##;

/// Embed the user's free text into the fixed instructional template.
pub fn build_prompt(text: &str) -> String {
    PROMPT_TEMPLATE.replace("{user_text}", text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_the_user_text() {
        let prompt = build_prompt("buy milk tomorrow");
        assert!(prompt.contains("\"\"\"buy milk tomorrow\"\"\""));
        assert!(prompt.contains("STRICT JSON"));
        assert!(!prompt.contains("{user_text}"));
    }

    #[test]
    fn prompt_describes_the_lookup_contract() {
        let prompt = build_prompt("x");
        assert!(prompt.contains("event_lookup"));
        assert!(prompt.contains("task_lookup"));
        assert!(prompt.contains("LOW=1|MEDIUM=2|HIGH=3"));
    }
}
