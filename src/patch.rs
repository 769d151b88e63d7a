//! Partial-update ("exclude-unset") support.
//!
//! Update requests carry a mapping of field name to new value; fields the
//! client did not send must keep their stored value. Required columns use
//! plain `Option<T>` (absent or null leaves the column untouched). Nullable
//! columns use [`Patch<T>`], which keeps the distinction between a field
//! that is absent and one explicitly set to `null`.

use serde::{Deserialize, Deserializer};

/// A nullable field in a partial update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Patch<T> {
    /// Field absent from the payload; stored value is kept.
    Missing,
    /// Field explicitly `null`; stored value is cleared.
    Null,
    /// Field present; stored value is replaced.
    Value(T),
}

// Hand-written so `Patch<T>` defaults to `Missing` without a `T: Default`
// bound; the derive would demand one.
impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Missing
    }
}

impl<T> Patch<T> {
    /// Merge this patch into a nullable column.
    pub fn apply_to(self, slot: &mut Option<T>) {
        match self {
            Patch::Missing => {}
            Patch::Null => *slot = None,
            Patch::Value(v) => *slot = Some(v),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Patch::Missing)
    }
}

// Fields of this type must be tagged `#[serde(default)]` so an absent key
// deserializes to `Missing` rather than failing.
impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(|value| match value {
            Some(v) => Patch::Value(v),
            None => Patch::Null,
        })
    }
}

/// Merge an optional update into a required column.
pub fn merge<T>(slot: &mut T, update: Option<T>) {
    if let Some(value) = update {
        *slot = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Body {
        #[serde(default)]
        due: Patch<String>,
    }

    #[test]
    fn absent_field_is_missing() {
        let body: Body = serde_json::from_str("{}").unwrap();
        assert_eq!(body.due, Patch::Missing);

        let mut slot = Some("2025-01-01".to_string());
        body.due.apply_to(&mut slot);
        assert_eq!(slot.as_deref(), Some("2025-01-01"));
    }

    #[test]
    fn explicit_null_clears_the_slot() {
        let body: Body = serde_json::from_str(r#"{"due": null}"#).unwrap();
        assert_eq!(body.due, Patch::Null);

        let mut slot = Some("2025-01-01".to_string());
        body.due.apply_to(&mut slot);
        assert_eq!(slot, None);
    }

    #[test]
    fn present_value_replaces_the_slot() {
        let body: Body = serde_json::from_str(r#"{"due": "2026-02-03"}"#).unwrap();

        let mut slot = None;
        body.due.apply_to(&mut slot);
        assert_eq!(slot.as_deref(), Some("2026-02-03"));
    }

    #[test]
    fn merge_skips_absent_required_fields() {
        let mut title = "old".to_string();
        merge(&mut title, None);
        assert_eq!(title, "old");
        merge(&mut title, Some("new".to_string()));
        assert_eq!(title, "new");
    }
}
