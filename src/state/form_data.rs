//! Collected form values and backend update merging

use super::schema::FormSchema;
use serde_json::Value;
use std::collections::HashMap;

/// Collection status of a single field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldStatus {
    #[default]
    Pending,
    Collected,
    Invalid,
}

impl FieldStatus {
    pub fn marker(&self) -> &'static str {
        match self {
            Self::Pending => "○",
            Self::Collected => "●",
            Self::Invalid => "✗",
        }
    }
}

/// Value + status for one field
#[derive(Debug, Clone, Default)]
pub struct FieldState {
    pub value: String,
    pub status: FieldStatus,
}

/// Completion accounting across a form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionStatus {
    pub total_fields: usize,
    pub collected_fields: usize,
    pub total_required: usize,
    pub collected_required: usize,
}

impl CompletionStatus {
    /// Complete when every required field is collected
    pub fn is_complete(&self) -> bool {
        self.collected_required >= self.total_required
    }

    pub fn progress_percent(&self) -> u16 {
        if self.total_fields == 0 {
            return 0;
        }
        ((self.collected_fields * 100) / self.total_fields) as u16
    }
}

/// Local form state: field name -> collected value.
///
/// Mutated by user edits and by backend-reported updates. Backend updates go
/// through [`FormData::merge_updates`], which never lets an empty or
/// malformed value clobber something already collected.
#[derive(Debug, Clone, Default)]
pub struct FormData {
    fields: HashMap<String, FieldState>,
}

impl FormData {
    /// Initialize every schema field as pending
    pub fn for_schema(schema: &FormSchema) -> Self {
        let fields = schema
            .fields
            .iter()
            .map(|f| (f.name.clone(), FieldState::default()))
            .collect();
        Self { fields }
    }

    pub fn get(&self, name: &str) -> Option<&FieldState> {
        self.fields.get(name)
    }

    pub fn value(&self, name: &str) -> &str {
        self.fields.get(name).map(|f| f.value.as_str()).unwrap_or("")
    }

    /// Apply a local user edit. The caller validates first; an edit always
    /// replaces the stored value.
    pub fn set_user_value(&mut self, name: &str, value: String) {
        let status = if value.trim().is_empty() {
            FieldStatus::Pending
        } else {
            FieldStatus::Collected
        };
        self.fields.insert(
            name.to_string(),
            FieldState {
                value: value.trim().to_string(),
                status,
            },
        );
    }

    pub fn mark_invalid(&mut self, name: &str) {
        if let Some(state) = self.fields.get_mut(name) {
            state.status = FieldStatus::Invalid;
        }
    }

    pub fn clear_field(&mut self, name: &str) {
        if let Some(state) = self.fields.get_mut(name) {
            state.value.clear();
            state.status = FieldStatus::Pending;
        }
    }

    /// Merge backend-reported field updates into local state.
    ///
    /// Per-field rules:
    /// - unknown field names are skipped
    /// - plain strings are accepted when usable (see below)
    /// - wrapper objects `{"value": ..., "status": ...}` are applied only
    ///   when the status says "collected"
    /// - anything else (numbers are stringified, the rest skipped) never
    ///   fails the merge as a whole
    ///
    /// A usable value is non-empty after trimming and not a
    /// stringified-object artifact; unusable values keep the previous one.
    ///
    /// Returns the names of fields that changed.
    pub fn merge_updates(&mut self, schema: &FormSchema, updates: &Value) -> Vec<String> {
        let mut changed = Vec::new();

        let Some(map) = updates.as_object() else {
            tracing::warn!("field updates payload is not an object, ignoring");
            return changed;
        };

        for (name, reported) in map {
            if schema.field(name).is_none() {
                tracing::debug!(field = %name, "update for unknown field, skipping");
                continue;
            }

            let Some(value) = extract_reported_value(reported) else {
                continue;
            };

            if !is_usable_value(&value) {
                tracing::debug!(field = %name, "unusable update value, keeping previous");
                continue;
            }

            let state = self.fields.entry(name.clone()).or_default();
            let trimmed = value.trim().to_string();
            if state.value != trimmed || state.status != FieldStatus::Collected {
                state.value = trimmed;
                state.status = FieldStatus::Collected;
                changed.push(name.clone());
            }
        }

        changed
    }

    /// Completion accounting over the schema's fields
    pub fn completion(&self, schema: &FormSchema) -> CompletionStatus {
        let mut status = CompletionStatus {
            total_fields: schema.fields.len(),
            collected_fields: 0,
            total_required: 0,
            collected_required: 0,
        };

        for field in &schema.fields {
            let collected = self
                .fields
                .get(&field.name)
                .is_some_and(|f| f.status == FieldStatus::Collected);
            if collected {
                status.collected_fields += 1;
            }
            if field.validation.required {
                status.total_required += 1;
                if collected {
                    status.collected_required += 1;
                }
            }
        }

        status
    }

    /// Collected values only, for submission
    pub fn collected_values(&self) -> HashMap<String, String> {
        self.fields
            .iter()
            .filter(|(_, state)| state.status == FieldStatus::Collected)
            .map(|(name, state)| (name.clone(), state.value.clone()))
            .collect()
    }
}

/// Pull the string payload out of a reported update.
///
/// Plain strings pass through. Wrapper objects carry a status flag and are
/// only treated as collected when the flag says so. Numbers are stringified
/// since speech backends report scale answers both ways.
fn extract_reported_value(reported: &Value) -> Option<String> {
    match reported {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(map) => {
            let status = map.get("status").and_then(Value::as_str)?;
            if status != "collected" {
                return None;
            }
            match map.get("value") {
                Some(Value::String(s)) => Some(s.clone()),
                Some(Value::Number(n)) => Some(n.to_string()),
                _ => None,
            }
        }
        _ => None,
    }
}

/// Reject empty strings and stringified-object debris
fn is_usable_value(value: &str) -> bool {
    let v = value.trim();
    if v.is_empty() {
        return false;
    }
    if v == "[object Object]" || v == "undefined" || v == "null" {
        return false;
    }
    // A JSON object that leaked through as text is not a field value
    if v.starts_with('{') && v.ends_with('}') {
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::schema::{FieldDescriptor, FieldType};
    use serde_json::json;

    fn test_schema() -> FormSchema {
        FormSchema::new(
            "Registration",
            vec![
                FieldDescriptor::new("full_name", FieldType::ShortAnswer, "Full Name").required(),
                FieldDescriptor::new("email", FieldType::Email, "Email").required(),
                FieldDescriptor::new("notes", FieldType::Paragraph, "Notes"),
            ],
        )
    }

    mod merge {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_plain_string_update_is_applied() {
            let schema = test_schema();
            let mut data = FormData::for_schema(&schema);

            let changed = data.merge_updates(&schema, &json!({"full_name": "Ada Lovelace"}));

            assert_eq!(changed, vec!["full_name"]);
            assert_eq!(data.value("full_name"), "Ada Lovelace");
            assert_eq!(data.get("full_name").unwrap().status, FieldStatus::Collected);
        }

        #[test]
        fn test_empty_string_never_overwrites_collected_value() {
            let schema = test_schema();
            let mut data = FormData::for_schema(&schema);
            data.set_user_value("email", "ada@example.com".to_string());

            let changed = data.merge_updates(&schema, &json!({"email": ""}));

            assert!(changed.is_empty());
            assert_eq!(data.value("email"), "ada@example.com");
        }

        #[test]
        fn test_whitespace_only_is_unusable() {
            let schema = test_schema();
            let mut data = FormData::for_schema(&schema);
            data.set_user_value("email", "ada@example.com".to_string());

            data.merge_updates(&schema, &json!({"email": "   "}));

            assert_eq!(data.value("email"), "ada@example.com");
        }

        #[test]
        fn test_stringified_object_artifact_is_rejected() {
            let schema = test_schema();
            let mut data = FormData::for_schema(&schema);
            data.set_user_value("notes", "keep me".to_string());

            data.merge_updates(&schema, &json!({"notes": "[object Object]"}));
            assert_eq!(data.value("notes"), "keep me");

            data.merge_updates(&schema, &json!({"notes": "{\"value\": \"x\"}"}));
            assert_eq!(data.value("notes"), "keep me");
        }

        #[test]
        fn test_collected_wrapper_is_applied() {
            let schema = test_schema();
            let mut data = FormData::for_schema(&schema);

            let changed = data.merge_updates(
                &schema,
                &json!({"email": {"value": "X", "status": "collected"}}),
            );

            assert_eq!(changed, vec!["email"]);
            assert_eq!(data.value("email"), "X");
        }

        #[test]
        fn test_pending_wrapper_is_ignored() {
            let schema = test_schema();
            let mut data = FormData::for_schema(&schema);

            let changed = data.merge_updates(
                &schema,
                &json!({"email": {"value": "X", "status": "pending"}}),
            );

            assert!(changed.is_empty());
            assert_eq!(data.value("email"), "");
            assert_eq!(data.get("email").unwrap().status, FieldStatus::Pending);
        }

        #[test]
        fn test_unknown_field_is_skipped() {
            let schema = test_schema();
            let mut data = FormData::for_schema(&schema);

            let changed = data.merge_updates(&schema, &json!({"nonexistent": "value"}));

            assert!(changed.is_empty());
        }

        #[test]
        fn test_malformed_entry_does_not_fail_merge() {
            let schema = test_schema();
            let mut data = FormData::for_schema(&schema);

            // One bad entry, one good; the good one still lands
            let changed = data.merge_updates(
                &schema,
                &json!({"email": null, "full_name": "Grace Hopper"}),
            );

            assert_eq!(changed, vec!["full_name"]);
            assert_eq!(data.value("full_name"), "Grace Hopper");
        }

        #[test]
        fn test_non_object_payload_is_ignored() {
            let schema = test_schema();
            let mut data = FormData::for_schema(&schema);

            let changed = data.merge_updates(&schema, &json!(["not", "an", "object"]));

            assert!(changed.is_empty());
        }

        #[test]
        fn test_number_update_is_stringified() {
            let schema = FormSchema::new(
                "Survey",
                vec![FieldDescriptor::new(
                    "rating",
                    FieldType::LinearScale,
                    "Rating",
                )],
            );
            let mut data = FormData::for_schema(&schema);

            data.merge_updates(&schema, &json!({"rating": 4}));

            assert_eq!(data.value("rating"), "4");
        }

        #[test]
        fn test_values_are_trimmed_on_apply() {
            let schema = test_schema();
            let mut data = FormData::for_schema(&schema);

            data.merge_updates(&schema, &json!({"full_name": "  Ada  "}));

            assert_eq!(data.value("full_name"), "Ada");
        }
    }

    mod completion {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_empty_form_is_incomplete() {
            let schema = test_schema();
            let data = FormData::for_schema(&schema);

            let status = data.completion(&schema);

            assert_eq!(status.total_required, 2);
            assert_eq!(status.collected_required, 0);
            assert!(!status.is_complete());
        }

        #[test]
        fn test_only_required_fields_gate_completion() {
            let schema = test_schema();
            let mut data = FormData::for_schema(&schema);
            data.set_user_value("full_name", "Ada".to_string());
            data.set_user_value("email", "ada@example.com".to_string());

            // "notes" still pending but optional
            assert!(data.completion(&schema).is_complete());
        }

        #[test]
        fn test_progress_percent() {
            let schema = test_schema();
            let mut data = FormData::for_schema(&schema);
            data.set_user_value("full_name", "Ada".to_string());

            assert_eq!(data.completion(&schema).progress_percent(), 33);
        }
    }

    mod user_edits {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_user_edit_replaces_value() {
            let schema = test_schema();
            let mut data = FormData::for_schema(&schema);
            data.set_user_value("email", "first@example.com".to_string());
            data.set_user_value("email", "second@example.com".to_string());

            assert_eq!(data.value("email"), "second@example.com");
        }

        #[test]
        fn test_clearing_edit_resets_status() {
            let schema = test_schema();
            let mut data = FormData::for_schema(&schema);
            data.set_user_value("email", "ada@example.com".to_string());
            data.set_user_value("email", "".to_string());

            assert_eq!(data.get("email").unwrap().status, FieldStatus::Pending);
        }

        #[test]
        fn test_collected_values_excludes_pending() {
            let schema = test_schema();
            let mut data = FormData::for_schema(&schema);
            data.set_user_value("email", "ada@example.com".to_string());

            let values = data.collected_values();

            assert_eq!(values.len(), 1);
            assert_eq!(values.get("email").unwrap(), "ada@example.com");
        }

    }
}
