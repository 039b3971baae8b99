//! Application state definitions

use super::builder::BuilderForm;
use super::form_data::FormData;
use super::schema::{FormSchema, FormSummary};
use crate::backend::TemplateSummary;
use chrono::{DateTime, Utc};

/// Current view in the application
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum View {
    /// Form manager list
    #[default]
    Forms,
    /// Template picker
    Templates,
    /// Form builder
    Builder,
    /// Conversational fill session
    Fill,
}

/// Who produced a chat line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Agent,
    /// Capture notices and network failures, shown inline
    Advisory,
}

impl ChatRole {
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::User => "you",
            Self::Agent => "agent",
            Self::Advisory => "note",
        }
    }
}

/// One line in the conversation log
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// A manual edit of one schema field in the fill view
#[derive(Debug, Clone)]
pub struct FieldEdit {
    pub name: String,
    pub buffer: String,
}

/// Which pane has focus in the fill view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillFocus {
    #[default]
    Input,
    Fields,
}

impl FillFocus {
    pub fn toggle(&mut self) {
        *self = match self {
            Self::Input => Self::Fields,
            Self::Fields => Self::Input,
        };
    }
}

/// Top-level application state
#[derive(Debug, Default)]
pub struct AppState {
    pub current_view: View,
    /// Reachability probe result at startup
    pub backend_connected: bool,
    /// Cleared by a failed request, restored by the next success
    pub backend_ok: bool,

    // Form manager
    pub forms: Vec<FormSummary>,
    pub selected_form_index: usize,
    /// Form id awaiting delete confirmation
    pub confirm_delete: Option<String>,

    // Templates
    pub templates: Vec<TemplateSummary>,
    pub selected_template_index: usize,

    // Builder
    pub builder: BuilderForm,

    // Fill session
    pub schema: Option<FormSchema>,
    pub form_data: FormData,
    pub session_id: Option<String>,
    pub chat: Vec<ChatMessage>,
    pub chat_input: String,
    pub turn_pending: bool,
    pub session_complete: bool,
    pub field_cursor: usize,
    pub field_edit: Option<FieldEdit>,
    pub fill_focus: FillFocus,

    /// Transient feedback line in the status bar
    pub status_message: Option<String>,
}

impl AppState {
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.chat.push(ChatMessage::new(ChatRole::User, content));
    }

    pub fn push_agent(&mut self, content: impl Into<String>) {
        self.chat.push(ChatMessage::new(ChatRole::Agent, content));
    }

    pub fn push_advisory(&mut self, content: impl Into<String>) {
        self.chat.push(ChatMessage::new(ChatRole::Advisory, content));
    }

    /// Record a failed backend call: inline chat message plus status flag
    pub fn push_network_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(%message, "backend call failed");
        self.push_advisory(message);
        self.backend_ok = false;
    }

    pub fn selected_form(&self) -> Option<&FormSummary> {
        self.forms.get(self.selected_form_index)
    }

    pub fn selected_template(&self) -> Option<&TemplateSummary> {
        self.templates.get(self.selected_template_index)
    }

    pub fn select_next_form(&mut self) {
        if !self.forms.is_empty() {
            self.selected_form_index = (self.selected_form_index + 1) % self.forms.len();
        }
    }

    pub fn select_prev_form(&mut self) {
        if !self.forms.is_empty() {
            self.selected_form_index =
                (self.selected_form_index + self.forms.len() - 1) % self.forms.len();
        }
    }

    pub fn select_next_template(&mut self) {
        if !self.templates.is_empty() {
            self.selected_template_index =
                (self.selected_template_index + 1) % self.templates.len();
        }
    }

    pub fn select_prev_template(&mut self) {
        if !self.templates.is_empty() {
            self.selected_template_index =
                (self.selected_template_index + self.templates.len() - 1) % self.templates.len();
        }
    }

    pub fn field_cursor_next(&mut self) {
        if let Some(schema) = &self.schema {
            if !schema.fields.is_empty() {
                self.field_cursor = (self.field_cursor + 1) % schema.fields.len();
            }
        }
    }

    pub fn field_cursor_prev(&mut self) {
        if let Some(schema) = &self.schema {
            if !schema.fields.is_empty() {
                self.field_cursor =
                    (self.field_cursor + schema.fields.len() - 1) % schema.fields.len();
            }
        }
    }

    /// Tear down the active fill session state
    pub fn clear_session(&mut self) {
        self.schema = None;
        self.form_data = FormData::default();
        self.session_id = None;
        self.chat.clear();
        self.chat_input.clear();
        self.turn_pending = false;
        self.session_complete = false;
        self.field_cursor = 0;
        self.field_edit = None;
        self.fill_focus = FillFocus::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::schema::{FieldDescriptor, FieldType};

    fn state_with_forms(count: usize) -> AppState {
        AppState {
            forms: (0..count)
                .map(|i| FormSummary {
                    id: format!("form-{i}"),
                    title: format!("Form {i}"),
                    description: None,
                    field_count: 0,
                    response_count: 0,
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_view_is_forms() {
        let state = AppState::default();
        assert_eq!(state.current_view, View::Forms);
        assert!(state.chat.is_empty());
    }

    #[test]
    fn test_form_selection_wraps() {
        let mut state = state_with_forms(3);
        state.select_prev_form();
        assert_eq!(state.selected_form_index, 2);
        state.select_next_form();
        assert_eq!(state.selected_form_index, 0);
    }

    #[test]
    fn test_selection_noop_when_empty() {
        let mut state = AppState::default();
        state.select_next_form();
        state.select_prev_form();
        assert_eq!(state.selected_form_index, 0);
        assert!(state.selected_form().is_none());
    }

    #[test]
    fn test_network_error_is_inline_and_flagged() {
        let mut state = AppState::default();
        state.backend_ok = true;

        state.push_network_error("Failed to send turn: connection refused");

        assert!(!state.backend_ok);
        let last = state.chat.last().unwrap();
        assert_eq!(last.role, ChatRole::Advisory);
        assert!(last.content.contains("connection refused"));
    }

    #[test]
    fn test_field_cursor_wraps_over_schema() {
        let mut state = AppState::default();
        state.schema = Some(FormSchema::new(
            "T",
            vec![
                FieldDescriptor::new("a", FieldType::ShortAnswer, "A"),
                FieldDescriptor::new("b", FieldType::ShortAnswer, "B"),
            ],
        ));

        state.field_cursor_prev();
        assert_eq!(state.field_cursor, 1);
        state.field_cursor_next();
        assert_eq!(state.field_cursor, 0);
    }

    #[test]
    fn test_clear_session_resets_fill_state() {
        let mut state = AppState::default();
        state.schema = Some(FormSchema::new("T", vec![]));
        state.session_id = Some("abc".to_string());
        state.push_user("hello");
        state.turn_pending = true;
        state.session_complete = true;

        state.clear_session();

        assert!(state.schema.is_none());
        assert!(state.session_id.is_none());
        assert!(state.chat.is_empty());
        assert!(!state.turn_pending);
        assert!(!state.session_complete);
    }

    #[test]
    fn test_chat_roles_have_distinct_prefixes() {
        assert_ne!(ChatRole::User.prefix(), ChatRole::Agent.prefix());
        assert_ne!(ChatRole::Agent.prefix(), ChatRole::Advisory.prefix());
    }
}
