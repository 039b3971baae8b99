//! Trait abstraction for the backend client to enable mocking in tests

use super::protocol::{StartSessionResponse, SubmitResponse, TemplateSummary, TurnResponse};
use crate::state::{FormSchema, FormSummary};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;

/// Backend operations consumed by the app, enabling mocking in tests
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AgentBackend: Send + Sync {
    /// Check if the backend is reachable
    async fn check_connection(&self) -> bool;

    /// List all forms
    async fn list_forms(&self) -> Result<Vec<FormSummary>>;

    /// Fetch one form schema
    async fn get_form(&self, form_id: &str) -> Result<FormSchema>;

    /// Create a new form, returning its id
    async fn create_form(&self, schema: &FormSchema) -> Result<String>;

    /// Delete a form and its responses
    async fn delete_form(&self, form_id: &str) -> Result<()>;

    /// List predefined form templates
    async fn list_templates(&self) -> Result<Vec<TemplateSummary>>;

    /// Fetch the schema behind a template key
    async fn get_template(&self, key: &str) -> Result<FormSchema>;

    /// Begin a fill session for a form
    async fn start_session(
        &self,
        session_id: &str,
        form_id: &str,
    ) -> Result<StartSessionResponse>;

    /// Send one chat turn
    async fn send_turn(&self, session_id: &str, user_text: &str) -> Result<TurnResponse>;

    /// Abandon a session
    async fn reset_session(&self, session_id: &str) -> Result<()>;

    /// Submit the collected values for a form
    async fn submit_response(
        &self,
        form_id: &str,
        session_id: &str,
        responses: HashMap<String, String>,
    ) -> Result<SubmitResponse>;

    /// Resolve a possibly relative audio URL against the backend address
    fn media_url(&self, path: &str) -> String;
}
