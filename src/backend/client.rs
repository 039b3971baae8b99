//! REST client for communicating with the form agent backend

use super::protocol::{
    ResetRequest, StartSessionRequest, StartSessionResponse, SubmitRequest, SubmitResponse,
    TemplateSummary, TurnRequest, TurnResponse,
};
use super::traits::AgentBackend;
use crate::state::{FormSchema, FormSummary};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

/// Default backend address
const DEFAULT_ADDRESS: &str = "http://127.0.0.1:8000";

/// Per-request timeout; a chat turn includes LLM inference on the backend
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the form agent's REST surface
pub struct AgentClient {
    http: reqwest::Client,
    address: String,
}

impl AgentClient {
    /// Create a new client. Address precedence: explicit argument, then
    /// `VOXFORM_BACKEND_ADDRESS`, then the default.
    pub fn new(address: Option<String>) -> Result<Self> {
        let address = address
            .or_else(|| std::env::var("VOXFORM_BACKEND_ADDRESS").ok())
            .unwrap_or_else(|| DEFAULT_ADDRESS.to_string());
        let address = address.trim_end_matches('/').to_string();

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self { http, address })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }
}

#[async_trait]
impl AgentBackend for AgentClient {
    async fn check_connection(&self) -> bool {
        match self.http.get(self.url("/health")).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    async fn list_forms(&self) -> Result<Vec<FormSummary>> {
        let response = self
            .http
            .get(self.url("/v1/forms"))
            .send()
            .await
            .map_err(|e| anyhow!("Failed to list forms: {}", e))?
            .error_for_status()
            .map_err(|e| anyhow!("Failed to list forms: {}", e))?;

        response
            .json()
            .await
            .map_err(|e| anyhow!("Malformed forms list: {}", e))
    }

    async fn get_form(&self, form_id: &str) -> Result<FormSchema> {
        let response = self
            .http
            .get(self.url(&format!("/v1/forms/{form_id}")))
            .send()
            .await
            .map_err(|e| anyhow!("Failed to fetch form: {}", e))?
            .error_for_status()
            .map_err(|e| anyhow!("Failed to fetch form: {}", e))?;

        response
            .json()
            .await
            .map_err(|e| anyhow!("Malformed form schema: {}", e))
    }

    async fn create_form(&self, schema: &FormSchema) -> Result<String> {
        let response = self
            .http
            .post(self.url("/v1/forms"))
            .json(schema)
            .send()
            .await
            .map_err(|e| anyhow!("Failed to create form: {}", e))?
            .error_for_status()
            .map_err(|e| anyhow!("Failed to create form: {}", e))?;

        let created: FormSchema = response
            .json()
            .await
            .map_err(|e| anyhow!("Malformed create response: {}", e))?;
        Ok(created.id)
    }

    async fn delete_form(&self, form_id: &str) -> Result<()> {
        self.http
            .delete(self.url(&format!("/v1/forms/{form_id}")))
            .send()
            .await
            .map_err(|e| anyhow!("Failed to delete form: {}", e))?
            .error_for_status()
            .map_err(|e| anyhow!("Failed to delete form: {}", e))?;
        Ok(())
    }

    async fn list_templates(&self) -> Result<Vec<TemplateSummary>> {
        let response = self
            .http
            .get(self.url("/v1/templates"))
            .send()
            .await
            .map_err(|e| anyhow!("Failed to list templates: {}", e))?
            .error_for_status()
            .map_err(|e| anyhow!("Failed to list templates: {}", e))?;

        response
            .json()
            .await
            .map_err(|e| anyhow!("Malformed template list: {}", e))
    }

    async fn get_template(&self, key: &str) -> Result<FormSchema> {
        let response = self
            .http
            .get(self.url(&format!("/v1/templates/{key}")))
            .send()
            .await
            .map_err(|e| anyhow!("Failed to fetch template: {}", e))?
            .error_for_status()
            .map_err(|e| anyhow!("Failed to fetch template: {}", e))?;

        response
            .json()
            .await
            .map_err(|e| anyhow!("Malformed template schema: {}", e))
    }

    async fn start_session(
        &self,
        session_id: &str,
        form_id: &str,
    ) -> Result<StartSessionResponse> {
        let request = StartSessionRequest {
            session_id: session_id.to_string(),
            form_id: form_id.to_string(),
        };

        let response = self
            .http
            .post(self.url("/v1/form/start"))
            .json(&request)
            .send()
            .await
            .map_err(|e| anyhow!("Failed to start session: {}", e))?
            .error_for_status()
            .map_err(|e| anyhow!("Failed to start session: {}", e))?;

        response
            .json()
            .await
            .map_err(|e| anyhow!("Malformed start response: {}", e))
    }

    async fn send_turn(&self, session_id: &str, user_text: &str) -> Result<TurnResponse> {
        let request = TurnRequest {
            session_id: session_id.to_string(),
            user_text: user_text.to_string(),
        };

        let response = self
            .http
            .post(self.url("/v1/agent/turn"))
            .json(&request)
            .send()
            .await
            .map_err(|e| anyhow!("Failed to send turn: {}", e))?
            .error_for_status()
            .map_err(|e| anyhow!("Failed to send turn: {}", e))?;

        response
            .json()
            .await
            .map_err(|e| anyhow!("Malformed turn response: {}", e))
    }

    async fn reset_session(&self, session_id: &str) -> Result<()> {
        let request = ResetRequest {
            session_id: session_id.to_string(),
        };

        self.http
            .post(self.url("/v1/agent/reset"))
            .json(&request)
            .send()
            .await
            .map_err(|e| anyhow!("Failed to reset session: {}", e))?
            .error_for_status()
            .map_err(|e| anyhow!("Failed to reset session: {}", e))?;
        Ok(())
    }

    async fn submit_response(
        &self,
        form_id: &str,
        session_id: &str,
        responses: HashMap<String, String>,
    ) -> Result<SubmitResponse> {
        let request = SubmitRequest {
            session_id: session_id.to_string(),
            responses,
        };

        let response = self
            .http
            .post(self.url(&format!("/v1/forms/{form_id}/responses")))
            .json(&request)
            .send()
            .await
            .map_err(|e| anyhow!("Failed to submit response: {}", e))?
            .error_for_status()
            .map_err(|e| anyhow!("Failed to submit response: {}", e))?;

        response
            .json()
            .await
            .map_err(|e| anyhow!("Malformed submit response: {}", e))
    }

    fn media_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        if path.starts_with('/') {
            format!("{}{}", self.address, path)
        } else {
            format!("{}/{}", self.address, path)
        }
    }
}
