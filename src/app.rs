//! Application state and core logic

use crate::backend::{AgentBackend, AgentClient};
use crate::capture::{CaptureOutcome, CapturePhase, CaptureSession};
use crate::config::VoxConfig;
use crate::media::{MediaKind, MediaSlot, Player};
use crate::speech::CommandRecognizer;
use crate::state::{AppState, FieldEdit, FillFocus, FormData, View};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::Instant;
use uuid::Uuid;

/// Main application struct
pub struct App {
    /// Current application state
    pub state: AppState,
    /// Backend client for REST communication
    backend: Box<dyn AgentBackend>,
    /// User configuration
    config: VoxConfig,
    /// The single audio/mic ownership slot
    media_slot: MediaSlot,
    /// Live voice capture, if any
    capture: Option<CaptureSession>,
    /// Reply audio playback handle
    player: Player,
    /// Whether the app should quit
    quit: bool,
}

impl App {
    /// Create a new App instance against the real backend
    pub async fn new() -> Result<Self> {
        let config = VoxConfig::load().unwrap_or_default();
        let backend = AgentClient::new(config.backend_address.clone())?;
        Self::with_backend(Box::new(backend), config).await
    }

    /// Create an App over any backend implementation
    pub async fn with_backend(backend: Box<dyn AgentBackend>, config: VoxConfig) -> Result<Self> {
        let mut state = AppState::default();

        state.backend_connected = backend.check_connection().await;
        state.backend_ok = state.backend_connected;

        if state.backend_connected {
            if let Ok(forms) = backend.list_forms().await {
                state.forms = forms;
            }
        }

        let player = Player::new(config.player_command.clone().unwrap_or_default());

        Ok(Self {
            state,
            backend,
            config,
            media_slot: MediaSlot::new(),
            capture: None,
            player,
            quit: false,
        })
    }

    /// Check if app should quit
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Whether a voice capture is currently running
    pub fn capture_active(&self) -> bool {
        self.capture.is_some()
    }

    /// Current capture phase, if a capture is running
    pub fn capture_phase(&self) -> Option<CapturePhase> {
        self.capture.as_ref().map(|c| c.phase())
    }

    /// Live transcript preview for the input line during capture
    pub fn capture_preview(&self) -> Option<String> {
        self.capture.as_ref().map(|c| c.preview())
    }

    pub fn is_playing(&self) -> bool {
        self.player.is_playing()
    }

    /// Per-tick pump: drain capture events, check timers, reap playback
    pub async fn tick(&mut self, now: Instant) -> Result<()> {
        if let Some(session) = self.capture.as_mut() {
            if let Some(outcome) = session.pump(now) {
                self.capture = None;
                self.handle_capture_outcome(outcome).await;
            }
        }
        self.player.poll();
        Ok(())
    }

    /// Handle a key event
    pub async fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        self.state.status_message = None;

        match self.state.current_view {
            View::Forms => self.handle_forms_key(key).await,
            View::Templates => self.handle_templates_key(key).await,
            View::Builder => self.handle_builder_key(key).await,
            View::Fill => self.handle_fill_key(key).await,
        }
    }

    // ---- Forms list ----

    async fn handle_forms_key(&mut self, key: KeyEvent) -> Result<()> {
        // Delete confirmation swallows everything but y/n
        if let Some(form_id) = self.state.confirm_delete.clone() {
            match key.code {
                KeyCode::Char('y') => {
                    self.state.confirm_delete = None;
                    self.delete_form(&form_id).await;
                }
                _ => self.state.confirm_delete = None,
            }
            return Ok(());
        }

        match key.code {
            KeyCode::Char('q') => self.quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next_form(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev_form(),
            KeyCode::Char('r') => self.refresh_forms().await,
            KeyCode::Char('n') => {
                self.state.builder = Default::default();
                self.state.current_view = View::Builder;
            }
            KeyCode::Char('t') => {
                self.load_templates().await;
                self.state.current_view = View::Templates;
            }
            KeyCode::Char('d') => {
                if let Some(form) = self.state.selected_form() {
                    self.state.confirm_delete = Some(form.id.clone());
                }
            }
            KeyCode::Enter => {
                if let Some(form) = self.state.selected_form() {
                    let form_id = form.id.clone();
                    self.start_fill_session(&form_id).await;
                }
            }
            _ => {}
        }
        Ok(())
    }

    async fn refresh_forms(&mut self) {
        match self.backend.list_forms().await {
            Ok(forms) => {
                self.state.backend_ok = true;
                if self.state.selected_form_index >= forms.len() {
                    self.state.selected_form_index = forms.len().saturating_sub(1);
                }
                self.state.forms = forms;
            }
            Err(e) => {
                self.state.status_message = Some(format!("{e}"));
                self.state.backend_ok = false;
            }
        }
    }

    async fn delete_form(&mut self, form_id: &str) {
        match self.backend.delete_form(form_id).await {
            Ok(()) => {
                self.state.backend_ok = true;
                self.state.status_message = Some("Form deleted".to_string());
                self.refresh_forms().await;
            }
            Err(e) => {
                self.state.status_message = Some(format!("{e}"));
                self.state.backend_ok = false;
            }
        }
    }

    // ---- Templates ----

    async fn handle_templates_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Esc => self.state.current_view = View::Forms,
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next_template(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev_template(),
            KeyCode::Enter => {
                if let Some(template) = self.state.selected_template() {
                    let key = template.key.clone();
                    self.create_from_template(&key).await;
                }
            }
            _ => {}
        }
        Ok(())
    }

    async fn load_templates(&mut self) {
        match self.backend.list_templates().await {
            Ok(templates) => {
                self.state.backend_ok = true;
                self.state.templates = templates;
                self.state.selected_template_index = 0;
            }
            Err(e) => {
                self.state.status_message = Some(format!("{e}"));
                self.state.backend_ok = false;
            }
        }
    }

    async fn create_from_template(&mut self, key: &str) {
        let schema = match self.backend.get_template(key).await {
            Ok(schema) => schema,
            Err(e) => {
                self.state.status_message = Some(format!("{e}"));
                self.state.backend_ok = false;
                return;
            }
        };
        match self.backend.create_form(&schema).await {
            Ok(_id) => {
                self.state.backend_ok = true;
                self.state.status_message = Some(format!("Created '{}'", schema.title));
                self.state.current_view = View::Forms;
                self.refresh_forms().await;
            }
            Err(e) => {
                self.state.status_message = Some(format!("{e}"));
                self.state.backend_ok = false;
            }
        }
    }

    // ---- Builder ----

    async fn handle_builder_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Esc => self.state.current_view = View::Forms,
            KeyCode::Tab | KeyCode::Down => self.state.builder.next_entry(),
            KeyCode::BackTab | KeyCode::Up => self.state.builder.prev_entry(),
            KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.save_builder_form().await;
            }
            KeyCode::Left if self.state.builder.is_buttons_row_active() => {
                self.state.builder.prev_button();
            }
            KeyCode::Right if self.state.builder.is_buttons_row_active() => {
                self.state.builder.next_button();
            }
            KeyCode::Enter => {
                if self.state.builder.is_buttons_row_active() {
                    match self.state.builder.selected_button {
                        0 => self.state.current_view = View::Forms,
                        1 => self.builder_add_field(),
                        _ => self.save_builder_form().await,
                    }
                } else {
                    // Enter cycles the type picker and flips toggles;
                    // on text entries it moves to the next one
                    let cycled = self
                        .state
                        .builder
                        .active_entry_mut()
                        .map(|entry| match entry.value {
                            crate::state::EntryValue::Text(_) => false,
                            _ => {
                                entry.advance();
                                true
                            }
                        })
                        .unwrap_or(false);
                    if !cycled {
                        self.state.builder.next_entry();
                    }
                }
            }
            KeyCode::Backspace => {
                if let Some(entry) = self.state.builder.active_entry_mut() {
                    entry.pop_char();
                }
            }
            KeyCode::Char(c) => {
                if let Some(entry) = self.state.builder.active_entry_mut() {
                    entry.push_char(c);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn builder_add_field(&mut self) {
        match self.state.builder.add_current_field() {
            Ok(()) => {
                let count = self.state.builder.added.len();
                self.state.status_message = Some(format!("Field added ({count} total)"));
            }
            Err(e) => self.state.status_message = Some(e),
        }
    }

    async fn save_builder_form(&mut self) {
        let schema = match self.state.builder.build_schema() {
            Ok(schema) => schema,
            Err(e) => {
                self.state.status_message = Some(e);
                return;
            }
        };
        match self.backend.create_form(&schema).await {
            Ok(_id) => {
                self.state.backend_ok = true;
                self.state.status_message = Some(format!("Saved '{}'", schema.title));
                self.state.current_view = View::Forms;
                self.refresh_forms().await;
            }
            Err(e) => {
                self.state.status_message = Some(format!("{e}"));
                self.state.backend_ok = false;
            }
        }
    }

    // ---- Fill session ----

    async fn start_fill_session(&mut self, form_id: &str) {
        let schema = match self.backend.get_form(form_id).await {
            Ok(schema) => schema,
            Err(e) => {
                self.state.status_message = Some(format!("{e}"));
                self.state.backend_ok = false;
                return;
            }
        };
        if let Some(duplicate) = schema.duplicate_field_name() {
            tracing::warn!(field = duplicate, "backend schema has a duplicate field name");
        }

        let session_id = Uuid::new_v4().to_string();
        match self.backend.start_session(&session_id, form_id).await {
            Ok(response) => {
                self.state.backend_ok = true;
                self.state.clear_session();
                self.state.form_data = FormData::for_schema(&schema);
                self.state.schema = Some(schema);
                self.state.session_id = Some(response.session_id);
                self.state.session_complete = response.is_complete;
                if let Some(question) = response.next_question {
                    self.state.push_agent(question);
                }
                self.state.current_view = View::Fill;
            }
            Err(e) => {
                self.state.status_message = Some(format!("{e}"));
                self.state.backend_ok = false;
            }
        }
    }

    async fn handle_fill_key(&mut self, key: KeyEvent) -> Result<()> {
        // Manual field edit swallows input until committed or cancelled
        if self.state.field_edit.is_some() {
            self.handle_field_edit_key(key);
            return Ok(());
        }

        // Session-wide shortcuts
        match key.code {
            KeyCode::Esc => {
                self.stop_media();
                self.state.current_view = View::Forms;
                return Ok(());
            }
            KeyCode::Tab => {
                self.state.fill_focus.toggle();
                return Ok(());
            }
            KeyCode::Char('v') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.start_capture().await;
                return Ok(());
            }
            KeyCode::Char('k') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.skip_media().await;
                return Ok(());
            }
            KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.reset_session().await;
                return Ok(());
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.submit_response().await;
                return Ok(());
            }
            KeyCode::Char('y') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.copy_transcript();
                return Ok(());
            }
            _ => {}
        }

        match self.state.fill_focus {
            FillFocus::Input => match key.code {
                KeyCode::Enter => {
                    let text = self.state.chat_input.trim().to_string();
                    if !text.is_empty() {
                        self.state.chat_input.clear();
                        self.send_turn(text).await;
                    }
                }
                KeyCode::Backspace => {
                    self.state.chat_input.pop();
                }
                KeyCode::Char(c) => self.state.chat_input.push(c),
                _ => {}
            },
            FillFocus::Fields => match key.code {
                KeyCode::Char('j') | KeyCode::Down => self.state.field_cursor_next(),
                KeyCode::Char('k') | KeyCode::Up => self.state.field_cursor_prev(),
                KeyCode::Char('e') | KeyCode::Enter => self.begin_field_edit(),
                KeyCode::Char('c') => self.clear_selected_field(),
                _ => {}
            },
        }
        Ok(())
    }

    fn begin_field_edit(&mut self) {
        let Some(schema) = &self.state.schema else {
            return;
        };
        let Some(field) = schema.ordered_fields().get(self.state.field_cursor).copied() else {
            return;
        };
        self.state.field_edit = Some(FieldEdit {
            name: field.name.clone(),
            buffer: self.state.form_data.value(&field.name).to_string(),
        });
    }

    fn clear_selected_field(&mut self) {
        let name = self.state.schema.as_ref().and_then(|schema| {
            schema
                .ordered_fields()
                .get(self.state.field_cursor)
                .map(|f| f.name.clone())
        });
        if let Some(name) = name {
            self.state.form_data.clear_field(&name);
            self.update_completion();
        }
    }

    fn handle_field_edit_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.state.field_edit = None,
            KeyCode::Enter => self.commit_field_edit(),
            KeyCode::Backspace => {
                if let Some(edit) = self.state.field_edit.as_mut() {
                    edit.buffer.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Some(edit) = self.state.field_edit.as_mut() {
                    edit.buffer.push(c);
                }
            }
            _ => {}
        }
    }

    fn commit_field_edit(&mut self) {
        let Some(edit) = self.state.field_edit.take() else {
            return;
        };
        let Some(schema) = &self.state.schema else {
            return;
        };
        let Some(field) = schema.field(&edit.name) else {
            return;
        };

        if let Some(violation) = field.check_value(&edit.buffer) {
            self.state.form_data.mark_invalid(&edit.name);
            self.state.status_message = Some(violation);
            return;
        }

        self.state.form_data.set_user_value(&edit.name, edit.buffer);
        self.update_completion();
    }

    fn update_completion(&mut self) {
        if let Some(schema) = &self.state.schema {
            self.state.session_complete =
                self.state.form_data.completion(schema).is_complete();
        }
    }

    /// Send one chat turn. The UI serializes turns: a second send while one
    /// is pending is dropped.
    pub async fn send_turn(&mut self, text: String) {
        if self.state.turn_pending {
            tracing::debug!("turn already pending, dropping send");
            return;
        }
        let Some(session_id) = self.state.session_id.clone() else {
            return;
        };

        self.state.push_user(text.clone());
        self.state.turn_pending = true;

        match self.backend.send_turn(&session_id, &text).await {
            Ok(response) => {
                self.state.backend_ok = true;
                self.state.push_agent(response.agent_reply.clone());

                if let Some(schema) = self.state.schema.clone() {
                    let changed = self
                        .state
                        .form_data
                        .merge_updates(&schema, &response.field_updates);
                    if !changed.is_empty() {
                        tracing::debug!(?changed, "merged field updates");
                    }
                }
                self.update_completion();
                if response.is_complete {
                    self.state.session_complete = true;
                }

                if let Some(url) = response.audio_url {
                    self.play_reply(&url);
                }
            }
            Err(e) => {
                self.state.push_network_error(format!("{e}"));
            }
        }
        self.state.turn_pending = false;
    }

    async fn reset_session(&mut self) {
        let Some(session_id) = self.state.session_id.clone() else {
            return;
        };
        let Some(form_id) = self.state.schema.as_ref().map(|s| s.id.clone()) else {
            return;
        };

        self.stop_media();
        if let Err(e) = self.backend.reset_session(&session_id).await {
            self.state.push_network_error(format!("{e}"));
            return;
        }
        self.state.backend_ok = true;
        self.start_fill_session(&form_id).await;
        self.state.status_message = Some("Session restarted".to_string());
    }

    async fn submit_response(&mut self) {
        let Some(session_id) = self.state.session_id.clone() else {
            return;
        };
        let Some(schema) = self.state.schema.clone() else {
            return;
        };

        if !self.state.form_data.completion(&schema).is_complete() {
            self.state.status_message =
                Some("Required fields are still missing".to_string());
            return;
        }

        let responses = self.state.form_data.collected_values();
        match self
            .backend
            .submit_response(&schema.id, &session_id, responses)
            .await
        {
            Ok(response) => {
                tracing::info!(id = %response.id, "response submitted");
                self.state.backend_ok = true;
                let confirmation = response
                    .confirmation_message
                    .unwrap_or_else(|| schema.confirmation_message.clone());
                self.state.push_agent(confirmation);
                self.state.status_message = Some("Response submitted".to_string());
            }
            Err(e) => {
                self.state.push_network_error(format!("{e}"));
            }
        }
    }

    fn copy_transcript(&mut self) {
        let transcript: String = self
            .state
            .chat
            .iter()
            .map(|m| format!("{}: {}\n", m.role.prefix(), m.content))
            .collect();

        match arboard::Clipboard::new().and_then(|mut c| c.set_text(transcript)) {
            Ok(()) => self.state.status_message = Some("Transcript copied".to_string()),
            Err(e) => self.state.status_message = Some(format!("Copy failed: {e}")),
        }
    }

    // ---- Voice capture & playback ----

    async fn start_capture(&mut self) {
        if self.capture.is_some() {
            return;
        }
        if self.state.turn_pending {
            self.state.status_message = Some("Wait for the agent to reply".to_string());
            return;
        }

        let guard = match self.media_slot.try_acquire(MediaKind::Capture) {
            Ok(guard) => guard,
            Err(busy) => {
                self.state.status_message = Some(busy.to_string());
                return;
            }
        };

        let recognizer =
            CommandRecognizer::new(self.config.stt_command.clone().unwrap_or_default());
        match CaptureSession::start(
            Box::new(recognizer),
            self.config.capture_config(),
            guard,
            Instant::now(),
        ) {
            Ok(session) => {
                self.capture = Some(session);
            }
            Err(e) => {
                self.state.push_advisory(e.advisory());
            }
        }
    }

    async fn handle_capture_outcome(&mut self, outcome: CaptureOutcome) {
        match outcome {
            CaptureOutcome::Utterance(text) => {
                self.send_turn(text).await;
            }
            CaptureOutcome::NoiseOnly => {
                self.state
                    .push_advisory("Didn't catch that. Please speak again or type your answer.");
            }
            CaptureOutcome::NoSpeech => {
                self.state
                    .push_advisory("No speech detected. Press Ctrl+V to try again.");
            }
        }
    }

    /// User skip: finish capture early or cut playback short
    async fn skip_media(&mut self) {
        if let Some(mut session) = self.capture.take() {
            let outcome = session.cancel(Instant::now());
            self.handle_capture_outcome(outcome).await;
            return;
        }
        self.player.skip();
    }

    /// Silent teardown for view changes
    fn stop_media(&mut self) {
        if let Some(mut session) = self.capture.take() {
            let _ = session.cancel(Instant::now());
        }
        self.player.skip();
    }

    fn play_reply(&mut self, url: &str) {
        if !self.player.is_configured() {
            return;
        }
        let guard = match self.media_slot.try_acquire(MediaKind::Playback) {
            Ok(guard) => guard,
            Err(busy) => {
                tracing::debug!(holder = busy.held.label(), "skipping reply audio");
                return;
            }
        };
        let url = self.backend.media_url(url);
        if let Err(e) = self.player.play(&url, guard) {
            tracing::warn!(error = %e, "reply playback failed");
        }
    }
}
