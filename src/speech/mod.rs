//! Speech recognition seam.
//!
//! Recognition itself is an external collaborator: the production
//! implementation adapts a user-configured STT process that emits transcript
//! events as JSON lines on stdout. The trait keeps the capture pipeline
//! testable without a microphone.

use serde::Deserialize;
use std::process::Stdio;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;

/// One interim or final transcript hypothesis from the recognizer
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TranscriptEvent {
    pub text: String,
    #[serde(default = "default_confidence")]
    pub confidence: f32,
    #[serde(rename = "final", default)]
    pub is_final: bool,
}

fn default_confidence() -> f32 {
    1.0
}

/// Recognizer failures, mapped to user-facing advisory text
#[derive(Debug, Error)]
pub enum RecognizerError {
    #[error("microphone permission denied")]
    PermissionDenied,
    #[error("no recognizer configured")]
    NotConfigured,
    #[error("recognizer failed to start: {0}")]
    SpawnFailed(std::io::Error),
}

impl RecognizerError {
    /// Advisory line shown in the chat log
    pub fn advisory(&self) -> &'static str {
        match self {
            Self::PermissionDenied => {
                "Microphone access was denied. Check your audio input permissions."
            }
            Self::NotConfigured => {
                "No speech recognizer configured. Set stt_command in the config file, or type your answer."
            }
            Self::SpawnFailed(_) => "Voice capture failed. Try again or type your answer.",
        }
    }
}

/// Source of transcript events
pub trait SpeechRecognizer: Send {
    /// Begin recognition, returning the event stream
    fn start(&mut self) -> Result<mpsc::UnboundedReceiver<TranscriptEvent>, RecognizerError>;

    /// Stop recognition and release the microphone
    fn stop(&mut self);
}

/// Recognizer that runs a user-configured STT command.
///
/// The command is expected to stream JSON lines shaped like
/// `{"text": "...", "confidence": 0.92, "final": false}` while it holds the
/// microphone. Killing the process releases the device.
pub struct CommandRecognizer {
    command: String,
    child: Option<Child>,
}

impl CommandRecognizer {
    pub fn new(command: String) -> Self {
        Self {
            command,
            child: None,
        }
    }
}

impl SpeechRecognizer for CommandRecognizer {
    fn start(&mut self) -> Result<mpsc::UnboundedReceiver<TranscriptEvent>, RecognizerError> {
        let mut parts = self.command.split_whitespace();
        let program = parts.next().ok_or(RecognizerError::NotConfigured)?;

        let mut child = Command::new(program)
            .args(parts)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => RecognizerError::NotConfigured,
                std::io::ErrorKind::PermissionDenied => RecognizerError::PermissionDenied,
                _ => RecognizerError::SpawnFailed(e),
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| RecognizerError::SpawnFailed(std::io::Error::other("no stdout")))?;

        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                match serde_json::from_str::<TranscriptEvent>(&line) {
                    Ok(event) => {
                        if tx.send(event).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::debug!(error = %e, "skipping unparseable recognizer line");
                    }
                }
            }
            tracing::debug!("recognizer stream ended");
        });

        self.child = Some(child);
        Ok(rx)
    }

    fn stop(&mut self) {
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.start_kill() {
                tracing::warn!(error = %e, "failed to kill recognizer process");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_deserializes_with_defaults() {
        let event: TranscriptEvent = serde_json::from_str(r#"{"text": "hello"}"#).unwrap();
        assert_eq!(event.text, "hello");
        assert_eq!(event.confidence, 1.0);
        assert!(!event.is_final);
    }

    #[test]
    fn test_event_deserializes_full_shape() {
        let event: TranscriptEvent =
            serde_json::from_str(r#"{"text": "hi there", "confidence": 0.42, "final": true}"#)
                .unwrap();
        assert_eq!(event.text, "hi there");
        assert!((event.confidence - 0.42).abs() < f32::EPSILON);
        assert!(event.is_final);
    }

    #[test]
    fn test_empty_command_is_not_configured() {
        let mut recognizer = CommandRecognizer::new(String::new());
        assert!(matches!(
            recognizer.start(),
            Err(RecognizerError::NotConfigured)
        ));
    }

    #[test]
    fn test_advisories_are_distinct() {
        let advisories = [
            RecognizerError::PermissionDenied.advisory(),
            RecognizerError::NotConfigured.advisory(),
            RecognizerError::SpawnFailed(std::io::Error::other("x")).advisory(),
        ];
        assert_ne!(advisories[0], advisories[1]);
        assert_ne!(advisories[1], advisories[2]);
        assert_ne!(advisories[0], advisories[2]);
    }

    #[tokio::test]
    async fn test_missing_binary_maps_to_not_configured() {
        let mut recognizer = CommandRecognizer::new("definitely-not-a-real-stt-binary".to_string());
        assert!(matches!(
            recognizer.start(),
            Err(RecognizerError::NotConfigured)
        ));
    }

    #[tokio::test]
    async fn test_command_recognizer_streams_json_lines() {
        let mut recognizer = CommandRecognizer::new(
            r#"echo {"text": "hello world", "confidence": 0.9, "final": true}"#.to_string(),
        );
        let mut rx = recognizer.start().expect("echo spawns");

        let event = rx.recv().await.expect("one event");
        assert_eq!(event.text, "hello world");
        assert!(event.is_final);
        recognizer.stop();
    }
}
