//! Configuration handling for the TUI

use crate::capture::CaptureConfig;
use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VoxConfig {
    /// Backend address (also settable via VOXFORM_BACKEND_ADDRESS)
    pub backend_address: Option<String>,
    /// External STT command emitting transcript events as JSON lines
    pub stt_command: Option<String>,
    /// Audio player command; the reply URL is appended as the last argument
    pub player_command: Option<String>,

    // Capture tuning
    pub silence_timeout_ms: Option<u64>,
    pub noise_timeout_ms: Option<u64>,
    pub max_utterance_ms: Option<u64>,
    pub min_text_len: Option<usize>,
    pub confidence_threshold: Option<f32>,
}

impl VoxConfig {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("io", "voxform", "voxform-tui")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load configuration from file
    pub fn load() -> Result<Self> {
        let path = Self::config_path();

        if let Some(path) = path {
            if path.exists() {
                let content = fs::read_to_string(&path)?;
                let config: VoxConfig = serde_json::from_str(&content)?;
                return Ok(config);
            }
        }

        Ok(Self::default())
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        if let Some(path) = Self::config_path() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let content = serde_json::to_string_pretty(self)?;
            fs::write(&path, content)?;
        }
        Ok(())
    }

    /// Capture tuning with defaults filled in
    pub fn capture_config(&self) -> CaptureConfig {
        let defaults = CaptureConfig::default();
        CaptureConfig {
            min_text_len: self.min_text_len.unwrap_or(defaults.min_text_len),
            confidence_threshold: self
                .confidence_threshold
                .unwrap_or(defaults.confidence_threshold),
            silence_timeout: self
                .silence_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.silence_timeout),
            noise_timeout: self
                .noise_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.noise_timeout),
            max_duration: self
                .max_utterance_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.max_duration),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = VoxConfig::default();
        assert!(config.backend_address.is_none());
        assert!(config.stt_command.is_none());
        assert!(config.player_command.is_none());
        assert!(config.silence_timeout_ms.is_none());
    }

    #[test]
    fn test_serialization_round_trip() {
        let config = VoxConfig {
            backend_address: Some("http://localhost:8000".to_string()),
            stt_command: Some("voxform-stt --mic default".to_string()),
            player_command: Some("mpv --no-video".to_string()),
            silence_timeout_ms: Some(1200),
            noise_timeout_ms: Some(4000),
            max_utterance_ms: Some(20_000),
            min_text_len: Some(3),
            confidence_threshold: Some(0.8),
        };

        let json = serde_json::to_string(&config).unwrap();
        let parsed: VoxConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(
            parsed.backend_address,
            Some("http://localhost:8000".to_string())
        );
        assert_eq!(parsed.stt_command, Some("voxform-stt --mic default".to_string()));
        assert_eq!(parsed.silence_timeout_ms, Some(1200));
        assert_eq!(parsed.min_text_len, Some(3));
    }

    #[test]
    fn test_deserialize_from_empty_json() {
        let json = "{}";
        let parsed: VoxConfig = serde_json::from_str(json).unwrap();
        assert!(parsed.backend_address.is_none());
    }

    #[test]
    fn test_deserialize_with_extra_fields() {
        // Should ignore unknown fields
        let json = r#"{"backend_address": "http://x", "unknown_field": "value"}"#;
        let parsed: VoxConfig = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.backend_address, Some("http://x".to_string()));
    }

    #[test]
    fn test_capture_config_defaults() {
        let capture = VoxConfig::default().capture_config();
        assert_eq!(capture.silence_timeout, Duration::from_millis(1500));
        assert_eq!(capture.noise_timeout, Duration::from_millis(5000));
        assert_eq!(capture.max_duration, Duration::from_secs(30));
        assert_eq!(capture.min_text_len, 2);
    }

    #[test]
    fn test_capture_config_overrides() {
        let config = VoxConfig {
            silence_timeout_ms: Some(900),
            confidence_threshold: Some(0.5),
            ..Default::default()
        };
        let capture = config.capture_config();
        assert_eq!(capture.silence_timeout, Duration::from_millis(900));
        assert!((capture.confidence_threshold - 0.5).abs() < f32::EPSILON);
        // Untouched knobs keep their defaults
        assert_eq!(capture.noise_timeout, Duration::from_millis(5000));
    }

    #[test]
    fn test_load_returns_default_when_no_file() {
        let result = VoxConfig::load();
        assert!(result.is_ok());
    }
}
