//! Utterance-boundary detection over a transcript event stream.
//!
//! Decides when the user has finished speaking a meaningful utterance versus
//! produced only background noise, and emits exactly one finalized
//! transcript or an explicit noise/silence classification.

use crate::speech::TranscriptEvent;
use std::time::{Duration, Instant};

/// Tuning knobs for the capture heuristic
#[derive(Debug, Clone, Copy)]
pub struct CaptureConfig {
    /// Minimum trimmed text length before an event can qualify as speech
    pub min_text_len: usize,
    /// Interim events below this confidence are treated as noise
    pub confidence_threshold: f32,
    /// Silence after qualifying speech that ends the utterance
    pub silence_timeout: Duration,
    /// Time allowed for the first qualifying event before giving up
    pub noise_timeout: Duration,
    /// Hard ceiling on a capture regardless of state
    pub max_duration: Duration,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            min_text_len: 2,
            confidence_threshold: 0.7,
            silence_timeout: Duration::from_millis(1500),
            noise_timeout: Duration::from_millis(5000),
            max_duration: Duration::from_secs(30),
        }
    }
}

/// Capture phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CapturePhase {
    #[default]
    Idle,
    Listening,
    SpeechDetected,
    Finalizing,
}

/// What a finished capture produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// Concatenated text of the accepted final events
    Utterance(String),
    /// Something was heard but nothing qualified as speech
    NoiseOnly,
    /// Nothing was heard at all
    NoSpeech,
}

/// Utterance-boundary state machine.
///
/// Timers are deadlines checked against a caller-supplied `Instant`, so the
/// machine is deterministic under test. The driving loop feeds transcript
/// events through [`on_event`](Self::on_event) and calls
/// [`poll`](Self::poll) on every tick; `poll` returns the outcome exactly
/// once, when a deadline ends the capture.
#[derive(Debug)]
pub struct CaptureHeuristic {
    config: CaptureConfig,
    phase: CapturePhase,
    ceiling_deadline: Option<Instant>,
    noise_deadline: Option<Instant>,
    silence_deadline: Option<Instant>,
    /// Accepted final-event texts, concatenated on finalize
    accepted: Vec<String>,
    /// Latest qualifying interim text, for live display only
    interim: String,
    heard_anything: bool,
}

impl CaptureHeuristic {
    pub fn new(config: CaptureConfig) -> Self {
        Self {
            config,
            phase: CapturePhase::Idle,
            ceiling_deadline: None,
            noise_deadline: None,
            silence_deadline: None,
            accepted: Vec::new(),
            interim: String::new(),
            heard_anything: false,
        }
    }

    pub fn phase(&self) -> CapturePhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        matches!(
            self.phase,
            CapturePhase::Listening | CapturePhase::SpeechDetected
        )
    }

    /// Live text for the UI: accepted finals plus the trailing interim
    pub fn preview(&self) -> String {
        let mut parts: Vec<&str> = self.accepted.iter().map(String::as_str).collect();
        if !self.interim.is_empty() {
            parts.push(&self.interim);
        }
        parts.join(" ")
    }

    /// Activate: idle -> listening. Arms the noise and ceiling timers.
    pub fn start(&mut self, now: Instant) {
        self.phase = CapturePhase::Listening;
        self.ceiling_deadline = Some(now + self.config.max_duration);
        self.noise_deadline = Some(now + self.config.noise_timeout);
        self.silence_deadline = None;
        self.accepted.clear();
        self.interim.clear();
        self.heard_anything = false;
        tracing::debug!(
            noise_ms = self.config.noise_timeout.as_millis() as u64,
            silence_ms = self.config.silence_timeout.as_millis() as u64,
            ceiling_ms = self.config.max_duration.as_millis() as u64,
            "capture started"
        );
    }

    /// Feed one transcript event.
    ///
    /// Qualifying events (text length over the minimum, and either confident
    /// or final) drive the listening -> speech-detected transition and reset
    /// the silence timer. Sub-threshold events are discarded from the
    /// accumulated text and leave every timer untouched.
    pub fn on_event(&mut self, event: &TranscriptEvent, now: Instant) {
        if !self.is_active() {
            return;
        }

        self.heard_anything = true;
        let text = event.text.trim();
        let qualifies = text.chars().count() >= self.config.min_text_len
            && (event.confidence > self.config.confidence_threshold || event.is_final);

        if !qualifies {
            tracing::trace!(confidence = event.confidence, "discarding noise event");
            return;
        }

        if self.phase == CapturePhase::Listening {
            self.phase = CapturePhase::SpeechDetected;
            tracing::debug!("speech detected");
        }
        self.silence_deadline = Some(now + self.config.silence_timeout);

        if event.is_final {
            self.accepted.push(text.to_string());
            self.interim.clear();
        } else {
            self.interim = text.to_string();
        }
    }

    /// Check the timers. Returns the outcome exactly once, when a deadline
    /// ends the capture; the phase moves to finalizing and further calls
    /// return None.
    pub fn poll(&mut self, now: Instant) -> Option<CaptureOutcome> {
        if !self.is_active() {
            return None;
        }

        // Ceiling fires regardless of state
        if self.ceiling_deadline.is_some_and(|d| now >= d) {
            tracing::debug!("capture ceiling reached");
            return Some(self.finalize());
        }

        match self.phase {
            CapturePhase::Listening => {
                if self.noise_deadline.is_some_and(|d| now >= d) {
                    tracing::debug!("noise timeout, no speech detected");
                    return Some(self.finalize());
                }
            }
            CapturePhase::SpeechDetected => {
                if self.silence_deadline.is_some_and(|d| now >= d) {
                    tracing::debug!("silence timeout, utterance complete");
                    return Some(self.finalize());
                }
            }
            _ => {}
        }

        None
    }

    /// Force-stop (user cancel). Returns what was accumulated so far.
    pub fn stop(&mut self, _now: Instant) -> CaptureOutcome {
        self.finalize()
    }

    fn finalize(&mut self) -> CaptureOutcome {
        self.phase = CapturePhase::Finalizing;
        self.ceiling_deadline = None;
        self.noise_deadline = None;
        self.silence_deadline = None;

        if !self.accepted.is_empty() {
            let utterance = self.accepted.join(" ").trim().to_string();
            self.accepted.clear();
            self.interim.clear();
            return CaptureOutcome::Utterance(utterance);
        }
        self.interim.clear();
        if self.heard_anything {
            CaptureOutcome::NoiseOnly
        } else {
            CaptureOutcome::NoSpeech
        }
    }
}
