//! Capture session controller.
//!
//! Owns every resource a live capture needs: the recognizer process, its
//! event stream, the heuristic timers, and the media-slot guard. All of it
//! is released on every exit path (outcome, cancel, drop).

use super::heuristic::{CaptureConfig, CaptureHeuristic, CaptureOutcome, CapturePhase};
use crate::media::MediaGuard;
use crate::speech::{RecognizerError, SpeechRecognizer, TranscriptEvent};
use std::time::Instant;
use tokio::sync::mpsc;

pub struct CaptureSession {
    recognizer: Box<dyn SpeechRecognizer>,
    events: mpsc::UnboundedReceiver<TranscriptEvent>,
    heuristic: CaptureHeuristic,
    guard: Option<MediaGuard>,
}

impl CaptureSession {
    /// Start capturing. Consumes the media guard; it is released when the
    /// session ends. A recognizer failure drops the guard with the error.
    pub fn start(
        mut recognizer: Box<dyn SpeechRecognizer>,
        config: CaptureConfig,
        guard: MediaGuard,
        now: Instant,
    ) -> Result<Self, RecognizerError> {
        let events = recognizer.start()?;
        let mut heuristic = CaptureHeuristic::new(config);
        heuristic.start(now);
        Ok(Self {
            recognizer,
            events,
            heuristic,
            guard: Some(guard),
        })
    }

    pub fn phase(&self) -> CapturePhase {
        self.heuristic.phase()
    }

    /// Live transcript for the chat input line
    pub fn preview(&self) -> String {
        self.heuristic.preview()
    }

    /// Drain pending recognizer events and check the timers. Returns the
    /// outcome once, when the capture ends; resources are released with it.
    pub fn pump(&mut self, now: Instant) -> Option<CaptureOutcome> {
        while let Ok(event) = self.events.try_recv() {
            self.heuristic.on_event(&event, now);
        }

        let outcome = self.heuristic.poll(now)?;
        self.release();
        Some(outcome)
    }

    /// User skip: stop immediately with whatever was accumulated
    pub fn cancel(&mut self, now: Instant) -> CaptureOutcome {
        let outcome = self.heuristic.stop(now);
        self.release();
        outcome
    }

    fn release(&mut self) {
        self.recognizer.stop();
        self.events.close();
        self.guard.take();
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::{MediaKind, MediaSlot};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    /// Recognizer fed from a test channel
    struct ChannelRecognizer {
        rx: Option<mpsc::UnboundedReceiver<TranscriptEvent>>,
        stopped: Arc<AtomicBool>,
    }

    impl ChannelRecognizer {
        fn new() -> (
            Self,
            mpsc::UnboundedSender<TranscriptEvent>,
            Arc<AtomicBool>,
        ) {
            let (tx, rx) = mpsc::unbounded_channel();
            let stopped = Arc::new(AtomicBool::new(false));
            (
                Self {
                    rx: Some(rx),
                    stopped: Arc::clone(&stopped),
                },
                tx,
                stopped,
            )
        }
    }

    impl SpeechRecognizer for ChannelRecognizer {
        fn start(&mut self) -> Result<mpsc::UnboundedReceiver<TranscriptEvent>, RecognizerError> {
            self.rx.take().ok_or(RecognizerError::NotConfigured)
        }

        fn stop(&mut self) {
            self.stopped.store(true, Ordering::SeqCst);
        }
    }

    struct FailingRecognizer;

    impl SpeechRecognizer for FailingRecognizer {
        fn start(&mut self) -> Result<mpsc::UnboundedReceiver<TranscriptEvent>, RecognizerError> {
            Err(RecognizerError::PermissionDenied)
        }

        fn stop(&mut self) {}
    }

    fn fast_config() -> CaptureConfig {
        CaptureConfig {
            silence_timeout: Duration::from_millis(500),
            noise_timeout: Duration::from_millis(2000),
            max_duration: Duration::from_millis(8000),
            ..CaptureConfig::default()
        }
    }

    fn final_event(text: &str) -> TranscriptEvent {
        TranscriptEvent {
            text: text.to_string(),
            confidence: 0.9,
            is_final: true,
        }
    }

    #[tokio::test]
    async fn test_session_emits_utterance_and_releases_everything() {
        let slot = MediaSlot::new();
        let (recognizer, tx, stopped) = ChannelRecognizer::new();
        let base = Instant::now();

        let mut session = CaptureSession::start(
            Box::new(recognizer),
            fast_config(),
            slot.try_acquire(MediaKind::Capture).unwrap(),
            base,
        )
        .unwrap();

        assert_eq!(slot.held(), Some(MediaKind::Capture));

        tx.send(final_event("hello agent")).unwrap();
        assert_eq!(session.pump(base + Duration::from_millis(100)), None);
        assert_eq!(session.preview(), "hello agent");

        let outcome = session
            .pump(base + Duration::from_millis(700))
            .expect("silence ends capture");
        assert_eq!(outcome, CaptureOutcome::Utterance("hello agent".to_string()));

        assert!(stopped.load(Ordering::SeqCst));
        assert_eq!(slot.held(), None);
    }

    #[tokio::test]
    async fn test_cancel_releases_resources() {
        let slot = MediaSlot::new();
        let (recognizer, _tx, stopped) = ChannelRecognizer::new();
        let base = Instant::now();

        let mut session = CaptureSession::start(
            Box::new(recognizer),
            fast_config(),
            slot.try_acquire(MediaKind::Capture).unwrap(),
            base,
        )
        .unwrap();

        let outcome = session.cancel(base + Duration::from_millis(100));
        assert_eq!(outcome, CaptureOutcome::NoSpeech);
        assert!(stopped.load(Ordering::SeqCst));
        assert_eq!(slot.held(), None);
    }

    #[tokio::test]
    async fn test_drop_releases_slot() {
        let slot = MediaSlot::new();
        let (recognizer, _tx, stopped) = ChannelRecognizer::new();

        let session = CaptureSession::start(
            Box::new(recognizer),
            fast_config(),
            slot.try_acquire(MediaKind::Capture).unwrap(),
            Instant::now(),
        )
        .unwrap();

        drop(session);
        assert!(stopped.load(Ordering::SeqCst));
        assert_eq!(slot.held(), None);
    }

    #[tokio::test]
    async fn test_recognizer_failure_releases_guard() {
        let slot = MediaSlot::new();

        let result = CaptureSession::start(
            Box::new(FailingRecognizer),
            fast_config(),
            slot.try_acquire(MediaKind::Capture).unwrap(),
            Instant::now(),
        );

        assert!(matches!(result, Err(RecognizerError::PermissionDenied)));
        assert_eq!(slot.held(), None);
    }

    #[tokio::test]
    async fn test_noise_timeout_without_events() {
        let slot = MediaSlot::new();
        let (recognizer, _tx, _stopped) = ChannelRecognizer::new();
        let base = Instant::now();

        let mut session = CaptureSession::start(
            Box::new(recognizer),
            fast_config(),
            slot.try_acquire(MediaKind::Capture).unwrap(),
            base,
        )
        .unwrap();

        let outcome = session
            .pump(base + Duration::from_millis(2000))
            .expect("noise timeout");
        assert_eq!(outcome, CaptureOutcome::NoSpeech);
    }
}
