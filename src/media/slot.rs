//! Single active audio/mic session handle

use std::sync::{Arc, Mutex};
use thiserror::Error;

/// What currently owns the audio device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Capture,
    Playback,
}

impl MediaKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Capture => "voice capture",
            Self::Playback => "audio playback",
        }
    }
}

/// Acquisition failed because the slot is already held
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{} is already active", .held.label())]
pub struct MediaBusy {
    pub held: MediaKind,
}

/// The single audio/mic slot. Acquisition fails fast when held.
#[derive(Debug, Clone, Default)]
pub struct MediaSlot {
    inner: Arc<Mutex<Option<MediaKind>>>,
}

impl MediaSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the slot for `kind`, failing fast if anything holds it
    pub fn try_acquire(&self, kind: MediaKind) -> Result<MediaGuard, MediaBusy> {
        let mut held = self.inner.lock().expect("media slot lock");
        if let Some(current) = *held {
            return Err(MediaBusy { held: current });
        }
        *held = Some(kind);
        tracing::debug!(kind = kind.label(), "media slot acquired");
        Ok(MediaGuard {
            slot: Arc::clone(&self.inner),
            kind,
        })
    }

    /// What holds the slot right now, if anything
    #[allow(dead_code)]
    pub fn held(&self) -> Option<MediaKind> {
        *self.inner.lock().expect("media slot lock")
    }
}

/// Ownership token for the audio device; releases the slot on drop
#[derive(Debug)]
pub struct MediaGuard {
    slot: Arc<Mutex<Option<MediaKind>>>,
    kind: MediaKind,
}

impl Drop for MediaGuard {
    fn drop(&mut self) {
        let mut held = self.slot.lock().expect("media slot lock");
        *held = None;
        tracing::debug!(kind = self.kind.label(), "media slot released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_and_release() {
        let slot = MediaSlot::new();
        assert_eq!(slot.held(), None);

        let guard = slot.try_acquire(MediaKind::Capture).unwrap();
        assert_eq!(slot.held(), Some(MediaKind::Capture));

        drop(guard);
        assert_eq!(slot.held(), None);
    }

    #[test]
    fn test_acquisition_fails_fast_when_held() {
        let slot = MediaSlot::new();
        let _guard = slot.try_acquire(MediaKind::Playback).unwrap();

        let err = slot.try_acquire(MediaKind::Capture).unwrap_err();
        assert_eq!(err.held, MediaKind::Playback);
    }

    #[test]
    fn test_slot_reusable_after_release() {
        let slot = MediaSlot::new();
        drop(slot.try_acquire(MediaKind::Capture).unwrap());
        assert!(slot.try_acquire(MediaKind::Playback).is_ok());
    }

    #[test]
    fn test_clones_share_the_slot() {
        let slot = MediaSlot::new();
        let other = slot.clone();

        let _guard = slot.try_acquire(MediaKind::Capture).unwrap();
        assert!(other.try_acquire(MediaKind::Playback).is_err());
    }

    #[test]
    fn test_busy_error_names_the_holder() {
        let slot = MediaSlot::new();
        let _guard = slot.try_acquire(MediaKind::Playback).unwrap();
        let err = slot.try_acquire(MediaKind::Capture).unwrap_err();
        assert_eq!(err.to_string(), "audio playback is already active");
    }
}
