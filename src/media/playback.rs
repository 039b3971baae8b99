//! Agent reply audio playback via a user-configured player process

use super::slot::MediaGuard;
use anyhow::{Context, Result};
use std::process::Stdio;
use tokio::process::{Child, Command};

/// Playback handle. Spawns the configured player command with the audio URL
/// appended and holds the media guard until the process exits or is skipped.
pub struct Player {
    command: String,
    active: Option<Playing>,
}

struct Playing {
    child: Child,
    _guard: MediaGuard,
}

impl Player {
    pub fn new(command: String) -> Self {
        Self {
            command,
            active: None,
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.command.trim().is_empty()
    }

    pub fn is_playing(&self) -> bool {
        self.active.is_some()
    }

    /// Start playing `url`. The guard must already be acquired for playback;
    /// it is released when playback finishes or is skipped.
    pub fn play(&mut self, url: &str, guard: MediaGuard) -> Result<()> {
        let mut parts = self.command.split_whitespace();
        let program = parts.next().context("no player command configured")?;

        let child = Command::new(program)
            .args(parts)
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to start player '{program}'"))?;

        tracing::debug!(%url, "playback started");
        self.active = Some(Playing {
            child,
            _guard: guard,
        });
        Ok(())
    }

    /// Reap a finished player process. Returns true when playback just
    /// ended, releasing the media slot.
    pub fn poll(&mut self) -> bool {
        let Some(playing) = self.active.as_mut() else {
            return false;
        };
        match playing.child.try_wait() {
            Ok(Some(_status)) => {
                self.active = None;
                tracing::debug!("playback finished");
                true
            }
            Ok(None) => false,
            Err(e) => {
                tracing::warn!(error = %e, "player wait failed, releasing slot");
                self.active = None;
                true
            }
        }
    }

    /// User skip: kill the player immediately and release the slot
    pub fn skip(&mut self) {
        if let Some(mut playing) = self.active.take() {
            if let Err(e) = playing.child.start_kill() {
                tracing::warn!(error = %e, "failed to kill player process");
            }
            tracing::debug!("playback skipped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::{MediaKind, MediaSlot};

    #[tokio::test]
    async fn test_playback_holds_slot_until_skip() {
        let slot = MediaSlot::new();
        let guard = slot.try_acquire(MediaKind::Playback).unwrap();
        let mut player = Player::new("tail -f".to_string());

        player.play("/dev/null", guard).unwrap();
        assert!(player.is_playing());
        assert!(slot.try_acquire(MediaKind::Capture).is_err());

        player.skip();
        assert!(!player.is_playing());
        assert!(slot.try_acquire(MediaKind::Capture).is_ok());
    }

    #[tokio::test]
    async fn test_poll_releases_slot_when_process_exits() {
        let slot = MediaSlot::new();
        let guard = slot.try_acquire(MediaKind::Playback).unwrap();
        let mut player = Player::new("true".to_string());

        player.play("ignored-url", guard).unwrap();

        // Give the process a moment to exit, then reap it
        tokio::time::sleep(std::time::Duration::from_millis(200)).await;
        assert!(player.poll());
        assert_eq!(slot.held(), None);
    }

    #[tokio::test]
    async fn test_unknown_player_errors_and_drops_guard() {
        let slot = MediaSlot::new();
        let guard = slot.try_acquire(MediaKind::Playback).unwrap();
        let mut player = Player::new("definitely-not-a-player".to_string());

        assert!(player.play("url", guard).is_err());
        // The guard died with the failed call
        assert_eq!(slot.held(), None);
    }

    #[test]
    fn test_is_configured() {
        assert!(Player::new("afplay".to_string()).is_configured());
        assert!(!Player::new("  ".to_string()).is_configured());
    }
}
