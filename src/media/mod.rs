//! Shared audio/microphone ownership.
//!
//! Playback and capture are mutually exclusive: both need the one audio
//! device, and a reply playing over an open microphone transcribes itself.
//! The slot enforces that with a guard acquired on start and released on
//! every exit path, including drop.

mod playback;
mod slot;

pub use playback::Player;
pub use slot::{MediaBusy, MediaGuard, MediaKind, MediaSlot};
