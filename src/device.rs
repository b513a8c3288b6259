// Device collaborators: the viewport (read once at startup) and haptics

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Phones and small tablets - onboarding modal, hold-to-play video
    Compact,
    /// Desktop - video runs on its own, no onboarding
    Wide,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn layout(&self, max_compact_width: u32) -> Layout {
        if self.width <= max_compact_width {
            Layout::Compact
        } else {
            Layout::Wide
        }
    }
}

/// Best-effort vibration. Returns whether the device actually buzzed;
/// callers never treat `false` as an error.
pub trait Haptics {
    fn vibrate(&mut self, duration_ms: u64) -> bool;
}

/// For hosts without a vibration motor
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHaptics;

impl Haptics for NoHaptics {
    fn vibrate(&mut self, _duration_ms: u64) -> bool {
        false
    }
}
