// Gesture interpretation.
// Clicks are debounced then classified: the resolver counts clicks while a
// window is open and only decides what they meant once it closes. Touch holds
// bypass the window entirely and act immediately.

pub mod hover;

pub use hover::{tooltip_anchor, HoverState};

use crate::device::Haptics;
use crate::events::TimerEvent;
use crate::timer::{Scheduler, TimerHandle};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);
pub const DEFAULT_HAPTIC_MS: u64 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureAction {
    TogglePlay,
    NextTrack,
    PreviousTrack,
    PlayVideo,
    StopVideo,
}

/// Map a finished window's click count to an action.
/// Anything past two clicks is "previous", there is no four-click gesture.
pub fn classify(clicks: u32) -> Option<GestureAction> {
    match clicks {
        0 => None,
        1 => Some(GestureAction::TogglePlay),
        2 => Some(GestureAction::NextTrack),
        _ => Some(GestureAction::PreviousTrack),
    }
}

pub struct GestureResolver {
    pending_clicks: u32,
    window: Option<TimerHandle>,
    generation: u64,
    debounce: Duration,
    haptic_ms: u64,
    holding: bool,
    scheduler: Scheduler,
    haptics: Box<dyn Haptics>,
}

impl GestureResolver {
    pub fn new(
        scheduler: Scheduler,
        debounce: Duration,
        haptics: Box<dyn Haptics>,
        haptic_ms: u64,
    ) -> Self {
        Self {
            pending_clicks: 0,
            window: None,
            generation: 0,
            debounce,
            haptic_ms,
            holding: false,
            scheduler,
            haptics,
        }
    }

    pub fn pending_clicks(&self) -> u32 {
        self.pending_clicks
    }

    pub fn window_active(&self) -> bool {
        self.window.is_some()
    }

    pub fn is_holding(&self) -> bool {
        self.holding
    }

    /// Count a click. Opens a window if none is open; clicks during an open
    /// window join it instead of starting another.
    pub fn register_click(&mut self) {
        self.pending_clicks += 1;
        if self.window.is_none() {
            self.generation += 1;
            self.window = Some(self.scheduler.once(
                self.debounce,
                TimerEvent::GestureWindow {
                    generation: self.generation,
                },
            ));
        }
        debug!("Click {} in window {}", self.pending_clicks, self.generation);
    }

    /// Window timer callback. Resolves at most once per window.
    pub fn window_elapsed(&mut self, generation: u64) -> Option<GestureAction> {
        if generation != self.generation || self.window.take().is_none() {
            debug!("Dropping stale gesture window {}", generation);
            return None;
        }
        let clicks = std::mem::take(&mut self.pending_clicks);
        let action = classify(clicks);
        debug!("Window {} closed with {} clicks -> {:?}", generation, clicks, action);
        action
    }

    /// Drop any pending clicks and their window
    pub fn reset(&mut self) {
        self.pending_clicks = 0;
        if let Some(window) = self.window.take() {
            window.cancel();
            self.generation += 1;
        }
    }

    pub fn register_touch_hold_start(&mut self) -> GestureAction {
        self.reset();
        self.holding = true;
        if !self.haptics.vibrate(self.haptic_ms) {
            debug!("Haptics unavailable, skipping pulse");
        }
        GestureAction::PlayVideo
    }

    pub fn register_touch_hold_end(&mut self) -> GestureAction {
        self.holding = false;
        GestureAction::StopVideo
    }
}
