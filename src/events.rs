// Everything the session reacts to goes through one channel: user input,
// media element events and timer expirations. One consumer means the state
// machine never sees two mutations racing each other.

use crate::device::Viewport;
use crate::media::{MediaEvent, MediaSource};
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    // Click on the photo or the quote
    Click,

    // Touch hold on the quote (compact layouts)
    TouchHoldStart,
    TouchHoldEnd,

    // Mouse hover
    TextHoverEnter,
    TextHoverLeave,
    PhotoHoverEnter,
    PhotoHoverLeave,
    PointerMove { x: i32, y: i32 },

    // Onboarding modal
    OpenInfo,
    DismissModal,

    Resize(Viewport),
}

/// Timer expirations. The generation ties each one to the arm that produced
/// it, so a cancelled timer whose event is already queued gets dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    GestureWindow { generation: u64 },
    TrimAdvance { generation: u64 },
    ModalTick { generation: u64 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    Input(InputEvent),
    /// `load` is the element's load generation when the event fired
    Media {
        source: MediaSource,
        load: u64,
        event: MediaEvent,
    },
    Timer(TimerEvent),
    /// Host heartbeat, lets polled media backends emit their events
    Tick(Duration),
    Quit,
}

pub struct EventHandler {
    event_sender: mpsc::UnboundedSender<AppEvent>,
    event_receiver: mpsc::UnboundedReceiver<AppEvent>,
}

impl EventHandler {
    pub fn new() -> Self {
        let (event_sender, event_receiver) = mpsc::unbounded_channel();

        Self {
            event_sender,
            event_receiver,
        }
    }

    pub fn sender(&self) -> mpsc::UnboundedSender<AppEvent> {
        self.event_sender.clone()
    }

    pub async fn next_event(&mut self) -> Option<AppEvent> {
        self.event_receiver.recv().await
    }

    /// Non-blocking variant, used to drain whatever is queued right now
    pub fn try_next_event(&mut self) -> Option<AppEvent> {
        self.event_receiver.try_recv().ok()
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}
