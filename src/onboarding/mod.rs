// Onboarding modal for small screens
// Explains the click/hold controls, closes itself after a countdown

use crate::device::{Layout, Viewport};
use crate::events::TimerEvent;
use crate::timer::{Scheduler, TimerHandle};
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_COUNTDOWN_SECONDS: u32 = 15;
pub const DEFAULT_SMALL_SCREEN_MAX_WIDTH: u32 = 768;

const TICK: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModalState {
    pub visible: bool,
    /// The "i" button that brings the modal back
    pub info_visible: bool,
    pub countdown_seconds: u32,
}

pub struct OnboardingModal {
    state: ModalState,
    initial_countdown: u32,
    ticker: Option<TimerHandle>,
    generation: u64,
    scheduler: Scheduler,
}

impl OnboardingModal {
    pub fn new(scheduler: Scheduler, countdown_seconds: u32) -> Self {
        Self {
            state: ModalState {
                visible: false,
                info_visible: false,
                countdown_seconds,
            },
            initial_countdown: countdown_seconds,
            ticker: None,
            generation: 0,
            scheduler,
        }
    }

    pub fn state(&self) -> ModalState {
        self.state
    }

    /// Startup decision, made once: compact screens get the modal and the
    /// info button, everything else gets neither.
    pub fn on_startup(&mut self, viewport: Viewport, small_screen_max_width: u32) {
        match viewport.layout(small_screen_max_width) {
            Layout::Compact => {
                info!("Compact viewport ({}px), showing onboarding", viewport.width);
                self.state.info_visible = true;
                self.show();
            }
            Layout::Wide => {
                debug!("Wide viewport ({}px), skipping onboarding", viewport.width);
            }
        }
    }

    /// Info button. Restarts the countdown from the top.
    pub fn reopen(&mut self) {
        if !self.state.info_visible {
            debug!("Info affordance hidden, ignoring reopen");
            return;
        }
        self.show();
    }

    pub fn dismiss(&mut self) {
        self.state.visible = false;
        if let Some(ticker) = self.ticker.take() {
            ticker.cancel();
            self.generation += 1;
        }
    }

    pub fn tick(&mut self, generation: u64) {
        if !self.state.visible || generation != self.generation || self.ticker.is_none() {
            return;
        }
        self.state.countdown_seconds = self.state.countdown_seconds.saturating_sub(1);
        if self.state.countdown_seconds == 0 {
            debug!("Onboarding countdown finished");
            self.dismiss();
        }
    }

    fn show(&mut self) {
        self.dismiss();
        self.state.countdown_seconds = self.initial_countdown;
        self.state.visible = true;
        self.generation += 1;
        self.ticker = Some(self.scheduler.repeating(
            TICK,
            TimerEvent::ModalTick {
                generation: self.generation,
            },
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{AppEvent, EventHandler};
    use tokio::time::sleep;

    fn modal(events: &EventHandler) -> OnboardingModal {
        OnboardingModal::new(Scheduler::new(events.sender()), DEFAULT_COUNTDOWN_SECONDS)
    }

    fn pump(modal: &mut OnboardingModal, events: &mut EventHandler) {
        while let Some(event) = events.try_next_event() {
            if let AppEvent::Timer(TimerEvent::ModalTick { generation }) = event {
                modal.tick(generation);
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn small_viewport_shows_modal_and_info() {
        let events = EventHandler::new();
        let mut modal = modal(&events);
        modal.on_startup(Viewport::new(500, 900), DEFAULT_SMALL_SCREEN_MAX_WIDTH);
        let state = modal.state();
        assert!(state.visible);
        assert!(state.info_visible);
        assert_eq!(state.countdown_seconds, 15);
    }

    #[tokio::test(start_paused = true)]
    async fn wide_viewport_shows_nothing() {
        let events = EventHandler::new();
        let mut modal = modal(&events);
        modal.on_startup(Viewport::new(1200, 800), DEFAULT_SMALL_SCREEN_MAX_WIDTH);
        assert!(!modal.state().visible);
        assert!(!modal.state().info_visible);

        modal.reopen();
        assert!(!modal.state().visible);
    }

    #[tokio::test(start_paused = true)]
    async fn countdown_hides_after_fifteen_ticks() {
        let mut events = EventHandler::new();
        let mut modal = modal(&events);
        modal.on_startup(Viewport::new(500, 900), DEFAULT_SMALL_SCREEN_MAX_WIDTH);

        sleep(Duration::from_millis(14_500)).await;
        pump(&mut modal, &mut events);
        assert!(modal.state().visible);
        assert_eq!(modal.state().countdown_seconds, 1);

        sleep(Duration::from_secs(1)).await;
        pump(&mut modal, &mut events);
        assert!(!modal.state().visible);
        assert_eq!(modal.state().countdown_seconds, 0);

        // Ticker is gone, nothing more arrives
        sleep(Duration::from_secs(5)).await;
        assert!(events.try_next_event().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn extra_ticks_after_close_change_nothing() {
        let events = EventHandler::new();
        let mut modal = modal(&events);
        modal.on_startup(Viewport::new(500, 900), DEFAULT_SMALL_SCREEN_MAX_WIDTH);

        let generation = 1;
        for _ in 0..15 {
            modal.tick(generation);
        }
        let closed = modal.state();
        assert!(!closed.visible);

        for _ in 0..10 {
            modal.tick(generation);
        }
        assert_eq!(modal.state(), closed);
    }

    #[tokio::test(start_paused = true)]
    async fn manual_dismiss_cancels_countdown() {
        let mut events = EventHandler::new();
        let mut modal = modal(&events);
        modal.on_startup(Viewport::new(500, 900), DEFAULT_SMALL_SCREEN_MAX_WIDTH);

        sleep(Duration::from_millis(3_500)).await;
        modal.dismiss();
        pump(&mut modal, &mut events);
        let dismissed = modal.state();
        assert!(!dismissed.visible);

        sleep(Duration::from_secs(20)).await;
        assert!(events.try_next_event().is_none());
        assert_eq!(modal.state(), dismissed);
    }

    #[tokio::test(start_paused = true)]
    async fn reopen_resets_countdown() {
        let mut events = EventHandler::new();
        let mut modal = modal(&events);
        modal.on_startup(Viewport::new(500, 900), DEFAULT_SMALL_SCREEN_MAX_WIDTH);

        sleep(Duration::from_millis(5_500)).await;
        pump(&mut modal, &mut events);
        assert_eq!(modal.state().countdown_seconds, 10);

        modal.reopen();
        assert!(modal.state().visible);
        assert_eq!(modal.state().countdown_seconds, 15);

        sleep(Duration::from_millis(2_500)).await;
        pump(&mut modal, &mut events);
        assert_eq!(modal.state().countdown_seconds, 13);
    }
}
