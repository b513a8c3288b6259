// The page as a whole.
// `Session` owns every component and is the only consumer of the event
// channel. Input, media events and timer expirations are applied one at a
// time, so a resolved gesture is the single mutation of its window.

use crate::audio::{PlaybackController, PlaybackState};
use crate::config::Config;
use crate::device::{Haptics, Layout, Viewport};
use crate::error::ConfigError;
use crate::events::{AppEvent, EventHandler, InputEvent, TimerEvent};
use crate::gesture::{GestureAction, GestureResolver, HoverState};
use crate::media::{MediaElement, MediaSource};
use crate::onboarding::{ModalState, OnboardingModal};
use crate::timer::Scheduler;
use crate::video::VideoPool;
use anyhow::Result;
use rand::RngCore;
use tracing::{debug, info};

/// Everything a renderer needs, detached from the live components
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub status: String,
    pub playback: PlaybackState,
    pub track_count: usize,
    pub video_title: String,
    /// The video only shows while the quote is hovered or held
    pub video_visible: bool,
    pub tooltip: Option<(i32, i32)>,
    pub modal: ModalState,
    pub pending_clicks: u32,
    pub layout: Layout,
}

pub struct Session {
    viewport: Viewport,
    layout: Layout,
    gestures: GestureResolver,
    hover: HoverState,
    player: PlaybackController,
    videos: VideoPool,
    modal: OnboardingModal,
    scheduler: Scheduler,
}

impl Session {
    /// Build every component from config. The viewport is read here once;
    /// the onboarding decision and layout don't change afterwards.
    pub fn new(
        config: &Config,
        viewport: Viewport,
        scheduler: Scheduler,
        rng: Box<dyn RngCore>,
        haptics: Box<dyn Haptics>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let layout = viewport.layout(config.onboarding.small_screen_max_width);
        let player = PlaybackController::new(
            config.playlist()?,
            scheduler.clone(),
            config.trim_advance_delay(),
        );
        let videos = VideoPool::new(config.videos.clone(), config.video.on_end, rng)?;
        let gestures = GestureResolver::new(
            scheduler.clone(),
            config.debounce(),
            haptics,
            config.gestures.haptic_ms,
        );
        let mut modal = OnboardingModal::new(scheduler.clone(), config.onboarding.countdown_seconds);
        modal.on_startup(viewport, config.onboarding.small_screen_max_width);

        info!(
            "Session ready: {}x{} ({:?}), {} tracks, {} clips",
            viewport.width,
            viewport.height,
            layout,
            player.playlist().len(),
            videos.len()
        );

        Ok(Self {
            viewport,
            layout,
            gestures,
            hover: HoverState::default(),
            player,
            videos,
            modal,
            scheduler,
        })
    }

    /// Mount the media elements. Wide layouts start the video right away,
    /// compact ones wait for a hold.
    pub fn attach_media(&mut self, audio: Box<dyn MediaElement>, video: Box<dyn MediaElement>) {
        self.player.attach(audio);
        self.videos
            .attach(video, self.scheduler.sender(), self.layout == Layout::Wide);
    }

    /// Unmount: listeners come off the elements and every pending timer is
    /// cancelled.
    pub fn detach_media(
        &mut self,
    ) -> (Option<Box<dyn MediaElement>>, Option<Box<dyn MediaElement>>) {
        self.gestures.reset();
        self.modal.dismiss();
        (self.player.detach(), self.videos.detach())
    }

    pub fn player(&self) -> &PlaybackController {
        &self.player
    }

    pub fn videos(&self) -> &VideoPool {
        &self.videos
    }

    pub fn modal(&self) -> &OnboardingModal {
        &self.modal
    }

    pub fn hover(&self) -> HoverState {
        self.hover
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Apply one event. Returns `false` once the session should stop.
    pub fn handle_event(&mut self, event: AppEvent) -> bool {
        match event {
            AppEvent::Input(input) => self.handle_input(input),
            AppEvent::Media {
                source: MediaSource::Audio,
                load,
                event,
            } => self.player.handle_media_event(load, event),
            AppEvent::Media {
                source: MediaSource::Video,
                load,
                event,
            } => self.videos.handle_media_event(load, event),
            AppEvent::Timer(TimerEvent::GestureWindow { generation }) => {
                if let Some(action) = self.gestures.window_elapsed(generation) {
                    self.apply(action);
                }
            }
            AppEvent::Timer(TimerEvent::TrimAdvance { generation }) => {
                self.player.trim_delay_elapsed(generation)
            }
            AppEvent::Timer(TimerEvent::ModalTick { generation }) => self.modal.tick(generation),
            AppEvent::Tick(elapsed) => {
                self.player.poll(elapsed);
                self.videos.poll(elapsed);
            }
            AppEvent::Quit => {
                info!("Session shutting down");
                return false;
            }
        }
        true
    }

    /// Drain events until `Quit` or the channel closes, calling
    /// `after_event` after each one (hosts redraw there).
    pub async fn run<F>(&mut self, events: &mut EventHandler, mut after_event: F) -> Result<()>
    where
        F: FnMut(&Session) -> Result<()>,
    {
        after_event(self)?;
        while let Some(event) = events.next_event().await {
            if !self.handle_event(event) {
                break;
            }
            after_event(self)?;
        }
        self.detach_media();
        Ok(())
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            status: self.player.now_playing().to_string(),
            playback: self.player.state(),
            track_count: self.player.playlist().len(),
            video_title: self.videos.current_clip().title.clone(),
            video_visible: self.hover.text_hovered,
            tooltip: self.hover.tooltip,
            modal: self.modal.state(),
            pending_clicks: self.gestures.pending_clicks(),
            layout: self.layout,
        }
    }

    fn handle_input(&mut self, input: InputEvent) {
        match input {
            InputEvent::Click => self.gestures.register_click(),
            InputEvent::TouchHoldStart => {
                self.hover.text_hovered = true;
                let action = self.gestures.register_touch_hold_start();
                self.apply(action);
            }
            InputEvent::TouchHoldEnd => {
                self.hover.text_hovered = false;
                let action = self.gestures.register_touch_hold_end();
                self.apply(action);
            }
            // Compact layouts never autoplay, so hovering has to start the clip
            InputEvent::TextHoverEnter => {
                self.hover.text_hovered = true;
                if self.layout == Layout::Compact {
                    self.apply(GestureAction::PlayVideo);
                }
            }
            InputEvent::TextHoverLeave => {
                self.hover.text_hovered = false;
                self.apply(GestureAction::StopVideo);
            }
            InputEvent::PhotoHoverEnter => self.hover.enter_photo(),
            InputEvent::PhotoHoverLeave => self.hover.leave_photo(),
            InputEvent::PointerMove { x, y } => self.hover.pointer_moved(x, y, self.viewport),
            InputEvent::OpenInfo => self.modal.reopen(),
            InputEvent::DismissModal => self.modal.dismiss(),
            InputEvent::Resize(viewport) => {
                debug!("Viewport resized to {}x{}", viewport.width, viewport.height);
                self.viewport = viewport;
            }
        }
    }

    fn apply(&mut self, action: GestureAction) {
        debug!("Applying {:?}", action);
        match action {
            GestureAction::TogglePlay => self.player.toggle_play(),
            GestureAction::NextTrack => self.player.next_track(),
            GestureAction::PreviousTrack => self.player.previous_track(),
            GestureAction::PlayVideo => self.videos.play_current(),
            // Wide layouts keep the video running regardless of holds
            GestureAction::StopVideo => {
                if self.layout == Layout::Compact {
                    self.videos.pause_current();
                }
            }
        }
    }
}
