// Background video rotation
// Starts on a random clip at a random offset so the page never opens on the
// same frame twice, then keeps going clip after clip

use crate::error::ConfigError;
use crate::events::AppEvent;
use crate::media::{MediaElement, MediaEvent, MediaHandle, MediaSource};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoClip {
    pub title: String,
    pub source_ref: String,
}

impl VideoClip {
    pub fn new(title: impl Into<String>, source_ref: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            source_ref: source_ref.into(),
        }
    }
}

/// What to do when a clip reaches its end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClipEndBehavior {
    /// Move on to the next clip, wrapping around
    #[default]
    Advance,
    /// Replay the same clip from the start
    Loop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoState {
    pub current_video_index: usize,
    pub has_chosen_initial: bool,
}

pub struct VideoPool {
    clips: Vec<VideoClip>,
    state: VideoState,
    initial_seek_pending: bool,
    on_end: ClipEndBehavior,
    element: MediaHandle,
    rng: Box<dyn RngCore>,
}

impl VideoPool {
    pub fn new(
        clips: Vec<VideoClip>,
        on_end: ClipEndBehavior,
        mut rng: Box<dyn RngCore>,
    ) -> Result<Self, ConfigError> {
        if clips.is_empty() {
            return Err(ConfigError::EmptyVideoPool);
        }
        let initial = rng.gen_range(0..clips.len());
        info!("Starting on clip {} ('{}')", initial, clips[initial].title);

        Ok(Self {
            clips,
            state: VideoState {
                current_video_index: initial,
                has_chosen_initial: true,
            },
            initial_seek_pending: true,
            on_end,
            element: MediaHandle::empty("video"),
            rng,
        })
    }

    pub fn attach(
        &mut self,
        element: Box<dyn MediaElement>,
        sender: mpsc::UnboundedSender<AppEvent>,
        autoplay: bool,
    ) {
        self.element.attach(element, move |load, event| {
            let _ = sender.send(AppEvent::Media {
                source: MediaSource::Video,
                load,
                event,
            });
        });
        self.load_current();
        if autoplay {
            self.play_current();
        }
    }

    pub fn detach(&mut self) -> Option<Box<dyn MediaElement>> {
        self.element.release()
    }

    pub fn state(&self) -> VideoState {
        self.state
    }

    pub fn current_clip(&self) -> &VideoClip {
        &self.clips[self.state.current_video_index]
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    pub fn play_current(&mut self) {
        if let Err(e) = self.element.play() {
            warn!("Video playback failed: {}", e);
        }
    }

    pub fn pause_current(&mut self) {
        self.element.pause();
    }

    pub fn handle_media_event(&mut self, load: u64, event: MediaEvent) {
        if !self.element.is_current(load) {
            debug!("Dropping {:?} from a previous clip", event);
            return;
        }
        match event {
            MediaEvent::LoadedMetadata => self.seek_initial(),
            MediaEvent::Ended => match self.on_end {
                ClipEndBehavior::Advance => self.advance(),
                ClipEndBehavior::Loop => {
                    self.element.seek(0.0);
                    self.play_current();
                }
            },
            MediaEvent::TimeUpdate => {}
        }
    }

    pub fn poll(&mut self, elapsed: std::time::Duration) {
        self.element.poll(elapsed);
    }

    fn advance(&mut self) {
        self.state.current_video_index = (self.state.current_video_index + 1) % self.clips.len();
        debug!("Advancing to clip '{}'", self.current_clip().title);
        self.load_current();
        self.play_current();
    }

    fn load_current(&mut self) {
        let clip = &self.clips[self.state.current_video_index];
        self.element.set_source(&clip.source_ref);
        self.element.load();
    }

    // Only the very first clip gets a random offset
    fn seek_initial(&mut self) {
        if !self.initial_seek_pending {
            return;
        }
        let Some(duration) = self.element.duration() else {
            return;
        };
        let offset = self.rng.gen_range(0.0..duration);
        debug!("Seeking initial clip to {:.2}s of {:.2}s", offset, duration);
        self.element.seek(offset);
        self.initial_seek_pending = false;
    }
}
