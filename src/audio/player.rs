use super::playlist::Playlist;
use super::track::Track;
use crate::events::{AppEvent, TimerEvent};
use crate::media::{MediaElement, MediaEvent, MediaHandle, MediaSource};
use crate::timer::{Scheduler, TimerHandle};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_TRIM_ADVANCE_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlaybackState {
    pub current_track_index: usize,
    pub is_playing: bool,
    /// Latches on the first toggle and stays set for the session
    pub has_started: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerPhase {
    Idle,
    Playing,
    Paused,
}

impl PlaybackState {
    pub fn phase(&self) -> PlayerPhase {
        match (self.has_started, self.is_playing) {
            (false, _) => PlayerPhase::Idle,
            (true, true) => PlayerPhase::Playing,
            (true, false) => PlayerPhase::Paused,
        }
    }
}

/// Status line under the photo
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NowPlaying<'a> {
    Prompt,
    Playing(&'a Track),
    Paused,
}

impl fmt::Display for NowPlaying<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NowPlaying::Prompt => write!(f, "Click the photo or quote to start the music"),
            NowPlaying::Playing(track) => write!(f, "Now Playing: {}", track.title),
            NowPlaying::Paused => write!(f, "Paused"),
        }
    }
}

/// Owns the audio element and the play state.
///
/// Track changes always start playback. Trimmed tracks are cut short on
/// `timeupdate`: pause, wait `trim_delay`, then advance exactly as a natural
/// `ended` would (minus the wait).
pub struct PlaybackController {
    playlist: Playlist,
    state: PlaybackState,
    audio: MediaHandle,
    scheduler: Scheduler,
    trim_delay: Duration,
    trim_timer: Option<TimerHandle>,
    trim_generation: u64,
}

impl PlaybackController {
    pub fn new(playlist: Playlist, scheduler: Scheduler, trim_delay: Duration) -> Self {
        Self {
            playlist,
            state: PlaybackState::default(),
            audio: MediaHandle::empty("audio"),
            scheduler,
            trim_delay,
            trim_timer: None,
            trim_generation: 0,
        }
    }

    /// Mount the audio element: register the listener and load the current
    /// track. A remount while playing resumes on the new element.
    pub fn attach(&mut self, element: Box<dyn MediaElement>) {
        let sender = self.scheduler.sender();
        self.audio.attach(element, move |load, event| {
            let _ = sender.send(AppEvent::Media {
                source: MediaSource::Audio,
                load,
                event,
            });
        });
        self.load_track(self.state.current_track_index);
        if self.state.is_playing {
            self.set_playing(true);
        }
    }

    pub fn detach(&mut self) -> Option<Box<dyn MediaElement>> {
        self.cancel_trim();
        self.audio.release()
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn current_track(&self) -> &Track {
        self.playlist.get(self.state.current_track_index)
    }

    pub fn trim_pending(&self) -> bool {
        self.trim_timer.is_some()
    }

    pub fn now_playing(&self) -> NowPlaying<'_> {
        match self.state.phase() {
            PlayerPhase::Idle => NowPlaying::Prompt,
            PlayerPhase::Playing => NowPlaying::Playing(self.current_track()),
            PlayerPhase::Paused => NowPlaying::Paused,
        }
    }

    /// Point the element at `tracks[index]` and reload. Never starts playback.
    pub fn load_track(&mut self, index: usize) {
        let track = self.playlist.get(index);
        debug!("Loading track '{}' from {}", track.title, track.source_ref);
        self.audio.set_source(&track.source_ref);
        self.audio.load();
    }

    /// A rejected play is logged and left alone; the next gesture retries.
    pub fn set_playing(&mut self, playing: bool) {
        self.state.is_playing = playing;
        if playing {
            if let Err(e) = self.audio.play() {
                warn!("Playback failed: {}", e);
            }
        } else {
            self.audio.pause();
        }
    }

    pub fn toggle_play(&mut self) {
        if !self.state.has_started {
            info!("Playback started for the first time");
        }
        self.state.has_started = true;
        self.set_playing(!self.state.is_playing);
    }

    pub fn next_track(&mut self) {
        let index = self.playlist.next_index(self.state.current_track_index);
        self.switch_to(index);
    }

    pub fn previous_track(&mut self) {
        let index = self.playlist.previous_index(self.state.current_track_index);
        self.switch_to(index);
    }

    /// Events from an earlier load (queued before a track change) are dropped.
    pub fn handle_media_event(&mut self, load: u64, event: MediaEvent) {
        if !self.audio.is_current(load) {
            debug!("Dropping {:?} from a previous track", event);
            return;
        }
        match event {
            MediaEvent::TimeUpdate => self.check_trim(),
            MediaEvent::Ended => {
                if self.trim_pending() {
                    debug!("Ignoring ended, trimmed advance already scheduled");
                    return;
                }
                info!("Track '{}' finished", self.current_track().title);
                self.next_track();
            }
            MediaEvent::LoadedMetadata => {
                debug!("Metadata loaded for '{}'", self.current_track().title);
            }
        }
    }

    pub fn poll(&mut self, elapsed: Duration) {
        self.audio.poll(elapsed);
    }

    /// Timer callback for the delayed advance after a trim stop
    pub fn trim_delay_elapsed(&mut self, generation: u64) {
        if generation != self.trim_generation || self.trim_timer.take().is_none() {
            debug!("Dropping stale trim advance (generation {})", generation);
            return;
        }
        self.next_track();
    }

    fn check_trim(&mut self) {
        if !self.state.is_playing || self.trim_pending() {
            return;
        }
        let Some(duration) = self.audio.duration() else {
            return;
        };
        let Some(current_time) = self.audio.current_time() else {
            return;
        };
        let Some(stop_time) = self.current_track().stop_time(duration) else {
            return;
        };
        if current_time < stop_time {
            return;
        }

        info!(
            "Trimming '{}' at {:.1}s of {:.1}s",
            self.current_track().title,
            current_time,
            duration
        );
        self.audio.pause();
        self.state.is_playing = false;
        self.trim_generation += 1;
        self.trim_timer = Some(self.scheduler.once(
            self.trim_delay,
            TimerEvent::TrimAdvance {
                generation: self.trim_generation,
            },
        ));
    }

    fn switch_to(&mut self, index: usize) {
        self.cancel_trim();
        self.state.current_track_index = index;
        self.load_track(index);
        self.set_playing(true);
    }

    fn cancel_trim(&mut self) {
        if let Some(timer) = self.trim_timer.take() {
            timer.cancel();
            self.trim_generation += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventHandler;
    use crate::media::SimulatedMedia;
    use tokio::time::sleep;

    fn controller(tracks: Vec<Track>, events: &EventHandler) -> PlaybackController {
        let playlist = Playlist::new(tracks).unwrap();
        PlaybackController::new(
            playlist,
            Scheduler::new(events.sender()),
            DEFAULT_TRIM_ADVANCE_DELAY,
        )
    }

    fn abc() -> Vec<Track> {
        vec![
            Track::new("A", "/music/a.mp3"),
            Track::new("B", "/music/b.mp3"),
            Track::new("C", "/music/c.mp3"),
        ]
    }

    // Feed queued media and timer events back in, like the session loop does
    fn pump(player: &mut PlaybackController, events: &mut EventHandler) {
        while let Some(event) = events.try_next_event() {
            match event {
                AppEvent::Media {
                    source: MediaSource::Audio,
                    load,
                    event,
                } => player.handle_media_event(load, event),
                AppEvent::Timer(TimerEvent::TrimAdvance { generation }) => {
                    player.trim_delay_elapsed(generation)
                }
                _ => {}
            }
        }
    }

    #[tokio::test]
    async fn next_track_wraps_and_always_plays() {
        let mut events = EventHandler::new();
        let mut player = controller(abc(), &events);
        let media = SimulatedMedia::with_default_duration(120.0);
        player.attach(Box::new(media.clone()));

        player.next_track();
        assert_eq!(player.state().current_track_index, 1);
        assert!(player.state().is_playing);

        player.next_track();
        assert_eq!(player.state().current_track_index, 2);
        assert_eq!(player.current_track().title, "C");
        assert!(player.state().is_playing);

        player.next_track();
        assert_eq!(player.state().current_track_index, 0);
        assert!(player.state().is_playing);
        assert_eq!(media.source().as_deref(), Some("/music/a.mp3"));
        assert!(media.is_playing());
        pump(&mut player, &mut events);
    }

    #[tokio::test]
    async fn previous_undoes_next() {
        let events = EventHandler::new();
        let mut player = controller(abc(), &events);
        for start in 0..3 {
            while player.state().current_track_index != start {
                player.next_track();
            }
            player.next_track();
            player.previous_track();
            assert_eq!(player.state().current_track_index, start);
            player.previous_track();
            player.next_track();
            assert_eq!(player.state().current_track_index, start);
        }
    }

    #[tokio::test]
    async fn has_started_latches_on_first_toggle() {
        let events = EventHandler::new();
        let mut player = controller(abc(), &events);
        assert_eq!(player.state().phase(), PlayerPhase::Idle);
        assert_eq!(player.now_playing(), NowPlaying::Prompt);

        // Track changes don't count as starting
        player.next_track();
        assert!(!player.state().has_started);

        player.toggle_play();
        assert!(player.state().has_started);
        assert_eq!(player.state().phase(), PlayerPhase::Paused);
        player.toggle_play();
        assert_eq!(player.state().phase(), PlayerPhase::Playing);
        player.toggle_play();
        assert!(player.state().has_started);
        assert_eq!(player.now_playing().to_string(), "Paused");
    }

    #[tokio::test]
    async fn load_track_does_not_play() {
        let events = EventHandler::new();
        let mut player = controller(abc(), &events);
        let media = SimulatedMedia::with_default_duration(60.0);
        player.attach(Box::new(media.clone()));
        assert_eq!(media.source().as_deref(), Some("/music/a.mp3"));

        player.load_track(2);
        assert_eq!(media.source().as_deref(), Some("/music/c.mp3"));
        assert!(!media.is_playing());
    }

    #[tokio::test(start_paused = true)]
    async fn trimmed_track_pauses_then_advances() {
        let mut events = EventHandler::new();
        let tracks = vec![
            Track::new("Museo", "/music/Museo.mp3").with_trim(3.0),
            Track::new("Sining", "/music/Sining.mp3"),
        ];
        let mut player = controller(tracks, &events);
        let media = SimulatedMedia::new();
        media.set_duration_for("/music/Museo.mp3", 100.0);
        media.set_duration_for("/music/Sining.mp3", 200.0);
        player.attach(Box::new(media.clone()));
        player.toggle_play();
        pump(&mut player, &mut events);

        media.jump_to(96.9);
        pump(&mut player, &mut events);
        assert!(player.state().is_playing);

        media.jump_to(97.0);
        pump(&mut player, &mut events);
        assert!(!player.state().is_playing);
        assert!(!media.is_playing());
        assert!(player.trim_pending());
        assert_eq!(player.state().current_track_index, 0);

        sleep(Duration::from_millis(499)).await;
        pump(&mut player, &mut events);
        assert_eq!(player.state().current_track_index, 0);

        sleep(Duration::from_millis(2)).await;
        pump(&mut player, &mut events);
        assert_eq!(player.state().current_track_index, 1);
        assert!(player.state().is_playing);
        assert_eq!(player.now_playing().to_string(), "Now Playing: Sining");
        assert!(!player.trim_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn natural_end_advances_without_delay() {
        let mut events = EventHandler::new();
        let mut player = controller(abc(), &events);
        let media = SimulatedMedia::with_default_duration(10.0);
        player.attach(Box::new(media.clone()));
        player.toggle_play();

        // Reaching the end by timeupdate alone is not an advance for untrimmed tracks
        media.jump_to(10.0);
        pump(&mut player, &mut events);
        assert_eq!(player.state().current_track_index, 0);
        assert!(player.state().is_playing);

        media.jump_to(0.0);
        media.advance(10.0);
        pump(&mut player, &mut events);
        assert_eq!(player.state().current_track_index, 1);
        assert!(player.state().is_playing);
        assert!(media.is_playing());
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_duration_never_trims() {
        let mut events = EventHandler::new();
        let tracks = vec![
            Track::new("Museo", "/music/Museo.mp3").with_trim(3.0),
            Track::new("B", "/music/b.mp3"),
        ];
        let mut player = controller(tracks, &events);
        let media = SimulatedMedia::new();
        player.attach(Box::new(media.clone()));
        player.toggle_play();

        media.jump_to(1_000.0);
        pump(&mut player, &mut events);
        assert!(player.state().is_playing);
        assert!(!player.trim_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn manual_skip_cancels_trim_advance() {
        let mut events = EventHandler::new();
        let tracks = vec![
            Track::new("Museo", "/music/Museo.mp3").with_trim(3.0),
            Track::new("B", "/music/b.mp3"),
            Track::new("C", "/music/c.mp3"),
        ];
        let mut player = controller(tracks, &events);
        let media = SimulatedMedia::with_default_duration(100.0);
        player.attach(Box::new(media.clone()));
        player.toggle_play();

        media.jump_to(98.0);
        pump(&mut player, &mut events);
        assert!(player.trim_pending());

        player.next_track();
        assert_eq!(player.state().current_track_index, 1);

        sleep(Duration::from_secs(1)).await;
        pump(&mut player, &mut events);
        assert_eq!(player.state().current_track_index, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn ended_during_trim_delay_is_ignored() {
        let mut events = EventHandler::new();
        let tracks = vec![
            Track::new("Museo", "/music/Museo.mp3").with_trim(3.0),
            Track::new("B", "/music/b.mp3"),
            Track::new("C", "/music/c.mp3"),
        ];
        let mut player = controller(tracks, &events);
        let media = SimulatedMedia::with_default_duration(100.0);
        player.attach(Box::new(media.clone()));
        player.toggle_play();

        media.jump_to(99.0);
        pump(&mut player, &mut events);
        let load = player.audio.load_generation();
        player.handle_media_event(load, MediaEvent::Ended);
        assert_eq!(player.state().current_track_index, 0);

        sleep(Duration::from_millis(600)).await;
        pump(&mut player, &mut events);
        assert_eq!(player.state().current_track_index, 1);
    }

    #[tokio::test]
    async fn ended_from_previous_track_is_dropped() {
        let mut events = EventHandler::new();
        let mut player = controller(abc(), &events);
        let media = SimulatedMedia::with_default_duration(30.0);
        player.attach(Box::new(media.clone()));
        player.toggle_play();
        pump(&mut player, &mut events);

        // A finishes, but its ended is still queued when the user skips
        media.advance(30.0);
        player.next_track();
        pump(&mut player, &mut events);

        assert_eq!(player.state().current_track_index, 1);
        assert_eq!(media.source().as_deref(), Some("/music/b.mp3"));
        assert!(player.state().is_playing);
        assert!(media.is_playing());
    }

    #[tokio::test]
    async fn rejected_play_keeps_attempted_state() {
        let events = EventHandler::new();
        let mut player = controller(abc(), &events);
        let media = SimulatedMedia::with_default_duration(60.0);
        media.set_play_blocked(true);
        player.attach(Box::new(media.clone()));

        player.toggle_play();
        assert!(player.state().is_playing);
        assert!(player.state().has_started);
        assert!(!media.is_playing());

        // Next gesture is the retry
        media.set_play_blocked(false);
        player.toggle_play();
        player.toggle_play();
        assert!(media.is_playing());
    }

    #[tokio::test]
    async fn commands_without_element_are_noops() {
        let events = EventHandler::new();
        let mut player = controller(abc(), &events);
        player.toggle_play();
        player.next_track();
        let load = player.audio.load_generation();
        player.handle_media_event(load, MediaEvent::TimeUpdate);
        assert_eq!(player.state().current_track_index, 1);
        assert!(player.state().is_playing);
    }
}
