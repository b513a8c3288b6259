// In-memory media element. No decoding - it just keeps a playhead, advances it
// on poll and fires the same events a browser element would. Clones share
// state, so a test can keep one clone to inspect after handing the other to
// a controller.

use super::{ListenerId, Listeners, MediaElement, MediaEvent, MediaListener};
use crate::error::MediaError;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum MediaCommand {
    SetSource(String),
    Load,
    Play,
    Pause,
    Seek(f64),
}

#[derive(Debug)]
struct SimState {
    source: Option<String>,
    durations: HashMap<String, f64>,
    default_duration: f64,
    duration: f64,
    current_time: f64,
    playing: bool,
    play_blocked: bool,
    commands: Vec<MediaCommand>,
}

#[derive(Clone)]
pub struct SimulatedMedia {
    state: Rc<RefCell<SimState>>,
    listeners: Rc<RefCell<Listeners>>,
}

impl SimulatedMedia {
    /// Sources without a registered duration report NaN
    pub fn new() -> Self {
        Self::with_default_duration(f64::NAN)
    }

    pub fn with_default_duration(default_duration: f64) -> Self {
        Self {
            state: Rc::new(RefCell::new(SimState {
                source: None,
                durations: HashMap::new(),
                default_duration,
                duration: f64::NAN,
                current_time: 0.0,
                playing: false,
                play_blocked: false,
                commands: Vec::new(),
            })),
            listeners: Rc::new(RefCell::new(Listeners::default())),
        }
    }

    pub fn set_duration_for(&self, source_ref: &str, seconds: f64) {
        self.state
            .borrow_mut()
            .durations
            .insert(source_ref.to_string(), seconds);
    }

    /// Make `play()` fail the way a browser autoplay policy would
    pub fn set_play_blocked(&self, blocked: bool) {
        self.state.borrow_mut().play_blocked = blocked;
    }

    pub fn source(&self) -> Option<String> {
        self.state.borrow().source.clone()
    }

    pub fn is_playing(&self) -> bool {
        self.state.borrow().playing
    }

    pub fn commands(&self) -> Vec<MediaCommand> {
        self.state.borrow().commands.clone()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Advance the playhead by `seconds` of playback and fire the events a
    /// browser would: one `timeupdate`, then `ended` if the end was reached.
    pub fn advance(&self, seconds: f64) {
        let events = {
            let mut state = self.state.borrow_mut();
            if !state.playing {
                return;
            }
            let mut events = vec![MediaEvent::TimeUpdate];
            state.current_time += seconds;
            if state.duration.is_finite() && state.current_time >= state.duration {
                state.current_time = state.duration;
                state.playing = false;
                events.push(MediaEvent::Ended);
            }
            events
        };
        self.emit_all(&events);
    }

    /// Jump the playhead without playing through, then report a `timeupdate`
    pub fn jump_to(&self, seconds: f64) {
        self.state.borrow_mut().current_time = seconds;
        self.emit_all(&[MediaEvent::TimeUpdate]);
    }

    fn emit_all(&self, events: &[MediaEvent]) {
        let mut listeners = self.listeners.borrow_mut();
        for event in events {
            listeners.emit(*event);
        }
    }
}

impl Default for SimulatedMedia {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaElement for SimulatedMedia {
    fn set_source(&mut self, source_ref: &str) {
        let mut state = self.state.borrow_mut();
        state.source = Some(source_ref.to_string());
        state.commands.push(MediaCommand::SetSource(source_ref.to_string()));
    }

    fn load(&mut self) {
        let loaded = {
            let mut state = self.state.borrow_mut();
            state.commands.push(MediaCommand::Load);
            state.current_time = 0.0;
            state.playing = false;
            state.duration = match &state.source {
                Some(source) => state
                    .durations
                    .get(source)
                    .copied()
                    .unwrap_or(state.default_duration),
                None => f64::NAN,
            };
            !state.duration.is_nan()
        };
        if loaded {
            self.emit_all(&[MediaEvent::LoadedMetadata]);
        }
    }

    fn play(&mut self) -> Result<(), MediaError> {
        let mut state = self.state.borrow_mut();
        state.commands.push(MediaCommand::Play);
        if state.play_blocked {
            return Err(MediaError::PlayRejected(
                "play() can only be initiated by a user gesture".to_string(),
            ));
        }
        if state.source.is_none() {
            return Err(MediaError::NoSource);
        }
        state.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        let mut state = self.state.borrow_mut();
        state.commands.push(MediaCommand::Pause);
        state.playing = false;
    }

    fn current_time(&self) -> f64 {
        self.state.borrow().current_time
    }

    fn set_current_time(&mut self, seconds: f64) {
        let mut state = self.state.borrow_mut();
        state.commands.push(MediaCommand::Seek(seconds));
        state.current_time = seconds;
    }

    fn duration(&self) -> f64 {
        self.state.borrow().duration
    }

    fn add_listener(&mut self, listener: MediaListener) -> ListenerId {
        self.listeners.borrow_mut().add(listener)
    }

    fn remove_listener(&mut self, id: ListenerId) {
        self.listeners.borrow_mut().remove(id);
    }

    fn poll(&mut self, elapsed: Duration) {
        self.advance(elapsed.as_secs_f64());
    }
}
