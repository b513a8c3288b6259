// The media collaborator contract.
// The engine never plays anything itself. It drives an element that looks
// like an HTML media element: set a source, load, play/pause, read and write
// the playhead, read the duration, and listen for `ended`, `timeupdate` and
// `loadedmetadata`.

pub mod simulated;

#[cfg(feature = "audio")]
pub mod rodio_backend;

pub use simulated::SimulatedMedia;

#[cfg(feature = "audio")]
pub use rodio_backend::RodioMedia;

use crate::error::MediaError;
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaEvent {
    Ended,
    TimeUpdate,
    LoadedMetadata,
}

/// Which element an event came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaSource {
    Audio,
    Video,
}

pub type ListenerId = u64;
pub type MediaListener = Box<dyn FnMut(MediaEvent)>;

pub trait MediaElement {
    fn set_source(&mut self, source_ref: &str);
    fn load(&mut self);
    fn play(&mut self) -> Result<(), MediaError>;
    fn pause(&mut self);
    fn current_time(&self) -> f64;
    fn set_current_time(&mut self, seconds: f64);
    /// NaN until metadata is known
    fn duration(&self) -> f64;

    fn add_listener(&mut self, listener: MediaListener) -> ListenerId;
    fn remove_listener(&mut self, id: ListenerId);

    /// Backends without their own event source emit `timeupdate`/`ended` here.
    fn poll(&mut self, _elapsed: Duration) {}
}

/// Listener bookkeeping shared by the backends
#[derive(Default)]
pub struct Listeners {
    next_id: ListenerId,
    entries: Vec<(ListenerId, MediaListener)>,
}

impl Listeners {
    pub fn add(&mut self, listener: MediaListener) -> ListenerId {
        self.next_id += 1;
        self.entries.push((self.next_id, listener));
        self.next_id
    }

    pub fn remove(&mut self, id: ListenerId) {
        self.entries.retain(|(entry_id, _)| *entry_id != id);
    }

    pub fn emit(&mut self, event: MediaEvent) {
        for (_, listener) in self.entries.iter_mut() {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Exclusive handle on one element plus the listener registered on it.
///
/// Attaching registers the listener, releasing (or dropping) removes it, so a
/// callback can never outlive the component that installed it. Every command
/// on an empty handle is a logged no-op.
///
/// Each attach and each `load` starts a new load generation, and the listener
/// stamps every event with the generation current when it fired. Events still
/// queued from before a reload carry an older number and are discarded with
/// `is_current`, the way a browser drops pending events on `load()`.
pub struct MediaHandle {
    label: &'static str,
    element: Option<Box<dyn MediaElement>>,
    listener: Option<ListenerId>,
    loads: Rc<Cell<u64>>,
}

impl MediaHandle {
    pub fn empty(label: &'static str) -> Self {
        Self {
            label,
            element: None,
            listener: None,
            loads: Rc::new(Cell::new(0)),
        }
    }

    /// Register `on_event` on the element. It receives the load generation
    /// alongside each event.
    pub fn attach<F>(&mut self, mut element: Box<dyn MediaElement>, mut on_event: F)
    where
        F: FnMut(u64, MediaEvent) + 'static,
    {
        self.release();
        self.loads.set(self.loads.get() + 1);
        let loads = Rc::clone(&self.loads);
        let listener: MediaListener = Box::new(move |event| on_event(loads.get(), event));
        self.listener = Some(element.add_listener(listener));
        self.element = Some(element);
        debug!("{}: element attached", self.label);
    }

    pub fn load_generation(&self) -> u64 {
        self.loads.get()
    }

    /// Whether an event stamped with `load` belongs to the source loaded now
    pub fn is_current(&self, load: u64) -> bool {
        load == self.loads.get()
    }

    pub fn release(&mut self) -> Option<Box<dyn MediaElement>> {
        let mut element = self.element.take()?;
        if let Some(id) = self.listener.take() {
            element.remove_listener(id);
        }
        debug!("{}: element released", self.label);
        Some(element)
    }

    pub fn set_source(&mut self, source_ref: &str) {
        match self.element.as_mut() {
            Some(element) => element.set_source(source_ref),
            None => self.skipped("set_source"),
        }
    }

    pub fn load(&mut self) {
        match self.element.as_mut() {
            Some(element) => {
                // Bumped first: `loadedmetadata` may fire from inside load()
                self.loads.set(self.loads.get() + 1);
                element.load();
            }
            None => self.skipped("load"),
        }
    }

    pub fn play(&mut self) -> Result<(), MediaError> {
        match self.element.as_mut() {
            Some(element) => element.play(),
            None => {
                self.skipped("play");
                Ok(())
            }
        }
    }

    pub fn pause(&mut self) {
        match self.element.as_mut() {
            Some(element) => element.pause(),
            None => self.skipped("pause"),
        }
    }

    pub fn seek(&mut self, seconds: f64) {
        match self.element.as_mut() {
            Some(element) => element.set_current_time(seconds),
            None => self.skipped("seek"),
        }
    }

    pub fn current_time(&self) -> Option<f64> {
        self.element.as_ref().map(|element| element.current_time())
    }

    /// Duration when it is usable: NaN, infinite and non-positive all mean
    /// "don't know yet".
    pub fn duration(&self) -> Option<f64> {
        self.element
            .as_ref()
            .map(|element| element.duration())
            .filter(|d| d.is_finite() && *d > 0.0)
    }

    pub fn poll(&mut self, elapsed: Duration) {
        if let Some(element) = self.element.as_mut() {
            element.poll(elapsed);
        }
    }

    fn skipped(&self, op: &str) {
        debug!("{}: no element attached, ignoring {}", self.label, op);
    }
}

impl Drop for MediaHandle {
    fn drop(&mut self) {
        self.release();
    }
}
