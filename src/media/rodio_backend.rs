use super::{ListenerId, Listeners, MediaElement, MediaEvent, MediaListener};
use crate::error::MediaError;
use anyhow::Result;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Audio element backed by a rodio sink.
///
/// Source refs are page-style paths (`/music/Sining.mp3`) resolved against
/// `assets_dir`. rodio has no callbacks, so `timeupdate` and `ended` are
/// produced from `poll()`.
pub struct RodioMedia {
    _stream: OutputStream,
    stream_handle: OutputStreamHandle,
    sink: Option<Sink>,
    assets_dir: PathBuf,
    source: Option<String>,
    duration: f64,
    // Playhead bookkeeping: position at last pause/seek plus the running stretch
    position: Duration,
    resumed_at: Option<Instant>,
    listeners: Listeners,
}

impl RodioMedia {
    pub fn new(assets_dir: impl Into<PathBuf>) -> Result<Self> {
        let (stream, stream_handle) = OutputStream::try_default()?;

        Ok(Self {
            _stream: stream,
            stream_handle,
            sink: None,
            assets_dir: assets_dir.into(),
            source: None,
            duration: f64::NAN,
            position: Duration::ZERO,
            resumed_at: None,
            listeners: Listeners::default(),
        })
    }

    fn resolve(&self, source_ref: &str) -> PathBuf {
        self.assets_dir.join(source_ref.trim_start_matches('/'))
    }

    fn open(&self, path: &Path) -> Result<(Sink, f64), MediaError> {
        let load_error = |reason: String| MediaError::Load {
            source_ref: path.display().to_string(),
            reason,
        };

        let file = File::open(path).map_err(|e| load_error(e.to_string()))?;
        let decoder = Decoder::new(BufReader::new(file)).map_err(|e| load_error(e.to_string()))?;
        let duration = decoder
            .total_duration()
            .map(|d| d.as_secs_f64())
            .unwrap_or(f64::NAN);

        let sink = Sink::try_new(&self.stream_handle).map_err(|e| load_error(e.to_string()))?;
        // Loading never starts playback
        sink.pause();
        sink.append(decoder);
        Ok((sink, duration))
    }

    fn playhead(&self) -> Duration {
        match self.resumed_at {
            Some(started) => self.position + started.elapsed(),
            None => self.position,
        }
    }
}

impl MediaElement for RodioMedia {
    fn set_source(&mut self, source_ref: &str) {
        self.source = Some(source_ref.to_string());
    }

    fn load(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.position = Duration::ZERO;
        self.resumed_at = None;
        self.duration = f64::NAN;

        let Some(source) = self.source.clone() else {
            return;
        };

        match self.open(&self.resolve(&source)) {
            Ok((sink, duration)) => {
                debug!("Loaded '{}' ({:.1}s)", source, duration);
                self.sink = Some(sink);
                self.duration = duration;
                if !duration.is_nan() {
                    self.listeners.emit(MediaEvent::LoadedMetadata);
                }
            }
            Err(e) => warn!("{}", e),
        }
    }

    fn play(&mut self) -> Result<(), MediaError> {
        let sink = self.sink.as_ref().ok_or(MediaError::NoSource)?;
        sink.play();
        if self.resumed_at.is_none() {
            self.resumed_at = Some(Instant::now());
        }
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(sink) = self.sink.as_ref() {
            sink.pause();
        }
        self.position = self.playhead();
        self.resumed_at = None;
    }

    fn current_time(&self) -> f64 {
        self.playhead().as_secs_f64()
    }

    fn set_current_time(&mut self, seconds: f64) {
        let target = Duration::from_secs_f64(seconds.max(0.0));
        if let Some(sink) = self.sink.as_ref() {
            if let Err(e) = sink.try_seek(target) {
                let error = MediaError::Seek {
                    seconds,
                    reason: e.to_string(),
                };
                warn!("{}", error);
                return;
            }
        }
        self.position = target;
        if self.resumed_at.is_some() {
            self.resumed_at = Some(Instant::now());
        }
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn add_listener(&mut self, listener: MediaListener) -> ListenerId {
        self.listeners.add(listener)
    }

    fn remove_listener(&mut self, id: ListenerId) {
        self.listeners.remove(id);
    }

    fn poll(&mut self, _elapsed: Duration) {
        if self.resumed_at.is_none() {
            return;
        }
        self.listeners.emit(MediaEvent::TimeUpdate);

        let drained = self.sink.as_ref().map(|sink| sink.empty()).unwrap_or(true);
        if drained {
            self.position = self.playhead();
            self.resumed_at = None;
            self.listeners.emit(MediaEvent::Ended);
        }
    }
}
