use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub title: String,
    /// Page-style asset path, e.g. `/music/Sining.mp3`
    pub source_ref: String,
    /// Seconds cut from the end before auto-advancing (skips trailing silence)
    #[serde(default)]
    pub trim_tail_seconds: f64,
}

impl Track {
    pub fn new(title: impl Into<String>, source_ref: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            source_ref: source_ref.into(),
            trim_tail_seconds: 0.0,
        }
    }

    pub fn with_trim(mut self, seconds: f64) -> Self {
        self.trim_tail_seconds = seconds;
        self
    }

    pub fn is_trimmed(&self) -> bool {
        self.trim_tail_seconds > 0.0
    }

    /// Where playback should stop for a track of `duration` seconds.
    /// `None` when the track is untrimmed or the trim eats the whole track.
    pub fn stop_time(&self, duration: f64) -> Option<f64> {
        if !self.is_trimmed() {
            return None;
        }
        let stop = duration - self.trim_tail_seconds;
        (stop > 0.0).then_some(stop)
    }
}
