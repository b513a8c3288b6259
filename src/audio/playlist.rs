use std::collections::BTreeMap;
use tracing::{info, warn};

use super::track::Track;
use crate::error::ConfigError;

/// The fixed, ordered playlist. Order defines next/previous, both of which
/// wrap around. Never empty, so index arithmetic can't go out of bounds.
#[derive(Debug, Clone)]
pub struct Playlist {
    tracks: Vec<Track>,
}

impl Playlist {
    pub fn new(tracks: Vec<Track>) -> Result<Self, ConfigError> {
        if tracks.is_empty() {
            return Err(ConfigError::EmptyPlaylist);
        }
        for track in &tracks {
            validate_trim(&track.title, track.trim_tail_seconds)?;
        }
        info!("Playlist ready with {} tracks", tracks.len());
        Ok(Self { tracks })
    }

    /// Build a playlist and apply per-title trims on top of whatever the
    /// tracks already carry. Keys that match no title are logged and skipped,
    /// leaving that track untrimmed.
    pub fn with_trims(
        mut tracks: Vec<Track>,
        trims: &BTreeMap<String, f64>,
    ) -> Result<Self, ConfigError> {
        for (title, &seconds) in trims {
            validate_trim(title, seconds)?;
            match tracks.iter_mut().find(|t| &t.title == title) {
                Some(track) => track.trim_tail_seconds = seconds,
                None => warn!("Trim for '{}' matches no track, ignoring", title),
            }
        }
        Self::new(tracks)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Index is wrapped, any value is accepted
    pub fn get(&self, index: usize) -> &Track {
        &self.tracks[index % self.tracks.len()]
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.tracks.len()
    }

    pub fn previous_index(&self, index: usize) -> usize {
        let len = self.tracks.len();
        (index % len + len - 1) % len
    }

    pub fn trim_tail(&self, index: usize) -> f64 {
        self.get(index).trim_tail_seconds
    }
}

fn validate_trim(title: &str, seconds: f64) -> Result<(), ConfigError> {
    if seconds.is_finite() && seconds >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidTrim {
            title: title.to_string(),
            seconds,
        })
    }
}
