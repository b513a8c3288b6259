// Configuration management for Serenata
// The playlist, video clips and timing constants are plain data here instead of
// hard-coded arrays, with sensible defaults when the config file is missing

use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::audio::{Playlist, Track};
use crate::error::ConfigError;
use crate::video::{ClipEndBehavior, VideoClip};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Root that page-style source refs (`/music/x.mp3`) resolve against
    pub assets_dir: PathBuf,
    pub tracks: Vec<Track>,
    /// Per-title trims, applied over the tracks' own `trim_tail_seconds`
    #[serde(default)]
    pub trims: BTreeMap<String, f64>,
    pub videos: Vec<VideoClip>,
    #[serde(default)]
    pub gestures: GestureConfig,
    #[serde(default)]
    pub playback: PlaybackConfig,
    #[serde(default)]
    pub video: VideoConfig,
    #[serde(default)]
    pub onboarding: OnboardingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GestureConfig {
    pub debounce_ms: u64,
    pub haptic_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    pub trim_advance_delay_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VideoConfig {
    pub on_end: ClipEndBehavior,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnboardingConfig {
    pub countdown_seconds: u32,
    pub small_screen_max_width: u32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            haptic_ms: 50,
        }
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            trim_advance_delay_ms: 500,
        }
    }
}

impl Default for OnboardingConfig {
    fn default() -> Self {
        Self {
            countdown_seconds: 15,
            small_screen_max_width: 768,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let mut trims = BTreeMap::new();
        trims.insert("Museo".to_string(), 3.0);

        Self {
            assets_dir: PathBuf::from("public"),
            tracks: vec![
                Track::new("Co-Pilot", "/music/CoPilot.mp3"),
                Track::new("Mahika", "/music/Mahika.mp3"),
                Track::new("Paraluman", "/music/Paraluman.mp3"),
                Track::new("Sining", "/music/Sining.mp3"),
                Track::new("Museo", "/music/Museo.mp3"),
            ],
            trims,
            videos: vec![VideoClip::new("jll", "/videos/jll.mp4")],
            gestures: GestureConfig::default(),
            playback: PlaybackConfig::default(),
            video: VideoConfig::default(),
            onboarding: OnboardingConfig::default(),
        }
    }
}

impl Config {
    /// Load from the default location, writing defaults there on first run
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Config::default();
            config.save_to(&config_path)?;
            info!("Wrote default config to {}", config_path.display());
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        config.validate()?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.playlist()?;
        if self.videos.is_empty() {
            return Err(ConfigError::EmptyVideoPool);
        }
        if self.gestures.debounce_ms == 0 {
            return Err(ConfigError::InvalidTiming {
                name: "gestures.debounce_ms",
            });
        }
        if self.onboarding.countdown_seconds == 0 {
            return Err(ConfigError::InvalidTiming {
                name: "onboarding.countdown_seconds",
            });
        }
        Ok(())
    }

    pub fn playlist(&self) -> Result<Playlist, ConfigError> {
        Playlist::with_trims(self.tracks.clone(), &self.trims)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.gestures.debounce_ms)
    }

    pub fn trim_advance_delay(&self) -> Duration {
        Duration::from_millis(self.playback.trim_advance_delay_ms)
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?
            .join("serenata");

        Ok(config_dir.join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_survive_a_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::default();
        config.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn default_playlist_trims_museo() {
        let playlist = Config::default().playlist().unwrap();
        let museo = playlist
            .tracks()
            .iter()
            .position(|t| t.title == "Museo")
            .unwrap();
        assert_eq!(playlist.trim_tail(museo), 3.0);
        assert_eq!(playlist.trim_tail(0), 0.0);
    }

    #[test]
    fn sections_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
assets_dir = "site"

[[tracks]]
title = "Sining"
source_ref = "/music/Sining.mp3"
trim_tail_seconds = 2.5

[[videos]]
title = "jll"
source_ref = "/videos/jll.mp4"

[trims]
Sinig = 4.0

[video]
on_end = "loop"
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.gestures, GestureConfig::default());
        assert_eq!(config.onboarding.small_screen_max_width, 768);
        assert_eq!(config.video.on_end, ClipEndBehavior::Loop);
        // Misspelled trim key leaves the track's own trim alone
        assert_eq!(config.playlist().unwrap().trim_tail(0), 2.5);
    }

    #[test]
    fn invalid_configs_are_rejected() {
        let mut config = Config::default();
        config.tracks.clear();
        assert_eq!(config.validate(), Err(ConfigError::EmptyPlaylist));

        let mut config = Config::default();
        config.videos.clear();
        assert_eq!(config.validate(), Err(ConfigError::EmptyVideoPool));

        let mut config = Config::default();
        config.gestures.debounce_ms = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidTiming { .. })
        ));
    }
}
