pub mod player;
pub mod playlist;
pub mod track;

pub use player::{NowPlaying, PlaybackController, PlaybackState, PlayerPhase};
pub use playlist::Playlist;
pub use track::Track;
