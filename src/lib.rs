// Serenata Library - the playback gesture state machine behind a personal
// music page: taps pick tracks, holds reveal the video, a modal onboards phones

pub mod audio; // playlist, tracks, playback controller
pub mod config; // settings and static asset lists
pub mod device; // viewport + haptics collaborators
pub mod error;
pub mod events; // the one channel everything flows through
pub mod gesture; // click debounce, holds, hover
pub mod logging;
pub mod media; // media element contract + backends
pub mod onboarding; // small-screen modal with countdown
pub mod session; // owns it all, routes events
pub mod timer;
pub mod video; // background clip rotation

#[cfg(feature = "tui")]
pub mod ui; // terminal host

// Export the stuff hosts actually use
pub use audio::{PlaybackController, Playlist, Track};
pub use config::Config;
pub use device::{Haptics, Layout, NoHaptics, Viewport};
pub use events::{AppEvent, EventHandler, InputEvent};
pub use media::{MediaElement, MediaEvent, SimulatedMedia};
pub use session::{Session, SessionView};
pub use timer::Scheduler;
pub use video::{VideoClip, VideoPool};
