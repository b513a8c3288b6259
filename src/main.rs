// Serenata - terminal host for the gesture-driven music page
// Mounts the page engine on rodio audio (or a simulated element) and lets
// mouse and keys stand in for taps, holds and hovers

use anyhow::Result;
use clap::Parser;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serenata::{
    config::Config,
    device::{NoHaptics, Viewport},
    events::EventHandler,
    logging::init_logging,
    media::{MediaElement, SimulatedMedia},
    session::Session,
    timer::Scheduler,
    ui::{self, TerminalManager},
};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

// Stand-in lengths when nothing real is decoding
const SIMULATED_TRACK_SECONDS: f64 = 180.0;
const SIMULATED_CLIP_SECONDS: f64 = 45.0;
const HEARTBEAT: Duration = Duration::from_millis(250);

#[derive(Parser)]
#[command(name = "serenata")]
#[command(about = "Click, hold and hover to steer a playlist over looping video")]
struct Args {
    /// Config file (defaults to the user config dir, created on first run)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable developer logging (stderr + debug output)
    #[arg(long)]
    dev: bool,

    /// Page width in pixels; 768 or less behaves like a phone
    #[arg(long, default_value_t = 1280)]
    width: u32,

    #[arg(long, default_value_t = 800)]
    height: u32,

    /// Seed for the initial clip and offset
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = init_logging(&args.log_dir, args.dev)?;

    info!("Serenata starting up");

    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let rng: Box<dyn RngCore> = match args.seed {
        Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
        None => Box::new(StdRng::from_entropy()),
    };

    let mut events = EventHandler::new();
    let scheduler = Scheduler::new(events.sender());
    let viewport = Viewport::new(args.width, args.height);

    let mut session = Session::new(&config, viewport, scheduler, rng, Box::new(NoHaptics))?;
    session.attach_media(
        audio_element(&config),
        Box::new(SimulatedMedia::with_default_duration(SIMULATED_CLIP_SECONDS)),
    );

    let mut terminal = TerminalManager::new()?;
    ui::spawn_input_reader(events.sender());
    ui::spawn_heartbeat(events.sender(), HEARTBEAT);

    session
        .run(&mut events, |session| {
            let view = session.view();
            terminal.draw(|f| ui::render(f, &view))
        })
        .await?;

    info!("Serenata stopped");
    Ok(())
}

#[cfg_attr(not(feature = "audio"), allow(unused_variables))]
fn audio_element(config: &Config) -> Box<dyn MediaElement> {
    #[cfg(feature = "audio")]
    match serenata::media::RodioMedia::new(config.assets_dir.clone()) {
        Ok(media) => return Box::new(media),
        Err(e) => tracing::warn!("No audio output ({}), using simulated playback", e),
    }

    Box::new(SimulatedMedia::with_default_duration(SIMULATED_TRACK_SECONDS))
}
