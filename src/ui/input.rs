use crate::events::{AppEvent, InputEvent};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEventKind};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

// Rough pixel size of a terminal cell, so pointer math works in page units
const CELL_WIDTH_PX: i32 = 8;
const CELL_HEIGHT_PX: i32 = 16;

/// Terminals report key presses, not releases, so holds and photo hover are
/// toggles here.
#[derive(Default)]
struct InputTranslator {
    holding: bool,
    over_photo: bool,
}

impl InputTranslator {
    fn translate(&mut self, event: Event) -> Option<AppEvent> {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.key(key),
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::Down(MouseButton::Left) => Some(AppEvent::Input(InputEvent::Click)),
                MouseEventKind::Moved => Some(AppEvent::Input(InputEvent::PointerMove {
                    x: mouse.column as i32 * CELL_WIDTH_PX,
                    y: mouse.row as i32 * CELL_HEIGHT_PX,
                })),
                _ => None,
            },
            _ => None,
        }
    }

    fn key(&mut self, key: KeyEvent) -> Option<AppEvent> {
        let input = match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Some(AppEvent::Quit),

            KeyCode::Char(' ') => InputEvent::Click,
            KeyCode::Char('h') => {
                self.holding = !self.holding;
                if self.holding {
                    InputEvent::TouchHoldStart
                } else {
                    InputEvent::TouchHoldEnd
                }
            }
            KeyCode::Char('p') => {
                self.over_photo = !self.over_photo;
                if self.over_photo {
                    InputEvent::PhotoHoverEnter
                } else {
                    InputEvent::PhotoHoverLeave
                }
            }
            KeyCode::Char('e') => InputEvent::TextHoverEnter,
            KeyCode::Char('l') => InputEvent::TextHoverLeave,
            KeyCode::Char('i') => InputEvent::OpenInfo,
            KeyCode::Char('x') => InputEvent::DismissModal,

            _ => return None,
        };
        Some(AppEvent::Input(input))
    }
}

/// Read terminal events on a plain thread and forward them. The thread exits
/// on quit or once the session drops its receiver.
pub fn spawn_input_reader(sender: mpsc::UnboundedSender<AppEvent>) {
    std::thread::spawn(move || {
        let mut translator = InputTranslator::default();
        while !sender.is_closed() {
            match event::poll(Duration::from_millis(50)) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => {
                    warn!("Terminal poll failed: {}", e);
                    break;
                }
            }
            let event = match event::read() {
                Ok(event) => event,
                Err(e) => {
                    warn!("Terminal read failed: {}", e);
                    break;
                }
            };
            if let Some(app_event) = translator.translate(event) {
                let quit = app_event == AppEvent::Quit;
                if sender.send(app_event).is_err() || quit {
                    break;
                }
            }
        }
        debug!("Input reader stopped");
    });
}

/// Periodic tick so polled media backends can report progress
pub fn spawn_heartbeat(sender: mpsc::UnboundedSender<AppEvent>, period: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            if sender.send(AppEvent::Tick(period)).is_err() {
                break;
            }
        }
    });
}
