// Cancellable timers on top of tokio.
// A timer is a spawned task that sleeps and then posts a TimerEvent into
// the session channel. Dropping or cancelling the TimerHandle aborts the
// task; the generation carried in the event covers the case where the event
// was already sent before the abort.

use crate::events::{AppEvent, TimerEvent};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep, Instant};

#[derive(Debug, Clone)]
pub struct Scheduler {
    sender: mpsc::UnboundedSender<AppEvent>,
}

impl Scheduler {
    pub fn new(sender: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self { sender }
    }

    pub fn sender(&self) -> mpsc::UnboundedSender<AppEvent> {
        self.sender.clone()
    }

    /// Fire `event` once after `delay`.
    pub fn once(&self, delay: Duration, event: TimerEvent) -> TimerHandle {
        let sender = self.sender.clone();
        let task = tokio::spawn(async move {
            sleep(delay).await;
            let _ = sender.send(AppEvent::Timer(event));
        });
        TimerHandle { task }
    }

    /// Fire `event` every `period`, first one a full period from now.
    pub fn repeating(&self, period: Duration, event: TimerEvent) -> TimerHandle {
        let sender = self.sender.clone();
        let task = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            loop {
                ticker.tick().await;
                if sender.send(AppEvent::Timer(event)).is_err() {
                    // Session is gone, nobody left to tick for
                    break;
                }
            }
        });
        TimerHandle { task }
    }
}

#[derive(Debug)]
pub struct TimerHandle {
    task: JoinHandle<()>,
}

impl TimerHandle {
    pub fn cancel(self) {
        // Drop does the work
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventHandler;

    #[tokio::test(start_paused = true)]
    async fn once_fires_after_delay() {
        let mut events = EventHandler::new();
        let scheduler = Scheduler::new(events.sender());

        let _timer = scheduler.once(
            Duration::from_millis(300),
            TimerEvent::GestureWindow { generation: 1 },
        );

        sleep(Duration::from_millis(299)).await;
        assert!(events.try_next_event().is_none());

        sleep(Duration::from_millis(2)).await;
        assert_eq!(
            events.try_next_event(),
            Some(AppEvent::Timer(TimerEvent::GestureWindow { generation: 1 }))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_timer_never_fires() {
        let mut events = EventHandler::new();
        let scheduler = Scheduler::new(events.sender());

        let timer = scheduler.once(
            Duration::from_millis(500),
            TimerEvent::TrimAdvance { generation: 7 },
        );
        timer.cancel();

        sleep(Duration::from_secs(1)).await;
        assert!(events.try_next_event().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn repeating_ticks_until_dropped() {
        let mut events = EventHandler::new();
        let scheduler = Scheduler::new(events.sender());

        let timer = scheduler.repeating(
            Duration::from_secs(1),
            TimerEvent::ModalTick { generation: 3 },
        );

        sleep(Duration::from_millis(3_500)).await;
        drop(timer);
        sleep(Duration::from_secs(5)).await;

        let mut ticks = 0;
        while let Some(event) = events.try_next_event() {
            assert_eq!(event, AppEvent::Timer(TimerEvent::ModalTick { generation: 3 }));
            ticks += 1;
        }
        assert_eq!(ticks, 3);
    }
}
