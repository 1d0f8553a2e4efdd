use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::{sync::watch, task::JoinHandle, time::Instant};

const TICK: Duration = Duration::from_secs(1);

/// Seconds left of `limit_seconds` measured from `anchor`, clamped to zero.
///
/// A missing anchor, or one in the future, leaves the full limit.
pub fn remaining_seconds(
    limit_seconds: u64,
    anchor: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> u64 {
    let elapsed = anchor
        .map(|a| (now - a).num_seconds().max(0) as u64)
        .unwrap_or(0);
    limit_seconds.saturating_sub(elapsed)
}

/// One-second countdown running on its own task.
///
/// The task stops itself at zero; `stop` (also run on drop) aborts it early.
/// The last published value stays readable after stopping.
#[derive(Debug)]
pub struct CountdownTimer {
    receiver: watch::Receiver<Option<u64>>,
    handle: Option<JoinHandle<()>>,
}

impl CountdownTimer {
    /// Must be called from within a tokio runtime. A zero start spawns nothing.
    pub fn start(seconds: u64) -> Self {
        let (sender, receiver) = watch::channel(Some(seconds));
        if seconds == 0 {
            return Self {
                receiver,
                handle: None,
            };
        }

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + TICK, TICK);
            let mut left = seconds;
            while left > 0 {
                ticker.tick().await;
                left -= 1;
                if sender.send(Some(left)).is_err() {
                    return;
                }
            }
            log::info!("Countdown reached zero");
        });

        Self {
            receiver,
            handle: Some(handle),
        }
    }

    pub fn time_left(&self) -> Option<u64> {
        *self.receiver.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<u64>> {
        self.receiver.clone()
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().map(|h| !h.is_finished()).unwrap_or(false)
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for CountdownTimer {
    fn drop(&mut self) {
        self.stop();
    }
}
