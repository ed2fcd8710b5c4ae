//! Auto-rotate timer: the only background task in the studio.
//!
//! A tokio interval task sends unit ticks on a bounded channel. The engine
//! owns the receiver and advances the mockup yaw once per tick. Ticks never
//! queue up: if the previous one has not been consumed the new one is dropped.
//! `stop` aborts the task immediately, and dropping the timer stops it too.

#[cfg(test)]
#[path = "timer_test.rs"]
mod timer_test;

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub struct AutoRotateTimer {
    period: Duration,
    tx: mpsc::Sender<()>,
    task: Option<JoinHandle<()>>,
}

impl AutoRotateTimer {
    /// Create a stopped timer and the receiver its ticks arrive on.
    #[must_use]
    pub fn new(period: Duration) -> (Self, mpsc::Receiver<()>) {
        let (tx, rx) = mpsc::channel(1);
        (Self { period, tx, task: None }, rx)
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Start ticking. No-op if already running or outside a tokio runtime.
    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("auto-rotate needs a tokio runtime; timer not started");
            return;
        };

        let tx = self.tx.clone();
        let period = self.period;
        self.task = Some(handle.spawn(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                match tx.try_send(()) {
                    Ok(()) | Err(TrySendError::Full(())) => {}
                    Err(TrySendError::Closed(())) => break,
                }
            }
        }));
        tracing::debug!(period_ms = self.period.as_millis(), "auto-rotate started");
    }

    /// Stop ticking immediately.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::debug!("auto-rotate stopped");
        }
    }

    /// Run the timer exactly when `active` is true.
    pub fn sync(&mut self, active: bool) {
        if active {
            self.start();
        } else {
            self.stop();
        }
    }
}

impl Drop for AutoRotateTimer {
    fn drop(&mut self) {
        self.stop();
    }
}
