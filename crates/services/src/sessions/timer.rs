use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};

use super::navigator::{Navigator, TimerTick};

/// Owned handle to a background task; cancelling is idempotent and dropping
/// the handle cancels the task.
#[derive(Debug, Default)]
pub struct TaskHandle {
    task: Option<JoinHandle<()>>,
}

impl TaskHandle {
    #[must_use]
    pub fn new(task: JoinHandle<()>) -> Self {
        Self { task: Some(task) }
    }

    /// Stop the task. Safe to call any number of times, also after it finished.
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    /// `true` once cancelled or once the task ran to completion.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Tick the navigator's exam countdown once per `period` until it stops
/// being an active exam.
///
/// The task ends by itself on time-out, exhaustion, or exit.
pub fn spawn_exam_countdown(navigator: Arc<Mutex<Navigator>>, period: Duration) -> TaskHandle {
    TaskHandle::new(tokio::spawn(async move {
        let mut ticker = interval(period);
        // Late ticks fire back to back so the countdown tracks elapsed time.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let outcome = navigator
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .tick();
            match outcome {
                TimerTick::Running { remaining_secs } => {
                    log::trace!("exam countdown: {remaining_secs}s left");
                }
                TimerTick::TimedOut => {
                    log::info!("exam time is up");
                    break;
                }
                TimerTick::Inactive => break,
            }
        }
    }))
}
