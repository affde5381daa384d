use std::time::Duration;

use quiz_core::Clock;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::debug;

use super::active::ActiveQuiz;

const TICK: Duration = Duration::from_secs(1);

/// Samples exam elapsed time once per second for display.
///
/// Has no effect on the session. The task ends once the quiz is finished or
/// every receiver is gone, and is aborted when the timer is dropped.
pub struct ExamTimer {
    elapsed: watch::Receiver<u64>,
    handle: JoinHandle<()>,
}

impl ExamTimer {
    /// Start sampling `quiz` against `clock`. Must be called inside a tokio runtime.
    #[must_use]
    pub fn spawn(quiz: ActiveQuiz, clock: Clock) -> Self {
        let (initial, _) = quiz.elapsed_secs(&clock);
        let (tx, rx) = watch::channel(initial);

        let handle = tokio::spawn(async move {
            let mut ticker = interval(TICK);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let (secs, finished) = quiz.elapsed_secs(&clock);
                if tx.send(secs).is_err() {
                    break;
                }
                if finished {
                    debug!(elapsed = secs, "exam timer stopped");
                    break;
                }
            }
        });

        Self {
            elapsed: rx,
            handle,
        }
    }

    /// Latest sampled value in whole seconds.
    #[must_use]
    pub fn elapsed(&self) -> u64 {
        *self.elapsed.borrow()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.elapsed.clone()
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait until the sampling task ends.
    pub async fn stopped(mut self) {
        // Aborted or panicked counts as stopped.
        let _ = (&mut self.handle).await;
    }
}

impl Drop for ExamTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
