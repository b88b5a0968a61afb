use std::future::Future;
use std::time::Duration;

use compare_core::PollGeneration;
use compare_logging::compare_debug;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

struct ActiveLoop {
    generation: PollGeneration,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// Fixed-period status loop. Owns at most one timer at a time.
pub struct Poller {
    interval: Duration,
    active: Option<ActiveLoop>,
}

impl Poller {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            active: None,
        }
    }

    /// Starts a loop calling `tick` once per period, first call one period
    /// from now. A loop that is already running is cancelled first.
    ///
    /// Ticks never overlap: the next period is measured after the previous
    /// tick resolves when it ran long. A tick in flight when the loop is
    /// cancelled still runs to completion.
    pub fn start<F, Fut>(&mut self, runtime: &Handle, generation: PollGeneration, mut tick: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if self.stop() {
            compare_debug!("Clearing existing poll loop before generation {}", generation);
        }

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let period = self.interval;
        let task = runtime.spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                tick().await;
            }
            compare_debug!("Poll loop generation {} ended", generation);
        });

        self.active = Some(ActiveLoop {
            generation,
            cancel,
            task,
        });
    }

    /// Returns whether a loop was running.
    pub fn stop(&mut self) -> bool {
        match self.active.take() {
            Some(active) => {
                active.cancel.cancel();
                true
            }
            None => false,
        }
    }

    pub fn is_polling(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| !active.task.is_finished())
    }

    pub fn generation(&self) -> Option<PollGeneration> {
        self.active.as_ref().map(|active| active.generation)
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
    }
}
