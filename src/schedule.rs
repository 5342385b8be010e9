//! Cancellable background timers.
use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// A spawned timer that is aborted when the handle is dropped.
#[derive(Debug)]
pub struct ScheduledTask {
    name: &'static str,
    handle: JoinHandle<()>,
}

impl ScheduledTask {
    /// Run `tick` every `period`. The first run happens one full period after
    /// spawning; ticks missed while a run is still in flight are skipped.
    pub fn periodic<F, Fut>(name: &'static str, period: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let start = Instant::now().checked_add(period).unwrap_or_else(Instant::now);
            let mut interval = tokio::time::interval_at(start, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                tick().await;
            }
        });
        tracing::debug!("Scheduled '{}' every {:?}", name, period);
        Self { name, handle }
    }

    /// Run `job` once after `delay`.
    pub fn delayed<Fut>(name: &'static str, delay: Duration, job: Fut) -> Self
    where
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            job.await;
        });
        tracing::debug!("Scheduled '{}' in {:?}", name, delay);
        Self { name, handle }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        if !self.handle.is_finished() {
            tracing::debug!("Cancelling '{}'", self.name);
        }
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, AppResult};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter_task(period: Duration, counter: &Arc<AtomicUsize>) -> ScheduledTask {
        let counter = Arc::clone(counter);
        ScheduledTask::periodic("counter", period, move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        })
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn periodic_waits_a_full_period_before_first_tick() -> AppResult<()> {
        let counter = Arc::new(AtomicUsize::new(0));
        let _task = counter_task(Duration::from_secs(10), &counter);

        tokio::time::sleep(Duration::from_secs(9)).await;
        if counter.load(Ordering::SeqCst) != 0 {
            return Err(AppError::validation("ticked before the first period elapsed"));
        }
        tokio::time::sleep(Duration::from_secs(22)).await;
        let ticks = counter.load(Ordering::SeqCst);
        if ticks != 3 {
            return Err(AppError::validation(format!("expected 3 ticks, got {}", ticks)));
        }
        Ok(())
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn dropping_the_handle_stops_the_timer() -> AppResult<()> {
        let counter = Arc::new(AtomicUsize::new(0));
        let task = counter_task(Duration::from_secs(10), &counter);
        tokio::time::sleep(Duration::from_secs(11)).await;
        task.cancel();

        tokio::time::sleep(Duration::from_secs(60)).await;
        let ticks = counter.load(Ordering::SeqCst);
        if ticks != 1 {
            return Err(AppError::validation(format!("expected 1 tick, got {}", ticks)));
        }
        Ok(())
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn delayed_runs_once_after_delay() -> AppResult<()> {
        let counter = Arc::new(AtomicUsize::new(0));
        let job_counter = Arc::clone(&counter);
        let task = ScheduledTask::delayed("once", Duration::from_secs(40), async move {
            job_counter.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_secs(39)).await;
        if counter.load(Ordering::SeqCst) != 0 || task.is_finished() {
            return Err(AppError::validation("job ran early"));
        }
        tokio::time::sleep(Duration::from_secs(2)).await;
        if counter.load(Ordering::SeqCst) != 1 || !task.is_finished() {
            return Err(AppError::validation("job did not run at its deadline"));
        }
        Ok(())
    }
}
