use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};

/// Single pending timer that fires a flush after `interval`.
///
/// Re-arming cancels the previous timer first, so at most one is pending.
/// After [`stop`](Self::stop) the scheduler never arms again.
pub(crate) struct FlushScheduler {
    interval: Duration,
    runtime: Handle,
    state: Mutex<TimerState>,
}

#[derive(Default)]
struct TimerState {
    pending: Option<JoinHandle<()>>,
    stopped: bool,
}

impl FlushScheduler {
    pub(crate) fn new(interval: Duration, runtime: Handle) -> Self {
        Self {
            interval,
            runtime,
            state: Mutex::new(TimerState::default()),
        }
    }

    /// Cancel the pending timer and schedule `on_fire` `interval` from now.
    ///
    /// `on_fire` must not await anything long-running: it is expected to
    /// spawn the flush, since a later `rearm` aborts this timer task.
    pub(crate) fn rearm<F>(&self, on_fire: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut state = self.lock();
        if let Some(pending) = state.pending.take() {
            pending.abort();
        }
        if state.stopped {
            return;
        }

        let interval = self.interval;
        state.pending = Some(self.runtime.spawn(async move {
            sleep(interval).await;
            on_fire();
        }));
    }

    /// Cancel the pending timer for good.
    pub(crate) fn stop(&self) {
        let mut state = self.lock();
        state.stopped = true;
        if let Some(pending) = state.pending.take() {
            pending.abort();
        }
    }

    #[cfg(test)]
    pub(crate) fn is_armed(&self) -> bool {
        self.lock()
            .pending
            .as_ref()
            .is_some_and(|pending| !pending.is_finished())
    }

    fn lock(&self) -> MutexGuard<'_, TimerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for FlushScheduler {
    fn drop(&mut self) {
        if let Some(pending) = self.lock().pending.take() {
            pending.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counter() -> (Arc<AtomicUsize>, impl Fn() -> Box<dyn FnOnce() + Send>) {
        let fired = Arc::new(AtomicUsize::new(0));
        let handle = Arc::clone(&fired);
        let make = move || {
            let fired = Arc::clone(&handle);
            Box::new(move || {
                fired.fetch_add(1, Ordering::SeqCst);
            }) as Box<dyn FnOnce() + Send>
        };
        (fired, make)
    }

    #[tokio::test(start_paused = true)]
    async fn fires_after_interval() {
        let scheduler = FlushScheduler::new(Duration::from_millis(3_000), Handle::current());
        let (fired, make) = counter();

        scheduler.rearm(make());
        sleep(Duration::from_millis(2_999)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        sleep(Duration::from_millis(2)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn rearm_resets_the_cadence() {
        let scheduler = FlushScheduler::new(Duration::from_millis(3_000), Handle::current());
        let (fired, make) = counter();

        scheduler.rearm(make());
        sleep(Duration::from_millis(2_000)).await;
        scheduler.rearm(make());
        sleep(Duration::from_millis(2_000)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        sleep(Duration::from_millis(1_001)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stopped_scheduler_never_rearms() {
        let scheduler = FlushScheduler::new(Duration::from_millis(10), Handle::current());
        let (fired, make) = counter();

        scheduler.rearm(make());
        scheduler.stop();
        scheduler.rearm(make());
        assert!(!scheduler.is_armed());

        sleep(Duration::from_millis(100)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
