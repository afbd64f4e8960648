use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use tokio::runtime::Handle;

/// One delay timer shared by every throttled handler; calls made while it is
/// armed are dropped, not queued.
#[derive(Debug, Clone)]
pub struct ThrottleSlot {
    armed: Arc<AtomicBool>,
    runtime: Handle,
}

impl ThrottleSlot {
    pub fn new(runtime: Handle) -> Self {
        Self {
            armed: Arc::new(AtomicBool::new(false)),
            runtime,
        }
    }

    /// Returns `false` when the call was dropped.
    pub fn schedule<F>(&self, delay: Duration, task: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        if self.armed.swap(true, Ordering::AcqRel) {
            return false;
        }

        let disarm = Disarm(Arc::clone(&self.armed));
        self.runtime.spawn(async move {
            let _disarm = disarm;
            tokio::time::sleep(delay).await;
            task();
        });
        true
    }

    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::Acquire)
    }
}

/// Frees the slot even when the task panics or is cancelled.
struct Disarm(Arc<AtomicBool>);

impl Drop for Disarm {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[tokio::test(start_paused = true)]
    async fn drops_calls_while_armed() {
        let slot = ThrottleSlot::new(Handle::current());
        let runs = Arc::new(AtomicUsize::new(0));

        for _ in 0..5 {
            let runs = Arc::clone(&runs);
            slot.schedule(Duration::from_millis(100), move || {
                runs.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert!(slot.is_armed());

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(!slot.is_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn slot_is_shared_between_delays() {
        let slot = ThrottleSlot::new(Handle::current());

        assert!(slot.schedule(Duration::from_millis(500), || {}));
        assert!(!slot.schedule(Duration::from_millis(100), || {}));

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!slot.schedule(Duration::from_millis(100), || {}));

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(slot.schedule(Duration::from_millis(100), || {}));
    }

    #[tokio::test(start_paused = true)]
    async fn panicking_task_still_frees_slot() {
        let slot = ThrottleSlot::new(Handle::current());

        assert!(slot.schedule(Duration::from_millis(100), || panic!("page went away")));
        tokio::time::sleep(Duration::from_millis(150)).await;

        assert!(!slot.is_armed());
        assert!(slot.schedule(Duration::from_millis(100), || {}));
    }
}
