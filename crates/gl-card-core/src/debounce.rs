//! Trailing-edge debouncer.
//!
//! Owns the pending value and its timer: a new update replaces the pending
//! value and reschedules the fire, so rapid edits inside one window deliver
//! only the final value to the sink. Each scheduled fire checks that its
//! generation is still current before delivering.

use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(300);

struct Pending<T> {
    value: Option<T>,
    generation: u64,
}

pub struct Debouncer<T> {
    window: Duration,
    pending: Arc<Mutex<Pending<T>>>,
    sink: Arc<dyn Fn(T) + Send + Sync>,
}

impl<T> Debouncer<T>
where
    T: Clone + Send + 'static,
{
    pub fn new(window: Duration, sink: impl Fn(T) + Send + Sync + 'static) -> Self {
        Self {
            window,
            pending: Arc::new(Mutex::new(Pending {
                value: None,
                generation: 0,
            })),
            sink: Arc::new(sink),
        }
    }

    /// Replace the pending value and restart the trailing window.
    pub fn update(&self, value: T) {
        let generation = {
            let mut pending = self.pending.lock().expect("debouncer state poisoned");
            pending.value = Some(value);
            pending.generation += 1;
            pending.generation
        };

        let pending = Arc::clone(&self.pending);
        let sink = Arc::clone(&self.sink);
        let window = self.window;

        tokio::spawn(async move {
            tokio::time::sleep(window).await;
            let fired = {
                let mut pending = pending.lock().expect("debouncer state poisoned");
                if pending.generation == generation {
                    pending.value.take()
                } else {
                    // A newer update rescheduled the fire; this timer is stale.
                    None
                }
            };
            if let Some(value) = fired {
                sink(value);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test(start_paused = true)]
    async fn rapid_updates_collapse_to_the_final_value() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let debouncer = Debouncer::new(DEBOUNCE_WINDOW, move |value: String| {
            tx.send(value).unwrap();
        });

        debouncer.update("H".to_owned());
        debouncer.update("Ha".to_owned());
        debouncer.update("Happy".to_owned());

        assert_eq!(rx.recv().await.as_deref(), Some("Happy"));

        // The superseded timers must stay silent.
        tokio::time::sleep(DEBOUNCE_WINDOW * 3).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn edits_in_separate_windows_each_fire() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let debouncer = Debouncer::new(DEBOUNCE_WINDOW, move |value: u32| {
            tx.send(value).unwrap();
        });

        debouncer.update(1);
        assert_eq!(rx.recv().await, Some(1));

        debouncer.update(2);
        assert_eq!(rx.recv().await, Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn an_update_inside_the_window_postpones_the_fire() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let debouncer = Debouncer::new(DEBOUNCE_WINDOW, move |value: u32| {
            tx.send(value).unwrap();
        });

        debouncer.update(1);
        tokio::time::sleep(Duration::from_millis(200)).await;
        debouncer.update(2);

        // 200 ms in, nothing has fired yet.
        assert!(rx.try_recv().is_err());
        assert_eq!(rx.recv().await, Some(2));
        assert!(rx.try_recv().is_err());
    }
}
