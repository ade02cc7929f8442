use crate::record::Event;
use prometheus::IntGauge;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Ordered buffer of events waiting for the next flush.
///
/// The lock is held only for the push or the swap, never across I/O, so an
/// `append` racing a `drain_all` lands either in the drained batch or in the
/// next one. The optional length gauge is written under the same lock, so
/// it always ends up at the length left by the last operation.
#[derive(Default)]
pub struct BatchQueue {
    events: Mutex<Vec<Event>>,
    length_gauge: Option<IntGauge>,
}

impl BatchQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue that mirrors its length into `gauge`.
    pub fn with_length_gauge(gauge: IntGauge) -> Self {
        Self {
            events: Mutex::default(),
            length_gauge: Some(gauge),
        }
    }

    /// Push to the tail and return the new length.
    pub fn append(&self, event: Event) -> usize {
        let mut events = self.lock();
        events.push(event);
        self.publish_len(events.len());
        events.len()
    }

    /// Take every queued event, leaving the queue empty.
    pub fn drain_all(&self) -> Vec<Event> {
        let mut events = self.lock();
        self.publish_len(0);
        std::mem::take(&mut *events)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Event>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish_len(&self, len: usize) {
        if let Some(gauge) = &self.length_gauge {
            gauge.set(len as i64);
        }
    }
}

impl std::fmt::Debug for BatchQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchQueue").field("len", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Attributes;
    use std::sync::Arc;

    fn event(ts: u64) -> Event {
        Event {
            ts,
            sev: Some(3),
            attrs: Attributes::new(),
            thread: None,
        }
    }

    #[test]
    fn drain_takes_everything_in_order() {
        let queue = BatchQueue::new();
        assert_eq!(queue.append(event(1)), 1);
        assert_eq!(queue.append(event(2)), 2);
        assert_eq!(queue.append(event(3)), 3);

        let batch = queue.drain_all();
        assert_eq!(batch.iter().map(|e| e.ts).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert!(queue.is_empty());
        assert!(queue.drain_all().is_empty());
    }

    #[test]
    fn concurrent_appends_and_drains_lose_nothing() {
        let queue = Arc::new(BatchQueue::new());
        let producers: Vec<_> = (0..4u64)
            .map(|p| {
                let queue = Arc::clone(&queue);
                std::thread::spawn(move || {
                    for i in 0..1_000u64 {
                        queue.append(event(p * 1_000_000 + i));
                    }
                })
            })
            .collect();

        let mut drained = Vec::new();
        while producers.iter().any(|h| !h.is_finished()) {
            drained.extend(queue.drain_all());
        }
        for handle in producers {
            handle.join().unwrap();
        }
        drained.extend(queue.drain_all());

        assert_eq!(drained.len(), 4_000);
        for p in 0..4u64 {
            let own: Vec<u64> = drained
                .iter()
                .map(|e| e.ts)
                .filter(|ts| ts / 1_000_000 == p)
                .collect();
            assert_eq!(own, (0..1_000u64).map(|i| p * 1_000_000 + i).collect::<Vec<_>>());
        }
    }

    #[test]
    fn length_gauge_settles_on_final_length() {
        let gauge = IntGauge::new("queue_len", "queued events").unwrap();
        let queue = Arc::new(BatchQueue::with_length_gauge(gauge.clone()));

        let producers: Vec<_> = (0..4u64)
            .map(|p| {
                let queue = Arc::clone(&queue);
                std::thread::spawn(move || {
                    for i in 0..500u64 {
                        queue.append(event(p * 1_000 + i));
                    }
                })
            })
            .collect();
        let drainer = {
            let queue = Arc::clone(&queue);
            std::thread::spawn(move || {
                for _ in 0..200 {
                    queue.drain_all();
                    std::thread::yield_now();
                }
            })
        };
        for handle in producers {
            handle.join().unwrap();
        }
        drainer.join().unwrap();

        assert_eq!(gauge.get(), queue.len() as i64);

        queue.append(event(1));
        assert_eq!(gauge.get(), queue.len() as i64);
        queue.drain_all();
        assert_eq!(gauge.get(), 0);
    }
}
