//! Per-key debounced tasks with cancel-and-replace semantics.
//!
//! Each key owns at most one pending task. Scheduling again for the same key
//! aborts the pending one and restarts the quiet period. Once the quiet
//! period has elapsed the task leaves the register and runs to completion;
//! it can no longer be cancelled.

use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::task::JoinHandle;

struct Slot {
    ticket: u64,
    handle: JoinHandle<()>,
}

pub struct Debouncer<K> {
    pending: Arc<DashMap<K, Slot>>,
    next_ticket: AtomicU64,
    delay: Duration,
}

impl<K> Debouncer<K>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
{
    pub fn new(delay: Duration) -> Self {
        Self {
            pending: Arc::new(DashMap::new()),
            next_ticket: AtomicU64::new(0),
            delay,
        }
    }

    /// Run `task` once `key` has seen no further scheduling for the delay.
    pub fn schedule<F>(&self, key: K, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let ticket = self.next_ticket.fetch_add(1, Ordering::Relaxed);
        let delay = self.delay;
        let pending = Arc::clone(&self.pending);
        let task_key = key.clone();

        // Holding the entry keeps the timer from claiming its slot before
        // the slot exists.
        match self.pending.entry(key) {
            Entry::Occupied(mut entry) => {
                let handle = spawn_timer(pending, task_key, ticket, delay, task);
                let replaced = entry.insert(Slot { ticket, handle });
                replaced.handle.abort();
                tracing::trace!("Replaced pending debounced task");
            }
            Entry::Vacant(entry) => {
                let handle = spawn_timer(pending, task_key, ticket, delay, task);
                entry.insert(Slot { ticket, handle });
            }
        }
    }

    /// Cancel the pending task for `key`. Returns whether one was pending.
    pub fn cancel(&self, key: &K) -> bool {
        match self.pending.remove(key) {
            Some((_, slot)) => {
                slot.handle.abort();
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&self) {
        self.pending.retain(|_, slot| {
            slot.handle.abort();
            false
        });
    }

    #[cfg(test)]
    pub fn is_pending(&self, key: &K) -> bool {
        self.pending.contains_key(key)
    }

    #[cfg(test)]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

fn spawn_timer<K, F>(
    pending: Arc<DashMap<K, Slot>>,
    key: K,
    ticket: u64,
    delay: Duration,
    task: F,
) -> JoinHandle<()>
where
    K: Eq + Hash + Send + Sync + 'static,
    F: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;

        // Leave the register; a newer ticket means we were superseded.
        if pending
            .remove_if(&key, |_, slot| slot.ticket == ticket)
            .is_none()
        {
            return;
        }

        task.await;
    })
}
