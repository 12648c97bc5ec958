//! Single-slot, overwrite-latest hand-off between the producer and the consumer loop.
//!
//! Every payload is a full dataset, so a newer one makes any unconsumed older one
//! redundant. Posting never blocks on the consumer and the backlog is bounded at one.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::dataset::Dataset;

#[derive(Debug)]
pub struct IngestionMailbox<T = Dataset> {
    slot: Mutex<Option<T>>,
}

impl<T> IngestionMailbox<T> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// Store `item`, discarding whatever was pending.
    /// Returns true if an unconsumed item was overwritten.
    pub fn post(&self, item: T) -> bool {
        self.lock().replace(item).is_some()
    }

    /// Take the pending item (if any) and leave the slot empty.
    pub fn take_and_clear(&self) -> Option<T> {
        self.lock().take()
    }

    /// Drop the pending item without consuming it.
    pub fn clear(&self) {
        self.lock().take();
    }

    pub fn has_pending(&self) -> bool {
        self.lock().is_some()
    }

    // A panic while holding the lock cannot leave the Option half-written,
    // so a poisoned slot is still usable.
    fn lock(&self) -> MutexGuard<'_, Option<T>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Default for IngestionMailbox<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_latest_post_wins() {
        let mailbox = IngestionMailbox::new();
        assert!(!mailbox.post(1));
        assert!(mailbox.post(2));

        assert_eq!(mailbox.take_and_clear(), Some(2));
        assert_eq!(mailbox.take_and_clear(), None);
    }

    #[test]
    fn test_clear_discards_pending() {
        let mailbox = IngestionMailbox::new();
        mailbox.post("a");
        assert!(mailbox.has_pending());
        mailbox.clear();
        assert!(!mailbox.has_pending());
        assert_eq!(mailbox.take_and_clear(), None);
    }

    #[test]
    fn test_posts_from_other_threads() {
        let mailbox = Arc::new(IngestionMailbox::new());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let mailbox = Arc::clone(&mailbox);
                std::thread::spawn(move || {
                    for n in 0..100 {
                        mailbox.post(i * 1000 + n);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        // Exactly one value survives, and it is the last one some producer posted
        let value = mailbox.take_and_clear().unwrap();
        assert_eq!(value % 1000, 99);
        assert!(mailbox.take_and_clear().is_none());
    }
}
