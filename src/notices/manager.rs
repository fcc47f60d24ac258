//! Broadcasting notices to UI subscribers.

use crossbeam_channel::{bounded, Sender, TrySendError};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use super::types::{DropReason, Notice, NoticeConfig, NoticeHandle, SubscriberId};

/// Internal subscriber state.
struct Subscriber {
    config: NoticeConfig,
    sender: Sender<Notice>,
}

impl Subscriber {
    /// Try to send a notice. Returns false if the subscriber should be dropped.
    fn try_send(&self, notice: Notice) -> bool {
        match self.sender.try_send(notice) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => false,
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

/// Fan-out of session notices to any number of subscribers.
pub struct NoticeBroadcaster {
    subscribers: RwLock<HashMap<SubscriberId, Subscriber>>,
    next_id: AtomicU64,
}

impl NoticeBroadcaster {
    pub fn new() -> Self {
        Self {
            subscribers: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a subscriber.
    pub fn subscribe(&self, config: NoticeConfig) -> NoticeHandle {
        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let (sender, receiver) = bounded(config.buffer_size.max(1));

        self.subscribers
            .write()
            .insert(id, Subscriber { config, sender });

        NoticeHandle { id, receiver }
    }

    /// Remove a subscriber.
    pub fn unsubscribe(&self, id: SubscriberId) {
        if let Some(sub) = self.subscribers.write().remove(&id) {
            // Best effort
            let _ = sub.sender.try_send(Notice::Dropped {
                reason: DropReason::Unsubscribed,
            });
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }

    /// Send a notice to every subscriber whose filter accepts it. Drops
    /// subscribers whose buffers are full or whose handles are gone.
    pub fn broadcast(&self, notice: Notice) {
        let mut to_remove = Vec::new();

        {
            let subs = self.subscribers.read();
            for (id, sub) in subs.iter() {
                if sub.config.filter.accepts(&notice) && !sub.try_send(notice.clone()) {
                    to_remove.push(*id);
                }
            }
        }

        if !to_remove.is_empty() {
            let mut subs = self.subscribers.write();
            for id in to_remove {
                if let Some(sub) = subs.remove(&id) {
                    tracing::debug!(subscriber = id.0, "dropping notice subscriber");
                    let _ = sub.sender.try_send(Notice::Dropped {
                        reason: DropReason::BufferOverflow,
                    });
                }
            }
        }
    }
}

impl Default for NoticeBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}
