//! Notice types delivered to UI subscribers.

use crate::autosave::AutoSaveRecord;

/// Configuration for a notice subscription.
#[derive(Clone, Debug)]
pub struct NoticeConfig {
    /// Max buffered notices before the subscriber is dropped.
    /// Default: 64
    pub buffer_size: usize,

    /// Filter criteria.
    pub filter: NoticeFilter,
}

impl Default for NoticeConfig {
    fn default() -> Self {
        Self {
            buffer_size: 64,
            filter: NoticeFilter::default(),
        }
    }
}

/// Which notices a subscriber wants.
#[derive(Clone, Debug)]
pub struct NoticeFilter {
    /// Autosave success and failure notices.
    pub include_autosave: bool,

    /// History notices.
    pub include_history: bool,
}

impl Default for NoticeFilter {
    fn default() -> Self {
        Self {
            include_autosave: true,
            include_history: true,
        }
    }
}

impl NoticeFilter {
    /// Only autosave notices.
    pub fn autosave() -> Self {
        Self {
            include_autosave: true,
            include_history: false,
        }
    }

    /// Only history notices.
    pub fn history() -> Self {
        Self {
            include_autosave: false,
            include_history: true,
        }
    }

    pub(crate) fn accepts(&self, notice: &Notice) -> bool {
        match notice {
            Notice::AutoSaved { .. } | Notice::AutoSaveFailed { .. } => self.include_autosave,
            Notice::HistoryCleared { .. } => self.include_history,
            Notice::Dropped { .. } => true,
        }
    }
}

/// Why the history was cleared.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClearReason {
    DocumentReplaced,
    ModeChanged,
    EditorClosed,
}

/// Why a subscriber was dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropReason {
    /// Subscriber's buffer filled up.
    BufferOverflow,
    /// Subscriber unsubscribed.
    Unsubscribed,
}

/// Notice sent to subscribers.
#[derive(Clone, Debug, PartialEq)]
pub enum Notice {
    /// An autosave finished and was recorded in the catalog.
    AutoSaved {
        record: AutoSaveRecord,
        /// Older autosaves removed to stay within the retention limit.
        evicted: usize,
    },

    /// An autosave could not be written.
    AutoSaveFailed { reason: String },

    /// Every history entry was discarded.
    HistoryCleared { reason: ClearReason },

    /// Subscription was dropped.
    Dropped { reason: DropReason },
}

/// Unique identifier for a notice subscriber.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriberId(pub u64);

/// Receiving side of a notice subscription.
pub struct NoticeHandle {
    pub id: SubscriberId,
    /// Channel to receive notices.
    pub receiver: crossbeam_channel::Receiver<Notice>,
}

impl NoticeHandle {
    /// Receive the next notice (blocking).
    pub fn recv(&self) -> Result<Notice, crossbeam_channel::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive a notice (non-blocking).
    pub fn try_recv(&self) -> Result<Notice, crossbeam_channel::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Receive with timeout.
    pub fn recv_timeout(
        &self,
        timeout: std::time::Duration,
    ) -> Result<Notice, crossbeam_channel::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Everything currently buffered, without blocking.
    pub fn drain(&self) -> Vec<Notice> {
        self.receiver.try_iter().collect()
    }
}
