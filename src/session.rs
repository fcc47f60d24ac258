//! Editor session tying the history and autosave components together.

use crate::autosave::payload::{self, payload_path};
use crate::autosave::{
    AutoSaveHandle, AutoSaveMenuEntry, AutoSaveRecord, AutoSaveScheduler, RetentionIndex,
    SaveReason, Tick,
};
use crate::config::EditorConfig;
use crate::dispatch::MainLoopDispatcher;
use crate::document::Document;
use crate::error::{EditorError, Result};
use crate::history::{
    BulkMergeSession, CommandHistory, EditOperation, GestureToken, HistoryEntryView,
};
use crate::notices::{ClearReason, Notice, NoticeBroadcaster, NoticeConfig, NoticeHandle};
use crate::types::Timestamp;
use std::thread;
use std::time::Instant;

/// Name of the background thread that writes autosave payloads.
const WORKER_THREAD_NAME: &str = "autosave-writer";

/// Editing mode. Switching modes starts a fresh history.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum EditorMode {
    #[default]
    Default,
    Wiring,
}

/// One editor session over one document.
///
/// Owns everything that used to be process-wide editor state:
/// - The document being edited
/// - Undo/redo history and the gesture buffer
/// - The autosave scheduler and retention catalog
/// - The dispatcher through which autosave workers report back
///
/// All methods run on the main loop thread. The only work done elsewhere
/// is compressing and writing autosave payloads.
pub struct EditorSession<D: Document + 'static> {
    config: EditorConfig,
    document: D,
    mode: EditorMode,
    history: CommandHistory,
    bulk: BulkMergeSession,
    scheduler: AutoSaveScheduler,
    retention: RetentionIndex,
    dispatcher: MainLoopDispatcher<EditorSession<D>>,
    notices: NoticeBroadcaster,
    /// Last payload timestamp handed out, keeps file names unique.
    last_stamp: Timestamp,
}

impl<D: Document + 'static> EditorSession<D> {
    /// Open a session. Loads (or creates) the autosave catalog; never fails.
    pub fn open(config: EditorConfig, document: D) -> Self {
        let config = config.normalized();
        let retention =
            RetentionIndex::load_or_init(&config.autosave.directory, config.autosave.max_retained);
        let scheduler =
            AutoSaveScheduler::new(config.autosave.interval(), config.autosave.enabled);
        let history = CommandHistory::new(config.history.undo_capacity);

        tracing::info!(
            document = document.display_name(),
            autosaves = retention.len(),
            "editor session opened"
        );

        Self {
            config,
            document,
            mode: EditorMode::Default,
            history,
            bulk: BulkMergeSession::new(),
            scheduler,
            retention,
            dispatcher: MainLoopDispatcher::new(),
            notices: NoticeBroadcaster::new(),
            last_stamp: Timestamp::default(),
        }
    }

    // --- Lifecycle ---

    /// The editor screen became active. Starts the autosave timer.
    pub fn select(&mut self, now: Instant) {
        self.scheduler.start(now);
    }

    /// The editor screen was left. Stops autosaving and drops the history.
    pub fn deselect(&mut self) {
        self.bulk.commit(&mut self.history);
        self.scheduler.stop();
        self.mode = EditorMode::Default;
        self.clear_history(ClearReason::EditorClosed);
    }

    /// Run one main-loop step: deliver finished background work, then
    /// advance the autosave timer and start a save if one is due.
    pub fn tick(&mut self, now: Instant, paused: bool, editor_active: bool) -> Tick {
        let jobs = self.dispatcher.drain();
        for job in jobs {
            job(self);
        }

        let tick = self.scheduler.tick(now, paused, editor_active);
        if let Tick::Save(reason) = tick {
            self.start_autosave(reason);
        }
        tick
    }

    /// Apply new settings to the running session.
    pub fn apply_config(&mut self, config: EditorConfig) {
        let config = config.normalized();
        self.history.set_capacity(config.history.undo_capacity);
        self.scheduler.set_interval(config.autosave.interval());
        self.scheduler.set_enabled(config.autosave.enabled);
        self.retention.set_max_retained(config.autosave.max_retained);
        self.config = config;
    }

    // --- Editing ---

    /// Apply an operation to the document and record it.
    ///
    /// An open gesture is committed first so history order matches the
    /// order in which changes hit the document.
    pub fn perform(&mut self, op: impl Into<EditOperation>) {
        let op = op.into();
        self.bulk.commit(&mut self.history);
        op.apply(&mut self.document);
        self.history.store(op);
    }

    /// Record an operation the caller already applied to the document.
    pub fn record(&mut self, op: impl Into<EditOperation>) {
        self.bulk.commit(&mut self.history);
        self.history.store(op.into());
    }

    /// Apply an operation as part of the gesture identified by `token`.
    /// All operations of one gesture become a single history entry.
    pub fn perform_in_gesture(&mut self, token: GestureToken, op: impl Into<EditOperation>) {
        let op = op.into();
        self.bulk.begin(token, &mut self.history);
        op.apply(&mut self.document);
        self.bulk.add(op);
    }

    /// The gesture ended (for example the mouse button was released).
    pub fn end_gesture(&mut self) {
        self.bulk.commit(&mut self.history);
    }

    pub fn undo(&mut self, count: usize) -> usize {
        self.bulk.commit(&mut self.history);
        self.history.undo(count, &mut self.document)
    }

    pub fn redo(&mut self, count: usize) -> usize {
        self.bulk.commit(&mut self.history);
        self.history.redo(count, &mut self.document)
    }

    /// Jump to a row of [`EditorSession::history_entries`].
    pub fn jump_to(&mut self, position: usize) -> usize {
        self.bulk.commit(&mut self.history);
        self.history.jump_to(position, &mut self.document)
    }

    pub fn history_entries(&self) -> Vec<HistoryEntryView> {
        self.history.entries()
    }

    /// Switch editing mode. Changing to a different mode clears the history.
    pub fn set_mode(&mut self, mode: EditorMode) {
        if mode == self.mode {
            return;
        }
        self.bulk.commit(&mut self.history);
        self.mode = mode;
        self.clear_history(ClearReason::ModeChanged);
    }

    /// Swap in a new document (new, loaded or restored). The history of the
    /// old document is discarded. Returns the old document.
    pub fn replace_document(&mut self, document: D) -> D {
        self.bulk.discard();
        let old = std::mem::replace(&mut self.document, document);
        self.clear_history(ClearReason::DocumentReplaced);
        old
    }

    // --- Autosave ---

    /// Request a save right away, outside the timer.
    ///
    /// Returns whether a background save was started. Requests are dropped
    /// while another save is in flight.
    pub fn autosave_now(&mut self) -> bool {
        self.start_autosave(SaveReason::Interval)
    }

    /// Replace the document with the contents of an autosave.
    pub fn restore_autosave(&mut self, handle: &AutoSaveHandle) -> Result<()> {
        let record = self
            .retention
            .resolve(handle)
            .cloned()
            .ok_or_else(|| EditorError::AutoSaveNotFound(handle.path().to_path_buf()))?;

        let snapshot = payload::read_payload(&record.file_path)?;
        let document = D::restore(&snapshot)?;
        tracing::info!(
            file = %record.file_path.display(),
            document = record.document_name.as_str(),
            "restored autosave"
        );
        self.replace_document(document);
        Ok(())
    }

    /// Rows of the "restore autosave" menu, newest first.
    pub fn autosave_menu(&self, now: Timestamp) -> Vec<AutoSaveMenuEntry> {
        self.retention.menu_entries(now)
    }

    pub fn is_autosaving(&self) -> bool {
        self.scheduler.is_saving()
    }

    /// Jobs posted by workers that the next tick will run.
    pub fn pending_jobs(&self) -> usize {
        self.dispatcher.pending()
    }

    fn start_autosave(&mut self, reason: SaveReason) -> bool {
        if !self.config.autosave.enabled || self.document.is_empty() {
            return false;
        }
        if !self.retention.is_persistent() {
            tracing::debug!("autosave directory unavailable, skipping save");
            return false;
        }
        if !self.scheduler.begin_save() {
            tracing::debug!(?reason, "autosave already in flight, dropping request");
            return false;
        }

        // Serialize here: the document keeps changing once we return.
        let snapshot = match self.document.snapshot() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                self.fail_autosave(format!("snapshot failed: {e}"));
                return false;
            }
        };

        let stamp = self.next_stamp();
        let record = AutoSaveRecord {
            file_path: payload_path(self.retention.dir(), stamp),
            document_name: self.document.display_name().to_string(),
            saved_at_secs: stamp.as_secs(),
        };
        tracing::debug!(
            ?reason,
            bytes = snapshot.len(),
            file = %record.file_path.display(),
            "starting autosave"
        );

        let handle = self.dispatcher.handle();
        let spawned = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || {
                let result = payload::write_payload(&record.file_path, &snapshot);
                handle.post(move |session: &mut EditorSession<D>| {
                    session.finish_autosave(record, result)
                });
            });

        match spawned {
            Ok(_) => true,
            Err(e) => {
                let err = EditorError::WorkerSpawn(e.to_string());
                self.fail_autosave(err.to_string());
                false
            }
        }
    }

    /// Continuation of a background save, run on the main thread.
    fn finish_autosave(&mut self, record: AutoSaveRecord, result: Result<()>) {
        self.scheduler.finish_save();
        match result {
            Ok(()) => {
                let evicted = self.retention.insert(record.clone());
                tracing::info!(
                    file = %record.file_path.display(),
                    evicted = evicted.len(),
                    "autosave complete"
                );
                self.notices.broadcast(Notice::AutoSaved {
                    record,
                    evicted: evicted.len(),
                });
            }
            Err(e) => {
                tracing::warn!(file = %record.file_path.display(), "autosave write failed: {e}");
                self.notices.broadcast(Notice::AutoSaveFailed {
                    reason: e.to_string(),
                });
            }
        }
    }

    fn fail_autosave(&mut self, reason: String) {
        tracing::warn!("autosave failed: {reason}");
        self.scheduler.finish_save();
        self.notices.broadcast(Notice::AutoSaveFailed { reason });
    }

    /// Millisecond timestamp strictly greater than the previous one.
    fn next_stamp(&mut self) -> Timestamp {
        let now = Timestamp::now();
        self.last_stamp = if now > self.last_stamp {
            now
        } else {
            Timestamp(self.last_stamp.0 + 1)
        };
        self.last_stamp
    }

    fn clear_history(&mut self, reason: ClearReason) {
        let had_entries = !self.history.is_empty();
        self.history.clear();
        if had_entries {
            self.notices.broadcast(Notice::HistoryCleared { reason });
        }
    }

    // --- Accessors ---

    pub fn document(&self) -> &D {
        &self.document
    }

    /// Mutable access for changes that are not meant to be undoable.
    pub fn document_mut(&mut self) -> &mut D {
        &mut self.document
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    pub fn bulk(&self) -> &BulkMergeSession {
        &self.bulk
    }

    pub fn scheduler(&self) -> &AutoSaveScheduler {
        &self.scheduler
    }

    pub fn retention(&self) -> &RetentionIndex {
        &self.retention
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    /// Subscribe to session notices.
    pub fn subscribe_notices(&self, config: NoticeConfig) -> NoticeHandle {
        self.notices.subscribe(config)
    }
}
