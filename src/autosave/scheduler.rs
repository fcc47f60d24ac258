//! Pause-aware autosave timer.
//!
//! The scheduler is a plain state machine driven by [`AutoSaveScheduler::tick`]
//! once per frame. It never saves anything itself; it tells the caller when
//! a save is due and keeps the reentrancy guard for saves in flight.

use std::time::{Duration, Instant};

/// Default time between autosaves.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(300);

/// Observable scheduler state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerState {
    /// Not started, or autosave disabled.
    Idle,
    /// Waiting for the next due time.
    Counting,
    /// Counting, with a save currently in flight.
    Saving,
    /// Stopped because the editor was left; restarted on next selection.
    Stopped,
}

/// Why a save was requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaveReason {
    /// The interval elapsed.
    Interval,
    /// The host application was just paused.
    PauseEntered,
}

/// What the caller should do after a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tick {
    Idle,
    Save(SaveReason),
    /// The scheduler stopped itself on this tick.
    Stopped,
}

pub struct AutoSaveScheduler {
    interval: Duration,
    enabled: bool,
    running: bool,
    stopped: bool,
    target: Option<Instant>,
    paused_since: Option<Instant>,
    saving: bool,
}

impl AutoSaveScheduler {
    pub fn new(interval: Duration, enabled: bool) -> Self {
        Self {
            interval: interval.max(Duration::from_secs(1)),
            enabled,
            running: false,
            stopped: false,
            target: None,
            paused_since: None,
            saving: false,
        }
    }

    /// Begin counting towards the first save. Does nothing when disabled.
    pub fn start(&mut self, now: Instant) {
        if !self.enabled {
            tracing::debug!("autosave disabled, scheduler not started");
            return;
        }
        self.running = true;
        self.stopped = false;
        self.target = Some(now + self.interval);
        self.paused_since = None;
        tracing::debug!(interval_secs = self.interval.as_secs(), "autosave scheduler started");
    }

    /// Stop counting. An in-flight save still completes.
    pub fn stop(&mut self) {
        if self.running {
            tracing::debug!("autosave scheduler stopped");
        }
        self.running = false;
        self.stopped = true;
        self.target = None;
        self.paused_since = None;
    }

    /// Advance the timer.
    ///
    /// Entering a pause requests an immediate save; the paused duration is
    /// added to the due time on resume so it never counts against the
    /// interval. Leaving the editor stops the scheduler, but not while
    /// paused.
    pub fn tick(&mut self, now: Instant, paused: bool, editor_active: bool) -> Tick {
        if !self.running {
            return Tick::Idle;
        }

        if paused {
            if self.paused_since.is_none() {
                self.paused_since = Some(now);
                return Tick::Save(SaveReason::PauseEntered);
            }
            return Tick::Idle;
        }

        if let Some(since) = self.paused_since.take() {
            let paused_for = now.saturating_duration_since(since);
            if let Some(target) = self.target.as_mut() {
                *target += paused_for;
            }
            tracing::debug!(paused_ms = paused_for.as_millis() as u64, "autosave deadline extended");
        }

        if !editor_active {
            self.stop();
            return Tick::Stopped;
        }

        match self.target {
            Some(target) if now >= target => {
                self.target = Some(now + self.interval);
                Tick::Save(SaveReason::Interval)
            }
            _ => Tick::Idle,
        }
    }

    /// Claim the reentrancy guard. Returns false if a save is already in
    /// flight, in which case the request should be dropped.
    pub fn begin_save(&mut self) -> bool {
        if self.saving {
            return false;
        }
        self.saving = true;
        true
    }

    /// Release the reentrancy guard.
    pub fn finish_save(&mut self) {
        self.saving = false;
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn state(&self) -> SchedulerState {
        if self.running {
            if self.saving {
                SchedulerState::Saving
            } else {
                SchedulerState::Counting
            }
        } else if self.stopped {
            SchedulerState::Stopped
        } else {
            SchedulerState::Idle
        }
    }

    /// When the next interval save is due, if counting.
    pub fn next_due(&self) -> Option<Instant> {
        self.target
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Change the interval. Takes effect from the next due time onwards.
    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval.max(Duration::from_secs(1));
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable autosaving. Disabling stops a running scheduler.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled && self.running {
            self.stop();
        }
    }
}

impl Default for AutoSaveScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL, true)
    }
}
