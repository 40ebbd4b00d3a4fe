//! Run state machine.
//!
//! The engine owns the split store and the run conditions. Callers feed it
//! commands and a timestamp; every duration is recomputed from timestamps
//! so repeating an update with the same `now` is harmless.

use chrono::{DateTime, Duration, Local};
use log::{debug, info};
use std::cmp::Ordering;

use crate::render::{self, Scoreboard};
use crate::signals::{Command, Signals};
use crate::split::{Split, SplitSet};

#[derive(Debug, Clone)]
pub struct TimerEngine {
    splits: SplitSet,
    signals: Signals,
    /// `None` before the first split. Reaches `splits.len()` once the
    /// final split has been completed.
    active: Option<usize>,
    run_started_at: DateTime<Local>,
    elapsed: Duration,
    /// Latest timestamp the engine has acted on
    clock: DateTime<Local>,
}

impl TimerEngine {
    pub fn new(splits: impl Into<SplitSet>, now: DateTime<Local>) -> Self {
        Self {
            splits: splits.into(),
            signals: Signals::new(),
            active: None,
            run_started_at: now,
            elapsed: Duration::zero(),
            clock: now,
        }
    }

    /// Raise the condition for `command` and act on it immediately.
    ///
    /// Quit only marks the engine as quitting so the split state stays as
    /// the last update left it.
    pub fn apply(&mut self, command: Command, now: DateTime<Local>) {
        debug!("command {command} (active {:?})", self.active);
        self.signals.raise(command);
        if command != Command::Quit {
            self.update(now);
        }
    }

    /// One engine step: live refresh, then a pending advance. A pending
    /// reset takes the whole step; an advance raised alongside it waits for
    /// the next update.
    ///
    /// Time never runs backwards here: a `now` older than one already seen
    /// is treated as that later moment.
    pub fn update(&mut self, now: DateTime<Local>) {
        let now = now.max(self.clock);
        self.clock = now;

        if self.signals.take_reset() {
            self.reset(now);
            return;
        }

        if self.signals.is_running() {
            self.refresh(now);
        }

        if self.signals.take_advance() {
            self.advance(now);
        }
    }

    fn reset(&mut self, now: DateTime<Local>) {
        info!("run reset");
        self.run_started_at = now;
        self.elapsed = Duration::zero();
        self.active = None;
        self.splits.clear_runs();
        self.signals.set_running(false);
    }

    fn refresh(&mut self, now: DateTime<Local>) {
        if let Some(split) = self.active_split_mut() {
            split.refresh(now);
        }
        self.elapsed = now - self.run_started_at;
    }

    fn advance(&mut self, now: DateTime<Local>) {
        if let Some(split) = self.active_split_mut() {
            if split.record_best() {
                info!(
                    "new personal best for {:?}: {}",
                    split.name,
                    crate::util::format_hms_micros(split.personal_best)
                );
            }
        }

        let next = self.active.map_or(0, |idx| idx + 1);
        match next.cmp(&self.splits.len()) {
            Ordering::Less => {
                self.active = Some(next);
                if let Some(split) = self.splits.get_mut(next) {
                    split.start_time = Some(now);
                }
                self.signals.set_running(true);
            }
            Ordering::Equal => {
                info!("run finished in {}", crate::util::format_clock(self.elapsed));
                self.active = Some(next);
                self.signals.set_running(false);
            }
            Ordering::Greater => {
                // Completed run acknowledged again: re-arm on the next update
                self.signals.request_reset();
            }
        }
    }

    fn active_split_mut(&mut self) -> Option<&mut Split> {
        self.active.and_then(|idx| self.splits.get_mut(idx))
    }

    pub fn active_split(&self) -> Option<&Split> {
        self.active.and_then(|idx| self.splits.get(idx))
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn splits(&self) -> &SplitSet {
        &self.splits
    }

    pub fn signals(&self) -> &Signals {
        &self.signals
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn run_started_at(&self) -> DateTime<Local> {
        self.run_started_at
    }

    pub fn is_running(&self) -> bool {
        self.signals.is_running()
    }

    pub fn is_quitting(&self) -> bool {
        self.signals.is_quitting()
    }

    pub fn has_finished(&self) -> bool {
        self.active.is_some_and(|idx| idx >= self.splits.len())
    }

    /// Read-only view for the display
    pub fn snapshot(&self) -> Scoreboard {
        render::render(
            self.splits.as_slice(),
            self.elapsed,
            self.active,
            self.signals.is_running(),
        )
    }

    pub fn into_splits(self) -> Vec<Split> {
        self.splits.into_vec()
    }
}
