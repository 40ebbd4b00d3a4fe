use chrono::{DateTime, Duration, Local};
use std::ops::Index;

/// One named segment of a run
#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    pub name: String,
    /// A zero best means no time has been recorded yet
    pub personal_best: Duration,
    pub goal: String,
    pub info: String,
    pub start_time: Option<DateTime<Local>>,
    pub end_time: Option<DateTime<Local>>,
    pub duration: Duration,
    pub delta: Option<Duration>,
}

impl Split {
    pub fn new(
        name: impl Into<String>,
        personal_best: Duration,
        goal: impl Into<String>,
        info: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            personal_best,
            goal: goal.into(),
            info: info.into(),
            start_time: None,
            end_time: None,
            duration: Duration::zero(),
            delta: None,
        }
    }

    pub fn has_started(&self) -> bool {
        self.start_time.is_some()
    }

    pub fn has_best(&self) -> bool {
        self.personal_best != Duration::zero()
    }

    /// Recompute duration and delta against `now`. Does nothing for a split
    /// that has not been started.
    pub fn refresh(&mut self, now: DateTime<Local>) {
        if let Some(start) = self.start_time {
            self.end_time = Some(now);
            self.duration = now - start;
            self.delta = Some(self.duration - self.personal_best);
        }
    }

    /// Overwrite the personal best with the current duration if it is
    /// strictly faster, or if no best exists yet. Returns whether it changed.
    ///
    /// A zero duration is the "no record" sentinel, so it is never taken.
    pub fn record_best(&mut self) -> bool {
        if self.duration <= Duration::zero() {
            return false;
        }

        if self.duration < self.personal_best || !self.has_best() {
            self.personal_best = self.duration;
            true
        } else {
            false
        }
    }

    /// Delta to show for this split: the last recorded one, or how far the
    /// current duration sits from the best when nothing has been recorded.
    pub fn display_delta(&self) -> Duration {
        self.delta
            .unwrap_or_else(|| self.duration - self.personal_best)
    }

    /// Drop everything belonging to the current run; the best survives
    pub fn clear_run(&mut self) {
        self.start_time = None;
        self.end_time = None;
        self.duration = Duration::zero();
        self.delta = None;
    }
}

/// Ordered split sequence for a run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SplitSet {
    splits: Vec<Split>,
}

impl SplitSet {
    pub fn new(splits: Vec<Split>) -> Self {
        Self { splits }
    }

    pub fn len(&self) -> usize {
        self.splits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.splits.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&Split> {
        self.splits.get(idx)
    }

    pub fn get_mut(&mut self, idx: usize) -> Option<&mut Split> {
        self.splits.get_mut(idx)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Split> {
        self.splits.iter()
    }

    pub fn as_slice(&self) -> &[Split] {
        &self.splits
    }

    pub fn clear_runs(&mut self) {
        self.splits.iter_mut().for_each(Split::clear_run);
    }

    pub fn into_vec(self) -> Vec<Split> {
        self.splits
    }
}

impl From<Vec<Split>> for SplitSet {
    fn from(splits: Vec<Split>) -> Self {
        Self::new(splits)
    }
}

impl Index<usize> for SplitSet {
    type Output = Split;

    fn index(&self, idx: usize) -> &Split {
        &self.splits[idx]
    }
}
