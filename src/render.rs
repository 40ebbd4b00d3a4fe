//! Turns run state into display lines.
//!
//! Nothing here touches the terminal: the output is plain text tagged with
//! a [`Tone`], and drawing is left to [`crate::ui`].

use chrono::Duration;
use unicode_width::UnicodeWidthStr;

use crate::split::Split;
use crate::util::{format_clock, secs_f64};

pub const TAB_SIZE: usize = 8;
const NAME_COLUMN_STOPS: usize = 4;
const DELTA_COLUMN_STOPS: usize = 2;

/// Deltas below this are "far ahead"; between it and zero, "ahead"
const FAR_AHEAD_SECS: i64 = 5;
/// Deltas above this are "behind"
const BEHIND_SECS: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Dimmed,
    Highlighted,
    Ahead,
    FarAhead,
    Behind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StyledLine {
    pub text: String,
    pub tone: Tone,
    /// Active split of a running timer; drawn with a background on top of
    /// its tone
    pub emphasized: bool,
}

/// Everything the display needs for one tick
#[derive(Debug, Clone, PartialEq)]
pub struct Scoreboard {
    pub lines: Vec<StyledLine>,
    pub clock: String,
}

pub fn render(
    splits: &[Split],
    elapsed: Duration,
    active: Option<usize>,
    running: bool,
) -> Scoreboard {
    let lines = splits
        .iter()
        .enumerate()
        .map(|(idx, split)| {
            let delta = split.display_delta();
            StyledLine {
                text: split_line(split, delta),
                tone: tone_for(idx, delta, active, running),
                emphasized: running && active == Some(idx),
            }
        })
        .collect();

    Scoreboard {
        lines,
        clock: format_clock(elapsed),
    }
}

pub fn tone_for(idx: usize, delta: Duration, active: Option<usize>, running: bool) -> Tone {
    let base = if running && active == Some(idx) {
        Tone::Highlighted
    } else {
        Tone::Dimmed
    };

    if !active.is_some_and(|a| idx <= a) {
        return base;
    }

    if delta < Duration::seconds(-FAR_AHEAD_SECS) {
        Tone::FarAhead
    } else if delta < Duration::zero() {
        Tone::Ahead
    } else if delta > Duration::seconds(BEHIND_SECS) {
        Tone::Behind
    } else {
        base
    }
}

fn split_line(split: &Split, delta: Duration) -> String {
    let delta_field = format!("Δ{:.2}s", secs_f64(delta));

    format!(
        "{name}{name_pad}{delta_field}{delta_pad}{duration:.2}s\t(PB: {pb:.2})",
        name = split.name,
        name_pad = tab_padding(&split.name, NAME_COLUMN_STOPS),
        delta_pad = tab_padding(&delta_field, DELTA_COLUMN_STOPS),
        duration = secs_f64(split.duration),
        pb = secs_f64(split.personal_best),
    )
}

/// Tabs needed after `field` so the next column starts `column_stops` tab
/// stops in. Always at least one.
pub fn tab_padding(field: &str, column_stops: usize) -> String {
    let used = field.width() / TAB_SIZE;
    "\t".repeat(column_stops.saturating_sub(used) + 1)
}
