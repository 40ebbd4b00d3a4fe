use std::io;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use log::{debug, error};

use crate::engine::TimerEngine;
use crate::render::Scoreboard;
use crate::signals::{Command, Stamped};

/// Source of commands for the timer loop
pub trait CommandSource: Send + 'static {
    /// Next queued command, without blocking
    fn try_recv(&self) -> Result<Stamped, TryRecvError>;
}

/// Commands arriving over an mpsc channel from the input and signal threads
pub struct ChannelCommandSource {
    rx: Receiver<Stamped>,
}

impl ChannelCommandSource {
    pub fn new(rx: Receiver<Stamped>) -> Self {
        Self { rx }
    }
}

impl CommandSource for ChannelCommandSource {
    fn try_recv(&self) -> Result<Stamped, TryRecvError> {
        self.rx.try_recv()
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Drives the engine one tick at a time
pub struct Runner<S: CommandSource, T: Ticker> {
    source: S,
    ticker: T,
    engine: TimerEngine,
}

impl<S: CommandSource, T: Ticker> Runner<S, T> {
    pub fn new(source: S, ticker: T, engine: TimerEngine) -> Self {
        Self {
            source,
            ticker,
            engine,
        }
    }

    pub fn engine(&self) -> &TimerEngine {
        &self.engine
    }

    /// Applies every queued command in arrival order, each at the time it
    /// was issued, then performs the tick's own update. Commands behind a
    /// quit stay queued.
    pub fn step(&mut self, now: DateTime<Local>) -> Scoreboard {
        while !self.engine.is_quitting() {
            match self.source.try_recv() {
                Ok(Stamped { command, at }) => self.engine.apply(command, at),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    debug!("command channel closed");
                    break;
                }
            }
        }

        if !self.engine.is_quitting() {
            self.engine.update(now);
        }

        self.engine.snapshot()
    }

    /// Ticks until a quit command arrives, handing every snapshot to `draw`,
    /// and returns the engine for persisting.
    ///
    /// Sleeps are scheduled against fixed deadlines so a slow tick shortens
    /// the next sleep instead of pushing every later tick back. A failed draw
    /// takes the quit path so the run is still saved.
    pub fn run<F>(mut self, mut draw: F) -> TimerEngine
    where
        F: FnMut(&Scoreboard) -> io::Result<()>,
    {
        let interval = self.ticker.interval();
        let mut deadline = Instant::now();

        while !self.engine.is_quitting() {
            let now = Local::now();
            let board = self.step(now);
            if let Err(e) = draw(&board) {
                error!("drawing the timer failed: {e}");
                self.engine.apply(Command::Quit, now);
            }

            if self.engine.is_quitting() {
                continue;
            }

            deadline += interval;
            let now = Instant::now();
            if deadline > now {
                thread::sleep(deadline - now);
            } else {
                deadline = now;
            }
        }

        self.engine
    }

    pub fn into_engine(self) -> TimerEngine {
        self.engine
    }
}
