use chrono::{DateTime, Local};

/// A request from outside the engine. Producers only ever enqueue these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Command {
    Advance,
    Reset,
    Quit,
}

/// A command together with the moment it was issued. The engine acts on
/// it at that moment, not at the tick that picks it up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stamped {
    pub command: Command,
    pub at: DateTime<Local>,
}

impl Stamped {
    pub fn new(command: Command, at: DateTime<Local>) -> Self {
        Self { command, at }
    }

    /// Stamped with the current wall-clock time
    pub fn now(command: Command) -> Self {
        Self::new(command, Local::now())
    }
}

/// The four run conditions the engine polls each tick.
///
/// They are independent: any combination may be set at once. `advance` and
/// `reset` are consumed by the engine, `running` is owned by it, and
/// `quitting` stays set for the rest of the process.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Signals {
    advance: bool,
    running: bool,
    reset: bool,
    quitting: bool,
}

impl Signals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&mut self, command: Command) {
        match command {
            Command::Advance => self.advance = true,
            Command::Reset => self.reset = true,
            Command::Quit => self.quitting = true,
        }
    }

    /// Clears the advance condition, returning whether it was set
    pub fn take_advance(&mut self) -> bool {
        std::mem::take(&mut self.advance)
    }

    /// Clears the reset condition, returning whether it was set
    pub fn take_reset(&mut self) -> bool {
        std::mem::take(&mut self.reset)
    }

    pub fn request_reset(&mut self) {
        self.reset = true;
    }

    pub fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    pub fn advance_pending(&self) -> bool {
        self.advance
    }

    pub fn reset_pending(&self) -> bool {
        self.reset
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_quitting(&self) -> bool {
        self.quitting
    }
}
