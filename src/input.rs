//! Keyboard and interrupt input.
//!
//! Bindings are fixed: F9 starts the run or completes the active split,
//! F10 resets, F12 quits. Ctrl+C quits as well, since raw mode turns it
//! into an ordinary key event.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::Local;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::{info, warn};

use crate::signals::{Command, Stamped};

/// How long a poll blocks before the shutdown flag is checked again
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Maps a key to the command it stands for, if any
pub fn dispatch(key: &KeyEvent) -> Option<Command> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Command::Quit);
    }

    match key.code {
        KeyCode::F(9) => Some(Command::Advance),
        KeyCode::F(10) => Some(Command::Reset),
        KeyCode::F(12) => Some(Command::Quit),
        _ => None,
    }
}

/// Background thread turning terminal key events into commands
pub struct InputListener {
    handle: Option<JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
}

impl InputListener {
    pub fn spawn(tx: Sender<Stamped>) -> io::Result<Self> {
        let shutdown = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&shutdown);

        let handle = thread::Builder::new()
            .name("input".into())
            .spawn(move || listen(tx, flag))?;

        Ok(Self {
            handle: Some(handle),
            shutdown,
        })
    }

    /// Signals the thread and waits for it to exit
    pub fn stop(mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("input thread panicked");
            }
        }
    }
}

fn listen(tx: Sender<Stamped>, shutdown: Arc<AtomicBool>) {
    while !shutdown.load(Ordering::Relaxed) {
        let key = match event::poll(POLL_INTERVAL) {
            Ok(false) => continue,
            Ok(true) => match event::read() {
                Ok(Event::Key(key)) => key,
                Ok(_) => continue,
                Err(e) => {
                    warn!("reading terminal input failed: {e}");
                    let _ = tx.send(Stamped::now(Command::Quit));
                    break;
                }
            },
            Err(e) => {
                // Without input there is no other way out, so wind the run down
                warn!("polling terminal input failed: {e}");
                let _ = tx.send(Stamped::now(Command::Quit));
                break;
            }
        };

        // Stamp on read; the timer may not drain it until its next tick
        let at = Local::now();
        let Some(command) = dispatch(&key) else {
            continue;
        };
        if command == Command::Quit {
            info!("quit requested from keyboard");
        }
        if tx.send(Stamped::new(command, at)).is_err() {
            break;
        }
    }
}

/// Routes SIGINT and SIGTERM into the quit path
#[cfg(unix)]
pub fn forward_interrupts(tx: Sender<Stamped>) -> io::Result<()> {
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals = Signals::new([SIGINT, SIGTERM])?;
    thread::Builder::new()
        .name("interrupts".into())
        .spawn(move || {
            for sig in signals.forever() {
                info!("received signal {sig}, quitting");
                if tx.send(Stamped::now(Command::Quit)).is_err() {
                    break;
                }
            }
        })?;

    Ok(())
}

#[cfg(not(unix))]
pub fn forward_interrupts(_tx: Sender<Stamped>) -> io::Result<()> {
    Ok(())
}
