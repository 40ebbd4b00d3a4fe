use splitrun::{
    config::{Config, ConfigStore, FileConfigStore},
    engine::TimerEngine,
    input::{self, InputListener},
    persist::{self, SplitsError, DEFAULT_SPLITS},
    runtime::{ChannelCommandSource, FixedTicker, Runner},
    signals::Stamped,
    split::Split,
    ui,
};

use chrono::Local;
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    terminal::{disable_raw_mode, enable_raw_mode},
    tty::IsTty,
};
use log::{error, info};
use ratatui::{
    backend::CrosstermBackend,
    layout::Position,
    Terminal, TerminalOptions, Viewport,
};
use std::{
    error::Error,
    io::{self, stdin, Stdout},
    path::PathBuf,
    sync::mpsc::{self, Receiver},
    thread,
    time::Duration,
};

/// speedrun split timer with live personal-best deltas
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A speedrun split timer for the terminal. Splits are read from --splits, from piped stdin, or default to a single split. F9 starts the run and completes splits, F10 resets, F12 quits and writes the results file."
)]
pub struct Cli {
    /// file to read splits from, one `name<TAB>pb<TAB>goal<TAB>info` per line
    #[clap(short = 's', long)]
    splits: Option<PathBuf>,

    /// redraw period in milliseconds
    #[clap(short = 't', long, value_parser = clap::value_parser!(u64).range(1..))]
    tick_ms: Option<u64>,

    /// directory the results file is written to
    #[clap(short = 'o', long)]
    out_dir: Option<PathBuf>,

    /// keep --tick-ms and --out-dir as the defaults for later runs
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    /// Stored defaults with command-line overrides on top
    fn apply_to(&self, mut config: Config) -> Config {
        if let Some(tick_ms) = self.tick_ms {
            config.tick_ms = tick_ms;
        }
        if let Some(dir) = &self.out_dir {
            config.output_dir = Some(dir.clone());
        }
        config
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let store = FileConfigStore::new();
    let config = cli.apply_to(store.load());
    if cli.save_config {
        store.save(&config)?;
        info!("saved defaults to {}", store.path().display());
    }

    // Bad input fails here, before the terminal is touched
    let splits = match read_input(&cli) {
        Ok(splits) => splits,
        Err(e) => {
            let mut cmd = Cli::command();
            cmd.error(ErrorKind::InvalidValue, e).exit();
        }
    };
    info!("loaded {} splits", splits.len());

    let (tx, rx) = mpsc::channel();
    input::forward_interrupts(tx.clone())?;

    enable_raw_mode()?;
    let listener = match InputListener::spawn(tx) {
        Ok(listener) => listener,
        Err(e) => {
            disable_raw_mode()?;
            return Err(e.into());
        }
    };

    let outcome = run_timer(splits, rx, config.tick_interval());
    listener.stop();
    disable_raw_mode()?;
    println!();

    let engine = outcome?;
    println!("Quitting...");

    let splits = engine.into_splits();
    match persist::save_splits(&splits, config.output_dir(), Local::now()) {
        Ok(path) => {
            println!("Saved splits to {}", path.display());
            Ok(())
        }
        Err(e) => {
            error!("{e}");
            // Dump the run so it can be recovered by hand
            if let Ok(data) = persist::format_splits(&splits) {
                println!("{data}");
            }
            Err(e.into())
        }
    }
}

fn read_input(cli: &Cli) -> Result<Vec<Split>, SplitsError> {
    let stdin = stdin();
    if let Some(path) = &cli.splits {
        persist::load_splits(path)
    } else if !stdin.is_tty() {
        persist::read_splits(stdin.lock())
    } else {
        persist::parse_splits(DEFAULT_SPLITS)
    }
}

/// Runs the timer loop on its own thread until quit and hands back the
/// engine once the thread has finished
fn run_timer(
    splits: Vec<Split>,
    rx: Receiver<Stamped>,
    tick: Duration,
) -> io::Result<TimerEngine> {
    let mut terminal = inline_terminal(splits.len())?;
    let runner = Runner::new(
        ChannelCommandSource::new(rx),
        FixedTicker::new(tick),
        TimerEngine::new(splits, Local::now()),
    );

    let handle = thread::Builder::new()
        .name("timer".into())
        .spawn(move || {
            let engine = runner.run(|board| ui::draw(&mut terminal, board));
            (terminal, engine)
        })?;

    let (mut terminal, engine) = handle
        .join()
        .map_err(|_| io::Error::new(io::ErrorKind::Other, "timer thread panicked"))?;

    // Leave the cursor under the final board
    let area = terminal.get_frame().area();
    terminal.set_cursor_position(Position::new(0, area.bottom().saturating_sub(1)))?;
    terminal.show_cursor()?;

    Ok(engine)
}

fn inline_terminal(split_count: usize) -> io::Result<Terminal<CrosstermBackend<Stdout>>> {
    Terminal::with_options(
        CrosstermBackend::new(io::stdout()),
        TerminalOptions {
            viewport: Viewport::Inline(ui::viewport_height(split_count)),
        },
    )
}
