use std::sync::mpsc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Local, TimeZone};
use splitrun::engine::TimerEngine;
use splitrun::persist;
use splitrun::render::Tone;
use splitrun::runtime::{ChannelCommandSource, FixedTicker, Runner};
use splitrun::signals::{Command, Stamped};
use splitrun::split::Split;

// Headless integration through the Runner and a command channel, with
// explicit timestamps standing in for the wall clock.

fn t0() -> DateTime<Local> {
    Local.with_ymd_and_hms(2024, 3, 1, 18, 30, 0).unwrap()
}

fn at(ms: i64) -> DateTime<Local> {
    t0() + Duration::milliseconds(ms)
}

fn press(tx: &mpsc::Sender<Stamped>, command: Command, ms: i64) {
    tx.send(Stamped::new(command, at(ms))).unwrap();
}

fn splits(data: &str) -> Vec<Split> {
    persist::parse_splits(data).unwrap()
}

fn runner(
    splits: Vec<Split>,
) -> (
    mpsc::Sender<Stamped>,
    Runner<ChannelCommandSource, FixedTicker>,
) {
    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        ChannelCommandSource::new(rx),
        FixedTicker::new(StdDuration::from_millis(5)),
        TimerEngine::new(splits, t0()),
    );
    (tx, runner)
}

const THREE_SPLITS: &str =
    "A\t00:00:05.000000\t\t\nB\t00:01:00.000000\t\t\nC\t00:00:05.000000\t\t";

#[test]
fn headless_full_run_records_bests() {
    let (tx, mut runner) = runner(splits(
        "Forest\t00:00:10.000000\t\t\nCastle\t00:00:20.000000\t\t\nBoss\t00:00:30.000000\t\t\n",
    ));

    press(&tx, Command::Advance, 0);
    runner.step(at(0));

    // Forest 8s: a best
    runner.step(at(8_000));
    press(&tx, Command::Advance, 8_000);
    runner.step(at(8_000));

    // Castle 25s: slower
    runner.step(at(33_000));
    press(&tx, Command::Advance, 33_000);
    runner.step(at(33_000));

    // Boss 29.5s: a best, and the run is over
    press(&tx, Command::Advance, 62_500);
    let board = runner.step(at(62_500));

    let engine = runner.engine();
    assert!(engine.has_finished());
    assert!(!engine.is_running());
    assert_eq!(board.clock, "00:01:02.500");

    let pbs: Vec<_> = engine.splits().iter().map(|s| s.personal_best).collect();
    assert_eq!(
        pbs,
        vec![
            Duration::seconds(8),
            Duration::seconds(20),
            Duration::milliseconds(29_500),
        ]
    );

    assert_eq!(board.lines[0].tone, Tone::Ahead);
    assert_eq!(board.lines[1].tone, Tone::Dimmed);
    assert!(board.lines.iter().all(|l| !l.emphasized));
}

#[test]
fn headless_double_press_in_one_tick_keeps_press_times() {
    let dir = tempfile::tempdir().unwrap();
    let (tx, mut runner) = runner(splits(THREE_SPLITS));

    press(&tx, Command::Advance, 0);
    runner.step(at(0));

    // Both presses land before the tick at 2.060s
    press(&tx, Command::Advance, 2_000);
    press(&tx, Command::Advance, 2_040);
    let board = runner.step(at(2_060));

    let engine = runner.engine();
    assert_eq!(engine.active_index(), Some(2));
    assert_eq!(engine.splits()[0].personal_best, Duration::seconds(2));
    assert_eq!(engine.splits()[1].duration, Duration::milliseconds(40));
    assert_eq!(engine.splits()[1].personal_best, Duration::milliseconds(40));
    assert_eq!(engine.splits()[2].duration, Duration::milliseconds(20));
    assert!(board.lines[2].emphasized);

    press(&tx, Command::Quit, 2_100);
    runner.step(at(2_100));
    let splits = runner.into_engine().into_splits();
    let path = persist::save_splits(&splits, dir.path(), at(2_100)).unwrap();

    let saved = std::fs::read_to_string(path).unwrap();
    assert!(saved.contains("B\t00:00:00.040000"), "{saved}");
}

#[test]
fn headless_simultaneous_presses_never_record_zero_best() {
    let dir = tempfile::tempdir().unwrap();
    let (tx, mut runner) = runner(splits(THREE_SPLITS));

    press(&tx, Command::Advance, 0);
    runner.step(at(0));

    press(&tx, Command::Advance, 2_000);
    press(&tx, Command::Advance, 2_000);
    runner.step(at(2_060));
    press(&tx, Command::Quit, 2_100);
    runner.step(at(2_100));

    let splits = runner.into_engine().into_splits();
    assert_eq!(splits[1].personal_best, Duration::seconds(60));

    let path = persist::save_splits(&splits, dir.path(), at(2_100)).unwrap();
    let saved = std::fs::read_to_string(path).unwrap();
    assert!(saved.contains("B\t00:01:00.000000"), "{saved}");
}

#[test]
fn headless_reset_mid_run_keeps_bests() {
    let (tx, mut runner) = runner(splits("A\t00:00:05.000000\t\t\nB\t00:00:05.000000\t\t"));

    press(&tx, Command::Advance, 0);
    runner.step(at(0));
    press(&tx, Command::Advance, 3_000);
    runner.step(at(3_000));

    runner.step(at(4_000));
    press(&tx, Command::Reset, 4_500);
    let board = runner.step(at(4_500));

    let engine = runner.engine();
    assert_eq!(engine.active_index(), None);
    assert!(!engine.is_running());
    assert_eq!(board.clock, "00:00:00.000");
    assert_eq!(engine.run_started_at(), at(4_500));
    assert_eq!(engine.splits()[0].personal_best, Duration::seconds(3));
    for split in engine.splits().iter() {
        assert!(!split.has_started());
        assert_eq!(split.delta, None);
        assert_eq!(split.duration, Duration::zero());
    }
}

#[test]
fn headless_clock_counts_idle_time_after_reset() {
    let (tx, mut runner) = runner(splits("A\t00:00:05.000000\t\t"));

    press(&tx, Command::Advance, 0);
    runner.step(at(0));
    press(&tx, Command::Reset, 1_000);
    runner.step(at(1_000));

    // Idle for four seconds before starting again
    press(&tx, Command::Advance, 5_000);
    let board = runner.step(at(6_000));

    assert_eq!(board.clock, "00:00:05.000");
    assert_eq!(runner.engine().splits()[0].duration, Duration::seconds(1));
}

#[test]
fn headless_advance_after_finish_rearms() {
    let (tx, mut runner) = runner(splits("Only\t00:00:05.000000\t\t"));

    press(&tx, Command::Advance, 0);
    runner.step(at(0));
    press(&tx, Command::Advance, 4_000);
    runner.step(at(4_000));
    assert!(runner.engine().has_finished());

    // Acknowledging a finished run resets it on the next update
    press(&tx, Command::Advance, 6_000);
    runner.step(at(6_000));
    runner.step(at(6_060));

    let engine = runner.engine();
    assert_eq!(engine.active_index(), None);
    assert_eq!(engine.splits()[0].personal_best, Duration::seconds(4));
    assert!(!engine.splits()[0].has_started());
}

#[test]
fn headless_quit_mid_run_persists_last_tick() {
    let dir = tempfile::tempdir().unwrap();
    let (tx, mut runner) = runner(splits("A\t00:00:05.000000\tsub 5\tskip\nB\t00:00:05.000000\t\t"));

    press(&tx, Command::Advance, 0);
    runner.step(at(0));
    press(&tx, Command::Advance, 4_000);
    runner.step(at(4_000));
    runner.step(at(5_000));

    press(&tx, Command::Quit, 9_000);
    runner.step(at(9_000));

    let engine = runner.into_engine();
    assert!(engine.is_quitting());
    // Quit does not refresh, B still reads as of the previous tick
    assert_eq!(engine.splits()[1].duration, Duration::seconds(1));

    let path = persist::save_splits(&engine.into_splits(), dir.path(), at(9_000)).unwrap();
    let reloaded = persist::load_splits(&path).unwrap();

    assert_eq!(reloaded.len(), 2);
    assert_eq!(reloaded[0].personal_best, Duration::seconds(4));
    assert_eq!(reloaded[0].goal, "sub 5");
    assert_eq!(reloaded[0].info, "skip");
    assert_eq!(reloaded[1].personal_best, Duration::seconds(5));
}

#[test]
fn headless_run_loop_exits_on_quit_from_producer() {
    let (tx, runner) = runner(splits(persist::DEFAULT_SPLITS));

    let producer = std::thread::spawn(move || {
        tx.send(Stamped::now(Command::Advance)).unwrap();
        std::thread::sleep(StdDuration::from_millis(30));
        tx.send(Stamped::now(Command::Quit)).unwrap();
    });

    let mut frames = 0u32;
    let engine = runner.run(|board| {
        frames += 1;
        assert_eq!(board.lines.len(), 1);
        Ok(())
    });
    producer.join().unwrap();

    assert!(frames >= 1);
    assert!(engine.is_quitting());
    assert!(engine.splits()[0].has_started());
}
