//! Tab-separated split files.
//!
//! One split per line: `name\tpersonal_best\tgoal\tinfo`, with the best
//! written as `HH:MM:SS.ffffff`.

use chrono::{DateTime, Duration, Local, NaiveTime, Timelike};
use csv::{QuoteStyle, ReaderBuilder, Terminator, WriterBuilder};
use log::info;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::split::Split;
use crate::util::format_hms_micros;

const FIELD_COUNT: usize = 4;
const PB_FORMAT: &str = "%H:%M:%S%.f";
const PB_FRACTION_DIGITS: usize = 6;

/// Used when nothing is piped in and no file is given
pub const DEFAULT_SPLITS: &str = "Timer\t00:01:30.000000\t00:01:20.000000\tInfo1";

#[derive(Debug, thiserror::Error)]
pub enum SplitsError {
    #[error("no splits found in input")]
    Empty,

    #[error("line {line}: expected 4 tab-separated fields, found {found}")]
    FieldCount { line: u64, found: usize },

    #[error("line {line}: personal best {value:?} is not HH:MM:SS.ffffff")]
    PersonalBest {
        line: u64,
        value: String,
        source: BestTimeError,
    },

    #[error("malformed split data: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to read splits from {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write splits to {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Why a personal best field was rejected
#[derive(Debug, thiserror::Error)]
pub enum BestTimeError {
    #[error("expected a '.' followed by exactly six fraction digits")]
    Fraction,

    #[error(transparent)]
    Clock(#[from] chrono::ParseError),
}

/// Parses `HH:MM:SS.ffffff`. The fraction must be exactly six digits, so
/// whatever loads is written back unchanged.
pub fn parse_personal_best(value: &str) -> Result<Duration, BestTimeError> {
    let value = value.trim();
    let has_micros = value.rsplit_once('.').is_some_and(|(_, fraction)| {
        fraction.len() == PB_FRACTION_DIGITS && fraction.bytes().all(|b| b.is_ascii_digit())
    });
    if !has_micros {
        return Err(BestTimeError::Fraction);
    }

    let t = NaiveTime::parse_from_str(value, PB_FORMAT)?;

    Ok(Duration::hours(i64::from(t.hour()))
        + Duration::minutes(i64::from(t.minute()))
        + Duration::seconds(i64::from(t.second()))
        + Duration::microseconds(i64::from(t.nanosecond() / 1_000)))
}

pub fn parse_splits(data: &str) -> Result<Vec<Split>, SplitsError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(data.trim_matches(|c| c == '\n' || c == '\r').as_bytes());

    let mut splits = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record
            .position()
            .map_or(splits.len() as u64 + 1, |pos| pos.line());

        if record.len() != FIELD_COUNT {
            return Err(SplitsError::FieldCount {
                line,
                found: record.len(),
            });
        }

        let personal_best =
            parse_personal_best(&record[1]).map_err(|source| SplitsError::PersonalBest {
                line,
                value: record[1].to_string(),
                source,
            })?;

        splits.push(Split::new(&record[0], personal_best, &record[2], &record[3]));
    }

    if splits.is_empty() {
        return Err(SplitsError::Empty);
    }

    Ok(splits)
}

pub fn read_splits<R: Read>(mut reader: R) -> Result<Vec<Split>, SplitsError> {
    let mut data = String::new();
    reader
        .read_to_string(&mut data)
        .map_err(|source| SplitsError::Read {
            path: PathBuf::from("<stdin>"),
            source,
        })?;
    parse_splits(&data)
}

pub fn load_splits<P: AsRef<Path>>(path: P) -> Result<Vec<Split>, SplitsError> {
    let path = path.as_ref();
    let data = fs::read_to_string(path).map_err(|source| SplitsError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_splits(&data)
}

/// Serialises splits in the input format, one line each. Lines are joined
/// with `\n`; there is no newline after the last one.
pub fn format_splits(splits: &[Split]) -> Result<String, SplitsError> {
    let mut writer = WriterBuilder::new()
        .delimiter(b'\t')
        .quote_style(QuoteStyle::Never)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    for split in splits {
        let pb = format_hms_micros(split.personal_best);
        writer.write_record([
            split.name.as_str(),
            pb.as_str(),
            split.goal.as_str(),
            split.info.as_str(),
        ])?;
    }

    let mut bytes = writer
        .into_inner()
        .map_err(|e| SplitsError::Csv(e.into_error().into()))?;
    if bytes.last() == Some(&b'\n') {
        bytes.pop();
    }
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub fn results_file_name(now: DateTime<Local>) -> String {
    format!("{}_splits.txt", now.format("%Y%m%d%H%M%S"))
}

/// Writes `<YYYYMMDDHHMMSS>_splits.txt` under `dir`, creating it if needed
pub fn save_splits<P: AsRef<Path>>(
    splits: &[Split],
    dir: P,
    now: DateTime<Local>,
) -> Result<PathBuf, SplitsError> {
    let dir = dir.as_ref();
    let path = dir.join(results_file_name(now));
    let data = format_splits(splits)?;

    fs::create_dir_all(dir)
        .and_then(|_| fs::write(&path, data))
        .map_err(|source| SplitsError::Write {
            path: path.clone(),
            source,
        })?;

    info!("saved {} splits to {}", splits.len(), path.display());
    Ok(path)
}
