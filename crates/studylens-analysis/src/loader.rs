//! Loading runs from the log and notes directories.
//!
//! Both directories hold one JSON file per session, named after the session
//! (see [`SessionName`]). Files are joined by name: every log file must have a
//! notes file with the same stem and vice versa.
//!
//! # File Formats
//!
//! Log files are arrays of events. The study tool wrote each event as a
//! JSON-encoded string inside the outer array; plain event objects are
//! accepted too:
//!
//! ```json
//! ["{\"event\":\"feature-add\",\"feature\":\"A\",\"selected\":[],\"time\":0}"]
//! ```
//!
//! Notes files are arrays of note objects:
//!
//! ```json
//! [{"body": "late payments", "state": {"selectedFeatures": ["A", "B"]}}]
//! ```

use std::{
    collections::{BTreeMap, BTreeSet},
    fs::{self, File},
    io::{self, BufReader},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::run::{LogEvent, Note, ParseSessionNameError, Run, SessionName};

/// Participants excluded from the analysis unless configured otherwise.
pub const DEFAULT_EXCLUDED_PARTICIPANTS: [&str; 2] = ["03", "08"];

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum LoadError {
    #[display("failed to read {}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[display("failed to parse {}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[display("failed to parse log entry {index} in {}", path.display())]
    LogEntry {
        path: PathBuf,
        index: usize,
        source: serde_json::Error,
    },
    #[display("{} has no usable file name", path.display())]
    NoFileName { path: PathBuf },
    #[display("invalid session file name {}", path.display())]
    SessionName {
        path: PathBuf,
        source: ParseSessionNameError,
    },
    #[display("log file {} and notes file {} name different sessions", log.display(), notes.display())]
    NameMismatch { log: PathBuf, notes: PathBuf },
    Pairing(PairingError),
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum PairingError {
    #[display("session '{stem}' has a log file but no notes file")]
    MissingNotes { stem: String },
    #[display("session '{stem}' has a notes file but no log file")]
    MissingLog { stem: String },
    #[display("session '{stem}' appears more than once among the {kind} files")]
    Duplicate { stem: String, kind: &'static str },
}

impl From<PairingError> for LoadError {
    fn from(err: PairingError) -> Self {
        LoadError::Pairing(err)
    }
}

/// Log and notes files describing the same session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionFiles {
    pub log: PathBuf,
    pub notes: PathBuf,
}

impl SessionFiles {
    /// Joins log and notes paths by file stem.
    ///
    /// The result is ordered by stem. Input order is irrelevant.
    pub fn pair(log_paths: &[PathBuf], notes_paths: &[PathBuf]) -> Result<Vec<Self>, LoadError> {
        let logs = index_by_stem(log_paths, "log")?;
        let mut notes = index_by_stem(notes_paths, "notes")?;

        let mut pairs = Vec::with_capacity(logs.len());
        for (stem, log) in logs {
            let notes_path = notes
                .remove(&stem)
                .ok_or_else(|| PairingError::MissingNotes { stem: stem.clone() })?;
            pairs.push(SessionFiles {
                log: log.clone(),
                notes: notes_path.clone(),
            });
        }

        if let Some(stem) = notes.into_keys().next() {
            return Err(PairingError::MissingLog { stem }.into());
        }

        Ok(pairs)
    }

    /// Loads the run described by this file pair.
    pub fn load(&self) -> Result<Run, LoadError> {
        let log_stem = file_stem(&self.log)?;
        let notes_stem = file_stem(&self.notes)?;
        if log_stem != notes_stem {
            return Err(LoadError::NameMismatch {
                log: self.log.clone(),
                notes: self.notes.clone(),
            });
        }

        let name = log_stem
            .parse::<SessionName>()
            .map_err(|source| LoadError::SessionName {
                path: self.log.clone(),
                source,
            })?;

        let logs = read_log_file(&self.log)?;
        let notes = read_notes_file(&self.notes)?;
        log::debug!(
            "Loaded session {name}: {} log events, {} notes",
            logs.len(),
            notes.len()
        );

        Ok(Run::new(name, logs, notes))
    }
}

fn file_stem(path: &Path) -> Result<&str, LoadError> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or_else(|| LoadError::NoFileName {
            path: path.to_owned(),
        })
}

fn index_by_stem<'a>(
    paths: &'a [PathBuf],
    kind: &'static str,
) -> Result<BTreeMap<String, &'a PathBuf>, LoadError> {
    let mut map = BTreeMap::new();
    for path in paths {
        let stem = file_stem(path)?.to_owned();
        if map.contains_key(&stem) {
            return Err(PairingError::Duplicate { stem, kind }.into());
        }
        map.insert(stem, path);
    }
    Ok(map)
}

/// Lists the `*.json` files directly inside `dir`, sorted by path.
pub fn list_json_files(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let io_err = |source| LoadError::Io {
        path: dir.to_owned(),
        source,
    };

    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

fn read_json<T>(path: &Path) -> Result<T, LoadError>
where
    T: serde::de::DeserializeOwned,
{
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_owned(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| LoadError::Json {
        path: path.to_owned(),
        source,
    })
}

/// An entry in a log file: either an encoded event string or the event itself.
///
/// Entries are read as raw JSON first and decoded afterwards, so a malformed
/// event reports its own error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "serde_json::Value", into = "serde_json::Value")]
pub enum LogEntry {
    Encoded(String),
    Event(serde_json::Value),
}

impl From<serde_json::Value> for LogEntry {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(text) => LogEntry::Encoded(text),
            value => LogEntry::Event(value),
        }
    }
}

impl From<LogEntry> for serde_json::Value {
    fn from(entry: LogEntry) -> Self {
        match entry {
            LogEntry::Encoded(text) => serde_json::Value::String(text),
            LogEntry::Event(value) => value,
        }
    }
}

impl LogEntry {
    pub fn decode(self) -> Result<LogEvent, serde_json::Error> {
        match self {
            LogEntry::Encoded(text) => serde_json::from_str(&text),
            LogEntry::Event(value) => serde_json::from_value(value),
        }
    }

    /// Encodes an event the way the study tool wrote it.
    pub fn encode(event: &LogEvent) -> Result<Self, serde_json::Error> {
        serde_json::to_string(event).map(LogEntry::Encoded)
    }
}

/// Reads a log file into its events, in file order.
pub fn read_log_file(path: &Path) -> Result<Vec<LogEvent>, LoadError> {
    let entries: Vec<LogEntry> = read_json(path)?;
    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            entry.decode().map_err(|source| LoadError::LogEntry {
                path: path.to_owned(),
                index,
                source,
            })
        })
        .collect()
}

/// Reads a notes file. Blank notes are kept here and dropped by [`Run::new`].
pub fn read_notes_file(path: &Path) -> Result<Vec<Note>, LoadError> {
    read_json(path)
}

/// Loads every run from the log and notes directories.
///
/// Sessions of participants in `excluded` are skipped. Runs are returned in
/// session name order.
pub fn load_runs(
    logs_dir: &Path,
    notes_dir: &Path,
    excluded: &BTreeSet<String>,
) -> Result<Vec<Run>, LoadError> {
    let log_paths = list_json_files(logs_dir)?;
    let notes_paths = list_json_files(notes_dir)?;
    let pairs = SessionFiles::pair(&log_paths, &notes_paths)?;

    let mut runs = Vec::with_capacity(pairs.len());
    for files in &pairs {
        let run = files.load()?;
        if excluded.contains(&run.participant) {
            log::info!(
                "Excluding participant {} ({})",
                run.participant,
                files.log.display()
            );
            continue;
        }
        runs.push(run);
    }
    Ok(runs)
}
