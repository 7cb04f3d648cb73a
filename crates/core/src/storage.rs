//! JSON persistence for run collections
//!
//! A stored file holds one JSON array of runs, read and written whole
//! (no streaming).

use crate::data::Run;
use crate::error::{Error, Result};
use std::io::{Read, Write};
use std::path::Path;

/// Read the run array stored at `path`.
pub fn read_runs(path: &Path) -> Result<Vec<Run>> {
    let file = std::fs::File::open(path).map_err(|e| Error::FileRead {
        path: path.display().to_string(),
        source: e,
    })?;
    decode_runs(file)
}

/// Decode a run array from a reader.
pub fn decode_runs(reader: impl Read) -> Result<Vec<Run>> {
    let runs = serde_json::from_reader(reader)?;
    Ok(runs)
}

/// Write the run array to `path`, replacing any existing content.
pub fn write_runs(path: &Path, runs: &[Run]) -> Result<()> {
    let file = std::fs::File::create(path).map_err(|e| Error::FileWrite {
        path: path.display().to_string(),
        source: e,
    })?;
    encode_runs(file, runs)
}

/// Encode a run array as pretty-printed JSON, with a trailing newline.
pub fn encode_runs(mut writer: impl Write, runs: &[Run]) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, runs)?;
    writer.write_all(b"\n")?;
    Ok(())
}

/// Append or write a single run. In append mode the existing file's runs
/// are kept in front; a missing or unreadable file starts a fresh list.
pub fn write_run_to_file(path: &Path, run: &Run, append: bool) -> Result<()> {
    let mut runs = Vec::new();

    if append {
        if let Ok(existing) = read_runs(path) {
            runs = existing;
        }
    }

    runs.push(run.clone());
    write_runs(path, &runs)
}
