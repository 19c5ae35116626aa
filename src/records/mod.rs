// record file protocol:
// a csv file whose first line is exactly `name,interests`
// one row per registered user, interests stored trimmed and lower-cased
//
// rows are only ever appended; readers always re-read the whole file

pub mod synthetic;
pub mod validate;

use crate::error::MatchError;
use crate::recommend::interest_tokens;
use anyhow::Result;
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader};
use std::path::Path;

pub const HEADER: [&str; 2] = ["name", "interests"];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub name: String,
    pub interests: String,
}

impl Record {
    pub fn new(name: impl Into<String>, interests: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            interests: interests.into(),
        }
    }
}

/// Creates the record file with its header, or rewrites the header when the
/// first line is anything else. Returns true when the file was (re)written.
pub fn initialize(path: &Path) -> Result<bool> {
    if path.exists() {
        let mut first_line = String::new();
        BufReader::new(fs::File::open(path)?).read_line(&mut first_line)?;
        if first_line.trim() == HEADER.join(",") {
            return Ok(false);
        }
        write_header(path)?;
        warn!("reset {} with correct headers", path.display());
    } else {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        write_header(path)?;
        info!("created {} with headers", path.display());
    }
    Ok(true)
}

fn write_header(path: &Path) -> Result<()> {
    let mut writer = WriterBuilder::new().from_path(path)?;
    writer.write_record(HEADER)?;
    writer.flush()?;
    Ok(())
}

/// Reads every row of the record file.
///
/// Short rows yield empty fields, the store decides whether to keep them.
pub fn read_all(path: &Path) -> Result<Vec<Record>, MatchError> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| MatchError::unavailable(path, e))?;
    let headers = reader
        .headers()
        .map_err(|e| MatchError::unavailable(path, e))?
        .clone();
    let name_index = find_column(&headers, "name")
        .ok_or_else(|| MatchError::unavailable(path, "missing required header 'name'"))?;
    let interests_index = find_column(&headers, "interests")
        .ok_or_else(|| MatchError::unavailable(path, "missing required header 'interests'"))?;

    let mut records = vec![];
    for result in reader.records() {
        let row = result.map_err(|e| MatchError::unavailable(path, e))?;
        records.push(Record {
            name: row.get(name_index).unwrap_or_default().to_string(),
            interests: row.get(interests_index).unwrap_or_default().to_string(),
        });
    }
    debug!("read {} records from {}", records.len(), path.display());
    Ok(records)
}

fn find_column(headers: &StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h.trim() == name)
}

/// Appends one row, storing the interests trimmed and lower-cased.
pub fn append(path: &Path, name: &str, interests: &str) -> Result<Record> {
    let record = Record::new(name.trim(), normalize_line(interests));
    let file = OpenOptions::new().append(true).open(path)?;
    let mut writer = WriterBuilder::new().from_writer(file);
    writer.write_record([&record.name, &record.interests])?;
    writer.flush()?;
    info!("saved to {}: {}, {}", path.display(), record.name, record.interests);
    Ok(record)
}

fn normalize_line(interests: &str) -> String {
    interest_tokens(interests).collect::<Vec<_>>().join(",")
}
