//! Encodes a salesperson's data as a versioned backup CSV and decodes it back.
//!
//! ```text
//! SalespersonID;Handlowiec 1
//! BackupVersion;1.0
//! BackupTimestamp;2025-06-03T10:15:30.000Z
//! ---DATA_START---
//! YEAR;MONTH_IDX;DAY;SOURCE_KEY;COUNT;NOTE
//! 2025;5;3;FACEBOOK;2;
//! ---DATA_END---
//! ```
//!
//! Decoding is best effort: rows that cannot be understood are reported in
//! [`Decoded::skipped`] and the rest of the document is still restored. Only missing
//! `SalespersonID` or `BackupVersion` metadata fails the whole decode.

use crate::delimited::{split_fields, split_records, unquote, write_records, DELIMITER};
use crate::error::{ErrorType, IntoResult};
use crate::model::{insert_cell, DayKey, SalespersonData, Source, SourceEntry};
use crate::Result;
use anyhow::anyhow;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use tracing::{debug, warn};

/// The format version written into new backups.
pub const BACKUP_VERSION: &str = "1.0";

const SALESPERSON_ID: &str = "SalespersonID";
const VERSION: &str = "BackupVersion";
const TIMESTAMP: &str = "BackupTimestamp";
const DATA_START: &str = "---DATA_START---";
const DATA_END: &str = "---DATA_END---";
const HEADER: [&str; 6] = ["YEAR", "MONTH_IDX", "DAY", "SOURCE_KEY", "COUNT", "NOTE"];

/// Encodes every stored entry of `data` as a backup document stamped with `timestamp`.
///
/// Rows are ordered by year, month, day and then source declaration order.
pub fn encode(
    salesperson_id: &str,
    data: &SalespersonData,
    timestamp: DateTime<Utc>,
) -> Result<String> {
    let timestamp = timestamp.to_rfc3339_opts(SecondsFormat::Millis, true);
    let mut records: Vec<Vec<String>> = vec![
        vec![SALESPERSON_ID.to_string(), salesperson_id.to_string()],
        vec![VERSION.to_string(), BACKUP_VERSION.to_string()],
        vec![TIMESTAMP.to_string(), timestamp],
        vec![DATA_START.to_string()],
        HEADER.iter().map(|h| h.to_string()).collect(),
    ];

    for (year, year_data) in data {
        for (month, month_data) in year_data {
            for (day, day_data) in month_data {
                for (source, entry) in day_data {
                    records.push(vec![
                        year.to_string(),
                        month.to_string(),
                        day.to_string(),
                        source.key().to_string(),
                        entry.count.to_string(),
                        entry.note.clone(),
                    ]);
                }
            }
        }
    }
    records.push(vec![DATA_END.to_string()]);

    write_records(records).pub_result(ErrorType::BackupEncode)
}

/// The result of decoding a backup document.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Decoded {
    pub salesperson_id: String,
    pub version: String,
    /// The `BackupTimestamp` metadata, when present. Not interpreted.
    pub timestamp: Option<String>,
    pub data: SalespersonData,
    /// Number of data rows that were folded into `data`.
    pub restored_rows: usize,
    pub skipped: Vec<SkippedRow>,
}

/// A data row that was left out of the decoded data.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct SkippedRow {
    /// 1-based line number within the document.
    pub line: usize,
    pub text: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The row did not split into exactly six fields.
    FieldCount(usize),
    UnknownSource(String),
    InvalidNumber { column: &'static str, value: String },
}

impl Display for SkipReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::FieldCount(n) => write!(f, "expected 6 fields, found {n}"),
            SkipReason::UnknownSource(key) => write!(f, "unknown source key '{key}'"),
            SkipReason::InvalidNumber { column, value } => {
                write!(f, "{column} is not a valid number: '{value}'")
            }
        }
    }
}

/// Decodes a backup document.
///
/// Blank lines are ignored anywhere. Lines outside the data section are `key;value` metadata.
/// The first line after `---DATA_START---` is the column header and is discarded unread. A
/// quoted field may span several lines, so a note keeps its line breaks.
///
/// # Errors
/// - `SalespersonID` metadata is missing or empty.
/// - `BackupVersion` metadata is missing or empty.
pub fn decode(text: &str) -> Result<Decoded> {
    let mut metadata: BTreeMap<String, String> = BTreeMap::new();
    let mut rows: Vec<(usize, &str)> = Vec::new();
    let mut skipped: Vec<SkippedRow> = Vec::new();
    let mut in_data = false;
    let mut header_skipped = false;

    for (line_no, line) in split_records(text) {
        if line.trim().is_empty() {
            continue;
        }
        if line.starts_with(DATA_START) {
            in_data = true;
            header_skipped = false;
            continue;
        }
        if line.starts_with(DATA_END) {
            in_data = false;
            continue;
        }

        if in_data {
            if header_skipped {
                rows.push((line_no, line));
            } else {
                header_skipped = true;
            }
        } else {
            match line.split_once(DELIMITER) {
                Some((key, value)) => {
                    let _ = metadata.insert(key.trim().to_string(), unquote(value));
                }
                None => warn!("Skipping malformed metadata line {line_no}: '{line}'"),
            }
        }
    }

    let salesperson_id = required(&metadata, SALESPERSON_ID)?;
    let version = required(&metadata, VERSION)?;
    let timestamp = metadata.get(TIMESTAMP).cloned();

    let mut data = SalespersonData::new();
    let mut restored_rows = 0;
    for (line_no, line) in rows {
        match parse_row(line) {
            Ok((key, source, entry)) => {
                insert_cell(&mut data, key, source, entry);
                restored_rows += 1;
            }
            Err(reason) => {
                warn!("Skipping backup row on line {line_no} ({reason}): '{line}'");
                skipped.push(SkippedRow {
                    line: line_no,
                    text: line.to_string(),
                    reason,
                });
            }
        }
    }

    debug!(
        "Decoded backup for '{salesperson_id}' version {version}: {restored_rows} rows restored, \
        {} rows skipped",
        skipped.len()
    );

    Ok(Decoded {
        salesperson_id,
        version,
        timestamp,
        data,
        restored_rows,
        skipped,
    })
}

fn required(metadata: &BTreeMap<String, String>, key: &str) -> Result<String> {
    metadata
        .get(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| anyhow!("{key} is missing or empty in the backup metadata"))
        .pub_result(ErrorType::BackupDecode)
}

fn parse_row(line: &str) -> std::result::Result<(DayKey, Source, SourceEntry), SkipReason> {
    let mut fields = split_fields(line);
    if fields.len() != HEADER.len() {
        return Err(SkipReason::FieldCount(fields.len()));
    }
    let note = fields.pop().unwrap_or_default();

    let source = Source::from_key(fields[3].trim())
        .ok_or_else(|| SkipReason::UnknownSource(fields[3].clone()))?;
    let year = number(&fields[0], "YEAR")?;
    let month = number(&fields[1], "MONTH_IDX")?;
    let day = number(&fields[2], "DAY")?;
    let count = number(&fields[4], "COUNT")?;

    Ok((DayKey::new(year, month, day), source, SourceEntry::new(count, note)))
}

fn number<T: std::str::FromStr>(
    value: &str,
    column: &'static str,
) -> std::result::Result<T, SkipReason> {
    value.trim().parse().map_err(|_| SkipReason::InvalidNumber {
        column,
        value: value.to_string(),
    })
}
