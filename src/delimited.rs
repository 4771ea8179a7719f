//! The semicolon-delimited CSV dialect shared by backups and reports.
//!
//! Records end in CRLF. A field is quoted, with inner quotes doubled, only when it contains the
//! delimiter, a quote, or a line break.

use crate::Result;
use anyhow::{anyhow, Context};

pub(crate) const DELIMITER: char = ';';
pub(crate) const EOL: &str = "\r\n";

/// Writes records in this dialect. Records may have different lengths.
pub(crate) fn write_records<I, R, F>(records: I) -> Result<String>
where
    I: IntoIterator<Item = R>,
    R: IntoIterator<Item = F>,
    F: AsRef<[u8]>,
{
    let mut writer = csv::WriterBuilder::new()
        .delimiter(DELIMITER as u8)
        .terminator(csv::Terminator::CRLF)
        .quote_style(csv::QuoteStyle::Necessary)
        .flexible(true)
        .from_writer(Vec::new());
    for record in records {
        writer
            .write_record(record)
            .context("Unable to write CSV record")?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow!("Unable to flush CSV output: {}", e.error()))?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}

/// Splits text into records, each paired with the 1-based line it starts on.
///
/// A record ends at `\r\n`, `\n` or `\r` outside quotes. Line breaks inside a quoted field
/// belong to the field and are kept as written.
pub(crate) fn split_records(text: &str) -> Vec<(usize, &str)> {
    let mut records = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;
    let mut line = 1;
    let mut record_line = 1;
    let mut chars = text.char_indices().peekable();

    while let Some((ix, c)) = chars.next() {
        match c {
            // a doubled quote toggles twice
            '"' => in_quotes = !in_quotes,
            '\r' | '\n' => {
                let mut next = ix + 1;
                if c == '\r' && chars.peek().is_some_and(|&(_, n)| n == '\n') {
                    let _ = chars.next();
                    next += 1;
                }
                line += 1;
                if !in_quotes {
                    records.push((record_line, &text[start..ix]));
                    start = next;
                    record_line = line;
                }
            }
            _ => {}
        }
    }
    records.push((record_line, &text[start..]));
    records
}

/// Splits one line into fields.
///
/// A quote toggles quoted mode; inside quotes a doubled quote is a literal quote and the
/// delimiter is literal text.
pub(crate) fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                let _ = chars.next();
            }
            '"' => in_quotes = !in_quotes,
            DELIMITER if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

/// Trims a metadata value and, when it is wrapped in quotes, removes them and undoubles inner
/// quotes.
pub(crate) fn unquote(value: &str) -> String {
    let value = value.trim();
    match value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
    {
        Some(inner) => inner.replace("\"\"", "\""),
        None => value.to_string(),
    }
}
