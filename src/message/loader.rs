//! Message file loading
//!
//! JSON files hold an array of [`MessageInfo`] objects. CSV files need a
//! header row; known column names map to fields, flag columns accept
//! `true/false/1/0/yes/no`, and every other column becomes an extra header.

use std::path::Path;

use chrono::{DateTime, Utc};

use super::{MessageError, MessageInfo};

/// Input format of a message file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageFormat {
    Json,
    /// Delimited text with the given single-byte separator
    Csv(u8),
}

impl MessageFormat {
    /// Guess the format from a file extension, defaulting to JSON
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => Self::Csv(b','),
            Some(ext) if ext.eq_ignore_ascii_case("tsv") => Self::Csv(b'\t'),
            _ => Self::Json,
        }
    }
}

/// Read and parse a message file
///
/// # Errors
/// Returns `MessageError` if the file cannot be read or is malformed.
pub fn load_messages(path: &Path, format: MessageFormat) -> Result<Vec<MessageInfo>, MessageError> {
    let content = std::fs::read_to_string(path)?;
    let messages = match format {
        MessageFormat::Json => parse_json(&content)?,
        MessageFormat::Csv(delimiter) => parse_csv(&content, delimiter)?,
    };
    tracing::debug!(path = %path.display(), count = messages.len(), "loaded messages");
    Ok(messages)
}

/// # Errors
/// Returns `MessageError::Json` if the content is not an array of messages.
pub fn parse_json(content: &str) -> Result<Vec<MessageInfo>, MessageError> {
    Ok(serde_json::from_str(content)?)
}

/// # Errors
/// Returns `MessageError::Csv` for unreadable records or bad field values.
pub fn parse_csv(content: &str, delimiter: u8) -> Result<Vec<MessageInfo>, MessageError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(content.as_bytes());

    let columns: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    let mut messages = Vec::new();

    for (i, result) in rdr.records().enumerate() {
        let record = result?;
        let row = i + 1;
        let mut msg = MessageInfo::default();

        for (column, value) in columns.iter().zip(record.iter()) {
            if value.is_empty() {
                continue;
            }
            apply_column(&mut msg, column, value).map_err(|message| MessageError::Csv {
                record: row,
                message,
            })?;
        }
        messages.push(msg);
    }

    Ok(messages)
}

fn apply_column(msg: &mut MessageInfo, column: &str, value: &str) -> Result<(), String> {
    let key = column.trim().to_ascii_lowercase().replace('-', "_");
    let text = || Some(value.to_string());

    match key.as_str() {
        "subject" => msg.subject = text(),
        "from" => msg.from = text(),
        "to" => msg.to = text(),
        "cc" => msg.cc = text(),
        "newsgroups" => msg.newsgroups = text(),
        "in_reply_to" => msg.in_reply_to = text(),
        "references" => msg.references = text(),
        "x_label" => msg.x_label = text(),
        "message_id" => msg.message_id = text(),
        "body" => msg.body = text(),
        "file" => msg.file = Some(value.into()),
        "size" => {
            msg.size = value
                .trim()
                .parse()
                .map_err(|_| format!("invalid size '{value}'"))?;
        }
        "score" => {
            msg.score = value
                .trim()
                .parse()
                .map_err(|_| format!("invalid score '{value}'"))?;
        }
        "date" => msg.date = Some(parse_date(value)?),
        "unread" => msg.flags.unread = parse_flag(value)?,
        "new" => msg.flags.new = parse_flag(value)?,
        "marked" => msg.flags.marked = parse_flag(value)?,
        "deleted" => msg.flags.deleted = parse_flag(value)?,
        "replied" => msg.flags.replied = parse_flag(value)?,
        "forwarded" => msg.flags.forwarded = parse_flag(value)?,
        "locked" => msg.flags.locked = parse_flag(value)?,
        _ => {
            msg.headers.insert(column.trim().to_string(), value.to_string());
        }
    }
    Ok(())
}

fn parse_flag(value: &str) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => Ok(true),
        "false" | "0" | "no" | "n" => Ok(false),
        _ => Err(format!("invalid flag value '{value}'")),
    }
}

/// Accepts RFC 3339 and RFC 2822 dates
fn parse_date(value: &str) -> Result<DateTime<Utc>, String> {
    let value = value.trim();
    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_rfc2822(value))
        .map(|d| d.with_timezone(&Utc))
        .map_err(|_| format!("invalid date '{value}'"))
}
