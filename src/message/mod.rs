//! Message records
//!
//! The matcher reads messages through the [`MessageRecord`] trait so any mail
//! store can back it. [`MessageInfo`] is a plain owned record used by the CLI
//! and tests; it can be loaded from JSON or CSV files.

pub mod error;
pub mod loader;

pub use error::MessageError;
pub use loader::{MessageFormat, load_messages, parse_csv, parse_json};

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status flags of a message
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageFlags {
    pub unread: bool,
    pub new: bool,
    pub marked: bool,
    pub deleted: bool,
    pub replied: bool,
    pub forwarded: bool,
    pub locked: bool,
}

/// Read-only view of a message as the matcher needs it
///
/// Header accessors return `None` when the header is absent; the matcher
/// treats absence as an empty value.
pub trait MessageRecord {
    fn subject(&self) -> Option<&str>;
    fn from(&self) -> Option<&str>;
    fn to(&self) -> Option<&str>;
    fn cc(&self) -> Option<&str>;
    fn newsgroups(&self) -> Option<&str>;
    fn in_reply_to(&self) -> Option<&str>;
    fn references(&self) -> Option<&str>;
    fn x_label(&self) -> Option<&str>;
    fn message_id(&self) -> Option<&str>;

    /// Value of an arbitrary header, matched case-insensitively by name
    fn header(&self, name: &str) -> Option<&str>;

    /// The complete header block, one `Name: value` per line
    fn raw_headers(&self) -> Cow<'_, str>;

    fn body(&self) -> Option<&str>;

    /// Size of the message in bytes
    fn size(&self) -> u64;

    fn score(&self) -> i64;

    fn date(&self) -> Option<DateTime<Utc>>;

    fn flags(&self) -> MessageFlags;

    /// Location of the message file, substituted for `%F` in commands
    fn file_path(&self) -> Option<&Path>;
}

/// An owned message record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageInfo {
    pub subject: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub cc: Option<String>,
    pub newsgroups: Option<String>,
    pub in_reply_to: Option<String>,
    pub references: Option<String>,
    pub x_label: Option<String>,
    pub message_id: Option<String>,
    /// Headers without a dedicated field
    pub headers: BTreeMap<String, String>,
    pub body: Option<String>,
    pub size: u64,
    pub score: i64,
    pub date: Option<DateTime<Utc>>,
    pub flags: MessageFlags,
    pub file: Option<PathBuf>,
}

impl MessageInfo {
    /// The dedicated header fields paired with their canonical names
    fn known_headers(&self) -> [(&'static str, Option<&str>); 9] {
        [
            ("Subject", self.subject.as_deref()),
            ("From", self.from.as_deref()),
            ("To", self.to.as_deref()),
            ("Cc", self.cc.as_deref()),
            ("Newsgroups", self.newsgroups.as_deref()),
            ("In-Reply-To", self.in_reply_to.as_deref()),
            ("References", self.references.as_deref()),
            ("X-Label", self.x_label.as_deref()),
            ("Message-ID", self.message_id.as_deref()),
        ]
    }

    /// Short one-line description used in listings
    #[must_use]
    pub fn summary(&self) -> String {
        let id = self.message_id.as_deref().unwrap_or("-");
        let subject = self.subject.as_deref().unwrap_or("(no subject)");
        format!("{id}  {subject}")
    }
}

impl MessageRecord for MessageInfo {
    fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    fn from(&self) -> Option<&str> {
        self.from.as_deref()
    }

    fn to(&self) -> Option<&str> {
        self.to.as_deref()
    }

    fn cc(&self) -> Option<&str> {
        self.cc.as_deref()
    }

    fn newsgroups(&self) -> Option<&str> {
        self.newsgroups.as_deref()
    }

    fn in_reply_to(&self) -> Option<&str> {
        self.in_reply_to.as_deref()
    }

    fn references(&self) -> Option<&str> {
        self.references.as_deref()
    }

    fn x_label(&self) -> Option<&str> {
        self.x_label.as_deref()
    }

    fn message_id(&self) -> Option<&str> {
        self.message_id.as_deref()
    }

    fn header(&self, name: &str) -> Option<&str> {
        if let Some((_, value)) = self
            .known_headers()
            .into_iter()
            .find(|(known, _)| known.eq_ignore_ascii_case(name))
        {
            return value;
        }
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    fn raw_headers(&self) -> Cow<'_, str> {
        let mut out = String::new();
        for (name, value) in self.known_headers() {
            if let Some(value) = value {
                out.push_str(name);
                out.push_str(": ");
                out.push_str(value);
                out.push('\n');
            }
        }
        for (name, value) in &self.headers {
            out.push_str(name);
            out.push_str(": ");
            out.push_str(value);
            out.push('\n');
        }
        Cow::Owned(out)
    }

    fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn score(&self) -> i64 {
        self.score
    }

    fn date(&self) -> Option<DateTime<Utc>> {
        self.date
    }

    fn flags(&self) -> MessageFlags {
        self.flags
    }

    fn file_path(&self) -> Option<&Path> {
        self.file.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> MessageInfo {
        let mut headers = BTreeMap::new();
        headers.insert("X-Mailer".to_string(), "mutt 2.2".to_string());
        MessageInfo {
            subject: Some("Hello".into()),
            from: Some("alice@example.com".into()),
            headers,
            ..Default::default()
        }
    }

    #[test]
    fn test_header_lookup_known_and_extra() {
        let msg = message();
        assert_eq!(msg.header("subject"), Some("Hello"));
        assert_eq!(msg.header("x-mailer"), Some("mutt 2.2"));
        assert_eq!(msg.header("To"), None);
        assert_eq!(msg.header("X-Missing"), None);
    }

    #[test]
    fn test_raw_headers_block() {
        let raw = message().raw_headers().into_owned();
        assert_eq!(
            raw,
            "Subject: Hello\nFrom: alice@example.com\nX-Mailer: mutt 2.2\n"
        );
    }

    #[test]
    fn test_summary() {
        assert_eq!(message().summary(), "-  Hello");
    }

    #[test]
    fn test_deserialize_partial_json() {
        let msg: MessageInfo =
            serde_json::from_str(r#"{"subject":"Hi","size":42,"flags":{"unread":true}}"#).unwrap();
        assert_eq!(msg.subject(), Some("Hi"));
        assert_eq!(msg.size(), 42);
        assert!(msg.flags().unread);
        assert!(!msg.flags().marked);
    }
}
