//! Testing utilities for mailmatch
//!
//! Provides a fully populated sample message and a [`CommandRunner`] that
//! records commands instead of running them.
//!
//! Only available when compiled with `cfg(test)`.

use std::collections::BTreeMap;
use std::io;
use std::sync::Mutex;
use std::time::Duration;

use chrono::{TimeZone, Utc};

use crate::matcher::CommandRunner;
use crate::message::{MessageFlags, MessageInfo};

/// Unread, marked message with every header set
#[must_use]
pub fn sample_message() -> MessageInfo {
    let mut headers = BTreeMap::new();
    headers.insert("X-Mailer".to_string(), "mutt 2.2".to_string());

    MessageInfo {
        subject: Some("Quarterly numbers".to_string()),
        from: Some("Carol <carol@example.com>".to_string()),
        to: Some("team@example.com".to_string()),
        cc: Some("boss@example.com".to_string()),
        newsgroups: Some("comp.lang.rust".to_string()),
        in_reply_to: Some("<parent@example.com>".to_string()),
        references: Some("<root@example.com> <parent@example.com>".to_string()),
        x_label: Some("work".to_string()),
        message_id: Some("<msg-1@example.com>".to_string()),
        headers,
        body: Some("Numbers attached.\nRegards".to_string()),
        size: 2048,
        score: 10,
        date: Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).single(),
        flags: MessageFlags {
            unread: true,
            marked: true,
            ..Default::default()
        },
        file: Some("/tmp/mail/1".into()),
    }
}

enum Outcome {
    Exit(i32),
    SpawnError,
}

/// Records every command it is asked to run and answers with a fixed result
pub struct RecordingRunner {
    outcome: Outcome,
    commands: Mutex<Vec<String>>,
}

impl RecordingRunner {
    /// Every command exits with status 0
    #[must_use]
    pub fn succeeding() -> Self {
        Self::with_exit_code(0)
    }

    #[must_use]
    pub fn with_exit_code(code: i32) -> Self {
        Self {
            outcome: Outcome::Exit(code),
            commands: Mutex::new(Vec::new()),
        }
    }

    /// Every command fails to spawn
    #[must_use]
    pub fn spawn_error() -> Self {
        Self {
            outcome: Outcome::SpawnError,
            commands: Mutex::new(Vec::new()),
        }
    }

    /// Commands received so far, in order
    ///
    /// # Panics
    /// Panics if the lock was poisoned by a panicking test thread.
    #[must_use]
    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, command: &str, _timeout: Option<Duration>) -> io::Result<Option<i32>> {
        self.commands.lock().unwrap().push(command.to_string());
        match self.outcome {
            Outcome::Exit(code) => Ok(Some(code)),
            Outcome::SpawnError => Err(io::Error::new(io::ErrorKind::NotFound, "no such command")),
        }
    }
}
