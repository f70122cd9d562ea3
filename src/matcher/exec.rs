//! External command execution for the `X` criterion
//!
//! Commands run through `sh -c` after placeholder substitution. Substituted
//! values are inserted verbatim; quoting them is up to the rule author.

use std::io;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::Duration;

use wait_timeout::ChildExt;

use crate::message::MessageRecord;

/// Runs a shell command and reports its exit code
///
/// Implementations must be shareable across threads so a single evaluator can
/// be used from a worker pool.
pub trait CommandRunner: Send + Sync {
    /// Run `command` to completion
    ///
    /// Returns the exit code, or `None` if the process was killed by a signal.
    ///
    /// # Errors
    /// Returns an `io::Error` if the process cannot be spawned or, when a
    /// timeout is given, if it does not finish in time
    /// (`io::ErrorKind::TimedOut`).
    fn run(&self, command: &str, timeout: Option<Duration>) -> io::Result<Option<i32>>;
}

/// Runs commands with `sh -c`, discarding their output
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellRunner;

impl CommandRunner for ShellRunner {
    fn run(&self, command: &str, timeout: Option<Duration>) -> io::Result<Option<i32>> {
        let mut child = Command::new("sh")
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        let Some(limit) = timeout else {
            return Ok(child.wait()?.code());
        };

        let waited = child.wait_timeout(limit);
        settle(&mut child, waited, limit)
    }
}

/// Turn the outcome of a bounded wait into an exit code
///
/// The child is killed and reaped unless it has already exited.
fn settle(
    child: &mut Child,
    waited: io::Result<Option<ExitStatus>>,
    limit: Duration,
) -> io::Result<Option<i32>> {
    let err = match waited {
        Ok(Some(status)) => return Ok(status.code()),
        Ok(None) => io::Error::new(
            io::ErrorKind::TimedOut,
            format!("command did not finish within {}s", limit.as_secs_f32()),
        ),
        Err(e) => e,
    };

    let _ = child.kill();
    let _ = child.wait();
    Err(err)
}

/// Substitute message placeholders into a command template
///
/// | Placeholder | Value |
/// |---|---|
/// | `%%` | a literal `%` |
/// | `%s` | subject |
/// | `%f` | from |
/// | `%t` | to |
/// | `%c` | cc |
/// | `%d` | date, RFC 2822 |
/// | `%i` | message-id |
/// | `%n` | newsgroups |
/// | `%r` | references |
/// | `%F` | message file path |
///
/// Missing values substitute as empty strings. Unknown placeholders are left
/// as written.
pub fn build_command<M: MessageRecord + ?Sized>(template: &str, message: &M) -> String {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        let Some(&code) = chars.peek() else {
            out.push('%');
            break;
        };
        let value = match code {
            '%' => Some("%".to_string()),
            's' => Some(message.subject().unwrap_or_default().to_string()),
            'f' => Some(message.from().unwrap_or_default().to_string()),
            't' => Some(message.to().unwrap_or_default().to_string()),
            'c' => Some(message.cc().unwrap_or_default().to_string()),
            'd' => Some(message.date().map(|d| d.to_rfc2822()).unwrap_or_default()),
            'i' => Some(message.message_id().unwrap_or_default().to_string()),
            'n' => Some(message.newsgroups().unwrap_or_default().to_string()),
            'r' => Some(message.references().unwrap_or_default().to_string()),
            'F' => Some(
                message
                    .file_path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default(),
            ),
            _ => None,
        };
        match value {
            Some(value) => {
                chars.next();
                out.push_str(&value);
            }
            None => out.push('%'),
        }
    }

    out
}
