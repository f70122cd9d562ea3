use std::time::Duration;

use chrono::{DateTime, Utc};
use rayon::prelude::*;

use super::exec::{CommandRunner, ShellRunner, build_command};
use super::types::{Criterion, MatchType, Predicate, PredicateList};
use crate::message::MessageRecord;

/// Evaluates predicate lists against messages
///
/// Holds the reference time for age comparisons and the runner used by the
/// `X` criterion. Evaluation never fails: every message gets a definite
/// verdict, and problems inside a condition make that condition false.
#[derive(Clone, Copy)]
pub struct Evaluator<'r> {
    now: DateTime<Utc>,
    runner: &'r dyn CommandRunner,
    exec_timeout: Option<Duration>,
}

impl<'r> Evaluator<'r> {
    #[must_use]
    pub fn new(runner: &'r dyn CommandRunner) -> Self {
        Self {
            now: Utc::now(),
            runner,
            exec_timeout: None,
        }
    }

    /// Use a fixed reference time for age comparisons
    #[must_use]
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    /// Limit how long a single `X` command may run; `None` waits forever
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.exec_timeout = timeout;
        self
    }

    /// Evaluate a list, stopping at the first predicate that decides it
    pub fn evaluate<M: MessageRecord + ?Sized>(&self, list: &PredicateList, message: &M) -> bool {
        let mut verdicts = list
            .predicates()
            .iter()
            .map(|p| self.evaluate_predicate(p, message));
        if list.combine_with_and() {
            verdicts.all(|v| v)
        } else {
            verdicts.any(|v| v)
        }
    }

    /// Evaluate one predicate, applying its NOT variant
    pub fn evaluate_predicate<M: MessageRecord + ?Sized>(&self, predicate: &Predicate, message: &M) -> bool {
        let verdict = self.check(predicate, message);
        if predicate.has_error() {
            return false;
        }
        verdict != predicate.is_negated()
    }

    /// Messages matching `list`, in input order
    pub fn filter<'m, M>(&self, list: &PredicateList, messages: &'m [M]) -> Vec<&'m M>
    where
        M: MessageRecord,
    {
        messages.iter().filter(|m| self.evaluate(list, *m)).collect()
    }

    /// Like [`Evaluator::filter`], spread across the rayon thread pool
    pub fn par_filter<'m, M>(&self, list: &PredicateList, messages: &'m [M]) -> Vec<&'m M>
    where
        M: MessageRecord + Sync,
    {
        messages
            .par_iter()
            .filter(|m| self.evaluate(list, *m))
            .collect()
    }

    fn check<M: MessageRecord + ?Sized>(&self, p: &Predicate, msg: &M) -> bool {
        match p.criterion() {
            Criterion::All => true,
            Criterion::Subject => match_text(p, msg.subject().unwrap_or_default()),
            Criterion::From => match_text(p, msg.from().unwrap_or_default()),
            Criterion::To => match_text(p, msg.to().unwrap_or_default()),
            Criterion::Cc => match_text(p, msg.cc().unwrap_or_default()),
            Criterion::ToOrCc => {
                match_text(p, msg.to().unwrap_or_default())
                    || match_text(p, msg.cc().unwrap_or_default())
            }
            Criterion::Newsgroup => match_text(p, msg.newsgroups().unwrap_or_default()),
            Criterion::InReplyTo => match_text(p, msg.in_reply_to().unwrap_or_default()),
            Criterion::References => match_text(p, msg.references().unwrap_or_default()),
            Criterion::MessageId => match_text(p, msg.message_id().unwrap_or_default()),
            Criterion::XLabel => match_text(p, msg.x_label().unwrap_or_default()),
            Criterion::Header(name) => match_text(p, msg.header(name).unwrap_or_default()),
            Criterion::HeaderPart => match_text(p, &msg.raw_headers()),
            Criterion::BodyPart => match_text(p, msg.body().unwrap_or_default()),
            Criterion::Message => {
                let whole = format!("{}\n{}", msg.raw_headers(), msg.body().unwrap_or_default());
                match_text(p, &whole)
            }
            Criterion::Execute => self.execute(p, msg),
            Criterion::AgeGreater => self.age_days(msg) > number(p),
            Criterion::AgeLower => self.age_days(msg) < number(p),
            Criterion::ScoreGreater => msg.score() > number(p),
            Criterion::ScoreLower => msg.score() < number(p),
            Criterion::ScoreEqual => msg.score() == number(p),
            Criterion::SizeGreater => size(msg) > number(p),
            Criterion::SizeSmaller => size(msg) < number(p),
            Criterion::SizeEqual => size(msg) == number(p),
            Criterion::Unread => msg.flags().unread,
            Criterion::New => msg.flags().new,
            Criterion::Marked => msg.flags().marked,
            Criterion::Deleted => msg.flags().deleted,
            Criterion::Replied => msg.flags().replied,
            Criterion::Forwarded => msg.flags().forwarded,
            Criterion::Locked => msg.flags().locked,
        }
    }

    /// Whole days since the message date; undated messages are age 0
    fn age_days<M: MessageRecord + ?Sized>(&self, msg: &M) -> i64 {
        msg.date().map_or(0, |date| (self.now - date).num_days())
    }

    fn execute<M: MessageRecord + ?Sized>(&self, p: &Predicate, msg: &M) -> bool {
        let Some(template) = p.string_operand() else {
            return false;
        };
        let command = build_command(template, msg);

        match self.runner.run(&command, self.exec_timeout) {
            Ok(Some(0)) => true,
            Ok(code) => {
                tracing::debug!(command = %command, ?code, "rule command did not succeed");
                false
            }
            Err(e) => {
                tracing::warn!(command = %command, error = %e, "failed to run rule command");
                false
            }
        }
    }
}

fn match_text(p: &Predicate, haystack: &str) -> bool {
    let Some(needle) = p.string_operand() else {
        return false;
    };
    match p.match_type() {
        MatchType::CaseSensitiveLiteral => haystack.contains(needle),
        MatchType::CaseInsensitiveLiteral => {
            haystack.to_lowercase().contains(&needle.to_lowercase())
        }
        MatchType::Regex | MatchType::RegexCaseInsensitive => {
            p.compiled_regex().is_some_and(|re| re.is_match(haystack))
        }
    }
}

fn number(p: &Predicate) -> i64 {
    p.numeric_operand().unwrap_or_default()
}

fn size<M: MessageRecord + ?Sized>(msg: &M) -> i64 {
    i64::try_from(msg.size()).unwrap_or(i64::MAX)
}

/// Messages matching `list`, in input order, optionally evaluated in parallel
pub fn filter_messages<'m, M>(
    evaluator: &Evaluator<'_>,
    list: &PredicateList,
    messages: &'m [M],
    parallel: bool,
) -> Vec<&'m M>
where
    M: MessageRecord + Sync,
{
    if parallel {
        evaluator.par_filter(list, messages)
    } else {
        evaluator.filter(list, messages)
    }
}

impl PredicateList {
    /// Evaluate against `message` with the current time and `sh -c` for
    /// command conditions
    pub fn matches<M: MessageRecord + ?Sized>(&self, message: &M) -> bool {
        Evaluator::new(&ShellRunner).evaluate(self, message)
    }
}
