//! Interactive quick search
//!
//! Plain modes do a case-insensitive substring check on one header. The
//! extended mode accepts the full rule language, with a few friendly aliases
//! expanded first. A query that fails to parse disables the search instead of
//! reporting an error, so a half-typed query shows every message.

use std::fmt;
use std::str::FromStr;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::matcher::{
    Arity, Criterion, Evaluator, Lexer, ParseError, PredicateList, ShellRunner, Token, parse_list,
};
use crate::message::MessageRecord;

/// Which part of a message the quick search looks at
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    Subject,
    From,
    To,
    #[default]
    Extended,
}

impl SearchMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Subject => "subject",
            Self::From => "from",
            Self::To => "to",
            Self::Extended => "extended",
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "subject" => Ok(Self::Subject),
            "from" => Ok(Self::From),
            "to" => Ok(Self::To),
            "extended" => Ok(Self::Extended),
            other => Err(format!(
                "unknown search mode '{other}' (expected subject, from, to or extended)"
            )),
        }
    }
}

/// A committed quick-search query
#[derive(Debug, Clone)]
pub struct QuickSearchState {
    raw_input: String,
    mode: SearchMode,
    needle: String,
    compiled: Option<PredicateList>,
    active: bool,
}

impl QuickSearchState {
    /// Build the search state for `raw_input`
    ///
    /// Blank input yields an inactive state. In extended mode an input that
    /// does not parse also yields an inactive state.
    #[must_use]
    pub fn prepare(raw_input: &str, mode: SearchMode) -> Self {
        let trimmed = raw_input.trim();
        let mut state = Self {
            raw_input: raw_input.to_string(),
            mode,
            needle: String::new(),
            compiled: None,
            active: false,
        };
        if trimmed.is_empty() {
            return state;
        }

        match mode {
            SearchMode::Subject | SearchMode::From | SearchMode::To => {
                state.needle = trimmed.to_lowercase();
                state.active = true;
            }
            SearchMode::Extended => {
                match expand_abbreviations(trimmed).and_then(|expanded| parse_list(&expanded)) {
                    Ok(list) => {
                        state.compiled = Some(list);
                        state.active = true;
                    }
                    Err(e) => {
                        tracing::debug!(query = trimmed, error = %e, "quick search disabled");
                    }
                }
            }
        }
        state
    }

    /// Whether `message` passes the search, using the system clock and `sh`
    pub fn matches<M: MessageRecord + ?Sized>(&self, message: &M) -> bool {
        self.matches_with(&Evaluator::new(&ShellRunner), message)
    }

    /// Whether `message` passes the search; inactive searches pass everything
    pub fn matches_with<M: MessageRecord + ?Sized>(&self, evaluator: &Evaluator<'_>, message: &M) -> bool {
        if !self.active {
            return true;
        }
        let field = match self.mode {
            SearchMode::Subject => message.subject(),
            SearchMode::From => message.from(),
            SearchMode::To => message.to(),
            SearchMode::Extended => {
                return self
                    .compiled
                    .as_ref()
                    .is_none_or(|list| evaluator.evaluate(list, message));
            }
        };
        field
            .unwrap_or_default()
            .to_lowercase()
            .contains(&self.needle)
    }

    /// Messages passing the search, in input order
    pub fn filter<'m, M>(&self, evaluator: &Evaluator<'_>, messages: &'m [M], parallel: bool) -> Vec<&'m M>
    where
        M: MessageRecord + Sync,
    {
        if parallel {
            messages
                .par_iter()
                .filter(|m| self.matches_with(evaluator, *m))
                .collect()
        } else {
            messages
                .iter()
                .filter(|m| self.matches_with(evaluator, *m))
                .collect()
        }
    }

    #[must_use]
    pub fn raw_input(&self) -> &str {
        &self.raw_input
    }

    #[must_use]
    pub const fn mode(&self) -> SearchMode {
        self.mode
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// The parsed rule of an active extended search
    #[must_use]
    pub const fn compiled(&self) -> Option<&PredicateList> {
        self.compiled.as_ref()
    }
}

/// Keyword aliases accepted by the extended quick search
const ALIASES: &[(&str, &str)] = &[
    ("O", "~N"),
    ("R", "~U"),
    ("all", "a"),
    ("subject", "s"),
    ("from", "f"),
    ("to", "t"),
    ("cc", "c"),
    ("tocc", "C"),
    ("newsgroup", "n"),
    ("header", "H"),
    ("headers", "h"),
    ("body", "b"),
    ("message", "B"),
    ("unread", "U"),
    ("read", "~U"),
    ("new", "N"),
    ("old", "~N"),
    ("marked", "T"),
    ("deleted", "D"),
    ("replied", "r"),
    ("forwarded", "F"),
    ("locked", "L"),
];

fn resolve_keyword(word: &str) -> Option<&str> {
    if Criterion::from_code(word).is_some() {
        return Some(word);
    }
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == word || (alias.len() > 1 && alias.eq_ignore_ascii_case(word)))
        .map(|(_, code)| *code)
}

#[derive(Clone, Copy)]
enum Expect {
    Keyword,
    HeaderName,
    Operand,
    Operator,
}

/// Rewrite quick-search aliases in keyword position to rule codes
///
/// `O` becomes `~N`, `R` becomes `~U`, and long names such as `subject` or
/// `unread` become their codes. Operands are never touched.
///
/// # Errors
/// Returns `ParseError::UnknownKeyword` for a word in keyword position that
/// is neither a code nor an alias, and `ParseError::Unterminated` for an
/// unclosed quote or pattern. Other malformations are left for the parser.
pub fn expand_abbreviations(input: &str) -> Result<String, ParseError> {
    let mut lexer = Lexer::new(input);
    let mut out = String::with_capacity(input.len());
    let mut copied = 0;
    let mut expect = Expect::Keyword;

    while let Some(spanned) = lexer.next_token()? {
        expect = match (expect, &spanned.token) {
            (Expect::Keyword, Token::Not | Token::CaseSensitive) => Expect::Keyword,
            (Expect::Keyword, Token::Word(word)) => {
                let Some(code) = resolve_keyword(word) else {
                    return Err(ParseError::UnknownKeyword {
                        keyword: word.clone(),
                        position: spanned.start,
                    });
                };
                if code != word.as_str() {
                    out.push_str(&input[copied..spanned.start]);
                    out.push_str(code);
                    copied = spanned.end;
                }
                match Criterion::from_code(code.trim_start_matches('~')) {
                    Some(Criterion::Header(_)) => Expect::HeaderName,
                    Some(criterion) if criterion.arity() == Arity::None => Expect::Operator,
                    _ => Expect::Operand,
                }
            }
            (Expect::HeaderName, _) => Expect::Operand,
            (Expect::Operand, Token::CaseSensitive) => Expect::Operand,
            (Expect::Operand, _) => Expect::Operator,
            (Expect::Operator, Token::And | Token::Or) => Expect::Keyword,
            _ => break,
        };
    }

    out.push_str(&input[copied..]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{MessageFlags, MessageInfo};
    use crate::testing::{RecordingRunner, sample_message};

    #[test]
    fn test_empty_extended_is_inactive_and_matches_everything() {
        let state = QuickSearchState::prepare("   ", SearchMode::Extended);
        assert!(!state.is_active());
        assert!(state.compiled().is_none());
        assert!(state.matches(&MessageInfo::default()));
        assert!(state.matches(&sample_message()));
    }

    #[test]
    fn test_subject_mode_substring() {
        let state = QuickSearchState::prepare("QUARTER", SearchMode::Subject);
        assert!(state.is_active());
        assert!(state.matches(&sample_message()));
        assert!(!state.matches(&MessageInfo::default()));
    }

    #[test]
    fn test_from_and_to_modes() {
        let msg = MessageInfo {
            from: Some("Alice <alice@example.com>".into()),
            to: Some("bob@example.com".into()),
            ..Default::default()
        };
        assert!(QuickSearchState::prepare("alice", SearchMode::From).matches(&msg));
        assert!(!QuickSearchState::prepare("alice", SearchMode::To).matches(&msg));
        assert!(QuickSearchState::prepare("bob@", SearchMode::To).matches(&msg));
    }

    #[test]
    fn test_plain_modes_do_not_parse() {
        let state = QuickSearchState::prepare("s \"unterminated", SearchMode::Subject);
        assert!(state.is_active());
        assert!(state.compiled().is_none());
    }

    #[test]
    fn test_extended_mode_parses_rule() {
        let runner = RecordingRunner::succeeding();
        let evaluator = Evaluator::new(&runner);
        let state = QuickSearchState::prepare("s quarterly & U", SearchMode::Extended);
        assert!(state.is_active());
        assert!(state.matches_with(&evaluator, &sample_message()));
        assert!(!state.matches_with(&evaluator, &MessageInfo::default()));
    }

    #[test]
    fn test_extended_mode_bad_query_disables_search() {
        for query in ["s", "z \"x\"", "s \"open", "U & N | T"] {
            let state = QuickSearchState::prepare(query, SearchMode::Extended);
            assert!(!state.is_active(), "{query}");
            assert!(state.matches(&MessageInfo::default()));
        }
    }

    #[test]
    fn test_expand_aliases() {
        assert_eq!(expand_abbreviations("O").unwrap(), "~N");
        assert_eq!(expand_abbreviations("R & T").unwrap(), "~U & T");
        assert_eq!(
            expand_abbreviations("subject report | from boss").unwrap(),
            "s report | f boss"
        );
        assert_eq!(expand_abbreviations("Unread").unwrap(), "U");
    }

    #[test]
    fn test_expand_leaves_codes_and_operands_alone() {
        let input = r#"s "from" & %H subject "x" & ~b unread"#;
        assert_eq!(expand_abbreviations(input).unwrap(), input);
        assert_eq!(expand_abbreviations("sg 5 & al 3").unwrap(), "sg 5 & al 3");
    }

    #[test]
    fn test_expand_negated_alias() {
        let expanded = expand_abbreviations("~O").unwrap();
        assert_eq!(expanded, "~~N");
        let list = parse_list(&expanded).unwrap();
        assert!(!list.predicates()[0].is_negated());
    }

    #[test]
    fn test_expand_rejects_unknown_keyword() {
        assert_eq!(
            expand_abbreviations("U & bogus"),
            Err(ParseError::UnknownKeyword {
                keyword: "bogus".into(),
                position: 4
            })
        );
    }

    #[test]
    fn test_all_alias_matches_everything() {
        let state = QuickSearchState::prepare("all", SearchMode::Extended);
        assert!(state.is_active());
        assert_eq!(state.compiled().map(ToString::to_string).as_deref(), Some("a"));
        assert!(state.matches(&MessageInfo::default()));
        assert!(state.matches(&sample_message()));

        let none = QuickSearchState::prepare("~all", SearchMode::Extended);
        assert!(none.is_active());
        assert!(!none.matches(&MessageInfo::default()));
    }

    #[test]
    fn test_read_alias_matches() {
        let state = QuickSearchState::prepare("R", SearchMode::Extended);
        let read = MessageInfo::default();
        let unread = MessageInfo {
            flags: MessageFlags {
                unread: true,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(state.matches(&read));
        assert!(!state.matches(&unread));
    }

    #[test]
    fn test_filter_keeps_order() {
        let messages: Vec<MessageInfo> = ["alpha", "beta", "alphabet", "gamma"]
            .into_iter()
            .map(|s| MessageInfo {
                subject: Some(s.to_string()),
                ..Default::default()
            })
            .collect();
        let runner = RecordingRunner::succeeding();
        let evaluator = Evaluator::new(&runner);
        let state = QuickSearchState::prepare("ALPHA", SearchMode::Subject);

        let found: Vec<_> = state
            .filter(&evaluator, &messages, true)
            .into_iter()
            .filter_map(|m| m.subject.as_deref())
            .collect();
        assert_eq!(found, ["alpha", "alphabet"]);
        assert_eq!(state.filter(&evaluator, &messages, false).len(), 2);
    }

    #[test]
    fn test_search_mode_from_str() {
        assert_eq!("Subject".parse::<SearchMode>(), Ok(SearchMode::Subject));
        assert_eq!(SearchMode::Extended.to_string(), "extended");
        assert!("everything".parse::<SearchMode>().is_err());
    }
}
