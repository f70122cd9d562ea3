use once_cell::sync::OnceCell;
use regex::{Regex, RegexBuilder};

use super::error::ParseError;

/// What a predicate tests
///
/// Each variant has a fixed operand [`Arity`] and a short code used by the
/// rule language (see [`Criterion::code`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Criterion {
    /// Every message
    All,
    Subject,
    From,
    To,
    Cc,
    /// To or Cc contains the operand
    ToOrCc,
    Newsgroup,
    InReplyTo,
    References,
    MessageId,
    XLabel,
    /// Value of the named header
    Header(String),
    /// The complete raw header block
    HeaderPart,
    BodyPart,
    /// Headers and body together
    Message,
    /// Shell command exits with status 0
    Execute,
    AgeGreater,
    AgeLower,
    ScoreGreater,
    ScoreLower,
    ScoreEqual,
    SizeGreater,
    SizeSmaller,
    SizeEqual,
    Unread,
    New,
    Marked,
    Deleted,
    Replied,
    Forwarded,
    Locked,
}

/// Operand shape required by a criterion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    None,
    Text,
    Number,
}

impl Criterion {
    /// Look up a criterion by its rule-language code
    ///
    /// `H` yields a `Header` with an empty name; the parser fills it in.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        let criterion = match code {
            "a" => Self::All,
            "s" => Self::Subject,
            "f" => Self::From,
            "t" => Self::To,
            "c" => Self::Cc,
            "C" => Self::ToOrCc,
            "n" => Self::Newsgroup,
            "I" => Self::InReplyTo,
            "x" => Self::References,
            "i" => Self::MessageId,
            "y" => Self::XLabel,
            "H" => Self::Header(String::new()),
            "h" => Self::HeaderPart,
            "b" => Self::BodyPart,
            "B" => Self::Message,
            "X" => Self::Execute,
            "ag" => Self::AgeGreater,
            "al" => Self::AgeLower,
            "sg" => Self::ScoreGreater,
            "sl" => Self::ScoreLower,
            "se" => Self::ScoreEqual,
            "Sg" => Self::SizeGreater,
            "Ss" => Self::SizeSmaller,
            "Se" => Self::SizeEqual,
            "U" => Self::Unread,
            "N" => Self::New,
            "T" => Self::Marked,
            "D" => Self::Deleted,
            "r" => Self::Replied,
            "F" => Self::Forwarded,
            "L" => Self::Locked,
            _ => return None,
        };
        Some(criterion)
    }

    /// Rule-language code, the inverse of [`Criterion::from_code`]
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::All => "a",
            Self::Subject => "s",
            Self::From => "f",
            Self::To => "t",
            Self::Cc => "c",
            Self::ToOrCc => "C",
            Self::Newsgroup => "n",
            Self::InReplyTo => "I",
            Self::References => "x",
            Self::MessageId => "i",
            Self::XLabel => "y",
            Self::Header(_) => "H",
            Self::HeaderPart => "h",
            Self::BodyPart => "b",
            Self::Message => "B",
            Self::Execute => "X",
            Self::AgeGreater => "ag",
            Self::AgeLower => "al",
            Self::ScoreGreater => "sg",
            Self::ScoreLower => "sl",
            Self::ScoreEqual => "se",
            Self::SizeGreater => "Sg",
            Self::SizeSmaller => "Ss",
            Self::SizeEqual => "Se",
            Self::Unread => "U",
            Self::New => "N",
            Self::Marked => "T",
            Self::Deleted => "D",
            Self::Replied => "r",
            Self::Forwarded => "F",
            Self::Locked => "L",
        }
    }

    /// Human-readable name, used in CLI output
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Subject => "subject",
            Self::From => "from",
            Self::To => "to",
            Self::Cc => "cc",
            Self::ToOrCc => "to_or_cc",
            Self::Newsgroup => "newsgroups",
            Self::InReplyTo => "in_reply_to",
            Self::References => "references",
            Self::MessageId => "message_id",
            Self::XLabel => "x_label",
            Self::Header(_) => "header",
            Self::HeaderPart => "headers_part",
            Self::BodyPart => "body_part",
            Self::Message => "message",
            Self::Execute => "execute",
            Self::AgeGreater => "age_greater",
            Self::AgeLower => "age_lower",
            Self::ScoreGreater => "score_greater",
            Self::ScoreLower => "score_lower",
            Self::ScoreEqual => "score_equal",
            Self::SizeGreater => "size_greater",
            Self::SizeSmaller => "size_smaller",
            Self::SizeEqual => "size_equal",
            Self::Unread => "unread",
            Self::New => "new",
            Self::Marked => "marked",
            Self::Deleted => "deleted",
            Self::Replied => "replied",
            Self::Forwarded => "forwarded",
            Self::Locked => "locked",
        }
    }

    #[must_use]
    pub const fn arity(&self) -> Arity {
        match self {
            Self::Subject
            | Self::From
            | Self::To
            | Self::Cc
            | Self::ToOrCc
            | Self::Newsgroup
            | Self::InReplyTo
            | Self::References
            | Self::MessageId
            | Self::XLabel
            | Self::Header(_)
            | Self::HeaderPart
            | Self::BodyPart
            | Self::Message
            | Self::Execute => Arity::Text,
            Self::AgeGreater
            | Self::AgeLower
            | Self::ScoreGreater
            | Self::ScoreLower
            | Self::ScoreEqual
            | Self::SizeGreater
            | Self::SizeSmaller
            | Self::SizeEqual => Arity::Number,
            Self::All
            | Self::Unread
            | Self::New
            | Self::Marked
            | Self::Deleted
            | Self::Replied
            | Self::Forwarded
            | Self::Locked => Arity::None,
        }
    }

    /// Whether the operand is compared with a [`MatchType`]
    #[must_use]
    pub const fn takes_match_type(&self) -> bool {
        matches!(self.arity(), Arity::Text) && !matches!(self, Self::Execute)
    }
}

/// How a string operand is compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchType {
    CaseSensitiveLiteral,
    #[default]
    CaseInsensitiveLiteral,
    Regex,
    RegexCaseInsensitive,
}

impl MatchType {
    #[must_use]
    pub const fn from_flags(regex: bool, case_sensitive: bool) -> Self {
        match (regex, case_sensitive) {
            (false, true) => Self::CaseSensitiveLiteral,
            (false, false) => Self::CaseInsensitiveLiteral,
            (true, true) => Self::Regex,
            (true, false) => Self::RegexCaseInsensitive,
        }
    }

    #[must_use]
    pub const fn is_regex(self) -> bool {
        matches!(self, Self::Regex | Self::RegexCaseInsensitive)
    }

    #[must_use]
    pub const fn is_case_sensitive(self) -> bool {
        matches!(self, Self::CaseSensitiveLiteral | Self::Regex)
    }
}

/// Operand of a predicate; the variant always agrees with the criterion's arity
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    None,
    Text(String),
    Number(i64),
}

/// One atomic test: criterion, comparison mode and operand
///
/// Regex operands are compiled on first use and cached for the lifetime of
/// the predicate. A pattern that fails to compile is remembered as an error
/// and the predicate never matches afterwards.
#[derive(Debug, Clone)]
pub struct Predicate {
    criterion: Criterion,
    negated: bool,
    match_type: MatchType,
    operand: Operand,
    regex: OnceCell<Option<Regex>>,
}

impl Predicate {
    /// Build a predicate, checking the operand against the criterion's arity
    ///
    /// # Errors
    /// Returns `ParseError::MissingOperand` when the operand shape does not
    /// match, and `ParseError::UnexpectedModifier` when a non-default match
    /// type is given to a criterion that ignores it.
    pub fn new(
        criterion: Criterion,
        match_type: MatchType,
        operand: Operand,
    ) -> Result<Self, ParseError> {
        let shape_ok = matches!(
            (criterion.arity(), &operand),
            (Arity::None, Operand::None)
                | (Arity::Text, Operand::Text(_))
                | (Arity::Number, Operand::Number(_))
        );
        if !shape_ok {
            return Err(ParseError::MissingOperand {
                keyword: criterion.code().to_string(),
                position: 0,
            });
        }
        if !criterion.takes_match_type() && match_type != MatchType::default() {
            return Err(ParseError::UnexpectedModifier {
                keyword: criterion.code().to_string(),
                position: 0,
            });
        }

        Ok(Self {
            criterion,
            negated: false,
            match_type,
            operand,
            regex: OnceCell::new(),
        })
    }

    /// Set the NOT variant of this predicate's criterion
    #[must_use]
    pub fn with_negation(mut self, negated: bool) -> Self {
        self.negated = negated;
        self
    }

    #[must_use]
    pub const fn criterion(&self) -> &Criterion {
        &self.criterion
    }

    #[must_use]
    pub const fn is_negated(&self) -> bool {
        self.negated
    }

    #[must_use]
    pub const fn match_type(&self) -> MatchType {
        self.match_type
    }

    #[must_use]
    pub const fn operand(&self) -> &Operand {
        &self.operand
    }

    #[must_use]
    pub fn string_operand(&self) -> Option<&str> {
        match &self.operand {
            Operand::Text(text) => Some(text),
            _ => None,
        }
    }

    #[must_use]
    pub const fn numeric_operand(&self) -> Option<i64> {
        match self.operand {
            Operand::Number(n) => Some(n),
            _ => None,
        }
    }

    /// The compiled regex, compiling it on first call
    ///
    /// Returns `None` for non-regex predicates and for patterns that failed
    /// to compile. Compilation is attempted at most once.
    pub fn compiled_regex(&self) -> Option<&Regex> {
        if !self.match_type.is_regex() {
            return None;
        }
        let pattern = self.string_operand()?;
        self.regex
            .get_or_init(|| {
                RegexBuilder::new(pattern)
                    .case_insensitive(!self.match_type.is_case_sensitive())
                    .build()
                    .map_err(|e| {
                        tracing::warn!(pattern, error = %e, "invalid regex in rule, condition disabled");
                    })
                    .ok()
            })
            .as_ref()
    }

    /// True once the regex operand has failed to compile
    #[must_use]
    pub fn has_error(&self) -> bool {
        matches!(self.regex.get(), Some(None))
    }
}

impl PartialEq for Predicate {
    fn eq(&self, other: &Self) -> bool {
        self.criterion == other.criterion
            && self.negated == other.negated
            && self.match_type == other.match_type
            && self.operand == other.operand
    }
}

impl Eq for Predicate {}

/// Predicates combined with a single policy: all must match, or any may
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredicateList {
    predicates: Vec<Predicate>,
    combine_with_and: bool,
}

impl PredicateList {
    /// # Errors
    /// Returns `ParseError::Empty` if `predicates` is empty.
    pub fn new(predicates: Vec<Predicate>, combine_with_and: bool) -> Result<Self, ParseError> {
        if predicates.is_empty() {
            return Err(ParseError::Empty);
        }
        Ok(Self {
            predicates,
            combine_with_and,
        })
    }

    #[must_use]
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    #[must_use]
    pub const fn combine_with_and(&self) -> bool {
        self.combine_with_and
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    /// Always false; kept for API symmetry with `len`
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// True if any predicate carries a regex compile error
    #[must_use]
    pub fn has_error(&self) -> bool {
        self.predicates.iter().any(Predicate::has_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_CODES: &[&str] = &[
        "a", "s", "f", "t", "c", "C", "n", "I", "x", "i", "y", "H", "h", "b", "B", "X", "ag",
        "al", "sg", "sl", "se", "Sg", "Ss", "Se", "U", "N", "T", "D", "r", "F", "L",
    ];

    #[test]
    fn test_code_table_is_bijective() {
        for code in ALL_CODES {
            let criterion = Criterion::from_code(code).unwrap();
            assert_eq!(criterion.code(), *code);
        }
        assert!(Criterion::from_code("z").is_none());
        assert!(Criterion::from_code("S").is_none());
    }

    #[test]
    fn test_arity() {
        assert_eq!(Criterion::Subject.arity(), Arity::Text);
        assert_eq!(Criterion::SizeEqual.arity(), Arity::Number);
        assert_eq!(Criterion::Locked.arity(), Arity::None);
        assert_eq!(Criterion::All.arity(), Arity::None);
        assert!(!Criterion::All.takes_match_type());
        assert!(!Criterion::Execute.takes_match_type());
        assert!(Criterion::Header("X-Spam".into()).takes_match_type());
    }

    #[test]
    fn test_match_type_flags() {
        assert_eq!(MatchType::from_flags(false, true), MatchType::CaseSensitiveLiteral);
        assert_eq!(MatchType::from_flags(true, false), MatchType::RegexCaseInsensitive);
        assert!(MatchType::Regex.is_case_sensitive());
        assert!(!MatchType::CaseInsensitiveLiteral.is_regex());
    }

    #[test]
    fn test_new_rejects_arity_mismatch() {
        let result = Predicate::new(Criterion::Subject, MatchType::default(), Operand::Number(3));
        assert!(matches!(result, Err(ParseError::MissingOperand { .. })));

        let result = Predicate::new(
            Criterion::AgeGreater,
            MatchType::CaseSensitiveLiteral,
            Operand::Number(3),
        );
        assert!(matches!(result, Err(ParseError::UnexpectedModifier { .. })));
    }

    #[test]
    fn test_operand_views() {
        let p = Predicate::new(
            Criterion::Subject,
            MatchType::default(),
            Operand::Text("hi".into()),
        )
        .unwrap();
        assert_eq!(p.string_operand(), Some("hi"));
        assert_eq!(p.numeric_operand(), None);
    }

    #[test]
    fn test_regex_error_is_sticky() {
        let p = Predicate::new(Criterion::Subject, MatchType::Regex, Operand::Text("(".into()))
            .unwrap();
        assert!(!p.has_error());
        assert!(p.compiled_regex().is_none());
        assert!(p.has_error());
        assert!(p.compiled_regex().is_none());
    }

    #[test]
    fn test_regex_case_insensitive_compiles_with_flag() {
        let p = Predicate::new(
            Criterion::Subject,
            MatchType::RegexCaseInsensitive,
            Operand::Text("^re:".into()),
        )
        .unwrap();
        assert!(p.compiled_regex().unwrap().is_match("RE: hello"));
    }

    #[test]
    fn test_equality_ignores_cache() {
        let a = Predicate::new(Criterion::Subject, MatchType::Regex, Operand::Text("x+".into()))
            .unwrap();
        let b = a.clone();
        let _ = a.compiled_regex();
        assert_eq!(a, b);
        assert_ne!(a.clone(), b.with_negation(true));
    }

    #[test]
    fn test_empty_list_rejected() {
        assert_eq!(PredicateList::new(Vec::new(), true), Err(ParseError::Empty));
    }

    #[test]
    fn test_types_are_thread_safe() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Predicate>();
        assert_send_sync::<PredicateList>();
    }
}
