//! Rule parser
//!
//! Grammar, informally:
//!
//! ```text
//! list      := predicate ( "&" predicate )*
//!            | predicate ( "|" predicate )*
//! predicate := ( "~" | "!" | "%" )* code operand?
//! operand   := "%"? ( "quoted" | /pattern/ | bare-word | number )
//! ```
//!
//! `H` takes a header name before its operand. `&` and `|` cannot be mixed in
//! one list and there is no grouping.

use std::str::FromStr;

use super::error::ParseError;
use super::lexer::{Lexer, Spanned, Token};
use super::types::{Arity, Criterion, MatchType, Operand, Predicate, PredicateList};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    And,
    Or,
}

/// Parse a complete rule
///
/// # Errors
/// Returns a `ParseError` describing the first malformed construct. No
/// partially built list is ever returned.
pub fn parse_list(input: &str) -> Result<PredicateList, ParseError> {
    let mut lexer = Lexer::new(input);
    if lexer.peek_token()?.is_none() {
        return Err(ParseError::Empty);
    }

    let mut predicates = vec![parse_predicate(&mut lexer)?];
    let mut combinator: Option<Combinator> = None;

    while let Some(spanned) = lexer.next_token()? {
        let op = match spanned.token {
            Token::And => Combinator::And,
            Token::Or => Combinator::Or,
            _ => {
                return Err(ParseError::TrailingInput {
                    position: spanned.start,
                });
            }
        };

        match combinator {
            Some(existing) if existing != op => {
                return Err(ParseError::MixedOperators {
                    position: spanned.start,
                });
            }
            _ => combinator = Some(op),
        }

        if lexer.peek_token()?.is_none() {
            return Err(ParseError::MissingPredicate {
                position: spanned.end,
            });
        }
        predicates.push(parse_predicate(&mut lexer)?);
    }

    PredicateList::new(predicates, combinator != Some(Combinator::Or))
}

/// Parse one predicate starting at the lexer's cursor
///
/// # Errors
/// Returns a `ParseError` for unknown keywords, operators in keyword
/// position, and operands that do not fit the criterion.
pub fn parse_predicate(lexer: &mut Lexer<'_>) -> Result<Predicate, ParseError> {
    let mut negated = false;
    let mut case_sensitive = false;

    let (keyword, position) = loop {
        let Some(spanned) = lexer.next_token()? else {
            return Err(ParseError::MissingPredicate {
                position: lexer.position(),
            });
        };
        match spanned.token {
            Token::Not => negated = !negated,
            Token::CaseSensitive => case_sensitive = true,
            Token::Word(word) => break (word, spanned.start),
            _ => {
                return Err(ParseError::UnexpectedToken {
                    token: lexer.slice(&spanned).to_string(),
                    position: spanned.start,
                });
            }
        }
    };

    let criterion = match Criterion::from_code(&keyword) {
        Some(Criterion::Header(_)) => Criterion::Header(read_header_name(lexer, &keyword, position)?),
        Some(criterion) => criterion,
        None => return Err(ParseError::UnknownKeyword { keyword, position }),
    };

    let (match_type, operand) = match criterion.arity() {
        Arity::None => {
            reject_modifier(case_sensitive, &keyword, position)?;
            (MatchType::default(), Operand::None)
        }
        Arity::Number => {
            reject_modifier(case_sensitive, &keyword, position)?;
            (MatchType::default(), Operand::Number(read_number(lexer, &keyword, position)?))
        }
        Arity::Text => read_text(lexer, &criterion, case_sensitive, &keyword, position)?,
    };

    Predicate::new(criterion, match_type, operand)
        .map(|p| p.with_negation(negated))
        .map_err(|e| relocate(e, position))
}

fn reject_modifier(case_sensitive: bool, keyword: &str, position: usize) -> Result<(), ParseError> {
    if case_sensitive {
        return Err(ParseError::UnexpectedModifier {
            keyword: keyword.to_string(),
            position,
        });
    }
    Ok(())
}

fn missing_operand(keyword: &str, position: usize) -> ParseError {
    ParseError::MissingOperand {
        keyword: keyword.to_string(),
        position,
    }
}

fn read_header_name(lexer: &mut Lexer<'_>, keyword: &str, position: usize) -> Result<String, ParseError> {
    match lexer.next_token()? {
        Some(Spanned {
            token: Token::Word(name) | Token::Quoted(name),
            ..
        }) if !name.is_empty() => Ok(name),
        _ => Err(missing_operand(keyword, position)),
    }
}

fn read_number(lexer: &mut Lexer<'_>, keyword: &str, position: usize) -> Result<i64, ParseError> {
    let Some(spanned) = lexer.next_token()? else {
        return Err(missing_operand(keyword, position));
    };
    match spanned.token {
        Token::Number(n) => Ok(n),
        Token::Word(value) | Token::Quoted(value) => Err(ParseError::InvalidNumber {
            value,
            position: spanned.start,
        }),
        _ => Err(missing_operand(keyword, position)),
    }
}

fn read_text(
    lexer: &mut Lexer<'_>,
    criterion: &Criterion,
    mut case_sensitive: bool,
    keyword: &str,
    position: usize,
) -> Result<(MatchType, Operand), ParseError> {
    let spanned = loop {
        let Some(spanned) = lexer.next_token()? else {
            return Err(missing_operand(keyword, position));
        };
        if spanned.token == Token::CaseSensitive {
            case_sensitive = true;
        } else {
            break spanned;
        }
    };

    let (regex, text) = match spanned.token {
        Token::Quoted(text) | Token::Word(text) => (false, text),
        Token::Number(_) => (false, lexer.slice(&spanned).to_string()),
        Token::Pattern(pattern) => (true, pattern),
        Token::And | Token::Or | Token::Not | Token::CaseSensitive => {
            return Err(missing_operand(keyword, position));
        }
    };

    if !criterion.takes_match_type() {
        if regex || case_sensitive {
            return Err(ParseError::UnexpectedModifier {
                keyword: keyword.to_string(),
                position,
            });
        }
        return Ok((MatchType::default(), Operand::Text(text)));
    }

    Ok((MatchType::from_flags(regex, case_sensitive), Operand::Text(text)))
}

fn relocate(err: ParseError, position: usize) -> ParseError {
    match err {
        ParseError::MissingOperand { keyword, .. } => ParseError::MissingOperand { keyword, position },
        ParseError::UnexpectedModifier { keyword, .. } => {
            ParseError::UnexpectedModifier { keyword, position }
        }
        other => other,
    }
}

impl FromStr for PredicateList {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_list(s)
    }
}

impl PredicateList {
    /// Parse a rule such as `s "invoice" & ag 30`
    ///
    /// # Examples
    /// ```
    /// use mailmatch::matcher::PredicateList;
    ///
    /// let list = PredicateList::parse(r#"s "invoice" & ag 30"#).unwrap();
    /// assert_eq!(list.len(), 2);
    /// assert!(list.combine_with_and());
    /// ```
    ///
    /// # Errors
    /// Returns a `ParseError` if the rule is malformed.
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        parse_list(input)
    }
}
