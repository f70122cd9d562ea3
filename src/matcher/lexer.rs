//! Tokenizer for the rule language
//!
//! The lexer walks a rule string left to right and never rewinds. Tokens are
//! context free: whether a [`Token::Word`] is a keyword or a bare operand is
//! decided by the parser.

use super::error::ParseError;

/// A single lexical unit of a rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Unquoted run of characters (keyword, header name or bare operand)
    Word(String),
    /// `"..."` literal with escapes resolved
    Quoted(String),
    /// `/.../` regular expression with `\/` resolved
    Pattern(String),
    /// Optionally signed decimal integer
    Number(i64),
    /// `&`
    And,
    /// `|`
    Or,
    /// `!` or `~`
    Not,
    /// `%`
    CaseSensitive,
}

/// A token together with the byte range it was read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned {
    pub token: Token,
    pub start: usize,
    pub end: usize,
}

pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    peeked: Option<Spanned>,
}

impl<'a> Lexer<'a> {
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            peeked: None,
        }
    }

    /// Byte offset of the cursor (the end of the last consumed token)
    #[must_use]
    pub fn position(&self) -> usize {
        self.peeked.as_ref().map_or(self.pos, |t| t.start)
    }

    /// The raw text a token was read from
    #[must_use]
    pub fn slice(&self, spanned: &Spanned) -> &'a str {
        &self.input[spanned.start..spanned.end]
    }

    /// Look at the next token without consuming it
    ///
    /// # Errors
    /// Returns `ParseError::Unterminated` for an unclosed quote or pattern.
    pub fn peek_token(&mut self) -> Result<Option<&Spanned>, ParseError> {
        if self.peeked.is_none() {
            self.peeked = self.scan()?;
        }
        Ok(self.peeked.as_ref())
    }

    /// Consume and return the next token, `None` at end of input
    ///
    /// # Errors
    /// Returns `ParseError::Unterminated` for an unclosed quote or pattern.
    pub fn next_token(&mut self) -> Result<Option<Spanned>, ParseError> {
        if let Some(token) = self.peeked.take() {
            return Ok(Some(token));
        }
        self.scan()
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        let trimmed = rest.trim_start();
        self.pos += rest.len() - trimmed.len();
    }

    fn scan(&mut self) -> Result<Option<Spanned>, ParseError> {
        self.skip_whitespace();
        let start = self.pos;
        let Some(c) = self.rest().chars().next() else {
            return Ok(None);
        };

        let token = match c {
            '&' => {
                self.pos += 1;
                Token::And
            }
            '|' => {
                self.pos += 1;
                Token::Or
            }
            '!' | '~' => {
                self.pos += 1;
                Token::Not
            }
            '%' => {
                self.pos += 1;
                Token::CaseSensitive
            }
            '"' => Token::Quoted(self.scan_quoted()?),
            '/' => Token::Pattern(self.scan_pattern()?),
            _ => {
                let word = self.scan_word();
                if starts_number(word) {
                    word.parse::<i64>()
                        .map_or_else(|_| Token::Word(word.to_string()), Token::Number)
                } else {
                    Token::Word(word.to_string())
                }
            }
        };

        Ok(Some(Spanned {
            token,
            start,
            end: self.pos,
        }))
    }

    fn scan_word(&mut self) -> &'a str {
        let rest = self.rest();
        let len = rest
            .find(|c: char| c.is_whitespace() || c == '&' || c == '|')
            .unwrap_or(rest.len());
        self.pos += len;
        &rest[..len]
    }

    /// `"` opens; `\"` and `\\` are unescaped, any other `\c` is kept as is
    fn scan_quoted(&mut self) -> Result<String, ParseError> {
        let start = self.pos;
        let mut out = String::new();
        let mut chars = self.rest().char_indices().skip(1);

        while let Some((i, c)) = chars.next() {
            match c {
                '"' => {
                    self.pos = start + i + 1;
                    return Ok(out);
                }
                '\\' => match chars.next() {
                    Some((_, next @ ('"' | '\\'))) => out.push(next),
                    Some((_, next)) => {
                        out.push('\\');
                        out.push(next);
                    }
                    None => break,
                },
                _ => out.push(c),
            }
        }

        Err(ParseError::Unterminated {
            kind: "quoted string",
            position: start,
        })
    }

    /// `/` opens; `\/` becomes `/`, other backslash pairs are regex escapes
    /// and pass through untouched
    fn scan_pattern(&mut self) -> Result<String, ParseError> {
        let start = self.pos;
        let mut out = String::new();
        let mut chars = self.rest().char_indices().skip(1);

        while let Some((i, c)) = chars.next() {
            match c {
                '/' => {
                    self.pos = start + i + 1;
                    return Ok(out);
                }
                '\\' => match chars.next() {
                    Some((_, '/')) => out.push('/'),
                    Some((_, next)) => {
                        out.push('\\');
                        out.push(next);
                    }
                    None => break,
                },
                _ => out.push(c),
            }
        }

        Err(ParseError::Unterminated {
            kind: "pattern",
            position: start,
        })
    }
}

fn starts_number(word: &str) -> bool {
    let digits = word.strip_prefix('-').unwrap_or(word);
    digits.starts_with(|c: char| c.is_ascii_digit())
}
