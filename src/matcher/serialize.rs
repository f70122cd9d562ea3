//! Canonical text form of predicates and lists
//!
//! Output always re-parses to an equal value. Literal operands are always
//! quoted, so bare words and numbers in the input come back quoted.

use std::fmt;

use super::types::{Criterion, Operand, Predicate, PredicateList};

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_negated() {
            f.write_str("~")?;
        }
        let criterion = self.criterion();
        if criterion.takes_match_type() && self.match_type().is_case_sensitive() {
            f.write_str("%")?;
        }
        f.write_str(criterion.code())?;

        if let Criterion::Header(name) = criterion {
            f.write_str(" ")?;
            if is_bare_safe(name) {
                f.write_str(name)?;
            } else {
                write!(f, "\"{}\"", escape_quoted(name))?;
            }
        }

        match self.operand() {
            Operand::None => Ok(()),
            Operand::Number(n) => write!(f, " {n}"),
            Operand::Text(text) if self.match_type().is_regex() => {
                write!(f, " /{}/", escape_pattern(text))
            }
            Operand::Text(text) => write!(f, " \"{}\"", escape_quoted(text)),
        }
    }
}

impl fmt::Display for PredicateList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let separator = if self.combine_with_and() { " & " } else { " | " };
        for (i, predicate) in self.predicates().iter().enumerate() {
            if i > 0 {
                f.write_str(separator)?;
            }
            write!(f, "{predicate}")?;
        }
        Ok(())
    }
}

fn is_bare_safe(word: &str) -> bool {
    !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        && !word.starts_with(|c: char| c.is_ascii_digit() || c == '-')
}

/// Escape `"` and `\` for a quoted literal
#[must_use]
pub fn escape_quoted(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    for c in text.chars() {
        if matches!(c, '"' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Escape `/` for a `/pattern/` literal, leaving regex escapes intact
#[must_use]
pub fn escape_pattern(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 2);
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                out.push('\\');
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            }
            '/' => out.push_str("\\/"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use crate::matcher::parser::parse_list;
    use super::*;

    fn canonical(input: &str) -> String {
        parse_list(input).unwrap().to_string()
    }

    #[test]
    fn test_canonical_forms() {
        assert_eq!(canonical(r#"s "foo""#), r#"s "foo""#);
        assert_eq!(canonical("s   foo"), r#"s "foo""#);
        assert_eq!(canonical(r#"s %"Foo""#), r#"%s "Foo""#);
        assert_eq!(canonical("!U"), "~U");
        assert_eq!(canonical("ag 30"), "ag 30");
        assert_eq!(canonical("U&T"), "U & T");
        assert_eq!(canonical("U|T|N"), "U | T | N");
        assert_eq!(canonical("%s /^Re:/"), "%s /^Re:/");
        assert_eq!(canonical(r#"H "X Weird" "v""#), r#"H "X Weird" "v""#);
        assert_eq!(canonical(r#"H X-Spam "yes""#), r#"H X-Spam "yes""#);
    }

    #[test]
    fn test_escape_quoted() {
        assert_eq!(escape_quoted(r#"a "b" \c"#), r#"a \"b\" \\c"#);
    }

    #[test]
    fn test_escape_pattern() {
        assert_eq!(escape_pattern(r"a/b\d"), r"a\/b\d");
        assert_eq!(escape_pattern(r"x\\/"), r"x\\\/");
    }

    #[test]
    fn test_round_trip_is_stable() {
        let rules = [
            r#"s "foo" & t "bar""#,
            r#"~%f "Boss" | C "team@example.com" | sg 10"#,
            r#"s "quote \" and \\ slash""#,
            r"b /\d{3}-\d{4}/",
            r"s /a\/b/",
            r#"H List-Id "rust" & ~D & al 7"#,
            r#"X "test -s %F""#,
            "Se 100",
            "s \"unicode ✓\"",
        ];
        for rule in rules {
            let first = parse_list(rule).unwrap();
            let text = first.to_string();
            let second = parse_list(&text).unwrap();
            assert_eq!(first, second, "{rule} -> {text}");
            assert_eq!(second.to_string(), text, "not idempotent: {rule}");
        }
    }

    #[test]
    fn test_header_name_starting_with_digit_is_quoted() {
        assert_eq!(canonical(r#"H "1st" "x""#), r#"H "1st" "x""#);
    }
}
