//! Message matching rules
//!
//! A rule is a list of predicates joined by `&` (all must hold) or `|` (any
//! may hold). Each predicate names a criterion by a short code, optionally
//! prefixed with `~`/`!` to negate it and `%` to make text comparison case
//! sensitive:
//!
//! ```text
//! s "invoice" & ~f /@example\.com$/ & Sg 10000
//! U | T | %H X-Priority "1"
//! ```
//!
//! Rules are parsed with [`parse_list`], evaluated by an [`Evaluator`], and
//! written back in canonical form through `Display`.

pub mod error;
pub mod evaluator;
pub mod exec;
pub mod lexer;
pub mod parser;
pub mod serialize;
pub mod types;

pub use error::ParseError;
pub use evaluator::{Evaluator, filter_messages};
pub use exec::{CommandRunner, ShellRunner, build_command};
pub use lexer::{Lexer, Spanned, Token};
pub use parser::{parse_list, parse_predicate};
pub use serialize::{escape_pattern, escape_quoted};
pub use types::{Arity, Criterion, MatchType, Operand, Predicate, PredicateList};
