//! relex — a rule-table driven regex scanner engine.
//!
//! Turns source text into a lazy stream of classified tokens, driven
//! entirely by a declarative table of states, patterns and actions supplied
//! by the caller. The engine owns no language: keywords, operators and
//! string syntaxes are configuration data in the [`RuleTable`]; the engine
//! interprets them — ordered alternatives anchored at the cursor, a stack of
//! lexical states, zero-width transitions for lookahead-driven branching.
//!
//! Scanning never fails on malformed input: when no rule matches, the engine
//! emits a single [`TokenKind::Error`] token for one character and moves on,
//! so the token spans always reconstruct the input exactly.
//!
//! # Example
//!
//! ```
//! use relex::{Engine, Rule, RuleTable, TokenKind};
//!
//! let table = RuleTable::new()
//!     .state("root", [
//!         Rule::emit(r"[ \t]+", TokenKind::Whitespace),
//!         Rule::emit(r"[0-9]+", TokenKind::NumberInteger),
//!         Rule::push(r"\[", TokenKind::Punctuation, ["brackets"]),
//!     ])
//!     .state("brackets", [
//!         Rule::include("root"),
//!         Rule::pop(r"\]", TokenKind::Punctuation),
//!     ]);
//!
//! let engine = Engine::new(table).unwrap();
//! let tokens = engine.tokenize("12 [34]").unwrap();
//! assert_eq!(tokens[0].text, "12");
//! assert_eq!(tokens[0].kind, TokenKind::NumberInteger);
//! assert_eq!(tokens.last().unwrap().span.end, 7);
//! ```

pub mod engine;
pub mod kind;
pub mod table;
pub mod token;

pub use engine::{Engine, Tokens};
pub use kind::TokenKind;
pub use table::{Emit, Rule, RuleTable, StackOp, TableOptions, ROOT_STATE};
pub use token::{Span, Token};

/// Rule table validation error, fatal to engine construction.
///
/// Every variant is a table authoring bug caught before any scan can start.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    #[error("rule table has no `root` state")]
    MissingRoot,
    #[error("state `{name}` is defined more than once")]
    DuplicateState { name: String },
    #[error("state `{from}` references unknown state `{target}`")]
    UnknownState { from: String, target: String },
    #[error("include cycle through state `{state}`")]
    IncludeCycle { state: String },
    #[error("invalid pattern in state `{state}`, rule {index}: {message}")]
    BadPattern {
        state: String,
        index: usize,
        message: String,
    },
    #[error("zero-width rule with no stack effect in state `{state}`, rule {index}")]
    ZeroWidthLoop { state: String, index: usize },
}

/// Scan-time error.
///
/// Unmatched input is never an error — it falls back to
/// [`TokenKind::Error`] tokens. The one legal scan-time failure is a
/// zero-width transition cycle that makes no progress, which signals a bug
/// in the table, not in the scanned text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScanError {
    #[error("zero-width transitions made no progress at offset {offset} in state `{state}`")]
    DefaultLoop { offset: usize, state: String },
}
