//! Rule table definition.
//!
//! The caller-supplied, declarative side of the engine: an ordered mapping
//! from state name to an ordered list of rules, each a regex pattern plus an
//! action. Nothing here is compiled; [`crate::Engine::new`] validates the
//! table and compiles the patterns once.
//!
//! # Examples
//!
//! ```
//! use relex::{Rule, RuleTable, TokenKind};
//!
//! let table = RuleTable::new()
//!     .state("root", [
//!         Rule::emit(r"\s+", TokenKind::Whitespace),
//!         Rule::emit(r"[0-9]+", TokenKind::NumberInteger),
//!         Rule::push(r"\[", TokenKind::Punctuation, ["brackets"]),
//!     ])
//!     .state("brackets", [
//!         Rule::include("root"),
//!         Rule::pop(r"\]", TokenKind::Punctuation),
//!     ]);
//! assert_eq!(table.states().count(), 2);
//! ```

use crate::kind::TokenKind;

/// Name of the implicit bottom state every table must define.
pub const ROOT_STATE: &str = "root";

/// Per-table regex semantics, applied uniformly to every pattern at
/// compile time. Explicit configuration rather than ambient flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TableOptions {
    /// Patterns match case-insensitively.
    pub case_insensitive: bool,
    /// `^` and `$` match at line boundaries, not just text boundaries.
    pub multiline: bool,
    /// `.` also matches `\n`.
    pub dot_matches_newline: bool,
}

/// What a matched rule emits.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Emit {
    /// The whole match as a single token.
    Kind(TokenKind),
    /// Capture groups `1..=kinds.len()` classified positionally; matched
    /// text not covered by a classified group takes the `gaps` kind, so the
    /// pieces still cover the whole match span.
    Groups { kinds: Vec<TokenKind>, gaps: TokenKind },
}

/// State-stack effect of a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StackOp {
    /// Leave the stack alone.
    None,
    /// Push the named states in order; the last pushed becomes active.
    Push(Vec<String>),
    /// Pop up to `n` frames, never below the bottom `root` frame.
    Pop(usize),
    /// Pop up to `depth` frames, then push `states` in order — replacing
    /// the current context instead of stacking on top of it.
    PopPush { depth: usize, states: Vec<String> },
}

impl StackOp {
    /// An op that cannot change the stack, whatever its depth.
    pub(crate) fn is_inert(&self) -> bool {
        match self {
            StackOp::None => true,
            StackOp::Push(states) => states.is_empty(),
            StackOp::Pop(n) => *n == 0,
            StackOp::PopPush { depth, states } => *depth == 0 && states.is_empty(),
        }
    }
}

/// One row of a rule table.
///
/// `Match` covers the emit, emit-then-push and emit-then-pop actions;
/// `Include` splices another state's rules into the candidate list without
/// touching the stack; `Default` is an unconditional zero-width transition
/// used for lookahead-driven branching.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Rule {
    Match {
        pattern: String,
        emit: Emit,
        op: StackOp,
    },
    Include(String),
    Default(StackOp),
}

impl Rule {
    /// Match `pattern`, emit the whole match as `kind`.
    pub fn emit(pattern: impl Into<String>, kind: TokenKind) -> Self {
        Rule::Match {
            pattern: pattern.into(),
            emit: Emit::Kind(kind),
            op: StackOp::None,
        }
    }

    /// Match `pattern`, classify capture groups `1..=n` positionally.
    /// Uncovered stretches of the match default to [`TokenKind::Text`];
    /// use [`Rule::gaps`] to change that.
    pub fn groups(pattern: impl Into<String>, kinds: impl IntoIterator<Item = TokenKind>) -> Self {
        Rule::Match {
            pattern: pattern.into(),
            emit: Emit::Groups {
                kinds: kinds.into_iter().collect(),
                gaps: TokenKind::Text,
            },
            op: StackOp::None,
        }
    }

    /// Match `pattern`, emit `kind`, then push `states` in order.
    pub fn push<S: Into<String>>(
        pattern: impl Into<String>,
        kind: TokenKind,
        states: impl IntoIterator<Item = S>,
    ) -> Self {
        Rule::Match {
            pattern: pattern.into(),
            emit: Emit::Kind(kind),
            op: StackOp::Push(states.into_iter().map(Into::into).collect()),
        }
    }

    /// Match `pattern`, emit `kind`, then pop one frame.
    pub fn pop(pattern: impl Into<String>, kind: TokenKind) -> Self {
        Rule::Match {
            pattern: pattern.into(),
            emit: Emit::Kind(kind),
            op: StackOp::Pop(1),
        }
    }

    /// Match `pattern`, emit `kind`, then pop `depth` frames.
    pub fn pop_n(pattern: impl Into<String>, kind: TokenKind, depth: usize) -> Self {
        Rule::Match {
            pattern: pattern.into(),
            emit: Emit::Kind(kind),
            op: StackOp::Pop(depth),
        }
    }

    /// Match `pattern`, emit `kind`, then pop `depth` frames and push
    /// `states` — replacing the current context in one action.
    pub fn pop_push<S: Into<String>>(
        pattern: impl Into<String>,
        kind: TokenKind,
        depth: usize,
        states: impl IntoIterator<Item = S>,
    ) -> Self {
        Rule::Match {
            pattern: pattern.into(),
            emit: Emit::Kind(kind),
            op: StackOp::PopPush {
                depth,
                states: states.into_iter().map(Into::into).collect(),
            },
        }
    }

    /// Splice the named state's rules into the candidate list at this
    /// position, resolved once at engine construction.
    pub fn include(state: impl Into<String>) -> Self {
        Rule::Include(state.into())
    }

    /// Zero-width transition: push `states` without consuming input.
    pub fn default_push<S: Into<String>>(states: impl IntoIterator<Item = S>) -> Self {
        Rule::Default(StackOp::Push(states.into_iter().map(Into::into).collect()))
    }

    /// Zero-width transition: pop one frame without consuming input.
    pub fn default_pop() -> Self {
        Rule::Default(StackOp::Pop(1))
    }

    /// Zero-width transition: pop `depth` frames without consuming input.
    pub fn default_pop_n(depth: usize) -> Self {
        Rule::Default(StackOp::Pop(depth))
    }

    /// Zero-width transition: pop `depth` frames, then push `states`,
    /// without consuming input.
    pub fn default_pop_push<S: Into<String>>(
        depth: usize,
        states: impl IntoIterator<Item = S>,
    ) -> Self {
        Rule::Default(StackOp::PopPush {
            depth,
            states: states.into_iter().map(Into::into).collect(),
        })
    }

    /// Replace the gap kind of a [`Rule::groups`] rule. No effect on other
    /// rule forms.
    pub fn gaps(mut self, kind: TokenKind) -> Self {
        if let Rule::Match {
            emit: Emit::Groups { gaps, .. },
            ..
        } = &mut self
        {
            *gaps = kind;
        }
        self
    }
}

/// A declarative rule table: ordered states, each an ordered rule list.
///
/// Declaration order is meaningful twice over: rules within a state are
/// tried first-match-wins, and includes splice in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RuleTable {
    #[cfg_attr(feature = "serde", serde(default))]
    pub options: TableOptions,
    states: Vec<(String, Vec<Rule>)>,
}

impl RuleTable {
    /// An empty table with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty table with explicit regex options.
    pub fn with_options(options: TableOptions) -> Self {
        Self {
            options,
            states: Vec::new(),
        }
    }

    /// Append a state with its ordered rules. Duplicate names are rejected
    /// at engine construction, not here.
    pub fn state(mut self, name: impl Into<String>, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.states.push((name.into(), rules.into_iter().collect()));
        self
    }

    /// Ordered view of the declared states.
    pub fn states(&self) -> impl Iterator<Item = (&str, &[Rule])> {
        self.states.iter().map(|(n, r)| (n.as_str(), r.as_slice()))
    }

    pub(crate) fn into_parts(self) -> (TableOptions, Vec<(String, Vec<Rule>)>) {
        (self.options, self.states)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builder_preserves_declaration_order() {
        let table = RuleTable::new()
            .state("root", [Rule::emit(r"a", TokenKind::Text)])
            .state("other", [Rule::include("root")]);
        let names: Vec<_> = table.states().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["root", "other"]);
    }

    #[test]
    fn test_gaps_adjusts_group_rule() {
        let rule = Rule::groups(r"(a)(b)", [TokenKind::Name, TokenKind::Name])
            .gaps(TokenKind::Whitespace);
        match rule {
            Rule::Match {
                emit: Emit::Groups { gaps, .. },
                ..
            } => assert_eq!(gaps, TokenKind::Whitespace),
            other => panic!("unexpected rule shape: {other:?}"),
        }
    }

    #[test]
    fn test_gaps_is_inert_on_plain_rules() {
        let rule = Rule::emit(r"a", TokenKind::Text).gaps(TokenKind::Error);
        assert_eq!(rule, Rule::emit(r"a", TokenKind::Text));
    }

    #[test]
    fn test_inert_stack_ops() {
        assert!(StackOp::None.is_inert());
        assert!(StackOp::Push(vec![]).is_inert());
        assert!(StackOp::Pop(0).is_inert());
        assert!(StackOp::PopPush { depth: 0, states: vec![] }.is_inert());
        assert!(!StackOp::Pop(1).is_inert());
        assert!(!StackOp::Push(vec!["a".into()]).is_inert());
        assert!(!StackOp::PopPush { depth: 1, states: vec![] }.is_inert());
        assert!(!StackOp::PopPush { depth: 0, states: vec!["a".into()] }.is_inert());
    }

    #[test]
    fn test_pop_push_builders() {
        let rule = Rule::pop_push(r"/", TokenKind::Operator, 1, ["badslash"]);
        match rule {
            Rule::Match { op: StackOp::PopPush { depth, states }, .. } => {
                assert_eq!(depth, 1);
                assert_eq!(states, vec!["badslash".to_string()]);
            }
            other => panic!("unexpected rule shape: {other:?}"),
        }
        assert_eq!(
            Rule::default_pop_push(2, ["a", "b"]),
            Rule::Default(StackOp::PopPush {
                depth: 2,
                states: vec!["a".into(), "b".into()],
            })
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_table_from_json() {
        let json = r#"{
            "options": { "case_insensitive": true },
            "states": [
                ["root", [
                    { "Match": { "pattern": "[a-z]+", "emit": { "Kind": "Name" }, "op": "None" } },
                    { "Match": { "pattern": "\\[", "emit": { "Kind": "Punctuation" }, "op": { "Push": ["brackets"] } } },
                    { "Default": { "Pop": 1 } }
                ]],
                ["brackets", [
                    { "Include": "root" },
                    { "Match": { "pattern": "\\]", "emit": { "Kind": "Punctuation" }, "op": { "Pop": 1 } } }
                ]]
            ]
        }"#;
        let table: RuleTable = serde_json::from_str(json).expect("valid table json");
        assert!(table.options.case_insensitive);
        assert_eq!(table.states().count(), 2);
        let (_, root_rules) = table.states().next().unwrap();
        assert_eq!(root_rules.len(), 3);
    }
}
