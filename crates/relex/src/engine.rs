//! The scanner engine: table validation, compilation and scanning.
//!
//! [`Engine::new`] turns a [`RuleTable`] into an immutable compiled form —
//! every pattern compiled once, every include spliced into a flat ordered
//! rule list, every state reference resolved to an index. [`Engine::scan`]
//! then walks a text left to right, matching the active state's rules
//! anchored at the cursor, first match wins.
//!
//! One engine may serve many concurrent scans: the compiled table is
//! read-only and each [`Tokens`] iterator owns its private state stack and
//! cursor.

use std::collections::HashMap;
use std::collections::VecDeque;

use regex::{Captures, Regex, RegexBuilder};

use crate::kind::TokenKind;
use crate::table::{Emit, Rule, RuleTable, StackOp, ROOT_STATE};
use crate::token::{Span, Token};
use crate::{ScanError, TableError};

type StateId = usize;

/// A rule with its pattern compiled and its state references resolved.
/// `pattern: None` marks a zero-width default transition.
#[derive(Debug, Clone)]
struct CompiledRule {
    pattern: Option<Regex>,
    emit: Option<Emit>,
    op: CompiledOp,
}

#[derive(Debug, Clone)]
enum CompiledOp {
    None,
    Push(Vec<StateId>),
    Pop(usize),
    PopPush { depth: usize, states: Vec<StateId> },
}

/// A state's flattened candidate list: indices into the shared rule arena,
/// includes already spliced in declaration order.
#[derive(Debug, Clone)]
struct FlatState {
    name: String,
    rules: Vec<usize>,
}

/// Unresolved per-state entry, before include flattening.
enum Entry {
    Rule(usize),
    Include(StateId),
}

/// A compiled, immutable scanner engine.
///
/// Construction validates the whole table up front — unknown states,
/// include cycles, zero-width loops and bad patterns are all rejected here,
/// so a constructed engine can never fail at scan time except for the
/// explicit no-progress guard in [`ScanError`].
#[derive(Debug, Clone)]
pub struct Engine {
    arena: Vec<CompiledRule>,
    states: Vec<FlatState>,
    root: StateId,
}

impl Engine {
    /// Validate and compile a rule table.
    pub fn new(table: RuleTable) -> Result<Engine, TableError> {
        let (options, defs) = table.into_parts();

        let mut ids: HashMap<String, StateId> = HashMap::new();
        for (sid, (name, _)) in defs.iter().enumerate() {
            if ids.insert(name.clone(), sid).is_some() {
                return Err(TableError::DuplicateState { name: name.clone() });
            }
        }
        let root = *ids.get(ROOT_STATE).ok_or(TableError::MissingRoot)?;

        let resolve = |from: &str, target: &str| -> Result<StateId, TableError> {
            ids.get(target).copied().ok_or_else(|| TableError::UnknownState {
                from: from.to_string(),
                target: target.to_string(),
            })
        };
        let compile_op = |from: &str, op: &StackOp| -> Result<CompiledOp, TableError> {
            Ok(match op {
                StackOp::None => CompiledOp::None,
                StackOp::Pop(n) => CompiledOp::Pop(*n),
                StackOp::Push(targets) => CompiledOp::Push(
                    targets
                        .iter()
                        .map(|t| resolve(from, t))
                        .collect::<Result<_, _>>()?,
                ),
                StackOp::PopPush { depth, states } => CompiledOp::PopPush {
                    depth: *depth,
                    states: states
                        .iter()
                        .map(|t| resolve(from, t))
                        .collect::<Result<_, _>>()?,
                },
            })
        };

        let mut arena: Vec<CompiledRule> = Vec::new();
        let mut entries: Vec<Vec<Entry>> = Vec::with_capacity(defs.len());
        for (name, rules) in &defs {
            let mut state_entries = Vec::with_capacity(rules.len());
            for (index, rule) in rules.iter().enumerate() {
                match rule {
                    Rule::Include(target) => {
                        state_entries.push(Entry::Include(resolve(name, target)?));
                    }
                    Rule::Match { pattern, emit, op } => {
                        let regex = RegexBuilder::new(pattern)
                            .case_insensitive(options.case_insensitive)
                            .multi_line(options.multiline)
                            .dot_matches_new_line(options.dot_matches_newline)
                            .build()
                            .map_err(|e| TableError::BadPattern {
                                state: name.clone(),
                                index,
                                message: e.to_string(),
                            })?;
                        // A pattern that can match nothing and an op that
                        // changes nothing would stall the cursor forever.
                        if op.is_inert() && regex.is_match("") {
                            return Err(TableError::ZeroWidthLoop {
                                state: name.clone(),
                                index,
                            });
                        }
                        arena.push(CompiledRule {
                            pattern: Some(regex),
                            emit: Some(emit.clone()),
                            op: compile_op(name, op)?,
                        });
                        state_entries.push(Entry::Rule(arena.len() - 1));
                    }
                    Rule::Default(op) => {
                        if op.is_inert() {
                            return Err(TableError::ZeroWidthLoop {
                                state: name.clone(),
                                index,
                            });
                        }
                        arena.push(CompiledRule {
                            pattern: None,
                            emit: None,
                            op: compile_op(name, op)?,
                        });
                        state_entries.push(Entry::Rule(arena.len() - 1));
                    }
                }
            }
            entries.push(state_entries);
        }

        let names: Vec<String> = defs.into_iter().map(|(n, _)| n).collect();
        let mut memo: Vec<Option<Vec<usize>>> = vec![None; names.len()];
        let mut visiting = vec![false; names.len()];
        let mut states = Vec::with_capacity(names.len());
        for sid in 0..names.len() {
            let rules = flatten_state(sid, &entries, &names, &mut memo, &mut visiting)?;
            states.push(FlatState {
                name: names[sid].clone(),
                rules,
            });
        }

        Ok(Engine {
            arena,
            states,
            root,
        })
    }

    /// Lazily scan `text`, yielding tokens on demand.
    ///
    /// Tokens arrive in strictly increasing, contiguous span order and
    /// together cover the input exactly. The only possible error is the
    /// zero-width no-progress guard, which signals a table authoring bug.
    pub fn scan<'e, 'src>(&'e self, text: &'src str) -> Tokens<'e, 'src> {
        Tokens {
            engine: self,
            text,
            pos: 0,
            stack: vec![self.root],
            queue: VecDeque::new(),
            visited: Vec::new(),
            growth_fires: 0,
            failed: false,
        }
    }

    /// Eagerly scan `text` into a vector of tokens.
    pub fn tokenize<'src>(&self, text: &'src str) -> Result<Vec<Token<'src>>, ScanError> {
        self.scan(text).collect()
    }
}

/// Splice includes into a flat ordered rule list, erroring on cycles.
/// Runs once per state at construction; scanning never traverses includes.
fn flatten_state(
    sid: StateId,
    entries: &[Vec<Entry>],
    names: &[String],
    memo: &mut [Option<Vec<usize>>],
    visiting: &mut [bool],
) -> Result<Vec<usize>, TableError> {
    if let Some(done) = &memo[sid] {
        return Ok(done.clone());
    }
    if visiting[sid] {
        return Err(TableError::IncludeCycle {
            state: names[sid].clone(),
        });
    }
    visiting[sid] = true;
    let mut flat = Vec::new();
    for entry in &entries[sid] {
        match entry {
            Entry::Rule(i) => flat.push(*i),
            Entry::Include(target) => {
                flat.extend(flatten_state(*target, entries, names, memo, visiting)?);
            }
        }
    }
    visiting[sid] = false;
    memo[sid] = Some(flat.clone());
    Ok(flat)
}

/// Lazy token stream over one scan.
///
/// Pull-based and finite; dropping it early is the whole cancellation story.
/// Not restartable — start a fresh [`Engine::scan`] to re-tokenize.
#[derive(Debug, Clone)]
pub struct Tokens<'e, 'src> {
    engine: &'e Engine,
    text: &'src str,
    pos: usize,
    stack: Vec<StateId>,
    queue: VecDeque<Token<'src>>,
    /// Stack configurations reached by zero-width transitions since the
    /// cursor last advanced. Revisiting one means the table is stuck.
    visited: Vec<Vec<StateId>>,
    /// Zero-width fires that grew the stack since the cursor last advanced.
    /// At a fixed offset the firing rule depends only on the top state, so
    /// more growing fires than there are states proves an endless climb.
    growth_fires: usize,
    failed: bool,
}

impl<'e, 'src> Tokens<'e, 'src> {
    /// Run one match attempt at the current cursor. Either queues tokens
    /// and advances, fires a zero-width transition, or falls back to a
    /// single-character token.
    fn step(&mut self) -> Result<(), ScanError> {
        let engine = self.engine;
        let state = *self.stack.last().expect("state stack never empty");

        for &ri in &engine.states[state].rules {
            let rule = &engine.arena[ri];
            let Some(regex) = &rule.pattern else {
                // Default rule: always fires, consumes nothing.
                return self.zero_width(&rule.op);
            };
            let Some(caps) = regex.captures_at(self.text, self.pos) else {
                continue;
            };
            let whole = caps.get(0).expect("group 0 always participates");
            if whole.start() != self.pos {
                // Earliest match starts further on, so nothing matches
                // anchored at the cursor.
                continue;
            }
            if whole.end() == self.pos {
                return self.zero_width(&rule.op);
            }
            if let Some(emit) = &rule.emit {
                self.queue_match(&caps, emit);
            }
            self.apply(&rule.op);
            self.pos = whole.end();
            self.visited.clear();
            self.growth_fires = 0;
            return Ok(());
        }

        // No rule matched: consume exactly one character. An unmatched
        // newline additionally resets the stack to root, so a state that
        // forgot to handle end-of-line recovers on the next line.
        let ch = self.text[self.pos..]
            .chars()
            .next()
            .expect("cursor is on a char boundary inside the text");
        let end = self.pos + ch.len_utf8();
        let kind = if ch == '\n' {
            self.stack.clear();
            self.stack.push(engine.root);
            TokenKind::Text
        } else {
            TokenKind::Error
        };
        self.queue.push_back(Token::new(
            kind,
            &self.text[self.pos..end],
            Span::new(self.pos, end),
        ));
        self.pos = end;
        self.visited.clear();
        self.growth_fires = 0;
        Ok(())
    }

    /// Apply a stack op and enforce the no-progress guard for transitions
    /// that consumed no input.
    fn zero_width(&mut self, op: &CompiledOp) -> Result<(), ScanError> {
        let depth_before = self.stack.len();
        self.apply(op);
        if self.stack.len() > depth_before {
            // A growing cycle never revisits a configuration, so bound the
            // number of growing fires as well. Distinct top states can each
            // fire at most once per offset before one repeats.
            self.growth_fires += 1;
            if self.growth_fires > self.engine.states.len() {
                return Err(self.default_loop());
            }
        } else if self.visited.iter().any(|seen| *seen == self.stack) {
            return Err(self.default_loop());
        }
        self.visited.push(self.stack.clone());
        Ok(())
    }

    fn default_loop(&self) -> ScanError {
        let state = *self.stack.last().expect("state stack never empty");
        ScanError::DefaultLoop {
            offset: self.pos,
            state: self.engine.states[state].name.clone(),
        }
    }

    fn apply(&mut self, op: &CompiledOp) {
        match op {
            CompiledOp::None => {}
            CompiledOp::Push(states) => self.stack.extend_from_slice(states),
            CompiledOp::Pop(n) => self.pop_frames(*n),
            CompiledOp::PopPush { depth, states } => {
                self.pop_frames(*depth);
                self.stack.extend_from_slice(states);
            }
        }
    }

    fn pop_frames(&mut self, n: usize) {
        // The bottom frame is never popped.
        for _ in 0..n {
            if self.stack.len() > 1 {
                self.stack.pop();
            }
        }
    }

    /// Queue the token(s) for a non-empty match. Group rules yield one token
    /// per classified capture group, with uncovered stretches taking the
    /// rule's gap kind so the pieces tile the match span.
    fn queue_match(&mut self, caps: &Captures<'src>, emit: &Emit) {
        let whole = caps.get(0).expect("group 0 always participates");
        match emit {
            Emit::Kind(kind) => {
                self.queue.push_back(Token::new(
                    *kind,
                    whole.as_str(),
                    Span::new(whole.start(), whole.end()),
                ));
            }
            Emit::Groups { kinds, gaps } => {
                let mut cursor = whole.start();
                for (i, kind) in kinds.iter().enumerate() {
                    let Some(group) = caps.get(i + 1) else {
                        continue;
                    };
                    if group.start() < cursor {
                        // Nested inside an already-covered group.
                        continue;
                    }
                    if group.start() > cursor {
                        self.queue_piece(*gaps, cursor, group.start());
                    }
                    self.queue_piece(*kind, group.start(), group.end());
                    cursor = group.end();
                }
                if cursor < whole.end() {
                    self.queue_piece(*gaps, cursor, whole.end());
                }
            }
        }
    }

    fn queue_piece(&mut self, kind: TokenKind, start: usize, end: usize) {
        if start < end {
            self.queue
                .push_back(Token::new(kind, &self.text[start..end], Span::new(start, end)));
        }
    }
}

impl<'e, 'src> Iterator for Tokens<'e, 'src> {
    type Item = Result<Token<'src>, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            if let Some(token) = self.queue.pop_front() {
                return Some(Ok(token));
            }
            if self.pos >= self.text.len() {
                return None;
            }
            if let Err(e) = self.step() {
                self.failed = true;
                return Some(Err(e));
            }
        }
    }
}
