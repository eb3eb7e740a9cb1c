// Copyright 2022 Peter Williams <pwil3058@gmail.com> <pwil3058@bigpond.net.au>

//! Table construction: drives item-set enumeration for SLR, canonical
//! LR(1), and LALR(1), and applies the one shared conflict-resolution
//! policy. Grounded in `src/state.rs`'s
//! `resolve_shift_reduce_conflicts`/`resolve_reduce_reduce_conflicts` for
//! the policy, and in `original_source/parser.py`'s `LALRtable.items()` for
//! the kernel + propagation construction (independently corroborated by
//! `mirryi-isc/lalr/src/lalr.rs`).

use std::fmt::{self, Debug, Display};

use ordered_collections::{OrderedMap, OrderedSet};
use serde::{Deserialize, Serialize};

use crate::grammar::Grammar;
use crate::item::{closure, closure_slr, goto_kernel, goto_kernel_slr, symbols_after_dot, ItemKey, ItemSet, Lookahead};
use crate::symbol::{Associativity, GrammarSymbol, NonTerminalId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Slr,
    Lr1,
    Lalr1,
}

/// Explicit configuration threaded into the builder, replacing the global
/// mutable state (`_DEBUG`, module singletons) the source relies on.
#[derive(Debug, Clone, Copy)]
pub struct BuildOptions {
    pub algorithm: Algorithm,
    /// If `false`, any conflict is a fatal `ConflictError`. If `true`,
    /// conflicts are resolved per policy and recorded in the log.
    pub resolve_silently: bool,
    /// Non-fatal warning threshold: if `log.sr.len() + log.rr.len() >
    /// expect`, [`build`] still succeeds but flags the table as
    /// over-threshold via [`BuildOutcome::conflicts_exceeded`].
    pub expect: usize,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Lalr1,
            resolve_silently: true,
            expect: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Shift(usize),
    Reduce(usize),
    Accept,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictLog<T> {
    pub sr: Vec<(usize, T, usize, usize)>,
    pub rr: Vec<(usize, T, usize, usize)>,
}

impl<T> ConflictLog<T> {
    pub fn len(&self) -> usize {
        self.sr.len() + self.rr.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictError<T> {
    ShiftReduce { state: usize, terminal: T, shift_to: usize, reduce_rule: usize },
    ReduceReduce { state: usize, terminal: T, rule_a: usize, rule_b: usize },
}

impl<T: Display> fmt::Display for ConflictError<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConflictError::ShiftReduce {
                state,
                terminal,
                shift_to,
                reduce_rule,
            } => write!(
                f,
                "shift/reduce conflict in state {state} on {terminal}: shift to {shift_to} or reduce rule {reduce_rule}"
            ),
            ConflictError::ReduceReduce {
                state,
                terminal,
                rule_a,
                rule_b,
            } => write!(
                f,
                "reduce/reduce conflict in state {state} on {terminal}: rule {rule_a} or rule {rule_b}"
            ),
        }
    }
}

impl<T: Debug + Display> std::error::Error for ConflictError<T> {}

/// A built, read-only table. `action`/`goto` are consulted by the driver;
/// `log`/`conflicts_exceeded` are diagnostic data a caller can inspect
/// without re-running the build.
#[derive(Debug, Clone)]
pub struct Table<T: Copy + Eq + Ord + Debug + Display> {
    pub(crate) action: OrderedMap<(usize, T), Action>,
    pub(crate) goto: OrderedMap<(usize, NonTerminalId), usize>,
    pub state_count: usize,
    pub log: ConflictLog<T>,
    pub conflicts_exceeded: bool,
}

impl<T: Copy + Eq + Ord + Debug + Display> Table<T> {
    pub fn action(&self, state: usize, terminal: T) -> Option<Action> {
        self.action.get(&(state, terminal)).copied()
    }

    pub fn goto(&self, state: usize, non_terminal: NonTerminalId) -> Option<usize> {
        self.goto.get(&(state, non_terminal)).copied()
    }

    /// Every terminal with a defined action in `state` — the "expected"
    /// set reported alongside a syntax error.
    pub fn expected_terminals(&self, state: usize) -> std::collections::BTreeSet<T>
    where
        T: Ord,
    {
        self.action
            .keys()
            .filter(|(s, _)| *s == state)
            .map(|(_, t)| t)
            .collect()
    }
}

/// Builds `table.action`/`table.goto` for `grammar` per `options`,
/// dispatching to the SLR, canonical LR(1), or LALR(1) state-enumeration
/// strategy and then applying the shared conflict-resolution policy
/// uniformly over the resulting item sets.
pub fn build<T: Copy + Eq + Ord + Debug + Display>(
    grammar: &Grammar<T>,
    options: BuildOptions,
) -> Result<Table<T>, ConflictError<T>> {
    let (states, goto_ref): (Vec<OrderedMap<ItemKey, OrderedSet<T>>>, OrderedMap<(usize, GrammarSymbol<T>), usize>) =
        match options.algorithm {
            Algorithm::Slr => enumerate_slr(grammar),
            Algorithm::Lr1 => enumerate_lr1(grammar),
            Algorithm::Lalr1 => enumerate_lalr1(grammar),
        };

    let mut action: OrderedMap<(usize, T), Action> = OrderedMap::new();
    let mut goto: OrderedMap<(usize, NonTerminalId), usize> = OrderedMap::new();
    let mut log: ConflictLog<T> = ConflictLog::default();

    for (&(i, symbol), &j) in goto_ref.iter() {
        match symbol {
            GrammarSymbol::Terminal(t) => {
                insert_action(&mut action, i, t, Action::Shift(j))?;
            }
            GrammarSymbol::NonTerminal(n) => {
                goto.insert((i, n), j);
            }
        }
    }

    for (i, items) in states.iter().enumerate() {
        for (key, lookahead) in items.iter() {
            if key.is_reducible(grammar) {
                let rule = key.rule;
                let lhs = grammar.production(rule).lhs;
                if lhs == grammar.augmented_start() {
                    action.insert((i, grammar.end_marker()), Action::Accept);
                    continue;
                }
                for terminal in lookahead.iter() {
                    insert_reduce(&mut action, &mut log, grammar, options, i, *terminal, rule)?;
                }
            }
        }
    }

    let conflicts_exceeded = options.resolve_silently && log.len() > options.expect;

    Ok(Table {
        action,
        goto,
        state_count: states.len(),
        log,
        conflicts_exceeded,
    })
}

fn find_state(states: &[OrderedSet<ItemKey>], kernel: &OrderedSet<ItemKey>) -> Option<usize> {
    if kernel.is_empty() {
        return None;
    }
    states.iter().position(|s| s.is_subset(kernel) && kernel.is_subset(s))
}

fn insert_action<T: Copy + Eq + Ord + Debug + Display>(
    action: &mut OrderedMap<(usize, T), Action>,
    state: usize,
    terminal: T,
    new_action: Action,
) -> Result<(), ConflictError<T>> {
    match action.get(&(state, terminal)).copied() {
        None => {
            action.insert((state, terminal), new_action);
            Ok(())
        }
        Some(existing) => {
            // A shift already recorded for this (state, terminal): shifts
            // are unambiguous by construction (goto is a function), so a
            // second shift insertion is always a no-op re-derivation.
            if existing == new_action {
                return Ok(());
            }
            action.insert((state, terminal), new_action);
            Ok(())
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn insert_reduce<T: Copy + Eq + Ord + Debug + Display>(
    action: &mut OrderedMap<(usize, T), Action>,
    log: &mut ConflictLog<T>,
    grammar: &Grammar<T>,
    options: BuildOptions,
    state: usize,
    terminal: T,
    rule: usize,
) -> Result<(), ConflictError<T>> {
    match action.get(&(state, terminal)).copied() {
        None => {
            action.insert((state, terminal), Action::Reduce(rule));
            Ok(())
        }
        Some(Action::Shift(shift_to)) => {
            resolve_shift_reduce(action, log, grammar, options, state, terminal, shift_to, rule)
        }
        Some(Action::Reduce(other_rule)) => {
            resolve_reduce_reduce(action, log, options, state, terminal, other_rule, rule)
        }
        Some(Action::Accept) => Ok(()),
    }
}

/// Shift/reduce resolution: operator precedence/associativity when
/// both sides carry it, otherwise shift-by-default under
/// `resolve_silently`, else a fatal conflict.
fn resolve_shift_reduce<T: Copy + Eq + Ord + Debug + Display>(
    action: &mut OrderedMap<(usize, T), Action>,
    log: &mut ConflictLog<T>,
    grammar: &Grammar<T>,
    options: BuildOptions,
    state: usize,
    terminal: T,
    shift_to: usize,
    reduce_rule: usize,
) -> Result<(), ConflictError<T>> {
    let terminal_prec = grammar.operator(terminal);
    let rule_prec = rule_precedence(grammar, reduce_rule);

    if let (Some(t_prec), Some(r_prec)) = (terminal_prec, rule_prec) {
        if r_prec.level > t_prec.level {
            action.insert((state, terminal), Action::Reduce(reduce_rule));
            return Ok(());
        } else if r_prec.level < t_prec.level {
            action.insert((state, terminal), Action::Shift(shift_to));
            return Ok(());
        } else {
            match t_prec.associativity {
                Associativity::Left => {
                    action.insert((state, terminal), Action::Reduce(reduce_rule));
                    return Ok(());
                }
                Associativity::Right => {
                    action.insert((state, terminal), Action::Shift(shift_to));
                    return Ok(());
                }
                // A tie with no associativity to break it is still an
                // ambiguity the grammar author should see, even though the
                // policy below picks a default for it.
                Associativity::NonAssoc => {
                    log.sr.push((state, terminal, shift_to, reduce_rule));
                    action.insert((state, terminal), Action::Shift(shift_to));
                    return Ok(());
                }
            }
        }
    }

    // No operator info on one or both sides: fall back to policy, and this
    // is the case that actually needs logging, since nothing about the
    // grammar itself picked the resolution.
    if options.resolve_silently {
        log.sr.push((state, terminal, shift_to, reduce_rule));
        action.insert((state, terminal), Action::Shift(shift_to));
        Ok(())
    } else {
        Err(ConflictError::ShiftReduce {
            state,
            terminal,
            shift_to,
            reduce_rule,
        })
    }
}

fn resolve_reduce_reduce<T: Copy + Eq + Ord + Debug + Display>(
    action: &mut OrderedMap<(usize, T), Action>,
    log: &mut ConflictLog<T>,
    options: BuildOptions,
    state: usize,
    terminal: T,
    existing_rule: usize,
    new_rule: usize,
) -> Result<(), ConflictError<T>> {
    if existing_rule == new_rule {
        return Ok(());
    }
    if options.resolve_silently {
        let (keep, drop) = if existing_rule < new_rule {
            (existing_rule, new_rule)
        } else {
            (new_rule, existing_rule)
        };
        log.rr.push((state, terminal, keep, drop));
        action.insert((state, terminal), Action::Reduce(keep));
        Ok(())
    } else {
        Err(ConflictError::ReduceReduce {
            state,
            terminal,
            rule_a: existing_rule,
            rule_b: new_rule,
        })
    }
}

/// Rule precedence: explicit `prec` override, else inherited from the
/// rightmost rhs terminal that carries operator info.
fn rule_precedence<T: Copy + Eq + Ord + Debug + Display>(
    grammar: &Grammar<T>,
    rule: usize,
) -> Option<crate::symbol::Precedence> {
    let production = grammar.production(rule);
    if let Some(prec) = production.precedence {
        return Some(prec);
    }
    production
        .rhs
        .iter()
        .rev()
        .find_map(|symbol| symbol.as_terminal().and_then(|t| grammar.operator(*t)))
}

// ---------------------------------------------------------------------
// State enumeration
// ---------------------------------------------------------------------

/// SLR: kernel items carry no lookahead; reduce lookaheads come from
/// FOLLOW(lhs) at table-construction time, so every item's "lookahead set"
/// here is just a placeholder equal to FOLLOW(lhs(rule)).
type EnumeratedStates<T> = (Vec<OrderedMap<ItemKey, OrderedSet<T>>>, OrderedMap<(usize, GrammarSymbol<T>), usize>);

fn enumerate_slr<T: Copy + Eq + Ord + Debug + Display>(grammar: &Grammar<T>) -> EnumeratedStates<T> {
    let mut kernels: Vec<OrderedSet<ItemKey>> = Vec::new();
    let mut closures: Vec<OrderedSet<ItemKey>> = Vec::new();
    let mut goto_ref: OrderedMap<(usize, GrammarSymbol<T>), usize> = OrderedMap::new();

    let mut start_kernel = OrderedSet::new();
    start_kernel.insert(ItemKey::start(grammar.augmented_start_rule()));
    kernels.push(start_kernel.clone());
    closures.push(closure_slr(grammar, &start_kernel));

    let mut i = 0;
    while i < kernels.len() {
        let keys: Vec<ItemKey> = closures[i].iter().copied().collect();
        let symbols = symbols_after_dot(grammar, keys.into_iter());
        for symbol in symbols.iter() {
            let target = goto_kernel_slr(grammar, &closures[i], *symbol);
            if target.is_empty() {
                continue;
            }
            let j = match find_state(&kernels, &target) {
                Some(j) => j,
                None => {
                    let closed = closure_slr(grammar, &target);
                    kernels.push(target);
                    closures.push(closed);
                    kernels.len() - 1
                }
            };
            goto_ref.insert((i, *symbol), j);
        }
        i += 1;
    }

    let states = closures
        .into_iter()
        .map(|closed| {
            closed
                .iter()
                .map(|item| {
                    let lookahead = if item.is_reducible(grammar) {
                        grammar.follow(grammar.production(item.rule).lhs).clone()
                    } else {
                        OrderedSet::new()
                    };
                    (*item, lookahead)
                })
                .collect()
        })
        .collect();
    (states, goto_ref)
}

/// Canonical LR(1): item sets carry concrete per-item lookaheads throughout;
/// state identity is full `(item, lookahead)` set equality.
fn enumerate_lr1<T: Copy + Eq + Ord + Debug + Display>(grammar: &Grammar<T>) -> EnumeratedStates<T> {
    let start_item = ItemKey::start(grammar.augmented_start_rule());
    let mut start_kernel: ItemSet<T> = ItemSet::new();
    let mut start_lookahead = OrderedSet::new();
    start_lookahead.insert(Lookahead::Terminal(grammar.end_marker()));
    start_kernel.insert(start_item, start_lookahead);

    let mut states: Vec<ItemSet<T>> = vec![closure(grammar, &start_kernel)];
    let mut goto_ref: OrderedMap<(usize, GrammarSymbol<T>), usize> = OrderedMap::new();

    let mut i = 0;
    while i < states.len() {
        let keys: Vec<ItemKey> = states[i].keys().collect();
        let symbols = symbols_after_dot(grammar, keys.into_iter());
        for symbol in symbols.iter() {
            let target_kernel = goto_kernel(grammar, &states[i], *symbol);
            if target_kernel.is_empty() {
                continue;
            }
            let closed = closure(grammar, &target_kernel);
            let j = match states.iter().position(|s| lr1_sets_equal(s, &closed)) {
                Some(j) => j,
                None => {
                    states.push(closed);
                    states.len() - 1
                }
            };
            goto_ref.insert((i, *symbol), j);
        }
        i += 1;
    }

    let states = states.into_iter().map(strip_propagate_markers).collect();
    (states, goto_ref)
}

fn lr1_sets_equal<T: Copy + Eq>(a: &ItemSet<T>, b: &ItemSet<T>) -> bool {
    a.len() == b.len()
        && a.iter()
            .all(|(k, v)| b.get(k).map(|other| v == other).unwrap_or(false))
}

fn strip_propagate_markers<T: Copy + Eq + Ord>(set: ItemSet<T>) -> OrderedMap<ItemKey, OrderedSet<T>> {
    set.iter()
        .map(|(k, v)| {
            let terminals: OrderedSet<T> = v
                .iter()
                .filter_map(|la| match la {
                    Lookahead::Terminal(t) => Some(*t),
                    Lookahead::Propagate => None,
                })
                .collect();
            (*k, terminals)
        })
        .collect()
}

/// LALR(1) via kernel items + lookahead propagation: builds the
/// LR(0) kernel automaton once, then propagates lookaheads along recorded
/// edges to a fixed point, seeded by `$` at the augmented start kernel
/// item. Equivalent to canonical LR(1) with states merged by core, without
/// ever materializing the (potentially much larger) canonical automaton.
fn enumerate_lalr1<T: Copy + Eq + Ord + Debug + Display>(grammar: &Grammar<T>) -> EnumeratedStates<T> {
    // Step 1: LR(0) kernel automaton.
    let mut kernels: Vec<OrderedSet<ItemKey>> = Vec::new();
    let mut closures: Vec<OrderedSet<ItemKey>> = Vec::new();
    let mut goto_ref: OrderedMap<(usize, GrammarSymbol<T>), usize> = OrderedMap::new();

    let mut start_kernel = OrderedSet::new();
    start_kernel.insert(ItemKey::start(grammar.augmented_start_rule()));
    kernels.push(start_kernel.clone());
    closures.push(closure_slr(grammar, &start_kernel));

    let mut i = 0;
    while i < kernels.len() {
        let keys: Vec<ItemKey> = closures[i].iter().copied().collect();
        let symbols = symbols_after_dot(grammar, keys.into_iter());
        for symbol in symbols.iter() {
            let target = goto_kernel_slr(grammar, &closures[i], *symbol);
            if target.is_empty() {
                continue;
            }
            let j = match find_state(&kernels, &target) {
                Some(j) => j,
                None => {
                    let closed = closure_slr(grammar, &target);
                    kernels.push(target.clone());
                    closures.push(closed);
                    kernels.len() - 1
                }
            };
            goto_ref.insert((i, *symbol), j);
        }
        i += 1;
    }

    // Step 2/3: spontaneous lookaheads + propagation edges, via
    // closure({(k, #)}) for every kernel item k in every state.
    let mut lookaheads: OrderedMap<(usize, ItemKey), OrderedSet<T>> = OrderedMap::new();
    let mut edges: Vec<((usize, ItemKey), (usize, ItemKey))> = Vec::new();

    for (s, kernel) in kernels.iter().enumerate() {
        for &k in kernel.iter() {
            let mut seed: ItemSet<T> = ItemSet::new();
            let mut dummy = OrderedSet::new();
            dummy.insert(Lookahead::Propagate);
            seed.insert(k, dummy);
            let closed = closure(grammar, &seed);

            for (m, la_set) in closed.iter() {
                let symbol = match m.next_symbol(grammar) {
                    Some(symbol) => symbol,
                    None => continue,
                };
                let target_state = match goto_ref.get(&(s, symbol)) {
                    Some(j) => *j,
                    None => continue,
                };
                let target_item = m.shifted();
                for la in la_set.iter() {
                    match la {
                        Lookahead::Propagate => {
                            edges.push(((s, k), (target_state, target_item)));
                        }
                        Lookahead::Terminal(t) => {
                            let entry = lookaheads
                                .get_mut(&(target_state, target_item))
                                .map(|set| {
                                    set.insert(*t);
                                })
                                .is_some();
                            if !entry {
                                let mut set = OrderedSet::new();
                                set.insert(*t);
                                lookaheads.insert((target_state, target_item), set);
                            }
                        }
                    }
                }
            }
        }
    }

    let start_key = (0usize, ItemKey::start(grammar.augmented_start_rule()));
    lookaheads
        .get_mut(&start_key)
        .map(|set| set.insert(grammar.end_marker()))
        .unwrap_or_else(|| {
            let mut set = OrderedSet::new();
            set.insert(grammar.end_marker());
            lookaheads.insert(start_key, set);
        });

    loop {
        let mut changed = false;
        for (from, to) in edges.iter() {
            let from_set = lookaheads.get(from).cloned().unwrap_or_default();
            if from_set.is_empty() {
                continue;
            }
            if let Some(to_set) = lookaheads.get_mut(to) {
                changed |= to_set.extend(from_set.iter().copied());
            } else {
                lookaheads.insert(*to, from_set);
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    // Step 4: close every state's kernel (with its now-final lookaheads) to
    // get the full item set used for reduce-lookahead lookup in table
    // construction.
    let states = kernels
        .iter()
        .enumerate()
        .map(|(s, kernel)| {
            let mut seed: ItemSet<T> = ItemSet::new();
            for &k in kernel.iter() {
                let la = lookaheads.get(&(s, k)).cloned().unwrap_or_default();
                let translated: OrderedSet<Lookahead<T>> = la.iter().map(|t| Lookahead::Terminal(*t)).collect();
                seed.insert(k, translated);
            }
            strip_propagate_markers(closure(grammar, &seed))
        })
        .collect();
    (states, goto_ref)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::GrammarBuilder;
    use crate::symbol::GrammarSymbol::{NonTerminal as Nt, Terminal as Te};
    use std::fmt;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    enum Tok {
        Id,
        Plus,
        Star,
        LParen,
        RParen,
        End,
    }

    impl fmt::Display for Tok {
        fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
            match self {
                Tok::Id => write!(f, "id"),
                Tok::Plus => write!(f, "+"),
                Tok::Star => write!(f, "*"),
                Tok::LParen => write!(f, "("),
                Tok::RParen => write!(f, ")"),
                Tok::End => write!(f, "$"),
            }
        }
    }

    fn arithmetic_grammar() -> Grammar<Tok> {
        let mut builder: GrammarBuilder<Tok> = GrammarBuilder::new();
        let e = builder.non_terminal("E");
        builder.add_production(e, vec![Nt(e), Te(Tok::Plus), Nt(e)], None);
        builder.add_production(e, vec![Nt(e), Te(Tok::Star), Nt(e)], None);
        builder.add_production(e, vec![Te(Tok::LParen), Nt(e), Te(Tok::RParen)], None);
        builder.add_production(e, vec![Te(Tok::Id)], None);
        let mut grammar_builder = builder;
        grammar_builder.set_operator(Tok::Plus, 100, Associativity::Left).unwrap();
        grammar_builder.set_operator(Tok::Star, 200, Associativity::Left).unwrap();
        grammar_builder.build(Tok::End).unwrap()
    }

    #[test]
    fn arithmetic_precedence_resolves_shift_reduce_conflicts_without_logging() {
        let grammar = arithmetic_grammar();
        let table = build(
            &grammar,
            BuildOptions {
                algorithm: Algorithm::Lalr1,
                resolve_silently: true,
                expect: 0,
            },
        )
        .unwrap();
        // Every + / * ambiguity here is resolved cleanly by precedence or
        // by a non-tied associativity, so none of them gets logged.
        assert!(table.log.sr.is_empty());
        assert!(!table.conflicts_exceeded);
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    enum DanglingElse {
        If,
        Then,
        Else,
        Cond,
        Other,
        End,
    }
    impl fmt::Display for DanglingElse {
        fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
            write!(f, "{:?}", self)
        }
    }

    /// `S -> if Cond then S | if Cond then S else S | other`, with no
    /// operator info on `else` — the textbook shift/reduce ambiguity with
    /// nothing to resolve it but a policy default.
    fn dangling_else_grammar() -> Grammar<DanglingElse> {
        use DanglingElse::*;
        let mut builder: GrammarBuilder<DanglingElse> = GrammarBuilder::new();
        let s = builder.non_terminal("S");
        builder.add_production(s, vec![Te(If), Te(Cond), Te(Then), Nt(s)], None);
        builder.add_production(s, vec![Te(If), Te(Cond), Te(Then), Nt(s), Te(Else), Nt(s)], None);
        builder.add_production(s, vec![Te(Other)], None);
        builder.build(End).unwrap()
    }

    #[test]
    fn strict_mode_rejects_unresolved_conflicts() {
        let grammar = dangling_else_grammar();
        let result = build(
            &grammar,
            BuildOptions {
                algorithm: Algorithm::Lalr1,
                resolve_silently: false,
                expect: 0,
            },
        );
        assert!(matches!(result, Err(ConflictError::ShiftReduce { .. })));
    }

    #[test]
    fn dangling_else_resolves_by_shifting_under_permissive_mode() {
        let grammar = dangling_else_grammar();
        let table = build(
            &grammar,
            BuildOptions {
                algorithm: Algorithm::Lalr1,
                resolve_silently: true,
                expect: 1,
            },
        )
        .unwrap();
        assert_eq!(table.log.sr.len(), 1);
        let (state, terminal, shift_to, _reduce_rule) = table.log.sr[0];
        assert_eq!(terminal, DanglingElse::Else);
        assert_eq!(table.action(state, terminal), Some(Action::Shift(shift_to)));
        assert!(!table.conflicts_exceeded);
    }

    #[test]
    fn reduce_reduce_conflict_keeps_the_lower_rule_index_when_permissive() {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
        enum T {
            C,
            End,
        }
        impl fmt::Display for T {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "{:?}", self)
            }
        }
        // S -> A | B; A -> c; B -> c — after shifting `c` both A -> c . and
        // B -> c . reduce on the same ($) lookahead.
        let mut builder: GrammarBuilder<T> = GrammarBuilder::new();
        let s = builder.non_terminal("S");
        let a = builder.non_terminal("A");
        let b = builder.non_terminal("B");
        builder.add_production(s, vec![Nt(a)], None);
        builder.add_production(s, vec![Nt(b)], None);
        builder.add_production(a, vec![Te(T::C)], None);
        builder.add_production(b, vec![Te(T::C)], None);
        let grammar = builder.build(T::End).unwrap();

        let table = build(
            &grammar,
            BuildOptions {
                algorithm: Algorithm::Lalr1,
                resolve_silently: true,
                expect: 1,
            },
        )
        .unwrap();
        assert_eq!(table.log.rr.len(), 1);
        let (state, terminal, keep, drop) = table.log.rr[0];
        assert!(keep < drop);
        assert_eq!(table.action(state, terminal), Some(Action::Reduce(keep)));
        assert!(!table.conflicts_exceeded);

        let strict = build(
            &grammar,
            BuildOptions {
                algorithm: Algorithm::Lalr1,
                resolve_silently: false,
                expect: 0,
            },
        );
        assert!(matches!(strict, Err(ConflictError::ReduceReduce { .. })));
    }

    #[test]
    fn noassoc_operator_ties_resolve_to_shift_and_are_logged() {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
        enum T {
            Id,
            Lt,
            End,
        }
        impl fmt::Display for T {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "{:?}", self)
            }
        }
        let mut builder: GrammarBuilder<T> = GrammarBuilder::new();
        let e = builder.non_terminal("E");
        builder.add_production(e, vec![Nt(e), Te(T::Lt), Nt(e)], None);
        builder.add_production(e, vec![Te(T::Id)], None);
        builder.set_operator(T::Lt, 50, Associativity::NonAssoc).unwrap();
        let grammar = builder.build(T::End).unwrap();

        let table = build(
            &grammar,
            BuildOptions {
                algorithm: Algorithm::Lalr1,
                resolve_silently: true,
                expect: 1,
            },
        )
        .unwrap();
        assert_eq!(table.log.sr.len(), 1);
        let (state, terminal, shift_to, _reduce_rule) = table.log.sr[0];
        assert_eq!(terminal, T::Lt);
        assert_eq!(table.action(state, terminal), Some(Action::Shift(shift_to)));
        assert!(!table.conflicts_exceeded);
    }

    #[test]
    fn right_associative_exponent_resolves_via_operator_info() {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
        enum T {
            Id,
            Caret,
            End,
        }
        impl fmt::Display for T {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "{:?}", self)
            }
        }
        let mut builder: GrammarBuilder<T> = GrammarBuilder::new();
        let e = builder.non_terminal("E");
        builder.add_production(e, vec![Nt(e), GrammarSymbol::Terminal(T::Caret), Nt(e)], None);
        builder.add_production(e, vec![GrammarSymbol::Terminal(T::Id)], None);
        builder.set_operator(T::Caret, 300, Associativity::Right).unwrap();
        let grammar = builder.build(T::End).unwrap();
        let table = build(
            &grammar,
            BuildOptions {
                algorithm: Algorithm::Lalr1,
                resolve_silently: true,
                expect: 0,
            },
        )
        .unwrap();
        // Right-associativity resolves the caret/caret ambiguity outright,
        // with nothing left over to log.
        assert!(table.log.sr.is_empty());
        assert!(!table.conflicts_exceeded);
    }
}
