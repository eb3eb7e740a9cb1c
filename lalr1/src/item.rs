// Copyright 2022 Peter Williams <pwil3058@gmail.com> <pwil3058@bigpond.net.au>

//! Item/item-set algebra: closure and goto, both in their plain LR(0)/SLR
//! form and in the lookahead-carrying form the canonical LR(1) and LALR(1)
//! kernel-propagation constructions share. Grounded in `src/state.rs`'s
//! `GrammarItemKey`/`GrammarItemSet` and `alap_gen/src/grammar.rs`'s
//! `closure` method; item-set identity (by key-set, lookaheads merged) is
//! exactly the `GrammarItemSet` equality `src/state.rs` implements.

use std::fmt::{Debug, Display};

use ordered_collections::{OrderedMap, OrderedSet, Select, ToOrderedSet};

use crate::grammar::Grammar;
use crate::symbol::GrammarSymbol;

/// A dotted production: rule index plus dot position. The kernel of a state
/// is the set of items with `dot != 0`, plus the augmented start item at
/// dot 0 — the set of kernel items identifies a state uniquely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemKey {
    pub rule: usize,
    pub dot: usize,
}

impl ItemKey {
    pub fn start(rule: usize) -> Self {
        Self { rule, dot: 0 }
    }

    pub fn shifted(&self) -> Self {
        Self {
            rule: self.rule,
            dot: self.dot + 1,
        }
    }

    pub fn next_symbol<T: Copy + Eq + Ord + Debug + Display>(
        &self,
        grammar: &Grammar<T>,
    ) -> Option<GrammarSymbol<T>> {
        grammar.production(self.rule).rhs.get(self.dot).copied()
    }

    pub fn rest_after_next<T: Copy + Eq + Ord + Debug + Display>(
        &self,
        grammar: &Grammar<T>,
    ) -> Vec<GrammarSymbol<T>> {
        grammar.production(self.rule).rhs[self.dot + 1..].to_vec()
    }

    pub fn is_reducible<T: Copy + Eq + Ord + Debug + Display>(&self, grammar: &Grammar<T>) -> bool {
        self.dot >= grammar.production(self.rule).len()
    }

    pub fn is_kernel<T: Copy + Eq + Ord + Debug + Display>(&self, grammar: &Grammar<T>) -> bool {
        self.dot != 0 || self.rule == grammar.augmented_start_rule()
    }
}

/// A lookahead slot during LR(1)/LALR(1) closure: either a concrete
/// terminal, or the dummy propagation marker `#` used by the kernel +
/// propagation technique to tell "lookahead inherited from the originating
/// kernel item" apart from "lookahead generated here".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Lookahead<T> {
    Terminal(T),
    Propagate,
}

pub type ItemSet<T> = OrderedMap<ItemKey, OrderedSet<Lookahead<T>>>;

/// SLR/LR(0) closure: expand every nonterminal immediately after a dot,
/// ignoring lookahead entirely (SLR derives reduce lookaheads from FOLLOW
/// at table-construction time instead).
pub fn closure_slr<T: Copy + Eq + Ord + Debug + Display>(
    grammar: &Grammar<T>,
    kernel: &OrderedSet<ItemKey>,
) -> OrderedSet<ItemKey> {
    let mut set = kernel.clone();
    loop {
        let mut changed = false;
        let current: Vec<ItemKey> = set.iter().cloned().collect();
        for item in current {
            if let Some(GrammarSymbol::NonTerminal(b)) = item.next_symbol(grammar) {
                for (rule, _) in grammar.productions_for(b) {
                    changed |= set.insert(ItemKey::start(rule));
                }
            }
        }
        if !changed {
            break;
        }
    }
    set
}

/// `goto(I, X)` in its plain kernel form: the (unclosed) set of items
/// shifted over `X`. Callers close the result with [`closure_slr`].
pub fn goto_kernel_slr<T: Copy + Eq + Ord + Debug + Display>(
    grammar: &Grammar<T>,
    closed: &OrderedSet<ItemKey>,
    symbol: GrammarSymbol<T>,
) -> OrderedSet<ItemKey> {
    closed
        .iter()
        .select(|item| item.next_symbol(grammar) == Some(symbol))
        .map(ItemKey::shifted)
        .to_set()
}

/// Lookahead-aware closure, shared by canonical LR(1) (lookaheads are always
/// concrete terminals) and by the LALR kernel + propagation technique
/// (lookaheads may include the `#` dummy seeded on a single kernel item).
pub fn closure<T: Copy + Eq + Ord + Debug + Display>(grammar: &Grammar<T>, kernel: &ItemSet<T>) -> ItemSet<T> {
    let mut set = kernel.clone();
    loop {
        let mut changed = false;
        let current: Vec<(ItemKey, OrderedSet<Lookahead<T>>)> =
            set.iter().map(|(k, v)| (*k, v.clone())).collect();
        for (item, lookaheads) in current {
            if let Some(GrammarSymbol::NonTerminal(b)) = item.next_symbol(grammar) {
                let beta = item.rest_after_next(grammar);
                let (beta_first, beta_nullable) = grammar.first_of_sequence(&beta);
                for (rule, _) in grammar.productions_for(b) {
                    let new_item = ItemKey::start(rule);
                    let mut additions: Vec<Lookahead<T>> =
                        beta_first.iter().map(|t| Lookahead::Terminal(*t)).collect();
                    if beta_nullable {
                        additions.extend(lookaheads.iter().copied());
                    }
                    if let Some(existing) = set.get_mut(&new_item) {
                        changed |= existing.extend(additions);
                    } else {
                        let mut new_set = OrderedSet::new();
                        new_set.extend(additions);
                        set.insert(new_item, new_set);
                        changed = true;
                    }
                }
            }
        }
        if !changed {
            break;
        }
    }
    set
}

/// Lookahead-aware `goto` in unclosed kernel form: items shifted over
/// `symbol`, carrying their current lookahead sets forward. The caller
/// closes the result (or, for LALR, treats it as a target kernel whose
/// lookaheads still need propagating).
pub fn goto_kernel<T: Copy + Eq + Ord + Debug + Display>(
    grammar: &Grammar<T>,
    closed: &ItemSet<T>,
    symbol: GrammarSymbol<T>,
) -> ItemSet<T> {
    let mut result = ItemSet::new();
    for (item, lookaheads) in closed.iter() {
        if item.next_symbol(grammar) == Some(symbol) {
            let shifted = item.shifted();
            if let Some(existing) = result.get_mut(&shifted) {
                existing.extend(lookaheads.iter().copied());
            } else {
                result.insert(shifted, lookaheads.clone());
            }
        }
    }
    result
}

/// Every grammar symbol (terminal or nonterminal) that appears immediately
/// after a dot somewhere in `items` — the set of symbols `goto` must be
/// computed for from this state.
pub fn symbols_after_dot<T: Copy + Eq + Ord + Debug + Display>(
    grammar: &Grammar<T>,
    items: impl Iterator<Item = ItemKey>,
) -> OrderedSet<GrammarSymbol<T>> {
    items.filter_map(|item| item.next_symbol(grammar)).to_set()
}
