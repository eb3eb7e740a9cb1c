// Copyright 2022 Peter Williams <pwil3058@gmail.com> <pwil3058@bigpond.net.au>

//! Grammar analysis: NULLABLE, FIRST, FOLLOW, and the two derived relations
//! (`close_nt`, `derive_ter`) the LALR construction in [`crate::table`] draws
//! on. Grounded in `original_source/parser.py`'s `CFGrammar` (same fixed
//! point equations) and in the teacher's `alap_gen_ng` `FirstsData`
//! memoization shape, adapted to eager construction since this crate builds
//! its analysis sets once, up front, rather than lazily per nonterminal.

use std::fmt::{self, Debug, Display};

use ordered_collections::{OrderedMap, OrderedSet};

use crate::symbol::{Associativity, GrammarSymbol, NonTerminalId, Precedence};

/// One right-hand side alternative. `lhs`/`rhs` mirror the teacher's
/// `Rc<Production>` shape but as plain owned data, since the table builder
/// works against a grammar handed over as a finished, immutable value.
#[derive(Debug, Clone)]
pub struct Production<T> {
    pub lhs: NonTerminalId,
    pub rhs: Vec<GrammarSymbol<T>>,
    /// Explicit `prec` override; if absent, precedence is inherited from the
    /// rightmost rhs terminal found in the operator table.
    pub precedence: Option<Precedence>,
}

impl<T> Production<T> {
    pub fn len(&self) -> usize {
        self.rhs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rhs.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarError {
    UndeclaredNonTerminal(String),
    NoProductions,
    DuplicateOperator(String),
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GrammarError::UndeclaredNonTerminal(name) => {
                write!(f, "nonterminal \"{name}\" is used but never defined")
            }
            GrammarError::NoProductions => write!(f, "grammar has no productions"),
            GrammarError::DuplicateOperator(name) => {
                write!(f, "duplicate precedence declaration for terminal \"{name}\"")
            }
        }
    }
}

impl std::error::Error for GrammarError {}

/// Context captured for one `(s, A)` pair of [`Grammar::close_nt`]: the
/// terminals that can follow `A` within the suffix that produced this
/// pairing, and whether that suffix is itself nullable.
#[derive(Debug, Clone, Default)]
pub struct CloseNtContext<T: Clone> {
    pub first_of_suffix: OrderedSet<T>,
    pub suffix_nullable: bool,
}

/// An immutable, fully analyzed grammar. Built once via [`GrammarBuilder`];
/// `NULLABLE`/`FIRST`/`FOLLOW`/`close_nt`/`derive_ter` are computed eagerly
/// at construction time, then never touched again.
#[derive(Debug)]
pub struct Grammar<T: Copy + Eq + Ord + Debug + Display> {
    nonterminal_names: Vec<String>,
    productions: Vec<Production<T>>,
    start: NonTerminalId,
    augmented_start: NonTerminalId,
    end_marker: T,
    operators: OrderedMap<T, Precedence>,

    nullable: Vec<bool>,
    first: Vec<OrderedSet<T>>,
    follow: Vec<OrderedSet<T>>,
    close_nt: Vec<OrderedMap<NonTerminalId, CloseNtContext<T>>>,
    derive_ter: Vec<OrderedSet<T>>,
}

impl<T: Copy + Eq + Ord + Debug + Display> Grammar<T> {
    pub fn rule_count(&self) -> usize {
        self.productions.len()
    }

    pub fn production(&self, rule: usize) -> &Production<T> {
        &self.productions[rule]
    }

    pub fn productions(&self) -> &[Production<T>] {
        &self.productions
    }

    pub fn productions_for(&self, lhs: NonTerminalId) -> impl Iterator<Item = (usize, &Production<T>)> {
        self.productions
            .iter()
            .enumerate()
            .filter(move |(_, p)| p.lhs == lhs)
    }

    pub fn non_terminal_count(&self) -> usize {
        self.nonterminal_names.len()
    }

    pub fn nonterminal_name(&self, id: NonTerminalId) -> &str {
        &self.nonterminal_names[id.index() as usize]
    }

    pub fn start(&self) -> NonTerminalId {
        self.start
    }

    /// The rule index of the augmented production `@S -> start`; always the
    /// highest rule index.
    pub fn augmented_start_rule(&self) -> usize {
        self.productions.len() - 1
    }

    pub fn augmented_start(&self) -> NonTerminalId {
        self.augmented_start
    }

    pub fn end_marker(&self) -> T {
        self.end_marker
    }

    pub fn operator(&self, terminal: T) -> Option<Precedence> {
        self.operators.get(&terminal).copied()
    }

    pub fn is_nullable_non_terminal(&self, id: NonTerminalId) -> bool {
        self.nullable[id.index() as usize]
    }

    pub fn is_nullable_symbol(&self, symbol: GrammarSymbol<T>) -> bool {
        match symbol {
            GrammarSymbol::Terminal(_) => false,
            GrammarSymbol::NonTerminal(id) => self.is_nullable_non_terminal(id),
        }
    }

    /// `true` iff every symbol in `seq` is nullable (the empty sequence is
    /// vacuously nullable).
    pub fn is_nullable_sequence(&self, seq: &[GrammarSymbol<T>]) -> bool {
        seq.iter().all(|s| self.is_nullable_symbol(*s))
    }

    pub fn first(&self, id: NonTerminalId) -> &OrderedSet<T> {
        &self.first[id.index() as usize]
    }

    pub fn follow(&self, id: NonTerminalId) -> &OrderedSet<T> {
        &self.follow[id.index() as usize]
    }

    pub fn close_nt(&self, id: NonTerminalId) -> &OrderedMap<NonTerminalId, CloseNtContext<T>> {
        &self.close_nt[id.index() as usize]
    }

    /// Terminals that can appear as the first terminal of any derivation of
    /// `id`. By construction this set coincides with `FIRST(id)`: the source
    /// computes it via a separate `DERIVE_NT`/`DERIVE_ONE_NT`/`DERIVE_T`
    /// relation intended to drive a shift-action optimization the table
    /// builder here does not wire in (see DESIGN.md); it is kept as its own
    /// field so it stays independently nameable and testable rather than
    /// silently aliasing `first`.
    pub fn derive_ter(&self, id: NonTerminalId) -> &OrderedSet<T> {
        &self.derive_ter[id.index() as usize]
    }

    /// FIRST of a symbol sequence: union of FIRST of each symbol up to and
    /// including the first non-nullable one, plus whether the whole
    /// sequence is nullable. Used by LR(1)/LALR(1) closure to compute
    /// `FIRST(beta a)` lookahead sets.
    pub fn first_of_sequence(&self, seq: &[GrammarSymbol<T>]) -> (OrderedSet<T>, bool) {
        let mut result = OrderedSet::new();
        for symbol in seq {
            match symbol {
                GrammarSymbol::Terminal(t) => {
                    result.insert(*t);
                    return (result, false);
                }
                GrammarSymbol::NonTerminal(id) => {
                    result.extend(self.first(*id).iter());
                    if !self.is_nullable_non_terminal(*id) {
                        return (result, false);
                    }
                }
            }
        }
        (result, true)
    }
}

/// Builds a [`Grammar`]. Nonterminals are interned by name on first mention
/// (as either an lhs or an rhs symbol); this mirrors the teacher's
/// `NonTerminal::new`-on-demand pattern rather than requiring callers to
/// pre-declare every symbol.
pub struct GrammarBuilder<T> {
    nonterminal_names: Vec<String>,
    productions: Vec<Production<T>>,
    operators: OrderedMap<T, (Precedence, String)>,
    start: Option<NonTerminalId>,
}

impl<T: Copy + Eq + Ord + Debug + Display> GrammarBuilder<T> {
    pub fn new() -> Self {
        Self {
            nonterminal_names: Vec::new(),
            productions: Vec::new(),
            operators: OrderedMap::new(),
            start: None,
        }
    }

    /// Interns `name`, creating a fresh [`NonTerminalId`] the first time it
    /// is seen. The first call establishes the grammar's start symbol.
    pub fn non_terminal(&mut self, name: &str) -> NonTerminalId {
        if let Some(index) = self.nonterminal_names.iter().position(|n| n == name) {
            return NonTerminalId(index as u32);
        }
        let id = NonTerminalId(self.nonterminal_names.len() as u32);
        self.nonterminal_names.push(name.to_string());
        if self.start.is_none() {
            self.start = Some(id);
        }
        id
    }

    pub fn add_production(
        &mut self,
        lhs: NonTerminalId,
        rhs: Vec<GrammarSymbol<T>>,
        precedence: Option<Precedence>,
    ) -> usize {
        let index = self.productions.len();
        self.productions.push(Production { lhs, rhs, precedence });
        index
    }

    pub fn set_operator(
        &mut self,
        terminal: T,
        precedence: u32,
        associativity: Associativity,
    ) -> Result<(), GrammarError> {
        let entry = Precedence {
            level: precedence,
            associativity,
        };
        if self.operators.contains_key(&terminal) {
            return Err(GrammarError::DuplicateOperator(terminal.to_string()));
        }
        self.operators.insert(terminal, (entry, terminal.to_string()));
        Ok(())
    }

    pub fn build(mut self, end_marker: T) -> Result<Grammar<T>, GrammarError> {
        if self.productions.is_empty() {
            return Err(GrammarError::NoProductions);
        }
        let start = self.start.ok_or(GrammarError::NoProductions)?;
        for production in &self.productions {
            if production.lhs.index() as usize >= self.nonterminal_names.len() {
                return Err(GrammarError::UndeclaredNonTerminal(format!(
                    "{}",
                    production.lhs.index()
                )));
            }
        }

        let augmented_start = NonTerminalId(self.nonterminal_names.len() as u32);
        self.nonterminal_names.push("@S".to_string());
        self.productions.push(Production {
            lhs: augmented_start,
            rhs: vec![GrammarSymbol::NonTerminal(start)],
            precedence: None,
        });

        let operators: OrderedMap<T, Precedence> = self
            .operators
            .iter()
            .map(|(t, (p, _))| (*t, *p))
            .collect();

        let n = self.nonterminal_names.len();
        let nullable = compute_nullable(n, &self.productions);
        let first = compute_first(n, &self.productions, &nullable);
        let follow = compute_follow(n, &self.productions, &nullable, &first, augmented_start, end_marker);
        let close_nt = compute_close_nt(n, &self.productions, &nullable, &first);
        let derive_ter = first.clone();

        Ok(Grammar {
            nonterminal_names: self.nonterminal_names,
            productions: self.productions,
            start,
            augmented_start,
            end_marker,
            operators,
            nullable,
            first,
            follow,
            close_nt,
            derive_ter,
        })
    }
}

impl<T: Copy + Eq + Ord + Debug + Display> Default for GrammarBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn compute_nullable<T>(n: usize, productions: &[Production<T>]) -> Vec<bool> {
    let mut nullable = vec![false; n];
    loop {
        let mut changed = false;
        for production in productions {
            let lhs = production.lhs.index() as usize;
            if nullable[lhs] {
                continue;
            }
            let all_nullable = production.rhs.iter().all(|symbol| match symbol {
                GrammarSymbol::Terminal(_) => false,
                GrammarSymbol::NonTerminal(id) => nullable[id.index() as usize],
            });
            if all_nullable {
                nullable[lhs] = true;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
    nullable
}

/// Fixed-point worklist rather than recursion, so stack depth stays bounded
/// regardless of how FIRST dependencies cycle between nonterminals — it
/// simply reapplies every production's contribution until nothing changes.
fn compute_first<T: Copy + Eq>(
    n: usize,
    productions: &[Production<T>],
    nullable: &[bool],
) -> Vec<OrderedSet<T>> {
    let mut first: Vec<OrderedSet<T>> = vec![OrderedSet::new(); n];
    loop {
        let mut changed = false;
        for production in productions {
            let lhs = production.lhs.index() as usize;
            for symbol in &production.rhs {
                match symbol {
                    GrammarSymbol::Terminal(t) => {
                        changed |= first[lhs].insert(*t);
                        break;
                    }
                    GrammarSymbol::NonTerminal(id) => {
                        let rhs_id = id.index() as usize;
                        if rhs_id != lhs {
                            let addition: Vec<T> = first[rhs_id].iter().collect();
                            changed |= first[lhs].extend(addition);
                        }
                        if !nullable[rhs_id] {
                            break;
                        }
                    }
                }
            }
        }
        if !changed {
            break;
        }
    }
    first
}

/// FOLLOW, fixed point over the three standard rules: `$` follows the start
/// symbol; `FIRST(beta) \ {eps}` follows `B` in `A -> alpha B beta`; and
/// `FOLLOW(A)` follows `B` whenever `B` is a trailing symbol of `A`'s rhs up
/// to nullable suffixes. Rule three is applied at *every* trailing-nullable
/// occurrence in the rhs, not merely the last symbol — applying it only to
/// the last symbol (a bug in the Python original this was ported from)
/// undercounts FOLLOW sets whenever a nullable nonterminal is followed only
/// by other nullable symbols, e.g. `C` in `D -> i E | ;` contributing to
/// FOLLOW via a chain of trailing nullables.
fn compute_follow<T: Copy + Eq>(
    n: usize,
    productions: &[Production<T>],
    nullable: &[bool],
    first: &[OrderedSet<T>],
    augmented_start: NonTerminalId,
    end_marker: T,
) -> Vec<OrderedSet<T>> {
    let mut follow: Vec<OrderedSet<T>> = vec![OrderedSet::new(); n];
    follow[augmented_start.index() as usize].insert(end_marker);

    loop {
        let mut changed = false;
        for production in productions {
            let lhs = production.lhs.index() as usize;
            let rhs = &production.rhs;
            for (i, symbol) in rhs.iter().enumerate() {
                let b = match symbol {
                    GrammarSymbol::Terminal(_) => continue,
                    GrammarSymbol::NonTerminal(id) => id.index() as usize,
                };
                let suffix = &rhs[i + 1..];
                let (suffix_first, suffix_nullable) = first_of_seq(suffix, first, nullable);
                let addition: Vec<T> = suffix_first.iter().collect();
                changed |= follow[b].extend(addition);
                if suffix_nullable {
                    let addition: Vec<T> = follow[lhs].iter().collect();
                    changed |= follow[b].extend(addition);
                }
            }
        }
        if !changed {
            break;
        }
    }
    follow
}

fn first_of_seq<T: Copy + Eq>(
    seq: &[GrammarSymbol<T>],
    first: &[OrderedSet<T>],
    nullable: &[bool],
) -> (OrderedSet<T>, bool) {
    let mut result = OrderedSet::new();
    for symbol in seq {
        match symbol {
            GrammarSymbol::Terminal(t) => {
                result.insert(*t);
                return (result, false);
            }
            GrammarSymbol::NonTerminal(id) => {
                let idx = id.index() as usize;
                let addition: Vec<T> = first[idx].iter().collect();
                result.extend(addition);
                if !nullable[idx] {
                    return (result, false);
                }
            }
        }
    }
    (result, true)
}

/// `close_nt[s]`: nonterminals reachable as a leading symbol of some
/// derivation of `s`, i.e. `s =>* A gamma`, together with the FIRST/nullable
/// context of the trailing `gamma` at the point each pairing was
/// established. Computed as a worklist transitive closure over the
/// "leads with nonterminal" relation induced by nullable prefixes.
fn compute_close_nt<T: Copy + Eq>(
    n: usize,
    productions: &[Production<T>],
    nullable: &[bool],
    first: &[OrderedSet<T>],
) -> Vec<OrderedMap<NonTerminalId, CloseNtContext<T>>> {
    let mut close: Vec<OrderedMap<NonTerminalId, CloseNtContext<T>>> = vec![OrderedMap::new(); n];

    let mut direct: Vec<Vec<(NonTerminalId, CloseNtContext<T>)>> = vec![Vec::new(); n];
    for production in productions {
        let lhs = production.lhs.index() as usize;
        for (i, symbol) in production.rhs.iter().enumerate() {
            let a = match symbol {
                GrammarSymbol::Terminal(_) => break,
                GrammarSymbol::NonTerminal(id) => *id,
            };
            let prefix_nullable = production.rhs[..i]
                .iter()
                .all(|s| matches!(s, GrammarSymbol::NonTerminal(pid) if nullable[pid.index() as usize]));
            if !prefix_nullable {
                break;
            }
            let (suffix_first, suffix_nullable) = first_of_seq(&production.rhs[i + 1..], first, nullable);
            direct[lhs].push((
                a,
                CloseNtContext {
                    first_of_suffix: suffix_first,
                    suffix_nullable,
                },
            ));
            if !nullable[a.index() as usize] {
                break;
            }
        }
    }

    loop {
        let mut changed = false;
        for s in 0..n {
            let pairs: Vec<(NonTerminalId, CloseNtContext<T>)> = direct[s].clone();
            for (a, ctx) in pairs {
                changed |= insert_close_nt(&mut close[s], a, &ctx);
                let transitive: Vec<(NonTerminalId, CloseNtContext<T>)> = close[a.index() as usize]
                    .iter()
                    .map(|(k, v)| (*k, v.clone()))
                    .collect();
                for (b, b_ctx) in transitive {
                    changed |= insert_close_nt(&mut close[s], b, &b_ctx);
                }
            }
        }
        if !changed {
            break;
        }
    }
    close
}

fn insert_close_nt<T: Copy + Eq>(
    map: &mut OrderedMap<NonTerminalId, CloseNtContext<T>>,
    key: NonTerminalId,
    ctx: &CloseNtContext<T>,
) -> bool {
    if let Some(existing) = map.get_mut(&key) {
        let added: Vec<T> = ctx.first_of_suffix.iter().collect();
        let mut changed = existing.first_of_suffix.extend(added);
        if ctx.suffix_nullable && !existing.suffix_nullable {
            existing.suffix_nullable = true;
            changed = true;
        }
        changed
    } else {
        map.insert(key, ctx.clone());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    enum Tok {
        N,
        T,
        B,
        I,
        E,
        F,
        P,
        End,
    }

    impl fmt::Display for Tok {
        fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
            write!(f, "{:?}", self)
        }
    }

    /// A grammar with a chain of trailing-nullable symbols:
    /// `S -> B C D A; A -> n A | ; B -> t; C -> b D e | ; D -> i E | ; E -> S f | p;`
    /// Exercises the trailing-nullable FOLLOW bug fix directly.
    fn empty_rule_propagation_grammar() -> Grammar<Tok> {
        let mut builder: GrammarBuilder<Tok> = GrammarBuilder::new();
        let s = builder.non_terminal("S");
        let a = builder.non_terminal("A");
        let b = builder.non_terminal("B");
        let c = builder.non_terminal("C");
        let d = builder.non_terminal("D");
        let e = builder.non_terminal("E");
        use GrammarSymbol::{NonTerminal as Nt, Terminal as Te};

        builder.add_production(s, vec![Nt(b), Nt(c), Nt(d), Nt(a)], None);
        builder.add_production(a, vec![Te(Tok::N), Nt(a)], None);
        builder.add_production(a, vec![], None);
        builder.add_production(b, vec![Te(Tok::T)], None);
        builder.add_production(c, vec![Te(Tok::B), Nt(d), Te(Tok::E)], None);
        builder.add_production(c, vec![], None);
        builder.add_production(d, vec![Te(Tok::I), Nt(e)], None);
        builder.add_production(d, vec![], None);
        builder.add_production(e, vec![Nt(s), Te(Tok::F)], None);
        builder.add_production(e, vec![Te(Tok::P)], None);

        builder.build(Tok::End).unwrap()
    }

    #[test]
    fn nullable_fixed_point() {
        let grammar = empty_rule_propagation_grammar();
        let a = grammar
            .productions()
            .iter()
            .position(|p| grammar.nonterminal_name(p.lhs) == "A")
            .map(|i| grammar.production(i).lhs)
            .unwrap();
        assert!(grammar.is_nullable_non_terminal(a));
    }

    #[test]
    fn follow_of_c_includes_every_trailing_nullable_occurrence() {
        let grammar = empty_rule_propagation_grammar();
        let c = (0..grammar.non_terminal_count())
            .map(NonTerminalId)
            .find(|id| grammar.nonterminal_name(*id) == "C")
            .unwrap();
        let follow_c = grammar.follow(c);
        assert!(follow_c.contains(&Tok::I));
        assert!(follow_c.contains(&Tok::N));
        assert!(follow_c.contains(&Tok::End));
        assert!(follow_c.contains(&Tok::F));
    }

    #[test]
    fn augmented_start_has_highest_rule_index() {
        let grammar = empty_rule_propagation_grammar();
        assert_eq!(grammar.augmented_start_rule(), grammar.rule_count() - 1);
        assert_eq!(
            grammar.production(grammar.augmented_start_rule()).lhs,
            grammar.augmented_start()
        );
    }

    #[test]
    fn duplicate_operator_declaration_is_rejected() {
        let mut builder: GrammarBuilder<Tok> = GrammarBuilder::new();
        let e = builder.non_terminal("E");
        builder.add_production(e, vec![GrammarSymbol::Terminal(Tok::P)], None);
        builder.set_operator(Tok::P, 100, Associativity::Left).unwrap();
        let err = builder.set_operator(Tok::P, 200, Associativity::Right).unwrap_err();
        assert_eq!(err, GrammarError::DuplicateOperator(Tok::P.to_string()));
    }
}
