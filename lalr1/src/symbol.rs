// Copyright 2022 Peter Williams <pwil3058@gmail.com> <pwil3058@bigpond.net.au>

use std::fmt;

/// An opaque handle identifying one of the grammar's nonterminals.
///
/// Productions and item sets refer to nonterminals by this id rather than by
/// a caller-supplied enum: the table builder works against grammars that
/// arrive as runtime data (hand-built or parsed from grammar text), so it
/// cannot assume a compile-time nonterminal type the way generated code can.
/// The caller-facing names are kept alongside, in [`crate::Grammar`], purely
/// for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NonTerminalId(pub(crate) u32);

impl NonTerminalId {
    pub fn index(self) -> u32 {
        self.0
    }

    pub fn from_index(index: u32) -> Self {
        Self(index)
    }
}

impl fmt::Display for NonTerminalId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "N{}", self.0)
    }
}

/// Operator associativity, attached to a terminal via the operator table or
/// to a production via an explicit `prec` override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Associativity {
    #[default]
    NonAssoc,
    Left,
    Right,
}

/// `(precedence, associativity)` as attached to a terminal in the operator
/// table, or inherited by a production from its rightmost precedence-bearing
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Precedence {
    pub level: u32,
    pub associativity: Associativity,
}

/// A grammar symbol: either one of the caller's terminal tags, or an
/// internal nonterminal handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum GrammarSymbol<T> {
    Terminal(T),
    NonTerminal(NonTerminalId),
}

impl<T> GrammarSymbol<T> {
    pub fn is_terminal(&self) -> bool {
        matches!(self, GrammarSymbol::Terminal(_))
    }

    pub fn is_non_terminal(&self) -> bool {
        matches!(self, GrammarSymbol::NonTerminal(_))
    }

    pub fn as_terminal(&self) -> Option<&T> {
        match self {
            GrammarSymbol::Terminal(t) => Some(t),
            GrammarSymbol::NonTerminal(_) => None,
        }
    }

    pub fn as_non_terminal(&self) -> Option<NonTerminalId> {
        match self {
            GrammarSymbol::Terminal(_) => None,
            GrammarSymbol::NonTerminal(id) => Some(*id),
        }
    }
}
