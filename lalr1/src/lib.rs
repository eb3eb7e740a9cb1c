// Copyright 2022 Peter Williams <pwil3058@gmail.com> <pwil3058@bigpond.net.au>

//! A runtime LR table builder and driver: hand it a [`Grammar`] built from
//! data (not a generated one), choose an [`Algorithm`], and get back either
//! a [`Table`] ready to drive with [`Parser::parse_text`], or a
//! [`ConflictError`] naming the first unresolved ambiguity.
//!
//! Grounded in the teacher crate's split between `src/state.rs` (item-set
//! algebra and table construction) and `src/lib.rs` (the driver) — see
//! `DESIGN.md` for the full grounding ledger and the points where this
//! crate's semantics diverge from the teacher's code-generating original.

mod cache;
mod driver;
mod grammar;
mod item;
mod symbol;
mod table;

pub use cache::{CacheRecord, TableMismatch};
pub use driver::{ParseStack, Parser, ParserError};
pub use grammar::{Grammar, GrammarBuilder, GrammarError, Production};
pub use item::{closure, closure_slr, goto_kernel, goto_kernel_slr, ItemKey, ItemSet, Lookahead};
pub use symbol::{Associativity, GrammarSymbol, NonTerminalId, Precedence};
pub use table::{build, Action, Algorithm, BuildOptions, ConflictError, ConflictLog, Table};

use std::fmt::{Debug, Display};

/// The union of everything this crate can fail with, for callers that want
/// one error type end to end (grammar construction through parsing).
#[derive(Debug, Clone)]
pub enum Error<T: Copy + Eq + Ord + Debug + Display> {
    Grammar(GrammarError),
    Conflict(ConflictError<T>),
    Parse(ParserError<T>),
    Cache(TableMismatch),
}

impl<T: Copy + Eq + Ord + Debug + Display> std::fmt::Display for Error<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::Grammar(e) => write!(f, "{e}"),
            Error::Conflict(e) => write!(f, "{e}"),
            Error::Parse(e) => write!(f, "{e}"),
            Error::Cache(e) => write!(f, "{e}"),
        }
    }
}

impl<T: Copy + Eq + Ord + Debug + Display> std::error::Error for Error<T> {}

impl<T: Copy + Eq + Ord + Debug + Display> From<GrammarError> for Error<T> {
    fn from(e: GrammarError) -> Self {
        Error::Grammar(e)
    }
}

impl<T: Copy + Eq + Ord + Debug + Display> From<ConflictError<T>> for Error<T> {
    fn from(e: ConflictError<T>) -> Self {
        Error::Conflict(e)
    }
}

impl<T: Copy + Eq + Ord + Debug + Display> From<ParserError<T>> for Error<T> {
    fn from(e: ParserError<T>) -> Self {
        Error::Parse(e)
    }
}

impl<T: Copy + Eq + Ord + Debug + Display> From<TableMismatch> for Error<T> {
    fn from(e: TableMismatch) -> Self {
        Error::Cache(e)
    }
}
