// Copyright 2022 Peter Williams <pwil3058@gmail.com> <pwil3058@bigpond.net.au>

//! Cache boundary: a [`Table`] is costly enough to rebuild (full
//! closure/goto enumeration) that a caller may want to persist one to disk
//! and reload it on the next run, keyed by a grammar fingerprint it
//! controls. `OrderedMap`/`OrderedSet` have no `serde` impl (that crate is
//! kept dependency-free), so this module is the one place that flattens a
//! [`Table`] to plain `Vec`s for [`serde_json`] and back.

use std::fmt::{self, Debug, Display};

use serde::{Deserialize, Serialize};

use crate::symbol::NonTerminalId;
use crate::table::{Action, ConflictLog, Table};

/// On-disk shape of a [`Table`]. `version` is an opaque fingerprint the
/// caller chooses (e.g. a hash of the grammar source); [`CacheRecord::load`]
/// rejects a record whose `version` doesn't match the caller's current one
/// rather than silently serving a stale table for a grammar that has since
/// changed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheRecord<T> {
    pub version: u64,
    action: Vec<((usize, T), Action)>,
    goto: Vec<((usize, u32), usize)>,
    state_count: usize,
    log: ConflictLog<T>,
    conflicts_exceeded: bool,
}

/// The cached table's `version` doesn't match the version the caller
/// expected — the grammar has moved on and the cache is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableMismatch {
    pub expected: u64,
    pub found: u64,
}

impl fmt::Display for TableMismatch {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "cached table version {} does not match expected version {}",
            self.found, self.expected
        )
    }
}

impl std::error::Error for TableMismatch {}

impl<T: Copy + Eq + Ord + Debug + Display + Serialize> CacheRecord<T> {
    pub fn from_table(table: &Table<T>, version: u64) -> Self {
        Self {
            version,
            action: table.action.iter().map(|(&k, &v)| (k, v)).collect(),
            goto: table
                .goto
                .iter()
                .map(|(&(state, nt), &target)| ((state, nt.index()), target))
                .collect(),
            state_count: table.state_count,
            log: table.log.clone(),
            conflicts_exceeded: table.conflicts_exceeded,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self>
    where
        T: for<'de> Deserialize<'de>,
    {
        serde_json::from_str(text)
    }
}

impl<T: Copy + Eq + Ord + Debug + Display> CacheRecord<T> {
    /// Reconstitutes the [`Table`], failing if `self.version` doesn't match
    /// `expected_version`.
    pub fn into_table(self, expected_version: u64) -> Result<Table<T>, TableMismatch> {
        if self.version != expected_version {
            return Err(TableMismatch {
                expected: expected_version,
                found: self.version,
            });
        }
        let mut action = ordered_collections::OrderedMap::new();
        for (k, v) in self.action {
            action.insert(k, v);
        }
        let mut goto = ordered_collections::OrderedMap::new();
        for ((state, nt_index), target) in self.goto {
            goto.insert((state, NonTerminalId::from_index(nt_index)), target);
        }
        Ok(Table {
            action,
            goto,
            state_count: self.state_count,
            log: self.log,
            conflicts_exceeded: self.conflicts_exceeded,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::GrammarBuilder;
    use crate::symbol::GrammarSymbol::Terminal as Te;
    use crate::table::{build, Algorithm, BuildOptions};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
    enum Tok {
        Id,
        End,
    }

    impl fmt::Display for Tok {
        fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
            write!(f, "{:?}", self)
        }
    }

    fn trivial_table() -> Table<Tok> {
        let mut builder: GrammarBuilder<Tok> = GrammarBuilder::new();
        let s = builder.non_terminal("S");
        builder.add_production(s, vec![Te(Tok::Id)], None);
        let grammar = builder.build(Tok::End).unwrap();
        build(&grammar, BuildOptions::default()).unwrap()
    }

    #[test]
    fn round_trips_through_json() {
        let table = trivial_table();
        let record = CacheRecord::from_table(&table, 42);
        let text = record.to_json().unwrap();
        let reloaded: CacheRecord<Tok> = CacheRecord::from_json(&text).unwrap();
        let restored = reloaded.into_table(42).unwrap();
        assert_eq!(restored.state_count, table.state_count);
        assert_eq!(restored.action(0, Tok::Id), table.action(0, Tok::Id));
    }

    #[test]
    fn rejects_a_version_mismatch() {
        let table = trivial_table();
        let record = CacheRecord::from_table(&table, 7);
        let err = record.into_table(8).unwrap_err();
        assert_eq!(err, TableMismatch { expected: 8, found: 7 });
    }
}
