// Copyright 2021 Peter Williams <pwil3058@gmail.com> <pwil3058@bigpond.net.au>

//! Insertion-ordered set and map with value-equality membership.
//!
//! Item sets and lookahead sets in the LALR construction are themselves
//! compound values (productions, dotted items), so membership has to be
//! decided by `PartialEq`, never by pointer/reference identity. Insertion
//! order is preserved because diagnostics (conflict logs, state numbering)
//! are only deterministic if iteration order is.

use std::fmt;

/// An insertion-ordered sequence with value-based membership.
#[derive(Debug, Clone)]
pub struct OrderedSet<T> {
    items: Vec<T>,
}

impl<T> Default for OrderedSet<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: PartialEq> PartialEq for OrderedSet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.items.len() == other.items.len() && self.items.iter().all(|x| other.contains(x))
    }
}

impl<T: PartialEq> Eq for OrderedSet<T> {}

impl<T: PartialEq + Clone> OrderedSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, x: &T) -> bool {
        self.items.iter().any(|item| item == x)
    }

    pub fn index_of(&self, x: &T) -> Option<usize> {
        self.items.iter().position(|item| item == x)
    }

    /// Appends `x` if not already present. Returns `true` iff the set was mutated.
    pub fn insert(&mut self, x: T) -> bool {
        if self.contains(&x) {
            false
        } else {
            self.items.push(x);
            true
        }
    }

    /// Removes `x` if present. Returns `true` iff the set was mutated.
    pub fn remove(&mut self, x: &T) -> bool {
        if let Some(index) = self.index_of(x) {
            self.items.remove(index);
            true
        } else {
            false
        }
    }

    /// Inserts every element of `ys`. Returns `true` iff any insert mutated the set.
    pub fn extend<I: IntoIterator<Item = T>>(&mut self, ys: I) -> bool {
        let mut mutated = false;
        for y in ys {
            if self.insert(y) {
                mutated = true;
            }
        }
        mutated
    }

    pub fn iter(&self) -> std::slice::Iter<T> {
        self.items.iter()
    }

    pub fn intersection<'a>(&'a self, other: &'a Self) -> impl Iterator<Item = T> + 'a {
        self.items
            .iter()
            .filter(move |x| other.contains(x))
            .cloned()
    }

    pub fn difference<'a>(&'a self, other: &'a Self) -> impl Iterator<Item = T> + 'a {
        self.items
            .iter()
            .filter(move |x| !other.contains(x))
            .cloned()
    }

    pub fn union<'a>(&'a self, other: &'a Self) -> impl Iterator<Item = T> + 'a {
        self.items
            .iter()
            .cloned()
            .chain(other.items.iter().filter(move |x| !self.contains(x)).cloned())
    }

    pub fn is_subset(&self, other: &Self) -> bool {
        self.items.iter().all(|x| other.contains(x))
    }
}

impl<T: PartialEq + Clone> FromIterator<T> for OrderedSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<T: PartialEq + Clone> IntoIterator for OrderedSet<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T: PartialEq + Clone> IntoIterator for &'a OrderedSet<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: fmt::Display + PartialEq + Clone> fmt::Display for OrderedSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{")?;
        for (index, item) in self.items.iter().enumerate() {
            if index == 0 {
                write!(f, "{}", item)?;
            } else {
                write!(f, ", {}", item)?;
            }
        }
        write!(f, "}}")
    }
}

/// An insertion-ordered key/value map with value-based key equality.
///
/// Re-inserting an existing key replaces its value in place without moving it
/// to the end — matching the semantics `GrammarItemSet` relies on when
/// merging lookahead sets into an already-enumerated item.
#[derive(Debug, Clone)]
pub struct OrderedMap<K, V> {
    entries: Vec<(K, V)>,
}

impl<K, V> Default for OrderedMap<K, V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<K: PartialEq + Clone, V: Clone> OrderedMap<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Inserts `value` at `key`. If `key` was already present its value is
    /// replaced in place and the previous value returned; otherwise the pair
    /// is appended and `None` is returned.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        if let Some(existing) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(std::mem::replace(&mut existing.1, value))
        } else {
            self.entries.push((key, value));
            None
        }
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.entries.iter().map(|(k, _)| k.clone())
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&K, &mut V)> {
        self.entries.iter_mut().map(|(k, v)| (&*k, v))
    }
}

impl<K: PartialEq + Clone, V: Clone> FromIterator<(K, V)> for OrderedMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

/// Extension trait giving any iterator the `select`/`to_set` vocabulary used
/// throughout the item-set algebra: `keys().select(|k| ...).to_set()`.
pub trait Select: Iterator + Sized {
    fn select<P>(self, predicate: P) -> std::iter::Filter<Self, P>
    where
        P: FnMut(&Self::Item) -> bool,
    {
        self.filter(predicate)
    }
}

impl<I: Iterator> Select for I {}

pub trait ToOrderedSet<T: PartialEq + Clone>: Iterator<Item = T> + Sized {
    fn to_set(self) -> OrderedSet<T> {
        let mut set = OrderedSet::new();
        for item in self {
            set.insert(item);
        }
        set
    }
}

impl<T: PartialEq + Clone, I: Iterator<Item = T>> ToOrderedSet<T> for I {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_reports_mutation() {
        let mut set: OrderedSet<u32> = OrderedSet::new();
        assert!(set.insert(1));
        assert!(!set.insert(1));
        assert!(set.insert(2));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn insertion_order_preserved() {
        let mut set: OrderedSet<&str> = OrderedSet::new();
        set.insert("c");
        set.insert("a");
        set.insert("b");
        let collected: Vec<_> = set.iter().cloned().collect();
        assert_eq!(collected, vec!["c", "a", "b"]);
    }

    #[test]
    fn extend_reports_any_mutation() {
        let mut set: OrderedSet<u32> = OrderedSet::new();
        set.insert(1);
        assert!(set.extend(vec![1, 2]));
        assert!(!set.extend(vec![1, 2]));
    }

    #[test]
    fn set_algebra() {
        let a: OrderedSet<u32> = vec![1, 2, 3].into_iter().collect();
        let b: OrderedSet<u32> = vec![2, 3, 4].into_iter().collect();
        assert_eq!(a.intersection(&b).to_set(), vec![2, 3].into_iter().collect());
        assert_eq!(a.difference(&b).to_set(), vec![1].into_iter().collect());
        let mut expected: OrderedSet<u32> = OrderedSet::new();
        expected.extend(vec![1, 2, 3, 4]);
        assert_eq!(a.union(&b).to_set(), expected);
    }

    #[test]
    fn map_insert_replaces_in_place() {
        let mut map: OrderedMap<&str, u32> = OrderedMap::new();
        map.insert("a", 1);
        map.insert("b", 2);
        assert_eq!(map.insert("a", 10), Some(1));
        let collected: Vec<_> = map.iter().map(|(k, v)| (*k, *v)).collect();
        assert_eq!(collected, vec![("a", 10), ("b", 2)]);
    }

    #[test]
    fn keys_select_to_set() {
        let mut map: OrderedMap<u32, &str> = OrderedMap::new();
        map.insert(1, "odd");
        map.insert(2, "even");
        map.insert(3, "odd");
        let odds = map.keys().select(|k| k % 2 == 1).to_set();
        assert_eq!(odds, vec![1, 3].into_iter().collect());
    }
}
