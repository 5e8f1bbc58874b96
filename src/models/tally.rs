use std::hash::Hash;

use indexmap::IndexMap;

/// Insertion-ordered counter
///
/// Keys remember the order they were first seen in, so ranking can break ties
/// by encounter order. There is no secondary key in the source data.
#[derive(Debug, Clone)]
pub struct Tally<K> {
    counts: IndexMap<K, usize>,
}

impl<K> Default for Tally<K> {
    fn default() -> Self {
        Self {
            counts: IndexMap::default(),
        }
    }
}

impl<K: Clone + Eq + Hash> Tally<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `amount` to the count for `key`, registering it at zero if unseen
    pub fn add(&mut self, key: K, amount: usize) {
        *self.counts.entry(key).or_insert(0) += amount;
    }

    pub fn increment(&mut self, key: K) {
        self.add(key, 1);
    }

    pub fn get(&self, key: &K) -> Option<usize> {
        self.counts.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Entries in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (&K, usize)> {
        self.counts.iter().map(|(key, count)| (key, *count))
    }

    /// Keys by descending count, ties kept in first-seen order
    pub fn ranked(&self) -> Vec<K> {
        // sorted_by is stable
        self.counts
            .clone()
            .sorted_by(|_, a, _, b| b.cmp(a))
            .map(|(key, _)| key)
            .collect()
    }
}
