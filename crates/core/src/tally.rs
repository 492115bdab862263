//! Frequency counting with deterministic ordering.
//!
//! Keys keep the order in which they were first seen. Ranking sorts by count with a stable
//! sort, so equal counts stay in first-seen order and repeated calls over the same input
//! return the same list.

use std::collections::HashMap;

#[derive(Debug, Default)]
pub(crate) struct Tally<'a> {
    index: HashMap<&'a str, usize>,
    entries: Vec<(&'a str, usize)>,
}

impl<'a> Tally<'a> {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Count `key` once. Blank keys are ignored.
    pub(crate) fn add(&mut self, key: &'a str) {
        let key = key.trim();
        if key.is_empty() {
            return;
        }
        match self.index.get(key) {
            Some(&i) => self.entries[i].1 += 1,
            None => {
                self.index.insert(key, self.entries.len());
                self.entries.push((key, 1));
            }
        }
    }

    /// Entries in first-seen order.
    pub(crate) fn entries(&self) -> &[(&'a str, usize)] {
        &self.entries
    }

    /// Entries sorted by count descending, ties in first-seen order, truncated to `limit`.
    pub(crate) fn ranked(&self, limit: usize) -> Vec<(&'a str, usize)> {
        let mut ranked = self.entries.clone();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(limit);
        ranked
    }
}

impl<'a> FromIterator<&'a str> for Tally<'a> {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut tally = Tally::new();
        for key in iter {
            tally.add(key);
        }
        tally
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranks_by_count_then_first_seen() {
        let tally: Tally = ["b", "a", "c", "a", "b", "d"].into_iter().collect();
        assert_eq!(tally.ranked(10), vec![("b", 2), ("a", 2), ("c", 1), ("d", 1)]);
        assert_eq!(tally.ranked(1), vec![("b", 2)]);
    }

    #[test]
    fn ignores_blank_and_trims_keys() {
        let tally: Tally = [" a", "", "a ", "  "].into_iter().collect();
        assert_eq!(tally.entries(), &[("a", 2)]);
    }
}
