//! Transposition table: statistics shared by tree nodes that reach the same
//! position through different move orders.
//!
//! The table is owned by one engine and outlives individual searches. It is
//! not synchronized; a parallel search would need a concurrent or sharded map.

use std::collections::HashMap;

/// Aggregate statistics for one position.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TranspositionEntry {
    pub visits: u32,
    pub wins: f64,
}

impl TranspositionEntry {
    pub fn winrate(&self) -> Option<f64> {
        (self.visits > 0).then(|| self.wins / self.visits as f64)
    }
}

/// Board fingerprint to aggregate statistics.
#[derive(Debug, Default)]
pub struct TranspositionTable {
    entries: HashMap<String, TranspositionEntry>,
}

impl TranspositionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, fingerprint: &str) -> Option<&TranspositionEntry> {
        self.entries.get(fingerprint)
    }

    /// Add one visit with reward `wins` to the entry for `fingerprint`.
    pub fn record(&mut self, fingerprint: &str, wins: f64) {
        if let Some(entry) = self.entries.get_mut(fingerprint) {
            entry.visits += 1;
            entry.wins += wins;
        } else {
            self.entries
                .insert(fingerprint.to_owned(), TranspositionEntry { visits: 1, wins });
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_merges_visits() {
        let mut table = TranspositionTable::new();
        assert!(table.is_empty());
        table.record("abc", 1.0);
        table.record("abc", 0.0);
        table.record("xyz", 1.0);
        assert_eq!(table.len(), 2);
        let entry = table.get("abc").unwrap();
        assert_eq!(entry.visits, 2);
        assert_eq!(entry.winrate(), Some(0.5));
        table.clear();
        assert!(table.get("abc").is_none());
    }

    #[test]
    fn test_unvisited_has_no_winrate() {
        assert_eq!(TranspositionEntry::default().winrate(), None);
    }
}
