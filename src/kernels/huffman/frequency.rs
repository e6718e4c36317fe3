//! Frequency analysis over delta symbols.
//!
//! Symbols are keyed by their `f32` bit pattern, so `0.0` and `-0.0` are
//! distinct symbols. Entries keep first-appearance order, which is the
//! deterministic tie-break order used by tree construction.

use hashbrown::HashMap;

use crate::utils::f32_bits;

/// Symbol occurrence counts, in first-appearance order.
#[derive(Debug, Clone, Default)]
pub struct FrequencyTable {
    /// `(symbol bits, count)` in the order each symbol was first seen.
    entries: Vec<(u32, u32)>,
    /// Symbol bits -> position in `entries`.
    index: HashMap<u32, usize>,
    /// Sum of all counts.
    total: u64,
}

impl FrequencyTable {
    /// Counts every symbol in `symbols`.
    pub fn from_symbols(symbols: &[f32]) -> Self {
        let mut table = Self::default();
        for &bits in f32_bits(symbols) {
            match table.index.get(&bits) {
                Some(&pos) => table.entries[pos].1 += 1,
                None => {
                    table.index.insert(bits, table.entries.len());
                    table.entries.push((bits, 1));
                }
            }
        }
        table.total = symbols.len() as u64;
        table
    }

    /// Number of distinct symbols.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of counted symbols.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Count for `symbol`, 0 if it never occurred.
    pub fn count(&self, symbol: f32) -> u32 {
        self.index
            .get(&symbol.to_bits())
            .map_or(0, |&pos| self.entries[pos].1)
    }

    /// Iterates `(symbol, count)` in first-appearance order.
    pub fn iter(&self) -> impl Iterator<Item = (f32, u32)> + '_ {
        self.entries
            .iter()
            .map(|&(bits, count)| (f32::from_bits(bits), count))
    }

    /// Shannon entropy of the distribution in bits per symbol; 0.0 when empty.
    pub fn entropy(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let total = self.total as f64;
        self.entries
            .iter()
            .map(|&(_, c)| {
                let p = c as f64 / total;
                -p * p.log2()
            })
            .sum()
    }
}
