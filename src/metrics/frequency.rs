//! @ai:module:intent Distribution of original symbols inside each projected class
//! @ai:module:layer domain
//! @ai:module:public_api FrequencyTable
//! @ai:module:stateless false

use crate::metrics::correlation::{by_share, ShareTable};
use std::collections::{BTreeMap, BTreeSet};

const PRECISION: f64 = 10_000.0;

/// @ai:intent Per class, how many samples of each original symbol it received
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrequencyTable {
    counts: BTreeMap<String, BTreeMap<String, u64>>,
}

impl FrequencyTable {
    /// @ai:intent Table with an empty row for every class of the inventory
    /// @ai:effects pure
    pub fn new(classes: &BTreeSet<String>) -> Self {
        Self {
            counts: classes
                .iter()
                .map(|class| (class.clone(), BTreeMap::new()))
                .collect(),
        }
    }

    /// @ai:effects state:write
    pub fn record(&mut self, class: &str, symbol: &str) {
        *self
            .counts
            .entry(class.to_string())
            .or_default()
            .entry(symbol.to_string())
            .or_default() += 1;
    }

    pub fn samples(&self, class: &str) -> u64 {
        self.counts
            .get(class)
            .map(|row| row.values().sum())
            .unwrap_or(0)
    }

    pub fn classes(&self) -> impl Iterator<Item = &String> {
        self.counts.keys()
    }

    /// @ai:intent Symbol shares per class, rounded to 4 decimals, best first
    /// @ai:post a class without samples yields an empty list
    /// @ai:effects pure
    pub fn shares(&self) -> ShareTable {
        self.counts
            .iter()
            .map(|(class, row)| {
                let total: u64 = row.values().sum();
                let mut shares: Vec<(String, f64)> = if total == 0 {
                    Vec::new()
                } else {
                    row.iter()
                        .map(|(symbol, count)| {
                            let share = *count as f64 / total as f64;
                            (symbol.clone(), (share * PRECISION).round() / PRECISION)
                        })
                        .collect()
                };
                shares.sort_by(by_share);
                (class.clone(), shares)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_shares_are_rounded_and_sorted() {
        let classes: BTreeSet<String> = ["A", "B"].iter().map(|c| c.to_string()).collect();
        let mut table = FrequencyTable::new(&classes);
        table.record("A", "a2");
        table.record("A", "a1");
        table.record("A", "a1");

        let shares = table.shares();
        assert_eq!(
            shares["A"],
            vec![("a1".to_string(), 0.6667), ("a2".to_string(), 0.3333)]
        );
        assert!(shares["B"].is_empty());
        assert_eq!(table.samples("A"), 3);
        assert_eq!(table.samples("B"), 0);
    }

    #[test]
    fn test_shares_sum_to_one() {
        let mut table = FrequencyTable::default();
        for symbol in ["x", "y", "y", "z", "z", "z", "w"] {
            table.record("X", symbol);
        }

        let total: f64 = table.shares()["X"].iter().map(|(_, share)| share).sum();
        assert!((total - 1.0).abs() < 1e-3);
    }
}
