//! @ai:module:intent Rank-weighted confusion statistics between true and answered classes
//! @ai:module:layer domain
//! @ai:module:public_api CorrelationTable, ShareTable, confusions_only
//! @ai:module:stateless false

use crate::answer::Answer;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

/// Class to `[(other class, share)]`, best share first.
pub type ShareTable = BTreeMap<String, Vec<(String, f64)>>;

/// @ai:intent Accumulated weights of answered classes, per true class
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationTable {
    top_k: usize,
    rows: BTreeMap<String, BTreeMap<String, u64>>,
}

impl CorrelationTable {
    /// @ai:intent Table with an empty row for every class of the inventory
    /// @ai:effects pure
    pub fn new(top_k: usize, classes: &BTreeSet<String>) -> Self {
        Self {
            top_k,
            rows: classes
                .iter()
                .map(|class| (class.clone(), BTreeMap::new()))
                .collect(),
        }
    }

    /// @ai:intent Add weight `top_k - rank` for each of the first top_k answers
    /// @ai:effects state:write
    pub fn record(&mut self, class: &str, answers: &[Answer]) {
        let row = self.rows.entry(class.to_string()).or_default();
        for (rank, answer) in answers.iter().take(self.top_k).enumerate() {
            *row.entry(answer.symbol_class.clone()).or_default() += (self.top_k - rank) as u64;
        }
    }

    /// @ai:intent Keep the top_k heaviest answered classes of each row, as fractions of their combined weight
    /// @ai:post every non-empty reduced row sums to 1; a zero-weight row yields an empty list
    /// @ai:effects pure
    pub fn reduce(&self) -> ShareTable {
        self.rows
            .iter()
            .map(|(class, row)| {
                let mut kept: Vec<(&String, u64)> = row
                    .iter()
                    .filter(|(_, weight)| **weight > 0)
                    .map(|(answered, weight)| (answered, *weight))
                    .collect();
                kept.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
                kept.truncate(self.top_k);

                let total: u64 = kept.iter().map(|(_, weight)| weight).sum();
                let shares: Vec<(String, f64)> = kept
                    .into_iter()
                    .map(|(answered, weight)| (answered.clone(), weight as f64 / total as f64))
                    .collect();
                (class.clone(), shares)
            })
            .collect()
    }
}

/// @ai:intent Order share entries by share descending, then name
/// @ai:effects pure
pub fn by_share(a: &(String, f64), b: &(String, f64)) -> Ordering {
    b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0))
}

/// @ai:intent Drop the self entry of every row and the rows left empty
/// @ai:effects pure
pub fn confusions_only(table: &ShareTable) -> ShareTable {
    table
        .iter()
        .filter_map(|(class, shares)| {
            let confusions: Vec<_> = shares
                .iter()
                .filter(|(answered, _)| answered != class)
                .cloned()
                .collect();
            (!confusions.is_empty()).then(|| (class.clone(), confusions))
        })
        .collect()
}
