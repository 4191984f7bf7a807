//! @ai:module:intent Top-k recall per class with micro and macro summaries
//! @ai:module:layer domain
//! @ai:module:public_api RecallRecord, RecallTable, RecallSummary, ClassRecall
//! @ai:module:stateless false

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Row label of the micro-averaged summary in rendered tables.
pub const ACCURACY_LABEL: &str = "<Accuracy>";
/// Row label of the macro-averaged summary in rendered tables.
pub const MACRO_LABEL: &str = "<Macro>";

/// @ai:intent Sample count and per-rank hit counts of one class
/// @ai:invariant hits.len() == top_k
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecallRecord {
    pub samples: u64,
    /// hits[r] = samples whose true class was answered at rank r exactly
    pub hits: Vec<u64>,
}

impl RecallRecord {
    pub fn new(top_k: usize) -> Self {
        Self {
            samples: 0,
            hits: vec![0; top_k],
        }
    }

    /// @ai:intent Count one sample, hit at `rank` if the true class was answered there
    /// @ai:effects state:write
    pub fn record(&mut self, rank: Option<usize>) {
        self.samples += 1;
        if let Some(slot) = rank.and_then(|r| self.hits.get_mut(r)) {
            *slot += 1;
        }
    }

    /// @ai:intent Hits within the first k+1 answers, for every k
    /// @ai:post non-decreasing
    /// @ai:effects pure
    pub fn cumulative_hits(&self) -> Vec<u64> {
        self.hits
            .iter()
            .scan(0u64, |total, hits| {
                *total += hits;
                Some(*total)
            })
            .collect()
    }

    /// @ai:intent Cumulative hits as fractions of the sample count, 0 without samples
    /// @ai:effects pure
    pub fn recall(&self) -> Vec<f64> {
        let cumulative = self.cumulative_hits();
        if self.samples == 0 {
            return vec![0.0; cumulative.len()];
        }
        cumulative
            .into_iter()
            .map(|hits| hits as f64 / self.samples as f64)
            .collect()
    }

    /// @ai:intent Whether the class has enough samples to weigh in the macro recall
    /// @ai:effects pure
    pub fn is_relevant(&self, samples_threshold: u64) -> bool {
        self.samples > 0 && self.samples >= samples_threshold
    }
}

/// @ai:intent Recall records of every class of one equivalence
#[derive(Debug, Clone, PartialEq)]
pub struct RecallTable {
    top_k: usize,
    records: BTreeMap<String, RecallRecord>,
}

impl RecallTable {
    /// @ai:intent Table with a zeroed record for every class of the inventory
    /// @ai:effects pure
    pub fn new(top_k: usize, classes: &BTreeSet<String>) -> Self {
        Self {
            top_k,
            records: classes
                .iter()
                .map(|class| (class.clone(), RecallRecord::new(top_k)))
                .collect(),
        }
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// @ai:effects state:write
    pub fn record(&mut self, class: &str, rank: Option<usize>) {
        let top_k = self.top_k;
        self.records
            .entry(class.to_string())
            .or_insert_with(|| RecallRecord::new(top_k))
            .record(rank);
    }

    pub fn get(&self, class: &str) -> Option<&RecallRecord> {
        self.records.get(class)
    }

    pub fn records(&self) -> &BTreeMap<String, RecallRecord> {
        &self.records
    }

    pub fn total_samples(&self) -> u64 {
        self.records.values().map(|r| r.samples).sum()
    }

    /// @ai:intent Cumulate hits, normalize per class and compute the Accuracy and Macro rows
    /// @ai:post classes below `samples_threshold` count for accuracy, never for macro
    /// @ai:effects pure
    pub fn summarize(&self, samples_threshold: u64) -> RecallSummary {
        let total_samples = self.total_samples();
        let mut hits_total = vec![0u64; self.top_k];
        let mut macro_total = vec![0.0; self.top_k];
        let mut relevant_classes = 0;
        let mut classes = BTreeMap::new();

        for (class, record) in &self.records {
            let cumulative_hits = record.cumulative_hits();
            let recall = record.recall();

            for (total, hits) in hits_total.iter_mut().zip(&cumulative_hits) {
                *total += hits;
            }
            if record.is_relevant(samples_threshold) {
                relevant_classes += 1;
                for (total, rate) in macro_total.iter_mut().zip(&recall) {
                    *total += rate;
                }
            }

            classes.insert(
                class.clone(),
                ClassRecall {
                    samples: record.samples,
                    cumulative_hits,
                    recall,
                },
            );
        }

        let accuracy = hits_total
            .into_iter()
            .map(|hits| ratio(hits as f64, total_samples as f64))
            .collect();
        let macro_recall = macro_total
            .into_iter()
            .map(|total| ratio(total, relevant_classes as f64))
            .collect();

        RecallSummary {
            top_k: self.top_k,
            total_samples,
            relevant_classes,
            classes,
            accuracy,
            macro_recall,
        }
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// @ai:intent Aggregated recall of one class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassRecall {
    pub samples: u64,
    pub cumulative_hits: Vec<u64>,
    pub recall: Vec<f64>,
}

/// @ai:intent Aggregated recall of one equivalence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecallSummary {
    pub top_k: usize,
    pub total_samples: u64,
    pub relevant_classes: usize,
    pub classes: BTreeMap<String, ClassRecall>,
    /// Micro average, over samples
    pub accuracy: Vec<f64>,
    /// Macro average, over relevant classes
    pub macro_recall: Vec<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn inventory(classes: &[&str]) -> BTreeSet<String> {
        classes.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_cumulative_hits_are_non_decreasing() {
        let ranks = [Some(2), None, Some(0), Some(4), Some(1), Some(9), Some(0), None];
        for start in 0..ranks.len() {
            let mut record = RecallRecord::new(5);
            for rank in ranks.iter().cycle().skip(start).take(ranks.len() + start) {
                record.record(*rank);
            }
            let cumulative = record.cumulative_hits();
            assert!(cumulative.windows(2).all(|w| w[0] <= w[1]), "{:?}", cumulative);
            assert!(cumulative.last().copied().unwrap_or(0) <= record.samples);
        }
    }

    #[test]
    fn test_recall_fractions() {
        let mut record = RecallRecord::new(3);
        record.record(Some(0));
        record.record(Some(2));
        record.record(None);
        record.record(Some(1));

        assert_eq!(record.cumulative_hits(), vec![1, 2, 3]);
        assert_eq!(record.recall(), vec![0.25, 0.5, 0.75]);
        assert_eq!(RecallRecord::new(3).recall(), vec![0.0; 3]);
    }

    #[test]
    fn test_zero_sample_classes_stay_but_are_not_relevant() {
        let mut table = RecallTable::new(2, &inventory(&["A", "B"]));
        table.record("A", Some(0));

        let summary = table.summarize(0);
        assert_eq!(summary.classes["B"].samples, 0);
        assert_eq!(summary.relevant_classes, 1);
        assert_eq!(summary.macro_recall, vec![1.0, 1.0]);
    }

    #[test]
    fn test_threshold_excludes_small_classes_from_macro_only() {
        let mut table = RecallTable::new(1, &inventory(&["big", "small"]));
        for _ in 0..3 {
            table.record("big", Some(0));
        }
        table.record("big", None);
        table.record("small", None);

        let summary = table.summarize(2);
        assert_eq!(summary.total_samples, 5);
        assert_eq!(summary.accuracy, vec![3.0 / 5.0]);
        assert_eq!(summary.relevant_classes, 1);
        assert_eq!(summary.macro_recall, vec![0.75]);

        let summary = table.summarize(1);
        assert_eq!(summary.macro_recall, vec![0.375]);
    }

    #[test]
    fn test_empty_table_summary() {
        let summary = RecallTable::new(3, &BTreeSet::new()).summarize(1);
        assert_eq!(summary.accuracy, vec![0.0; 3]);
        assert_eq!(summary.macro_recall, vec![0.0; 3]);
        assert!(summary.classes.is_empty());
    }
}
