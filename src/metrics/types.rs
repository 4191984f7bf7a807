//! @ai:module:intent Per-equivalence benchmark statistics and the machine-readable recap
//! @ai:module:layer domain
//! @ai:module:public_api EquivalenceStats, EquivalenceResults, BenchmarkResults, UnrecognizedSample, RunDiagnostics, Recap, EquivalenceRecap
//! @ai:module:stateless false

use crate::answer::Answer;
use crate::corpus::{BoundingBox, Strokes};
use crate::metrics::correlation::{CorrelationTable, ShareTable};
use crate::metrics::frequency::FrequencyTable;
use crate::metrics::recall::{RecallSummary, RecallTable};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// @ai:intent A sample whose true class is absent from the top-k answers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnrecognizedSample {
    pub symbol: String,
    pub class: String,
    pub answers: Vec<Answer>,
    pub strokes: Strokes,
}

/// @ai:intent Tables of one equivalence while the dataset is being walked
#[derive(Debug, Clone)]
pub struct EquivalenceStats {
    pub equivalence: String,
    /// Classes the service supports under this equivalence
    pub declared: BTreeSet<String>,
    /// Classes of the dataset samples under this equivalence
    pub found: BTreeSet<String>,
    pub recall: RecallTable,
    pub correlations: CorrelationTable,
    pub frequencies: FrequencyTable,
    /// Indexed by sample position in the dataset
    pub unrecognized: BTreeMap<usize, UnrecognizedSample>,
}

impl EquivalenceStats {
    /// @ai:intent Zeroed tables covering every declared class
    /// @ai:effects pure
    pub fn new(equivalence: impl Into<String>, declared: BTreeSet<String>, top_k: usize) -> Self {
        Self {
            equivalence: equivalence.into(),
            recall: RecallTable::new(top_k, &declared),
            correlations: CorrelationTable::new(top_k, &declared),
            frequencies: FrequencyTable::new(&declared),
            found: BTreeSet::new(),
            unrecognized: BTreeMap::new(),
            declared,
        }
    }

    pub fn supports(&self, class: &str) -> bool {
        self.declared.contains(class)
    }

    /// Declared but absent from the dataset.
    pub fn missing(&self) -> BTreeSet<String> {
        self.declared.difference(&self.found).cloned().collect()
    }

    /// Present in the dataset but not declared.
    pub fn unknown(&self) -> BTreeSet<String> {
        self.found.difference(&self.declared).cloned().collect()
    }

    /// @ai:intent Cumulate and normalize every table
    /// @ai:effects pure
    pub fn aggregate(self, samples_threshold: u64) -> EquivalenceResults {
        EquivalenceResults {
            missing: self.missing(),
            unknown: self.unknown(),
            recall: self.recall.summarize(samples_threshold),
            correlations: self.correlations.reduce(),
            frequencies: self.frequencies.shares(),
            equivalence: self.equivalence,
            declared: self.declared,
            found: self.found,
            unrecognized: self.unrecognized,
        }
    }
}

/// @ai:intent Aggregated statistics of one equivalence
#[derive(Debug, Clone, PartialEq)]
pub struct EquivalenceResults {
    pub equivalence: String,
    pub declared: BTreeSet<String>,
    pub found: BTreeSet<String>,
    pub missing: BTreeSet<String>,
    pub unknown: BTreeSet<String>,
    pub recall: RecallSummary,
    pub correlations: ShareTable,
    pub frequencies: ShareTable,
    pub unrecognized: BTreeMap<usize, UnrecognizedSample>,
}

impl EquivalenceResults {
    /// @ai:intent Compact counts and summary arrays of this equivalence
    /// @ai:effects pure
    pub fn recap(&self) -> EquivalenceRecap {
        EquivalenceRecap {
            declared_classes: self.declared.len(),
            found_classes: self.found.len(),
            relevant_classes: self.recall.relevant_classes,
            missing_classes: self.missing.len(),
            samples: self.recall.total_samples,
            accuracy: self.recall.accuracy.clone(),
            macro_recall: self.recall.macro_recall.clone(),
        }
    }
}

/// @ai:intent Dataset-wide diagnostics of one run, shared by every equivalence
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunDiagnostics {
    pub samples: usize,
    /// Samples sent to the recognizer
    pub admitted: usize,
    /// Samples no requested equivalence could score
    pub skipped: usize,
    pub bounding_box: BoundingBox,
    /// Every class the recognizer answered, before projection
    pub answered: BTreeSet<String>,
    /// Answered classes the service does not declare
    pub answered_undeclared: BTreeSet<String>,
}

/// @ai:intent Everything a finished run computed, ready to be reported
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkResults {
    pub service: String,
    pub top_k: usize,
    pub samples_threshold: u64,
    pub equivalences: Vec<EquivalenceResults>,
    pub diagnostics: RunDiagnostics,
}

impl BenchmarkResults {
    /// @ai:intent Recap of every equivalence of the run
    /// @ai:effects pure
    pub fn recap(&self) -> Recap {
        Recap {
            service: self.service.clone(),
            top_k: self.top_k,
            samples_threshold: self.samples_threshold,
            equivalences: self
                .equivalences
                .iter()
                .map(|results| (results.equivalence.clone(), results.recap()))
                .collect(),
        }
    }
}

/// @ai:intent Machine-readable summary of one equivalence
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EquivalenceRecap {
    pub declared_classes: usize,
    pub found_classes: usize,
    pub relevant_classes: usize,
    pub missing_classes: usize,
    pub samples: u64,
    pub accuracy: Vec<f64>,
    #[serde(rename = "macro")]
    pub macro_recall: Vec<f64>,
}

/// @ai:intent Machine-readable result of a benchmark run
/// @ai:invariant no equivalence entries means the run produced no result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recap {
    pub service: String,
    pub top_k: usize,
    pub samples_threshold: u64,
    pub equivalences: BTreeMap<String, EquivalenceRecap>,
}

impl Recap {
    /// @ai:intent The "no result" sentinel of a failed run
    /// @ai:effects pure
    pub fn empty(service: impl Into<String>, top_k: usize, samples_threshold: u64) -> Self {
        Self {
            service: service.into(),
            top_k,
            samples_threshold,
            equivalences: BTreeMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.equivalences.is_empty()
    }

    pub fn get(&self, equivalence: &str) -> Option<&EquivalenceRecap> {
        self.equivalences.get(equivalence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn classes(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_missing_and_unknown_diagnostics() {
        let mut stats = EquivalenceStats::new("none", classes(&["A", "B"]), 3);
        stats.found = classes(&["B", "Q"]);

        assert_eq!(stats.missing(), classes(&["A"]));
        assert_eq!(stats.unknown(), classes(&["Q"]));
    }

    #[test]
    fn test_aggregate_and_recap() {
        let mut stats = EquivalenceStats::new("strict", classes(&["A", "B"]), 2);
        stats.found = classes(&["A"]);
        stats.recall.record("A", Some(1));
        stats.frequencies.record("A", "a1");

        let results = stats.aggregate(1);
        let recap = results.recap();
        assert_eq!(
            recap,
            EquivalenceRecap {
                declared_classes: 2,
                found_classes: 1,
                relevant_classes: 1,
                missing_classes: 1,
                samples: 1,
                accuracy: vec![0.0, 1.0],
                macro_recall: vec![0.0, 1.0],
            }
        );
        assert_eq!(results.frequencies["A"], vec![("a1".to_string(), 1.0)]);
    }

    #[test]
    fn test_recap_serializes_macro_field() {
        let mut recap = Recap::empty("hwrt", 1, 1);
        assert!(recap.is_empty());

        recap.equivalences.insert(
            "none".to_string(),
            EquivalenceRecap {
                accuracy: vec![0.5],
                macro_recall: vec![0.25],
                ..Default::default()
            },
        );
        let json = serde_json::to_value(&recap).unwrap();
        assert_eq!(json["equivalences"]["none"]["macro"][0], 0.25);
        assert!(!recap.is_empty());
    }
}
