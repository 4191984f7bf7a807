//! @ai:module:intent Score combination policies of recognizers
//! @ai:module:layer domain
//! @ai:module:public_api ScoreKind
//! @ai:module:stateless true

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// @ai:intent How a recognizer's scores combine when answers are merged into one class
/// @ai:effects pure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreKind {
    /// Higher is better, evidence accumulates (probabilities).
    Additive,
    /// Lower is better, the best single observation wins (distances).
    MinDistance,
}

impl ScoreKind {
    /// @ai:intent Convert score kind to string representation
    /// @ai:effects pure
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreKind::Additive => "additive",
            ScoreKind::MinDistance => "min_distance",
        }
    }

    /// @ai:intent Merge a newly seen score into an accumulated one
    /// @ai:effects pure
    pub fn merge(&self, accumulated: f64, other: f64) -> f64 {
        match self {
            ScoreKind::Additive => accumulated + other,
            ScoreKind::MinDistance => accumulated.min(other),
        }
    }

    /// @ai:intent Whether merging may invert the ranking given by the recognizer
    /// @ai:effects pure
    pub fn reorders_on_merge(&self) -> bool {
        matches!(self, ScoreKind::Additive)
    }

    /// @ai:intent Order two scores, best first
    /// @ai:effects pure
    pub fn best_first(&self, a: f64, b: f64) -> Ordering {
        match self {
            ScoreKind::Additive => b.total_cmp(&a),
            ScoreKind::MinDistance => a.total_cmp(&b),
        }
    }

    /// @ai:intent Render a score for display
    /// @ai:effects pure
    pub fn format_pretty(&self, score: f64) -> String {
        match self {
            ScoreKind::Additive => format!("{:.2} %", score * 100.0),
            ScoreKind::MinDistance => format!("{:.4}", score),
        }
    }
}

impl std::fmt::Display for ScoreKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_additive_sums() {
        assert!((ScoreKind::Additive.merge(0.25, 0.5) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_merge_min_distance_keeps_best() {
        assert_eq!(ScoreKind::MinDistance.merge(3.0, 1.5), 1.5);
        assert_eq!(ScoreKind::MinDistance.merge(1.5, 3.0), 1.5);
    }

    #[test]
    fn test_best_first_ordering() {
        assert_eq!(ScoreKind::Additive.best_first(0.9, 0.1), Ordering::Less);
        assert_eq!(ScoreKind::MinDistance.best_first(0.9, 0.1), Ordering::Greater);
    }

    #[test]
    fn test_format_pretty() {
        assert_eq!(ScoreKind::Additive.format_pretty(0.1234), "12.34 %");
        assert_eq!(ScoreKind::MinDistance.format_pretty(2.0), "2.0000");
    }

    #[test]
    fn test_serde_names() {
        let kind: ScoreKind = serde_json::from_str("\"min_distance\"").unwrap();
        assert_eq!(kind, ScoreKind::MinDistance);
    }
}
