//! @ai:module:intent Classification guesses returned by recognizers
//! @ai:module:layer domain
//! @ai:module:public_api Answer, Score
//! @ai:module:stateless true

use serde::{Deserialize, Serialize};

/// @ai:intent Score of an answer, numeric until rendered for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Score {
    Value(f64),
    Pretty(String),
}

impl Score {
    pub fn value(&self) -> Option<f64> {
        match self {
            Score::Value(v) => Some(*v),
            Score::Pretty(_) => None,
        }
    }
}

impl From<f64> for Score {
    fn from(value: f64) -> Self {
        Score::Value(value)
    }
}

/// @ai:intent One ranked guess of a recognizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub symbol_class: String,
    pub score: Score,
    /// Display codepoint, e.g. `U+2211`
    #[serde(default)]
    pub unicode: String,
    /// Answers folded into this one during aggregation
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub raw_answers: Vec<Answer>,
    #[serde(default)]
    pub package: String,
}

impl Answer {
    /// @ai:intent Create a raw answer with a numeric score
    /// @ai:effects pure
    pub fn new(symbol_class: impl Into<String>, score: f64) -> Self {
        Self {
            symbol_class: symbol_class.into(),
            score: Score::Value(score),
            unicode: String::new(),
            raw_answers: Vec::new(),
            package: String::new(),
        }
    }

    pub fn with_unicode(mut self, unicode: impl Into<String>) -> Self {
        self.unicode = unicode.into();
        self
    }

    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = package.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_serializes_untagged() {
        let answer = Answer::new("\\sum", 0.5);
        let json = serde_json::to_string(&answer).unwrap();
        assert!(json.contains("\"score\":0.5"));
        assert!(!json.contains("raw_answers"));

        let pretty = Answer {
            score: Score::Pretty("50.00 %".to_string()),
            ..answer
        };
        let json = serde_json::to_string(&pretty).unwrap();
        assert!(json.contains("\"score\":\"50.00 %\""));
    }

    #[test]
    fn test_score_value() {
        assert_eq!(Score::Value(1.5).value(), Some(1.5));
        assert_eq!(Score::Pretty("x".to_string()).value(), None);
    }
}
