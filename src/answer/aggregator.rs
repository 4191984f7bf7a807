//! @ai:module:intent Merge raw recognizer answers into equivalence-class answers
//! @ai:module:layer domain
//! @ai:module:public_api AnswerAggregator
//! @ai:module:stateless true

use crate::answer::{Answer, Score};
use crate::error::{Error, Result};
use crate::mapping::Mapping;
use crate::service::Service;
use std::collections::HashMap;

/// @ai:intent Stateless projection of ranked answers into class space
#[derive(Debug, Clone, Copy, Default)]
pub struct AnswerAggregator;

impl AnswerAggregator {
    pub fn new() -> Self {
        Self
    }

    /// @ai:intent Fold answers projecting to the same class into one, following the service's score kind
    /// @ai:pre every raw score is numeric
    /// @ai:post at most `bound` entries when bound > 0, ranked best first
    /// @ai:post raw answers are left untouched
    /// @ai:effects pure
    pub fn aggregate(
        &self,
        service: &Service,
        mapping: &Mapping,
        answers: &[Answer],
        bound: usize,
        pretty: bool,
    ) -> Result<Vec<Answer>> {
        let kind = service.score_kind();
        let mut merged: Vec<Answer> = Vec::new();
        let mut scores: Vec<f64> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for raw in answers {
            let score = raw.score.value().ok_or_else(|| Error::NonNumericScore {
                symbol: raw.symbol_class.clone(),
            })?;
            let class = mapping.project(&raw.symbol_class);

            match positions.get(class) {
                Some(&index) => {
                    scores[index] = kind.merge(scores[index], score);
                    merged[index].raw_answers.push(raw.clone());
                }
                None => {
                    let mut representative = raw.clone();
                    representative.symbol_class = class.to_string();
                    let unicode = service.unicode.lookup(class);
                    if !unicode.is_empty() {
                        representative.unicode = unicode.to_string();
                    }
                    representative.raw_answers = vec![raw.clone()];

                    positions.insert(class.to_string(), merged.len());
                    merged.push(representative);
                    scores.push(score);
                }
            }
        }

        let mut ranked: Vec<(Answer, f64)> = merged.into_iter().zip(scores).collect();
        if kind.reorders_on_merge() {
            ranked.sort_by(|(_, a), (_, b)| kind.best_first(*a, *b));
        }
        if bound > 0 {
            ranked.truncate(bound);
        }

        Ok(ranked
            .into_iter()
            .map(|(mut answer, score)| {
                answer.score = if pretty {
                    Score::Pretty(kind.format_pretty(score))
                } else {
                    Score::Value(score)
                };
                answer
            })
            .collect())
    }
}
