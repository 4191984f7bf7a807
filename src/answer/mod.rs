//! @ai:module:intent Recognizer answers and their projection into equivalence classes
//! @ai:module:layer domain
//! @ai:module:public_api Answer, Score, AnswerAggregator

pub mod aggregator;
pub mod types;

pub use aggregator::AnswerAggregator;
pub use types::{Answer, Score};
