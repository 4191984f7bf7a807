//! @ai:module:intent Recall, correlation and frequency statistics of a benchmark run
//! @ai:module:layer domain
//! @ai:module:public_api RecallTable, CorrelationTable, FrequencyTable, EquivalenceStats, Recap

pub mod correlation;
pub mod frequency;
pub mod recall;
pub mod types;

pub use correlation::{confusions_only, CorrelationTable, ShareTable};
pub use frequency::FrequencyTable;
pub use recall::{ClassRecall, RecallRecord, RecallSummary, RecallTable, ACCURACY_LABEL, MACRO_LABEL};
pub use types::{
    BenchmarkResults, EquivalenceRecap, EquivalenceResults, EquivalenceStats, Recap, RunDiagnostics,
    UnrecognizedSample,
};
