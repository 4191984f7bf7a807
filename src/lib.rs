//! @ai:module:intent Handwriting recognizer benchmark library
//! @ai:module:layer application
//! @ai:module:public_api config, error, line_json, mapping, service, answer, corpus, metrics, engine, report

pub mod answer;
pub mod config;
pub mod corpus;
pub mod engine;
pub mod error;
pub mod line_json;
pub mod mapping;
pub mod metrics;
pub mod report;
pub mod service;

pub use answer::{Answer, AnswerAggregator};
pub use config::BenchmarkConfig;
pub use corpus::{Dataset, DatasetLoader, Sample};
pub use engine::{BenchmarkEngine, BenchmarkOptions, Phase};
pub use error::{Error, Result};
pub use mapping::{Mapping, MappingRegistry};
pub use metrics::{BenchmarkResults, Recap};
pub use report::ReportGenerator;
pub use service::{Classifier, HttpClassifier, ScoreKind, Service, ServiceCatalog};
