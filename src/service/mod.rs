//! @ai:module:intent Recognizer services: inventories, scoring policies and clients
//! @ai:module:layer infrastructure
//! @ai:module:public_api Service, ServiceCatalog, UnicodeTable, ScoreKind, Protocol, Classifier, HttpClassifier, ScriptedClassifier

pub mod catalog;
pub mod client;
pub mod protocol;
pub mod score;

pub use catalog::{Service, ServiceCatalog, UnicodeTable};
pub use client::{Classifier, HttpClassifier, ScriptedClassifier};
pub use protocol::{extract_latex_command, Protocol};
pub use score::ScoreKind;
