//! @ai:module:intent Symbol equivalence mappings and their registry
//! @ai:module:layer domain
//! @ai:module:public_api Mapping, MappingRegistry, EquivalenceClasses, IDENTITY_MAPPING

pub mod equivalence;
pub mod registry;

pub use equivalence::{EquivalenceClasses, Mapping, IDENTITY_MAPPING};
pub use registry::MappingRegistry;
