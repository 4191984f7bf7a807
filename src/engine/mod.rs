//! @ai:module:intent Benchmark orchestration
//! @ai:module:layer application
//! @ai:module:public_api BenchmarkEngine, BenchmarkOptions, Phase

pub mod benchmark;
pub mod phase;

pub use benchmark::{BenchmarkEngine, BenchmarkOptions};
pub use phase::Phase;
