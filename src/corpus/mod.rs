//! @ai:module:intent Recorded handwriting samples and the loaders reading them
//! @ai:module:layer domain
//! @ai:module:public_api Sample, Strokes, StrokesPayload, Dataset, DatasetLoader, load_dataset

pub mod loader;
pub mod strokes;

pub use loader::{
    load_dataset, loader_for, Dataset, DatasetLoader, DetexifySqlLoader, HwrtCsvLoader,
    UNKNOWN_SYMBOL,
};
pub use strokes::{BoundingBox, PayloadFormat, Point, Sample, Stroke, Strokes, StrokesPayload};
