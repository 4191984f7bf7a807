//! @ai:module:intent Dataset loaders turning recorded sample dumps into lazily parsed samples
//! @ai:module:layer infrastructure
//! @ai:module:public_api Dataset, DatasetLoader, HwrtCsvLoader, DetexifySqlLoader, loader_for, load_dataset
//! @ai:module:stateless true

use crate::corpus::strokes::{PayloadFormat, Sample, StrokesPayload};
use crate::service::{extract_latex_command, Protocol, Service};
use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::path::Path;

/// Symbol assigned to hwrt samples whose identifier is not declared.
pub const UNKNOWN_SYMBOL: &str = "???";

/// @ai:intent Ordered samples of one dataset file and the symbols they cover
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub samples: Vec<Sample>,
    pub found_symbols: BTreeSet<String>,
}

impl Dataset {
    /// @ai:intent Build a dataset from samples already in memory
    /// @ai:effects pure
    pub fn from_samples(samples: Vec<Sample>) -> Self {
        let found_symbols = samples.iter().map(|s| s.symbol.clone()).collect();
        Self {
            samples,
            found_symbols,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// @ai:intent Keep only the last `limit` samples
    /// @ai:post found_symbols still lists every symbol of the file
    /// @ai:effects state:write
    pub fn keep_last(&mut self, limit: usize) {
        let skipped = self.samples.len().saturating_sub(limit);
        self.samples.drain(..skipped);
    }

    /// @ai:intent Dataset symbols the service does not declare
    /// @ai:effects pure
    pub fn undeclared(&self, service: &Service) -> BTreeSet<String> {
        self.found_symbols
            .iter()
            .filter(|symbol| !service.declares(symbol))
            .cloned()
            .collect()
    }
}

/// @ai:intent Trait for dataset file readers
pub trait DatasetLoader: Send + Sync {
    /// @ai:intent Read a dataset file; strokes stay unparsed
    fn load(&self, service: &Service, path: &Path) -> Result<Dataset>;
}

/// @ai:intent Reads hwrt CSV dumps: header, then `symbol_id;user_id;strokes_json`
#[derive(Debug, Clone, Copy, Default)]
pub struct HwrtCsvLoader;

impl DatasetLoader for HwrtCsvLoader {
    /// @ai:effects fs:read
    fn load(&self, service: &Service, path: &Path) -> Result<Dataset> {
        let content = read_dataset(path)?;
        let mut samples = Vec::new();

        for (line_number, line) in content.lines().enumerate().skip(1) {
            if line.trim().is_empty() {
                continue;
            }
            let mut fields = line.splitn(3, ';');
            let (Some(id), Some(_user), Some(strokes)) = (fields.next(), fields.next(), fields.next())
            else {
                tracing::warn!("{}:{}: malformed sample line skipped", path.display(), line_number + 1);
                continue;
            };

            let symbol = match service.symbol_name(id) {
                Some(symbol) => symbol,
                None => {
                    tracing::warn!("No symbol found for key: {}", id);
                    UNKNOWN_SYMBOL
                }
            };
            samples.push(Sample::new(
                symbol,
                StrokesPayload::new(PayloadFormat::PointObjects, strokes),
            ));
        }

        Ok(Dataset::from_samples(samples))
    }
}

/// @ai:intent Reads the detexify SQL dump: the tab separated rows of the `COPY samples` block
#[derive(Debug, Clone, Copy, Default)]
pub struct DetexifySqlLoader;

impl DatasetLoader for DetexifySqlLoader {
    /// @ai:effects fs:read
    fn load(&self, _service: &Service, path: &Path) -> Result<Dataset> {
        let content = read_dataset(path)?;
        let mut samples = Vec::new();

        let rows = content
            .lines()
            .skip_while(|line| !line.contains("COPY samples"))
            .skip(1)
            .take_while(|line| !line.contains("\\."));

        for row in rows {
            let columns: Vec<&str> = row.split('\t').collect();
            let (Some(id), Some(strokes)) = (columns.get(1), columns.get(2)) else {
                tracing::warn!("{}: malformed sample row skipped", path.display());
                continue;
            };

            samples.push(Sample::new(
                extract_latex_command(id),
                StrokesPayload::new(PayloadFormat::PointTriples, *strokes),
            ));
        }

        Ok(Dataset::from_samples(samples))
    }
}

fn read_dataset(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read dataset: {}", path.display()))
}

/// @ai:intent Pick the loader matching a service's dump format
/// @ai:effects pure
pub fn loader_for(protocol: Protocol) -> Box<dyn DatasetLoader> {
    match protocol {
        Protocol::Hwrt => Box::new(HwrtCsvLoader),
        Protocol::Detexify => Box::new(DetexifySqlLoader),
    }
}

/// @ai:intent Load a dataset for a service, report undeclared symbols, optionally keep the last samples
/// @ai:effects fs:read
pub fn load_dataset(service: &Service, path: &Path, limit: Option<usize>) -> Result<Dataset> {
    tracing::info!("Loading the dataset from: {}", path.display());
    let mut dataset = loader_for(service.protocol()).load(service, path)?;

    let undeclared = dataset.undeclared(service);
    if !undeclared.is_empty() {
        tracing::warn!(
            "{} symbols not declared by service '{}' found in the dataset: {}",
            undeclared.len(),
            service.name(),
            undeclared.iter().cloned().collect::<Vec<_>>().join(" ")
        );
    }

    if let Some(limit) = limit {
        dataset.keep_last(limit);
    }

    tracing::info!(
        "Loaded {} samples, found {} classes",
        dataset.len(),
        dataset.found_symbols.len()
    );
    Ok(dataset)
}
