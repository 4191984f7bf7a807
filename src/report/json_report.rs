//! @ai:module:intent JSON outputs: recap, share tables and unrecognized samples
//! @ai:module:layer infrastructure
//! @ai:module:public_api JsonReporter
//! @ai:module:stateless true

use crate::metrics::{confusions_only, Recap, ShareTable, UnrecognizedSample};
use crate::line_json;
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::Path;

/// @ai:intent Writes the machine-readable report files
pub struct JsonReporter;

impl JsonReporter {
    /// @ai:intent Create a new JSON reporter
    /// @ai:effects pure
    pub fn new() -> Self {
        Self
    }

    /// @ai:intent Write the recap as indented JSON
    /// @ai:effects fs:write
    pub fn write_recap(&self, recap: &Recap, output_path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(recap)?;
        std::fs::write(output_path, json)
            .with_context(|| format!("Failed to write {}", output_path.display()))?;
        Ok(())
    }

    /// @ai:intent Write a share table one class per line, classes in name order
    /// @ai:effects fs:write
    pub fn write_shares(&self, table: &ShareTable, output_path: &Path) -> Result<()> {
        let content = line_json::to_string(table)?;
        std::fs::write(output_path, content)
            .with_context(|| format!("Failed to write {}", output_path.display()))?;
        Ok(())
    }

    /// @ai:intent Write correlations, keeping only confusions when `filter_answers` is set
    /// @ai:effects fs:write
    pub fn write_correlations(
        &self,
        table: &ShareTable,
        filter_answers: bool,
        output_path: &Path,
    ) -> Result<()> {
        if filter_answers {
            self.write_shares(&confusions_only(table), output_path)
        } else {
            self.write_shares(table, output_path)
        }
    }

    /// @ai:intent Write unrecognized samples keyed by dataset position
    /// @ai:effects fs:write
    pub fn write_unrecognized(
        &self,
        samples: &BTreeMap<usize, UnrecognizedSample>,
        output_path: &Path,
    ) -> Result<()> {
        let content = line_json::to_string(
            samples
                .iter()
                .map(|(index, sample)| (index.to_string(), sample)),
        )?;
        std::fs::write(output_path, content)
            .with_context(|| format!("Failed to write {}", output_path.display()))?;
        Ok(())
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}
