//! @ai:module:intent Report generation for benchmark results
//! @ai:module:layer infrastructure
//! @ai:module:public_api ReportGenerator, RecallTableReporter, JsonReporter, ChartGenerator

pub mod charts;
pub mod json_report;
pub mod recall_table;

pub use charts::{ChartGenerator, RecallCurve};
pub use json_report::JsonReporter;
pub use recall_table::{format_percent, RecallTableReporter};

use crate::metrics::{BenchmarkResults, Recap};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// @ai:intent Combined report generator writing every file of a run into the logs directory
pub struct ReportGenerator {
    logs_dir: PathBuf,
    suffix: String,
    filter_answers: bool,
    save_unrecognized: bool,
    recall_table: RecallTableReporter,
    json: JsonReporter,
    charts: ChartGenerator,
}

impl ReportGenerator {
    /// @ai:intent Create a new report generator
    /// @ai:effects pure
    pub fn new(logs_dir: impl Into<PathBuf>) -> Self {
        Self {
            logs_dir: logs_dir.into(),
            suffix: String::new(),
            filter_answers: false,
            save_unrecognized: false,
            recall_table: RecallTableReporter::new(),
            json: JsonReporter::new(),
            charts: ChartGenerator::new(),
        }
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn with_filter_answers(mut self, filter_answers: bool) -> Self {
        self.filter_answers = filter_answers;
        self
    }

    pub fn with_unrecognized(mut self, save_unrecognized: bool) -> Self {
        self.save_unrecognized = save_unrecognized;
        self
    }

    pub fn logs_dir(&self) -> &Path {
        &self.logs_dir
    }

    /// @ai:intent Path of a per-equivalence report, `kind` empty for the recall table
    /// @ai:effects pure
    pub fn equivalence_path(
        &self,
        service: &str,
        equivalence: &str,
        kind: &str,
        top_k: usize,
        extension: &str,
    ) -> PathBuf {
        let kind = if kind.is_empty() {
            String::new()
        } else {
            format!("_{}", kind)
        };
        self.logs_dir.join(format!(
            "{}_{}{}_top{}{}.{}",
            service, equivalence, kind, top_k, self.suffix, extension
        ))
    }

    /// @ai:intent Path of a run-wide report
    /// @ai:effects pure
    pub fn run_path(&self, service: &str, kind: &str, top_k: usize, extension: &str) -> PathBuf {
        let kind = if kind.is_empty() {
            String::new()
        } else {
            format!("_{}", kind)
        };
        self.logs_dir.join(format!(
            "{}{}_top{}{}.{}",
            service, kind, top_k, self.suffix, extension
        ))
    }

    /// @ai:intent Generate all reports of a run
    /// @ai:post the chart is best effort: its failure is logged, not returned
    /// @ai:effects fs:write
    pub fn generate_all(&self, results: &BenchmarkResults, recap: &Recap) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(&self.logs_dir).with_context(|| {
            format!("Failed to create logs directory {}", self.logs_dir.display())
        })?;

        let service = results.service.as_str();
        let top_k = results.top_k;
        let mut written = Vec::new();

        for equivalence in &results.equivalences {
            let name = equivalence.equivalence.as_str();

            let path = self.equivalence_path(service, name, "", top_k, "txt");
            self.recall_table.generate(results, equivalence, &path)?;
            written.push(path);

            let path = self.equivalence_path(service, name, "correlations", top_k, "json");
            self.json
                .write_correlations(&equivalence.correlations, self.filter_answers, &path)?;
            written.push(path);

            let path = self.equivalence_path(service, name, "frequencies", top_k, "json");
            self.json.write_shares(&equivalence.frequencies, &path)?;
            written.push(path);

            if self.save_unrecognized {
                let path = self.equivalence_path(service, name, "unrecognized", top_k, "json");
                self.json.write_unrecognized(&equivalence.unrecognized, &path)?;
                written.push(path);
            }
        }

        let path = self.run_path(service, "recap", top_k, "json");
        self.json.write_recap(recap, &path)?;
        written.push(path);

        let path = self.run_path(service, "", top_k, "png");
        match self.charts.generate(results, &path) {
            Ok(()) => written.push(path),
            Err(e) => tracing::warn!("Recall chart not drawn: {:#}", e),
        }

        tracing::info!("Reports generated in {}", self.logs_dir.display());
        Ok(written)
    }
}
