//! @ai:module:intent Human-readable recall table of one equivalence
//! @ai:module:layer infrastructure
//! @ai:module:public_api RecallTableReporter, format_percent
//! @ai:module:stateless true

use crate::metrics::{BenchmarkResults, EquivalenceResults, ACCURACY_LABEL, MACRO_LABEL};
use anyhow::Result;
use std::fmt::Write as FmtWrite;
use std::path::Path;

/// @ai:intent Column alignment in a rendered table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

/// @ai:intent Render a recall fraction as a fixed-width percentage
/// @ai:effects pure
pub fn format_percent(rate: f64) -> String {
    format!("{:5.1} %", rate * 100.0)
}

/// @ai:intent Render rows as a GitHub-flavoured markdown table with padded columns
/// @ai:effects pure
pub fn github_table(headers: &[String], rows: &[Vec<String>], align: &[Align]) -> String {
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            rows.iter()
                .filter_map(|row| row.get(i))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let alignment = |i: usize| align.get(i).copied().unwrap_or(Align::Left);
    let render_row = |cells: &[String]| {
        let padded: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(i, width)| {
                let cell = cells.get(i).map(String::as_str).unwrap_or("");
                match alignment(i) {
                    Align::Left => format!(" {:<width$} ", cell, width = width),
                    Align::Right => format!(" {:>width$} ", cell, width = width),
                }
            })
            .collect();
        format!("|{}|", padded.join("|"))
    };

    let separator: Vec<String> = widths
        .iter()
        .enumerate()
        .map(|(i, width)| match alignment(i) {
            Align::Left => format!(":{}", "-".repeat(width + 1)),
            Align::Right => format!("{}:", "-".repeat(width + 1)),
        })
        .collect();

    let mut output = String::new();
    writeln!(output, "{}", render_row(headers)).unwrap();
    writeln!(output, "|{}|", separator.join("|")).unwrap();
    for row in rows {
        writeln!(output, "{}", render_row(row)).unwrap();
    }
    output
}

/// @ai:intent Writes the recall table files
pub struct RecallTableReporter;

impl RecallTableReporter {
    /// @ai:intent Create a new recall table reporter
    /// @ai:effects pure
    pub fn new() -> Self {
        Self
    }

    /// @ai:intent Header lines: counts and run diagnostics
    /// @ai:effects pure
    fn generate_header(results: &BenchmarkResults, equivalence: &EquivalenceResults) -> String {
        let diagnostics = &results.diagnostics;
        let mut output = String::new();

        writeln!(output, "Service: {}", results.service).unwrap();
        writeln!(output, "Equivalence: {}", equivalence.equivalence).unwrap();
        writeln!(output, "Declared classes: {}", equivalence.declared.len()).unwrap();
        writeln!(output, "Found classes: {}", equivalence.found.len()).unwrap();
        writeln!(
            output,
            "Relevant classes: {} (at least {} samples)",
            equivalence.recall.relevant_classes, results.samples_threshold
        )
        .unwrap();
        writeln!(output, "Missing classes: {}", equivalence.missing.len()).unwrap();
        writeln!(output, "Unknown classes: {}", equivalence.unknown.len()).unwrap();
        writeln!(
            output,
            "Samples: {} scored, {} in dataset, {} skipped",
            equivalence.recall.total_samples, diagnostics.samples, diagnostics.skipped
        )
        .unwrap();
        writeln!(output, "Strokes bounding box: {}", diagnostics.bounding_box).unwrap();
        if !diagnostics.answered_undeclared.is_empty() {
            writeln!(
                output,
                "Answered undeclared classes: {}",
                diagnostics
                    .answered_undeclared
                    .iter()
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(" ")
            )
            .unwrap();
        }
        writeln!(output, "Recall:").unwrap();
        writeln!(output).unwrap();

        output
    }

    /// @ai:intent Summary rows first, then classes by samples then name, descending
    /// @ai:effects pure
    fn generate_table(results: &BenchmarkResults, equivalence: &EquivalenceResults) -> String {
        let recall = &equivalence.recall;

        let mut headers = vec!["Class".to_string(), "Samples".to_string()];
        headers.extend((1..=results.top_k).map(|k| format!("TOP {}", k)));

        let summary_row = |label: &str, rates: &[f64]| {
            let mut row = vec![label.to_string(), recall.total_samples.to_string()];
            row.extend(rates.iter().map(|r| format_percent(*r)));
            row
        };

        let mut classes: Vec<_> = recall.classes.iter().collect();
        classes.sort_by(|(a_name, a), (b_name, b)| {
            b.samples.cmp(&a.samples).then_with(|| b_name.cmp(a_name))
        });

        let mut rows = vec![
            summary_row(ACCURACY_LABEL, &recall.accuracy),
            summary_row(MACRO_LABEL, &recall.macro_recall),
        ];
        rows.extend(classes.into_iter().map(|(name, class)| {
            let mut row = vec![name.clone(), class.samples.to_string()];
            row.extend(class.recall.iter().map(|r| format_percent(*r)));
            row
        }));

        let mut align = vec![Align::Left];
        align.extend(std::iter::repeat(Align::Right).take(results.top_k + 1));

        github_table(&headers, &rows, &align)
    }

    /// @ai:intent Full recall report of one equivalence
    /// @ai:effects pure
    pub fn render(&self, results: &BenchmarkResults, equivalence: &EquivalenceResults) -> String {
        let mut output = Self::generate_header(results, equivalence);
        output.push_str(&Self::generate_table(results, equivalence));
        output
    }

    /// @ai:intent Write the recall report of one equivalence
    /// @ai:effects fs:write
    pub fn generate(
        &self,
        results: &BenchmarkResults,
        equivalence: &EquivalenceResults,
        output_path: &Path,
    ) -> Result<()> {
        std::fs::write(output_path, self.render(results, equivalence))?;
        Ok(())
    }
}

impl Default for RecallTableReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{EquivalenceStats, RunDiagnostics};
    use std::collections::BTreeSet;

    fn results() -> BenchmarkResults {
        let declared: BTreeSet<String> = ["A", "B", "C"].iter().map(|c| c.to_string()).collect();
        let mut stats = EquivalenceStats::new("strict", declared, 2);
        stats.found = ["A", "B"].iter().map(|c| c.to_string()).collect();
        stats.recall.record("A", Some(0));
        stats.recall.record("A", Some(1));
        stats.recall.record("B", None);

        BenchmarkResults {
            service: "hwrt".to_string(),
            top_k: 2,
            samples_threshold: 1,
            equivalences: vec![stats.aggregate(1)],
            diagnostics: RunDiagnostics {
                samples: 4,
                admitted: 3,
                skipped: 1,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(1.0), "100.0 %");
        assert_eq!(format_percent(0.5), " 50.0 %");
        assert_eq!(format_percent(0.0), "  0.0 %");
    }

    #[test]
    fn test_github_table_alignment() {
        let table = github_table(
            &["Class".to_string(), "Samples".to_string()],
            &[vec!["\\alpha".to_string(), "12".to_string()]],
            &[Align::Left, Align::Right],
        );
        assert_eq!(
            table,
            "| Class  | Samples |\n|:-------|--------:|\n| \\alpha |      12 |\n"
        );
    }

    #[test]
    fn test_summary_rows_first_then_sorted_classes() {
        let results = results();
        let report = RecallTableReporter::new().render(&results, &results.equivalences[0]);

        let rows: Vec<&str> = report
            .lines()
            .filter(|l| l.starts_with("| ") && !l.starts_with("| Class"))
            .collect();
        let labels: Vec<&str> = rows
            .iter()
            .map(|row| row.trim_start_matches("| ").split(' ').next().unwrap_or(""))
            .collect();

        assert_eq!(labels, vec![ACCURACY_LABEL, MACRO_LABEL, "A", "B", "C"]);
        assert!(rows[2].contains(" 50.0 % | 100.0 %"));
        assert!(report.contains("Samples: 3 scored, 4 in dataset, 1 skipped"));
        assert!(report.contains("Missing classes: 1"));
    }
}
