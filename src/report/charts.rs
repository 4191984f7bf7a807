//! @ai:module:intent Top-k recall curves of a benchmark run
//! @ai:module:layer infrastructure
//! @ai:module:public_api ChartGenerator, RecallCurve
//! @ai:module:stateless true

use crate::metrics::BenchmarkResults;
use anyhow::Result;
use plotters::prelude::*;
use std::path::Path;

/// @ai:intent One line of the chart: a summary row of one equivalence, in percent
#[derive(Debug, Clone, PartialEq)]
pub struct RecallCurve {
    pub label: String,
    pub points: Vec<(i32, f64)>,
}

/// @ai:intent Draws Accuracy and Macro curves of every equivalence
pub struct ChartGenerator;

impl ChartGenerator {
    /// @ai:intent Create a new chart generator
    /// @ai:effects pure
    pub fn new() -> Self {
        Self
    }

    /// @ai:intent Accuracy then Macro curve of each equivalence, x = k
    /// @ai:effects pure
    pub fn curves(results: &BenchmarkResults) -> Vec<RecallCurve> {
        let to_points = |rates: &[f64]| -> Vec<(i32, f64)> {
            rates
                .iter()
                .enumerate()
                .map(|(k, rate)| (k as i32 + 1, rate * 100.0))
                .collect()
        };

        results
            .equivalences
            .iter()
            .flat_map(|equivalence| {
                [
                    RecallCurve {
                        label: format!("{} accuracy", equivalence.equivalence),
                        points: to_points(&equivalence.recall.accuracy),
                    },
                    RecallCurve {
                        label: format!("{} macro", equivalence.equivalence),
                        points: to_points(&equivalence.recall.macro_recall),
                    },
                ]
            })
            .collect()
    }

    /// @ai:intent Draw the recall curves chart
    /// @ai:effects fs:write
    pub fn generate(&self, results: &BenchmarkResults, output_path: &Path) -> Result<()> {
        let root = BitMapBackend::new(output_path, (800, 600)).into_drawing_area();
        root.fill(&WHITE)?;

        let top_k = results.top_k.max(2) as i32;
        let mut chart = ChartBuilder::on(&root)
            .caption(
                format!("{}: top-k recall", results.service),
                ("sans-serif", 30),
            )
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(1..top_k, 0f64..100f64)?;

        chart
            .configure_mesh()
            .x_labels(top_k as usize)
            .y_desc("Recall (%)")
            .x_desc("k")
            .draw()?;

        for (i, curve) in Self::curves(results).into_iter().enumerate() {
            let color = Palette99::pick(i).to_rgba();
            chart
                .draw_series(LineSeries::new(curve.points.clone(), color.stroke_width(2)))?
                .label(curve.label)
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::LowerRight)
            .border_style(BLACK)
            .background_style(WHITE.mix(0.8))
            .draw()?;

        root.present()?;
        Ok(())
    }
}

impl Default for ChartGenerator {
    fn default() -> Self {
        Self::new()
    }
}
