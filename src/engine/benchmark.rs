//! @ai:module:intent Single-pass benchmark of a recognizer across several equivalences
//! @ai:module:layer application
//! @ai:module:public_api BenchmarkEngine, BenchmarkOptions
//! @ai:module:stateless false

use crate::answer::AnswerAggregator;
use crate::config::{PathConfig, RunConfig};
use crate::corpus::Dataset;
use crate::engine::phase::Phase;
use crate::error::Result;
use crate::mapping::{Mapping, MappingRegistry, IDENTITY_MAPPING};
use crate::metrics::{
    BenchmarkResults, EquivalenceStats, Recap, RunDiagnostics, UnrecognizedSample,
};
use crate::report::ReportGenerator;
use crate::service::{Classifier, Service};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

const PROGRESS_EVERY: usize = 1000;

/// @ai:intent Parameters of one benchmark call
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkOptions {
    /// Mapping names; empty means the identity mapping only
    pub equivalences: Vec<String>,
    pub top_k: usize,
    pub samples_threshold: u64,
    pub saving: bool,
    pub save_unrecognized: bool,
    pub filter_answers: bool,
    pub suffix: String,
    pub logs_dir: PathBuf,
}

impl Default for BenchmarkOptions {
    fn default() -> Self {
        Self::from_config(&RunConfig::default(), &PathConfig::default())
    }
}

impl BenchmarkOptions {
    /// @ai:intent Options from the run and path configuration
    /// @ai:effects pure
    pub fn from_config(run: &RunConfig, paths: &PathConfig) -> Self {
        Self {
            equivalences: run.equivalences.clone(),
            top_k: run.top_k,
            samples_threshold: run.samples_threshold,
            saving: run.saving,
            save_unrecognized: run.save_unrecognized,
            filter_answers: run.filter_answers,
            suffix: run.suffix.clone(),
            logs_dir: paths.logs_dir.clone(),
        }
    }

    /// @ai:intent Requested equivalences, deduplicated in request order
    /// @ai:effects pure
    pub fn equivalence_names(&self) -> Vec<String> {
        if self.equivalences.is_empty() {
            return vec![IDENTITY_MAPPING.to_string()];
        }

        let mut names: Vec<String> = Vec::with_capacity(self.equivalences.len());
        for name in &self.equivalences {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        names
    }

    fn reporter(&self) -> ReportGenerator {
        ReportGenerator::new(&self.logs_dir)
            .with_suffix(&self.suffix)
            .with_filter_answers(self.filter_answers)
            .with_unrecognized(self.save_unrecognized)
    }
}

/// @ai:intent Runs benchmarks: one classification per admitted sample, scored under every equivalence
pub struct BenchmarkEngine<C: Classifier> {
    registry: Arc<MappingRegistry>,
    classifier: Arc<C>,
    aggregator: AnswerAggregator,
    phase: Mutex<Phase>,
}

impl<C: Classifier> BenchmarkEngine<C> {
    /// @ai:intent Create a new benchmark engine
    /// @ai:effects pure
    pub fn new(registry: Arc<MappingRegistry>, classifier: Arc<C>) -> Self {
        Self {
            registry,
            classifier,
            aggregator: AnswerAggregator::new(),
            phase: Mutex::new(Phase::default()),
        }
    }

    pub fn registry(&self) -> &MappingRegistry {
        &self.registry
    }

    /// Phase reached by the last run.
    pub fn phase(&self) -> Phase {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn enter(&self, phase: Phase, service: &Service) {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner) = phase;
        tracing::info!(phase = %phase, service = service.name(), "Benchmark phase");
    }

    fn advance(&self, service: &Service) {
        let next = self.phase().next();
        self.enter(next, service);
    }

    /// @ai:intent Benchmark a service over a dataset and persist the reports
    /// @ai:post an empty recap means the run failed, never zero accuracy
    /// @ai:effects network, fs:write
    pub async fn benchmark(
        &self,
        service: &Service,
        dataset: &Dataset,
        options: &BenchmarkOptions,
    ) -> Recap {
        let results = match self.evaluate(service, dataset, options).await {
            Ok(results) => results,
            Err(e) => {
                let phase = self.phase();
                self.enter(Phase::Failed, service);
                tracing::error!(
                    phase = %phase,
                    service = service.name(),
                    samples = dataset.len(),
                    "Benchmark failed: {}",
                    e
                );
                return Recap::empty(service.name(), options.top_k, options.samples_threshold);
            }
        };

        self.advance(service);
        let recap = results.recap();
        for (name, equivalence) in &recap.equivalences {
            tracing::info!(
                "{} / {}: {} samples, top-1 accuracy {:.3}, top-1 macro {:.3}",
                service.name(),
                name,
                equivalence.samples,
                equivalence.accuracy.first().copied().unwrap_or(0.0),
                equivalence.macro_recall.first().copied().unwrap_or(0.0)
            );
        }

        if options.saving {
            self.advance(service);
            match options.reporter().generate_all(&results, &recap) {
                Ok(files) => tracing::info!("{} report files written", files.len()),
                Err(e) => tracing::error!(
                    service = service.name(),
                    "Persisting reports failed, statistics kept: {:#}",
                    e
                ),
            }
        }

        self.enter(Phase::Done, service);
        recap
    }

    /// @ai:intent Mine, ingest and aggregate without persisting anything
    /// @ai:post Err on the first classifier failure or malformed sample
    /// @ai:effects network
    pub async fn evaluate(
        &self,
        service: &Service,
        dataset: &Dataset,
        options: &BenchmarkOptions,
    ) -> Result<BenchmarkResults> {
        let names = options.equivalence_names();
        let mappings: Vec<Arc<Mapping>> = names
            .iter()
            .map(|name| self.registry.get_mapping(name))
            .collect();

        self.enter(Phase::Mining, service);
        let mut stats = self.mine(service, dataset, &mappings, options.top_k);

        self.advance(service);
        let diagnostics = self
            .ingest(service, dataset, &names, &mappings, &mut stats, options)
            .await?;

        self.advance(service);
        let equivalences = stats
            .into_iter()
            .map(|s| s.aggregate(options.samples_threshold))
            .collect();

        Ok(BenchmarkResults {
            service: service.name().to_string(),
            top_k: options.top_k,
            samples_threshold: options.samples_threshold,
            equivalences,
            diagnostics,
        })
    }

    /// @ai:intent Inventories, found classes and symbol frequencies of every equivalence
    /// @ai:effects pure
    fn mine(
        &self,
        service: &Service,
        dataset: &Dataset,
        mappings: &[Arc<Mapping>],
        top_k: usize,
    ) -> Vec<EquivalenceStats> {
        mappings
            .iter()
            .map(|mapping| {
                let declared = mapping.project_set(&service.symbols);
                let mut stats = EquivalenceStats::new(mapping.name(), declared, top_k);

                for sample in &dataset.samples {
                    let class = mapping.project(&sample.symbol);
                    if stats.supports(class) {
                        stats.frequencies.record(class, &sample.symbol);
                    }
                    if !stats.found.contains(class) {
                        stats.found.insert(class.to_string());
                    }
                }

                let missing = stats.missing();
                let unknown = stats.unknown();
                tracing::info!(
                    "Equivalence '{}': {} declared classes, {} found in dataset",
                    mapping.name(),
                    stats.declared.len(),
                    stats.found.len()
                );
                if !missing.is_empty() {
                    tracing::warn!(
                        "Equivalence '{}': {} declared classes missing from the dataset",
                        mapping.name(),
                        missing.len()
                    );
                }
                if !unknown.is_empty() {
                    tracing::warn!(
                        "Equivalence '{}': {} dataset classes not declared by '{}': {}",
                        mapping.name(),
                        unknown.len(),
                        service.name(),
                        unknown.iter().cloned().collect::<Vec<_>>().join(" ")
                    );
                }
                stats
            })
            .collect()
    }

    /// @ai:intent Classify each admitted sample once and score it under every equivalence
    /// @ai:effects network
    async fn ingest(
        &self,
        service: &Service,
        dataset: &Dataset,
        names: &[String],
        mappings: &[Arc<Mapping>],
        stats: &mut [EquivalenceStats],
        options: &BenchmarkOptions,
    ) -> Result<RunDiagnostics> {
        let candidates = self.registry.candidate_symbols(service, names);
        let mut diagnostics = RunDiagnostics::default();

        for (index, sample) in dataset.samples.iter().enumerate() {
            diagnostics.samples += 1;
            if !candidates.contains(&sample.symbol) {
                diagnostics.skipped += 1;
                tracing::debug!("Skipping sample {} ({}): no supported class", index, sample.symbol);
                continue;
            }

            let strokes = sample.strokes()?;
            diagnostics.bounding_box.include(&strokes);

            let raw = self.classifier.classify(service, &strokes).await?;
            diagnostics.admitted += 1;
            diagnostics
                .answered
                .extend(raw.iter().map(|answer| answer.symbol_class.clone()));

            for (mapping, stats) in mappings.iter().zip(stats.iter_mut()) {
                let class = mapping.project(&sample.symbol);
                if !stats.supports(class) {
                    continue;
                }

                let answers = self
                    .aggregator
                    .aggregate(service, mapping, &raw, options.top_k, false)?;
                let rank = answers.iter().position(|answer| answer.symbol_class == class);

                stats.recall.record(class, rank);
                stats.correlations.record(class, &answers);

                if rank.is_none() && options.save_unrecognized {
                    stats.unrecognized.insert(
                        index,
                        UnrecognizedSample {
                            symbol: sample.symbol.clone(),
                            class: class.to_string(),
                            answers,
                            strokes: strokes.clone(),
                        },
                    );
                }
            }

            if diagnostics.samples % PROGRESS_EVERY == 0 {
                tracing::info!("{} / {} samples processed", diagnostics.samples, dataset.len());
            }
        }

        diagnostics.answered_undeclared = diagnostics
            .answered
            .iter()
            .filter(|class| !service.declares(class))
            .cloned()
            .collect();
        if !diagnostics.answered_undeclared.is_empty() {
            tracing::warn!(
                "Service '{}' answered {} undeclared classes: {}",
                service.name(),
                diagnostics.answered_undeclared.len(),
                diagnostics
                    .answered_undeclared
                    .iter()
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(" ")
            );
        }

        tracing::info!(
            "Ingested {} samples, {} skipped, strokes bounding box {}",
            diagnostics.admitted,
            diagnostics.skipped,
            diagnostics.bounding_box
        );
        Ok(diagnostics)
    }
}
