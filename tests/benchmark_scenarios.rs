//! End-to-end benchmark runs against a scripted recognizer.

use hwr_bench::answer::Answer;
use hwr_bench::config::ServiceConfig;
use hwr_bench::corpus::{Dataset, PayloadFormat, Sample, StrokesPayload};
use hwr_bench::engine::{BenchmarkEngine, BenchmarkOptions, Phase};
use hwr_bench::mapping::MappingRegistry;
use hwr_bench::line_json;
use hwr_bench::service::{Protocol, ScoreKind, ScriptedClassifier, Service};
use pretty_assertions::assert_eq;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

const STRICT: &str = r#"{"A": ["a1", "a2"], "B": ["b1"]}"#;

struct Fixture {
    temp: TempDir,
    registry: Arc<MappingRegistry>,
}

impl Fixture {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let mappings = temp.path().join("mappings");
        std::fs::create_dir_all(&mappings).unwrap();
        std::fs::write(mappings.join("strict.json"), STRICT).unwrap();
        std::fs::write(mappings.join("broken.json"), "{\"A\": [").unwrap();

        let registry = Arc::new(MappingRegistry::new(mappings));
        Self { temp, registry }
    }

    fn options(&self, equivalences: &[&str], saving: bool) -> BenchmarkOptions {
        BenchmarkOptions {
            equivalences: equivalences.iter().map(|e| e.to_string()).collect(),
            top_k: 3,
            samples_threshold: 1,
            saving,
            logs_dir: self.temp.path().join("logs"),
            ..BenchmarkOptions::default()
        }
    }
}

fn service(score_kind: ScoreKind) -> Service {
    Service::new(
        ServiceConfig {
            name: "hwrt".to_string(),
            url: "http://localhost:5000/worker".to_string(),
            protocol: Protocol::Hwrt,
            score_kind,
            symbols_file: PathBuf::from("symbols.csv"),
        },
        ["a1", "a2", "b1"],
    )
}

fn dataset(symbols: &[&str]) -> Dataset {
    Dataset::from_samples(
        symbols
            .iter()
            .map(|symbol| {
                Sample::new(
                    *symbol,
                    StrokesPayload::new(
                        PayloadFormat::PointObjects,
                        r#"[[{"x":0,"y":0,"time":0},{"x":10,"y":20,"time":5}]]"#,
                    ),
                )
            })
            .collect(),
    )
}

/// Answers the true symbol first, then the other declared symbols.
fn perfect_answers(symbols: &[&str]) -> Vec<Option<Vec<Answer>>> {
    symbols
        .iter()
        .map(|truth| {
            let mut answers = vec![Answer::new(*truth, 0.7)];
            answers.extend(
                ["a1", "a2", "b1"]
                    .iter()
                    .filter(|s| *s != truth)
                    .map(|s| Answer::new(*s, 0.1)),
            );
            Some(answers)
        })
        .collect()
}

#[tokio::test]
async fn test_perfect_recognizer_under_strict_classes() {
    let fixture = Fixture::new();
    let symbols = ["a1", "a2", "b1"];
    let classifier = Arc::new(ScriptedClassifier::new(perfect_answers(&symbols)));
    let engine = BenchmarkEngine::new(fixture.registry.clone(), classifier);

    let results = engine
        .evaluate(
            &service(ScoreKind::Additive),
            &dataset(&symbols),
            &fixture.options(&["strict"], false),
        )
        .await
        .unwrap();

    let strict = &results.equivalences[0];
    assert_eq!(strict.recall.classes["A"].samples, 2);
    assert_eq!(strict.recall.classes["A"].cumulative_hits[0], 2);
    assert_eq!(strict.recall.classes["B"].cumulative_hits[0], 1);
    assert_eq!(strict.recall.accuracy[0], 1.0);
    assert_eq!(strict.recall.macro_recall[0], 1.0);
    assert_eq!(
        strict.frequencies["A"],
        vec![("a1".to_string(), 0.5), ("a2".to_string(), 0.5)]
    );
}

#[tokio::test]
async fn test_single_pass_over_several_equivalences() {
    let fixture = Fixture::new();
    let symbols = ["a1", "a2", "b1", "a1"];
    let classifier = Arc::new(ScriptedClassifier::new(perfect_answers(&symbols)));
    let engine = BenchmarkEngine::new(fixture.registry.clone(), classifier.clone());

    let recap = engine
        .benchmark(
            &service(ScoreKind::MinDistance),
            &dataset(&symbols),
            &fixture.options(&["none", "strict", "broken"], false),
        )
        .await;

    assert_eq!(classifier.calls(), symbols.len());
    assert_eq!(engine.phase(), Phase::Done);
    assert_eq!(recap.equivalences.len(), 3);

    let strict = recap.get("strict").unwrap();
    assert_eq!(strict.declared_classes, 2);
    assert_eq!(strict.samples, 4);

    // A broken mapping file degrades to the identity mapping under its own name.
    assert_eq!(recap.get("broken"), recap.get("none"));
    assert_eq!(recap.get("none").unwrap().declared_classes, 3);
}

#[tokio::test]
async fn test_classifier_failure_yields_empty_recap() {
    let fixture = Fixture::new();
    let mut responses = perfect_answers(&["a1"]);
    responses.push(None);
    let classifier = Arc::new(ScriptedClassifier::new(responses));
    let engine = BenchmarkEngine::new(fixture.registry.clone(), classifier.clone());

    let recap = engine
        .benchmark(
            &service(ScoreKind::Additive),
            &dataset(&["a1", "a2", "b1"]),
            &fixture.options(&["strict"], true),
        )
        .await;

    assert!(recap.is_empty());
    assert_eq!(engine.phase(), Phase::Failed);
    assert_eq!(classifier.calls(), 2);
    assert!(!fixture.temp.path().join("logs").exists());
}

#[tokio::test]
async fn test_reports_are_persisted() {
    let fixture = Fixture::new();
    let symbols = ["a1", "b1"];
    // b1 is answered second, behind a2.
    let classifier = Arc::new(ScriptedClassifier::new(vec![
        Some(vec![Answer::new("a1", 0.9)]),
        Some(vec![Answer::new("a2", 0.6), Answer::new("b1", 0.4)]),
    ]));
    let engine = BenchmarkEngine::new(fixture.registry.clone(), classifier);

    let mut options = fixture.options(&["strict"], true);
    options.suffix = "_it".to_string();
    options.filter_answers = true;
    let recap = engine
        .benchmark(&service(ScoreKind::Additive), &dataset(&symbols), &options)
        .await;
    assert!(!recap.is_empty());

    let logs = fixture.temp.path().join("logs");
    let table = std::fs::read_to_string(logs.join("hwrt_strict_top3_it.txt")).unwrap();
    assert!(table.contains("| <Accuracy> |"));
    assert!(table.contains("100.0 %"));

    let correlations: Vec<(String, Vec<(String, f64)>)> =
        line_json::load(&logs.join("hwrt_strict_correlations_top3_it.json")).unwrap();
    // row B weighs A = 3, B = 2; row A only answers itself and is dropped
    assert_eq!(correlations, vec![("B".to_string(), vec![("A".to_string(), 0.6)])]);

    let saved: hwr_bench::Recap =
        serde_json::from_str(&std::fs::read_to_string(logs.join("hwrt_recap_top3_it.json")).unwrap())
            .unwrap();
    assert_eq!(saved, recap);
}

#[tokio::test]
async fn test_threshold_keeps_small_classes_out_of_macro() {
    let fixture = Fixture::new();
    let symbols = ["a1", "a2", "b1"];
    let classifier = Arc::new(ScriptedClassifier::new(vec![
        Some(vec![Answer::new("a1", 0.9)]),
        Some(vec![Answer::new("a2", 0.9)]),
        Some(vec![Answer::new("a1", 0.9)]),
    ]));
    let engine = BenchmarkEngine::new(fixture.registry.clone(), classifier);

    let mut options = fixture.options(&["strict"], false);
    options.samples_threshold = 2;
    let recap = engine
        .benchmark(&service(ScoreKind::Additive), &dataset(&symbols), &options)
        .await;

    let strict = recap.get("strict").unwrap();
    assert_eq!(strict.relevant_classes, 1);
    assert_eq!(strict.accuracy[0], 2.0 / 3.0);
    assert_eq!(strict.macro_recall[0], 1.0);
}
