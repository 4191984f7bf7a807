//! @ai:module:intent CLI for the handwriting recognizer benchmark
//! @ai:module:layer presentation

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use hwr_bench::{
    config::BenchmarkConfig,
    corpus::load_dataset,
    engine::{BenchmarkEngine, BenchmarkOptions},
    mapping::MappingRegistry,
    metrics::Recap,
    report::format_percent,
    service::{HttpClassifier, ServiceCatalog},
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "hwr-bench")]
#[command(about = "Benchmark handwriting symbol recognizers under symbol equivalences")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Benchmark a service over a dataset
    Run {
        /// Service name, as configured
        #[arg(short, long)]
        service: String,

        /// Dataset file (hwrt CSV or detexify SQL dump)
        #[arg(short, long)]
        dataset: PathBuf,

        /// Equivalences to evaluate (repeatable)
        #[arg(short, long = "equivalence")]
        equivalences: Vec<String>,

        /// Number of ranked answers considered
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Minimum samples for a class to count in the macro recall
        #[arg(long)]
        threshold: Option<u64>,

        /// Do not write any report file
        #[arg(long)]
        no_save: bool,

        /// Save samples whose class is absent from the top-k answers
        #[arg(long)]
        save_unrecognized: bool,

        /// Keep only confusions in the correlation files
        #[arg(long)]
        filter_answers: bool,

        /// Suffix appended to report file names
        #[arg(long)]
        suffix: Option<String>,

        /// Keep only the last N samples of the dataset
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show the classes of a mapping
    Mapping {
        /// Mapping name
        name: String,
    },

    /// List the symbols a service supports under a mapping
    Symbols {
        #[arg(short, long)]
        service: String,

        #[arg(short, long, default_value = "none")]
        mapping: String,
    },

    /// Compose two mappings: outer ∘ inner
    Compose {
        outer: String,
        inner: String,

        /// Write the composed classes to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check whether two mappings project symbols identically
    Equivalent { first: String, second: String },

    /// List the mapping files available
    Mappings,

    /// Initialize default configuration
    Init {
        /// Output path for config file
        #[arg(short, long, default_value = "benchmark.toml")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("hwr_bench=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            service,
            dataset,
            equivalences,
            top_k,
            threshold,
            no_save,
            save_unrecognized,
            filter_answers,
            suffix,
            limit,
        } => {
            let mut config = load_or_default_config(cli.config)?;
            let run = &mut config.run;
            if !equivalences.is_empty() {
                run.equivalences = equivalences;
            }
            if let Some(top_k) = top_k {
                run.top_k = top_k;
            }
            if let Some(threshold) = threshold {
                run.samples_threshold = threshold;
            }
            if let Some(suffix) = suffix {
                run.suffix = suffix;
            }
            if limit.is_some() {
                run.limit = limit;
            }
            run.saving &= !no_save;
            run.save_unrecognized |= save_unrecognized;
            run.filter_answers |= filter_answers;

            run_benchmark(config, service, dataset).await
        }
        Commands::Mapping { name } => show_mapping(cli.config, name),
        Commands::Symbols { service, mapping } => list_symbols(cli.config, service, mapping),
        Commands::Compose {
            outer,
            inner,
            output,
        } => compose(cli.config, outer, inner, output),
        Commands::Equivalent { first, second } => equivalent(cli.config, first, second),
        Commands::Mappings => list_mappings(cli.config),
        Commands::Init { output } => init_config(output),
    }
}

/// @ai:intent Load the service and dataset, benchmark, print the recap
/// @ai:effects network, fs:read, fs:write
async fn run_benchmark(config: BenchmarkConfig, service: String, dataset_path: PathBuf) -> Result<()> {
    if config.run.top_k == 0 {
        bail!("top_k must be at least 1");
    }

    let catalog = ServiceCatalog::load(&config)?;
    let service = catalog.get(&service)?;
    let dataset = load_dataset(service, &dataset_path, config.run.limit)?;

    let registry = Arc::new(MappingRegistry::new(&config.paths.mappings_dir));
    let classifier = Arc::new(HttpClassifier::new()?);
    let engine = BenchmarkEngine::new(registry, classifier);

    let options = BenchmarkOptions::from_config(&config.run, &config.paths);
    let recap = engine.benchmark(service, &dataset, &options).await;

    if recap.is_empty() {
        bail!("Benchmark of '{}' produced no result", service.name());
    }
    print_recap(&recap);
    Ok(())
}

/// @ai:intent Print the accuracy and macro rows of every equivalence
/// @ai:effects io
fn print_recap(recap: &Recap) {
    println!();
    println!("Service: {} (top {})", recap.service, recap.top_k);
    println!();
    println!(
        "{:<24} {:>8} {:>8} {:>8}  {:<10} Recall",
        "Equivalence", "Declared", "Found", "Relevant", ""
    );
    println!("{}", "-".repeat(80));

    for (name, equivalence) in &recap.equivalences {
        for (label, rates) in [
            ("accuracy", &equivalence.accuracy),
            ("macro", &equivalence.macro_recall),
        ] {
            println!(
                "{:<24} {:>8} {:>8} {:>8}  {:<10} {}",
                name,
                equivalence.declared_classes,
                equivalence.found_classes,
                equivalence.relevant_classes,
                label,
                rates
                    .iter()
                    .map(|r| format_percent(*r))
                    .collect::<Vec<_>>()
                    .join(" | ")
            );
        }
    }
    println!();
}

/// @ai:intent Print a mapping's classes
/// @ai:effects fs:read, io
fn show_mapping(config_path: Option<PathBuf>, name: String) -> Result<()> {
    let config = load_or_default_config(config_path)?;
    let registry = MappingRegistry::new(&config.paths.mappings_dir);
    let mapping = registry.get_mapping(&name);

    println!(
        "Mapping '{}': {} classes, {} projected symbols",
        mapping.name(),
        mapping.classes().len(),
        mapping.projection().len()
    );
    for (class, symbols) in mapping.classes() {
        println!(
            "  {:<20} {}",
            class,
            symbols.iter().cloned().collect::<Vec<_>>().join(" ")
        );
    }
    Ok(())
}

/// @ai:intent Print the projected symbols a service supports
/// @ai:effects fs:read, io
fn list_symbols(config_path: Option<PathBuf>, service: String, mapping: String) -> Result<()> {
    let config = load_or_default_config(config_path)?;
    let catalog = ServiceCatalog::load(&config)?;
    let service = catalog.get(&service)?;
    let registry = MappingRegistry::new(&config.paths.mappings_dir);

    let supported = registry.supported_classes(service, &mapping);
    println!(
        "{} symbols supported by '{}' under '{}':",
        supported.len(),
        service.name(),
        mapping
    );
    for symbol in &supported {
        println!("  {:<24} {}", symbol, service.unicode.lookup(symbol));
    }
    Ok(())
}

/// @ai:intent Compose two mappings, print or save the result
/// @ai:effects fs:read, fs:write, io
fn compose(
    config_path: Option<PathBuf>,
    outer: String,
    inner: String,
    output: Option<PathBuf>,
) -> Result<()> {
    let config = load_or_default_config(config_path)?;
    let registry = MappingRegistry::new(&config.paths.mappings_dir);
    let composed = registry.compose(&outer, &inner)?;

    println!(
        "Mapping '{}': {} classes, {} projected symbols",
        composed.name(),
        composed.classes().len(),
        composed.projection().len()
    );

    if let Some(path) = output {
        composed
            .save(&path)
            .with_context(|| format!("Failed to save {}", path.display()))?;
        println!("Composed mapping saved to {}", path.display());
    }
    Ok(())
}

/// @ai:intent Report whether two mappings are equivalent
/// @ai:effects fs:read, io
fn equivalent(config_path: Option<PathBuf>, first: String, second: String) -> Result<()> {
    let config = load_or_default_config(config_path)?;
    let registry = MappingRegistry::new(&config.paths.mappings_dir);

    if registry.are_equivalent(&first, &second) {
        println!("'{}' and '{}' are equivalent", first, second);
    } else {
        println!("'{}' and '{}' differ", first, second);
    }
    Ok(())
}

/// @ai:intent List mapping files
/// @ai:effects fs:read, io
fn list_mappings(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_or_default_config(config_path)?;
    let registry = MappingRegistry::new(&config.paths.mappings_dir);
    let names = registry.available();

    println!(
        "Available mappings in {} ({}):",
        registry.mappings_dir().display(),
        names.len()
    );
    for name in &names {
        println!("  - {}", name);
    }
    Ok(())
}

/// @ai:intent Initialize default configuration file
/// @ai:effects fs:write
fn init_config(output: PathBuf) -> Result<()> {
    let config = BenchmarkConfig::default();
    config.save(&output)?;
    println!("Configuration saved to {}", output.display());
    Ok(())
}

/// @ai:intent Load configuration or use defaults
/// @ai:effects fs:read
fn load_or_default_config(path: Option<PathBuf>) -> Result<BenchmarkConfig> {
    match path {
        Some(p) => BenchmarkConfig::load(&p),
        None => {
            let default_path = PathBuf::from("benchmark.toml");

            if default_path.exists() {
                BenchmarkConfig::load(&default_path)
            } else {
                Ok(BenchmarkConfig::default())
            }
        }
    }
}
