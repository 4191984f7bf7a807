//! @ai:module:intent Configuration structs for benchmark system
//! @ai:module:layer infrastructure
//! @ai:module:public_api BenchmarkConfig, ServiceConfig, RunConfig, PathConfig
//! @ai:module:stateless true

use crate::service::{Protocol, ScoreKind};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// @ai:intent Main configuration for the benchmark system
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    #[serde(default = "default_services")]
    pub services: Vec<ServiceConfig>,
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub paths: PathConfig,
}

/// @ai:intent Per-recognizer record, resolved once at startup
/// @ai:effects pure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub url: String,
    pub protocol: Protocol,
    pub score_kind: ScoreKind,
    pub symbols_file: PathBuf,
}

/// @ai:intent Run configuration for benchmark execution
/// @ai:effects pure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Minimum samples for a class to count in the macro recall
    #[serde(default = "default_samples_threshold")]
    pub samples_threshold: u64,
    #[serde(default)]
    pub equivalences: Vec<String>,
    #[serde(default = "default_saving")]
    pub saving: bool,
    #[serde(default)]
    pub save_unrecognized: bool,
    #[serde(default)]
    pub filter_answers: bool,
    #[serde(default)]
    pub suffix: String,
    /// Keep only the last N samples of a dataset
    #[serde(default)]
    pub limit: Option<usize>,
}

/// @ai:intent Path configuration for input/output directories
/// @ai:effects pure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathConfig {
    #[serde(default = "default_mappings_dir")]
    pub mappings_dir: PathBuf,
    #[serde(default = "default_logs_dir")]
    pub logs_dir: PathBuf,
    #[serde(default)]
    pub unicode_file: Option<PathBuf>,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            services: default_services(),
            run: RunConfig::default(),
            paths: PathConfig::default(),
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            samples_threshold: default_samples_threshold(),
            equivalences: Vec::new(),
            saving: default_saving(),
            save_unrecognized: false,
            filter_answers: false,
            suffix: String::new(),
            limit: None,
        }
    }
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            mappings_dir: default_mappings_dir(),
            logs_dir: default_logs_dir(),
            unicode_file: None,
        }
    }
}

fn default_services() -> Vec<ServiceConfig> {
    vec![
        ServiceConfig {
            name: "hwrt".to_string(),
            url: "http://localhost:5000/worker".to_string(),
            protocol: Protocol::Hwrt,
            score_kind: ScoreKind::Additive,
            symbols_file: PathBuf::from("../datasets/hwrt/symbols.csv"),
        },
        ServiceConfig {
            name: "detexify".to_string(),
            url: "http://localhost:3000/classify".to_string(),
            protocol: Protocol::Detexify,
            score_kind: ScoreKind::MinDistance,
            symbols_file: PathBuf::from("../datasets/detexify/symbols.txt"),
        },
    ]
}

fn default_top_k() -> usize {
    5
}

fn default_samples_threshold() -> u64 {
    1
}

fn default_saving() -> bool {
    true
}

fn default_mappings_dir() -> PathBuf {
    PathBuf::from("mappings")
}

fn default_logs_dir() -> PathBuf {
    PathBuf::from("logs")
}

impl BenchmarkConfig {
    /// @ai:intent Load configuration from a TOML file
    /// @ai:pre path exists and is readable
    /// @ai:effects fs:read
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// @ai:intent Save configuration to a TOML file
    /// @ai:effects fs:write
    pub fn save(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// @ai:intent Find the record of a configured service
    /// @ai:effects pure
    pub fn service(&self, name: &str) -> Option<&ServiceConfig> {
        self.services.iter().find(|s| s.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_services_score_kinds() {
        let config = BenchmarkConfig::default();
        assert_eq!(config.service("hwrt").unwrap().score_kind, ScoreKind::Additive);
        assert_eq!(
            config.service("detexify").unwrap().score_kind,
            ScoreKind::MinDistance
        );
        assert!(config.service("mathpix").is_none());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: BenchmarkConfig = toml::from_str(
            r#"
[run]
top_k = 3
equivalences = ["none", "strict-0"]
"#,
        )
        .unwrap();

        assert_eq!(config.run.top_k, 3);
        assert_eq!(config.run.samples_threshold, 1);
        assert!(config.run.saving);
        assert_eq!(config.paths.mappings_dir, PathBuf::from("mappings"));
        assert_eq!(config.services.len(), 2);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("benchmark.toml");

        let mut config = BenchmarkConfig::default();
        config.run.suffix = "_test".to_string();
        config.save(&path).unwrap();

        let loaded = BenchmarkConfig::load(&path).unwrap();
        assert_eq!(loaded.run, config.run);
        assert_eq!(loaded.services, config.services);
    }
}
