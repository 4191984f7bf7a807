//! @ai:module:intent Load, compose and cache symbol-equivalence mappings
//! @ai:module:layer application
//! @ai:module:public_api MappingRegistry
//! @ai:module:stateless false

use crate::error::Result;
use crate::mapping::equivalence::{Mapping, IDENTITY_MAPPING};
use crate::service::Service;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use walkdir::WalkDir;

/// @ai:intent Process-lifetime cache of mappings, append-only
/// @ai:invariant cached mappings are never replaced nor invalidated
pub struct MappingRegistry {
    mappings_dir: PathBuf,
    cache: RwLock<HashMap<String, Arc<Mapping>>>,
}

impl MappingRegistry {
    /// @ai:intent Create a registry reading equivalence files from `mappings_dir`
    /// @ai:effects pure
    pub fn new(mappings_dir: impl Into<PathBuf>) -> Self {
        let mut cache = HashMap::new();
        cache.insert(
            IDENTITY_MAPPING.to_string(),
            Arc::new(Mapping::identity(IDENTITY_MAPPING)),
        );

        Self {
            mappings_dir: mappings_dir.into(),
            cache: RwLock::new(cache),
        }
    }

    pub fn mappings_dir(&self) -> &Path {
        &self.mappings_dir
    }

    /// @ai:intent Path of the equivalence file backing a mapping name
    /// @ai:effects pure
    pub fn mapping_path(&self, name: &str) -> PathBuf {
        self.mappings_dir.join(format!("{}.json", name))
    }

    fn cached(&self, name: &str) -> Option<Arc<Mapping>> {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// @ai:intent Return the mapping for `name`, loading it on first request
    /// @ai:post never fails: a broken or missing file yields the identity mapping under `name`
    /// @ai:effects fs:read, state:write
    pub fn get_mapping(&self, name: &str) -> Arc<Mapping> {
        if let Some(mapping) = self.cached(name) {
            return mapping;
        }

        let mapping = match Mapping::load(name, &self.mapping_path(name)) {
            Ok(mapping) => {
                tracing::info!(
                    "Loaded mapping '{}': {} classes, {} projected symbols",
                    name,
                    mapping.classes().len(),
                    mapping.projection().len()
                );
                mapping
            }
            Err(e) if e.is_recoverable_mapping_error() => {
                tracing::warn!("Mapping '{}' falls back to identity: {}", name, e);
                Mapping::identity(name)
            }
            Err(e) => {
                tracing::error!("Mapping '{}' falls back to identity after unexpected error: {}", name, e);
                Mapping::identity(name)
            }
        };

        self.register(mapping)
    }

    /// @ai:intent Cache a mapping built in memory
    /// @ai:post an already cached name keeps its first value
    /// @ai:effects state:write
    pub fn register(&self, mapping: Mapping) -> Arc<Mapping> {
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        cache
            .entry(mapping.name().to_string())
            .or_insert_with(|| Arc::new(mapping))
            .clone()
    }

    /// @ai:intent Class of `symbol` under the named mapping
    /// @ai:effects fs:read
    pub fn project(&self, symbol: &str, mapping_name: &str) -> String {
        self.get_mapping(mapping_name).project(symbol).to_string()
    }

    /// @ai:intent Deduplicated classes of `symbols` under the named mapping
    /// @ai:effects fs:read
    pub fn project_set<'a, I>(&self, symbols: I, mapping_name: &str) -> BTreeSet<String>
    where
        I: IntoIterator<Item = &'a String>,
    {
        self.get_mapping(mapping_name).project_set(symbols)
    }

    /// @ai:intent Compose two named mappings, `outer ∘ inner`
    /// @ai:effects fs:read
    pub fn compose(&self, outer: &str, inner: &str) -> Result<Mapping> {
        Mapping::compose(&self.get_mapping(outer), &self.get_mapping(inner))
    }

    /// @ai:intent Whether two named mappings project every symbol identically
    /// @ai:effects fs:read
    pub fn are_equivalent(&self, first: &str, second: &str) -> bool {
        self.get_mapping(first)
            .is_equivalent(&self.get_mapping(second))
    }

    /// @ai:intent Classes a service supports once projected by the named mapping
    /// @ai:effects fs:read
    pub fn supported_classes(&self, service: &Service, mapping_name: &str) -> BTreeSet<String> {
        self.project_set(&service.symbols, mapping_name)
    }

    /// @ai:intent Original symbols whose class is supported by `service` under any of the mappings
    /// @ai:effects fs:read
    pub fn candidate_symbols(&self, service: &Service, mapping_names: &[String]) -> HashSet<String> {
        let mut candidates = HashSet::new();

        for name in mapping_names {
            let mapping = self.get_mapping(name);
            let supported = mapping.project_set(&service.symbols);

            // Symbols outside the projection are their own class.
            let known = service
                .symbols
                .iter()
                .chain(mapping.projection().keys())
                .chain(supported.iter());
            candidates.extend(
                known
                    .filter(|symbol| supported.contains(mapping.project(symbol)))
                    .cloned(),
            );
        }

        candidates
    }

    /// @ai:intent Names of the mapping files found in the mappings directory
    /// @ai:effects fs:read
    pub fn available(&self) -> Vec<String> {
        let mut names: Vec<String> = WalkDir::new(&self.mappings_dir)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().map(|ext| ext == "json").unwrap_or(false))
            .filter_map(|e| {
                e.path()
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .map(str::to_string)
            })
            .collect();

        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServiceConfig;
    use crate::service::{Protocol, ScoreKind};
    use tempfile::TempDir;

    fn registry_with(files: &[(&str, &str)]) -> (TempDir, MappingRegistry) {
        let temp = TempDir::new().unwrap();
        for (name, content) in files {
            std::fs::write(temp.path().join(format!("{}.json", name)), content).unwrap();
        }
        let registry = MappingRegistry::new(temp.path());
        (temp, registry)
    }

    fn service(symbols: &[&str]) -> Service {
        Service::new(
            ServiceConfig {
                name: "detexify".to_string(),
                url: "http://localhost:3000/classify".to_string(),
                protocol: Protocol::Detexify,
                score_kind: ScoreKind::MinDistance,
                symbols_file: PathBuf::from("symbols.txt"),
            },
            symbols.iter().copied(),
        )
    }

    #[test]
    fn test_get_mapping_is_cached() {
        let (_temp, registry) = registry_with(&[("strict", r#"{"A": ["a1", "a2"]}"#)]);

        let first = registry.get_mapping("strict");
        let second = registry.get_mapping("strict");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.project("a1", "strict"), "A");
    }

    #[test]
    fn test_missing_file_falls_back_to_identity_under_requested_name() {
        let (_temp, registry) = registry_with(&[]);

        let mapping = registry.get_mapping("similar-0");
        assert_eq!(mapping.name(), "similar-0");
        assert!(mapping.is_identity());
        assert_eq!(registry.project("\\alpha", "similar-0"), "\\alpha");
    }

    #[test]
    fn test_inconsistent_file_falls_back_to_identity() {
        let (_temp, registry) = registry_with(&[("dup", r#"{"A": ["x"], "B": ["x"]}"#)]);

        let mapping = registry.get_mapping("dup");
        assert!(mapping.is_identity());
        assert_eq!(mapping.name(), "dup");
    }

    #[test]
    fn test_register_keeps_first_value() {
        let (_temp, registry) = registry_with(&[]);

        let identity = registry.get_mapping("custom");
        let mut classes = crate::mapping::EquivalenceClasses::new();
        classes.insert("A".to_string(), ["a"].iter().map(|s| s.to_string()).collect());
        let replacement = Mapping::from_classes("custom", classes).unwrap();

        let registered = registry.register(replacement);
        assert!(Arc::ptr_eq(&identity, &registered));
    }

    #[test]
    fn test_compose_and_equivalence_by_name() {
        let (_temp, registry) = registry_with(&[
            ("inner", r#"{"A": ["a1", "a2"]}"#),
            ("outer", r#"{"AB": ["A", "b"]}"#),
            ("flat", r#"{"AB": ["a1", "a2", "A", "b"]}"#),
        ]);

        let composed = registry.compose("outer", "inner").unwrap();
        assert_eq!(composed.project("a1"), "AB");
        assert!(composed.is_equivalent(&registry.get_mapping("flat")));
        assert!(!registry.are_equivalent("inner", "flat"));
        assert!(registry.are_equivalent("none", "missing"));
    }

    #[test]
    fn test_candidate_symbols_union() {
        let (_temp, registry) = registry_with(&[
            ("strict", r#"{"A": ["a1", "a2"], "Q": ["q1"]}"#),
        ]);
        let service = service(&["a1", "b"]);

        let names = vec!["none".to_string(), "strict".to_string()];
        let candidates = registry.candidate_symbols(&service, &names);

        // a2 only reaches a supported class through "strict"; q1 never does.
        // "A" is not a member of its own class but still projects to it.
        let mut sorted: Vec<_> = candidates.into_iter().collect();
        sorted.sort();
        assert_eq!(sorted, vec!["A", "a1", "a2", "b"]);

        let supported = registry.supported_classes(&service, "strict");
        assert_eq!(supported.into_iter().collect::<Vec<_>>(), vec!["A", "b"]);
    }

    #[test]
    fn test_class_name_outside_its_class_is_a_candidate() {
        let (_temp, registry) =
            registry_with(&[("similar", r#"{"\\epsilon": ["\\varepsilon"]}"#)]);
        let service = service(&["\\varepsilon"]);

        let candidates = registry.candidate_symbols(&service, &["similar".to_string()]);
        assert!(candidates.contains("\\epsilon"));
        assert!(candidates.contains("\\varepsilon"));
        assert_eq!(registry.project("\\epsilon", "similar"), "\\epsilon");
    }

    #[test]
    fn test_available_lists_json_files() {
        let (temp, registry) = registry_with(&[("strict-0", "{}"), ("similar-0", "{}")]);
        std::fs::write(temp.path().join("notes.txt"), "").unwrap();

        assert_eq!(registry.available(), vec!["similar-0", "strict-0"]);
    }
}
