//! @ai:module:intent Declared symbol inventories of the configured recognizers
//! @ai:module:layer domain
//! @ai:module:public_api Service, ServiceCatalog, UnicodeTable
//! @ai:module:stateless true

use crate::config::{BenchmarkConfig, ServiceConfig};
use crate::error::{Error, Result};
use crate::service::protocol::format_codepoint;
use crate::service::{Protocol, ScoreKind};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

/// @ai:intent Symbol to display codepoint lookup
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnicodeTable {
    entries: HashMap<String, String>,
}

impl UnicodeTable {
    /// @ai:intent Load a JSON object mapping symbols to codepoints
    /// @ai:effects fs:read
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let entries: HashMap<String, String> = serde_json::from_str(&content)?;
        Ok(Self { entries })
    }

    pub fn insert(&mut self, symbol: impl Into<String>, unicode: impl Into<String>) {
        self.entries.insert(symbol.into(), unicode.into());
    }

    /// Entries of `other` win over existing ones.
    pub fn extend(&mut self, other: UnicodeTable) {
        self.entries.extend(other.entries);
    }

    /// @ai:intent Codepoint of a symbol, empty when unknown
    /// @ai:effects pure
    pub fn lookup(&self, symbol: &str) -> &str {
        self.entries.get(symbol).map(String::as_str).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// @ai:intent A recognizer with its declared symbols and scoring policy
#[derive(Debug, Clone)]
pub struct Service {
    pub config: ServiceConfig,
    /// Declared symbols (latex commands)
    pub symbols: BTreeSet<String>,
    /// Dataset identifier to latex command, hwrt only
    pub symbol_ids: HashMap<String, String>,
    pub unicode: UnicodeTable,
}

impl Service {
    /// @ai:intent Build a service from an explicit inventory
    /// @ai:effects pure
    pub fn new<I, S>(config: ServiceConfig, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            config,
            symbols: symbols.into_iter().map(Into::into).collect(),
            symbol_ids: HashMap::new(),
            unicode: UnicodeTable::default(),
        }
    }

    /// @ai:intent Load the declared inventory from the service's symbols file
    /// @ai:pre config.symbols_file is readable
    /// @ai:effects fs:read
    pub fn load(config: ServiceConfig) -> Result<Self> {
        let content =
            std::fs::read_to_string(&config.symbols_file).map_err(|source| Error::FileRead {
                path: config.symbols_file.clone(),
                source,
            })?;

        let mut service = Self::new(config, Vec::<String>::new());
        match service.config.protocol {
            Protocol::Hwrt => service.parse_hwrt_symbols(&content),
            Protocol::Detexify => service.parse_symbol_lines(&content),
        }

        tracing::info!(
            "Loaded {} symbols for service '{}'",
            service.symbols.len(),
            service.name()
        );
        Ok(service)
    }

    /// `symbol_id;latex_command[;unicode_dec]`, header skipped.
    fn parse_hwrt_symbols(&mut self, content: &str) {
        for line in content.lines().skip(1).filter(|l| !l.trim().is_empty()) {
            let mut fields = line.split(';');
            let (Some(id), Some(latex)) = (fields.next(), fields.next()) else {
                tracing::warn!("Skipping malformed symbol line: {}", line);
                continue;
            };

            if let Some(codepoint) = fields.next().and_then(|d| d.trim().parse::<u32>().ok()) {
                self.unicode.insert(latex, format_codepoint(codepoint));
            }
            self.symbol_ids.insert(id.to_string(), latex.to_string());
            self.symbols.insert(latex.to_string());
        }
    }

    fn parse_symbol_lines(&mut self, content: &str) {
        self.symbols.extend(
            content
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string),
        );
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn score_kind(&self) -> ScoreKind {
        self.config.score_kind
    }

    pub fn protocol(&self) -> Protocol {
        self.config.protocol
    }

    pub fn declares(&self, symbol: &str) -> bool {
        self.symbols.contains(symbol)
    }

    /// @ai:intent Translate a dataset symbol identifier into its latex command
    /// @ai:effects pure
    pub fn symbol_name<'a>(&'a self, key: &'a str) -> Option<&'a str> {
        if self.symbol_ids.is_empty() {
            return Some(key);
        }
        self.symbol_ids.get(key).map(String::as_str)
    }
}

/// @ai:intent All configured services, looked up by name
#[derive(Debug, Clone, Default)]
pub struct ServiceCatalog {
    services: HashMap<String, Service>,
    /// Configured services whose inventory could not be loaded, with the cause
    failures: HashMap<String, String>,
}

impl ServiceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// @ai:intent Load every configured service and the shared unicode table
    /// @ai:effects fs:read
    pub fn load(config: &BenchmarkConfig) -> Result<Self> {
        let shared = match &config.paths.unicode_file {
            Some(path) => UnicodeTable::load(path)?,
            None => UnicodeTable::default(),
        };

        let mut catalog = Self::new();
        for service_config in &config.services {
            match Service::load(service_config.clone()) {
                Ok(mut service) => {
                    service.unicode.extend(shared.clone());
                    catalog.insert(service);
                }
                Err(e) => {
                    tracing::warn!("Service '{}' skipped: {}", service_config.name, e);
                    catalog
                        .failures
                        .insert(service_config.name.clone(), e.to_string());
                }
            }
        }
        Ok(catalog)
    }

    pub fn insert(&mut self, service: Service) {
        self.services.insert(service.name().to_string(), service);
    }

    /// @ai:intent Resolve a service by name
    /// @ai:post a configured service that failed to load reports its load error
    /// @ai:effects pure
    pub fn get(&self, name: &str) -> Result<&Service> {
        if let Some(service) = self.services.get(name) {
            return Ok(service);
        }
        match self.failures.get(name) {
            Some(reason) => Err(Error::ServiceLoad {
                service: name.to_string(),
                reason: reason.clone(),
            }),
            None => Err(Error::UnknownService(name.to_string())),
        }
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.services.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
