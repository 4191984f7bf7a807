//! @ai:module:intent Named partitions of symbols into interchangeable classes
//! @ai:module:layer domain
//! @ai:module:public_api Mapping, EquivalenceClasses, IDENTITY_MAPPING
//! @ai:module:stateless true

use crate::error::{Error, Result};
use crate::line_json;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

/// Name of the mapping under which every symbol is its own class.
pub const IDENTITY_MAPPING: &str = "none";

/// Class name to member symbols.
pub type EquivalenceClasses = BTreeMap<String, BTreeSet<String>>;

/// @ai:intent Equivalence classes of a mapping and the projection they induce
/// @ai:invariant every symbol belongs to at most one class
/// @ai:invariant never mutated after construction
#[derive(Debug, Clone, PartialEq)]
pub struct Mapping {
    name: String,
    classes: EquivalenceClasses,
    projection: HashMap<String, String>,
}

impl Mapping {
    /// @ai:intent Mapping with no classes; every symbol projects to itself
    /// @ai:effects pure
    pub fn identity(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            classes: EquivalenceClasses::new(),
            projection: HashMap::new(),
        }
    }

    /// @ai:intent Build the projection by inverting the classes
    /// @ai:post Err(Consistency) if a symbol appears under two classes
    /// @ai:effects pure
    pub fn from_classes(name: impl Into<String>, classes: EquivalenceClasses) -> Result<Self> {
        let mut projection = HashMap::new();

        for (class, symbols) in &classes {
            for symbol in symbols {
                if let Some(first) = projection.insert(symbol.clone(), class.clone()) {
                    return Err(Error::Consistency {
                        symbol: symbol.clone(),
                        first,
                        second: class.clone(),
                    });
                }
            }
        }

        Ok(Self {
            name: name.into(),
            classes,
            projection,
        })
    }

    /// @ai:intent Load an equivalence-class file: a JSON object of class -> [symbols]
    /// @ai:effects fs:read
    pub fn load(name: &str, path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

        let raw: BTreeMap<String, Vec<String>> =
            serde_json::from_str(&content).map_err(|e| Error::Configuration {
                name: name.to_string(),
                reason: format!("{}: {}", path.display(), e),
            })?;

        let classes = raw
            .into_iter()
            .map(|(class, symbols)| (class, symbols.into_iter().collect()))
            .collect();

        Self::from_classes(name, classes)
    }

    /// @ai:intent Write the classes in the one-entry-per-line format
    /// @ai:effects fs:write
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = line_json::to_string(&self.classes)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// @ai:intent Same classes under another name
    /// @ai:effects pure
    pub fn renamed(self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn classes(&self) -> &EquivalenceClasses {
        &self.classes
    }

    pub fn projection(&self) -> &HashMap<String, String> {
        &self.projection
    }

    pub fn is_identity(&self) -> bool {
        self.projection.is_empty()
    }

    /// @ai:intent Class of a symbol; unmapped symbols are their own class
    /// @ai:effects pure
    pub fn project<'a>(&'a self, symbol: &'a str) -> &'a str {
        self.projection
            .get(symbol)
            .map(String::as_str)
            .unwrap_or(symbol)
    }

    /// @ai:intent Project every symbol, deduplicating the classes
    /// @ai:effects pure
    pub fn project_set<'a, I>(&self, symbols: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = &'a String>,
    {
        symbols
            .into_iter()
            .map(|s| self.project(s).to_string())
            .collect()
    }

    /// @ai:intent Compose `outer ∘ inner`: project through `inner`, then through `outer`
    /// @ai:post project(s, result) == outer.project(inner.project(s)) for every s
    /// @ai:effects pure
    pub fn compose(outer: &Mapping, inner: &Mapping) -> Result<Mapping> {
        let mut classes = EquivalenceClasses::new();

        for symbol in inner.projection.keys() {
            let class = outer.project(inner.project(symbol));
            classes
                .entry(class.to_string())
                .or_default()
                .insert(symbol.clone());
        }

        for (symbol, class) in &outer.projection {
            if !inner.projection.contains_key(symbol) {
                classes
                    .entry(class.clone())
                    .or_default()
                    .insert(symbol.clone());
            }
        }

        Self::from_classes(format!("{}∘{}", outer.name, inner.name), classes)
    }

    /// @ai:intent Projection pairs that actually change a symbol
    /// @ai:effects pure
    pub fn non_trivial_pairs(&self) -> BTreeSet<(&str, &str)> {
        self.projection
            .iter()
            .filter(|(symbol, class)| symbol != class)
            .map(|(symbol, class)| (symbol.as_str(), class.as_str()))
            .collect()
    }

    /// @ai:intent Whether two mappings project every symbol identically
    /// @ai:effects pure
    pub fn is_equivalent(&self, other: &Mapping) -> bool {
        self.non_trivial_pairs() == other.non_trivial_pairs()
    }
}
