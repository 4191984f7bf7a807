//! @ai:module:intent JSON objects written with exactly one top-level entry per line
//! @ai:module:layer domain
//! @ai:module:public_api to_string, to_string_by, from_str, load
//! @ai:module:stateless true

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::Path;

/// @ai:intent Serialize entries as a JSON object, one `"key": value` per line
/// @ai:post output parses as a regular JSON object
/// @ai:effects pure
pub fn to_string<I, K, V>(entries: I) -> serde_json::Result<String>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Serialize,
{
    let mut lines = Vec::new();
    for (key, value) in entries {
        lines.push(format!(
            "{}: {}",
            serde_json::to_string(key.as_ref())?,
            serde_json::to_string(&value)?
        ));
    }

    if lines.is_empty() {
        return Ok("{\n}\n".to_string());
    }
    Ok(format!("{{\n{}\n}}\n", lines.join(",\n")))
}

/// @ai:intent Like `to_string`, keeping only entries accepted by `keep`, ordered by `compare`
/// @ai:effects pure
pub fn to_string_by<I, K, V, F, C>(entries: I, keep: F, mut compare: C) -> serde_json::Result<String>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Serialize,
    F: Fn(&K, &V) -> bool,
    C: FnMut(&(K, V), &(K, V)) -> Ordering,
{
    let mut selected: Vec<(K, V)> = entries
        .into_iter()
        .filter(|(key, value)| keep(key, value))
        .collect();
    selected.sort_by(|a, b| compare(a, b));
    to_string(selected)
}

/// @ai:intent Read back entries in file order
/// @ai:effects pure
pub fn from_str<V: DeserializeOwned>(content: &str) -> Result<Vec<(String, V)>> {
    let mut entries = Vec::new();

    for line in content.lines().map(str::trim) {
        if line.is_empty() || line == "{" || line == "}" {
            continue;
        }
        let entry = line.strip_suffix(',').unwrap_or(line);
        let parsed: BTreeMap<String, V> = serde_json::from_str(&format!("{{{}}}", entry))?;
        entries.extend(parsed);
    }

    Ok(entries)
}

/// @ai:intent Read a one-entry-per-line file
/// @ai:effects fs:read
pub fn load<V: DeserializeOwned>(path: &Path) -> Result<Vec<(String, V)>> {
    let content = std::fs::read_to_string(path).map_err(|source| Error::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    from_str(&content)
}
