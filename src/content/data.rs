//! Data-file store with key aliasing.
//!
//! Every `.json` file under the data root becomes addressable in templates
//! under its canonical stem and an underscore alias: `code-examples.json`
//! is `data.code_examples`, `sitemap.entries.json` is `data.sitemap_entries`,
//! a nested `nav/footer.json` is `data.nav_footer`.
//!
//! Alias derivation is pure and deterministic; on a collision the
//! first-registered file wins, with registration order fixed by sorted
//! enumeration.

use serde_json::{Map, Value};
use std::{collections::BTreeMap, path::Path};
use walkdir::WalkDir;

/// Loaded data namespace, keyed by canonical stem and alias.
#[derive(Debug, Clone, Default)]
pub struct DataStore {
    entries: BTreeMap<String, Value>,
    /// Files that failed to parse, as `(relative path, message)`.
    pub warnings: Vec<(String, String)>,
}

/// Derive the underscore alias for a data-file stem.
///
/// Hyphens, dots, and path separators map to underscores, so a nested
/// `sub/file.json` is reachable as `data.sub_file`; other characters pass
/// through.
pub fn alias_key(stem: &str) -> String {
    stem.chars()
        .map(|c| if c == '-' || c == '.' || c == '/' { '_' } else { c })
        .collect()
}

impl DataStore {
    /// Load every `.json` file under `data_dir`.
    ///
    /// A missing data root is not an error, merely an empty namespace.
    pub fn load(data_dir: &Path) -> Self {
        let mut store = Self::default();
        if !data_dir.is_dir() {
            return store;
        }

        let walker = WalkDir::new(data_dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"));

        for entry in walker {
            let rel = entry
                .path()
                .strip_prefix(data_dir)
                .unwrap_or(entry.path())
                .to_string_lossy()
                .replace('\\', "/");
            let stem = rel.trim_end_matches(".json").to_string();

            let value = match std::fs::read_to_string(entry.path())
                .map_err(|e| e.to_string())
                .and_then(|raw| serde_json::from_str::<Value>(&raw).map_err(|e| e.to_string()))
            {
                Ok(value) => value,
                Err(message) => {
                    store.warnings.push((rel, message));
                    continue;
                }
            };

            store.register(&stem, value);
        }

        store
    }

    /// Register a value under its canonical key and alias. First wins.
    fn register(&mut self, stem: &str, value: Value) {
        if !self.entries.contains_key(stem) {
            self.entries.insert(stem.to_string(), value.clone());
        }
        let alias = alias_key(stem);
        if alias != stem && !self.entries.contains_key(&alias) {
            self.entries.insert(alias, value);
        }
    }

    /// Look up by canonical key or alias.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// The whole namespace as one JSON object, for template binding.
    pub fn as_json(&self) -> Value {
        let map: Map<String, Value> =
            self.entries.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        Value::Object(map)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
