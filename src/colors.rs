use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info};

use crate::error::ConfigError;
use crate::translate::{Translator, translate_or_original};

/// Source-language color token -> target-language token.
#[derive(Debug, Clone, Default)]
pub struct ColorLookupTable {
    entries: HashMap<String, String>,
}

impl ColorLookupTable {
    pub fn new(entries: HashMap<String, String>) -> Self {
        Self { entries }
    }

    /// Builds from bilingual labels of the form `黑色的（ブラック）`.
    /// Labels without the full-width parentheses are skipped.
    pub fn from_bilingual_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries = labels
            .into_iter()
            .filter_map(|label| {
                split_bilingual(label.as_ref())
                    .map(|(target, source)| (source.to_string(), target.to_string()))
            })
            .collect();
        Self { entries }
    }

    /// Reads a `color_mapping.json` whose keys are bilingual labels.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let mapping: HashMap<String, serde_json::Value> =
            serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })?;
        let table = Self::from_bilingual_labels(mapping.keys());
        info!("loaded color mapping with {} colors from {}", table.len(), path.display());
        Ok(table)
    }

    pub fn get(&self, source: &str) -> Option<&str> {
        self.entries.get(source).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// `中文（日本語）` -> (`中文`, `日本語`).
pub fn split_bilingual(label: &str) -> Option<(&str, &str)> {
    let (target, rest) = label.split_once('（')?;
    let (source, _) = rest.split_once('）')?;
    if target.is_empty() || source.is_empty() {
        return None;
    }
    Some((target, source))
}

pub fn bilingual(target: &str, source: &str) -> String {
    format!("{}（{}）", target, source)
}

/// Resolves page color labels to bilingual display labels.
pub struct ColorResolver<'a> {
    table: &'a ColorLookupTable,
    translator: &'a dyn Translator,
}

impl<'a> ColorResolver<'a> {
    pub fn new(table: &'a ColorLookupTable, translator: &'a dyn Translator) -> Self {
        Self { table, translator }
    }

    pub fn resolve(&self, label: &str) -> String {
        let label = label.trim();
        if label.is_empty() {
            return String::new();
        }
        if let Some(mapped) = self.table.get(label) {
            debug!("color mapped: {} -> {}", label, mapped);
            return bilingual(mapped, label);
        }
        info!("color '{}' not in mapping table, translating", label);
        let translated = translate_or_original(self.translator, label);
        bilingual(&translated, label)
    }
}
