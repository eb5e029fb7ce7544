//! Internationalization (i18n) dictionaries
//!
//! Dictionaries live in `<i18n_dir>/<lang>.yml` (or `.yaml` / `.json`).
//! Keys can be nested and are addressed with dots, e.g. `sections.skills`.

use anyhow::Result;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::config::CategoryConfig;

type Dictionary = HashMap<String, serde_yaml::Value>;

/// Language dictionaries with English fallback
pub struct I18n {
    /// Current language
    language: String,
    /// lang -> key -> value
    dictionaries: HashMap<String, Dictionary>,
}

impl I18n {
    pub fn new(language: &str) -> Self {
        Self {
            language: language.to_string(),
            dictionaries: HashMap::new(),
        }
    }

    /// Load every dictionary file from a directory; unreadable files are skipped
    pub fn load_languages<P: AsRef<Path>>(&mut self, dir: P) -> Result<()> {
        let dir = dir.as_ref();
        if !dir.exists() {
            return Ok(());
        }

        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            let ext = path.extension().and_then(|e| e.to_str());
            if !path.is_file() || !matches!(ext, Some("yml") | Some("yaml") | Some("json")) {
                continue;
            }

            let Some(lang) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            // JSON is valid YAML, one parser covers both
            let content = fs::read_to_string(&path)?;
            match serde_yaml::from_str::<Dictionary>(&content) {
                Ok(dictionary) => {
                    tracing::debug!("Loaded language file: {:?}", path);
                    self.dictionaries.insert(lang.to_string(), dictionary);
                }
                Err(e) => tracing::warn!("Failed to parse language file {:?}: {}", path, e),
            }
        }

        Ok(())
    }

    /// Register a dictionary directly
    pub fn insert(&mut self, lang: &str, dictionary: HashMap<String, serde_yaml::Value>) {
        self.dictionaries.insert(lang.to_string(), dictionary);
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Look a key up in the current language, then in English
    pub fn lookup(&self, key: &str) -> Option<String> {
        let mut candidates = vec![self.language.as_str()];
        if self.language != "en" {
            candidates.push("en");
        }

        candidates
            .into_iter()
            .filter_map(|lang| self.dictionaries.get(lang))
            .find_map(|dictionary| nested_value(dictionary, key))
            .and_then(scalar_to_string)
    }

    /// Translate a key, returning the key itself when nothing matches
    pub fn get(&self, key: &str) -> String {
        self.lookup(key).unwrap_or_else(|| key.to_string())
    }

    /// Heading for a category: configured label, dictionary entry, or
    /// the capitalized category name
    pub fn section_label(&self, category: &CategoryConfig) -> String {
        if let Some(label) = &category.label {
            return label.clone();
        }

        self.lookup(&format!("sections.{}", category.name))
            .unwrap_or_else(|| capitalize(&category.name))
    }

    /// All strings for the current language flattened to dotted keys,
    /// with English filling the gaps
    pub fn strings(&self) -> IndexMap<String, String> {
        let mut result = IndexMap::new();

        let mut languages = vec![self.language.as_str()];
        if self.language != "en" {
            languages.push("en");
        }

        for lang in languages {
            if let Some(dictionary) = self.dictionaries.get(lang) {
                let mut keys: Vec<_> = dictionary.keys().collect();
                keys.sort();
                for key in keys {
                    flatten(key, &dictionary[key], &mut result);
                }
            }
        }

        result
    }
}

impl Default for I18n {
    fn default() -> Self {
        Self::new("en")
    }
}

fn nested_value<'a>(dictionary: &'a Dictionary, key: &str) -> Option<&'a serde_yaml::Value> {
    let mut parts = key.split('.');
    let mut current = dictionary.get(parts.next()?)?;

    for part in parts {
        current = current.as_mapping()?.get(part)?;
    }

    Some(current)
}

fn scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn flatten(prefix: &str, value: &serde_yaml::Value, out: &mut IndexMap<String, String>) {
    if let Some(map) = value.as_mapping() {
        for (key, nested) in map {
            if let Some(key) = key.as_str() {
                flatten(&format!("{}.{}", prefix, key), nested, out);
            }
        }
    } else if let Some(s) = scalar_to_string(value) {
        out.entry(prefix.to_string()).or_insert(s);
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
