//! User settings read from `settings.toml`.
//!
//! Nested tables are flattened into dotted keys, so
//!
//! ```toml
//! [weather]
//! default_city = "Казань"
//! ```
//!
//! is read back as `weather.default_city`. Scalar values are kept as their
//! string form; arrays are ignored.

use std::collections::HashMap;
use std::path::Path;

use voxa_core::port::SettingsStore;

/// Read-only settings loaded once from `{data_dir}/settings.toml`.
#[derive(Debug, Clone, Default)]
pub struct TomlSettings {
    values: HashMap<String, String>,
}

impl TomlSettings {
    /// Load settings, treating a missing or malformed file as empty.
    pub async fn load(data_dir: &Path) -> Self {
        let path = data_dir.join("settings.toml");

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No settings.toml found at {}", path.display());
                return Self::default();
            }
            Err(err) => {
                tracing::warn!("Failed to read {}: {err}, ignoring settings", path.display());
                return Self::default();
            }
        };

        match Self::parse(&content) {
            Ok(settings) => settings,
            Err(err) => {
                tracing::warn!("Failed to parse {}: {err}, ignoring settings", path.display());
                Self::default()
            }
        }
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        let table: toml::Table = toml::from_str(content)?;
        let mut values = HashMap::new();
        flatten("", &table, &mut values);
        Ok(Self { values })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn flatten(prefix: &str, table: &toml::Table, out: &mut HashMap<String, String>) {
    for (key, value) in table {
        let key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        let text = match value {
            toml::Value::Table(nested) => {
                flatten(&key, nested, out);
                continue;
            }
            toml::Value::Array(_) => continue,
            toml::Value::String(s) => s.clone(),
            toml::Value::Integer(i) => i.to_string(),
            toml::Value::Float(f) => f.to_string(),
            toml::Value::Boolean(b) => b.to_string(),
            toml::Value::Datetime(d) => d.to_string(),
        };
        out.insert(key, text);
    }
}

impl SettingsStore for TomlSettings {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}
