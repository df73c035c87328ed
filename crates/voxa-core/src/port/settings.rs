//! Read-only user settings.

use std::collections::HashMap;
use std::time::Duration;

/// Key/value settings persisted by the host (dotted keys, string values).
pub trait SettingsStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    /// Parse a whole number of seconds.
    fn get_duration_secs(&self, key: &str) -> Option<Duration> {
        self.get(key)?.trim().parse::<u64>().ok().map(Duration::from_secs)
    }
}

/// Settings held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySettings {
    values: HashMap<String, String>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

impl From<HashMap<String, String>> for MemorySettings {
    fn from(values: HashMap<String, String>) -> Self {
        Self { values }
    }
}

impl SettingsStore for MemorySettings {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}
