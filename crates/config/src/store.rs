//! String-keyed settings storage.

use std::collections::BTreeMap;

use crate::Error;

/// Sections of string values, each keyed by name.
pub type Sections = BTreeMap<String, BTreeMap<String, String>>;

/// Get/set string values by `(section, key)` with a string fallback.
///
/// Values are read when an arrangement or monitor starts, never polled.
pub trait ConfigService {
    /// Stored value for `section.key`, or `fallback` when absent.
    fn get(&self, section: &str, key: &str, fallback: &str) -> String;

    /// Store `value` under `section.key`.
    fn set(&mut self, section: &str, key: &str, value: &str) -> Result<(), Error>;
}

/// Reject empty or whitespace-only section and key names.
pub(crate) fn check_key(section: &str, key: &str) -> Result<(), Error> {
    if section.trim().is_empty() || key.trim().is_empty() {
        return Err(Error::invalid(section, key, "section and key must be non-empty"));
    }
    Ok(())
}

/// Volatile store, used by tests and hosts without persistence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    sections: Sections,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// All stored values.
    pub fn sections(&self) -> &Sections {
        &self.sections
    }
}

impl From<Sections> for MemoryStore {
    fn from(sections: Sections) -> Self {
        Self { sections }
    }
}

impl ConfigService for MemoryStore {
    fn get(&self, section: &str, key: &str, fallback: &str) -> String {
        lookup(&self.sections, section, key).unwrap_or_else(|| fallback.to_string())
    }

    fn set(&mut self, section: &str, key: &str, value: &str) -> Result<(), Error> {
        check_key(section, key)?;
        insert(&mut self.sections, section, key, value);
        Ok(())
    }
}

pub(crate) fn lookup(sections: &Sections, section: &str, key: &str) -> Option<String> {
    sections.get(section).and_then(|s| s.get(key)).cloned()
}

pub(crate) fn insert(sections: &mut Sections, section: &str, key: &str, value: &str) {
    sections
        .entry(section.to_string())
        .or_default()
        .insert(key.to_string(), value.to_string());
}
