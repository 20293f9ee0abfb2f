//! RON-file backed settings store.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use ron::ser::PrettyConfig;
use tracing::debug;

use crate::{
    Error,
    store::{ConfigService, Sections, check_key, insert, lookup},
};

/// Settings persisted as a RON map of sections.
#[derive(Debug, Clone)]
pub struct RonStore {
    path: PathBuf,
    sections: Sections,
}

impl RonStore {
    /// Load settings from `path`. A missing file yields an empty store.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let sections = match fs::read_to_string(path) {
            Ok(text) => parse(&text, Some(path))?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "settings file missing; using defaults");
                Sections::new()
            }
            Err(e) => {
                return Err(Error::Read {
                    path: Some(path.to_path_buf()),
                    message: e.to_string(),
                });
            }
        };
        Ok(Self {
            path: path.to_path_buf(),
            sections,
        })
    }

    /// File this store reads from and writes to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write all sections back to disk through a temporary sibling file.
    pub fn save(&self) -> Result<(), Error> {
        let write_err = |message: String| Error::Write {
            path: self.path.clone(),
            message,
        };
        let text = ron::ser::to_string_pretty(&self.sections, PrettyConfig::default())
            .map_err(|e| write_err(e.to_string()))?;
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| write_err(e.to_string()))?;
        }
        let tmp = self.path.with_extension("ron.tmp");
        fs::write(&tmp, text).map_err(|e| write_err(e.to_string()))?;
        fs::rename(&tmp, &self.path).map_err(|e| write_err(e.to_string()))?;
        debug!(path = %self.path.display(), "settings saved");
        Ok(())
    }
}

impl ConfigService for RonStore {
    fn get(&self, section: &str, key: &str, fallback: &str) -> String {
        lookup(&self.sections, section, key).unwrap_or_else(|| fallback.to_string())
    }

    fn set(&mut self, section: &str, key: &str, value: &str) -> Result<(), Error> {
        check_key(section, key)?;
        insert(&mut self.sections, section, key, value);
        Ok(())
    }
}

/// Parse RON settings text.
pub fn parse(text: &str, path: Option<&Path>) -> Result<Sections, Error> {
    if text.trim().is_empty() {
        return Ok(Sections::new());
    }
    ron::from_str(text).map_err(|e| Error::Parse {
        path: path.map(Path::to_path_buf),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = RonStore::load(&dir.path().join("settings.ron")).unwrap();
        assert_eq!(store.get("monitor", "mode", "template"), "template");
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.ron");
        let mut store = RonStore::load(&path).unwrap();
        store.set("filter", "title", "Remote, RDP").unwrap();
        store.set("grid", "rows", "3").unwrap();
        store.save().unwrap();

        let back = RonStore::load(&path).unwrap();
        assert_eq!(back.get("filter", "title", ""), "Remote, RDP");
        assert_eq!(back.get("grid", "rows", "2"), "3");
        assert!(!path.with_extension("ron.tmp").exists());
    }

    #[test]
    fn parse_error_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.ron");
        fs::write(&path, "{ \"grid\": { \"rows\": 3 ").unwrap();
        let err = RonStore::load(&path).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
        assert_eq!(err.path(), Some(path.as_path()));
    }
}
