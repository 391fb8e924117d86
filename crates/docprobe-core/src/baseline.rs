//! Regression baselines for per-page table counts.
//!
//! The store is a checked-in JSON file mapping a component page path to the
//! number of tables its main content region is expected to contain. A
//! changed count fails verification until it is explicitly accepted.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::error::ProbeError;

const FORMAT_VERSION: u32 = 1;

/// How table counts are compared against the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BaselineMode {
    /// Fail on any mismatch or missing entry.
    #[default]
    Check,
    /// Record the observed count as the new baseline.
    Accept,
}

/// Result of comparing one observed count with the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaselineCheck {
    Match,
    Mismatch { expected: usize, actual: usize },
    Missing { actual: usize },
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct BaselineFile {
    version: u32,
    tables: BTreeMap<String, usize>,
}

/// Versioned mapping of page path -> expected table count.
#[derive(Debug, Clone, Default)]
pub struct BaselineStore {
    path: Option<PathBuf>,
    tables: BTreeMap<String, usize>,
    dirty: bool,
}

impl BaselineStore {
    /// Store that is never written to disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load the store at `path`. A missing file yields an empty store bound to that path.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ProbeError> {
        let path = path.into();
        let tables = match std::fs::read_to_string(&path) {
            Ok(raw) => {
                let file: BaselineFile = serde_json::from_str(&raw)?;
                if file.version != FORMAT_VERSION {
                    return Err(ProbeError::ConfigError(format!(
                        "Unsupported baseline format version {} in {}",
                        file.version,
                        path.display()
                    )));
                }
                file.tables
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No baseline file at {}, starting empty", path.display());
                BTreeMap::new()
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path: Some(path),
            tables,
            dirty: false,
        })
    }

    pub fn get(&self, key: &str) -> Option<usize> {
        self.tables.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, usize)> {
        self.tables.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Whether there are accepted changes not yet saved.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Compare an observed count with the recorded baseline.
    pub fn check(&self, key: &str, actual: usize) -> BaselineCheck {
        match self.get(key) {
            Some(expected) if expected == actual => BaselineCheck::Match,
            Some(expected) => BaselineCheck::Mismatch { expected, actual },
            None => BaselineCheck::Missing { actual },
        }
    }

    /// Record `actual` as the new baseline for `key`, returning the previous value.
    pub fn accept(&mut self, key: &str, actual: usize) -> Option<usize> {
        let previous = self.tables.insert(key.to_string(), actual);
        if previous != Some(actual) {
            self.dirty = true;
        }
        previous
    }

    /// Write accepted changes back to the file the store was loaded from.
    ///
    /// No-op for in-memory stores and for stores without changes.
    pub fn save(&mut self) -> Result<(), ProbeError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if !self.dirty {
            return Ok(());
        }

        let file = BaselineFile {
            version: FORMAT_VERSION,
            tables: self.tables.clone(),
        };
        let mut json = serde_json::to_string_pretty(&file)?;
        json.push('\n');

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)?;
        tracing::info!(entries = self.tables.len(), "Saved baselines to {}", path.display());

        self.dirty = false;
        Ok(())
    }
}

impl FromIterator<(String, usize)> for BaselineStore {
    fn from_iter<I: IntoIterator<Item = (String, usize)>>(iter: I) -> Self {
        Self {
            path: None,
            tables: iter.into_iter().collect(),
            dirty: false,
        }
    }
}
