//! Content-addressed memo of scan results.
//!
//! Entries hold the raw references extracted from a source, not resolved
//! component ids, so a change in the set of known components can never
//! surface stale edges. A cold cache and a warm cache give identical results.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::{self, Write};

use camino::Utf8Path;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use stratum_graph::ComponentId;
use stratum_syntax::{MarkerSet, ModuleReference, SupportedLanguage};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::SCAN_LOG_TARGET;
use crate::error::CacheError;

const CACHE_FORMAT_VERSION: u32 = 1;

/// Returns the SHA-256 hex digest keying a scan result.
///
/// The digest covers the source text together with the language and marker
/// names, since both change what a scan extracts.
#[must_use]
pub fn content_digest(language: SupportedLanguage, markers: &MarkerSet, source: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(language.as_str().as_bytes());
    hasher.update([0]);
    for name in markers.names() {
        hasher.update(name.as_bytes());
        hasher.update([0]);
    }
    hasher.update([0]);
    hasher.update(source.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
struct CacheEntry {
    digest: String,
    references: Vec<ModuleReference>,
}

/// Scan results keyed by component id and validated by content digest.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ScanCache {
    version: u32,
    entries: BTreeMap<ComponentId, CacheEntry>,
}

impl Default for ScanCache {
    fn default() -> Self {
        Self {
            version: CACHE_FORMAT_VERSION,
            entries: BTreeMap::new(),
        }
    }
}

impl ScanCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached references for `id` when its digest still matches.
    #[must_use]
    pub fn lookup(&self, id: &str, digest: &str) -> Option<&[ModuleReference]> {
        self.entries
            .get(id)
            .filter(|entry| entry.digest == digest)
            .map(|entry| entry.references.as_slice())
    }

    /// Stores the references extracted for `id`.
    pub fn store(&mut self, id: ComponentId, digest: String, references: Vec<ModuleReference>) {
        self.entries.insert(id, CacheEntry { digest, references });
    }

    /// Drops the entry for `id`, if any.
    pub fn invalidate(&mut self, id: &str) {
        self.entries.remove(id);
    }

    /// Drops every entry whose id is not in `live`.
    pub fn retain_ids(&mut self, live: &BTreeSet<ComponentId>) {
        let before = self.entries.len();
        self.entries.retain(|id, _| live.contains(id));
        let pruned = before.saturating_sub(self.entries.len());
        if pruned > 0 {
            debug!(target: SCAN_LOG_TARGET, pruned, "pruned scan cache entries");
        }
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parses a cache from its JSON form.
    ///
    /// # Errors
    ///
    /// Returns the JSON error for malformed input.
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Renders the cache as JSON.
    ///
    /// # Errors
    ///
    /// Returns the JSON error if serialisation fails.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Loads a persisted cache.
    ///
    /// A missing file yields an empty cache. An unreadable, corrupt or
    /// outdated file is logged and also yields an empty cache.
    #[must_use]
    pub fn load(path: &Utf8Path) -> Self {
        if !path.exists() {
            debug!(target: SCAN_LOG_TARGET, path = %path, "no scan cache on disk");
            return Self::new();
        }
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(error) => {
                warn!(target: SCAN_LOG_TARGET, path = %path, %error, "scan cache unreadable; starting empty");
                return Self::new();
            }
        };
        match Self::from_json_str(&text) {
            Ok(cache) if cache.version == CACHE_FORMAT_VERSION => {
                debug!(target: SCAN_LOG_TARGET, path = %path, entries = cache.len(), "scan cache loaded");
                cache
            }
            Ok(cache) => {
                warn!(
                    target: SCAN_LOG_TARGET,
                    path = %path,
                    version = cache.version,
                    "scan cache format outdated; starting empty"
                );
                Self::new()
            }
            Err(error) => {
                warn!(target: SCAN_LOG_TARGET, path = %path, %error, "scan cache corrupt; starting empty");
                Self::new()
            }
        }
    }

    /// Persists the cache, replacing any previous file atomically.
    ///
    /// # Errors
    ///
    /// Returns a [`CacheError`] when serialisation or the write fails.
    pub fn save(&self, path: &Utf8Path) -> Result<(), CacheError> {
        let text = self.to_json_string()?;
        let write_error = |source: io::Error| CacheError::Write {
            path: path.to_path_buf(),
            source,
        };
        let parent = path
            .parent()
            .filter(|dir| !dir.as_str().is_empty())
            .unwrap_or_else(|| Utf8Path::new("."));
        // The staging file is removed on drop if any step below fails.
        let mut staging = NamedTempFile::new_in(parent).map_err(write_error)?;
        staging.write_all(text.as_bytes()).map_err(write_error)?;
        staging
            .persist(path)
            .map_err(|failure| write_error(failure.error))?;
        debug!(target: SCAN_LOG_TARGET, path = %path, entries = self.len(), "scan cache saved");
        Ok(())
    }
}
