//! On-disk cache for the autocomplete catalog (7-day TTL).

use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tracing::{debug, info, warn};

use crate::util::format::age_string;

const CATALOG_FILENAME: &str = "catalog_cache.json";
const CACHE_DIR_NAME: &str = "freight-splitter";

/// Type names only change with game patches.
pub const CATALOG_CACHE_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogCache {
    /// RFC 3339 timestamp of when the names were fetched.
    pub cached_at: String,
    pub names: Vec<String>,
}

impl CatalogCache {
    pub fn new(names: Vec<String>) -> Self {
        Self::at(names, OffsetDateTime::now_utc())
    }

    pub fn at(names: Vec<String>, cached_at: OffsetDateTime) -> Self {
        Self {
            cached_at: cached_at.format(&Rfc3339).unwrap_or_default(),
            names,
        }
    }

    /// Age of the entry. An unreadable timestamp counts as infinitely old.
    pub fn age(&self) -> Duration {
        let Ok(cached_at) = OffsetDateTime::parse(&self.cached_at, &Rfc3339) else {
            return Duration::MAX;
        };
        Duration::try_from(OffsetDateTime::now_utc() - cached_at).unwrap_or_default()
    }

    pub fn is_expired(&self) -> bool {
        self.age() > CATALOG_CACHE_TTL
    }

    pub fn age_string(&self) -> String {
        age_string(self.age())
    }
}

/// Directory holding cache files.
#[derive(Debug, Clone)]
pub struct CacheDir {
    root: PathBuf,
}

impl CacheDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Per-user local data directory, or the working directory when there is none.
    pub fn default_location() -> Self {
        let base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::new(base.join(CACHE_DIR_NAME))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn catalog_path(&self) -> PathBuf {
        self.root.join(CATALOG_FILENAME)
    }

    /// Loads the catalog if present, readable and not expired.
    pub fn load_catalog(&self) -> Option<CatalogCache> {
        let path = self.catalog_path();
        if !path.exists() {
            debug!(path = %path.display(), "no catalog cache");
            return None;
        }

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(error) => {
                warn!(%error, "failed to read catalog cache");
                return None;
            }
        };
        let cache: CatalogCache = match serde_json::from_str(&content) {
            Ok(cache) => cache,
            Err(error) => {
                warn!(%error, "failed to parse catalog cache");
                return None;
            }
        };

        if cache.is_expired() {
            info!(age = %cache.age_string(), "catalog cache expired");
            return None;
        }
        debug!(names = cache.names.len(), age = %cache.age_string(), "loaded catalog cache");
        Some(cache)
    }

    pub fn save_catalog(&self, cache: &CatalogCache) -> Result<(), io::Error> {
        fs::create_dir_all(&self.root)?;
        let content = serde_json::to_string(cache)?;
        fs::write(self.catalog_path(), content)?;
        info!(names = cache.names.len(), "saved catalog cache");
        Ok(())
    }

    pub fn clear_catalog(&self) -> Result<(), io::Error> {
        match fs::remove_file(self.catalog_path()) {
            Err(error) if error.kind() != io::ErrorKind::NotFound => Err(error),
            _ => Ok(()),
        }
    }
}
