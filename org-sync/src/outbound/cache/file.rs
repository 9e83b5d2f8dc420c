//! Versioned JSON file cache mirror.
//!
//! The snapshot lives in `organization.json` inside a directory opened
//! through `cap_std`. Writes go to a staging file that is renamed over the
//! snapshot. A snapshot written with a different data version is ignored.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::ports::{
    OrganizationCache, OrganizationCacheError, OrganizationCacheUpdate, OrganizationSnapshot,
};

/// File name of the cached snapshot.
pub const CACHE_FILE_NAME: &str = "organization.json";
/// Data version stamped into every snapshot written by this build.
pub const CACHE_DATA_VERSION: &str = "org-sync/1";

const STAGING_FILE_NAME: &str = "organization.json.tmp";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CachedSnapshot {
    data_version: String,
    written_at: DateTime<Utc>,
    #[serde(flatten)]
    snapshot: OrganizationSnapshot,
}

/// Cache mirror persisted as a JSON file.
#[derive(Debug)]
pub struct FileOrganizationCache {
    root: PathBuf,
    dir: Dir,
    write_lock: Mutex<()>,
}

fn backend_error(path: &Path, error: &io::Error) -> OrganizationCacheError {
    OrganizationCacheError::backend(format!("{}: {error}", path.display()))
}

impl FileOrganizationCache {
    /// Open (creating if needed) the cache directory at `root`.
    ///
    /// # Errors
    ///
    /// Returns [`OrganizationCacheError::Backend`] when the directory cannot
    /// be created or opened.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, OrganizationCacheError> {
        let root = root.into();
        Dir::create_ambient_dir_all(&root, ambient_authority())
            .map_err(|error| backend_error(&root, &error))?;
        let dir = Dir::open_ambient_dir(&root, ambient_authority())
            .map_err(|error| backend_error(&root, &error))?;
        Ok(Self {
            root,
            dir,
            write_lock: Mutex::new(()),
        })
    }

    /// Load the cached snapshot.
    ///
    /// Returns `Ok(None)` when no snapshot exists or it was written with a
    /// different data version.
    ///
    /// # Errors
    ///
    /// Returns [`OrganizationCacheError::Backend`] when the file cannot be
    /// read and [`OrganizationCacheError::Serialization`] when it is not a
    /// valid snapshot.
    pub fn load(&self) -> Result<Option<OrganizationSnapshot>, OrganizationCacheError> {
        let raw = match self.dir.read(CACHE_FILE_NAME) {
            Ok(raw) => raw,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(backend_error(&self.root.join(CACHE_FILE_NAME), &error)),
        };
        let cached: CachedSnapshot = serde_json::from_slice(&raw)
            .map_err(|error| OrganizationCacheError::serialization(error.to_string()))?;
        if cached.data_version != CACHE_DATA_VERSION {
            debug!(
                found = %cached.data_version,
                expected = CACHE_DATA_VERSION,
                "discarding organization cache with stale data version"
            );
            return Ok(None);
        }
        Ok(Some(cached.snapshot))
    }

    fn write(&self, snapshot: OrganizationSnapshot) -> Result<(), OrganizationCacheError> {
        let cached = CachedSnapshot {
            data_version: CACHE_DATA_VERSION.to_owned(),
            written_at: Utc::now(),
            snapshot,
        };
        let encoded = serde_json::to_vec_pretty(&cached)
            .map_err(|error| OrganizationCacheError::serialization(error.to_string()))?;
        self.dir
            .write(STAGING_FILE_NAME, encoded)
            .map_err(|error| backend_error(&self.root.join(STAGING_FILE_NAME), &error))?;
        self.dir
            .rename(STAGING_FILE_NAME, &self.dir, CACHE_FILE_NAME)
            .map_err(|error| backend_error(&self.root.join(CACHE_FILE_NAME), &error))
    }
}

#[async_trait]
impl OrganizationCache for FileOrganizationCache {
    async fn store(&self, update: &OrganizationCacheUpdate) -> Result<(), OrganizationCacheError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut snapshot = match self.load() {
            Ok(existing) => existing.unwrap_or_default(),
            Err(error) => {
                warn!(error = %error, "replacing unreadable organization cache");
                OrganizationSnapshot::default()
            }
        };
        snapshot.apply(update);
        self.write(snapshot)
    }

    async fn clear(&self) -> Result<(), OrganizationCacheError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        match self.dir.remove_file(CACHE_FILE_NAME) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(backend_error(&self.root.join(CACHE_FILE_NAME), &error)),
        }
    }
}
