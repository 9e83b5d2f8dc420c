//! Port interface for mirroring organization data into an external cache.
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::define_port_error;
use crate::domain::{Department, Directorate, Division, User};

define_port_error! {
    /// Errors surfaced by the cache mirror adapter.
    pub enum OrganizationCacheError {
        /// Cache backend is unavailable or failed to persist.
        Backend { message: String } => "organization cache backend failure: {message}",
        /// Serialisation or deserialisation of cached content failed.
        Serialization { message: String } => "organization cache serialisation failed: {message}",
    }
}

/// Partial cache update. Collections left as `None` keep their cached value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrganizationCacheUpdate {
    /// Replacement directorate collection.
    pub directorates: Option<Vec<Directorate>>,
    /// Replacement division collection.
    pub divisions: Option<Vec<Division>>,
    /// Replacement department collection.
    pub departments: Option<Vec<Department>>,
    /// Replacement user collection.
    pub users: Option<Vec<User>>,
}

impl OrganizationCacheUpdate {
    /// Whether the update carries no collection at all.
    pub fn is_empty(&self) -> bool {
        self.directorates.is_none()
            && self.divisions.is_none()
            && self.departments.is_none()
            && self.users.is_none()
    }
}

/// The four cached collections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationSnapshot {
    /// Cached directorates.
    pub directorates: Vec<Directorate>,
    /// Cached divisions.
    pub divisions: Vec<Division>,
    /// Cached departments.
    pub departments: Vec<Department>,
    /// Cached users.
    pub users: Vec<User>,
}

impl OrganizationSnapshot {
    /// Overwrite the collections present in `update`.
    pub fn apply(&mut self, update: &OrganizationCacheUpdate) {
        if let Some(directorates) = &update.directorates {
            self.directorates.clone_from(directorates);
        }
        if let Some(divisions) = &update.divisions {
            self.divisions.clone_from(divisions);
        }
        if let Some(departments) = &update.departments {
            self.departments.clone_from(departments);
        }
        if let Some(users) = &update.users {
            self.users.clone_from(users);
        }
    }
}

/// Port for the write-through cache mirror of the store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrganizationCache: Send + Sync {
    /// Merge the collections present in `update` into the cache.
    async fn store(&self, update: &OrganizationCacheUpdate) -> Result<(), OrganizationCacheError>;

    /// Drop every cached collection.
    async fn clear(&self) -> Result<(), OrganizationCacheError>;
}

/// Cache that discards every write.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopOrganizationCache;

#[async_trait]
impl OrganizationCache for NoopOrganizationCache {
    async fn store(&self, _update: &OrganizationCacheUpdate) -> Result<(), OrganizationCacheError> {
        Ok(())
    }

    async fn clear(&self) -> Result<(), OrganizationCacheError> {
        Ok(())
    }
}
