//! Process-local cache mirror with id lookups.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::ports::{
    OrganizationCache, OrganizationCacheError, OrganizationCacheUpdate, OrganizationSnapshot,
};
use crate::domain::{Department, Directorate, Division, Identified, User};

/// Cache mirror held in memory for the lifetime of the process.
#[derive(Debug, Default)]
pub struct InMemoryOrganizationCache {
    snapshot: Mutex<OrganizationSnapshot>,
}

fn lookup<T: Identified + Clone>(items: &[T], id: Option<&str>) -> Option<T> {
    let id = id.filter(|id| !id.is_empty())?;
    items.iter().find(|item| item.id() == id).cloned()
}

impl InMemoryOrganizationCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> MutexGuard<'_, OrganizationSnapshot> {
        self.snapshot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Clone of every cached collection.
    pub fn snapshot(&self) -> OrganizationSnapshot {
        self.guard().clone()
    }

    /// Cached directorate with `id`; `None` for a missing or empty id.
    pub fn directorate_by_id(&self, id: Option<&str>) -> Option<Directorate> {
        lookup(&self.guard().directorates, id)
    }

    /// Cached division with `id`; `None` for a missing or empty id.
    pub fn division_by_id(&self, id: Option<&str>) -> Option<Division> {
        lookup(&self.guard().divisions, id)
    }

    /// Cached department with `id`; `None` for a missing or empty id.
    pub fn department_by_id(&self, id: Option<&str>) -> Option<Department> {
        lookup(&self.guard().departments, id)
    }

    /// Cached user with `id`; `None` for a missing or empty id.
    pub fn user_by_id(&self, id: Option<&str>) -> Option<User> {
        lookup(&self.guard().users, id)
    }
}

#[async_trait]
impl OrganizationCache for InMemoryOrganizationCache {
    async fn store(&self, update: &OrganizationCacheUpdate) -> Result<(), OrganizationCacheError> {
        self.guard().apply(update);
        Ok(())
    }

    async fn clear(&self) -> Result<(), OrganizationCacheError> {
        *self.guard() = OrganizationSnapshot::default();
        Ok(())
    }
}
