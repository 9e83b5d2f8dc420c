//! Single-entity create, update and delete operations.

use serde_json::json;
use tracing::debug;

use super::OrganizationStore;
use super::entity::StoredEntity;
use crate::domain::payload::{
    AssignmentPatch, DepartmentPatch, DirectoratePatch, DivisionPatch, NewAssignment,
    NewDepartment, NewDirectorate, NewDivision, NewRole, NewUser, Payload, RolePatch, UserPatch,
};
use crate::domain::sorting::{find_by_id, remove_by_id, upsert_by_id};
use crate::domain::{
    AssistantAssignment, Department, Directorate, Division, DomainError, Role, User,
};

fn soft_delete_payload() -> Payload {
    let mut payload = Payload::new();
    payload.insert("is_active".to_owned(), json!(false));
    payload
}

impl OrganizationStore {
    fn find<T: StoredEntity>(&self, id: &str) -> Option<T> {
        find_by_id(T::collection(&self.state().data), id)
    }

    fn require<T: StoredEntity>(&self, id: &str) -> Result<T, DomainError> {
        self.find(id)
            .ok_or_else(|| DomainError::not_found(format!("{} {id} not found", T::KIND)))
    }

    fn decode<T: StoredEntity>(raw: &serde_json::Value) -> Result<T, DomainError> {
        T::map(raw).ok_or_else(|| {
            DomainError::internal(format!("{} response could not be mapped", T::KIND))
        })
    }

    fn generation(&self) -> u64 {
        self.state().generation
    }

    /// Merge `entity` unless the store was reset after the request started.
    async fn merge<T: StoredEntity>(&self, entity: T, generation: u64) {
        let update = {
            let mut state = self.state();
            if state.generation != generation {
                debug!(kind = T::KIND, "dropping mutation result after reset");
                return;
            }
            let items = T::collection_mut(&mut state.data);
            upsert_by_id(items, entity);
            T::restore_order(items);
            T::cache_update(&state.data)
        };
        if let Some(update) = update {
            self.mirror(&update).await;
        }
    }

    async fn create<T: StoredEntity>(&self, payload: &Payload) -> Result<T, DomainError> {
        let generation = self.generation();
        let raw = self
            .api
            .post(&T::RESOURCE.collection_path(), payload)
            .await?;
        let entity = Self::decode::<T>(&raw)?;
        self.merge(entity.clone(), generation).await;
        Ok(entity)
    }

    async fn patch<T: StoredEntity>(&self, id: &str, payload: &Payload) -> Result<T, DomainError> {
        if payload.is_empty() {
            return self.require(id);
        }
        let generation = self.generation();
        let raw = self.api.patch(&T::RESOURCE.item_path(id), payload).await?;
        let entity = Self::decode::<T>(&raw)?;
        self.merge(entity.clone(), generation).await;
        Ok(entity)
    }

    async fn remove<T: StoredEntity>(&self, id: &str) -> Result<(), DomainError> {
        let generation = self.generation();
        self.api.delete(&T::RESOURCE.item_path(id)).await?;
        let update = {
            let mut state = self.state();
            if state.generation != generation {
                debug!(kind = T::KIND, id, "dropping deletion after reset");
                return Ok(());
            }
            remove_by_id(T::collection_mut(&mut state.data), id);
            T::cache_update(&state.data)
        };
        if let Some(update) = update {
            self.mirror(&update).await;
        }
        Ok(())
    }

    /// Create a directorate.
    pub async fn add_directorate(
        &self,
        input: &NewDirectorate,
    ) -> Result<Directorate, DomainError> {
        self.create(&input.to_payload()).await
    }

    /// Apply a partial update to a directorate.
    pub async fn update_directorate(
        &self,
        id: &str,
        patch: &DirectoratePatch,
    ) -> Result<Directorate, DomainError> {
        self.patch(id, &patch.to_payload()).await
    }

    /// Deactivate a directorate. The record stays in the store.
    pub async fn delete_directorate(&self, id: &str) -> Result<Directorate, DomainError> {
        self.patch(id, &soft_delete_payload()).await
    }

    /// Create a division.
    pub async fn add_division(&self, input: &NewDivision) -> Result<Division, DomainError> {
        self.create(&input.to_payload()).await
    }

    /// Apply a partial update to a division.
    pub async fn update_division(
        &self,
        id: &str,
        patch: &DivisionPatch,
    ) -> Result<Division, DomainError> {
        self.patch(id, &patch.to_payload()).await
    }

    /// Deactivate a division. The record stays in the store.
    pub async fn delete_division(&self, id: &str) -> Result<Division, DomainError> {
        self.patch(id, &soft_delete_payload()).await
    }

    /// Create a department.
    pub async fn add_department(&self, input: &NewDepartment) -> Result<Department, DomainError> {
        self.create(&input.to_payload()).await
    }

    /// Apply a partial update to a department.
    pub async fn update_department(
        &self,
        id: &str,
        patch: &DepartmentPatch,
    ) -> Result<Department, DomainError> {
        self.patch(id, &patch.to_payload()).await
    }

    /// Deactivate a department. The record stays in the store.
    pub async fn delete_department(&self, id: &str) -> Result<Department, DomainError> {
        self.patch(id, &soft_delete_payload()).await
    }

    /// Provision a user.
    pub async fn add_user(&self, input: &NewUser) -> Result<User, DomainError> {
        self.create(&input.to_payload()).await
    }

    /// Apply a partial update to a user known to the store.
    ///
    /// # Errors
    ///
    /// Returns [`crate::domain::ErrorCode::NotFound`] without calling the
    /// backend when `id` is not in the store.
    pub async fn update_user(&self, id: &str, patch: &UserPatch) -> Result<User, DomainError> {
        self.require::<User>(id)?;
        self.patch(id, &patch.to_payload()).await
    }

    /// Create a role.
    pub async fn add_role(&self, input: &NewRole) -> Result<Role, DomainError> {
        self.create(&input.to_payload()).await
    }

    /// Apply a partial update to a role.
    pub async fn update_role(&self, id: &str, patch: &RolePatch) -> Result<Role, DomainError> {
        self.patch(id, &patch.to_payload()).await
    }

    /// Delete a role on the backend and drop it from the store.
    pub async fn delete_role(&self, id: &str) -> Result<(), DomainError> {
        self.remove::<Role>(id).await
    }

    /// Create an assistant assignment.
    pub async fn add_assignment(
        &self,
        input: &NewAssignment,
    ) -> Result<AssistantAssignment, DomainError> {
        self.create(&input.to_payload()).await
    }

    /// Apply a partial update to an assignment known to the store.
    ///
    /// # Errors
    ///
    /// Returns [`crate::domain::ErrorCode::NotFound`] without calling the
    /// backend when `id` is not in the store.
    pub async fn update_assignment(
        &self,
        id: &str,
        patch: &AssignmentPatch,
    ) -> Result<AssistantAssignment, DomainError> {
        self.require::<AssistantAssignment>(id)?;
        self.patch(id, &patch.to_payload()).await
    }

    /// Delete an assignment on the backend and drop it from the store.
    pub async fn delete_assignment(&self, id: &str) -> Result<(), DomainError> {
        self.remove::<AssistantAssignment>(id).await
    }

    /// Move every user holding role `old_name` to `new_name`.
    ///
    /// Users are patched one at a time; the first failure stops the rename and
    /// is returned, leaving already-patched users updated.
    pub async fn rename_role_for_users(
        &self,
        old_name: &str,
        new_name: &str,
    ) -> Result<usize, DomainError> {
        if old_name == new_name {
            return Ok(0);
        }
        let holders = self
            .state()
            .data
            .users
            .iter()
            .filter(|user| user.role_name == old_name)
            .map(|user| user.id.clone())
            .collect::<Vec<_>>();

        let patch = UserPatch {
            role_name: Some(new_name.to_owned()),
            ..UserPatch::default()
        };
        for id in &holders {
            self.update_user(id, &patch).await?;
        }
        Ok(holders.len())
    }
}
