//! Per-entity wiring: backend resource paths, mappers, and owning collection.

use serde_json::Value;

use super::OrganizationData;
use crate::domain::ports::OrganizationCacheUpdate;
use crate::domain::sorting::sort_by_name;
use crate::domain::{
    AssistantAssignment, Department, Directorate, Division, Identified, Role, User, map_assignment,
    map_department, map_directorate, map_division, map_role, map_user,
};

/// A backend collection endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Resource {
    base: &'static str,
    list_query: &'static str,
}

impl Resource {
    const fn new(base: &'static str, list_query: &'static str) -> Self {
        Self { base, list_query }
    }

    /// Path used for the bulk fetch.
    pub(crate) fn list_path(self) -> String {
        format!("{}{}", self.base, self.list_query)
    }

    /// Path used for POST.
    pub(crate) fn collection_path(self) -> String {
        self.base.to_owned()
    }

    /// Path used for PATCH and DELETE.
    pub(crate) fn item_path(self, id: &str) -> String {
        format!("{}{id}/", self.base)
    }
}

pub(crate) const USERS: Resource = Resource::new("/accounts/users/", "");
pub(crate) const DIRECTORATES: Resource =
    Resource::new("/organization/directorates/", "?ordering=name");
pub(crate) const DIVISIONS: Resource = Resource::new("/organization/divisions/", "?ordering=name");
pub(crate) const DEPARTMENTS: Resource =
    Resource::new("/organization/departments/", "?ordering=name");
pub(crate) const ROLES: Resource = Resource::new("/organization/roles/", "?ordering=name");
pub(crate) const DELEGATIONS: Resource = Resource::new("/correspondence/delegations/", "");

/// An entity held in one of the store collections.
pub(crate) trait StoredEntity: Identified + Clone + Send + 'static {
    /// Label used in log fields and error messages.
    const KIND: &'static str;
    /// Backend endpoint.
    const RESOURCE: Resource;

    fn map(raw: &Value) -> Option<Self>;

    fn collection(data: &OrganizationData) -> &Vec<Self>;

    fn collection_mut(data: &mut OrganizationData) -> &mut Vec<Self>;

    /// Restore the collection ordering after a merge.
    fn restore_order(_items: &mut [Self]) {}

    /// Cache mirror update after this collection changed; `None` when the
    /// collection is not mirrored.
    fn cache_update(_data: &OrganizationData) -> Option<OrganizationCacheUpdate> {
        None
    }
}

macro_rules! stored_entity {
    ($ty:ty, $kind:literal, $resource:expr, $mapper:path, $field:ident { $($extra:tt)* }) => {
        impl StoredEntity for $ty {
            const KIND: &'static str = $kind;
            const RESOURCE: Resource = $resource;

            fn map(raw: &Value) -> Option<Self> {
                $mapper(raw)
            }

            fn collection(data: &OrganizationData) -> &Vec<Self> {
                &data.$field
            }

            fn collection_mut(data: &mut OrganizationData) -> &mut Vec<Self> {
                &mut data.$field
            }

            $($extra)*
        }
    };
}

macro_rules! mirrored_entity {
    ($ty:ty, $kind:literal, $resource:expr, $mapper:path, $field:ident) => {
        stored_entity!($ty, $kind, $resource, $mapper, $field {
            fn restore_order(items: &mut [Self]) {
                sort_by_name(items);
            }

            fn cache_update(data: &OrganizationData) -> Option<OrganizationCacheUpdate> {
                Some(OrganizationCacheUpdate {
                    $field: Some(data.$field.clone()),
                    ..OrganizationCacheUpdate::default()
                })
            }
        });
    };
}

mirrored_entity!(Directorate, "directorate", DIRECTORATES, map_directorate, directorates);
mirrored_entity!(Division, "division", DIVISIONS, map_division, divisions);
mirrored_entity!(Department, "department", DEPARTMENTS, map_department, departments);
mirrored_entity!(User, "user", USERS, map_user, users);
stored_entity!(Role, "role", ROLES, map_role, roles {
    fn restore_order(items: &mut [Self]) {
        sort_by_name(items);
    }
});
stored_entity!(AssistantAssignment, "assignment", DELEGATIONS, map_assignment, assignments {});
