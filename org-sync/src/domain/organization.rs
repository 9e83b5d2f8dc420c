//! Organizational hierarchy entities: directorates, divisions, departments
//! and roles.
//!
//! These are the normalized shapes held by the store. Serialisation uses
//! camelCase so cached snapshots match what consumers of the store read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Entity addressable by a backend identifier.
pub trait Identified {
    /// Backend identifier.
    fn id(&self) -> &str;
}

/// Entity ordered by its display name inside store collections.
pub trait Named {
    /// Display name used for ordering.
    fn name(&self) -> &str;
}

macro_rules! impl_entity {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Identified for $ty {
                fn id(&self) -> &str {
                    self.id.as_str()
                }
            }

            impl Named for $ty {
                fn name(&self) -> &str {
                    self.name.as_str()
                }
            }
        )*
    };
}

impl_entity!(Directorate, Division, Department, Role);

/// Top level of the organizational hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Directorate {
    /// Backend identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Short code, `DIR-XXXXXX` when the backend omits one.
    pub code: String,
    /// Free-text description.
    pub description: String,
    /// User id of the executive director, if assigned.
    pub executive_director_id: Option<String>,
    /// `false` once soft deleted.
    pub is_active: bool,
}

/// Second level of the hierarchy; always belongs to a directorate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Division {
    /// Backend identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Short code, `DIV-XXXXXX` when the backend omits one.
    pub code: String,
    /// Parent directorate id.
    pub directorate_id: String,
    /// User id of the general manager, if assigned.
    pub general_manager_id: Option<String>,
    /// `false` once soft deleted.
    pub is_active: bool,
}

/// Third level of the hierarchy; always belongs to a division.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    /// Backend identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Short code, `DEPT-XXXXXX` when the backend omits one.
    pub code: String,
    /// Parent division id.
    pub division_id: String,
    /// Directorate of the parent division when the backend reports it.
    pub directorate_id: Option<String>,
    /// User id of the head of department, if assigned.
    pub head_id: Option<String>,
    /// `false` once soft deleted.
    pub is_active: bool,
}

/// Named role that users can hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    /// Backend identifier.
    pub id: String,
    /// Role name, unique per backend.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Whether the role can still be assigned.
    pub is_active: bool,
    /// Number of users currently holding the role.
    pub user_count: u64,
    /// Creation time reported by the backend.
    pub created_at: Option<DateTime<Utc>>,
    /// Last update time reported by the backend.
    pub updated_at: Option<DateTime<Utc>>,
}
