//! Portal user as reconciled by the store.

use serde::{Deserialize, Serialize};

use super::organization::{Identified, Named};

/// Portal user.
///
/// ## Invariants
/// - `role_name` is never an identifier-shaped string; unresolved roles are
///   empty.
/// - `name` is never empty; it falls back to the username, then `"User"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Backend identifier.
    pub id: String,
    /// Login name, when the backend exposes one.
    pub username: Option<String>,
    /// Display name.
    pub name: String,
    /// Email address; may be empty for system accounts.
    pub email: String,
    /// HR employee number.
    pub employee_id: String,
    /// Grade level label.
    pub grade_level: String,
    /// Resolved role name, empty when unknown.
    pub role_name: String,
    /// Directorate membership.
    pub directorate_id: Option<String>,
    /// Division membership.
    pub division_id: Option<String>,
    /// Department membership.
    pub department_id: Option<String>,
    /// Whether the account may sign in.
    pub is_active: bool,
    /// Whether the account is a superuser.
    pub is_superuser: bool,
}

impl Identified for User {
    fn id(&self) -> &str {
        self.id.as_str()
    }
}

impl Named for User {
    fn name(&self) -> &str {
        self.name.as_str()
    }
}
