//! Assistant assignments (delegations) from an executive to an assistant.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::organization::Identified;

/// Delegation type derived from the granted permissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssignmentType {
    /// Technical assistant: may approve on the principal's behalf.
    #[serde(rename = "TA")]
    Technical,
    /// Personal assistant: no approval capability.
    #[serde(rename = "PA")]
    Personal,
}

impl AssignmentType {
    /// Derive the type from the approval capability.
    pub fn from_approval(can_approve: bool) -> Self {
        if can_approve {
            Self::Technical
        } else {
            Self::Personal
        }
    }

    /// Wire tag (`TA` or `PA`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Technical => "TA",
            Self::Personal => "PA",
        }
    }
}

/// Capability granted to an assistant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    /// Read-only access; the default when nothing else is granted.
    View,
    /// May write minutes.
    Minute,
    /// May forward correspondence.
    Forward,
    /// May approve.
    Approve,
}

/// Delegation of acting authority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantAssignment {
    /// Backend identifier.
    pub id: String,
    /// User id of the principal.
    pub executive_id: String,
    /// User id of the assistant.
    pub assistant_id: String,
    /// `TA` when approval capable, else `PA`.
    #[serde(rename = "type")]
    pub assignment_type: AssignmentType,
    /// Granted capabilities, never empty.
    pub permissions: Vec<Permission>,
    /// Whether the delegation is currently in force.
    pub is_active: bool,
    /// First day the delegation applies.
    pub starts_at: Option<NaiveDate>,
    /// Last day the delegation applies.
    pub ends_at: Option<NaiveDate>,
}

impl AssistantAssignment {
    /// Whether the assignment carries `permission`.
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }
}

impl Identified for AssistantAssignment {
    fn id(&self) -> &str {
        self.id.as_str()
    }
}

/// Capability flags as the delegation endpoint stores them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CapabilityFlags {
    /// `can_approve`.
    pub approve: bool,
    /// `can_minute`.
    pub minute: bool,
    /// `can_forward`.
    pub forward: bool,
}

impl CapabilityFlags {
    /// Derive flags from a type tag and a permission list.
    ///
    /// Approval is granted by either a `TA` type or an explicit `approve`
    /// permission, so either representation can drive the other.
    ///
    /// # Examples
    /// ```
    /// use org_sync::domain::{AssignmentType, CapabilityFlags, Permission};
    ///
    /// let flags = CapabilityFlags::derive(Some(AssignmentType::Technical), &[Permission::Minute]);
    /// assert!(flags.approve && flags.minute && !flags.forward);
    /// ```
    pub fn derive(assignment_type: Option<AssignmentType>, permissions: &[Permission]) -> Self {
        Self {
            approve: assignment_type == Some(AssignmentType::Technical)
                || permissions.contains(&Permission::Approve),
            minute: permissions.contains(&Permission::Minute),
            forward: permissions.contains(&Permission::Forward),
        }
    }

    /// Permission tags in `minute`, `forward`, `approve` order, or `[view]`
    /// when nothing is granted.
    pub fn permissions(self) -> Vec<Permission> {
        let granted = [
            (self.minute, Permission::Minute),
            (self.forward, Permission::Forward),
            (self.approve, Permission::Approve),
        ]
        .into_iter()
        .filter_map(|(set, permission)| set.then_some(permission))
        .collect::<Vec<_>>();
        if granted.is_empty() {
            vec![Permission::View]
        } else {
            granted
        }
    }
}
