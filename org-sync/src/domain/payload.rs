//! Create and update inputs, and the snake_case request bodies built from them.
//!
//! Only fields the caller set are serialised. Optional references in patches
//! are `Option<Option<String>>`: `None` leaves the field untouched,
//! `Some(None)` clears it (sent as JSON `null`).

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Map, Value};

use super::{AssignmentType, CapabilityFlags, Permission};

/// JSON object body sent to the backend.
pub type Payload = Map<String, Value>;

fn to_payload<T: Serialize>(body: &T) -> Payload {
    match serde_json::to_value(body) {
        Ok(Value::Object(fields)) => fields,
        _ => Payload::new(),
    }
}

/// Input for creating a directorate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewDirectorate {
    /// Display name.
    pub name: String,
    /// Short code; the backend or mapper fills one in when absent.
    pub code: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
    /// Executive director user id.
    pub executive_director_id: Option<String>,
    /// Initial active flag.
    pub is_active: Option<bool>,
}

/// Partial update of a directorate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoratePatch {
    /// New display name.
    pub name: Option<String>,
    /// New code.
    pub code: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New executive director; `Some(None)` clears it.
    pub executive_director_id: Option<Option<String>>,
    /// New active flag.
    pub is_active: Option<bool>,
}

#[derive(Serialize)]
struct DirectorateBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    executive_director: Option<Option<&'a str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_active: Option<bool>,
}

impl NewDirectorate {
    /// Build the POST body.
    pub fn to_payload(&self) -> Payload {
        to_payload(&DirectorateBody {
            name: Some(self.name.as_str()),
            code: self.code.as_deref(),
            description: self.description.as_deref(),
            executive_director: self.executive_director_id.as_deref().map(Some),
            is_active: self.is_active,
        })
    }
}

impl DirectoratePatch {
    /// Build the PATCH body; empty when nothing is set.
    pub fn to_payload(&self) -> Payload {
        to_payload(&DirectorateBody {
            name: self.name.as_deref(),
            code: self.code.as_deref(),
            description: self.description.as_deref(),
            executive_director: self.executive_director_id.as_ref().map(Option::as_deref),
            is_active: self.is_active,
        })
    }
}

/// Input for creating a division.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewDivision {
    /// Display name.
    pub name: String,
    /// Short code.
    pub code: Option<String>,
    /// Parent directorate id.
    pub directorate_id: String,
    /// General manager user id.
    pub general_manager_id: Option<String>,
    /// Initial active flag.
    pub is_active: Option<bool>,
}

/// Partial update of a division.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DivisionPatch {
    /// New display name.
    pub name: Option<String>,
    /// New code.
    pub code: Option<String>,
    /// Move to another directorate.
    pub directorate_id: Option<String>,
    /// New general manager; `Some(None)` clears it.
    pub general_manager_id: Option<Option<String>>,
    /// New active flag.
    pub is_active: Option<bool>,
}

#[derive(Serialize)]
struct DivisionBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    directorate: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    general_manager: Option<Option<&'a str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_active: Option<bool>,
}

impl NewDivision {
    /// Build the POST body.
    pub fn to_payload(&self) -> Payload {
        to_payload(&DivisionBody {
            name: Some(self.name.as_str()),
            code: self.code.as_deref(),
            directorate: Some(self.directorate_id.as_str()),
            general_manager: self.general_manager_id.as_deref().map(Some),
            is_active: self.is_active,
        })
    }
}

impl DivisionPatch {
    /// Build the PATCH body; empty when nothing is set.
    pub fn to_payload(&self) -> Payload {
        to_payload(&DivisionBody {
            name: self.name.as_deref(),
            code: self.code.as_deref(),
            directorate: self.directorate_id.as_deref(),
            general_manager: self.general_manager_id.as_ref().map(Option::as_deref),
            is_active: self.is_active,
        })
    }
}

/// Input for creating a department.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewDepartment {
    /// Display name.
    pub name: String,
    /// Short code.
    pub code: Option<String>,
    /// Parent division id.
    pub division_id: String,
    /// Head of department user id.
    pub head_id: Option<String>,
    /// Initial active flag.
    pub is_active: Option<bool>,
}

/// Partial update of a department.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepartmentPatch {
    /// New display name.
    pub name: Option<String>,
    /// New code.
    pub code: Option<String>,
    /// Move to another division.
    pub division_id: Option<String>,
    /// New head of department; `Some(None)` clears it.
    pub head_id: Option<Option<String>>,
    /// New active flag.
    pub is_active: Option<bool>,
}

#[derive(Serialize)]
struct DepartmentBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    division: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    head_of_department: Option<Option<&'a str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_active: Option<bool>,
}

impl NewDepartment {
    /// Build the POST body.
    pub fn to_payload(&self) -> Payload {
        to_payload(&DepartmentBody {
            name: Some(self.name.as_str()),
            code: self.code.as_deref(),
            division: Some(self.division_id.as_str()),
            head_of_department: self.head_id.as_deref().map(Some),
            is_active: self.is_active,
        })
    }
}

impl DepartmentPatch {
    /// Build the PATCH body; empty when nothing is set.
    pub fn to_payload(&self) -> Payload {
        to_payload(&DepartmentBody {
            name: self.name.as_deref(),
            code: self.code.as_deref(),
            division: self.division_id.as_deref(),
            head_of_department: self.head_id.as_ref().map(Option::as_deref),
            is_active: self.is_active,
        })
    }
}

/// Input for provisioning a user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewUser {
    /// Login name.
    pub username: String,
    /// Email address.
    pub email: Option<String>,
    /// Given name.
    pub first_name: Option<String>,
    /// Family name.
    pub last_name: Option<String>,
    /// HR employee number.
    pub employee_id: Option<String>,
    /// Grade level label.
    pub grade_level: Option<String>,
    /// Role name.
    pub role_name: Option<String>,
    /// Directorate membership.
    pub directorate_id: Option<String>,
    /// Division membership.
    pub division_id: Option<String>,
    /// Department membership.
    pub department_id: Option<String>,
    /// Initial active flag.
    pub is_active: Option<bool>,
    /// Superuser flag.
    pub is_superuser: Option<bool>,
}

/// Partial update of a user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    /// New email address.
    pub email: Option<String>,
    /// New given name.
    pub first_name: Option<String>,
    /// New family name.
    pub last_name: Option<String>,
    /// New employee number.
    pub employee_id: Option<String>,
    /// New grade level.
    pub grade_level: Option<String>,
    /// New role name.
    pub role_name: Option<String>,
    /// New directorate; `Some(None)` clears it.
    pub directorate_id: Option<Option<String>>,
    /// New division; `Some(None)` clears it.
    pub division_id: Option<Option<String>>,
    /// New department; `Some(None)` clears it.
    pub department_id: Option<Option<String>>,
    /// New active flag.
    pub is_active: Option<bool>,
    /// New superuser flag.
    pub is_superuser: Option<bool>,
}

#[derive(Serialize)]
struct UserBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    first_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    employee_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    grade_level: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_role: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    directorate: Option<Option<&'a str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    division: Option<Option<&'a str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    department: Option<Option<&'a str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_superuser: Option<bool>,
}

impl NewUser {
    /// Build the POST body.
    pub fn to_payload(&self) -> Payload {
        to_payload(&UserBody {
            username: Some(self.username.as_str()),
            email: self.email.as_deref(),
            first_name: self.first_name.as_deref(),
            last_name: self.last_name.as_deref(),
            employee_id: self.employee_id.as_deref(),
            grade_level: self.grade_level.as_deref(),
            system_role: self.role_name.as_deref(),
            directorate: self.directorate_id.as_deref().map(Some),
            division: self.division_id.as_deref().map(Some),
            department: self.department_id.as_deref().map(Some),
            is_active: self.is_active,
            is_superuser: self.is_superuser,
        })
    }
}

impl UserPatch {
    /// Build the PATCH body; empty when nothing is set.
    pub fn to_payload(&self) -> Payload {
        to_payload(&UserBody {
            username: None,
            email: self.email.as_deref(),
            first_name: self.first_name.as_deref(),
            last_name: self.last_name.as_deref(),
            employee_id: self.employee_id.as_deref(),
            grade_level: self.grade_level.as_deref(),
            system_role: self.role_name.as_deref(),
            directorate: self.directorate_id.as_ref().map(Option::as_deref),
            division: self.division_id.as_ref().map(Option::as_deref),
            department: self.department_id.as_ref().map(Option::as_deref),
            is_active: self.is_active,
            is_superuser: self.is_superuser,
        })
    }
}

/// Input for creating a role.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewRole {
    /// Role name.
    pub name: String,
    /// Free-text description.
    pub description: Option<String>,
    /// Initial active flag.
    pub is_active: Option<bool>,
}

/// Partial update of a role.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RolePatch {
    /// New name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New active flag.
    pub is_active: Option<bool>,
}

#[derive(Serialize)]
struct RoleBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_active: Option<bool>,
}

impl NewRole {
    /// Build the POST body.
    pub fn to_payload(&self) -> Payload {
        to_payload(&RoleBody {
            name: Some(self.name.as_str()),
            description: self.description.as_deref(),
            is_active: self.is_active,
        })
    }
}

impl RolePatch {
    /// Build the PATCH body; empty when nothing is set.
    pub fn to_payload(&self) -> Payload {
        to_payload(&RoleBody {
            name: self.name.as_deref(),
            description: self.description.as_deref(),
            is_active: self.is_active,
        })
    }
}

/// Input for creating an assistant assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAssignment {
    /// Principal user id.
    pub executive_id: String,
    /// Assistant user id.
    pub assistant_id: String,
    /// Requested type; `TA` implies approval.
    pub assignment_type: Option<AssignmentType>,
    /// Requested permissions.
    pub permissions: Vec<Permission>,
    /// Initial active flag.
    pub is_active: Option<bool>,
    /// First day of the delegation.
    pub starts_at: Option<NaiveDate>,
    /// Last day of the delegation.
    pub ends_at: Option<NaiveDate>,
}

/// Partial update of an assistant assignment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentPatch {
    /// New principal.
    pub executive_id: Option<String>,
    /// New assistant.
    pub assistant_id: Option<String>,
    /// New type.
    pub assignment_type: Option<AssignmentType>,
    /// New permission set.
    pub permissions: Option<Vec<Permission>>,
    /// New active flag.
    pub is_active: Option<bool>,
    /// New start date; `Some(None)` clears it.
    pub starts_at: Option<Option<NaiveDate>>,
    /// New end date; `Some(None)` clears it.
    pub ends_at: Option<Option<NaiveDate>>,
}

#[derive(Serialize)]
struct DelegationBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    principal_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    assistant_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    can_approve: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    can_minute: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    can_forward: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    starts_at: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ends_at: Option<Option<NaiveDate>>,
}

impl NewAssignment {
    /// Build the POST body with capability flags derived from type and
    /// permissions.
    pub fn to_payload(&self) -> Payload {
        let flags = CapabilityFlags::derive(self.assignment_type, &self.permissions);
        to_payload(&DelegationBody {
            principal_id: Some(self.executive_id.as_str()),
            assistant_id: Some(self.assistant_id.as_str()),
            can_approve: Some(flags.approve),
            can_minute: Some(flags.minute),
            can_forward: Some(flags.forward),
            active: self.is_active,
            starts_at: self.starts_at.map(Some),
            ends_at: self.ends_at.map(Some),
        })
    }
}

impl AssignmentPatch {
    /// Build the PATCH body; empty when nothing is set.
    ///
    /// A new permission list rewrites all three flags. A new type alone only
    /// rewrites `can_approve`.
    pub fn to_payload(&self) -> Payload {
        let (can_approve, can_minute, can_forward) =
            match (self.assignment_type, self.permissions.as_deref()) {
                (assignment_type, Some(permissions)) => {
                    let flags = CapabilityFlags::derive(assignment_type, permissions);
                    (Some(flags.approve), Some(flags.minute), Some(flags.forward))
                }
                (Some(assignment_type), None) => (
                    Some(assignment_type == AssignmentType::Technical),
                    None,
                    None,
                ),
                (None, None) => (None, None, None),
            };
        to_payload(&DelegationBody {
            principal_id: self.executive_id.as_deref(),
            assistant_id: self.assistant_id.as_deref(),
            can_approve,
            can_minute,
            can_forward,
            active: self.is_active,
            starts_at: self.starts_at,
            ends_at: self.ends_at,
        })
    }
}

#[cfg(test)]
mod tests {
    //! Coverage for partial payload construction.

    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn empty_patches_build_empty_payloads() {
        assert!(DirectoratePatch::default().to_payload().is_empty());
        assert!(DivisionPatch::default().to_payload().is_empty());
        assert!(DepartmentPatch::default().to_payload().is_empty());
        assert!(UserPatch::default().to_payload().is_empty());
        assert!(RolePatch::default().to_payload().is_empty());
        assert!(AssignmentPatch::default().to_payload().is_empty());
    }

    #[rstest]
    fn create_payload_omits_unset_fields() {
        let payload = NewDivision {
            name: "ICT".to_owned(),
            directorate_id: "dir-1".to_owned(),
            ..NewDivision::default()
        }
        .to_payload();
        assert_eq!(
            Value::Object(payload),
            json!({ "name": "ICT", "directorate": "dir-1" })
        );
    }

    #[rstest]
    fn cleared_reference_is_sent_as_null() {
        let payload = UserPatch {
            department_id: Some(None),
            role_name: Some("Clerk".to_owned()),
            ..UserPatch::default()
        }
        .to_payload();
        assert_eq!(
            Value::Object(payload),
            json!({ "system_role": "Clerk", "department": null })
        );
    }

    #[rstest]
    fn soft_delete_patch_only_sends_flag() {
        let payload = DepartmentPatch {
            is_active: Some(false),
            ..DepartmentPatch::default()
        }
        .to_payload();
        assert_eq!(Value::Object(payload), json!({ "is_active": false }));
    }

    #[rstest]
    fn assignment_payload_derives_flags_from_type() {
        let payload = NewAssignment {
            executive_id: "u-md".to_owned(),
            assistant_id: "u-ta".to_owned(),
            assignment_type: Some(AssignmentType::Technical),
            permissions: vec![Permission::View, Permission::Forward],
            is_active: None,
            starts_at: None,
            ends_at: None,
        }
        .to_payload();
        assert_eq!(
            Value::Object(payload),
            json!({
                "principal_id": "u-md",
                "assistant_id": "u-ta",
                "can_approve": true,
                "can_minute": false,
                "can_forward": true
            })
        );
    }

    #[rstest]
    #[case::to_personal(AssignmentType::Personal, false)]
    #[case::to_technical(AssignmentType::Technical, true)]
    fn type_only_patch_rewrites_approval(
        #[case] assignment_type: AssignmentType,
        #[case] approve: bool,
    ) {
        let payload = AssignmentPatch {
            assignment_type: Some(assignment_type),
            ..AssignmentPatch::default()
        }
        .to_payload();
        assert_eq!(Value::Object(payload), json!({ "can_approve": approve }));
    }

    #[rstest]
    fn permission_patch_rewrites_all_flags() {
        let payload = AssignmentPatch {
            permissions: Some(vec![Permission::Approve, Permission::Minute]),
            ..AssignmentPatch::default()
        }
        .to_payload();
        assert_eq!(
            Value::Object(payload),
            json!({ "can_approve": true, "can_minute": true, "can_forward": false })
        );
    }
}
