//! Mapping from backend wire records to normalized domain entities.
//!
//! Records are decoded through the lenient schemas in `records`, then every
//! field gets its fallback here. Mapping never fails on field content: a
//! record is only dropped when it is not a JSON object or carries no id.

mod records;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use self::records::{
    DelegationRecord, DepartmentRecord, DirectorateRecord, DivisionRecord, RoleRecord, UserRecord,
};
use super::{
    AssignmentType, AssistantAssignment, CapabilityFlags, Department, Directorate, Division, Role,
    User,
};

const FALLBACK_DISPLAY_NAME: &str = "User";
const FALLBACK_CODE_LEN: usize = 6;
const IDENTIFIER_MIN_LEN: usize = 30;

/// Resolve a foreign-key value into a string id.
///
/// Accepts bare strings and numbers, or an object carrying `id` (preferred)
/// or `pk`. Only one level of object nesting is unwrapped.
///
/// # Examples
/// ```
/// use org_sync::domain::normalize_id;
/// use serde_json::json;
///
/// assert_eq!(normalize_id(&json!({ "pk": "abc" })).as_deref(), Some("abc"));
/// assert_eq!(normalize_id(&json!(42)).as_deref(), Some("42"));
/// assert_eq!(normalize_id(&json!(null)), None);
/// ```
pub fn normalize_id(value: &Value) -> Option<String> {
    normalize_at_depth(value, 0)
}

fn normalize_at_depth(value: &Value, depth: u8) -> Option<String> {
    match value {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        Value::Object(fields) if depth == 0 => ["id", "pk"]
            .into_iter()
            .filter_map(|key| fields.get(key))
            .find_map(|inner| normalize_at_depth(inner, depth + 1)),
        _ => None,
    }
}

/// Blank a role name that looks like a raw identifier.
///
/// A name is identifier-shaped when it contains a hyphen and is longer than
/// 30 characters, which covers UUID primary keys leaking through the API.
pub fn sanitize_role_name(name: &str) -> String {
    if name.contains('-') && name.chars().count() > IDENTIFIER_MIN_LEN {
        String::new()
    } else {
        name.to_owned()
    }
}

/// Unwrap a list response that is either a bare array or a paginated
/// envelope with a `results` array.
pub fn unwrap_list(payload: Value) -> Vec<Value> {
    match payload {
        Value::Array(items) => items,
        Value::Object(mut envelope) => match envelope.remove("results") {
            Some(Value::Array(items)) => items,
            _ => {
                warn!("list response envelope has no results array");
                Vec::new()
            }
        },
        Value::Null => Vec::new(),
        _ => {
            warn!("list response is neither an array nor an envelope");
            Vec::new()
        }
    }
}

/// Map every record of a list, dropping the ones that cannot be mapped.
pub fn map_all<T>(records: &[Value], mapper: fn(&Value) -> Option<T>) -> Vec<T> {
    records.iter().filter_map(mapper).collect()
}

fn decode<T: DeserializeOwned>(raw: &Value, kind: &'static str) -> Option<T> {
    match T::deserialize(raw) {
        Ok(record) => Some(record),
        Err(error) => {
            warn!(kind, %error, "skipping undecodable record");
            None
        }
    }
}

fn require_id(id: Option<String>, kind: &'static str) -> Option<String> {
    if id.is_none() {
        warn!(kind, "skipping record without id");
    }
    id
}

fn fallback_code(prefix: &str, id: &str) -> String {
    let head = id.chars().take(FALLBACK_CODE_LEN).collect::<String>();
    format!("{prefix}-{}", head.to_uppercase())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

/// Map a user record.
pub fn map_user(raw: &Value) -> Option<User> {
    let record: UserRecord = decode(raw, "user")?;
    let id = require_id(record.id.clone(), "user")?;
    let role_name = resolve_role_name(&record);
    let name = display_name(&record);
    let UserRecord {
        username,
        email,
        employee_id,
        grade_level,
        directorate,
        division,
        department,
        is_active,
        is_superuser,
        ..
    } = record;

    Some(User {
        id,
        username: non_empty(username),
        name,
        email: email.unwrap_or_default(),
        employee_id: employee_id.unwrap_or_default(),
        grade_level: grade_level.unwrap_or_default(),
        role_name,
        directorate_id: directorate,
        division_id: division,
        department_id: department,
        is_active: is_active.unwrap_or(true),
        is_superuser: is_superuser.unwrap_or(false),
    })
}

fn display_name(record: &UserRecord) -> String {
    let full = format!(
        "{} {}",
        record.first_name.as_deref().unwrap_or_default().trim(),
        record.last_name.as_deref().unwrap_or_default().trim(),
    );
    let full = full.trim();
    if !full.is_empty() {
        return full.to_owned();
    }
    non_empty(record.username.clone()).unwrap_or_else(|| FALLBACK_DISPLAY_NAME.to_owned())
}

fn resolve_role_name(record: &UserRecord) -> String {
    let nested = |value: &Value| {
        value
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_owned)
    };
    let bare = |value: &Value| value.as_str().map(str::to_owned);

    let resolved = non_empty(record.system_role_name.clone())
        .or_else(|| non_empty(record.role_name.clone()))
        .or_else(|| non_empty(nested(&record.system_role)))
        .or_else(|| non_empty(nested(&record.role)))
        .or_else(|| non_empty(bare(&record.system_role)))
        .or_else(|| non_empty(bare(&record.role)))
        .unwrap_or_default();
    sanitize_role_name(&resolved)
}

/// Map a directorate record.
pub fn map_directorate(raw: &Value) -> Option<Directorate> {
    let record: DirectorateRecord = decode(raw, "directorate")?;
    let id = require_id(record.id, "directorate")?;
    Some(Directorate {
        code: non_empty(record.code).unwrap_or_else(|| fallback_code("DIR", &id)),
        name: record.name.unwrap_or_default(),
        description: record.description.unwrap_or_default(),
        executive_director_id: record.executive_director,
        is_active: record.is_active.unwrap_or(true),
        id,
    })
}

/// Map a division record.
pub fn map_division(raw: &Value) -> Option<Division> {
    let record: DivisionRecord = decode(raw, "division")?;
    let id = require_id(record.id, "division")?;
    Some(Division {
        code: non_empty(record.code).unwrap_or_else(|| fallback_code("DIV", &id)),
        name: record.name.unwrap_or_default(),
        directorate_id: record.directorate.unwrap_or_default(),
        general_manager_id: record.general_manager,
        is_active: record.is_active.unwrap_or(true),
        id,
    })
}

/// Map a department record.
pub fn map_department(raw: &Value) -> Option<Department> {
    let record: DepartmentRecord = decode(raw, "department")?;
    let id = require_id(record.id, "department")?;
    Some(Department {
        code: non_empty(record.code).unwrap_or_else(|| fallback_code("DEPT", &id)),
        name: record.name.unwrap_or_default(),
        division_id: record.division.unwrap_or_default(),
        directorate_id: record.directorate,
        head_id: record.head_of_department,
        is_active: record.is_active.unwrap_or(true),
        id,
    })
}

/// Map a role record.
pub fn map_role(raw: &Value) -> Option<Role> {
    let record: RoleRecord = decode(raw, "role")?;
    let id = require_id(record.id, "role")?;
    Some(Role {
        id,
        name: record.name.unwrap_or_default(),
        description: record.description.unwrap_or_default(),
        is_active: record.is_active.unwrap_or(true),
        user_count: record.user_count.unwrap_or(0),
        created_at: record.created_at,
        updated_at: record.updated_at,
    })
}

/// Map a delegation record into an assistant assignment.
pub fn map_assignment(raw: &Value) -> Option<AssistantAssignment> {
    let record: DelegationRecord = decode(raw, "delegation")?;
    let id = require_id(record.id, "delegation")?;
    let flags = CapabilityFlags {
        approve: record.can_approve.unwrap_or(false),
        minute: record.can_minute.unwrap_or(false),
        forward: record.can_forward.unwrap_or(false),
    };
    Some(AssistantAssignment {
        id,
        executive_id: record
            .principal
            .or(record.principal_id)
            .unwrap_or_default(),
        assistant_id: record
            .assistant
            .or(record.assistant_id)
            .unwrap_or_default(),
        assignment_type: AssignmentType::from_approval(flags.approve),
        permissions: flags.permissions(),
        is_active: record.active.unwrap_or(true),
        starts_at: record.starts_at,
        ends_at: record.ends_at,
    })
}
