//! Wire schemas for backend records.
//!
//! Every field is optional and decoded leniently: a value of the wrong JSON
//! type decodes as absent instead of failing the record. Field fallbacks are
//! applied by the mappers, not here.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::normalize_id;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct UserRecord {
    #[serde(deserialize_with = "wire_id")]
    pub(super) id: Option<String>,
    #[serde(deserialize_with = "text")]
    pub(super) username: Option<String>,
    #[serde(deserialize_with = "text")]
    pub(super) first_name: Option<String>,
    #[serde(deserialize_with = "text")]
    pub(super) last_name: Option<String>,
    #[serde(deserialize_with = "text")]
    pub(super) email: Option<String>,
    #[serde(deserialize_with = "text")]
    pub(super) employee_id: Option<String>,
    #[serde(deserialize_with = "text")]
    pub(super) grade_level: Option<String>,
    #[serde(deserialize_with = "text")]
    pub(super) system_role_name: Option<String>,
    #[serde(deserialize_with = "text")]
    pub(super) role_name: Option<String>,
    pub(super) system_role: Value,
    pub(super) role: Value,
    #[serde(deserialize_with = "wire_id")]
    pub(super) directorate: Option<String>,
    #[serde(deserialize_with = "wire_id")]
    pub(super) division: Option<String>,
    #[serde(deserialize_with = "wire_id")]
    pub(super) department: Option<String>,
    #[serde(deserialize_with = "flag")]
    pub(super) is_active: Option<bool>,
    #[serde(deserialize_with = "flag")]
    pub(super) is_superuser: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct DirectorateRecord {
    #[serde(deserialize_with = "wire_id")]
    pub(super) id: Option<String>,
    #[serde(deserialize_with = "text")]
    pub(super) name: Option<String>,
    #[serde(deserialize_with = "text")]
    pub(super) code: Option<String>,
    #[serde(deserialize_with = "text")]
    pub(super) description: Option<String>,
    #[serde(deserialize_with = "wire_id")]
    pub(super) executive_director: Option<String>,
    #[serde(deserialize_with = "flag")]
    pub(super) is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct DivisionRecord {
    #[serde(deserialize_with = "wire_id")]
    pub(super) id: Option<String>,
    #[serde(deserialize_with = "text")]
    pub(super) name: Option<String>,
    #[serde(deserialize_with = "text")]
    pub(super) code: Option<String>,
    #[serde(deserialize_with = "wire_id")]
    pub(super) directorate: Option<String>,
    #[serde(deserialize_with = "wire_id")]
    pub(super) general_manager: Option<String>,
    #[serde(deserialize_with = "flag")]
    pub(super) is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct DepartmentRecord {
    #[serde(deserialize_with = "wire_id")]
    pub(super) id: Option<String>,
    #[serde(deserialize_with = "text")]
    pub(super) name: Option<String>,
    #[serde(deserialize_with = "text")]
    pub(super) code: Option<String>,
    #[serde(deserialize_with = "wire_id")]
    pub(super) division: Option<String>,
    #[serde(deserialize_with = "wire_id")]
    pub(super) directorate: Option<String>,
    #[serde(deserialize_with = "wire_id")]
    pub(super) head_of_department: Option<String>,
    #[serde(deserialize_with = "flag")]
    pub(super) is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct RoleRecord {
    #[serde(deserialize_with = "wire_id")]
    pub(super) id: Option<String>,
    #[serde(deserialize_with = "text")]
    pub(super) name: Option<String>,
    #[serde(deserialize_with = "text")]
    pub(super) description: Option<String>,
    #[serde(deserialize_with = "flag")]
    pub(super) is_active: Option<bool>,
    #[serde(deserialize_with = "count")]
    pub(super) user_count: Option<u64>,
    #[serde(deserialize_with = "timestamp")]
    pub(super) created_at: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "timestamp")]
    pub(super) updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct DelegationRecord {
    #[serde(deserialize_with = "wire_id")]
    pub(super) id: Option<String>,
    #[serde(deserialize_with = "wire_id")]
    pub(super) principal: Option<String>,
    #[serde(deserialize_with = "wire_id")]
    pub(super) principal_id: Option<String>,
    #[serde(deserialize_with = "wire_id")]
    pub(super) assistant: Option<String>,
    #[serde(deserialize_with = "wire_id")]
    pub(super) assistant_id: Option<String>,
    #[serde(deserialize_with = "flag")]
    pub(super) can_approve: Option<bool>,
    #[serde(deserialize_with = "flag")]
    pub(super) can_minute: Option<bool>,
    #[serde(deserialize_with = "flag")]
    pub(super) can_forward: Option<bool>,
    #[serde(deserialize_with = "flag")]
    pub(super) active: Option<bool>,
    #[serde(deserialize_with = "date")]
    pub(super) starts_at: Option<NaiveDate>,
    #[serde(deserialize_with = "date")]
    pub(super) ends_at: Option<NaiveDate>,
}

fn wire_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(normalize_id(&Value::deserialize(deserializer)?))
}

fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(value) => Some(value),
        Value::Number(value) => Some(value.to_string()),
        _ => None,
    })
}

fn flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Value::deserialize(deserializer)?.as_bool())
}

fn count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Value::deserialize(deserializer)?.as_u64())
}

fn timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_str()
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|parsed| parsed.with_timezone(&Utc)))
}

fn date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_str()
        .and_then(|raw| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()))
}
