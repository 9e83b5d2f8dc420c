//! Organization domain: entities, wire mapping, reconciliation and the store.
//!
//! Purpose: Normalize backend records into strongly typed entities and keep
//! them synchronized through the [`OrganizationStore`]. Nothing here knows
//! about HTTP or the cache medium; those sit behind the traits in [`ports`].
//!
//! Public surface:
//! - Entities (`Directorate`, `Division`, `Department`, `User`, `Role`,
//!   `AssistantAssignment`) and their create/patch inputs.
//! - Mappers (`map_*`, `normalize_id`, `unwrap_list`) and the user
//!   de-duplication engine (`dedupe_users`).
//! - `OrganizationStore` with its sync phase and refresh outcome.
//! - `DomainError` / `ErrorCode`: stable error vocabulary for store operations.

pub mod error;
pub mod ports;

mod assignment;
mod dedup;
mod mapping;
mod organization;
mod payload;
mod session;
mod sorting;
mod store;
mod user;

pub use self::assignment::{AssignmentType, AssistantAssignment, CapabilityFlags, Permission};
pub use self::dedup::{
    PLACEHOLDER_USERNAME_PREFIX, SYSTEM_SEED_USERNAMES, dedup_key, dedupe_users, detail_score,
    is_canonical,
};
pub use self::error::{DomainError, ErrorCode};
pub use self::mapping::{
    map_all, map_assignment, map_department, map_directorate, map_division, map_role, map_user,
    normalize_id, sanitize_role_name, unwrap_list,
};
pub use self::organization::{Department, Directorate, Division, Identified, Named, Role};
pub use self::payload::{
    AssignmentPatch, DepartmentPatch, DirectoratePatch, DivisionPatch, NewAssignment,
    NewDepartment, NewDirectorate, NewDivision, NewRole, NewUser, Payload, RolePatch, UserPatch,
};
pub use self::session::{SessionSnapshot, SyncPhase};
pub use self::store::{OrganizationData, OrganizationStore, RefreshOutcome};
pub use self::user::User;
