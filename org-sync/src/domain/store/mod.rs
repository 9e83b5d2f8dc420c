//! Canonical in-memory organization store.
//!
//! The store owns six collections and keeps them synchronized with the
//! backend through [`OrganizationApi`]. Bulk refreshes replace every
//! collection at once; single-entity mutations merge one record back into
//! its collection. Directorates, divisions, departments and users are
//! mirrored into an [`OrganizationCache`] after every change, with cache
//! failures logged and otherwise ignored.
//!
//! Refreshes are sequenced: each takes a ticket and remembers the reset
//! generation it started in. A result is applied only when no newer refresh
//! has been applied and no reset or user switch happened in the meantime.
//! Single-entity mutations carry the generation too, so a response landing
//! after a reset is returned to the caller but never merged or mirrored.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::domain::ports::{OrganizationApi, OrganizationCache, OrganizationCacheUpdate};
use crate::domain::session::{SessionSnapshot, SyncPhase};
use crate::domain::sorting::sort_by_name;
use crate::domain::{
    AssistantAssignment, Department, Directorate, Division, DomainError, Role, User,
    dedupe_users, map_all, map_assignment, map_department, map_directorate, map_division,
    map_role, map_user, unwrap_list,
};

mod crud;
mod entity;

use entity::{DELEGATIONS, DEPARTMENTS, DIRECTORATES, DIVISIONS, ROLES, USERS};

/// Every collection held by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationData {
    /// Directorates sorted by name.
    pub directorates: Vec<Directorate>,
    /// Divisions sorted by name.
    pub divisions: Vec<Division>,
    /// Departments sorted by name.
    pub departments: Vec<Department>,
    /// De-duplicated users sorted by name.
    pub users: Vec<User>,
    /// Roles sorted by name.
    pub roles: Vec<Role>,
    /// Assistant assignments in server order.
    pub assignments: Vec<AssistantAssignment>,
}

impl OrganizationData {
    fn mirrored(&self) -> OrganizationCacheUpdate {
        OrganizationCacheUpdate {
            directorates: Some(self.directorates.clone()),
            divisions: Some(self.divisions.clone()),
            departments: Some(self.departments.clone()),
            users: Some(self.users.clone()),
        }
    }
}

/// Result of a bulk refresh attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// The session was not ready, so nothing was requested.
    Skipped,
    /// Fresh data replaced the store contents.
    Applied,
    /// Data arrived after a newer refresh or a reset and was dropped.
    Discarded,
    /// A request failed; previous contents were kept.
    Failed(DomainError),
}

#[derive(Debug, Default)]
struct StoreState {
    data: OrganizationData,
    phase: SyncPhase,
    session: SessionSnapshot,
    has_synced: bool,
    generation: u64,
    issued_ticket: u64,
    applied_ticket: u64,
    in_flight: u32,
}

impl StoreState {
    fn is_latest(&self, ticket: u64, generation: u64) -> bool {
        self.generation == generation && self.issued_ticket == ticket
    }

    /// Mark one refresh as finished and leave `Syncing` once none remain.
    fn settle(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
        if self.in_flight == 0 && self.phase == SyncPhase::Syncing {
            self.phase = if self.has_synced {
                SyncPhase::Synced
            } else {
                SyncPhase::Idle
            };
        }
    }
}

/// Organization store bound to one API client and one cache mirror.
pub struct OrganizationStore {
    api: Arc<dyn OrganizationApi>,
    cache: Arc<dyn OrganizationCache>,
    state: Mutex<StoreState>,
}

impl OrganizationStore {
    /// Create an empty store in the [`SyncPhase::Idle`] phase.
    pub fn new(api: Arc<dyn OrganizationApi>, cache: Arc<dyn OrganizationCache>) -> Self {
        Self {
            api,
            cache,
            state: Mutex::new(StoreState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current synchronization phase.
    pub fn phase(&self) -> SyncPhase {
        self.state().phase
    }

    /// Whether a bulk refresh is in flight.
    pub fn is_syncing(&self) -> bool {
        self.phase() == SyncPhase::Syncing
    }

    /// Whether a bulk refresh has been applied for the current session user.
    pub fn has_synced(&self) -> bool {
        self.state().has_synced
    }

    /// Clone of every collection.
    pub fn snapshot(&self) -> OrganizationData {
        self.state().data.clone()
    }

    /// Directorates sorted by name.
    pub fn directorates(&self) -> Vec<Directorate> {
        self.state().data.directorates.clone()
    }

    /// Divisions sorted by name.
    pub fn divisions(&self) -> Vec<Division> {
        self.state().data.divisions.clone()
    }

    /// Departments sorted by name.
    pub fn departments(&self) -> Vec<Department> {
        self.state().data.departments.clone()
    }

    /// Users sorted by name.
    pub fn users(&self) -> Vec<User> {
        self.state().data.users.clone()
    }

    /// Roles sorted by name.
    pub fn roles(&self) -> Vec<Role> {
        self.state().data.roles.clone()
    }

    /// Assistant assignments.
    pub fn assignments(&self) -> Vec<AssistantAssignment> {
        self.state().data.assignments.clone()
    }

    /// Divisions whose parent is `directorate_id`.
    pub fn divisions_in_directorate(&self, directorate_id: &str) -> Vec<Division> {
        self.state()
            .data
            .divisions
            .iter()
            .filter(|division| division.directorate_id == directorate_id)
            .cloned()
            .collect()
    }

    /// Departments whose parent is `division_id`.
    pub fn departments_in_division(&self, division_id: &str) -> Vec<Department> {
        self.state()
            .data
            .departments
            .iter()
            .filter(|department| department.division_id == division_id)
            .cloned()
            .collect()
    }

    /// Users assigned to `department_id`.
    pub fn users_in_department(&self, department_id: &str) -> Vec<User> {
        self.state()
            .data
            .users
            .iter()
            .filter(|user| user.department_id.as_deref() == Some(department_id))
            .cloned()
            .collect()
    }

    /// Record the latest session signals and refresh once per signed-in user.
    ///
    /// A change of user id clears the synced flag and invalidates any refresh
    /// still in flight for the previous user. A ready session that has not
    /// been synced triggers one refresh; otherwise the call is a no-op and
    /// returns [`RefreshOutcome::Skipped`].
    pub async fn observe_session(&self, session: SessionSnapshot) -> RefreshOutcome {
        let should_refresh = {
            let mut state = self.state();
            if state.session.user_id != session.user_id {
                debug!(user_id = ?session.user_id, "session user changed");
                state.has_synced = false;
                state.generation += 1;
                if state.phase == SyncPhase::Syncing {
                    state.phase = SyncPhase::Idle;
                }
            }
            let ready = session.is_ready();
            state.session = session;
            ready && !state.has_synced && state.phase != SyncPhase::Syncing
        };

        if should_refresh {
            self.refresh_organization_data().await
        } else {
            RefreshOutcome::Skipped
        }
    }

    /// Fetch every collection and replace the store contents.
    ///
    /// Failures are logged and reported through [`RefreshOutcome::Failed`];
    /// they never clear existing data.
    pub async fn refresh_organization_data(&self) -> RefreshOutcome {
        let (ticket, generation) = {
            let mut state = self.state();
            if !state.session.is_ready() {
                debug!("organization refresh skipped: session not ready");
                return RefreshOutcome::Skipped;
            }
            state.issued_ticket += 1;
            state.in_flight += 1;
            state.phase = SyncPhase::Syncing;
            (state.issued_ticket, state.generation)
        };

        match self.fetch_all().await {
            Ok(data) => self.apply_refresh(data, ticket, generation).await,
            Err(err) => {
                error!(ticket, error = %err, "organization refresh failed");
                let mut state = self.state();
                state.settle();
                if state.is_latest(ticket, generation) {
                    state.phase = SyncPhase::Error;
                }
                RefreshOutcome::Failed(err)
            }
        }
    }

    async fn fetch_all(&self) -> Result<OrganizationData, DomainError> {
        let users_path = USERS.list_path();
        let directorates_path = DIRECTORATES.list_path();
        let divisions_path = DIVISIONS.list_path();
        let departments_path = DEPARTMENTS.list_path();
        let delegations_path = DELEGATIONS.list_path();
        let roles_path = ROLES.list_path();

        let (users, directorates, divisions, departments, delegations, roles) = tokio::try_join!(
            self.api.get(&users_path),
            self.api.get(&directorates_path),
            self.api.get(&divisions_path),
            self.api.get(&departments_path),
            self.api.get(&delegations_path),
            self.api.get(&roles_path),
        )?;

        let mut data = OrganizationData {
            directorates: map_all(&unwrap_list(directorates), map_directorate),
            divisions: map_all(&unwrap_list(divisions), map_division),
            departments: map_all(&unwrap_list(departments), map_department),
            users: dedupe_users(map_all(&unwrap_list(users), map_user)),
            roles: map_all(&unwrap_list(roles), map_role),
            assignments: map_all(&unwrap_list(delegations), map_assignment),
        };
        sort_by_name(&mut data.directorates);
        sort_by_name(&mut data.divisions);
        sort_by_name(&mut data.departments);
        sort_by_name(&mut data.roles);
        Ok(data)
    }

    async fn apply_refresh(
        &self,
        data: OrganizationData,
        ticket: u64,
        generation: u64,
    ) -> RefreshOutcome {
        let update = {
            let mut state = self.state();
            state.settle();
            if state.generation != generation || state.applied_ticket > ticket {
                debug!(ticket, "discarding stale organization refresh");
                return RefreshOutcome::Discarded;
            }
            info!(
                ticket,
                directorates = data.directorates.len(),
                divisions = data.divisions.len(),
                departments = data.departments.len(),
                users = data.users.len(),
                roles = data.roles.len(),
                assignments = data.assignments.len(),
                "organization data refreshed"
            );
            let update = data.mirrored();
            state.data = data;
            state.applied_ticket = ticket;
            state.has_synced = true;
            if state.in_flight == 0 {
                state.phase = SyncPhase::Synced;
            }
            update
        };

        self.mirror(&update).await;
        RefreshOutcome::Applied
    }

    /// Clear every collection and the synced flag, then clear the cache.
    ///
    /// Refreshes still in flight are discarded when they complete.
    pub async fn reset_organization_data(&self) {
        {
            let mut state = self.state();
            state.data = OrganizationData::default();
            state.has_synced = false;
            state.generation += 1;
            state.phase = SyncPhase::Idle;
        }
        if let Err(err) = self.cache.clear().await {
            warn!(error = %err, "failed to clear organization cache");
        }
    }

    async fn mirror(&self, update: &OrganizationCacheUpdate) {
        if let Err(err) = self.cache.store(update).await {
            warn!(error = %err, "failed to mirror organization data");
        }
    }
}
