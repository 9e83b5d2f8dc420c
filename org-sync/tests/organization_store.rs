//! End-to-end coverage of the organization store against a scripted backend.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use org_sync::domain::ports::{OrganizationApi, OrganizationApiError};
use org_sync::domain::{
    DivisionPatch, ErrorCode, NewDirectorate, NewUser, OrganizationStore, RefreshOutcome,
    SessionSnapshot, SyncPhase,
};
use org_sync::outbound::cache::InMemoryOrganizationCache;
use rstest::{fixture, rstest};
use serde_json::{Map, Value, json};
use tokio::sync::Semaphore;

#[derive(Debug, Clone, PartialEq)]
struct RecordedCall {
    method: &'static str,
    path: String,
    body: Option<Value>,
}

/// Backend double serving list responses and queued mutation replies.
///
/// Calls can be held: after `hold_next(n)` the next `n` calls resolve their
/// response immediately but wait on the gate before returning it.
struct ScriptedApi {
    lists: Mutex<HashMap<String, Value>>,
    lists_fail: AtomicBool,
    replies: Mutex<VecDeque<Result<Value, OrganizationApiError>>>,
    calls: Mutex<Vec<RecordedCall>>,
    held: Mutex<usize>,
    gate: Semaphore,
}

impl Default for ScriptedApi {
    fn default() -> Self {
        Self {
            lists: Mutex::new(HashMap::new()),
            lists_fail: AtomicBool::new(false),
            replies: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            held: Mutex::new(0),
            gate: Semaphore::new(0),
        }
    }
}

impl ScriptedApi {
    fn with_list(self, path: &str, body: Value) -> Self {
        self.set_list(path, body);
        self
    }

    fn set_list(&self, path: &str, body: Value) {
        self.lists
            .lock()
            .expect("lists mutex")
            .insert(path.to_owned(), body);
    }

    fn fail_lists(&self) {
        self.lists_fail.store(true, Ordering::SeqCst);
    }

    fn hold_next(&self, calls: usize) {
        *self.held.lock().expect("held mutex") = calls;
    }

    fn release(&self, calls: usize) {
        self.gate.add_permits(calls);
    }

    fn reply(&self, reply: Result<Value, OrganizationApiError>) {
        self.replies
            .lock()
            .expect("replies mutex")
            .push_back(reply);
    }

    fn record(&self, method: &'static str, path: &str, body: Option<&Map<String, Value>>) {
        self.calls.lock().expect("calls mutex").push(RecordedCall {
            method,
            path: path.to_owned(),
            body: body.cloned().map(Value::Object),
        });
    }

    fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().expect("calls mutex").clone()
    }

    fn list(&self, path: &str) -> Result<Value, OrganizationApiError> {
        if self.lists_fail.load(Ordering::SeqCst) {
            return Err(OrganizationApiError::status(503_u16, "maintenance"));
        }
        Ok(self
            .lists
            .lock()
            .expect("lists mutex")
            .get(path)
            .cloned()
            .unwrap_or_else(|| json!([])))
    }

    fn next_reply(&self) -> Result<Value, OrganizationApiError> {
        self.replies
            .lock()
            .expect("replies mutex")
            .pop_front()
            .unwrap_or_else(|| Err(OrganizationApiError::transport("no scripted reply")))
    }

    async fn pass_gate<T>(&self, response: T) -> T {
        let hold = {
            let mut held = self.held.lock().expect("held mutex");
            let waiting = *held > 0;
            *held = held.saturating_sub(1);
            waiting
        };
        if hold {
            self.gate.acquire().await.expect("gate open").forget();
        }
        response
    }
}

#[async_trait]
impl OrganizationApi for ScriptedApi {
    async fn get(&self, path: &str) -> Result<Value, OrganizationApiError> {
        self.record("GET", path, None);
        let response = self.list(path);
        self.pass_gate(response).await
    }

    async fn post(
        &self,
        path: &str,
        body: &Map<String, Value>,
    ) -> Result<Value, OrganizationApiError> {
        self.record("POST", path, Some(body));
        let response = self.next_reply();
        self.pass_gate(response).await
    }

    async fn patch(
        &self,
        path: &str,
        body: &Map<String, Value>,
    ) -> Result<Value, OrganizationApiError> {
        self.record("PATCH", path, Some(body));
        let response = self.next_reply();
        self.pass_gate(response).await
    }

    async fn delete(&self, path: &str) -> Result<(), OrganizationApiError> {
        self.record("DELETE", path, None);
        let response = self.next_reply().map(|_| ());
        self.pass_gate(response).await
    }
}

fn portal_backend() -> ScriptedApi {
    ScriptedApi::default()
        .with_list(
            "/accounts/users/",
            json!({
                "count": 3,
                "next": null,
                "results": [
                    {
                        "id": "u-17",
                        "username": "user-17",
                        "first_name": "Jane",
                        "last_name": "Doe",
                        "email": "j.doe@example.com",
                        "division": { "id": "D1" }
                    },
                    {
                        "id": "u-88",
                        "username": "jdoe",
                        "first_name": "Jane",
                        "last_name": "Doe",
                        "email": "J.DOE@example.com"
                    },
                    {
                        "id": "u-1",
                        "username": "gm.ict",
                        "first_name": "Bola",
                        "last_name": "Ade",
                        "email": "gm.ict@example.com",
                        "system_role": { "id": "r-gm", "name": "General Manager" },
                        "division": "D1"
                    }
                ]
            }),
        )
        .with_list(
            "/organization/directorates/?ordering=name",
            json!([{ "id": "dir-1", "name": "Engineering and Technical Services" }]),
        )
        .with_list(
            "/organization/divisions/?ordering=name",
            json!([
                { "id": "D1", "name": "ICT", "code": "ICT", "directorate": "dir-1" },
                { "id": "D2", "name": "Human Resources", "directorate": { "pk": "dir-1" } }
            ]),
        )
        .with_list(
            "/organization/departments/?ordering=name",
            json!([{ "id": "dept-1", "name": "Software", "division": "D1" }]),
        )
        .with_list(
            "/organization/roles/?ordering=name",
            json!([
                { "id": "r-gm", "name": "General Manager", "user_count": 1 },
                { "id": "r-old", "name": "Typist" }
            ]),
        )
        .with_list(
            "/correspondence/delegations/",
            json!([{
                "id": "del-1",
                "principal": { "id": "u-1" },
                "assistant_id": "u-17",
                "can_forward": true
            }]),
        )
}

struct Harness {
    api: Arc<ScriptedApi>,
    cache: Arc<InMemoryOrganizationCache>,
    store: Arc<OrganizationStore>,
}

fn harness_with(api: ScriptedApi) -> Harness {
    let api = Arc::new(api);
    let cache = Arc::new(InMemoryOrganizationCache::new());
    let store = Arc::new(OrganizationStore::new(api.clone(), cache.clone()));
    Harness { api, cache, store }
}

#[fixture]
fn harness() -> Harness {
    harness_with(portal_backend())
}

#[rstest]
#[tokio::test]
async fn session_refresh_collapses_duplicate_accounts(harness: Harness) {
    let outcome = harness
        .store
        .observe_session(SessionSnapshot::signed_in("u-1"))
        .await;

    assert_eq!(outcome, RefreshOutcome::Applied);
    let jane = harness
        .store
        .users()
        .into_iter()
        .filter(|user| user.email.eq_ignore_ascii_case("j.doe@example.com"))
        .collect::<Vec<_>>();
    assert_eq!(jane.len(), 1);
    assert_eq!(
        jane.first().and_then(|user| user.division_id.as_deref()),
        Some("D1")
    );
    assert_eq!(
        harness
            .cache
            .user_by_id(Some("u-17"))
            .map(|user| user.name),
        Some("Jane Doe".to_owned())
    );
    assert!(harness.cache.user_by_id(Some("u-88")).is_none());
    assert_eq!(harness.api.calls().len(), 6);
}

#[rstest]
#[tokio::test]
async fn mutations_merge_without_refetching(harness: Harness) {
    harness
        .store
        .observe_session(SessionSnapshot::signed_in("u-1"))
        .await;

    let unchanged = harness
        .store
        .update_division("D1", &DivisionPatch::default())
        .await
        .expect("no-op update");
    assert_eq!(unchanged.code, "ICT");
    assert_eq!(harness.api.calls().len(), 6, "no-op update sends nothing");

    harness.api.reply(Ok(json!({
        "id": "D2",
        "name": "Human Resources",
        "directorate": "dir-1",
        "is_active": false
    })));
    let deactivated = harness
        .store
        .delete_division("D2")
        .await
        .expect("soft delete");
    assert!(!deactivated.is_active);
    assert_eq!(harness.store.divisions().len(), 2);
    assert_eq!(
        harness
            .cache
            .division_by_id(Some("D2"))
            .map(|division| division.is_active),
        Some(false)
    );

    harness.api.reply(Ok(Value::Null));
    harness.store.delete_role("r-old").await.expect("hard delete");
    let roles = harness
        .store
        .roles()
        .into_iter()
        .map(|role| role.id)
        .collect::<Vec<_>>();
    assert_eq!(roles, vec!["r-gm"]);

    harness.api.reply(Ok(json!({
        "id": "u-200",
        "username": "clerk.one",
        "first_name": "Aisha",
        "last_name": "Bello",
        "email": "aisha.bello@example.com",
        "department": "dept-1"
    })));
    let created = harness
        .store
        .add_user(&NewUser {
            username: "clerk.one".to_owned(),
            email: Some("aisha.bello@example.com".to_owned()),
            department_id: Some("dept-1".to_owned()),
            ..NewUser::default()
        })
        .await
        .expect("user created");
    assert_eq!(created.name, "Aisha Bello");
    assert!(harness.cache.user_by_id(Some("u-200")).is_some());
    let names = harness
        .store
        .users()
        .into_iter()
        .map(|user| user.name)
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["Aisha Bello", "Bola Ade", "Jane Doe"]);

    let calls = harness.api.calls();
    let mutations = calls
        .iter()
        .skip(6)
        .map(|call| (call.method, call.path.as_str(), call.body.clone()))
        .collect::<Vec<_>>();
    assert_eq!(mutations, vec![
        (
            "PATCH",
            "/organization/divisions/D2/",
            Some(json!({ "is_active": false }))
        ),
        ("DELETE", "/organization/roles/r-old/", None),
        (
            "POST",
            "/accounts/users/",
            Some(json!({
                "username": "clerk.one",
                "email": "aisha.bello@example.com",
                "department": "dept-1"
            }))
        ),
    ]);
}

#[rstest]
#[tokio::test]
async fn failed_mutation_leaves_store_untouched(harness: Harness) {
    harness
        .store
        .observe_session(SessionSnapshot::signed_in("u-1"))
        .await;
    let before = harness.store.snapshot();

    harness
        .api
        .reply(Err(OrganizationApiError::status(404_u16, "Not found.")));
    let err = harness
        .store
        .delete_directorate("dir-1")
        .await
        .expect_err("backend rejects");

    assert_eq!(err.code(), ErrorCode::NotFound);
    assert_eq!(harness.store.snapshot(), before);
}

async fn wait_for_calls(api: &ScriptedApi, count: usize) {
    while api.calls().len() < count {
        tokio::task::yield_now().await;
    }
}

fn spawn_session_refresh(
    store: &Arc<OrganizationStore>,
    user_id: &str,
) -> tokio::task::JoinHandle<RefreshOutcome> {
    let store = store.clone();
    let session = SessionSnapshot::signed_in(user_id);
    tokio::spawn(async move { store.observe_session(session).await })
}

fn directorate_names(store: &OrganizationStore) -> Vec<String> {
    store
        .directorates()
        .into_iter()
        .map(|directorate| directorate.name)
        .collect()
}

#[rstest]
#[tokio::test]
async fn refresh_started_before_reset_is_discarded(harness: Harness) {
    harness.api.hold_next(6);
    let pending = spawn_session_refresh(&harness.store, "u-1");
    wait_for_calls(&harness.api, 6).await;
    assert_eq!(harness.store.phase(), SyncPhase::Syncing);

    harness.store.reset_organization_data().await;
    harness.api.release(6);
    let outcome = pending.await.expect("refresh task joins");

    assert_eq!(outcome, RefreshOutcome::Discarded);
    assert!(harness.store.users().is_empty());
    assert!(!harness.store.has_synced());
    assert_eq!(harness.store.phase(), SyncPhase::Idle);
    assert!(harness.cache.user_by_id(Some("u-17")).is_none());
}

#[rstest]
#[tokio::test]
async fn older_refresh_landing_after_newer_one_is_discarded(harness: Harness) {
    harness.api.hold_next(6);
    let older = spawn_session_refresh(&harness.store, "u-1");
    wait_for_calls(&harness.api, 6).await;

    harness.api.set_list(
        "/organization/directorates/?ordering=name",
        json!([
            { "id": "dir-1", "name": "Engineering and Technical Services" },
            { "id": "dir-2", "name": "Finance and Administration" }
        ]),
    );
    let newer = harness.store.refresh_organization_data().await;
    assert_eq!(newer, RefreshOutcome::Applied);
    assert_eq!(harness.store.phase(), SyncPhase::Syncing);

    harness.api.release(6);
    let outcome = older.await.expect("refresh task joins");

    assert_eq!(outcome, RefreshOutcome::Discarded);
    assert_eq!(directorate_names(&harness.store), vec![
        "Engineering and Technical Services",
        "Finance and Administration"
    ]);
    assert!(harness.cache.directorate_by_id(Some("dir-2")).is_some());
    assert_eq!(harness.store.phase(), SyncPhase::Synced);
}

#[rstest]
#[tokio::test]
async fn switching_user_mid_refresh_discards_previous_user_data(harness: Harness) {
    harness.api.hold_next(6);
    let previous = spawn_session_refresh(&harness.store, "u-1");
    wait_for_calls(&harness.api, 6).await;

    let current = harness
        .store
        .observe_session(SessionSnapshot::signed_in("u-2"))
        .await;
    assert_eq!(current, RefreshOutcome::Applied);

    harness.api.release(6);
    let outcome = previous.await.expect("refresh task joins");

    assert_eq!(outcome, RefreshOutcome::Discarded);
    assert_eq!(harness.api.calls().len(), 12);
    assert!(harness.store.has_synced());
    assert_eq!(harness.store.phase(), SyncPhase::Synced);
}

#[rstest]
#[tokio::test]
async fn older_refresh_recovers_phase_after_newer_failure(harness: Harness) {
    harness.api.hold_next(6);
    let older = spawn_session_refresh(&harness.store, "u-1");
    wait_for_calls(&harness.api, 6).await;

    harness.api.fail_lists();
    let newer = harness.store.refresh_organization_data().await;
    assert!(matches!(newer, RefreshOutcome::Failed(_)));
    assert_eq!(harness.store.phase(), SyncPhase::Error);

    harness.api.release(6);
    let outcome = older.await.expect("refresh task joins");

    assert_eq!(outcome, RefreshOutcome::Applied);
    assert!(harness.store.has_synced());
    assert_eq!(harness.store.phase(), SyncPhase::Synced);
    assert_eq!(directorate_names(&harness.store), vec![
        "Engineering and Technical Services"
    ]);
}

#[rstest]
#[tokio::test]
async fn mutation_landing_after_reset_is_not_merged(harness: Harness) {
    harness
        .store
        .observe_session(SessionSnapshot::signed_in("u-1"))
        .await;
    harness.api.hold_next(1);
    harness.api.reply(Ok(json!({
        "id": "dir-9",
        "name": "Marine Operations",
        "code": "MOP"
    })));

    let store = harness.store.clone();
    let pending = tokio::spawn(async move {
        store
            .add_directorate(&NewDirectorate {
                name: "Marine Operations".to_owned(),
                code: Some("MOP".to_owned()),
                ..NewDirectorate::default()
            })
            .await
    });
    wait_for_calls(&harness.api, 7).await;

    harness.store.reset_organization_data().await;
    harness.api.release(1);
    let created = pending
        .await
        .expect("mutation task joins")
        .expect("backend accepted the directorate");

    assert_eq!(created.id, "dir-9");
    assert!(harness.store.directorates().is_empty());
    assert!(harness.cache.directorate_by_id(Some("dir-9")).is_none());
}
