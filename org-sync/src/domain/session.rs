//! Session signals observed by the organization store.

use serde::Serialize;

/// Synchronization phase of the organization store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPhase {
    /// Nothing has been fetched for the current session.
    #[default]
    Idle,
    /// A bulk refresh is in flight.
    Syncing,
    /// The latest bulk refresh was applied.
    Synced,
    /// The latest bulk refresh failed; previous data is retained.
    Error,
}

/// Point-in-time view of the authentication session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Whether persisted session state has finished loading.
    pub hydrated: bool,
    /// Id of the signed-in user, if any.
    pub user_id: Option<String>,
    /// Whether access tokens are present.
    pub has_tokens: bool,
}

impl SessionSnapshot {
    /// A hydrated session for `user_id` holding tokens.
    pub fn signed_in(user_id: impl Into<String>) -> Self {
        Self {
            hydrated: true,
            user_id: Some(user_id.into()),
            has_tokens: true,
        }
    }

    /// Whether organization data may be fetched for this session.
    pub fn is_ready(&self) -> bool {
        self.hydrated && self.user_id.is_some() && self.has_tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::ready(SessionSnapshot::signed_in("u-1"), true)]
    #[case::not_hydrated(
        SessionSnapshot { hydrated: false, ..SessionSnapshot::signed_in("u-1") },
        false
    )]
    #[case::no_user(SessionSnapshot { user_id: None, ..SessionSnapshot::signed_in("u-1") }, false)]
    #[case::no_tokens(
        SessionSnapshot { has_tokens: false, ..SessionSnapshot::signed_in("u-1") },
        false
    )]
    fn readiness_requires_all_signals(#[case] session: SessionSnapshot, #[case] expected: bool) {
        assert_eq!(session.is_ready(), expected);
    }
}
