//! Per-user conversational state.
//!
//! Sessions live only in process memory; a restart forgets every user.
//! That is a documented limitation of the deployment, not an invariant
//! anything here relies on.

use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::catalog::AUTO_DETECT;

/// Opaque stable user identity from the chat platform
pub type UserId = i64;

/// Which inbound event the session is waiting for next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingAction {
    /// A source-language menu is open
    ChoosingSource,
    /// A target-language menu is open
    ChoosingTarget,
    /// `/support` was issued; the next free-text message is relayed
    AwaitingSupportMessage,
}

/// How free-text messages from this user are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Free text goes to the translation port
    #[default]
    Translate,
    /// Free text is relayed to the administrator
    SupportRelay,
}

/// State of one user's conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSession {
    /// Owning user
    pub user_id: UserId,
    /// Selected source language code; [`AUTO_DETECT`] by default
    pub source: String,
    /// Selected target language code; sticky until changed
    pub target: String,
    /// Selection currently in progress, if any
    pub pending: Option<PendingAction>,
    /// Free-text dispatch mode
    pub mode: Mode,
}

impl UserSession {
    fn new(user_id: UserId, default_target: &str) -> Self {
        Self {
            user_id,
            source: AUTO_DETECT.to_string(),
            target: default_target.to_string(),
            pending: None,
            mode: Mode::default(),
        }
    }

    /// Source language hint for the translation port, `None` meaning
    /// auto-detect
    #[must_use]
    pub fn source_hint(&self) -> Option<&str> {
        (self.source != AUTO_DETECT).then_some(self.source.as_str())
    }
}

/// In-memory map from user identity to session.
///
/// Every read-modify-write runs under the single write guard, so two
/// events for the same user can never interleave into a torn merge.
/// Sessions are created implicitly on first access and never deleted.
pub struct SessionStore {
    default_target: String,
    sessions: RwLock<HashMap<UserId, UserSession>>,
}

impl SessionStore {
    /// Create an empty store; new sessions default to `default_target`
    #[must_use]
    pub fn new(default_target: impl Into<String>) -> Self {
        Self {
            default_target: default_target.into(),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Fetch the user's session, materializing the default if this is
    /// their first contact. Never fails.
    pub async fn get(&self, user_id: UserId) -> UserSession {
        let mut guard = self.sessions.write().await;
        guard
            .entry(user_id)
            .or_insert_with(|| UserSession::new(user_id, &self.default_target))
            .clone()
    }

    /// Apply `mutate` to the user's session atomically and return the
    /// resulting state. The closure runs under the write guard and must
    /// stay pure in-memory work.
    pub async fn update<F>(&self, user_id: UserId, mutate: F) -> UserSession
    where
        F: FnOnce(&mut UserSession),
    {
        let mut guard = self.sessions.write().await;
        let session = guard
            .entry(user_id)
            .or_insert_with(|| UserSession::new(user_id, &self.default_target));
        mutate(session);
        session.clone()
    }

    /// Snapshot of every known user identity, in no particular order
    pub async fn all_user_ids(&self) -> Vec<UserId> {
        self.sessions.read().await.keys().copied().collect()
    }

    /// Number of known users
    pub async fn user_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_get_materializes_default() {
        let store = SessionStore::new("en");
        let session = store.get(7).await;
        assert_eq!(session.user_id, 7);
        assert_eq!(session.source, AUTO_DETECT);
        assert_eq!(session.target, "en");
        assert_eq!(session.pending, None);
        assert_eq!(session.mode, Mode::Translate);
        assert_eq!(store.user_count().await, 1);
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let store = SessionStore::new("en");
        let updated = store
            .update(1, |s| {
                s.target = "fr".to_string();
                s.pending = Some(PendingAction::ChoosingTarget);
            })
            .await;
        assert_eq!(updated.target, "fr");

        // A later partial update leaves unrelated fields alone
        let updated = store.update(1, |s| s.pending = None).await;
        assert_eq!(updated.target, "fr");
        assert_eq!(updated.pending, None);
    }

    #[tokio::test]
    async fn test_source_hint() {
        let store = SessionStore::new("en");
        let session = store.get(1).await;
        assert_eq!(session.source_hint(), None);
        let session = store.update(1, |s| s.source = "am".to_string()).await;
        assert_eq!(session.source_hint(), Some("am"));
    }

    #[tokio::test]
    async fn test_all_user_ids_snapshot() {
        let store = SessionStore::new("en");
        store.get(1).await;
        store.get(2).await;
        store.get(3).await;
        let mut ids = store.all_user_ids().await;
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    // N concurrent updates per user across M users: each user's final
    // state must be one of that user's own updates, untouched by the
    // others.
    #[tokio::test(flavor = "multi_thread")]
    async fn test_concurrent_updates_stay_isolated() {
        const USERS: i64 = 8;
        const UPDATES: usize = 50;

        let store = Arc::new(SessionStore::new("en"));
        let mut tasks = Vec::new();
        for user in 0..USERS {
            for i in 0..UPDATES {
                let store = Arc::clone(&store);
                tasks.push(tokio::spawn(async move {
                    store
                        .update(user, move |s| {
                            s.target = format!("u{user}-t{i}");
                            s.source = format!("u{user}-s{i}");
                        })
                        .await;
                }));
            }
        }
        for task in tasks {
            task.await.expect("update task panicked");
        }

        for user in 0..USERS {
            let session = store.get(user).await;
            let prefix = format!("u{user}-");
            assert!(session.target.starts_with(&prefix), "{session:?}");
            assert!(session.source.starts_with(&prefix), "{session:?}");
            // Both fields come from the same atomic update
            assert_eq!(
                session.target.trim_start_matches(&prefix).replace('t', ""),
                session.source.trim_start_matches(&prefix).replace('s', ""),
                "torn write for user {user}"
            );
        }
    }
}
