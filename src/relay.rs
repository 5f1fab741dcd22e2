//! Support relay correlation.
//!
//! When a user's support message is forwarded to the administrator, the
//! ID of the forwarded message is remembered here. A later
//! administrator message that replies to that ID resolves back to the
//! original user. Entries expire so an abandoned thread cannot grow the
//! map forever.

use moka::future::Cache;
use std::time::Duration;

use crate::config::{RELAY_MAX_ENTRIES, RELAY_TTL_SECS};
use crate::session::UserId;

/// Maps the message ID of a relayed support message (in the admin chat)
/// to the user who sent it
#[derive(Clone)]
pub struct RelayLog {
    cache: Cache<i32, UserId>,
}

impl RelayLog {
    /// Create a relay log with the configured TTL and capacity
    #[must_use]
    pub fn new() -> Self {
        Self::with_limits(RELAY_TTL_SECS, RELAY_MAX_ENTRIES)
    }

    /// Create a relay log with explicit limits
    #[must_use]
    pub fn with_limits(ttl_secs: u64, max_entries: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();
        Self { cache }
    }

    /// Record that `admin_message_id` carries a support message from
    /// `user_id`
    pub async fn record(&self, admin_message_id: i32, user_id: UserId) {
        self.cache.insert(admin_message_id, user_id).await;
    }

    /// Resolve a reply in the admin chat back to the originating user.
    ///
    /// Returns `None` when the correlation is unknown or expired; the
    /// router treats that as a no-op.
    pub async fn resolve(&self, admin_message_id: i32) -> Option<UserId> {
        self.cache.get(&admin_message_id).await
    }
}

impl Default for RelayLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_record_and_resolve() {
        let log = RelayLog::with_limits(60, 100);
        log.record(42, 1001).await;
        assert_eq!(log.resolve(42).await, Some(1001));
    }

    #[tokio::test]
    async fn test_unknown_message_unresolved() {
        let log = RelayLog::with_limits(60, 100);
        assert_eq!(log.resolve(7).await, None);
    }

    #[tokio::test]
    async fn test_correlations_independent() {
        let log = RelayLog::with_limits(60, 100);
        log.record(1, 100).await;
        log.record(2, 200).await;
        assert_eq!(log.resolve(1).await, Some(100));
        assert_eq!(log.resolve(2).await, Some(200));
    }
}
