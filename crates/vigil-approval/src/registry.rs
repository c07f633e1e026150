//! The approval registry.
//!
//! A proposed command moves through two phases:
//!
//! 1. [`ApprovalRegistry::request`] records it as pending.
//! 2. [`ApprovalRegistry::grant`] removes the pending entry and issues a
//!    short-lived token bound to the command.
//!
//! [`ApprovalRegistry::validate_and_consume`] removes the token and hands the
//! command back. Each step removes before it checks, so neither a request id
//! nor a token can be used twice even under concurrent callers.

use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::error::{ApprovalError, ApprovalResult, TokenRejection};
use crate::ids::{IdSource, RandomIds};
use crate::store::{ApprovalStore, MemoryApprovalStore};
use crate::types::{
    ActionKind, ActiveToken, ApprovalToken, Grant, PendingApproval, RequestId, is_older_than,
};

/// How long a pending request may wait for a grant.
pub const DEFAULT_REQUEST_TTL: Duration = Duration::from_secs(5 * 60);

/// How long a granted token stays usable.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(60);

/// Process-wide approval service.
#[derive(Debug)]
pub struct ApprovalRegistry {
    store: Arc<dyn ApprovalStore>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdSource>,
    request_ttl: Duration,
    token_ttl: Duration,
}

impl Default for ApprovalRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ApprovalRegistry {
    /// Create a registry with an in-memory store, the system clock and random ids.
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: Arc::new(MemoryApprovalStore::new()),
            clock: Arc::new(SystemClock),
            ids: Arc::new(RandomIds),
            request_ttl: DEFAULT_REQUEST_TTL,
            token_ttl: DEFAULT_TOKEN_TTL,
        }
    }

    /// Use a different backing store.
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn ApprovalStore>) -> Self {
        self.store = store;
        self
    }

    /// Use a different clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Use a different id source.
    #[must_use]
    pub fn with_ids(mut self, ids: Arc<dyn IdSource>) -> Self {
        self.ids = ids;
        self
    }

    /// Set the pending request lifetime.
    #[must_use]
    pub fn with_request_ttl(mut self, ttl: Duration) -> Self {
        self.request_ttl = ttl;
        self
    }

    /// Set the token lifetime.
    #[must_use]
    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    /// Token lifetime.
    #[must_use]
    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }

    /// Record a proposed action and return its request id.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalError::Storage`] if the store fails.
    pub fn request(
        &self,
        action: ActionKind,
        reason: impl Into<String>,
        command: impl Into<String>,
    ) -> ApprovalResult<RequestId> {
        let request_id = self.ids.request_id();
        let pending = PendingApproval {
            request_id: request_id.clone(),
            action,
            reason: reason.into(),
            command: command.into(),
            created_at: self.clock.now(),
        };
        info!(
            request_id = %request_id,
            action = %action,
            command = %pending.command,
            "Approval requested"
        );
        self.store.insert_pending(pending)?;
        Ok(request_id)
    }

    /// Turn a pending request into a single-use token.
    ///
    /// The pending entry is removed whether or not the grant succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalError::InvalidOrExpiredRequest`] if the id is
    /// unknown, was already granted, or is older than the request lifetime.
    pub fn grant(&self, request_id: &RequestId) -> ApprovalResult<Grant> {
        let invalid = || ApprovalError::InvalidOrExpiredRequest {
            request_id: request_id.to_string(),
        };

        let Some(pending) = self.store.take_pending(request_id)? else {
            warn!(request_id = %request_id, "Grant refused: unknown or already granted");
            return Err(invalid());
        };

        let now = self.clock.now();
        if is_older_than(pending.created_at, now, self.request_ttl) {
            warn!(request_id = %request_id, "Grant refused: request expired");
            return Err(invalid());
        }

        let token = self.ids.token();
        self.store.insert_token(ActiveToken {
            token: token.clone(),
            command: pending.command.clone(),
            request_id: request_id.clone(),
            issued_at: now,
        })?;
        info!(request_id = %request_id, command = %pending.command, "Approval granted");

        Ok(Grant {
            token,
            expires_in: self.token_ttl,
        })
    }

    /// Consume a token and return the command it authorizes.
    ///
    /// The token is removed whether or not it is still valid.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalError::PermissionDenied`] with
    /// [`TokenRejection::UnknownOrUsed`] for a token that does not exist (or
    /// was already consumed) and [`TokenRejection::Expired`] for one older
    /// than the token lifetime.
    pub fn validate_and_consume(&self, token: &ApprovalToken) -> ApprovalResult<String> {
        let Some(active) = self.store.take_token(token)? else {
            warn!(token = ?token, "Token refused: unknown or already used");
            return Err(ApprovalError::PermissionDenied(TokenRejection::UnknownOrUsed));
        };

        if is_older_than(active.issued_at, self.clock.now(), self.token_ttl) {
            warn!(
                token = ?token,
                request_id = %active.request_id,
                "Token refused: expired"
            );
            return Err(ApprovalError::PermissionDenied(TokenRejection::Expired));
        }

        debug!(request_id = %active.request_id, "Token consumed");
        Ok(active.command)
    }

    /// Remove every expired pending request and token.
    ///
    /// Expiry is also checked at access time, so this only reclaims memory.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let request_ttl = self.request_ttl;
        let token_ttl = self.token_ttl;
        let pending = self
            .store
            .purge_pending(&|p| is_older_than(p.created_at, now, request_ttl));
        let tokens = self
            .store
            .purge_tokens(&|t| is_older_than(t.issued_at, now, token_ttl));
        let removed = pending.saturating_add(tokens);
        if removed > 0 {
            debug!(pending, tokens, "Purged expired approvals");
        }
        removed
    }

    /// Number of requests waiting for a grant.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.store.pending_count()
    }

    /// Number of granted tokens not yet consumed.
    #[must_use]
    pub fn token_count(&self) -> usize {
        self.store.token_count()
    }

    /// Periodically purge expired entries until the registry is dropped.
    #[must_use]
    pub fn spawn_sweeper(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let weak: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(registry) = weak.upgrade() else {
                    debug!("Approval registry dropped, sweeper exiting");
                    break;
                };
                registry.purge_expired();
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn registry() -> (Arc<ManualClock>, ApprovalRegistry) {
        let clock = Arc::new(ManualClock::default());
        let registry = ApprovalRegistry::new().with_clock(clock.clone());
        (clock, registry)
    }

    #[test]
    fn test_request_grant_consume() {
        let (_clock, registry) = registry();
        let id = registry
            .request(ActionKind::TerminalRun, "run tests", "cargo test")
            .unwrap();
        assert_eq!(registry.pending_count(), 1);

        let grant = registry.grant(&id).unwrap();
        assert_eq!(grant.expires_in, Duration::from_secs(60));
        assert_eq!(registry.pending_count(), 0);
        assert_eq!(registry.token_count(), 1);

        let command = registry.validate_and_consume(&grant.token).unwrap();
        assert_eq!(command, "cargo test");
        assert_eq!(registry.token_count(), 0);
    }

    #[test]
    fn test_grant_twice_fails() {
        let (_clock, registry) = registry();
        let id = registry.request(ActionKind::TerminalRun, "r", "ls").unwrap();
        registry.grant(&id).unwrap();
        assert!(matches!(
            registry.grant(&id),
            Err(ApprovalError::InvalidOrExpiredRequest { .. })
        ));
    }

    #[test]
    fn test_grant_unknown_fails() {
        let (_clock, registry) = registry();
        assert!(matches!(
            registry.grant(&RequestId::from("req_missing")),
            Err(ApprovalError::InvalidOrExpiredRequest { .. })
        ));
    }

    #[test]
    fn test_pending_expires_after_five_minutes() {
        let (clock, registry) = registry();
        let id = registry.request(ActionKind::TerminalRun, "r", "ls").unwrap();
        clock.advance(Duration::from_secs(5 * 60 + 1));
        assert!(matches!(
            registry.grant(&id),
            Err(ApprovalError::InvalidOrExpiredRequest { .. })
        ));
        // Expired entry is gone, not left behind.
        assert_eq!(registry.pending_count(), 0);
    }

    #[test]
    fn test_pending_within_lifetime_grants() {
        let (clock, registry) = registry();
        let id = registry.request(ActionKind::TerminalRun, "r", "ls").unwrap();
        clock.advance(Duration::from_secs(4 * 60));
        assert!(registry.grant(&id).is_ok());
    }

    #[test]
    fn test_token_expiry_is_distinguished() {
        let (clock, registry) = registry();
        let id = registry.request(ActionKind::TerminalRun, "r", "ls").unwrap();
        let grant = registry.grant(&id).unwrap();
        clock.advance(Duration::from_secs(61));

        let err = registry.validate_and_consume(&grant.token).unwrap_err();
        assert!(matches!(
            err,
            ApprovalError::PermissionDenied(TokenRejection::Expired)
        ));
        // The expired token is destroyed; presenting it again looks unknown.
        let err = registry.validate_and_consume(&grant.token).unwrap_err();
        assert!(matches!(
            err,
            ApprovalError::PermissionDenied(TokenRejection::UnknownOrUsed)
        ));
    }

    #[test]
    fn test_token_single_use() {
        let (_clock, registry) = registry();
        let id = registry.request(ActionKind::TerminalRun, "r", "ls").unwrap();
        let grant = registry.grant(&id).unwrap();
        registry.validate_and_consume(&grant.token).unwrap();
        assert!(
            registry
                .validate_and_consume(&grant.token)
                .unwrap_err()
                .is_permission_denied()
        );
    }

    #[test]
    fn test_unknown_token_denied() {
        let (_clock, registry) = registry();
        let err = registry
            .validate_and_consume(&ApprovalToken::from("forged"))
            .unwrap_err();
        assert_eq!(err.to_string(), "permission denied: invalid approval token");
    }

    #[test]
    fn test_custom_ttls() {
        let clock = Arc::new(ManualClock::default());
        let registry = ApprovalRegistry::new()
            .with_clock(clock.clone())
            .with_request_ttl(Duration::from_secs(10))
            .with_token_ttl(Duration::from_secs(5));
        let id = registry.request(ActionKind::TerminalRun, "r", "ls").unwrap();
        let grant = registry.grant(&id).unwrap();
        assert_eq!(grant.expires_in, Duration::from_secs(5));
        clock.advance(Duration::from_secs(6));
        assert!(registry.validate_and_consume(&grant.token).is_err());
    }

    #[test]
    fn test_purge_expired() {
        let (clock, registry) = registry();
        let stale = registry.request(ActionKind::TerminalRun, "r", "a").unwrap();
        let granted = registry.request(ActionKind::TerminalRun, "r", "b").unwrap();
        registry.grant(&granted).unwrap();
        clock.advance(Duration::from_secs(90));
        let fresh = registry.request(ActionKind::TerminalRun, "r", "c").unwrap();

        // Token (60s) is gone; the pending requests (5min) are not.
        assert_eq!(registry.purge_expired(), 1);
        assert_eq!(registry.pending_count(), 2);

        clock.advance(Duration::from_secs(5 * 60));
        assert_eq!(registry.purge_expired(), 1);
        assert!(registry.grant(&stale).is_err());
        assert!(registry.grant(&fresh).is_ok());
    }

    #[test]
    fn test_concurrent_consume_single_winner() {
        let (_clock, registry) = registry();
        let registry = Arc::new(registry);
        let id = registry.request(ActionKind::TerminalRun, "r", "ls").unwrap();
        let token = registry.grant(&id).unwrap().token;

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                let token = token.clone();
                std::thread::spawn(move || registry.validate_and_consume(&token).is_ok())
            })
            .collect();
        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();
        assert_eq!(successes, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_purges_and_stops() {
        let clock = Arc::new(ManualClock::default());
        let registry = Arc::new(ApprovalRegistry::new().with_clock(clock.clone()));
        registry.request(ActionKind::TerminalRun, "r", "ls").unwrap();

        let handle = registry.spawn_sweeper(Duration::from_secs(30));
        clock.advance(Duration::from_secs(6 * 60));
        tokio::time::sleep(Duration::from_secs(31)).await;
        assert_eq!(registry.pending_count(), 0);

        drop(registry);
        tokio::time::sleep(Duration::from_secs(31)).await;
        handle.await.unwrap();
    }
}
