//! Storage for pending approvals and active tokens.
//!
//! Every `take_*` operation removes and returns in one step. The registry
//! relies on that for its single-use guarantees; implementations must not
//! split the lookup from the removal.

use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

use crate::error::ApprovalResult;
use crate::types::{ActiveToken, ApprovalToken, PendingApproval, RequestId};

/// Backing store for the approval registry.
pub trait ApprovalStore: Send + Sync + fmt::Debug {
    /// Record a pending approval, replacing any entry with the same id.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ApprovalError::Storage`] if the backend fails.
    fn insert_pending(&self, pending: PendingApproval) -> ApprovalResult<()>;

    /// Remove and return the pending approval with this id.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ApprovalError::Storage`] if the backend fails.
    fn take_pending(&self, id: &RequestId) -> ApprovalResult<Option<PendingApproval>>;

    /// Record an active token.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ApprovalError::Storage`] if the backend fails.
    fn insert_token(&self, token: ActiveToken) -> ApprovalResult<()>;

    /// Remove and return the active token with this value.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ApprovalError::Storage`] if the backend fails.
    fn take_token(&self, token: &ApprovalToken) -> ApprovalResult<Option<ActiveToken>>;

    /// Drop pending approvals for which `expired` holds. Returns how many were dropped.
    fn purge_pending(&self, expired: &dyn Fn(&PendingApproval) -> bool) -> usize;

    /// Drop tokens for which `expired` holds. Returns how many were dropped.
    fn purge_tokens(&self, expired: &dyn Fn(&ActiveToken) -> bool) -> usize;

    /// Number of pending approvals.
    fn pending_count(&self) -> usize;

    /// Number of active tokens.
    fn token_count(&self) -> usize;
}

/// In-memory store. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryApprovalStore {
    pending: RwLock<HashMap<RequestId, PendingApproval>>,
    tokens: RwLock<HashMap<ApprovalToken, ActiveToken>>,
}

impl MemoryApprovalStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn recover<T>(e: std::sync::PoisonError<T>) -> T {
    tracing::warn!("MemoryApprovalStore lock poisoned, recovering");
    e.into_inner()
}

impl ApprovalStore for MemoryApprovalStore {
    fn insert_pending(&self, pending: PendingApproval) -> ApprovalResult<()> {
        let mut map = self.pending.write().unwrap_or_else(recover);
        map.insert(pending.request_id.clone(), pending);
        Ok(())
    }

    fn take_pending(&self, id: &RequestId) -> ApprovalResult<Option<PendingApproval>> {
        Ok(self.pending.write().unwrap_or_else(recover).remove(id))
    }

    fn insert_token(&self, token: ActiveToken) -> ApprovalResult<()> {
        let mut map = self.tokens.write().unwrap_or_else(recover);
        map.insert(token.token.clone(), token);
        Ok(())
    }

    fn take_token(&self, token: &ApprovalToken) -> ApprovalResult<Option<ActiveToken>> {
        Ok(self.tokens.write().unwrap_or_else(recover).remove(token))
    }

    fn purge_pending(&self, expired: &dyn Fn(&PendingApproval) -> bool) -> usize {
        let mut map = self.pending.write().unwrap_or_else(recover);
        let before = map.len();
        map.retain(|_, p| !expired(p));
        before.saturating_sub(map.len())
    }

    fn purge_tokens(&self, expired: &dyn Fn(&ActiveToken) -> bool) -> usize {
        let mut map = self.tokens.write().unwrap_or_else(recover);
        let before = map.len();
        map.retain(|_, t| !expired(t));
        before.saturating_sub(map.len())
    }

    fn pending_count(&self) -> usize {
        self.pending.read().unwrap_or_else(recover).len()
    }

    fn token_count(&self) -> usize {
        self.tokens.read().unwrap_or_else(recover).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ActionKind;
    use chrono::Utc;

    fn pending(id: &str) -> PendingApproval {
        PendingApproval {
            request_id: RequestId::from(id),
            action: ActionKind::TerminalRun,
            reason: "r".to_string(),
            command: "ls".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_take_pending_removes() {
        let store = MemoryApprovalStore::new();
        store.insert_pending(pending("req_1")).unwrap();
        assert_eq!(store.pending_count(), 1);

        let id = RequestId::from("req_1");
        assert!(store.take_pending(&id).unwrap().is_some());
        assert!(store.take_pending(&id).unwrap().is_none());
        assert_eq!(store.pending_count(), 0);
    }

    #[test]
    fn test_take_token_removes() {
        let store = MemoryApprovalStore::new();
        let token = ApprovalToken::from("tok");
        store
            .insert_token(ActiveToken {
                token: token.clone(),
                command: "ls".to_string(),
                request_id: RequestId::from("req_1"),
                issued_at: Utc::now(),
            })
            .unwrap();

        assert_eq!(store.take_token(&token).unwrap().unwrap().command, "ls");
        assert!(store.take_token(&token).unwrap().is_none());
    }

    #[test]
    fn test_purge_counts() {
        let store = MemoryApprovalStore::new();
        store.insert_pending(pending("req_1")).unwrap();
        store.insert_pending(pending("req_2")).unwrap();

        let removed = store.purge_pending(&|p| p.request_id.as_str() == "req_1");
        assert_eq!(removed, 1);
        assert_eq!(store.pending_count(), 1);
        assert_eq!(store.purge_tokens(&|_| true), 0);
    }
}
