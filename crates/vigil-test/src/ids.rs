//! Deterministic approval ids.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use vigil_approval::{ApprovalToken, IdSource, RequestId};

/// An [`IdSource`] that hands out scripted ids, then numbered ones.
///
/// ```
/// use vigil_approval::IdSource;
/// use vigil_test::SequenceIds;
///
/// let ids = SequenceIds::new().with_request_ids(["req_ab12"]);
/// assert_eq!(ids.request_id().as_str(), "req_ab12");
/// assert_eq!(ids.request_id().as_str(), "req_test_1");
/// ```
#[derive(Debug, Default)]
pub struct SequenceIds {
    requests: Mutex<VecDeque<String>>,
    tokens: Mutex<VecDeque<String>>,
    counter: AtomicUsize,
}

impl SequenceIds {
    /// No scripted ids; everything is numbered.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request ids to return first, in order.
    #[must_use]
    pub fn with_request_ids<I, S>(self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.requests
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .extend(ids.into_iter().map(Into::into));
        self
    }

    /// Tokens to return first, in order.
    #[must_use]
    pub fn with_tokens<I, S>(self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tokens
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .extend(tokens.into_iter().map(Into::into));
        self
    }

    fn next(&self) -> usize {
        self.counter.fetch_add(1, Ordering::Relaxed).saturating_add(1)
    }
}

impl IdSource for SequenceIds {
    fn request_id(&self) -> RequestId {
        let scripted = self
            .requests
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .pop_front();
        RequestId::new(scripted.unwrap_or_else(|| format!("req_test_{}", self.next())))
    }

    fn token(&self) -> ApprovalToken {
        let scripted = self
            .tokens
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .pop_front();
        ApprovalToken::new(scripted.unwrap_or_else(|| format!("tok_test_{}", self.next())))
    }
}
