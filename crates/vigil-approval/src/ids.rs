//! Request id and token generation.

use rand::RngCore;
use rand::rngs::OsRng;
use std::fmt;
use uuid::Uuid;

use crate::types::{ApprovalToken, RequestId};

/// Number of random bytes in an approval token.
const TOKEN_BYTES: usize = 32;

/// Source of fresh request ids and tokens.
pub trait IdSource: Send + Sync + fmt::Debug {
    /// A new, unique request id.
    fn request_id(&self) -> RequestId;
    /// A new, unguessable token.
    fn token(&self) -> ApprovalToken;
}

/// Random ids: `req_<uuid>` request ids and hex-encoded OS-random tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl IdSource for RandomIds {
    fn request_id(&self) -> RequestId {
        RequestId::new(format!("req_{}", Uuid::new_v4().simple()))
    }

    fn token(&self) -> ApprovalToken {
        let mut bytes = [0u8; TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        ApprovalToken::new(hex::encode(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_ids_shape() {
        let ids = RandomIds;
        let id = ids.request_id();
        assert!(id.as_str().starts_with("req_"));
        assert_eq!(id.as_str().len(), 36);

        let token = ids.token();
        assert_eq!(token.as_str().len(), 64);
        assert!(token.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, ids.token());
    }
}
