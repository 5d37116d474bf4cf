//! Per-request authentication state.

use crate::{
    errors::{Error, Result},
    types::UserId,
};

/// Identity established for the current request, threaded through the
/// middleware chain. Starts anonymous; `Authenticate` fills it in.
#[derive(Clone, Debug, Default)]
pub struct AuthContext {
    user_id: Option<UserId>,
}

impl AuthContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_user(&mut self, user_id: UserId) {
        self.user_id = Some(user_id);
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    /// The authenticated user id, or an unauthenticated error when the chain
    /// never established one.
    pub fn require_user(&self) -> Result<UserId> {
        self.user_id.ok_or(Error::Unauthenticated { message: None })
    }
}
