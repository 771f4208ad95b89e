//! Local session identity

use serde::{Deserialize, Serialize};

/// Authenticated identity and push-notification address kept between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
    pub user_id: Option<String>,
    pub push_token: Option<String>,
}

impl SessionIdentity {
    /// Identity for a user that just logged in
    pub fn logged_in(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            push_token: None,
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.user_id.as_deref().is_some_and(|id| !id.is_empty())
    }

    /// Same identity with the push address replaced
    pub fn with_push_token(self, token: impl Into<String>) -> Self {
        Self {
            push_token: Some(token.into()),
            ..self
        }
    }
}
