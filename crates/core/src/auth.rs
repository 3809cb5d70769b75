use serde::{Deserialize, Serialize};

/// Authenticated identity attached to an inbound operation.
///
/// Produced by verifying a bearer token; authorization decisions always
/// re-read role and permission state from the store rather than trusting
/// anything carried here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    user_id: i64,
    email: String,
}

impl Principal {
    /// Creates a principal from a resolved user id and email.
    #[must_use]
    pub fn new(user_id: i64, email: impl Into<String>) -> Self {
        Self {
            user_id,
            email: email.into(),
        }
    }

    /// Returns the stable numeric user identifier.
    #[must_use]
    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    /// Returns the email of the authenticated user.
    #[must_use]
    pub fn email(&self) -> &str {
        self.email.as_str()
    }
}
