use std::sync::Arc;

use rolegate_core::{AppError, AppResult, Principal};
use rolegate_domain::{AccessDecision, AccessRequirement, HeldAccess, Role, UserId};
use tracing::debug;

use crate::IdentityStore;
use crate::relationships::permission_ids;

/// Application service deciding whether a principal satisfies a requirement.
///
/// Every decision re-reads the principal's roles and permissions from the
/// store; nothing carried by the token is trusted.
#[derive(Clone)]
pub struct AccessGuard {
    store: Arc<dyn IdentityStore>,
}

impl AccessGuard {
    /// Creates a new guard.
    #[must_use]
    pub fn new(store: Arc<dyn IdentityStore>) -> Self {
        Self { store }
    }

    /// Allows or rejects `principal` against `requirement`.
    ///
    /// Fails with `Unauthorized` when no principal is present or its user no
    /// longer exists, and with `Forbidden` when the requirement is not met.
    pub async fn authorize(
        &self,
        principal: Option<&Principal>,
        requirement: &AccessRequirement,
    ) -> AppResult<()> {
        let principal = principal
            .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;
        let user_id = UserId::new(principal.user_id());

        let mut transaction = self.store.begin().await?;
        if transaction.find_user(user_id).await?.is_none() {
            return Err(AppError::Unauthorized(
                "principal no longer exists".to_owned(),
            ));
        }

        let held = HeldAccess::new(
            transaction
                .roles_of_user(user_id)
                .await?
                .iter()
                .map(Role::id),
            permission_ids(&transaction.permissions_of_user(user_id).await?),
        );
        let resolved = requirement.resolve(
            transaction
                .role_ids_by_names(requirement.required_roles())
                .await?
                .into_iter()
                .collect(),
            transaction
                .permission_ids_by_names(requirement.required_permissions())
                .await?
                .into_iter()
                .collect(),
        );

        match AccessDecision::evaluate(&resolved, &held) {
            AccessDecision::Allow => Ok(()),
            AccessDecision::Deny(reason) => {
                debug!(%user_id, reason = reason.message(), "access denied");
                Err(AppError::Forbidden(reason.message().to_owned()))
            }
        }
    }
}
