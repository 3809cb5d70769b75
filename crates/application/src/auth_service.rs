//! Registration, login and session resolution.
//!
//! Login failures always report the same generic message so callers cannot
//! probe which emails are registered.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rolegate_core::{AppError, AppResult, Principal};
use rolegate_domain::{EmailAddress, UserId};
use tracing::{info, warn};

use crate::relationships::user_details;
use crate::{CreateUserInput, IdentityService, IdentityStore, PasswordHasher, UserDetails};

const INVALID_CREDENTIALS: &str = "invalid login credentials";

// ---------------------------------------------------------------------------
// Ports
// ---------------------------------------------------------------------------

/// Signed bearer token handed to a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    /// Encoded token.
    pub access_token: String,
    /// Expiry instant.
    pub expires_at: DateTime<Utc>,
}

/// Port for issuing and verifying bearer tokens.
pub trait TokenIssuer: Send + Sync {
    /// Issues a token bound to `principal`.
    fn issue(&self, principal: &Principal) -> AppResult<IssuedToken>;

    /// Verifies signature and expiry, returning the bound principal.
    fn verify(&self, token: &str) -> AppResult<Principal>;
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Successful login result.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// Token of the new session.
    pub token: IssuedToken,
    /// Authenticated user with roles and permissions.
    pub user: UserDetails,
}

/// Application service for authentication.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn IdentityStore>,
    identity_service: IdentityService,
    password_hasher: Arc<dyn PasswordHasher>,
    token_issuer: Arc<dyn TokenIssuer>,
}

impl AuthService {
    /// Creates a new authentication service.
    #[must_use]
    pub fn new(
        store: Arc<dyn IdentityStore>,
        identity_service: IdentityService,
        password_hasher: Arc<dyn PasswordHasher>,
        token_issuer: Arc<dyn TokenIssuer>,
    ) -> Self {
        Self {
            store,
            identity_service,
            password_hasher,
            token_issuer,
        }
    }

    /// Self-registers a new account holding the default role.
    pub async fn register(&self, input: CreateUserInput) -> AppResult<UserDetails> {
        self.identity_service.create_user(input).await
    }

    /// Verifies credentials and opens a new session, replacing any previous one.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<LoginOutcome> {
        let stored = match EmailAddress::new(email) {
            Ok(email) => {
                let mut transaction = self.store.begin().await?;
                transaction.find_user_by_email(&email).await?
            }
            Err(_) => None,
        };

        let Some(stored) = stored else {
            // Keep response time close to the known-user path.
            let _ = self.password_hasher.hash_password(password);
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_owned()));
        };

        if !self
            .password_hasher
            .verify_password(password, &stored.password_hash)?
        {
            warn!(user_id = %stored.user.id(), "login rejected");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_owned()));
        }

        let user_id = stored.user.id();
        let principal = Principal::new(user_id.as_i64(), stored.user.email().as_str());
        let token = self.token_issuer.issue(&principal)?;

        let mut transaction = self.store.begin().await?;
        if transaction.find_user(user_id).await?.is_none() {
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_owned()));
        }
        transaction
            .set_session_token(user_id, Some(&token.access_token))
            .await?;
        let user = user_details(transaction.as_mut(), user_id).await?;
        transaction.commit().await?;

        info!(%user_id, "user logged in");
        Ok(LoginOutcome { token, user })
    }

    /// Ends the principal's current session.
    pub async fn logout(&self, principal: &Principal) -> AppResult<()> {
        let user_id = UserId::new(principal.user_id());
        let mut transaction = self.store.begin().await?;
        if transaction.find_user(user_id).await?.is_none() {
            return Err(AppError::Unauthorized(
                "principal no longer exists".to_owned(),
            ));
        }
        transaction.set_session_token(user_id, None).await?;
        transaction.commit().await?;

        info!(%user_id, "user logged out");
        Ok(())
    }

    /// Resolves a bearer token to the principal of a live session.
    pub async fn resolve_principal(&self, token: &str) -> AppResult<Principal> {
        let claimed = self.token_issuer.verify(token)?;
        let user_id = UserId::new(claimed.user_id());

        let mut transaction = self.store.begin().await?;
        let stored = transaction
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("principal no longer exists".to_owned()))?;

        if stored.session_token.as_deref() != Some(token) {
            return Err(AppError::Unauthorized(
                "session is no longer active".to_owned(),
            ));
        }

        Ok(Principal::new(user_id.as_i64(), stored.user.email().as_str()))
    }
}
