use std::sync::Arc;

use rolegate_application::{
    AccessGuard, AuthService, DocumentRepository, DocumentService, IdentityService, IdentityStore,
    PasswordHasher, RoleRevocation, SyncService, TokenIssuer,
};
use rolegate_core::AppError;
use rolegate_infrastructure::{
    Argon2PasswordHasher, JwtTokenService, PostgresDocumentRepository, PostgresIdentityStore,
};
use sqlx::PgPool;

use crate::access_policy::AccessPolicy;
use crate::api_config::ApiConfig;
use crate::state::AppState;

/// Port implementations the services are wired against.
pub struct Adapters {
    pub identity_store: Arc<dyn IdentityStore>,
    pub document_repository: Arc<dyn DocumentRepository>,
    pub password_hasher: Arc<dyn PasswordHasher>,
    pub token_issuer: Arc<dyn TokenIssuer>,
}

/// Role settings shared by the services and the access policy.
pub struct RoleSettings<'a> {
    pub default_role_name: &'a str,
    pub admin_role_names: &'a [String],
    pub revocation: RoleRevocation,
}

pub fn build_app_state(pool: PgPool, config: &ApiConfig) -> Result<AppState, AppError> {
    let token_issuer = JwtTokenService::new(
        &config.jwt_secret,
        config.jwt_issuer.clone(),
        config.jwt_ttl,
    )?;

    let adapters = Adapters {
        identity_store: Arc::new(PostgresIdentityStore::new(pool.clone())),
        document_repository: Arc::new(PostgresDocumentRepository::new(pool)),
        password_hasher: Arc::new(Argon2PasswordHasher::new()),
        token_issuer: Arc::new(token_issuer),
    };

    Ok(assemble_state(
        adapters,
        &RoleSettings {
            default_role_name: &config.default_role_name,
            admin_role_names: &config.admin_role_names,
            revocation: config.role_revocation,
        },
    ))
}

pub fn assemble_state(adapters: Adapters, settings: &RoleSettings<'_>) -> AppState {
    let identity_service = IdentityService::new(
        adapters.identity_store.clone(),
        adapters.password_hasher.clone(),
        settings.default_role_name,
    );

    AppState {
        sync_service: SyncService::new(adapters.identity_store.clone(), settings.revocation),
        access_guard: AccessGuard::new(adapters.identity_store.clone()),
        auth_service: AuthService::new(
            adapters.identity_store,
            identity_service.clone(),
            adapters.password_hasher,
            adapters.token_issuer,
        ),
        document_service: DocumentService::new(adapters.document_repository),
        access_policy: Arc::new(AccessPolicy::with_admin_roles(settings.admin_role_names)),
        identity_service,
    }
}
