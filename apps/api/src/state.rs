use std::sync::Arc;

use rolegate_application::{AccessGuard, AuthService, DocumentService, IdentityService, SyncService};

use crate::access_policy::AccessPolicy;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub identity_service: IdentityService,
    pub sync_service: SyncService,
    pub access_guard: AccessGuard,
    pub auth_service: AuthService,
    pub document_service: DocumentService,
    pub access_policy: Arc<AccessPolicy>,
}
