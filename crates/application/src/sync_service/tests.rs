use std::sync::Arc;

use async_trait::async_trait;
use rolegate_core::{AppError, AppResult};
use rolegate_domain::{PermissionId, RoleId, UserId};

use crate::{IdentityStore, IdentityTransaction};

use super::{RoleRevocation, SyncService};

struct UnavailableStore {
    failure: fn() -> AppError,
}

#[async_trait]
impl IdentityStore for UnavailableStore {
    async fn begin(&self) -> AppResult<Box<dyn IdentityTransaction>> {
        Err((self.failure)())
    }
}

fn service(failure: fn() -> AppError) -> SyncService {
    SyncService::new(Arc::new(UnavailableStore { failure }), RoleRevocation::Cascade)
}

#[tokio::test]
async fn storage_failures_are_wrapped_as_sync_errors() {
    let service = service(|| AppError::Persistence("connection reset".to_owned()));

    let result = service
        .assign_role_to_user(RoleId::new(4), UserId::new(9))
        .await;

    match result {
        Err(AppError::Sync(message)) => {
            assert!(message.contains("assign role to user"));
            assert!(message.contains("role 4, user 9"));
            assert!(message.contains("connection reset"));
        }
        other => panic!("expected sync error, got {other:?}"),
    }
}

#[tokio::test]
async fn client_errors_pass_through_unchanged() {
    let service = service(|| AppError::NotFound("role '4' does not exist".to_owned()));

    let result = service
        .sync_role_permissions(RoleId::new(4), &[PermissionId::new(1)])
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn propagation_failures_are_wrapped() {
    let service = service(|| AppError::Internal("pool closed".to_owned()));

    let result = service
        .propagate_role_permissions(RoleId::new(1), &[PermissionId::new(2)])
        .await;

    assert!(matches!(result, Err(AppError::Sync(_))));
}

#[test]
fn revocation_policy_parses_configuration_values() {
    assert_eq!("cascade".parse::<RoleRevocation>().ok(), Some(RoleRevocation::Cascade));
    assert_eq!(
        " keep_shared ".parse::<RoleRevocation>().ok(),
        Some(RoleRevocation::KeepShared)
    );
    assert!("strict".parse::<RoleRevocation>().is_err());
    assert_eq!(RoleRevocation::default(), RoleRevocation::Cascade);
}
