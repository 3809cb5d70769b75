//! Declarative table of which guarded operation needs which access.

use std::collections::BTreeMap;

use rolegate_core::{AppResult, Principal};
use rolegate_domain::AccessRequirement;
use tracing::debug;

use crate::state::AppState;

/// Operations exposed by the HTTP API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Operation {
    CreateUser,
    ListUsers,
    ReadUser,
    UpdateUser,
    DeleteUser,
    CreateRole,
    ListRoles,
    ReadRole,
    UpdateRole,
    DeleteRole,
    AssignRoleToUser,
    UnassignRoleFromUser,
    CreatePermission,
    ListPermissions,
    ReadPermission,
    UpdatePermission,
    DeletePermission,
    AssignPermissionToUser,
    UnassignPermissionFromUser,
    SyncUserPermissions,
    AssignPermissionToRole,
    UnassignPermissionFromRole,
    SyncRolePermissions,
    CreateDocument,
    ListDocuments,
    ReadDocument,
    UpdateDocument,
    DeleteDocument,
}

impl Operation {
    pub const ALL: [Self; 28] = [
        Self::CreateUser,
        Self::ListUsers,
        Self::ReadUser,
        Self::UpdateUser,
        Self::DeleteUser,
        Self::CreateRole,
        Self::ListRoles,
        Self::ReadRole,
        Self::UpdateRole,
        Self::DeleteRole,
        Self::AssignRoleToUser,
        Self::UnassignRoleFromUser,
        Self::CreatePermission,
        Self::ListPermissions,
        Self::ReadPermission,
        Self::UpdatePermission,
        Self::DeletePermission,
        Self::AssignPermissionToUser,
        Self::UnassignPermissionFromUser,
        Self::SyncUserPermissions,
        Self::AssignPermissionToRole,
        Self::UnassignPermissionFromRole,
        Self::SyncRolePermissions,
        Self::CreateDocument,
        Self::ListDocuments,
        Self::ReadDocument,
        Self::UpdateDocument,
        Self::DeleteDocument,
    ];

    fn is_open_to_any_principal(self) -> bool {
        matches!(
            self,
            Self::ReadUser
                | Self::ListPermissions
                | Self::ReadPermission
                | Self::CreateDocument
                | Self::ListDocuments
        )
    }
}

/// Requirement per operation. Operations without an entry are unguarded.
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    requirements: BTreeMap<Operation, AccessRequirement>,
}

impl AccessPolicy {
    /// Guards every administrative operation with any one of `admin_roles`.
    #[must_use]
    pub fn with_admin_roles(admin_roles: &[String]) -> Self {
        let admin = AccessRequirement::any_role(admin_roles.iter().cloned());
        let requirements = Operation::ALL
            .into_iter()
            .filter(|operation| !operation.is_open_to_any_principal())
            .map(|operation| (operation, admin.clone()))
            .collect();

        Self { requirements }
    }

    /// Returns the requirement guarding `operation`, if any.
    #[must_use]
    pub fn requirement(&self, operation: Operation) -> Option<&AccessRequirement> {
        self.requirements.get(&operation)
    }
}

/// Checks the principal against the policy entry for `operation`.
pub async fn authorize(
    state: &AppState,
    principal: &Principal,
    operation: Operation,
) -> AppResult<()> {
    let Some(requirement) = state.access_policy.requirement(operation) else {
        debug!(?operation, "operation is unguarded");
        return Ok(());
    };

    state
        .access_guard
        .authorize(Some(principal), requirement)
        .await
}

#[cfg(test)]
mod tests {
    use super::{AccessPolicy, Operation};

    #[test]
    fn administrative_operations_require_an_admin_role() {
        let admin_roles = vec!["Super Admin".to_owned(), "HR".to_owned()];
        let policy = AccessPolicy::with_admin_roles(&admin_roles);

        for operation in [
            Operation::CreateUser,
            Operation::DeleteRole,
            Operation::SyncUserPermissions,
            Operation::SyncRolePermissions,
            Operation::DeleteDocument,
        ] {
            let requirement = policy.requirement(operation);
            assert!(requirement.is_some(), "{operation:?} should be guarded");
            if let Some(requirement) = requirement {
                assert_eq!(requirement.required_roles(), admin_roles.as_slice());
                assert!(requirement.required_permissions().is_empty());
                assert!(!requirement.is_strict_role());
            }
        }
    }

    #[test]
    fn reads_and_document_submission_are_unguarded() {
        let policy = AccessPolicy::with_admin_roles(&["Super Admin".to_owned()]);

        for operation in [
            Operation::ReadUser,
            Operation::ListPermissions,
            Operation::ReadPermission,
            Operation::CreateDocument,
            Operation::ListDocuments,
        ] {
            assert!(policy.requirement(operation).is_none());
        }
    }
}
