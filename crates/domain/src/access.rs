//! Access requirements and the pure authorization decision procedure.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{PermissionId, RoleId};

/// Declarative requirement attached to a guarded operation.
///
/// Names are resolved to ids at decision time; names that match nothing
/// simply never grant access.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRequirement {
    required_roles: Vec<String>,
    required_permissions: Vec<String>,
    strict_role: bool,
    strict_permission: bool,
}

impl AccessRequirement {
    /// Creates an empty requirement, which no principal satisfies.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requirement satisfied by holding any one of `roles`.
    #[must_use]
    pub fn any_role<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new().with_roles(roles)
    }

    /// Adds accepted role names.
    #[must_use]
    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_roles.extend(roles.into_iter().map(Into::into));
        self
    }

    /// Adds accepted permission names.
    #[must_use]
    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_permissions
            .extend(permissions.into_iter().map(Into::into));
        self
    }

    /// Decides on roles alone, ignoring permissions.
    #[must_use]
    pub fn strict_role(mut self) -> Self {
        self.strict_role = true;
        self
    }

    /// Decides on permissions alone, unless strict role is also set.
    #[must_use]
    pub fn strict_permission(mut self) -> Self {
        self.strict_permission = true;
        self
    }

    /// Returns the accepted role names.
    #[must_use]
    pub fn required_roles(&self) -> &[String] {
        &self.required_roles
    }

    /// Returns the accepted permission names.
    #[must_use]
    pub fn required_permissions(&self) -> &[String] {
        &self.required_permissions
    }

    /// Returns whether role-only evaluation is requested.
    #[must_use]
    pub fn is_strict_role(&self) -> bool {
        self.strict_role
    }

    /// Returns whether permission-only evaluation is requested.
    #[must_use]
    pub fn is_strict_permission(&self) -> bool {
        self.strict_permission
    }

    /// Binds resolved ids to this requirement's evaluation mode.
    #[must_use]
    pub fn resolve(
        &self,
        role_ids: BTreeSet<RoleId>,
        permission_ids: BTreeSet<PermissionId>,
    ) -> ResolvedRequirement {
        ResolvedRequirement {
            role_ids,
            permission_ids,
            strict_role: self.strict_role,
            strict_permission: self.strict_permission,
        }
    }
}

/// Requirement whose names have been resolved to stored ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRequirement {
    role_ids: BTreeSet<RoleId>,
    permission_ids: BTreeSet<PermissionId>,
    strict_role: bool,
    strict_permission: bool,
}

/// Roles and effective permissions currently held by a principal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeldAccess {
    role_ids: BTreeSet<RoleId>,
    permission_ids: BTreeSet<PermissionId>,
}

impl HeldAccess {
    /// Creates a snapshot of held role and permission ids.
    #[must_use]
    pub fn new(
        role_ids: impl IntoIterator<Item = RoleId>,
        permission_ids: impl IntoIterator<Item = PermissionId>,
    ) -> Self {
        Self {
            role_ids: role_ids.into_iter().collect(),
            permission_ids: permission_ids.into_iter().collect(),
        }
    }

    fn holds_any_role(&self, wanted: &BTreeSet<RoleId>) -> bool {
        !self.role_ids.is_disjoint(wanted)
    }

    fn holds_any_permission(&self, wanted: &BTreeSet<PermissionId>) -> bool {
        !self.permission_ids.is_disjoint(wanted)
    }
}

/// Why a principal was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// Strict role mode and no required role is held.
    MissingRole,
    /// Strict permission mode and no required permission is held.
    MissingPermission,
    /// Neither a required role nor a required permission is held.
    MissingRoleOrPermission,
}

impl DenyReason {
    /// Returns a caller-facing explanation.
    #[must_use]
    pub fn message(&self) -> &'static str {
        match self {
            Self::MissingRole => "missing required role",
            Self::MissingPermission => "missing required permission",
            Self::MissingRoleOrPermission => "missing required role or permission",
        }
    }
}

/// Outcome of evaluating a requirement against held access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    /// Access granted.
    Allow,
    /// Access denied for the given reason.
    Deny(DenyReason),
}

impl AccessDecision {
    /// Evaluates `requirement` against `held`.
    ///
    /// Strict role takes precedence over strict permission; without either
    /// flag a single matching role or permission suffices.
    #[must_use]
    pub fn evaluate(requirement: &ResolvedRequirement, held: &HeldAccess) -> Self {
        if requirement.strict_role {
            return Self::allow_if(
                held.holds_any_role(&requirement.role_ids),
                DenyReason::MissingRole,
            );
        }

        if requirement.strict_permission {
            return Self::allow_if(
                held.holds_any_permission(&requirement.permission_ids),
                DenyReason::MissingPermission,
            );
        }

        Self::allow_if(
            held.holds_any_role(&requirement.role_ids)
                || held.holds_any_permission(&requirement.permission_ids),
            DenyReason::MissingRoleOrPermission,
        )
    }

    /// Returns whether access was granted.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    fn allow_if(condition: bool, reason: DenyReason) -> Self {
        if condition {
            Self::Allow
        } else {
            Self::Deny(reason)
        }
    }
}
