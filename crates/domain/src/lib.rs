//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod access;
mod document;
mod ids;
mod permission;
mod role;
mod user;

pub use access::{AccessDecision, AccessRequirement, DenyReason, HeldAccess, ResolvedRequirement};
pub use document::Document;
pub use ids::{DocumentId, PermissionId, RoleId, UserId};
pub use permission::Permission;
pub use role::Role;
pub use user::{
    EmailAddress, NAME_MAX_LENGTH, PASSWORD_MAX_LENGTH, PASSWORD_MIN_LENGTH, PersonName, User,
    validate_password,
};

/// Trims an optional free-text field, collapsing blank input to `None`.
pub(crate) fn normalize_optional_text(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim().to_owned();
        (!trimmed.is_empty()).then_some(trimmed)
    })
}
