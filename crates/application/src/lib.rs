//! Application services and ports.

#![forbid(unsafe_code)]

mod access_guard;
mod auth_service;
mod document_service;
mod identity_ports;
mod identity_service;
mod relationships;
mod sync_service;

pub use access_guard::AccessGuard;
pub use auth_service::{AuthService, IssuedToken, LoginOutcome, TokenIssuer};
pub use document_service::{
    CreateDocumentInput, DocumentDraft, DocumentRepository, DocumentService, UpdateDocumentInput,
};
pub use identity_ports::{
    IdentityStore, IdentityTransaction, NewUserRecord, PermissionDetails, RoleDetails,
    StoredUser, UserDetails,
};
pub use identity_service::{
    CreateUserInput, IdentityService, NamedEntityInput, PasswordHasher, UpdateUserInput,
};
pub use sync_service::{RoleRevocation, SyncService};
