//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod argon2_password_hasher;
mod in_memory_document_repository;
mod in_memory_identity_store;
mod jwt_token_service;
mod postgres_document_repository;
mod postgres_identity_store;

pub use argon2_password_hasher::Argon2PasswordHasher;
pub use in_memory_document_repository::InMemoryDocumentRepository;
pub use in_memory_identity_store::InMemoryIdentityStore;
pub use jwt_token_service::{JWT_SECRET_MIN_LENGTH, JwtTokenService};
pub use postgres_document_repository::PostgresDocumentRepository;
pub use postgres_identity_store::{PostgresIdentityStore, PostgresIdentityTransaction};
