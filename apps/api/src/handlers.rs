pub mod auth;
pub mod documents;
pub mod health;
pub mod permissions;
pub mod roles;
pub mod users;

#[cfg(test)]
mod tests;
