//! User domain types and validation rules.
//!
//! Password strength follows the OWASP Authentication cheat sheet.

use rolegate_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

use crate::UserId;

/// Validated email address, normalized to lower case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a validated email address.
    ///
    /// Performs structural validation only: exactly one `@`, non-empty local
    /// part, and a domain containing at least one `.`.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let normalized = value.trim().to_lowercase();

        if normalized.is_empty() {
            return Err(AppError::Validation(
                "email address must not be empty".to_owned(),
            ));
        }

        let Some((local, domain)) = normalized.split_once('@') else {
            return Err(AppError::Validation(
                "email address must contain exactly one '@'".to_owned(),
            ));
        };

        if domain.contains('@') {
            return Err(AppError::Validation(
                "email address must contain exactly one '@'".to_owned(),
            ));
        }

        if local.is_empty() {
            return Err(AppError::Validation(
                "email local part must not be empty".to_owned(),
            ));
        }

        if domain.is_empty() || !domain.contains('.') {
            return Err(AppError::Validation(
                "email domain must contain at least one '.'".to_owned(),
            ));
        }

        if normalized.len() > 254 {
            return Err(AppError::Validation(
                "email address must not exceed 254 characters".to_owned(),
            ));
        }

        Ok(Self(normalized))
    }

    /// Returns the normalized email string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

/// Maximum length of a first or last name.
pub const NAME_MAX_LENGTH: usize = 255;

/// Validated first or last name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PersonName(NonEmptyString);

impl PersonName {
    /// Creates a validated name, reporting `field` in validation errors.
    pub fn new(field: &str, value: impl Into<String>) -> AppResult<Self> {
        let value = NonEmptyString::for_field(field, value)?;
        if value.as_str().chars().count() > NAME_MAX_LENGTH {
            return Err(AppError::Validation(format!(
                "{field} must not exceed {NAME_MAX_LENGTH} characters"
            )));
        }

        Ok(Self(value))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Minimum accepted password length.
pub const PASSWORD_MIN_LENGTH: usize = 8;

/// Maximum password length (bounds Argon2id work per request).
pub const PASSWORD_MAX_LENGTH: usize = 128;

/// Validates a plaintext password.
///
/// Rejects passwords shorter than [`PASSWORD_MIN_LENGTH`], longer than
/// [`PASSWORD_MAX_LENGTH`], or present in an embedded breached list.
pub fn validate_password(password: &str) -> AppResult<()> {
    let char_count = password.chars().count();

    if char_count < PASSWORD_MIN_LENGTH {
        return Err(AppError::Validation(format!(
            "password must be at least {PASSWORD_MIN_LENGTH} characters"
        )));
    }

    if char_count > PASSWORD_MAX_LENGTH {
        return Err(AppError::Validation(format!(
            "password must not exceed {PASSWORD_MAX_LENGTH} characters"
        )));
    }

    if is_common_password(password) {
        return Err(AppError::Validation(
            "this password is too common and has appeared in data breaches".to_owned(),
        ));
    }

    Ok(())
}

fn is_common_password(password: &str) -> bool {
    let lowered = password.to_lowercase();
    COMMON_PASSWORDS.iter().any(|entry| *entry == lowered)
}

static COMMON_PASSWORDS: &[&str] = &[
    "password",
    "password1",
    "password123",
    "passw0rd",
    "12345678",
    "123456789",
    "1234567890",
    "87654321",
    "qwertyuiop",
    "qwerty123",
    "iloveyou",
    "trustno1",
    "sunshine",
    "princess",
    "football",
    "baseball",
    "superman",
    "starwars",
    "letmein1",
    "welcome1",
    "whatever",
    "11111111",
    "00000000",
    "abcd1234",
    "changeme",
];

/// Registered account holder. Credentials live outside the entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    email: EmailAddress,
    firstname: PersonName,
    lastname: PersonName,
}

impl User {
    /// Creates a validated user entity.
    pub fn new(
        id: UserId,
        email: impl Into<String>,
        firstname: impl Into<String>,
        lastname: impl Into<String>,
    ) -> AppResult<Self> {
        Ok(Self {
            id,
            email: EmailAddress::new(email)?,
            firstname: PersonName::new("firstname", firstname)?,
            lastname: PersonName::new("lastname", lastname)?,
        })
    }

    /// Returns the stable identifier.
    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Returns the normalized email address.
    #[must_use]
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Returns the first name.
    #[must_use]
    pub fn firstname(&self) -> &PersonName {
        &self.firstname
    }

    /// Returns the last name.
    #[must_use]
    pub fn lastname(&self) -> &PersonName {
        &self.lastname
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn valid_email_is_normalized() {
        let email = EmailAddress::new("  Ada@Example.COM ");
        assert_eq!(
            email.map(String::from).unwrap_or_default(),
            "ada@example.com"
        );
    }

    #[test]
    fn email_with_two_at_signs_is_rejected() {
        assert!(EmailAddress::new("a@b@example.com").is_err());
    }

    #[test]
    fn email_without_domain_dot_is_rejected() {
        assert!(EmailAddress::new("user@localhost").is_err());
    }

    #[test]
    fn blank_firstname_names_the_field() {
        let result = User::new(UserId::new(1), "a@example.com", " ", "Lovelace");
        assert!(matches!(result, Err(AppError::Validation(message)) if message.contains("firstname")));
    }

    #[test]
    fn overlong_name_is_rejected() {
        let name = "x".repeat(NAME_MAX_LENGTH + 1);
        assert!(PersonName::new("lastname", name).is_err());
    }

    #[test]
    fn seven_character_password_is_rejected() {
        assert!(validate_password("s3cr3t!").is_err());
    }

    #[test]
    fn eight_character_password_is_accepted() {
        assert!(validate_password("g00dPa5s").is_ok());
    }

    #[test]
    fn common_password_is_rejected_case_insensitively() {
        assert!(validate_password("PassWord123").is_err());
    }

    #[test]
    fn overlong_password_is_rejected() {
        let long = "a".repeat(PASSWORD_MAX_LENGTH + 1);
        assert!(validate_password(&long).is_err());
    }

    proptest! {
        #[test]
        fn accepted_emails_are_lowercase_and_trimmed(
            local in "[A-Za-z0-9]{1,16}",
            domain in "[A-Za-z]{1,12}",
            padding in " {0,3}",
        ) {
            let raw = format!("{padding}{local}@{domain}.Org{padding}");
            let email = EmailAddress::new(raw);
            prop_assert!(email.is_ok());
            let email = email.map(String::from).unwrap_or_default();
            prop_assert_eq!(email.clone(), email.trim().to_lowercase());
        }
    }
}
