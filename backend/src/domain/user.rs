//! User data model.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::RecordId;

/// Validation errors for user fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    #[error("name must not be empty")]
    EmptyName,
    #[error("name must be at most {max} characters")]
    NameTooLong { max: usize },
    #[error("email must not be empty")]
    EmptyEmail,
    #[error("email must contain a local part and a domain")]
    InvalidEmail,
}

/// Maximum allowed length for a user name.
pub const USER_NAME_MAX: usize = 80;

/// Human readable name supplied at signup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserName(String);

impl UserName {
    /// Validate and construct a [`UserName`].
    pub fn new(name: impl Into<String>) -> Result<Self, UserValidationError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        if trimmed.chars().count() > USER_NAME_MAX {
            return Err(UserValidationError::NameTooLong { max: USER_NAME_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserName> for String {
    fn from(value: UserName) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Unique login identifier.
///
/// ## Invariants
/// - trimmed, non-empty, and contains an `@` with characters on both sides.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and construct an [`EmailAddress`].
    pub fn new(email: impl Into<String>) -> Result<Self, UserValidationError> {
        let email = email.into();
        let trimmed = email.trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        let valid = trimmed
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());
        if !valid {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Application user.
///
/// The password hash never leaves the persistence boundary; response DTOs are
/// built from the id, name, and email accessors only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: RecordId,
    name: UserName,
    email: EmailAddress,
    password_hash: String,
}

impl User {
    /// Build a [`User`] from validated components.
    pub fn new(id: RecordId, name: UserName, email: EmailAddress, password_hash: String) -> Self {
        Self {
            id,
            name,
            email,
            password_hash,
        }
    }

    /// Stable record identifier.
    pub fn id(&self) -> &RecordId {
        &self.id
    }

    /// Name shown in responses.
    pub fn name(&self) -> &UserName {
        &self.name
    }

    /// Unique login identifier.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Salted one-way hash of the signup password.
    pub fn password_hash(&self) -> &str {
        self.password_hash.as_str()
    }
}

/// Fields persisted when creating a user; the store assigns the identifier.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: UserName,
    pub email: EmailAddress,
    pub password_hash: String,
}
