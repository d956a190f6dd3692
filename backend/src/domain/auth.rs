//! Authentication primitives: signup and login credentials.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use zeroize::Zeroizing;

use crate::domain::user::{EmailAddress, UserName, UserValidationError};

/// Domain error returned when credential payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialValidationError {
    #[error(transparent)]
    User(#[from] UserValidationError),
    #[error("password must not be empty")]
    EmptyPassword,
}

/// Validated signup payload.
///
/// ## Invariants
/// - `name` and `email` satisfy the user field rules.
/// - `password` is non-empty but retains caller-provided whitespace to avoid
///   surprising credential comparisons.
#[derive(Debug, Clone)]
pub struct SignupCredentials {
    name: UserName,
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl SignupCredentials {
    /// Construct credentials from raw signup inputs.
    pub fn try_from_parts(
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Self, CredentialValidationError> {
        if password.is_empty() {
            return Err(CredentialValidationError::EmptyPassword);
        }
        Ok(Self {
            name: UserName::new(name)?,
            email: EmailAddress::new(email)?,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Validated name.
    pub fn name(&self) -> &UserName {
        &self.name
    }

    /// Validated email.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Validated login payload.
#[derive(Debug, Clone)]
pub struct LoginCredentials {
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw login inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, CredentialValidationError> {
        if password.is_empty() {
            return Err(CredentialValidationError::EmptyPassword);
        }
        Ok(Self {
            email: EmailAddress::new(email)?,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Email used for the user lookup.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}
