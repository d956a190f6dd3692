//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::user::{EmailAddress, NewUser, User};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user store connection failed: {message}",
        /// The email is already registered; signup must fail with a
        /// client error rather than a server error.
        DuplicateEmail { email: String } => "email already registered: {email}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user store query failed: {message}",
    }
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new user and return the stored record with its identifier.
    async fn insert(&self, user: NewUser) -> Result<User, UserPersistenceError>;

    /// Fetch a user by unique email.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError>;
}
