//! Port abstraction for invitation persistence adapters.
//!
//! Mutations return a tagged [`MutationOutcome`] so callers and tests can
//! tell "record absent" apart from "record exists but is not yours". The
//! HTTP layer may still mask the distinction outwardly; the port does not.

use async_trait::async_trait;

use crate::domain::{Invitation, InvitationPatch, RecordId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by invitation repository adapters.
    pub enum InvitationPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "invitation store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "invitation store query failed: {message}",
    }
}

/// Result of an owner-scoped update or delete.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome {
    /// The mutation matched and the record (post-update, or as deleted) is
    /// returned.
    Applied(Invitation),
    /// No record with the given identifier exists.
    NotFound,
    /// The record exists but belongs to a different owner; nothing changed.
    Forbidden,
}

#[async_trait]
pub trait InvitationRepository: Send + Sync {
    /// Persist a freshly created invitation.
    async fn insert(&self, invitation: Invitation)
        -> Result<Invitation, InvitationPersistenceError>;

    /// All invitations owned by `owner`, newest first.
    async fn list_by_owner(
        &self,
        owner: &RecordId,
    ) -> Result<Vec<Invitation>, InvitationPersistenceError>;

    /// Resolve a public identifier: identifiers shaped like a record id are
    /// tried as one first and fall back to slug lookup on a miss; anything
    /// else goes straight to slug lookup. First match wins.
    async fn find_by_id_or_slug(
        &self,
        identifier: &str,
    ) -> Result<Option<Invitation>, InvitationPersistenceError>;

    /// Apply `patch` to the record only when `owner` matches.
    async fn update(
        &self,
        owner: &RecordId,
        id: &RecordId,
        patch: InvitationPatch,
    ) -> Result<MutationOutcome, InvitationPersistenceError>;

    /// Delete the record only when `owner` matches.
    async fn delete(
        &self,
        owner: &RecordId,
        id: &RecordId,
    ) -> Result<MutationOutcome, InvitationPersistenceError>;
}
