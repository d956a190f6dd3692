//! Domain ports: async traits implemented by outbound adapters.

mod invitation_repository;
mod macros;
mod object_store;
mod user_repository;

pub(crate) use macros::define_port_error;

pub use invitation_repository::{
    InvitationPersistenceError, InvitationRepository, MutationOutcome,
};
pub use object_store::{ObjectStore, ObjectStoreError};
pub use user_repository::{UserPersistenceError, UserRepository};
