//! Persistence adapters.

pub mod memory;
pub mod mongo;

pub use memory::{MemoryInvitationRepository, MemoryUserRepository};
pub use mongo::{MongoInvitationRepository, MongoUserRepository};
