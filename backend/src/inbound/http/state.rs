//! Shared application state injected into HTTP handlers.

use std::sync::Arc;

use crate::domain::ports::{InvitationRepository, ObjectStore, UserRepository};
use crate::domain::TokenSigner;

/// Handler dependencies, cloned per worker by actix.
///
/// The object store is optional; when storage is not configured the upload
/// endpoints answer with a configuration error instead of failing at
/// startup.
#[derive(Clone)]
pub struct HttpState {
    users: Arc<dyn UserRepository>,
    invitations: Arc<dyn InvitationRepository>,
    object_store: Option<Arc<dyn ObjectStore>>,
    tokens: Arc<TokenSigner>,
}

impl HttpState {
    pub fn new(
        users: Arc<dyn UserRepository>,
        invitations: Arc<dyn InvitationRepository>,
        object_store: Option<Arc<dyn ObjectStore>>,
        tokens: Arc<TokenSigner>,
    ) -> Self {
        Self {
            users,
            invitations,
            object_store,
            tokens,
        }
    }

    pub fn users(&self) -> &dyn UserRepository {
        self.users.as_ref()
    }

    pub fn invitations(&self) -> &dyn InvitationRepository {
        self.invitations.as_ref()
    }

    pub fn object_store(&self) -> Option<&dyn ObjectStore> {
        self.object_store.as_deref()
    }

    pub fn tokens(&self) -> &TokenSigner {
        self.tokens.as_ref()
    }
}
