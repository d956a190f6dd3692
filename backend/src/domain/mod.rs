//! Domain primitives and aggregates.
//!
//! Purpose: define strongly typed entities used by the API and persistence
//! layers, keep them immutable where the data model says so, and document
//! invariants and serialisation contracts in each type's Rustdoc. The
//! `ports` submodule holds the async traits outbound adapters implement.

pub mod auth;
pub mod countdown;
pub mod error;
pub mod invitation;
pub mod ports;
pub mod record_id;
pub mod slug;
pub mod token;
pub mod upload;
pub mod user;

pub use self::auth::{CredentialValidationError, LoginCredentials, SignupCredentials};
pub use self::countdown::Countdown;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::invitation::{
    GalleryItem, Invitation, InvitationDraft, InvitationPatch, InvitationValidationError,
};
pub use self::record_id::{RecordId, RecordIdError};
pub use self::slug::{slugify, Slug, SlugError};
pub use self::token::{Claims, TokenError, TokenSigner, TOKEN_VALIDITY_DAYS};
pub use self::upload::{
    derive_object_key, random_disambiguator, sanitize_filename, UploadGrant, GRANT_VALIDITY_SECS,
};
pub use self::user::{EmailAddress, NewUser, User, UserName, UserValidationError};

/// Convenient result alias for fallible domain operations surfaced to
/// adapters.
pub type ApiResult<T> = Result<T, Error>;
