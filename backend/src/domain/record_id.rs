//! Document-store record identifiers.
//!
//! Record identifiers are 24-character hexadecimal strings, matching the
//! object-id format of the document store. The same shape test drives the
//! public resolver's id-versus-slug dispatch: an identifier that looks like a
//! record id is tried as one first, anything else goes straight to slug
//! lookup.

use std::fmt;

use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Length of a record identifier in hexadecimal characters.
pub const RECORD_ID_LEN: usize = 24;

/// Validation errors returned by [`RecordId::new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordIdError {
    #[error("record id must be exactly {RECORD_ID_LEN} hexadecimal characters")]
    InvalidFormat,
}

/// Stable record identifier stored as a 24-character hex string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecordId(String);

impl RecordId {
    /// Validate and construct a [`RecordId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, RecordIdError> {
        Self::from_owned(id.as_ref().to_owned())
    }

    /// Generate a new random identifier (12 random bytes, hex encoded).
    pub fn generate() -> Self {
        let mut bytes = [0_u8; RECORD_ID_LEN / 2];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    /// Return `true` when `value` has the shape of a record identifier.
    pub fn is_candidate(value: &str) -> bool {
        value.len() == RECORD_ID_LEN && value.chars().all(|ch| ch.is_ascii_hexdigit())
    }

    fn from_owned(id: String) -> Result<Self, RecordIdError> {
        if !Self::is_candidate(&id) {
            return Err(RecordIdError::InvalidFormat);
        }
        Ok(Self(id))
    }
}

impl AsRef<str> for RecordId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<RecordId> for String {
    fn from(value: RecordId) -> Self {
        value.0
    }
}

impl TryFrom<String> for RecordId {
    type Error = RecordIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}
