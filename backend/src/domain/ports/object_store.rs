//! Port abstraction for object-storage adapters.
//!
//! Two write paths share this port: issuing a time-limited write grant the
//! client consumes directly, and the server-mediated path where the backend
//! streams the bytes itself. Grant issuance is local computation (key
//! derivation plus signing); only `put_object` performs I/O.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::UploadGrant;

use super::define_port_error;

define_port_error! {
    /// Failures raised by object-store adapters.
    pub enum ObjectStoreError {
        /// The request never reached the store or the transport failed.
        Request { message: String } => "object store request failed: {message}",
        /// The store answered with a non-success status.
        Rejected { key: String, status: u16 } => "object store rejected write of {key}: status {status}",
    }
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Issue a single-use write grant for a client-side upload.
    ///
    /// Derives a fresh key from `filename` and `now`, binds the write URL to
    /// that key and `content_type`, and encodes the fixed validity window.
    /// The grant is not tracked afterwards.
    fn issue_grant(
        &self,
        filename: &str,
        content_type: &str,
        now: DateTime<Utc>,
    ) -> Result<UploadGrant, ObjectStoreError>;

    /// Write `bytes` under `key` with public-read visibility and return the
    /// public URL.
    async fn put_object(
        &self,
        key: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, ObjectStoreError>;

    /// Deterministic public read URL for `key`; pure computation.
    fn public_url(&self, key: &str) -> String;
}
