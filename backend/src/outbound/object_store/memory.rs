//! In-memory object store recording writes for assertions.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{ObjectStore, ObjectStoreError};
use crate::domain::{derive_object_key, random_disambiguator, UploadGrant, GRANT_VALIDITY_SECS};

const BASE_URL: &str = "https://assets.test";

/// [`ObjectStore`] that keeps `(key, content type, byte count)` tuples in
/// memory instead of talking to a backing service.
#[derive(Default)]
pub struct MemoryObjectStore {
    stored: Mutex<Vec<(String, String, usize)>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded writes in the order they happened.
    pub fn stored(&self) -> Vec<(String, String, usize)> {
        match self.stored.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    fn issue_grant(
        &self,
        filename: &str,
        _content_type: &str,
        now: DateTime<Utc>,
    ) -> Result<UploadGrant, ObjectStoreError> {
        let key = derive_object_key(filename, now.timestamp_millis(), &random_disambiguator());
        Ok(UploadGrant {
            url: format!("{BASE_URL}/{key}?X-Amz-Expires={GRANT_VALIDITY_SECS}"),
            public_url: self.public_url(&key),
            key,
        })
    }

    async fn put_object(
        &self,
        key: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, ObjectStoreError> {
        let mut stored = self.stored.lock().map_err(|_| ObjectStoreError::Request {
            message: "object store mutex poisoned".to_owned(),
        })?;
        stored.push((key.to_owned(), content_type.to_owned(), bytes.len()));
        Ok(self.public_url(key))
    }

    fn public_url(&self, key: &str) -> String {
        format!("{BASE_URL}/{key}")
    }
}
