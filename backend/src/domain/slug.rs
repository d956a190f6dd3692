//! Slug derivation for public invitation links.
//!
//! A slug is derived exactly once at creation time: the lower-cased title
//! with every maximal run of non-alphanumeric characters collapsed into a
//! single hyphen, followed by a time-based suffix (the last six base-36
//! digits of the creation timestamp in milliseconds). Slugs are immutable
//! afterwards; uniqueness rests on the timestamp entropy and is not
//! re-checked against the store.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Fallback slug stem used when a title contains no alphanumeric characters.
const EMPTY_TITLE_STEM: &str = "evento";

/// Number of base-36 digits kept from the timestamp suffix.
const SUFFIX_LEN: usize = 6;

/// Validation errors returned by [`Slug::new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlugError {
    #[error("slug must be non-empty lowercase ASCII letters, digits, or hyphens")]
    InvalidFormat,
}

/// Public, URL-safe identifier for an invitation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Slug(String);

impl Slug {
    /// Validate and construct a [`Slug`] from stored input.
    pub fn new(value: impl Into<String>) -> Result<Self, SlugError> {
        let value = value.into();
        if !is_valid_slug(&value) {
            return Err(SlugError::InvalidFormat);
        }
        Ok(Self(value))
    }

    /// Derive the slug for a new invitation from its title and creation time.
    pub fn derive(title: &str, created_at_millis: i64) -> Self {
        let stem = slugify(title);
        let stem = if stem.is_empty() {
            EMPTY_TITLE_STEM
        } else {
            stem.as_str()
        };
        Self(format!("{stem}-{}", timestamp_suffix(created_at_millis)))
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Slug> for String {
    fn from(value: Slug) -> Self {
        value.0
    }
}

impl TryFrom<String> for Slug {
    type Error = SlugError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Lower-case `title` and collapse each maximal run of non-alphanumeric
/// characters into a single hyphen, trimming leading and trailing hyphens.
pub fn slugify(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut pending_hyphen = false;
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !out.is_empty() {
                out.push('-');
            }
            pending_hyphen = false;
            out.extend(ch.to_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    out
}

/// Last [`SUFFIX_LEN`] base-36 digits of the timestamp in milliseconds.
fn timestamp_suffix(millis: i64) -> String {
    let encoded = base36(millis.unsigned_abs());
    let skip = encoded.chars().count().saturating_sub(SUFFIX_LEN);
    encoded.chars().skip(skip).collect()
}

fn base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_owned();
    }
    let mut out = Vec::new();
    while value > 0 {
        let digit = DIGITS[(value % 36) as usize];
        out.push(char::from(digit));
        value /= 36;
    }
    out.iter().rev().collect()
}

fn is_valid_slug(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-')
}
