//! Object-key derivation and upload grants.
//!
//! Both upload modes share one key scheme:
//! `uploads/<millis>-<disambiguator>-<sanitised filename>`. The timestamp
//! prefix and random disambiguator keep keys collision-free and never
//! reused; sanitisation strips everything outside `[A-Za-z0-9.-]` so a
//! client-chosen filename cannot influence the key path.

use rand::RngCore;
use serde::Serialize;

/// Validity window of a write grant, in seconds.
pub const GRANT_VALIDITY_SECS: u64 = 3600;

/// Prefix under which all uploaded objects are keyed.
const KEY_PREFIX: &str = "uploads";

/// Fallback stem when sanitisation leaves nothing of the filename.
const EMPTY_NAME_STEM: &str = "file";

/// Ephemeral write authorisation for one object.
///
/// Never persisted or tracked: the server does not learn whether the grant
/// was consumed. An abandoned grant simply expires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadGrant {
    /// Time-limited write-capable URL bound to `key` and the content type.
    pub url: String,
    /// Server-chosen storage key.
    pub key: String,
    /// Deterministic public read URL for the stored object.
    pub public_url: String,
}

/// Strip every character outside `[A-Za-z0-9.-]` from `filename`.
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || *ch == '.' || *ch == '-')
        .collect()
}

/// Derive the storage key for an uploaded file.
pub fn derive_object_key(filename: &str, millis: i64, disambiguator: &str) -> String {
    let sanitized = sanitize_filename(filename);
    let stem = if sanitized.is_empty() {
        EMPTY_NAME_STEM
    } else {
        sanitized.as_str()
    };
    format!("{KEY_PREFIX}/{millis}-{disambiguator}-{stem}")
}

/// Short random hex string separating keys derived in the same millisecond.
pub fn random_disambiguator() -> String {
    let mut bytes = [0_u8; 4];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("photo.jpg", "photo.jpg")]
    #[case("mi foto (1).jpg", "mifoto1.jpg")]
    #[case("../../etc/passwd", "....etcpasswd")]
    #[case("canción.mp3", "cancin.mp3")]
    #[case("ñ ñ ñ", "")]
    fn sanitisation_strips_disallowed_characters(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(sanitize_filename(input), expected);
    }

    #[test]
    fn key_scheme_concatenates_prefix_timestamp_and_name() {
        let key = derive_object_key("photo.jpg", 1_700_000_000_000, "a1b2c3d4");
        assert_eq!(key, "uploads/1700000000000-a1b2c3d4-photo.jpg");
    }

    #[test]
    fn key_scheme_survives_fully_stripped_names() {
        let key = derive_object_key("ñññ", 1_700_000_000_000, "a1b2c3d4");
        assert_eq!(key, "uploads/1700000000000-a1b2c3d4-file");
    }

    #[test]
    fn disambiguators_differ_between_calls() {
        assert_ne!(random_disambiguator(), random_disambiguator());
    }

    #[test]
    fn grant_serialises_camel_case() {
        let grant = UploadGrant {
            url: "https://bucket.s3.eu-west-1.amazonaws.com/k?X-Amz-Expires=3600".to_owned(),
            key: "uploads/1-2-a.jpg".to_owned(),
            public_url: "https://bucket.s3.eu-west-1.amazonaws.com/uploads/1-2-a.jpg".to_owned(),
        };
        let value = serde_json::to_value(&grant).expect("serialise");
        assert!(value.get("publicUrl").is_some());
        assert!(value.get("public_url").is_none());
    }
}
