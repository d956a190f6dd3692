//! Invitation aggregate: the record behind a shareable public link.
//!
//! The record shape is closed: inbound payloads deserialise into
//! [`InvitationDraft`] or [`InvitationPatch`], both of which reject unknown
//! fields, so clients cannot smuggle arbitrary keys into the store. The
//! `slug` and owner reference are generated or fixed at creation time and
//! are not expressible in the patch type.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{RecordId, Slug};

/// Validation errors for invitation payloads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvitationValidationError {
    #[error("title must not be empty")]
    EmptyTitle,
}

/// One gallery entry: a display name and the public URL of the stored bytes.
///
/// The URL is an opaque asset reference produced by the upload broker; the
/// application never owns the underlying object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct GalleryItem {
    pub name: String,
    pub url: String,
}

/// Client-supplied fields for creating an invitation.
///
/// Gallery entries keep their submission order all the way into the store.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct InvitationDraft {
    pub title: String,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub description: String,
    pub date: NaiveDate,
    #[serde(with = "wall_time")]
    pub time: NaiveTime,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(default)]
    pub music_url: Option<String>,
    #[serde(default)]
    pub gallery: Vec<GalleryItem>,
}

impl InvitationDraft {
    /// Enforce field invariants before an entity is built from the draft.
    pub fn validate(&self) -> Result<(), InvitationValidationError> {
        if self.title.trim().is_empty() {
            return Err(InvitationValidationError::EmptyTitle);
        }
        Ok(())
    }
}

/// Owner-scoped partial update.
///
/// Absent fields leave the record untouched. The slug and owner reference
/// are immutable and deliberately have no counterpart here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct InvitationPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default, with = "wall_time_opt")]
    pub time: Option<NaiveTime>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(default)]
    pub music_url: Option<String>,
    #[serde(default)]
    pub gallery: Option<Vec<GalleryItem>>,
}

impl InvitationPatch {
    /// Return `true` when no field is set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.host.is_none()
            && self.description.is_none()
            && self.date.is_none()
            && self.time.is_none()
            && self.address.is_none()
            && self.lat.is_none()
            && self.lng.is_none()
            && self.music_url.is_none()
            && self.gallery.is_none()
    }
}

/// Persisted invitation record.
///
/// ## Invariants
/// - `owner_id` is non-empty and immutable after creation.
/// - `slug` is derived exactly once at creation time and never changes.
/// - `gallery` preserves client submission order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "InvitationDto")]
pub struct Invitation {
    id: RecordId,
    owner_id: RecordId,
    title: String,
    host: String,
    description: String,
    date: NaiveDate,
    time: NaiveTime,
    address: String,
    lat: Option<f64>,
    lng: Option<f64>,
    music_url: Option<String>,
    gallery: Vec<GalleryItem>,
    slug: Slug,
    created_at: DateTime<Utc>,
}

impl Invitation {
    /// Build a new invitation for `owner` from a validated draft.
    ///
    /// Generates the record id, derives the slug from the title and the
    /// creation timestamp, and stamps `created_at`.
    pub fn create(
        owner_id: RecordId,
        draft: InvitationDraft,
        now: DateTime<Utc>,
    ) -> Result<Self, InvitationValidationError> {
        draft.validate()?;
        let slug = Slug::derive(&draft.title, now.timestamp_millis());
        Ok(Self::restore(RecordId::generate(), owner_id, draft, slug, now))
    }

    /// Rebuild an invitation from stored parts.
    ///
    /// Used by persistence adapters; assumes the parts were validated when
    /// the record was first created.
    pub fn restore(
        id: RecordId,
        owner_id: RecordId,
        draft: InvitationDraft,
        slug: Slug,
        created_at: DateTime<Utc>,
    ) -> Self {
        let InvitationDraft {
            title,
            host,
            description,
            date,
            time,
            address,
            lat,
            lng,
            music_url,
            gallery,
        } = draft;
        Self {
            id,
            owner_id,
            title,
            host,
            description,
            date,
            time,
            address,
            lat,
            lng,
            music_url,
            gallery,
            slug,
            created_at,
        }
    }

    /// Apply an owner-approved patch in place; slug and owner are untouched.
    pub fn apply(&mut self, patch: InvitationPatch) {
        let InvitationPatch {
            title,
            host,
            description,
            date,
            time,
            address,
            lat,
            lng,
            music_url,
            gallery,
        } = patch;
        if let Some(title) = title {
            self.title = title;
        }
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(description) = description {
            self.description = description;
        }
        if let Some(date) = date {
            self.date = date;
        }
        if let Some(time) = time {
            self.time = time;
        }
        if let Some(address) = address {
            self.address = address;
        }
        if let Some(lat) = lat {
            self.lat = Some(lat);
        }
        if let Some(lng) = lng {
            self.lng = Some(lng);
        }
        if let Some(music_url) = music_url {
            self.music_url = Some(music_url);
        }
        if let Some(gallery) = gallery {
            self.gallery = gallery;
        }
    }

    /// Stable record identifier.
    pub fn id(&self) -> &RecordId {
        &self.id
    }

    /// Owner reference; immutable after creation.
    pub fn owner_id(&self) -> &RecordId {
        &self.owner_id
    }

    /// Event title the slug was derived from.
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    /// Event host.
    pub fn host(&self) -> &str {
        self.host.as_str()
    }

    /// Free-form description.
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Calendar date of the event.
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Wall-clock start time of the event.
    pub fn time(&self) -> NaiveTime {
        self.time
    }

    /// Venue address.
    pub fn address(&self) -> &str {
        self.address.as_str()
    }

    /// Venue latitude, when the client supplied one.
    pub fn lat(&self) -> Option<f64> {
        self.lat
    }

    /// Venue longitude, when the client supplied one.
    pub fn lng(&self) -> Option<f64> {
        self.lng
    }

    /// Optional music asset reference.
    pub fn music_url(&self) -> Option<&str> {
        self.music_url.as_deref()
    }

    /// Gallery asset references in submission order.
    pub fn gallery(&self) -> &[GalleryItem] {
        &self.gallery
    }

    /// Public link identifier.
    pub fn slug(&self) -> &Slug {
        &self.slug
    }

    /// Creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Wire form of an invitation (camelCase JSON).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct InvitationDto {
    id: String,
    owner_id: String,
    title: String,
    host: String,
    description: String,
    date: NaiveDate,
    #[serde(with = "wall_time")]
    time: NaiveTime,
    address: String,
    lat: Option<f64>,
    lng: Option<f64>,
    music_url: Option<String>,
    gallery: Vec<GalleryItem>,
    slug: String,
    created_at: DateTime<Utc>,
}

impl From<Invitation> for InvitationDto {
    fn from(value: Invitation) -> Self {
        let Invitation {
            id,
            owner_id,
            title,
            host,
            description,
            date,
            time,
            address,
            lat,
            lng,
            music_url,
            gallery,
            slug,
            created_at,
        } = value;
        Self {
            id: id.into(),
            owner_id: owner_id.into(),
            title,
            host,
            description,
            date,
            time,
            address,
            lat,
            lng,
            music_url,
            gallery,
            slug: slug.into(),
            created_at,
        }
    }
}

/// Wall-clock time codec: serialises as `HH:MM:SS`, accepts `HH:MM` too.
///
/// Browser time inputs submit minutes-only values; chrono's default codec
/// rejects them.
pub(crate) mod wall_time {
    use chrono::NaiveTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    const FULL: &str = "%H:%M:%S";
    const SHORT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FULL).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(de::Error::custom)
    }

    pub(crate) fn parse(raw: &str) -> Result<NaiveTime, String> {
        NaiveTime::parse_from_str(raw, FULL)
            .or_else(|_| NaiveTime::parse_from_str(raw, SHORT))
            .map_err(|_| format!("invalid wall-clock time: {raw}"))
    }
}

/// [`wall_time`] for optional fields.
pub(crate) mod wall_time_opt {
    use chrono::NaiveTime;
    use serde::{de, Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveTime>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        raw.map(|value| super::wall_time::parse(&value).map_err(de::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn draft(title: &str) -> InvitationDraft {
        InvitationDraft {
            title: title.to_owned(),
            host: "Ana".to_owned(),
            description: String::new(),
            date: NaiveDate::from_ymd_opt(2026, 9, 12).expect("valid date"),
            time: NaiveTime::from_hms_opt(18, 30, 0).expect("valid time"),
            address: "Plaza Mayor 1".to_owned(),
            lat: Some(40.4168),
            lng: Some(-3.7038),
            music_url: None,
            gallery: vec![
                GalleryItem {
                    name: "a.jpg".to_owned(),
                    url: "https://assets.example/a.jpg".to_owned(),
                },
                GalleryItem {
                    name: "b.jpg".to_owned(),
                    url: "https://assets.example/b.jpg".to_owned(),
                },
            ],
        }
    }

    #[test]
    fn create_derives_slug_and_stamps_creation_time() {
        let now = Utc::now();
        let owner = RecordId::generate();
        let invitation =
            Invitation::create(owner.clone(), draft("My Event!"), now).expect("valid draft");
        assert!(invitation.slug().as_ref().starts_with("my-event-"));
        assert_eq!(invitation.owner_id(), &owner);
        assert_eq!(invitation.created_at(), now);
    }

    #[test]
    fn create_rejects_blank_titles() {
        let err = Invitation::create(RecordId::generate(), draft("   "), Utc::now())
            .expect_err("blank title");
        assert_eq!(err, InvitationValidationError::EmptyTitle);
    }

    #[test]
    fn gallery_preserves_submission_order() {
        let invitation = Invitation::create(RecordId::generate(), draft("Orden"), Utc::now())
            .expect("valid draft");
        let names: Vec<&str> = invitation.gallery().iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["a.jpg", "b.jpg"]);
    }

    #[test]
    fn apply_patch_leaves_slug_and_owner_untouched() {
        let owner = RecordId::generate();
        let mut invitation =
            Invitation::create(owner.clone(), draft("Original"), Utc::now()).expect("valid draft");
        let slug_before = invitation.slug().clone();

        invitation.apply(InvitationPatch {
            title: Some("Renamed".to_owned()),
            host: Some("Luis".to_owned()),
            ..InvitationPatch::default()
        });

        assert_eq!(invitation.title(), "Renamed");
        assert_eq!(invitation.host(), "Luis");
        assert_eq!(invitation.slug(), &slug_before);
        assert_eq!(invitation.owner_id(), &owner);
    }

    #[test]
    fn draft_rejects_unknown_fields() {
        let payload = json!({
            "title": "Evento",
            "date": "2026-09-12",
            "time": "18:30",
            "slug": "smuggled-slug"
        });
        assert!(serde_json::from_value::<InvitationDraft>(payload).is_err());
    }

    #[rstest]
    #[case("18:30")]
    #[case("18:30:00")]
    fn draft_accepts_browser_time_formats(#[case] time: &str) {
        let payload = json!({
            "title": "Evento",
            "date": "2026-09-12",
            "time": time
        });
        let parsed: InvitationDraft = serde_json::from_value(payload).expect("valid draft");
        assert_eq!(parsed.time, NaiveTime::from_hms_opt(18, 30, 0).expect("valid time"));
    }

    #[test]
    fn patch_rejects_slug_updates() {
        let payload = json!({ "slug": "new-slug" });
        assert!(serde_json::from_value::<InvitationPatch>(payload).is_err());
    }

    #[test]
    fn serialised_record_uses_camel_case() {
        let invitation = Invitation::create(RecordId::generate(), draft("Evento"), Utc::now())
            .expect("valid draft");
        let value = serde_json::to_value(&invitation).expect("serialise");
        assert!(value.get("ownerId").is_some());
        assert!(value.get("createdAt").is_some());
        assert!(value.get("owner_id").is_none());
    }
}
