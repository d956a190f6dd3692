//! Document-store repository adapters.
//!
//! Records live in two collections, `users` and `invitations`, with
//! camelCase field names and `_id` object ids. Domain record ids are hex
//! renderings of those object ids, so the conversion both ways is lossless.
//!
//! Owner-scoped mutations filter on `{_id, ownerId}` in one round trip; on
//! a miss a second lookup on `_id` alone distinguishes an absent record
//! from a foreign one.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use futures_util::TryStreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{doc, to_bson, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{IndexOptions, ReturnDocument};
use mongodb::{Collection, Database, IndexModel};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::invitation::wall_time;
use crate::domain::ports::{
    InvitationPersistenceError, InvitationRepository, MutationOutcome, UserPersistenceError,
    UserRepository,
};
use crate::domain::{
    EmailAddress, GalleryItem, Invitation, InvitationDraft, InvitationPatch, NewUser, RecordId,
    Slug, User, UserName,
};

const USERS_COLLECTION: &str = "users";
const INVITATIONS_COLLECTION: &str = "invitations";

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";

/// MongoDB error code for unique-index violations.
const DUPLICATE_KEY: i32 = 11000;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    name: String,
    email: String,
    password_hash: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InvitationDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    owner_id: ObjectId,
    title: String,
    host: String,
    description: String,
    date: String,
    time: String,
    address: String,
    lat: Option<f64>,
    lng: Option<f64>,
    music_url: Option<String>,
    gallery: Vec<GalleryItem>,
    slug: String,
    created_at: i64,
}

fn record_id_to_oid<E>(id: &RecordId, err: impl FnOnce(String) -> E) -> Result<ObjectId, E> {
    ObjectId::parse_str(id.as_ref()).map_err(|e| err(format!("invalid object id: {e}")))
}

fn oid_to_record_id<E>(oid: ObjectId, err: impl FnOnce(String) -> E) -> Result<RecordId, E> {
    RecordId::new(oid.to_hex()).map_err(|e| err(format!("invalid record id: {e}")))
}

fn user_query(message: impl Into<String>) -> UserPersistenceError {
    UserPersistenceError::Query {
        message: message.into(),
    }
}

fn invitation_query(message: impl Into<String>) -> InvitationPersistenceError {
    InvitationPersistenceError::Query {
        message: message.into(),
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        &*err.kind,
        ErrorKind::Write(WriteFailure::WriteError(write)) if write.code == DUPLICATE_KEY
    )
}

impl UserDocument {
    fn into_domain(self) -> Result<User, UserPersistenceError> {
        let oid = self.id.ok_or_else(|| user_query("user document lacks _id"))?;
        let id = oid_to_record_id(oid, user_query)?;
        let name = UserName::new(self.name).map_err(|e| user_query(e.to_string()))?;
        let email = EmailAddress::new(self.email).map_err(|e| user_query(e.to_string()))?;
        Ok(User::new(id, name, email, self.password_hash))
    }
}

impl InvitationDocument {
    fn from_domain(invitation: &Invitation) -> Result<Self, InvitationPersistenceError> {
        Ok(Self {
            id: record_id_to_oid(invitation.id(), invitation_query)?,
            owner_id: record_id_to_oid(invitation.owner_id(), invitation_query)?,
            title: invitation.title().to_owned(),
            host: invitation.host().to_owned(),
            description: invitation.description().to_owned(),
            date: invitation.date().format(DATE_FORMAT).to_string(),
            time: invitation.time().format(TIME_FORMAT).to_string(),
            address: invitation.address().to_owned(),
            lat: invitation.lat(),
            lng: invitation.lng(),
            music_url: invitation.music_url().map(str::to_owned),
            gallery: invitation.gallery().to_vec(),
            slug: invitation.slug().to_string(),
            created_at: invitation.created_at().timestamp_millis(),
        })
    }

    fn into_domain(self) -> Result<Invitation, InvitationPersistenceError> {
        let id = oid_to_record_id(self.id, invitation_query)?;
        let owner_id = oid_to_record_id(self.owner_id, invitation_query)?;
        let date = NaiveDate::parse_from_str(&self.date, DATE_FORMAT)
            .map_err(|e| invitation_query(format!("invalid stored date: {e}")))?;
        let time = wall_time::parse(&self.time).map_err(invitation_query)?;
        let slug = Slug::new(self.slug).map_err(|e| invitation_query(e.to_string()))?;
        let created_at = DateTime::<Utc>::from_timestamp_millis(self.created_at)
            .ok_or_else(|| invitation_query("stored creation time out of range"))?;
        let draft = InvitationDraft {
            title: self.title,
            host: self.host,
            description: self.description,
            date,
            time,
            address: self.address,
            lat: self.lat,
            lng: self.lng,
            music_url: self.music_url,
            gallery: self.gallery,
        };
        Ok(Invitation::restore(id, owner_id, draft, slug, created_at))
    }
}

/// Build the `$set` document for an owner-scoped partial update.
fn patch_to_set(patch: InvitationPatch) -> Result<Document, InvitationPersistenceError> {
    let mut set = Document::new();
    if let Some(title) = patch.title {
        set.insert("title", title);
    }
    if let Some(host) = patch.host {
        set.insert("host", host);
    }
    if let Some(description) = patch.description {
        set.insert("description", description);
    }
    if let Some(date) = patch.date {
        set.insert("date", date.format(DATE_FORMAT).to_string());
    }
    if let Some(time) = patch.time {
        set.insert("time", time.format(TIME_FORMAT).to_string());
    }
    if let Some(address) = patch.address {
        set.insert("address", address);
    }
    if let Some(lat) = patch.lat {
        set.insert("lat", lat);
    }
    if let Some(lng) = patch.lng {
        set.insert("lng", lng);
    }
    if let Some(music_url) = patch.music_url {
        set.insert("musicUrl", music_url);
    }
    if let Some(gallery) = patch.gallery {
        let gallery =
            to_bson(&gallery).map_err(|e| invitation_query(format!("gallery encoding: {e}")))?;
        set.insert("gallery", gallery);
    }
    Ok(set)
}

/// MongoDB-backed [`UserRepository`].
pub struct MongoUserRepository {
    collection: Collection<UserDocument>,
}

impl MongoUserRepository {
    pub fn new(database: &Database) -> Self {
        Self {
            collection: database.collection(USERS_COLLECTION),
        }
    }

    /// Create the unique email index; call once at startup.
    pub async fn ensure_indexes(&self) -> Result<(), UserPersistenceError> {
        let index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.collection
            .create_index(index)
            .await
            .map_err(|e| user_query(e.to_string()))?;
        info!("unique email index ensured");
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn insert(&self, user: NewUser) -> Result<User, UserPersistenceError> {
        let email = user.email.to_string();
        let document = UserDocument {
            id: None,
            name: user.name.to_string(),
            email: email.clone(),
            password_hash: user.password_hash,
        };
        let result = self.collection.insert_one(&document).await.map_err(|err| {
            if is_duplicate_key(&err) {
                UserPersistenceError::DuplicateEmail { email }
            } else {
                user_query(err.to_string())
            }
        })?;
        let oid = result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| user_query("insert did not return an object id"))?;
        UserDocument {
            id: Some(oid),
            ..document
        }
        .into_domain()
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError> {
        self.collection
            .find_one(doc! { "email": email.as_ref() })
            .await
            .map_err(|e| user_query(e.to_string()))?
            .map(UserDocument::into_domain)
            .transpose()
    }
}

/// MongoDB-backed [`InvitationRepository`].
pub struct MongoInvitationRepository {
    collection: Collection<InvitationDocument>,
}

impl MongoInvitationRepository {
    pub fn new(database: &Database) -> Self {
        Self {
            collection: database.collection(INVITATIONS_COLLECTION),
        }
    }

    /// A miss on `{_id, ownerId}` means either an absent or a foreign
    /// record; a lookup on `_id` alone tells the two apart.
    async fn classify_miss(
        &self,
        id: ObjectId,
    ) -> Result<MutationOutcome, InvitationPersistenceError> {
        let exists = self
            .collection
            .find_one(doc! { "_id": id })
            .await
            .map_err(|e| invitation_query(e.to_string()))?
            .is_some();
        Ok(if exists {
            MutationOutcome::Forbidden
        } else {
            MutationOutcome::NotFound
        })
    }
}

#[async_trait]
impl InvitationRepository for MongoInvitationRepository {
    async fn insert(
        &self,
        invitation: Invitation,
    ) -> Result<Invitation, InvitationPersistenceError> {
        let document = InvitationDocument::from_domain(&invitation)?;
        self.collection
            .insert_one(&document)
            .await
            .map_err(|e| invitation_query(e.to_string()))?;
        Ok(invitation)
    }

    async fn list_by_owner(
        &self,
        owner: &RecordId,
    ) -> Result<Vec<Invitation>, InvitationPersistenceError> {
        let owner = record_id_to_oid(owner, invitation_query)?;
        let documents: Vec<InvitationDocument> = self
            .collection
            .find(doc! { "ownerId": owner })
            .sort(doc! { "createdAt": -1 })
            .await
            .map_err(|e| invitation_query(e.to_string()))?
            .try_collect()
            .await
            .map_err(|e| invitation_query(e.to_string()))?;
        documents
            .into_iter()
            .map(InvitationDocument::into_domain)
            .collect()
    }

    async fn find_by_id_or_slug(
        &self,
        identifier: &str,
    ) -> Result<Option<Invitation>, InvitationPersistenceError> {
        if RecordId::is_candidate(identifier) {
            if let Ok(oid) = ObjectId::parse_str(identifier) {
                let by_id = self
                    .collection
                    .find_one(doc! { "_id": oid })
                    .await
                    .map_err(|e| invitation_query(e.to_string()))?;
                if let Some(document) = by_id {
                    return Ok(Some(document.into_domain()?));
                }
            }
        }
        self.collection
            .find_one(doc! { "slug": identifier })
            .await
            .map_err(|e| invitation_query(e.to_string()))?
            .map(InvitationDocument::into_domain)
            .transpose()
    }

    async fn update(
        &self,
        owner: &RecordId,
        id: &RecordId,
        patch: InvitationPatch,
    ) -> Result<MutationOutcome, InvitationPersistenceError> {
        let id = record_id_to_oid(id, invitation_query)?;
        let owner = record_id_to_oid(owner, invitation_query)?;
        let filter = doc! { "_id": id, "ownerId": owner };
        // An empty `$set` is rejected by the server; an empty patch is a
        // plain owner-scoped read instead.
        let updated = if patch.is_empty() {
            self.collection
                .find_one(filter)
                .await
                .map_err(|e| invitation_query(e.to_string()))?
        } else {
            let set = patch_to_set(patch)?;
            self.collection
                .find_one_and_update(filter, doc! { "$set": set })
                .return_document(ReturnDocument::After)
                .await
                .map_err(|e| invitation_query(e.to_string()))?
        };
        match updated {
            Some(document) => Ok(MutationOutcome::Applied(document.into_domain()?)),
            None => self.classify_miss(id).await,
        }
    }

    async fn delete(
        &self,
        owner: &RecordId,
        id: &RecordId,
    ) -> Result<MutationOutcome, InvitationPersistenceError> {
        let id = record_id_to_oid(id, invitation_query)?;
        let owner = record_id_to_oid(owner, invitation_query)?;
        let deleted = self
            .collection
            .find_one_and_delete(doc! { "_id": id, "ownerId": owner })
            .await
            .map_err(|e| invitation_query(e.to_string()))?;
        match deleted {
            Some(document) => Ok(MutationOutcome::Applied(document.into_domain()?)),
            None => self.classify_miss(id).await,
        }
    }
}
