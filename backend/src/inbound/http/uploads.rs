//! Asset-upload endpoints.
//!
//! Two modes share the object-store port: `presign` hands the client a
//! time-limited write grant and never sees the bytes, `upload` accepts a
//! multipart form and moves the bytes itself. Both answer with a
//! configuration error before touching any input when storage is not
//! configured.
//!
//! Multipart file parts are spooled to temporary files while the form is
//! parsed; the spool files are removed when the handler returns, on success
//! and failure alike.

use std::io::Write;

use actix_multipart::Multipart;
use actix_web::{post, web, HttpResponse};
use chrono::Utc;
use futures_util::TryStreamExt;
use serde::Deserialize;
use tempfile::NamedTempFile;
use tracing::info;

use crate::domain::ports::{InvitationPersistenceError, ObjectStore, ObjectStoreError};
use crate::domain::{
    derive_object_key, random_disambiguator, Error, GalleryItem, Invitation, InvitationDraft,
};

use super::auth::AuthenticatedUser;
use super::error::{ApiError, ApiResult};
use super::state::HttpState;
use super::validation::{
    invalid_field, missing_field, parse_date, parse_f64, parse_time, require_text,
};

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct PresignRequest {
    filename: String,
    content_type: String,
}

fn store_error(err: ObjectStoreError) -> ApiError {
    Error::internal(err.to_string()).into()
}

fn persistence_error(err: InvitationPersistenceError) -> ApiError {
    Error::internal(err.to_string()).into()
}

fn require_store(state: &HttpState) -> Result<&dyn ObjectStore, ApiError> {
    state
        .object_store()
        .ok_or_else(|| Error::configuration("object storage is not configured").into())
}

/// Issue a write grant for a client-side upload.
#[post("/s3/presign")]
pub async fn presign(
    state: web::Data<HttpState>,
    _user: AuthenticatedUser,
    payload: web::Json<PresignRequest>,
) -> ApiResult<HttpResponse> {
    let store = require_store(&state)?;
    let payload = payload.into_inner();
    if payload.filename.trim().is_empty() {
        return Err(missing_field("filename").into());
    }
    if payload.content_type.trim().is_empty() {
        return Err(missing_field("contentType").into());
    }
    let grant = store
        .issue_grant(&payload.filename, &payload.content_type, Utc::now())
        .map_err(store_error)?;
    info!(key = %grant.key, "upload grant issued");
    Ok(HttpResponse::Ok().json(grant))
}

/// One file part, spooled to disk while the rest of the form is parsed.
struct SpooledFile {
    filename: String,
    content_type: String,
    spool: NamedTempFile,
}

/// Form fields accumulated while draining the multipart stream.
#[derive(Default)]
struct UploadForm {
    title: Option<String>,
    host: Option<String>,
    description: Option<String>,
    date: Option<String>,
    time: Option<String>,
    address: Option<String>,
    lat: Option<String>,
    lng: Option<String>,
    gallery: Vec<SpooledFile>,
    music: Option<SpooledFile>,
}

fn multipart_error(err: actix_multipart::MultipartError) -> ApiError {
    Error::invalid_request(format!("malformed multipart payload: {err}")).into()
}

fn spool_error(err: std::io::Error) -> ApiError {
    Error::internal(format!("spooling upload failed: {err}")).into()
}

async fn read_text_field(field: &mut actix_multipart::Field) -> Result<String, ApiError> {
    let name = field.name().to_owned();
    let mut buf = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(multipart_error)? {
        buf.extend_from_slice(&chunk);
    }
    String::from_utf8(buf).map_err(|_| invalid_field(&name, "expected UTF-8 text").into())
}

async fn spool_file_field(field: &mut actix_multipart::Field) -> Result<SpooledFile, ApiError> {
    let filename = field
        .content_disposition()
        .get_filename()
        .unwrap_or("file")
        .to_owned();
    let content_type = field
        .content_type()
        .map(|mime| mime.to_string())
        .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_owned());
    let mut spool = NamedTempFile::new().map_err(spool_error)?;
    while let Some(chunk) = field.try_next().await.map_err(multipart_error)? {
        spool.write_all(&chunk).map_err(spool_error)?;
    }
    spool.flush().map_err(spool_error)?;
    Ok(SpooledFile {
        filename,
        content_type,
        spool,
    })
}

async fn drain_form(mut payload: Multipart) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm::default();
    while let Some(mut field) = payload.try_next().await.map_err(multipart_error)? {
        let name = field.name().to_owned();
        match name.as_str() {
            "gallery" => form.gallery.push(spool_file_field(&mut field).await?),
            "music" => {
                if form.music.is_some() {
                    return Err(invalid_field("music", "at most one music file").into());
                }
                form.music = Some(spool_file_field(&mut field).await?);
            }
            "title" => form.title = Some(read_text_field(&mut field).await?),
            "host" => form.host = Some(read_text_field(&mut field).await?),
            "description" => form.description = Some(read_text_field(&mut field).await?),
            "date" => form.date = Some(read_text_field(&mut field).await?),
            "time" => form.time = Some(read_text_field(&mut field).await?),
            "address" => form.address = Some(read_text_field(&mut field).await?),
            "lat" => form.lat = Some(read_text_field(&mut field).await?),
            "lng" => form.lng = Some(read_text_field(&mut field).await?),
            other => return Err(invalid_field(other, "unknown form field").into()),
        }
    }
    Ok(form)
}

/// Push one spooled file to the object store and return its public URL.
async fn store_file(store: &dyn ObjectStore, file: &SpooledFile) -> Result<String, ApiError> {
    let key = derive_object_key(
        &file.filename,
        Utc::now().timestamp_millis(),
        &random_disambiguator(),
    );
    let bytes = std::fs::read(file.spool.path()).map_err(spool_error)?;
    store
        .put_object(&key, &file.content_type, bytes)
        .await
        .map_err(store_error)
}

/// Create an invitation from a multipart form, moving the file bytes to
/// object storage on the caller's behalf.
///
/// Files are stored one at a time in submission order; the first failure
/// aborts the request and already-stored objects are left behind.
#[post("/invitations/upload")]
pub async fn upload(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: Multipart,
) -> ApiResult<HttpResponse> {
    let store = require_store(&state)?;
    let form = drain_form(payload).await?;

    let title = require_text("title", form.title)?;
    let date = parse_date("date", &require_text("date", form.date)?)?;
    let time = parse_time("time", &require_text("time", form.time)?)?;
    let lat = form.lat.map(|raw| parse_f64("lat", &raw)).transpose()?;
    let lng = form.lng.map(|raw| parse_f64("lng", &raw)).transpose()?;

    let mut gallery = Vec::with_capacity(form.gallery.len());
    for file in &form.gallery {
        let url = store_file(store, file).await?;
        gallery.push(GalleryItem {
            name: file.filename.clone(),
            url,
        });
    }
    let mut music_url = None;
    if let Some(file) = &form.music {
        music_url = Some(store_file(store, file).await?);
    }

    let draft = InvitationDraft {
        title,
        host: form.host.unwrap_or_default(),
        description: form.description.unwrap_or_default(),
        date,
        time,
        address: form.address.unwrap_or_default(),
        lat,
        lng,
        music_url,
        gallery,
    };
    let invitation = Invitation::create(user.into_id(), draft, Utc::now())
        .map_err(|err| Error::invalid_request(err.to_string()))?;
    let stored = state
        .invitations()
        .insert(invitation)
        .await
        .map_err(persistence_error)?;
    info!(
        invitation = %stored.id(),
        gallery = stored.gallery().len(),
        music = stored.music_url().is_some(),
        "invitation created via mediated upload"
    );
    Ok(HttpResponse::Created().json(stored))
}
