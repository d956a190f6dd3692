//! Invitation CRUD endpoints and the public resolver.
//!
//! Everything except `get_public` requires a bearer credential. Mutations
//! are owner scoped at the repository; the HTTP layer reports a foreign
//! record as absent so the API does not confirm its existence to non-owners.

use actix_web::{delete, get, post, put, web, HttpResponse};
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::domain::ports::{InvitationPersistenceError, MutationOutcome};
use crate::domain::{Countdown, Error, Invitation, InvitationDraft, InvitationPatch, RecordId};

use super::auth::AuthenticatedUser;
use super::error::{ApiError, ApiResult};
use super::state::HttpState;

/// Public rendering payload: the record plus a countdown computed at
/// request time.
#[derive(Debug, Serialize)]
pub struct PublicInvitationResponse {
    #[serde(flatten)]
    invitation: Invitation,
    countdown: Countdown,
}

fn persistence_error(err: InvitationPersistenceError) -> ApiError {
    Error::internal(err.to_string()).into()
}

fn parse_record_id(raw: &str) -> Result<RecordId, ApiError> {
    RecordId::new(raw).map_err(|_| Error::invalid_request("malformed invitation id").into())
}

#[get("/invitations")]
pub async fn list(state: web::Data<HttpState>, user: AuthenticatedUser) -> ApiResult<HttpResponse> {
    let invitations = state
        .invitations()
        .list_by_owner(user.id())
        .await
        .map_err(persistence_error)?;
    Ok(HttpResponse::Ok().json(invitations))
}

#[post("/invitations")]
pub async fn create(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<InvitationDraft>,
) -> ApiResult<HttpResponse> {
    let invitation = Invitation::create(user.into_id(), payload.into_inner(), Utc::now())
        .map_err(|err| Error::invalid_request(err.to_string()))?;
    let stored = state
        .invitations()
        .insert(invitation)
        .await
        .map_err(persistence_error)?;
    info!(invitation = %stored.id(), slug = %stored.slug(), "invitation created");
    Ok(HttpResponse::Created().json(stored))
}

/// Public resolver: no credential, identifier may be a record id or a slug.
#[get("/invitations/{identifier}")]
pub async fn get_public(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let identifier = path.into_inner();
    let invitation = state
        .invitations()
        .find_by_id_or_slug(&identifier)
        .await
        .map_err(persistence_error)?
        .ok_or_else(|| Error::not_found("invitation not found"))?;
    let countdown = Countdown::until(invitation.date(), invitation.time(), Utc::now());
    Ok(HttpResponse::Ok().json(PublicInvitationResponse {
        invitation,
        countdown,
    }))
}

#[put("/invitations/{id}")]
pub async fn update(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<InvitationPatch>,
) -> ApiResult<HttpResponse> {
    let id = parse_record_id(&path.into_inner())?;
    let outcome = state
        .invitations()
        .update(user.id(), &id, payload.into_inner())
        .await
        .map_err(persistence_error)?;
    match outcome {
        MutationOutcome::Applied(invitation) => Ok(HttpResponse::Ok().json(invitation)),
        // Foreign records are reported as absent, not as forbidden.
        MutationOutcome::NotFound | MutationOutcome::Forbidden => {
            Err(Error::not_found("invitation not found").into())
        }
    }
}

/// Deletion is idempotent towards the client: any outcome short of a store
/// failure answers `{"success": true}`.
#[delete("/invitations/{id}")]
pub async fn remove(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_record_id(&path.into_inner())?;
    let outcome = state
        .invitations()
        .delete(user.id(), &id)
        .await
        .map_err(persistence_error)?;
    if let MutationOutcome::Applied(invitation) = &outcome {
        info!(invitation = %invitation.id(), "invitation deleted");
    }
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}
