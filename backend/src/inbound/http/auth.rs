//! Bearer-token extraction for protected routes.
//!
//! Two distinct failures: a missing credential answers 401, a credential
//! that fails verification answers 403. The extractor only authenticates;
//! per-record ownership checks live with the repositories.

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};

use crate::domain::{Error, RecordId};

use super::error::ApiError;
use super::state::HttpState;

/// The caller's verified identity, extracted from the `Authorization`
/// header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser(RecordId);

impl AuthenticatedUser {
    /// Identifier of the authenticated account.
    pub fn id(&self) -> &RecordId {
        &self.0
    }

    pub fn into_id(self) -> RecordId {
        self.0
    }
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, ApiError> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| Error::internal("http state missing from app data"))?;
    let raw = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| Error::unauthorized("token required"))?;
    let token = raw.strip_prefix("Bearer ").unwrap_or(raw).trim();
    if token.is_empty() {
        return Err(Error::unauthorized("token required").into());
    }
    let user_id = state
        .tokens()
        .verify(token)
        .map_err(|_| Error::forbidden("invalid token"))?;
    Ok(AuthenticatedUser(user_id))
}

impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{test, App, HttpResponse};
    use chrono::Utc;

    use crate::domain::TokenSigner;
    use crate::outbound::object_store::MemoryObjectStore;
    use crate::outbound::persistence::{MemoryInvitationRepository, MemoryUserRepository};

    use super::*;

    fn state(signer: TokenSigner) -> web::Data<HttpState> {
        web::Data::new(HttpState::new(
            Arc::new(MemoryUserRepository::new()),
            Arc::new(MemoryInvitationRepository::new()),
            Some(Arc::new(MemoryObjectStore::new())),
            Arc::new(signer),
        ))
    }

    async fn whoami(user: AuthenticatedUser) -> HttpResponse {
        HttpResponse::Ok().body(user.id().to_string())
    }

    #[actix_web::test]
    async fn missing_header_answers_unauthorized() {
        let app = test::init_service(
            App::new()
                .app_data(state(TokenSigner::new("secret")))
                .route("/me", web::get().to(whoami)),
        )
        .await;
        let res = test::call_service(&app, test::TestRequest::get().uri("/me").to_request()).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn garbage_token_answers_forbidden() {
        let app = test::init_service(
            App::new()
                .app_data(state(TokenSigner::new("secret")))
                .route("/me", web::get().to(whoami)),
        )
        .await;
        let req = test::TestRequest::get()
            .uri("/me")
            .insert_header((header::AUTHORIZATION, "Bearer not-a-token"))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn token_signed_with_other_secret_answers_forbidden() {
        let foreign = TokenSigner::new("other-secret");
        let token = foreign
            .issue(&RecordId::generate(), Utc::now())
            .expect("issue token");
        let app = test::init_service(
            App::new()
                .app_data(state(TokenSigner::new("secret")))
                .route("/me", web::get().to(whoami)),
        )
        .await;
        let req = test::TestRequest::get()
            .uri("/me")
            .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn valid_token_extracts_subject() {
        let signer = TokenSigner::new("secret");
        let id = RecordId::generate();
        let token = signer.issue(&id, Utc::now()).expect("issue token");
        let app = test::init_service(
            App::new()
                .app_data(state(TokenSigner::new("secret")))
                .route("/me", web::get().to(whoami)),
        )
        .await;
        let req = test::TestRequest::get()
            .uri("/me")
            .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = test::read_body(res).await;
        assert_eq!(&body[..], id.as_ref().as_bytes());
    }
}
