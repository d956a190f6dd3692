//! Account endpoints: signup and login.
//!
//! Password hashing and verification run on the blocking thread pool; bcrypt
//! is deliberately slow and must not stall the async workers.

use actix_web::{post, web, HttpResponse};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::ports::UserPersistenceError;
use crate::domain::{Error, LoginCredentials, NewUser, SignupCredentials, User};

use super::error::{ApiError, ApiResult};
use super::state::HttpState;

/// Cost factor for bcrypt password hashing.
const BCRYPT_COST: u32 = 10;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct SignupRequest {
    name: String,
    email: String,
    password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    email: String,
    password: String,
}

/// Public projection of a user; the password hash never appears here.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    id: String,
    name: String,
    email: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id().to_string(),
            name: user.name().to_string(),
            email: user.email().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    token: String,
    user: UserResponse,
}

fn persistence_error(err: UserPersistenceError) -> ApiError {
    match err {
        UserPersistenceError::DuplicateEmail { .. } => {
            Error::invalid_request("email already registered").into()
        }
        other => Error::internal(other.to_string()).into(),
    }
}

fn blocking_error(err: actix_web::error::BlockingError) -> ApiError {
    Error::internal(format!("blocking task failed: {err}")).into()
}

#[post("/auth/signup")]
pub async fn signup(
    state: web::Data<HttpState>,
    payload: web::Json<SignupRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let credentials =
        SignupCredentials::try_from_parts(&payload.name, &payload.email, &payload.password)
            .map_err(|err| Error::invalid_request(err.to_string()))?;

    let password = credentials.password().to_owned();
    let password_hash = web::block(move || bcrypt::hash(password, BCRYPT_COST))
        .await
        .map_err(blocking_error)?
        .map_err(|err| Error::internal(format!("password hashing failed: {err}")))?;

    let user = state
        .users()
        .insert(NewUser {
            name: credentials.name().clone(),
            email: credentials.email().clone(),
            password_hash,
        })
        .await
        .map_err(persistence_error)?;

    info!(user = %user.id(), "account created");
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let credentials = LoginCredentials::try_from_parts(&payload.email, &payload.password)
        .map_err(|err| Error::invalid_request(err.to_string()))?;

    let user = state
        .users()
        .find_by_email(credentials.email())
        .await
        .map_err(persistence_error)?
        .ok_or_else(|| Error::invalid_request("unknown user"))?;

    let password = credentials.password().to_owned();
    let hash = user.password_hash().to_owned();
    let matches = web::block(move || bcrypt::verify(password, &hash))
        .await
        .map_err(blocking_error)?
        .map_err(|err| Error::internal(format!("password verification failed: {err}")))?;
    if !matches {
        return Err(Error::invalid_request("wrong password").into());
    }

    let token = state
        .tokens()
        .issue(user.id(), Utc::now())
        .map_err(|err| Error::internal(err.to_string()))?;

    info!(user = %user.id(), "login succeeded");
    Ok(HttpResponse::Ok().json(LoginResponse {
        token,
        user: user.into(),
    }))
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::{json, Value};

    use crate::domain::TokenSigner;
    use crate::outbound::persistence::{MemoryInvitationRepository, MemoryUserRepository};

    use super::*;

    fn state() -> web::Data<HttpState> {
        web::Data::new(HttpState::new(
            Arc::new(MemoryUserRepository::new()),
            Arc::new(MemoryInvitationRepository::new()),
            None,
            Arc::new(TokenSigner::new("test-secret")),
        ))
    }

    fn signup_payload() -> Value {
        json!({ "name": "Ada", "email": "ada@example.com", "password": "secret" })
    }

    #[actix_web::test]
    async fn signup_returns_public_projection() {
        let app =
            test::init_service(App::new().app_data(state()).service(signup).service(login)).await;
        let req = test::TestRequest::post()
            .uri("/auth/signup")
            .set_json(signup_payload())
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["name"], json!("Ada"));
        assert_eq!(body["email"], json!("ada@example.com"));
        assert!(body.get("password").is_none());
        assert!(body.get("passwordHash").is_none());
    }

    #[actix_web::test]
    async fn duplicate_email_is_a_client_error() {
        let app =
            test::init_service(App::new().app_data(state()).service(signup).service(login)).await;
        for expected in [StatusCode::OK, StatusCode::BAD_REQUEST] {
            let req = test::TestRequest::post()
                .uri("/auth/signup")
                .set_json(signup_payload())
                .to_request();
            let res = test::call_service(&app, req).await;
            assert_eq!(res.status(), expected);
        }
    }

    #[actix_web::test]
    async fn login_round_trips_signup_credentials() {
        let app =
            test::init_service(App::new().app_data(state()).service(signup).service(login)).await;
        let req = test::TestRequest::post()
            .uri("/auth/signup")
            .set_json(signup_payload())
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({ "email": "ada@example.com", "password": "secret" }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
        assert_eq!(body["user"]["email"], json!("ada@example.com"));
    }

    #[actix_web::test]
    async fn login_rejects_unknown_user_and_wrong_password() {
        let app =
            test::init_service(App::new().app_data(state()).service(signup).service(login)).await;
        let req = test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({ "email": "ghost@example.com", "password": "x" }))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::BAD_REQUEST
        );

        let req = test::TestRequest::post()
            .uri("/auth/signup")
            .set_json(signup_payload())
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
        let req = test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({ "email": "ada@example.com", "password": "wrong" }))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::BAD_REQUEST
        );
    }
}
