//! Liveness endpoint.

use actix_web::{get, HttpResponse};

/// Plain-text liveness probe; no auth, no version prefix.
#[get("/ping")]
pub async fn ping() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("pong")
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use actix_web::http::StatusCode;
    use actix_web::{test, App};

    use super::*;

    #[actix_web::test]
    async fn ping_answers_pong() {
        let app = test::init_service(App::new().service(ping)).await;
        let res = test::call_service(&app, test::TestRequest::get().uri("/ping").to_request()).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = test::read_body(res).await;
        assert_eq!(&body[..], b"pong");
    }
}
