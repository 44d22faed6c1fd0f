use actix_web::{
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    middleware::Next,
    web::Data,
    Error, HttpMessage, HttpResponse,
};
use serde_json::json;

use crate::{
    auth::{
        extract::AuthEmployer,
        jwt::{verify_token, TokenType},
    },
    config::Config,
};

/// Gate for the protected scope: a valid access token or a 401 body. On
/// success the identity lands in request extensions for the
/// [`AuthEmployer`] extractor.
pub async fn auth_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let config = req
        .app_data::<Data<Config>>()
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("App config missing"))?;

    let header_value = match req.headers().get("Authorization") {
        Some(h) => h.to_str().map_err(|_| {
            actix_web::error::ErrorUnauthorized(
                json!({"error": "Invalid Authorization header encoding"}),
            )
        })?,
        None => {
            let resp =
                HttpResponse::Unauthorized().json(json!({"error": "Missing Authorization header"}));
            return Ok(req.into_response(resp.map_into_boxed_body()));
        }
    };

    let token = match header_value.strip_prefix("Bearer ") {
        Some(t) => t,
        None => {
            let resp = HttpResponse::Unauthorized()
                .json(json!({"error": "Authorization header must start with Bearer"}));
            return Ok(req.into_response(resp.map_into_boxed_body()));
        }
    };

    match verify_token(token, &config.jwt_secret) {
        Ok(claims) if claims.token_type == TokenType::Access => {
            req.extensions_mut().insert(AuthEmployer {
                employer_id: claims.employer_id,
                username: claims.sub,
            });
            next.call(req).await
        }
        Ok(_) => {
            let resp = HttpResponse::Unauthorized()
                .json(json!({"error": "Access token required"}));
            Ok(req.into_response(resp.map_into_boxed_body()))
        }
        Err(e) => {
            let resp = HttpResponse::Unauthorized()
                .json(json!({"error": "Invalid or expired token", "details": e}));
            Ok(req.into_response(resp.map_into_boxed_body()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::{generate_access_token, generate_refresh_token};
    use actix_web::{middleware::from_fn, test, web, App, Responder};

    fn test_config() -> Config {
        Config {
            database_url: "sqlite::memory:".into(),
            jwt_secret: "secret".into(),
            server_addr: "127.0.0.1:0".into(),
            access_token_ttl: 60,
            refresh_token_ttl: 60,
            reset_token_ttl: 60,
            rate_login_per_min: 60,
            rate_recover_per_min: 60,
            rate_refresh_per_min: 60,
            rate_protected_per_min: 60,
            banner_ttl_ms: 2500,
            api_prefix: "/api/v1".into(),
        }
    }

    async fn whoami(auth: AuthEmployer) -> impl Responder {
        format!("{}:{}", auth.employer_id, auth.username)
    }

    #[actix_web::test]
    async fn gate_decodes_once_and_hands_identity_to_the_extractor() {
        let app = test::init_service(
            App::new().app_data(Data::new(test_config())).service(
                web::scope("/api")
                    .wrap(from_fn(auth_middleware))
                    .route("/whoami", web::get().to(whoami)),
            ),
        )
        .await;

        let token = generate_access_token(7, "acme".into(), "secret", 60).unwrap();
        let req = test::TestRequest::get()
            .uri("/api/whoami")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
        assert_eq!(test::read_body(resp).await, "7:acme");
    }

    #[actix_web::test]
    async fn refresh_token_does_not_pass_the_gate() {
        let app = test::init_service(
            App::new().app_data(Data::new(test_config())).service(
                web::scope("/api")
                    .wrap(from_fn(auth_middleware))
                    .route("/whoami", web::get().to(whoami)),
            ),
        )
        .await;

        let (token, _) = generate_refresh_token(7, "acme".into(), "secret", 60).unwrap();
        let req = test::TestRequest::get()
            .uri("/api/whoami")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::UNAUTHORIZED);
    }
}
