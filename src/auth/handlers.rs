use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::SqlitePool;
use tracing::{debug, error, info, instrument};
use utoipa::ToSchema;

use crate::{
    auth::{
        jwt::{
            generate_access_token, generate_refresh_token, generate_reset_token, verify_reset_token,
            verify_token, TokenType,
        },
        password::{hash_password, verify_password},
    },
    config::Config,
    store,
};

#[derive(Deserialize, ToSchema)]
pub struct LoginReq {
    #[schema(example = "acme")]
    pub username: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[schema(example = "Acme Industries")]
    pub display_name: String,
}

/// Employer login
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginReq,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Auth"
)]
#[instrument(name = "auth_login", skip(pool, config, req), fields(username = %req.username))]
pub async fn login(
    req: web::Json<LoginReq>,
    pool: web::Data<SqlitePool>,
    config: web::Data<Config>,
) -> impl Responder {
    info!("Login request received");

    if req.username.trim().is_empty() || req.password.is_empty() {
        info!("Validation failed: empty username or password");
        return HttpResponse::BadRequest().body("Username or password required");
    }

    debug!("Fetching employer from database");

    let employer = match store::employer_by_username(pool.get_ref(), req.username.trim()).await {
        Ok(Some(e)) => e,
        Ok(None) => {
            info!("Invalid credentials: employer not found");
            return HttpResponse::Unauthorized().body("Invalid credentials");
        }
        Err(e) => {
            error!(error = %e, "Database error while fetching employer");
            return HttpResponse::InternalServerError().finish();
        }
    };

    if let Err(e) = verify_password(&req.password, &employer.pwd_hash) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return HttpResponse::Unauthorized().body("Invalid credentials");
    }

    debug!("Password verified, generating tokens");

    let access_token = match generate_access_token(
        employer.id,
        employer.username.clone(),
        &config.jwt_secret,
        config.access_token_ttl,
    ) {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Failed to generate access token");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let (refresh_token, refresh_claims) = match generate_refresh_token(
        employer.id,
        employer.username.clone(),
        &config.jwt_secret,
        config.refresh_token_ttl,
    ) {
        Ok(pair) => pair,
        Err(e) => {
            error!(error = %e, "Failed to generate refresh token");
            return HttpResponse::InternalServerError().finish();
        }
    };

    debug!(employer_id = employer.id, jti = %refresh_claims.jti, "Storing refresh token");

    if let Err(e) = store::insert_refresh_token(
        pool.get_ref(),
        employer.id,
        &refresh_claims.jti,
        refresh_claims.exp as i64,
    )
    .await
    {
        error!(error = %e, "Failed to store refresh token");
        return HttpResponse::InternalServerError().finish();
    }

    info!("Login successful");

    HttpResponse::Ok().json(LoginResponse {
        access_token,
        refresh_token,
        display_name: employer.display_name,
    })
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

/// Rotate a refresh token for a new access/refresh pair
#[utoipa::path(
    post,
    path = "/auth/refresh",
    responses(
        (status = 200, description = "New token pair", body = LoginResponse),
        (status = 401, description = "Invalid, expired or revoked refresh token")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn refresh_token(
    req: HttpRequest,
    pool: web::Data<SqlitePool>,
    config: web::Data<Config>,
) -> impl Responder {
    let token = match bearer_token(&req) {
        Some(t) => t,
        None => return HttpResponse::Unauthorized().body("No token"),
    };

    let claims = match verify_token(token, &config.jwt_secret) {
        Ok(c) => c,
        Err(_) => return HttpResponse::Unauthorized().finish(),
    };

    if claims.token_type != TokenType::Refresh {
        return HttpResponse::Unauthorized().finish();
    }

    let record = match store::find_refresh_token(pool.get_ref(), &claims.jti).await {
        Ok(Some(r)) if !r.revoked => r,
        Ok(_) => return HttpResponse::Unauthorized().finish(),
        Err(e) => {
            error!(error = %e, "Database error while looking up refresh token");
            return HttpResponse::InternalServerError().finish();
        }
    };

    // Rotation: the presented token is dead either way.
    if let Err(e) = store::revoke_refresh_token(pool.get_ref(), record.id).await {
        error!(error = %e, "Failed to revoke refresh token");
        return HttpResponse::InternalServerError().finish();
    }

    let access_token = match generate_access_token(
        claims.employer_id,
        claims.sub.clone(),
        &config.jwt_secret,
        config.access_token_ttl,
    ) {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Failed to generate access token");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let (new_refresh_token, new_claims) = match generate_refresh_token(
        claims.employer_id,
        claims.sub,
        &config.jwt_secret,
        config.refresh_token_ttl,
    ) {
        Ok(pair) => pair,
        Err(e) => {
            error!(error = %e, "Failed to generate refresh token");
            return HttpResponse::InternalServerError().finish();
        }
    };

    if let Err(e) = store::insert_refresh_token(
        pool.get_ref(),
        claims.employer_id,
        &new_claims.jti,
        new_claims.exp as i64,
    )
    .await
    {
        error!(error = %e, "Failed to store refresh token");
        return HttpResponse::InternalServerError().finish();
    }

    HttpResponse::Ok().json(json!({
        "access_token": access_token,
        "refresh_token": new_refresh_token,
    }))
}

/// Logout: revoke the presented refresh token
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Logged out"),
        (status = 401, description = "Invalid token")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn logout(
    req: HttpRequest,
    pool: web::Data<SqlitePool>,
    config: web::Data<Config>,
) -> impl Responder {
    let token = match bearer_token(&req) {
        Some(t) => t,
        None => return HttpResponse::Unauthorized().body("No token"),
    };

    let claims = match verify_token(token, &config.jwt_secret) {
        Ok(c) if c.token_type == TokenType::Refresh => c,
        _ => return HttpResponse::Unauthorized().finish(),
    };

    match store::find_refresh_token(pool.get_ref(), &claims.jti).await {
        Ok(Some(record)) => {
            if let Err(e) = store::revoke_refresh_token(pool.get_ref(), record.id).await {
                error!(error = %e, "Failed to revoke refresh token");
                return HttpResponse::InternalServerError().finish();
            }
        }
        Ok(None) => {}
        Err(e) => {
            error!(error = %e, "Database error during logout");
            return HttpResponse::InternalServerError().finish();
        }
    }

    HttpResponse::Ok().json(json!({ "message": "Logged out" }))
}

#[derive(Deserialize, ToSchema)]
pub struct RecoverReq {
    #[schema(example = "acme")]
    pub username: String,
}

/// Start credential recovery.
///
/// Issues a short-lived single-use reset token for the username. The token
/// is handed to the employer out of band; no stored secret is ever
/// disclosed.
#[utoipa::path(
    post,
    path = "/auth/recover",
    request_body = RecoverReq,
    responses(
        (status = 200, description = "Reset token issued", body = Object, example = json!({
            "reset_token": "eyJ..."
        })),
        (status = 404, description = "Username not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Auth"
)]
pub async fn recover(
    req: web::Json<RecoverReq>,
    pool: web::Data<SqlitePool>,
    config: web::Data<Config>,
) -> impl Responder {
    let employer = match store::employer_by_username(pool.get_ref(), req.username.trim()).await {
        Ok(Some(e)) => e,
        Ok(None) => {
            info!("Recovery requested for unknown username");
            return HttpResponse::NotFound().json(json!({ "message": "Username not found" }));
        }
        Err(e) => {
            error!(error = %e, "Database error during recovery");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let reset_token = match generate_reset_token(
        employer.id,
        employer.username,
        &config.jwt_secret,
        &employer.pwd_hash,
        config.reset_token_ttl,
    ) {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Failed to generate reset token");
            return HttpResponse::InternalServerError().finish();
        }
    };

    info!(employer_id = employer.id, "Reset token issued");

    HttpResponse::Ok().json(json!({ "reset_token": reset_token }))
}

#[derive(Deserialize, ToSchema)]
pub struct ResetReq {
    #[schema(example = "acme")]
    pub username: String,
    pub reset_token: String,
    pub new_password: String,
}

/// Complete credential recovery with a reset token
#[utoipa::path(
    post,
    path = "/auth/reset",
    request_body = ResetReq,
    responses(
        (status = 200, description = "Password updated", body = Object, example = json!({
            "message": "Password updated"
        })),
        (status = 401, description = "Invalid or expired reset token"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Auth"
)]
pub async fn reset_password(
    req: web::Json<ResetReq>,
    pool: web::Data<SqlitePool>,
    config: web::Data<Config>,
) -> impl Responder {
    if req.new_password.len() < 12 {
        return HttpResponse::BadRequest().body("Password must be at least 12 characters long");
    }

    let employer = match store::employer_by_username(pool.get_ref(), req.username.trim()).await {
        Ok(Some(e)) => e,
        Ok(None) => return HttpResponse::Unauthorized().finish(),
        Err(e) => {
            error!(error = %e, "Database error during reset");
            return HttpResponse::InternalServerError().finish();
        }
    };

    // Keyed with the current hash: verifies once, dies with the old hash.
    let claims =
        match verify_reset_token(&req.reset_token, &config.jwt_secret, &employer.pwd_hash) {
            Ok(c) if c.token_type == TokenType::Reset && c.employer_id == employer.id => c,
            _ => {
                info!("Reset token rejected");
                return HttpResponse::Unauthorized().finish();
            }
        };

    let new_hash = match hash_password(&req.new_password) {
        Ok(h) => h,
        Err(e) => {
            error!(error = %e, "Failed to hash new password");
            return HttpResponse::InternalServerError().finish();
        }
    };

    if let Err(e) = store::update_employer_password(pool.get_ref(), employer.id, &new_hash).await {
        error!(error = %e, "Failed to update password");
        return HttpResponse::InternalServerError().finish();
    }

    // Every open session dies with the old credential.
    if let Err(e) = store::revoke_all_refresh_tokens(pool.get_ref(), employer.id).await {
        error!(error = %e, "Failed to revoke sessions after reset");
        return HttpResponse::InternalServerError().finish();
    }

    info!(employer_id = claims.employer_id, "Password reset completed");

    HttpResponse::Ok().json(json!({ "message": "Password updated" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use crate::store::fixtures::seed_employer;

    #[tokio::test]
    async fn reset_flow_rotates_the_hash_and_kills_the_token() {
        let pool = test_pool().await;
        let old_hash = hash_password("old-password-123").unwrap();
        let employer_id = seed_employer(&pool, "acme", &old_hash).await;

        let token =
            generate_reset_token(employer_id, "acme".into(), "secret", &old_hash, 60).unwrap();
        assert!(verify_reset_token(&token, "secret", &old_hash).is_ok());

        let new_hash = hash_password("new-password-456").unwrap();
        store::update_employer_password(&pool, employer_id, &new_hash)
            .await
            .unwrap();

        let stored = store::employer_by_username(&pool, "acme")
            .await
            .unwrap()
            .unwrap();
        assert!(verify_password("new-password-456", &stored.pwd_hash).is_ok());
        // The issued token no longer verifies against the stored hash.
        assert!(verify_reset_token(&token, "secret", &stored.pwd_hash).is_err());
    }
}
