use actix_web::{web, HttpResponse, Responder};
use base64::Engine as _;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use tracing::error;
use utoipa::ToSchema;

use crate::{
    attendance::{record_scan, ScanOutcome},
    auth::extract::AuthEmployer,
    config::Config,
    error::AppError,
    scanner::QrDecoder,
};

#[derive(Deserialize, ToSchema)]
pub struct ScanReq {
    /// Decoded QR payload.
    #[schema(example = "E-42")]
    pub code: String,
}

/// Raw frame as the platform camera layer captured it: base64 RGBA plus
/// dimensions, the same shape a canvas `ImageData` carries.
#[derive(Deserialize, ToSchema)]
pub struct FrameReq {
    #[schema(example = 640)]
    pub width: u32,
    #[schema(example = 480)]
    pub height: u32,
    /// Base64-encoded RGBA pixels, `width * height * 4` bytes.
    pub pixels: String,
}

fn outcome_response(outcome: ScanOutcome, banner_ttl_ms: u64) -> HttpResponse {
    match outcome {
        ScanOutcome::Recorded(employee) => HttpResponse::Ok().json(json!({
            "status": "recorded",
            "employee": employee.name,
            "message": format!("{} marked present", employee.name),
            "clear_after_ms": banner_ttl_ms,
        })),
        ScanOutcome::AlreadyPresent(employee) => HttpResponse::Conflict().json(json!({
            "status": "duplicate",
            "employee": employee.name,
            "message": "Already marked present today",
            "clear_after_ms": banner_ttl_ms,
        })),
        ScanOutcome::UnknownCode => HttpResponse::NotFound().json(json!({
            "status": "not_found",
            "message": "Employee not found",
            "clear_after_ms": banner_ttl_ms,
        })),
    }
}

/// Record attendance for a decoded QR payload
#[utoipa::path(
    post,
    path = "/api/v1/scan",
    request_body = ScanReq,
    responses(
        (status = 200, description = "Attendance recorded", body = Object, example = json!({
            "status": "recorded", "employee": "Asha Rao",
            "message": "Asha Rao marked present", "clear_after_ms": 2500
        })),
        (status = 404, description = "No employee matches the code"),
        (status = 409, description = "Already marked present today"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Scan"
)]
pub async fn scan(
    auth: AuthEmployer,
    pool: web::Data<SqlitePool>,
    config: web::Data<Config>,
    payload: web::Json<ScanReq>,
) -> actix_web::Result<impl Responder> {
    let outcome = record_scan(
        pool.get_ref(),
        auth.employer_id,
        payload.code.trim(),
        Utc::now(),
    )
    .await
    .map_err(|e| {
        error!(error = %e, employer_id = auth.employer_id, "Scan failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(outcome_response(outcome, config.banner_ttl_ms))
}

pub(crate) fn frame_pixels(req: &FrameReq) -> Result<Vec<u8>, AppError> {
    let pixels = base64::engine::general_purpose::STANDARD
        .decode(&req.pixels)
        .map_err(|e| AppError::BadFrame(e.to_string()))?;

    // Dimensions are client-supplied; the product must not be trusted to
    // fit either.
    let expected = (req.width as usize)
        .checked_mul(req.height as usize)
        .and_then(|p| p.checked_mul(4))
        .ok_or_else(|| {
            AppError::BadFrame(format!("dimensions {}x{} overflow", req.width, req.height))
        })?;
    if req.width == 0 || req.height == 0 || pixels.len() != expected {
        return Err(AppError::BadFrame(format!(
            "expected {} bytes for {}x{} RGBA, got {}",
            expected,
            req.width,
            req.height,
            pixels.len()
        )));
    }
    Ok(pixels)
}

/// Decode a raw camera frame and record attendance if it holds a QR code
#[utoipa::path(
    post,
    path = "/api/v1/scan/frame",
    request_body = FrameReq,
    responses(
        (status = 200, description = "Frame processed; `status` is `recorded` or `no_code`"),
        (status = 400, description = "Malformed frame"),
        (status = 404, description = "No employee matches the decoded code"),
        (status = 409, description = "Already marked present today"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Scan"
)]
pub async fn scan_frame(
    auth: AuthEmployer,
    pool: web::Data<SqlitePool>,
    config: web::Data<Config>,
    decoder: web::Data<dyn QrDecoder>,
    payload: web::Json<FrameReq>,
) -> Result<HttpResponse, AppError> {
    let pixels = frame_pixels(&payload)?;

    let Some(code) = decoder.decode(&pixels, payload.width, payload.height) else {
        // No symbol in this frame; the station keeps sampling.
        return Ok(HttpResponse::Ok().json(json!({ "status": "no_code" })));
    };

    let outcome = record_scan(pool.get_ref(), auth.employer_id, code.trim(), Utc::now())
        .await
        .map_err(|e| {
            error!(error = %e, employer_id = auth.employer_id, "Frame scan failed");
            AppError::Database(e)
        })?;

    Ok(outcome_response(outcome, config.banner_ttl_ms))
}
