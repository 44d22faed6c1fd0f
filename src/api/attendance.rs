use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use sqlx::SqlitePool;
use tracing::error;
use utoipa::ToSchema;

use crate::{auth::extract::AuthEmployer, model::attendance::HistoryRow, store};

#[derive(Serialize, ToSchema)]
pub struct HistoryResponse {
    pub data: Vec<HistoryRow>,
    #[schema(example = 4)]
    pub total: usize,
}

/// Attendance history: every row for the acting employer, newest first
#[utoipa::path(
    get,
    path = "/api/v1/attendance/history",
    responses(
        (status = 200, description = "Rows ordered by date desc, then time desc", body = HistoryResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn history(
    auth: AuthEmployer,
    pool: web::Data<SqlitePool>,
) -> actix_web::Result<impl Responder> {
    let rows = store::history(pool.get_ref(), auth.employer_id)
        .await
        .map_err(|e| {
            error!(error = %e, employer_id = auth.employer_id, "Failed to fetch history");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let total = rows.len();
    Ok(HttpResponse::Ok().json(HistoryResponse { data: rows, total }))
}

/// Employees marked present today
#[utoipa::path(
    get,
    path = "/api/v1/attendance/today",
    responses(
        (status = 200, description = "Today's scans, most recent first", body = HistoryResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn today(
    auth: AuthEmployer,
    pool: web::Data<SqlitePool>,
) -> actix_web::Result<impl Responder> {
    let today = Utc::now().date_naive();
    let rows = store::present_on(pool.get_ref(), auth.employer_id, today)
        .await
        .map_err(|e| {
            error!(error = %e, employer_id = auth.employer_id, "Failed to fetch today's roll");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let total = rows.len();
    Ok(HttpResponse::Ok().json(json!({
        "date": today,
        "data": rows,
        "total": total,
    })))
}
