use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::error;
use utoipa::ToSchema;

use crate::{auth::extract::AuthEmployer, model::employee::Employee, store};

#[derive(Serialize, ToSchema)]
pub struct EmployeeListResponse {
    pub data: Vec<Employee>,
    #[schema(example = 12)]
    pub total: usize,
}

/// The acting employer's roster. Read-only: employee records are managed
/// outside this application.
#[utoipa::path(
    get,
    path = "/api/v1/employees",
    responses(
        (status = 200, description = "Roster ordered by name", body = EmployeeListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn list_employees(
    auth: AuthEmployer,
    pool: web::Data<SqlitePool>,
) -> actix_web::Result<impl Responder> {
    let employees = store::list_employees(pool.get_ref(), auth.employer_id)
        .await
        .map_err(|e| {
            error!(error = %e, employer_id = auth.employer_id, "Failed to fetch roster");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let total = employees.len();
    Ok(HttpResponse::Ok().json(EmployeeListResponse {
        data: employees,
        total,
    }))
}
