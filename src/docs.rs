use crate::api::attendance::HistoryResponse;
use crate::api::employee::EmployeeListResponse;
use crate::api::scan::{FrameReq, ScanReq};
use crate::auth::handlers::{LoginReq, LoginResponse, RecoverReq, ResetReq};
use crate::model::attendance::HistoryRow;
use crate::model::employee::Employee;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Attendance Station API",
        version = "1.0.0",
        description = r#"
## QR Attendance Station

An employer logs in, scans employee badge QR codes, and reviews history.

- **Scan**: record attendance for a decoded payload, or post a raw camera
  frame and let the server decode it. At most one record per employee per
  calendar day, enforced by the store.
- **Attendance**: full history (date desc, time desc) and today's roll.
- **Employees**: read-only roster; records are managed outside this app.
- **Auth**: JWT bearer login with refresh rotation and a token-based
  password reset.
"#,
    ),
    paths(
        crate::auth::handlers::login,
        crate::auth::handlers::refresh_token,
        crate::auth::handlers::logout,
        crate::auth::handlers::recover,
        crate::auth::handlers::reset_password,

        crate::api::scan::scan,
        crate::api::scan::scan_frame,

        crate::api::attendance::history,
        crate::api::attendance::today,

        crate::api::employee::list_employees
    ),
    components(
        schemas(
            LoginReq,
            LoginResponse,
            RecoverReq,
            ResetReq,
            ScanReq,
            FrameReq,
            Employee,
            EmployeeListResponse,
            HistoryRow,
            HistoryResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Employer session APIs"),
        (name = "Scan", description = "QR scan ingestion APIs"),
        (name = "Attendance", description = "Attendance history APIs"),
        (name = "Employee", description = "Roster APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
