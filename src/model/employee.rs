use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "employer_id": 1,
        "name": "Asha Rao",
        "qr_code": "E-42"
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: i64,

    #[schema(example = 1)]
    pub employer_id: i64,

    #[schema(example = "Asha Rao")]
    pub name: String,

    /// Payload encoded in the employee's badge, unique per employer.
    #[schema(example = "E-42")]
    pub qr_code: String,
}
