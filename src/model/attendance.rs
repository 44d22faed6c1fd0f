use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One history table line: attendance joined to the employee display name.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct HistoryRow {
    #[schema(example = "Asha Rao")]
    pub employee_name: String,
    #[schema(value_type = String, format = "date", example = "2026-08-28")]
    pub date: NaiveDate,
    #[schema(value_type = String, example = "2026-08-28T09:00:00Z")]
    pub timestamp: DateTime<Utc>,
}
