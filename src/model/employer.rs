/// The acting employer as stored. Never serialized to clients; responses
/// carry at most the display name.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Employer {
    pub id: i64,
    pub username: String,
    pub display_name: String,
    pub pwd_hash: String,
}
