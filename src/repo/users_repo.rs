use crate::domain::principal::UserProfile;
use crate::repo::UserDirectory;
use anyhow::Result;
use sqlx::{PgPool, Row};

/// Read-only view of the accounts table owned by the auth service.
#[derive(Clone)]
pub struct UsersRepo {
    pub pool: PgPool,
}

#[async_trait::async_trait]
impl UserDirectory for UsersRepo {
    async fn find_profile(&self, user_id: i64) -> Result<Option<UserProfile>> {
        let row = sqlx::query("SELECT id, email, full_name FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| UserProfile {
            id: r.get("id"),
            email: r.get("email"),
            full_name: r.get("full_name"),
        }))
    }
}
