use chrono::{DateTime, Utc};
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// A DB-backed API token. The `session_id` is what clients present in the
/// `Authorization: Token <uuid>` header.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Session {
    pub session_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub async fn create(pool: &PgPool, user_id: Uuid) -> Result<Self> {
        let session = sqlx::query_as::<_, Session>(
            "
            INSERT INTO sessions (session_id, user_id)
            VALUES ($1, $2)
            RETURNING *
            ",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(session)
    }

    pub async fn get_by_id(pool: &PgPool, session_id: Uuid) -> Result<Option<Self>> {
        let session = sqlx::query_as::<_, Session>(
            "
            SELECT *
            FROM sessions
            WHERE session_id = $1
            ",
        )
        .bind(session_id)
        .fetch_optional(pool)
        .await?;

        Ok(session)
    }

    pub async fn delete(pool: &PgPool, session_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE session_id = $1")
            .bind(session_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
