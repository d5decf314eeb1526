use chrono::{DateTime, Utc};
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::users::User;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Subscription {
    pub subscription_id: Uuid,
    pub follower_user_id: Uuid,
    pub author_user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Subscription {
    /// Returns `None` when the follower already subscribes to the author.
    pub async fn create(
        pool: &PgPool,
        follower_user_id: Uuid,
        author_user_id: Uuid,
    ) -> Result<Option<Self>> {
        let subscription = sqlx::query_as::<_, Subscription>(
            "
            INSERT INTO subscriptions (follower_user_id, author_user_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            RETURNING *
            ",
        )
        .bind(follower_user_id)
        .bind(author_user_id)
        .fetch_optional(pool)
        .await?;

        Ok(subscription)
    }

    pub async fn delete(
        pool: &PgPool,
        follower_user_id: Uuid,
        author_user_id: Uuid,
    ) -> Result<bool> {
        let result = sqlx::query(
            "DELETE FROM subscriptions WHERE follower_user_id = $1 AND author_user_id = $2",
        )
        .bind(follower_user_id)
        .bind(author_user_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// All author ids the user follows, for serializer flags.
    pub async fn author_ids_for_user(pool: &PgPool, follower_user_id: Uuid) -> Result<Vec<Uuid>> {
        let ids: Vec<Uuid> =
            sqlx::query_scalar("SELECT author_user_id FROM subscriptions WHERE follower_user_id = $1")
                .bind(follower_user_id)
                .fetch_all(pool)
                .await?;

        Ok(ids)
    }

    /// Authors the user follows, username order, paginated.
    pub async fn authors_for_user(
        pool: &PgPool,
        follower_user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<User>> {
        let authors = sqlx::query_as::<_, User>(
            "
            SELECT u.*
            FROM users u
            JOIN subscriptions s ON s.author_user_id = u.user_id
            WHERE s.follower_user_id = $1
            ORDER BY u.username
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(follower_user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(authors)
    }

    pub async fn count_for_user(pool: &PgPool, follower_user_id: Uuid) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM subscriptions WHERE follower_user_id = $1")
                .bind(follower_user_id)
                .fetch_one(pool)
                .await?;

        Ok(count)
    }
}
