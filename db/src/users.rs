use chrono::{DateTime, Utc};
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Inserts a new user. Returns `None` when the username or email is
    /// already taken.
    pub async fn create(
        pool: &PgPool,
        username: &str,
        email: &str,
        first_name: &str,
        last_name: &str,
        password_hash: &str,
    ) -> Result<Option<Self>> {
        let user = sqlx::query_as::<_, User>(
            "
            INSERT INTO users (username, email, first_name, last_name, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT DO NOTHING
            RETURNING *
            ",
        )
        .bind(username)
        .bind(email)
        .bind(first_name)
        .bind(last_name)
        .bind(password_hash)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    pub async fn get_by_id(pool: &PgPool, user_id: Uuid) -> Result<Option<Self>> {
        let user = sqlx::query_as::<_, User>(
            "
            SELECT *
            FROM users
            WHERE user_id = $1
            ",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    pub async fn get_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>> {
        let user = sqlx::query_as::<_, User>(
            "
            SELECT *
            FROM users
            WHERE email = $1
            ",
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Self>> {
        let users = sqlx::query_as::<_, User>(
            "
            SELECT *
            FROM users
            ORDER BY username
            LIMIT $1 OFFSET $2
            ",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(users)
    }

    pub async fn count(pool: &PgPool) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Display form used by the shopping list export.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test]
    async fn duplicate_username_or_email_returns_none(pool: PgPool) {
        let first = User::create(&pool, "ivanov", "ivanov@example.com", "Иван", "Иванов", "h")
            .await
            .unwrap();
        assert!(first.is_some());

        let same_username =
            User::create(&pool, "ivanov", "other@example.com", "Иван", "Иванов", "h")
                .await
                .unwrap();
        assert!(same_username.is_none());

        let same_email = User::create(&pool, "petrov", "ivanov@example.com", "Пётр", "Петров", "h")
            .await
            .unwrap();
        assert!(same_email.is_none());
    }

    #[sqlx::test]
    async fn display_name_joins_first_and_last(pool: PgPool) {
        let user = User::create(&pool, "ivanov", "ivanov@example.com", "Иван", "Иванов", "h")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(user.display_name(), "Иван Иванов");
    }
}
