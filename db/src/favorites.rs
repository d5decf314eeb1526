use chrono::{DateTime, Utc};
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// A user's bookmark of a recipe, independent of the shopping cart.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Favorite {
    pub favorite_id: Uuid,
    pub user_id: Uuid,
    pub recipe_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Favorite {
    /// Returns `None` when the recipe is already favorited.
    pub async fn create(pool: &PgPool, user_id: Uuid, recipe_id: Uuid) -> Result<Option<Self>> {
        let favorite = sqlx::query_as::<_, Favorite>(
            "
            INSERT INTO favorites (user_id, recipe_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            RETURNING *
            ",
        )
        .bind(user_id)
        .bind(recipe_id)
        .fetch_optional(pool)
        .await?;

        Ok(favorite)
    }

    pub async fn delete(pool: &PgPool, user_id: Uuid, recipe_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND recipe_id = $2")
            .bind(user_id)
            .bind(recipe_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// All recipe ids the user has favorited, for serializer flags.
    pub async fn recipe_ids_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Uuid>> {
        let ids: Vec<Uuid> =
            sqlx::query_scalar("SELECT recipe_id FROM favorites WHERE user_id = $1")
                .bind(user_id)
                .fetch_all(pool)
                .await?;

        Ok(ids)
    }
}
