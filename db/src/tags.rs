use chrono::{DateTime, Utc};
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tag {
    pub tag_id: Uuid,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tag {
    /// Returns `None` when a tag with the same name or slug already exists.
    pub async fn create(pool: &PgPool, name: &str, slug: &str) -> Result<Option<Self>> {
        let tag = sqlx::query_as::<_, Tag>(
            "
            INSERT INTO tags (name, slug)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            RETURNING *
            ",
        )
        .bind(name)
        .bind(slug)
        .fetch_optional(pool)
        .await?;

        Ok(tag)
    }

    pub async fn get_by_id(pool: &PgPool, tag_id: Uuid) -> Result<Option<Self>> {
        let tag = sqlx::query_as::<_, Tag>(
            "
            SELECT *
            FROM tags
            WHERE tag_id = $1
            ",
        )
        .bind(tag_id)
        .fetch_optional(pool)
        .await?;

        Ok(tag)
    }

    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>> {
        let tags = sqlx::query_as::<_, Tag>(
            "
            SELECT *
            FROM tags
            ORDER BY name
            ",
        )
        .fetch_all(pool)
        .await?;

        Ok(tags)
    }

    /// How many of the given ids exist. Used to validate recipe payloads.
    pub async fn count_existing(pool: &PgPool, tag_ids: &[Uuid]) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tags WHERE tag_id = ANY($1)")
            .bind(tag_ids)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeTag {
    pub recipe_id: Uuid,
    pub tag_id: Uuid,
}

impl RecipeTag {
    pub async fn get_by_recipe(pool: &PgPool, recipe_id: Uuid) -> Result<Vec<Tag>> {
        let tags = sqlx::query_as::<_, Tag>(
            "
            SELECT t.*
            FROM tags t
            JOIN recipe_tags rt ON t.tag_id = rt.tag_id
            WHERE rt.recipe_id = $1
            ORDER BY t.name
            ",
        )
        .bind(recipe_id)
        .fetch_all(pool)
        .await?;

        Ok(tags)
    }

    /// Replaces the recipe's tag set.
    pub async fn set_tags_for_recipe(
        pool: &PgPool,
        recipe_id: Uuid,
        tag_ids: &[Uuid],
    ) -> Result<()> {
        let mut transaction = pool.begin().await?;

        sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = $1")
            .bind(recipe_id)
            .execute(&mut *transaction)
            .await?;

        for tag_id in tag_ids {
            sqlx::query("INSERT INTO recipe_tags (recipe_id, tag_id) VALUES ($1, $2)")
                .bind(recipe_id)
                .bind(tag_id)
                .execute(&mut *transaction)
                .await?;
        }

        transaction.commit().await?;

        Ok(())
    }
}
