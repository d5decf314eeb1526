use chrono::{DateTime, Utc};
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Catalog entry, unique on (name, measurement_unit). Seeded once and
/// read-only through the public API.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Ingredient {
    pub ingredient_id: Uuid,
    pub name: String,
    pub measurement_unit: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ingredient {
    /// Returns `None` when the (name, unit) pair is already in the catalog.
    pub async fn create(pool: &PgPool, name: &str, measurement_unit: &str) -> Result<Option<Self>> {
        let ingredient = sqlx::query_as::<_, Ingredient>(
            "
            INSERT INTO ingredients (name, measurement_unit)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            RETURNING *
            ",
        )
        .bind(name)
        .bind(measurement_unit)
        .fetch_optional(pool)
        .await?;

        Ok(ingredient)
    }

    pub async fn get_by_id(pool: &PgPool, ingredient_id: Uuid) -> Result<Option<Self>> {
        let ingredient = sqlx::query_as::<_, Ingredient>(
            "
            SELECT *
            FROM ingredients
            WHERE ingredient_id = $1
            ",
        )
        .bind(ingredient_id)
        .fetch_optional(pool)
        .await?;

        Ok(ingredient)
    }

    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>> {
        let ingredients = sqlx::query_as::<_, Ingredient>(
            "
            SELECT *
            FROM ingredients
            ORDER BY name, measurement_unit
            ",
        )
        .fetch_all(pool)
        .await?;

        Ok(ingredients)
    }

    /// Case-insensitive prefix search for the catalog autocomplete.
    pub async fn search_by_prefix(pool: &PgPool, prefix: &str) -> Result<Vec<Self>> {
        let escaped = prefix
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        let ingredients = sqlx::query_as::<_, Ingredient>(
            "
            SELECT *
            FROM ingredients
            WHERE name ILIKE $1
            ORDER BY name, measurement_unit
            ",
        )
        .bind(format!("{escaped}%"))
        .fetch_all(pool)
        .await?;

        Ok(ingredients)
    }

    /// How many of the given ids exist. Used to validate recipe payloads.
    pub async fn count_existing(pool: &PgPool, ingredient_ids: &[Uuid]) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM ingredients WHERE ingredient_id = ANY($1)")
                .bind(ingredient_ids)
                .fetch_one(pool)
                .await?;

        Ok(count)
    }
}
