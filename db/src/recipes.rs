use chrono::{DateTime, Utc};
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Recipe {
    pub recipe_id: Uuid,
    pub name: String,
    pub text: String,
    pub cooking_time: i32,
    pub author_user_id: Uuid,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing filters, all optional. `favorited_by` / `in_cart_of` carry the
/// requesting user's id when the corresponding query flag is set.
#[derive(Debug, Clone, Default)]
pub struct RecipeFilters {
    pub author: Option<Uuid>,
    pub tag_slugs: Vec<String>,
    pub favorited_by: Option<Uuid>,
    pub in_cart_of: Option<Uuid>,
}

fn push_filters<'args>(
    builder: &mut QueryBuilder<'args, Postgres>,
    filters: &'args RecipeFilters,
) {
    builder.push(" WHERE TRUE");

    if let Some(author) = filters.author {
        builder.push(" AND r.author_user_id = ");
        builder.push_bind(author);
    }

    if !filters.tag_slugs.is_empty() {
        builder.push(
            " AND EXISTS (
                SELECT 1
                FROM recipe_tags rt
                JOIN tags t ON t.tag_id = rt.tag_id
                WHERE rt.recipe_id = r.recipe_id AND t.slug = ANY(",
        );
        builder.push_bind(&filters.tag_slugs);
        builder.push("))");
    }

    if let Some(user_id) = filters.favorited_by {
        builder.push(
            " AND EXISTS (
                SELECT 1
                FROM favorites f
                WHERE f.recipe_id = r.recipe_id AND f.user_id = ",
        );
        builder.push_bind(user_id);
        builder.push(")");
    }

    if let Some(user_id) = filters.in_cart_of {
        builder.push(
            " AND EXISTS (
                SELECT 1
                FROM cart_entries c
                WHERE c.recipe_id = r.recipe_id AND c.user_id = ",
        );
        builder.push_bind(user_id);
        builder.push(")");
    }
}

impl Recipe {
    pub async fn create(
        pool: &PgPool,
        name: &str,
        text: &str,
        cooking_time: i32,
        author_user_id: Uuid,
        image_url: Option<&str>,
    ) -> Result<Self> {
        let recipe = sqlx::query_as::<_, Recipe>(
            "
            INSERT INTO recipes (name, text, cooking_time, author_user_id, image_url)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            ",
        )
        .bind(name)
        .bind(text)
        .bind(cooking_time)
        .bind(author_user_id)
        .bind(image_url)
        .fetch_one(pool)
        .await?;

        Ok(recipe)
    }

    pub async fn get_by_id(pool: &PgPool, recipe_id: Uuid) -> Result<Option<Self>> {
        let recipe = sqlx::query_as::<_, Recipe>(
            "
            SELECT *
            FROM recipes
            WHERE recipe_id = $1
            ",
        )
        .bind(recipe_id)
        .fetch_optional(pool)
        .await?;

        Ok(recipe)
    }

    pub async fn update(
        &self,
        pool: &PgPool,
        name: &str,
        text: &str,
        cooking_time: i32,
        image_url: Option<&str>,
    ) -> Result<Self> {
        let updated = sqlx::query_as::<_, Recipe>(
            "
            UPDATE recipes
            SET name = $2,
                text = $3,
                cooking_time = $4,
                image_url = $5,
                updated_at = NOW()
            WHERE recipe_id = $1
            RETURNING *
            ",
        )
        .bind(self.recipe_id)
        .bind(name)
        .bind(text)
        .bind(cooking_time)
        .bind(image_url)
        .fetch_one(pool)
        .await?;

        Ok(updated)
    }

    /// Cascades to ingredient/tag associations, favorites and cart entries.
    pub async fn delete(&self, pool: &PgPool) -> Result<bool> {
        let result = sqlx::query("DELETE FROM recipes WHERE recipe_id = $1")
            .bind(self.recipe_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn list(
        pool: &PgPool,
        filters: &RecipeFilters,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>> {
        let mut builder = QueryBuilder::new("SELECT r.* FROM recipes r");
        push_filters(&mut builder, filters);
        builder.push(" ORDER BY r.name, r.recipe_id LIMIT ");
        builder.push_bind(limit);
        builder.push(" OFFSET ");
        builder.push_bind(offset);

        let recipes = builder
            .build_query_as::<Recipe>()
            .fetch_all(pool)
            .await?;

        Ok(recipes)
    }

    pub async fn count(pool: &PgPool, filters: &RecipeFilters) -> Result<i64> {
        let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM recipes r");
        push_filters(&mut builder, filters);

        let count: i64 = builder.build_query_scalar().fetch_one(pool).await?;

        Ok(count)
    }

    /// Recipes by one author, name order. `limit` of `None` means all of
    /// them (`LIMIT NULL` in Postgres).
    pub async fn list_by_author(
        pool: &PgPool,
        author_user_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<Self>> {
        let recipes = sqlx::query_as::<_, Recipe>(
            "
            SELECT *
            FROM recipes
            WHERE author_user_id = $1
            ORDER BY name, recipe_id
            LIMIT $2
            ",
        )
        .bind(author_user_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(recipes)
    }

    pub async fn count_by_author(pool: &PgPool, author_user_id: Uuid) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM recipes WHERE author_user_id = $1")
                .bind(author_user_id)
                .fetch_one(pool)
                .await?;

        Ok(count)
    }
}

/// One ingredient row of a recipe, joined with the catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct RecipeIngredientDetail {
    pub ingredient_id: Uuid,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

impl RecipeIngredientDetail {
    pub async fn get_by_recipe(pool: &PgPool, recipe_id: Uuid) -> Result<Vec<Self>> {
        let ingredients = sqlx::query_as::<_, RecipeIngredientDetail>(
            "
            SELECT i.ingredient_id, i.name, i.measurement_unit, ri.amount
            FROM recipe_ingredients ri
            JOIN ingredients i ON i.ingredient_id = ri.ingredient_id
            WHERE ri.recipe_id = $1
            ORDER BY ri.display_order, i.name
            ",
        )
        .bind(recipe_id)
        .fetch_all(pool)
        .await?;

        Ok(ingredients)
    }
}

/// Replaces the recipe's ingredient list. Pair order becomes the display
/// order.
pub async fn set_ingredients_for_recipe(
    pool: &PgPool,
    recipe_id: Uuid,
    ingredient_amounts: &[(Uuid, i32)],
) -> Result<()> {
    let mut transaction = pool.begin().await?;

    sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
        .bind(recipe_id)
        .execute(&mut *transaction)
        .await?;

    for (order, (ingredient_id, amount)) in ingredient_amounts.iter().enumerate() {
        sqlx::query(
            "
            INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount, display_order)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(recipe_id)
        .bind(ingredient_id)
        .bind(amount)
        .bind(i32::try_from(order)?)
        .execute(&mut *transaction)
        .await?;
    }

    transaction.commit().await?;

    Ok(())
}
