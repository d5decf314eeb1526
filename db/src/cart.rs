use chrono::{DateTime, Utc};
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Membership of a recipe in a user's shopping cart, unique per
/// (user, recipe).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CartEntry {
    pub cart_entry_id: Uuid,
    pub user_id: Uuid,
    pub recipe_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// One unaggregated ingredient occurrence across the cart: a single
/// recipe's (ingredient, amount) row. Summing happens in the server's
/// shopping module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CartIngredientRow {
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

/// A recipe referenced by the cart, with its author's display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CartRecipe {
    pub name: String,
    pub author: String,
}

impl CartEntry {
    /// Returns `None` when the recipe is already in the cart.
    pub async fn create(pool: &PgPool, user_id: Uuid, recipe_id: Uuid) -> Result<Option<Self>> {
        let entry = sqlx::query_as::<_, CartEntry>(
            "
            INSERT INTO cart_entries (user_id, recipe_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            RETURNING *
            ",
        )
        .bind(user_id)
        .bind(recipe_id)
        .fetch_optional(pool)
        .await?;

        Ok(entry)
    }

    pub async fn delete(pool: &PgPool, user_id: Uuid, recipe_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM cart_entries WHERE user_id = $1 AND recipe_id = $2")
            .bind(user_id)
            .bind(recipe_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// All recipe ids in the user's cart, for serializer flags.
    pub async fn recipe_ids_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Uuid>> {
        let ids: Vec<Uuid> =
            sqlx::query_scalar("SELECT recipe_id FROM cart_entries WHERE user_id = $1")
                .bind(user_id)
                .fetch_all(pool)
                .await?;

        Ok(ids)
    }

    /// Flattened join of the user's cart entries to their recipes'
    /// ingredient rows. One row per (recipe, ingredient); no grouping here.
    pub async fn ingredient_rows_for_user(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<CartIngredientRow>> {
        let rows = sqlx::query_as::<_, CartIngredientRow>(
            "
            SELECT i.name, i.measurement_unit, ri.amount
            FROM cart_entries c
            JOIN recipe_ingredients ri ON ri.recipe_id = c.recipe_id
            JOIN ingredients i ON i.ingredient_id = ri.ingredient_id
            WHERE c.user_id = $1
            ORDER BY i.name, i.measurement_unit
            ",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }

    /// Distinct recipes referenced by the user's cart, name order, with the
    /// author rendered as `first_name last_name`.
    pub async fn recipes_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<CartRecipe>> {
        let recipes = sqlx::query_as::<_, CartRecipe>(
            "
            SELECT r.name, u.first_name || ' ' || u.last_name AS author
            FROM cart_entries c
            JOIN recipes r ON r.recipe_id = c.recipe_id
            JOIN users u ON u.user_id = r.author_user_id
            WHERE c.user_id = $1
            ORDER BY r.name
            ",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(recipes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingredients::Ingredient;
    use crate::recipes::{set_ingredients_for_recipe, Recipe};
    use crate::users::User;

    async fn test_user(pool: &PgPool, username: &str) -> User {
        User::create(
            pool,
            username,
            &format!("{username}@example.com"),
            "Иван",
            "Иванов",
            "not-a-real-hash",
        )
        .await
        .unwrap()
        .unwrap()
    }

    #[sqlx::test]
    async fn cart_rows_flatten_every_recipe_ingredient(pool: PgPool) {
        let author = test_user(&pool, "author").await;
        let buyer = test_user(&pool, "buyer").await;

        let potato = Ingredient::create(&pool, "картофель", "г")
            .await
            .unwrap()
            .unwrap();
        let salt = Ingredient::create(&pool, "соль", "г").await.unwrap().unwrap();

        let borscht = Recipe::create(&pool, "Борщ", "Варить час.", 60, author.user_id, None)
            .await
            .unwrap();
        set_ingredients_for_recipe(
            &pool,
            borscht.recipe_id,
            &[(potato.ingredient_id, 500), (salt.ingredient_id, 5)],
        )
        .await
        .unwrap();

        let puree = Recipe::create(&pool, "Пюре", "Толочь.", 30, author.user_id, None)
            .await
            .unwrap();
        set_ingredients_for_recipe(&pool, puree.recipe_id, &[(potato.ingredient_id, 200)])
            .await
            .unwrap();

        CartEntry::create(&pool, buyer.user_id, borscht.recipe_id)
            .await
            .unwrap()
            .unwrap();
        CartEntry::create(&pool, buyer.user_id, puree.recipe_id)
            .await
            .unwrap()
            .unwrap();

        let rows = CartEntry::ingredient_rows_for_user(&pool, buyer.user_id)
            .await
            .unwrap();

        // One row per (recipe, ingredient) pair, unaggregated.
        assert_eq!(rows.len(), 3);
        let potato_total: i64 = rows
            .iter()
            .filter(|row| row.name == "картофель")
            .map(|row| i64::from(row.amount))
            .sum();
        assert_eq!(potato_total, 700);

        let recipes_in_cart = CartEntry::recipes_for_user(&pool, buyer.user_id)
            .await
            .unwrap();
        assert_eq!(
            recipes_in_cart,
            vec![
                CartRecipe {
                    name: "Борщ".to_string(),
                    author: "Иван Иванов".to_string(),
                },
                CartRecipe {
                    name: "Пюре".to_string(),
                    author: "Иван Иванов".to_string(),
                },
            ]
        );
    }

    #[sqlx::test]
    async fn duplicate_cart_entry_is_rejected(pool: PgPool) {
        let author = test_user(&pool, "author").await;
        let recipe = Recipe::create(&pool, "Блины", "Жарить.", 20, author.user_id, None)
            .await
            .unwrap();

        let first = CartEntry::create(&pool, author.user_id, recipe.recipe_id)
            .await
            .unwrap();
        assert!(first.is_some());

        let second = CartEntry::create(&pool, author.user_id, recipe.recipe_id)
            .await
            .unwrap();
        assert!(second.is_none());
    }

    #[sqlx::test]
    async fn empty_cart_yields_empty_lists(pool: PgPool) {
        let buyer = test_user(&pool, "buyer").await;

        let rows = CartEntry::ingredient_rows_for_user(&pool, buyer.user_id)
            .await
            .unwrap();
        let recipes_in_cart = CartEntry::recipes_for_user(&pool, buyer.user_id)
            .await
            .unwrap();

        assert!(rows.is_empty());
        assert!(recipes_in_cart.is_empty());
    }

    #[sqlx::test]
    async fn removing_a_recipe_empties_its_rows(pool: PgPool) {
        let author = test_user(&pool, "author").await;
        let onion = Ingredient::create(&pool, "лук", "шт")
            .await
            .unwrap()
            .unwrap();
        let recipe = Recipe::create(&pool, "Суп", "Варить.", 40, author.user_id, None)
            .await
            .unwrap();
        set_ingredients_for_recipe(&pool, recipe.recipe_id, &[(onion.ingredient_id, 2)])
            .await
            .unwrap();

        CartEntry::create(&pool, author.user_id, recipe.recipe_id)
            .await
            .unwrap()
            .unwrap();
        assert!(CartEntry::delete(&pool, author.user_id, recipe.recipe_id)
            .await
            .unwrap());

        let rows = CartEntry::ingredient_rows_for_user(&pool, author.user_id)
            .await
            .unwrap();
        assert!(rows.is_empty());

        // Deleting an entry that is no longer there reports false.
        assert!(!CartEntry::delete(&pool, author.user_id, recipe.recipe_id)
            .await
            .unwrap());
    }
}
