//! Response shapes of the JSON API. Kept separate from the db entities so
//! the wire format can stay stable while queries evolve.

use std::collections::HashSet;

use color_eyre::eyre::eyre;
use db::cart::CartEntry;
use db::favorites::Favorite;
use db::ingredients::Ingredient;
use db::recipes::{Recipe, RecipeIngredientDetail};
use db::subscriptions::Subscription;
use db::tags::{RecipeTag, Tag};
use db::users::User;
use db::PgPool;
use serde::Serialize;
use uuid::Uuid;

/// Everything about the requester the serializers need for their
/// `is_*` flags, loaded once per request.
#[derive(Debug, Default)]
pub struct ViewerContext {
    pub favorites: HashSet<Uuid>,
    pub cart: HashSet<Uuid>,
    pub subscriptions: HashSet<Uuid>,
}

impl ViewerContext {
    pub async fn load(pool: &PgPool, user_id: Uuid) -> color_eyre::Result<Self> {
        Ok(Self {
            favorites: Favorite::recipe_ids_for_user(pool, user_id)
                .await?
                .into_iter()
                .collect(),
            cart: CartEntry::recipe_ids_for_user(pool, user_id)
                .await?
                .into_iter()
                .collect(),
            subscriptions: Subscription::author_ids_for_user(pool, user_id)
                .await?
                .into_iter()
                .collect(),
        })
    }

    pub async fn load_optional(
        pool: &PgPool,
        user_id: Option<Uuid>,
    ) -> color_eyre::Result<Self> {
        match user_id {
            Some(user_id) => Self::load(pool, user_id).await,
            None => Ok(Self::default()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
    pub avatar: Option<String>,
}

impl UserResponse {
    pub fn new(user: &User, viewer: &ViewerContext) -> Self {
        Self {
            id: user.user_id,
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            is_subscribed: viewer.subscriptions.contains(&user.user_id),
            avatar: user.avatar_url.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TagResponse {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

impl From<Tag> for TagResponse {
    fn from(tag: Tag) -> Self {
        Self {
            id: tag.tag_id,
            name: tag.name,
            slug: tag.slug,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IngredientResponse {
    pub id: Uuid,
    pub name: String,
    pub measurement_unit: String,
}

impl From<Ingredient> for IngredientResponse {
    fn from(ingredient: Ingredient) -> Self {
        Self {
            id: ingredient.ingredient_id,
            name: ingredient.name,
            measurement_unit: ingredient.measurement_unit,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RecipeIngredientResponse {
    pub id: Uuid,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

impl From<RecipeIngredientDetail> for RecipeIngredientResponse {
    fn from(detail: RecipeIngredientDetail) -> Self {
        Self {
            id: detail.ingredient_id,
            name: detail.name,
            measurement_unit: detail.measurement_unit,
            amount: detail.amount,
        }
    }
}

/// Short recipe form used by favorites, the cart and subscriptions.
#[derive(Debug, Clone, Serialize)]
pub struct BriefRecipeResponse {
    pub id: Uuid,
    pub name: String,
    pub image: Option<String>,
    pub cooking_time: i32,
}

impl From<&Recipe> for BriefRecipeResponse {
    fn from(recipe: &Recipe) -> Self {
        Self {
            id: recipe.recipe_id,
            name: recipe.name.clone(),
            image: recipe.image_url.clone(),
            cooking_time: recipe.cooking_time,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RecipeResponse {
    pub id: Uuid,
    pub tags: Vec<TagResponse>,
    pub author: UserResponse,
    pub ingredients: Vec<RecipeIngredientResponse>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: Option<String>,
    pub text: String,
    pub cooking_time: i32,
}

impl RecipeResponse {
    pub async fn build(
        pool: &PgPool,
        recipe: Recipe,
        viewer: &ViewerContext,
    ) -> color_eyre::Result<Self> {
        let author = User::get_by_id(pool, recipe.author_user_id)
            .await?
            .ok_or_else(|| eyre!("recipe {} has no author row", recipe.recipe_id))?;

        let tags = RecipeTag::get_by_recipe(pool, recipe.recipe_id)
            .await?
            .into_iter()
            .map(TagResponse::from)
            .collect();

        let ingredients = RecipeIngredientDetail::get_by_recipe(pool, recipe.recipe_id)
            .await?
            .into_iter()
            .map(RecipeIngredientResponse::from)
            .collect();

        Ok(Self {
            id: recipe.recipe_id,
            tags,
            author: UserResponse::new(&author, viewer),
            ingredients,
            is_favorited: viewer.favorites.contains(&recipe.recipe_id),
            is_in_shopping_cart: viewer.cart.contains(&recipe.recipe_id),
            name: recipe.name,
            image: recipe.image_url,
            text: recipe.text,
            cooking_time: recipe.cooking_time,
        })
    }
}

/// A followed author with their recipes, for `/api/users/subscriptions`.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub recipes: Vec<BriefRecipeResponse>,
    pub recipes_count: i64,
}

impl SubscriptionResponse {
    pub async fn build(
        pool: &PgPool,
        author: &User,
        viewer: &ViewerContext,
        recipes_limit: Option<i64>,
    ) -> color_eyre::Result<Self> {
        let recipes = Recipe::list_by_author(pool, author.user_id, recipes_limit)
            .await?
            .iter()
            .map(BriefRecipeResponse::from)
            .collect();

        let recipes_count = Recipe::count_by_author(pool, author.user_id).await?;

        Ok(Self {
            user: UserResponse::new(author, viewer),
            recipes,
            recipes_count,
        })
    }
}
