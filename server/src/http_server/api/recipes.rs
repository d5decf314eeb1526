use std::collections::HashSet;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect};
use axum::Json;
use axum_extra::extract::Query;
use db::cart::CartEntry;
use db::favorites::Favorite;
use db::ingredients::Ingredient;
use db::recipes::{self, Recipe, RecipeFilters};
use db::tags::{RecipeTag, Tag};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::http_server::current_user::CurrentUser;
use crate::http_server::errors::ApiError;
use crate::http_server::pagination::{Paginated, Pagination};
use crate::http_server::serializers::{BriefRecipeResponse, RecipeResponse, ViewerContext};
use crate::http_server::ResponseResult;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub(crate) struct IngredientAmountPayload {
    pub id: Uuid,
    pub amount: i32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RecipePayload {
    pub name: String,
    pub text: String,
    pub cooking_time: i32,
    pub image: Option<String>,
    #[serde(default)]
    pub tags: Vec<Uuid>,
    #[serde(default)]
    pub ingredients: Vec<IngredientAmountPayload>,
}

impl RecipePayload {
    fn validate(&self) -> Result<(), ApiError> {
        if self.name.trim().is_empty() {
            return Err(ApiError::validation("name", "This field is required."));
        }
        if self.cooking_time < 1 {
            return Err(ApiError::validation(
                "cooking_time",
                "Cooking time must be at least 1 minute.",
            ));
        }
        if self.ingredients.is_empty() {
            return Err(ApiError::validation(
                "ingredients",
                "At least one ingredient is required.",
            ));
        }
        if self.ingredients.iter().any(|i| i.amount < 1) {
            return Err(ApiError::validation(
                "ingredients",
                "Ingredient amounts must be positive.",
            ));
        }

        let distinct: HashSet<Uuid> = self.ingredients.iter().map(|i| i.id).collect();
        if distinct.len() != self.ingredients.len() {
            return Err(ApiError::validation(
                "ingredients",
                "Duplicate ingredients in the list.",
            ));
        }

        Ok(())
    }

    /// Payload checks that need the catalog: every referenced ingredient
    /// and tag must exist.
    async fn validate_against_catalog(&self, state: &AppState) -> Result<(), ApiError> {
        let ingredient_ids: Vec<Uuid> = self.ingredients.iter().map(|i| i.id).collect();
        let known = Ingredient::count_existing(&state.db, &ingredient_ids).await?;
        if usize::try_from(known).ok() != Some(ingredient_ids.len()) {
            return Err(ApiError::validation(
                "ingredients",
                "Unknown ingredient id.",
            ));
        }

        let tag_ids: Vec<Uuid> = self.dedup_tags();
        let known = Tag::count_existing(&state.db, &tag_ids).await?;
        if usize::try_from(known).ok() != Some(tag_ids.len()) {
            return Err(ApiError::validation("tags", "Unknown tag id."));
        }

        Ok(())
    }

    fn dedup_tags(&self) -> Vec<Uuid> {
        let mut seen = HashSet::new();
        self.tags
            .iter()
            .copied()
            .filter(|id| seen.insert(*id))
            .collect()
    }

    fn ingredient_amounts(&self) -> Vec<(Uuid, i32)> {
        self.ingredients.iter().map(|i| (i.id, i.amount)).collect()
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RecipesQuery {
    page: Option<u32>,
    limit: Option<u32>,
    author: Option<Uuid>,
    /// Repeatable tag slug filter, OR semantics.
    #[serde(default)]
    tags: Vec<String>,
    is_favorited: Option<u8>,
    is_in_shopping_cart: Option<u8>,
}

#[axum_macros::debug_handler]
pub async fn list_recipes(
    State(state): State<AppState>,
    current: Option<CurrentUser>,
    Query(query): Query<RecipesQuery>,
) -> ResponseResult<impl IntoResponse> {
    let pagination = Pagination {
        page: query.page,
        limit: query.limit,
    };

    let viewer_id = current.map(|c| c.user.user_id);
    let viewer = ViewerContext::load_optional(&state.db, viewer_id).await?;

    let filters = RecipeFilters {
        author: query.author,
        tag_slugs: query.tags,
        favorited_by: viewer_id.filter(|_| query.is_favorited.unwrap_or(0) != 0),
        in_cart_of: viewer_id.filter(|_| query.is_in_shopping_cart.unwrap_or(0) != 0),
    };

    let recipes = Recipe::list(&state.db, &filters, pagination.limit(), pagination.offset()).await?;
    let count = Recipe::count(&state.db, &filters).await?;

    let mut results = Vec::with_capacity(recipes.len());
    for recipe in recipes {
        results.push(RecipeResponse::build(&state.db, recipe, &viewer).await?);
    }

    Ok(Json(Paginated::new(
        &state.app.base_url,
        "/api/recipes",
        pagination,
        count,
        results,
    )))
}

#[axum_macros::debug_handler]
pub async fn create_recipe(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(payload): Json<RecipePayload>,
) -> ResponseResult<impl IntoResponse> {
    payload.validate()?;
    payload.validate_against_catalog(&state).await?;

    let recipe = Recipe::create(
        &state.db,
        payload.name.trim(),
        &payload.text,
        payload.cooking_time,
        current.user.user_id,
        payload.image.as_deref(),
    )
    .await?;

    recipes::set_ingredients_for_recipe(&state.db, recipe.recipe_id, &payload.ingredient_amounts())
        .await?;
    RecipeTag::set_tags_for_recipe(&state.db, recipe.recipe_id, &payload.dedup_tags()).await?;

    let viewer = ViewerContext::load(&state.db, current.user.user_id).await?;
    let body = RecipeResponse::build(&state.db, recipe, &viewer).await?;

    Ok((StatusCode::CREATED, Json(body)))
}

#[axum_macros::debug_handler]
pub async fn get_recipe(
    State(state): State<AppState>,
    current: Option<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ResponseResult<impl IntoResponse> {
    let recipe = Recipe::get_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("recipe"))?;

    let viewer =
        ViewerContext::load_optional(&state.db, current.map(|c| c.user.user_id)).await?;

    Ok(Json(RecipeResponse::build(&state.db, recipe, &viewer).await?))
}

#[axum_macros::debug_handler]
pub async fn update_recipe(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<RecipePayload>,
) -> ResponseResult<impl IntoResponse> {
    let recipe = Recipe::get_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("recipe"))?;

    if recipe.author_user_id != current.user.user_id {
        return Err(ApiError::PermissionDenied);
    }

    payload.validate()?;
    payload.validate_against_catalog(&state).await?;

    let updated = recipe
        .update(
            &state.db,
            payload.name.trim(),
            &payload.text,
            payload.cooking_time,
            payload.image.as_deref(),
        )
        .await?;

    recipes::set_ingredients_for_recipe(&state.db, updated.recipe_id, &payload.ingredient_amounts())
        .await?;
    RecipeTag::set_tags_for_recipe(&state.db, updated.recipe_id, &payload.dedup_tags()).await?;

    let viewer = ViewerContext::load(&state.db, current.user.user_id).await?;
    let body = RecipeResponse::build(&state.db, updated, &viewer).await?;

    Ok(Json(body))
}

#[axum_macros::debug_handler]
pub async fn delete_recipe(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> ResponseResult<impl IntoResponse> {
    let recipe = Recipe::get_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("recipe"))?;

    if recipe.author_user_id != current.user.user_id {
        return Err(ApiError::PermissionDenied);
    }

    recipe.delete(&state.db).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Serialize)]
struct ShortLinkResponse {
    #[serde(rename = "short-link")]
    short_link: String,
}

#[axum_macros::debug_handler]
pub async fn get_link(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ResponseResult<impl IntoResponse> {
    Recipe::get_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("recipe"))?;

    Ok(Json(ShortLinkResponse {
        short_link: state.app.app_url(&format!("/s/{id}")),
    }))
}

/// Resolves a short link to the frontend recipe page.
#[axum_macros::debug_handler]
pub async fn short_link_redirect(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ResponseResult<impl IntoResponse> {
    Recipe::get_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("recipe"))?;

    Ok(Redirect::temporary(
        &state.app.app_url(&format!("/recipes/{id}")),
    ))
}

#[axum_macros::debug_handler]
pub async fn favorite(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> ResponseResult<impl IntoResponse> {
    let recipe = Recipe::get_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("recipe"))?;

    Favorite::create(&state.db, current.user.user_id, recipe.recipe_id)
        .await?
        .ok_or(ApiError::Conflict("favorite"))?;

    Ok((StatusCode::CREATED, Json(BriefRecipeResponse::from(&recipe))))
}

#[axum_macros::debug_handler]
pub async fn unfavorite(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> ResponseResult<impl IntoResponse> {
    let removed = Favorite::delete(&state.db, current.user.user_id, id).await?;
    if !removed {
        return Err(ApiError::NotFound("favorite"));
    }

    Ok(StatusCode::NO_CONTENT)
}

#[axum_macros::debug_handler]
pub async fn add_to_cart(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> ResponseResult<impl IntoResponse> {
    let recipe = Recipe::get_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("recipe"))?;

    CartEntry::create(&state.db, current.user.user_id, recipe.recipe_id)
        .await?
        .ok_or(ApiError::Conflict("shopping cart entry"))?;

    Ok((StatusCode::CREATED, Json(BriefRecipeResponse::from(&recipe))))
}

#[axum_macros::debug_handler]
pub async fn remove_from_cart(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> ResponseResult<impl IntoResponse> {
    let removed = CartEntry::delete(&state.db, current.user.user_id, id).await?;
    if !removed {
        return Err(ApiError::NotFound("shopping cart entry"));
    }

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> RecipePayload {
        RecipePayload {
            name: "Борщ".to_string(),
            text: "Варить час.".to_string(),
            cooking_time: 60,
            image: None,
            tags: vec![],
            ingredients: vec![IngredientAmountPayload {
                id: Uuid::new_v4(),
                amount: 500,
            }],
        }
    }

    #[test]
    fn valid_payload_passes() {
        assert!(payload().validate().is_ok());
    }

    #[test]
    fn cooking_time_under_a_minute_is_rejected() {
        let mut p = payload();
        p.cooking_time = 0;

        let err = p.validate().unwrap_err();
        assert!(matches!(
            err,
            ApiError::ValidationFailed {
                field: "cooking_time",
                ..
            }
        ));
    }

    #[test]
    fn empty_ingredient_list_is_rejected() {
        let mut p = payload();
        p.ingredients.clear();

        assert!(p.validate().is_err());
    }

    #[test]
    fn duplicate_ingredients_are_rejected() {
        let mut p = payload();
        let id = Uuid::new_v4();
        p.ingredients = vec![
            IngredientAmountPayload { id, amount: 1 },
            IngredientAmountPayload { id, amount: 2 },
        ];

        let err = p.validate().unwrap_err();
        assert!(matches!(
            err,
            ApiError::ValidationFailed {
                field: "ingredients",
                ..
            }
        ));
    }

    #[test]
    fn non_positive_amounts_are_rejected() {
        let mut p = payload();
        p.ingredients[0].amount = 0;

        assert!(p.validate().is_err());
    }

    #[test]
    fn blank_name_is_rejected() {
        let mut p = payload();
        p.name = "   ".to_string();

        assert!(p.validate().is_err());
    }

    #[test]
    fn tag_duplicates_are_dropped_silently() {
        let mut p = payload();
        let id = Uuid::new_v4();
        p.tags = vec![id, id];

        assert_eq!(p.dedup_tags(), vec![id]);
    }
}
