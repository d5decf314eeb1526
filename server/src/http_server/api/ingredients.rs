use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use db::ingredients::Ingredient;
use serde::Deserialize;
use uuid::Uuid;

use crate::http_server::errors::ApiError;
use crate::http_server::serializers::IngredientResponse;
use crate::http_server::ResponseResult;
use crate::AppState;

#[derive(Deserialize)]
pub(crate) struct IngredientsQuery {
    /// Case-insensitive name prefix filter.
    name: Option<String>,
}

#[axum_macros::debug_handler]
pub async fn list_ingredients(
    State(state): State<AppState>,
    Query(query): Query<IngredientsQuery>,
) -> ResponseResult<impl IntoResponse> {
    let ingredients = match query.name.as_deref() {
        Some(prefix) if !prefix.is_empty() => {
            Ingredient::search_by_prefix(&state.db, prefix).await?
        }
        _ => Ingredient::list_all(&state.db).await?,
    };

    let ingredients: Vec<IngredientResponse> = ingredients
        .into_iter()
        .map(IngredientResponse::from)
        .collect();

    Ok(Json(ingredients))
}

#[axum_macros::debug_handler]
pub async fn get_ingredient(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ResponseResult<impl IntoResponse> {
    let ingredient = Ingredient::get_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("ingredient"))?;

    Ok(Json(IngredientResponse::from(ingredient)))
}
