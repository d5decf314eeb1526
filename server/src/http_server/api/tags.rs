use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use db::tags::Tag;
use uuid::Uuid;

use crate::http_server::errors::ApiError;
use crate::http_server::serializers::TagResponse;
use crate::http_server::ResponseResult;
use crate::AppState;

#[axum_macros::debug_handler]
pub async fn list_tags(State(state): State<AppState>) -> ResponseResult<impl IntoResponse> {
    let tags: Vec<TagResponse> = Tag::list_all(&state.db)
        .await?
        .into_iter()
        .map(TagResponse::from)
        .collect();

    Ok(Json(tags))
}

#[axum_macros::debug_handler]
pub async fn get_tag(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ResponseResult<impl IntoResponse> {
    let tag = Tag::get_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("tag"))?;

    Ok(Json(TagResponse::from(tag)))
}
