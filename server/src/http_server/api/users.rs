use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHasher};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use color_eyre::eyre::eyre;
use db::subscriptions::Subscription;
use db::users::User;
use serde::Deserialize;
use uuid::Uuid;

use crate::http_server::current_user::CurrentUser;
use crate::http_server::errors::ApiError;
use crate::http_server::pagination::{Paginated, Pagination};
use crate::http_server::serializers::{SubscriptionResponse, UserResponse, ViewerContext};
use crate::http_server::ResponseResult;
use crate::AppState;

#[derive(Deserialize)]
pub(crate) struct CreateUserRequest {
    username: String,
    email: String,
    first_name: String,
    last_name: String,
    password: String,
}

fn validate_signup(payload: &CreateUserRequest) -> Result<(), ApiError> {
    if payload.username.trim().is_empty() {
        return Err(ApiError::validation("username", "This field is required."));
    }
    if !payload
        .username
        .chars()
        .all(|c| c.is_alphanumeric() || "@.+-_".contains(c))
    {
        return Err(ApiError::validation(
            "username",
            "Only letters, digits and @/./+/-/_ are allowed.",
        ));
    }
    if payload.email.trim().is_empty() || !payload.email.contains('@') {
        return Err(ApiError::validation("email", "Enter a valid email address."));
    }
    if payload.first_name.trim().is_empty() {
        return Err(ApiError::validation("first_name", "This field is required."));
    }
    if payload.last_name.trim().is_empty() {
        return Err(ApiError::validation("last_name", "This field is required."));
    }
    if payload.password.chars().count() < 8 {
        return Err(ApiError::validation(
            "password",
            "Password must be at least 8 characters.",
        ));
    }

    Ok(())
}

#[axum_macros::debug_handler]
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> ResponseResult<impl IntoResponse> {
    validate_signup(&payload)?;

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(payload.password.as_bytes(), &salt)
        .map_err(|e| eyre!("failed to hash password: {e}"))?
        .to_string();

    let user = User::create(
        &state.db,
        payload.username.trim(),
        payload.email.trim(),
        payload.first_name.trim(),
        payload.last_name.trim(),
        &password_hash,
    )
    .await?
    .ok_or_else(|| {
        ApiError::validation(
            "username",
            "A user with that username or email already exists.",
        )
    })?;

    let viewer = ViewerContext::default();

    Ok((
        StatusCode::CREATED,
        Json(UserResponse::new(&user, &viewer)),
    ))
}

#[axum_macros::debug_handler]
pub async fn list_users(
    State(state): State<AppState>,
    current: Option<CurrentUser>,
    Query(pagination): Query<Pagination>,
) -> ResponseResult<impl IntoResponse> {
    let viewer =
        ViewerContext::load_optional(&state.db, current.map(|c| c.user.user_id)).await?;

    let users = User::list(&state.db, pagination.limit(), pagination.offset()).await?;
    let count = User::count(&state.db).await?;

    let results: Vec<UserResponse> = users
        .iter()
        .map(|user| UserResponse::new(user, &viewer))
        .collect();

    Ok(Json(Paginated::new(
        &state.app.base_url,
        "/api/users",
        pagination,
        count,
        results,
    )))
}

#[axum_macros::debug_handler]
pub async fn me(
    State(state): State<AppState>,
    current: CurrentUser,
) -> ResponseResult<impl IntoResponse> {
    let viewer = ViewerContext::load(&state.db, current.user.user_id).await?;

    Ok(Json(UserResponse::new(&current.user, &viewer)))
}

#[axum_macros::debug_handler]
pub async fn get_user(
    State(state): State<AppState>,
    current: Option<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ResponseResult<impl IntoResponse> {
    let user = User::get_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("user"))?;

    let viewer =
        ViewerContext::load_optional(&state.db, current.map(|c| c.user.user_id)).await?;

    Ok(Json(UserResponse::new(&user, &viewer)))
}

#[derive(Deserialize)]
pub(crate) struct SubscriptionsQuery {
    page: Option<u32>,
    limit: Option<u32>,
    /// Caps the embedded recipe list per author.
    recipes_limit: Option<i64>,
}

#[axum_macros::debug_handler]
pub async fn subscriptions(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(query): Query<SubscriptionsQuery>,
) -> ResponseResult<impl IntoResponse> {
    let pagination = Pagination {
        page: query.page,
        limit: query.limit,
    };

    let viewer = ViewerContext::load(&state.db, current.user.user_id).await?;

    let authors = Subscription::authors_for_user(
        &state.db,
        current.user.user_id,
        pagination.limit(),
        pagination.offset(),
    )
    .await?;
    let count = Subscription::count_for_user(&state.db, current.user.user_id).await?;

    let mut results = Vec::with_capacity(authors.len());
    for author in &authors {
        results
            .push(SubscriptionResponse::build(&state.db, author, &viewer, query.recipes_limit).await?);
    }

    Ok(Json(Paginated::new(
        &state.app.base_url,
        "/api/users/subscriptions",
        pagination,
        count,
        results,
    )))
}

#[axum_macros::debug_handler]
pub async fn subscribe(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> ResponseResult<impl IntoResponse> {
    if id == current.user.user_id {
        return Err(ApiError::validation(
            "subscription",
            "You cannot subscribe to yourself.",
        ));
    }

    let author = User::get_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("user"))?;

    Subscription::create(&state.db, current.user.user_id, author.user_id)
        .await?
        .ok_or(ApiError::Conflict("subscription"))?;

    let viewer = ViewerContext::load(&state.db, current.user.user_id).await?;
    let body = SubscriptionResponse::build(&state.db, &author, &viewer, None).await?;

    Ok((StatusCode::CREATED, Json(body)))
}

#[axum_macros::debug_handler]
pub async fn unsubscribe(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> ResponseResult<impl IntoResponse> {
    let removed = Subscription::delete(&state.db, current.user.user_id, id).await?;
    if !removed {
        return Err(ApiError::NotFound("subscription"));
    }

    Ok(StatusCode::NO_CONTENT)
}
