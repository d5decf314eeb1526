use argon2::password_hash::PasswordHash;
use argon2::{Argon2, PasswordVerifier};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use color_eyre::eyre::eyre;
use db::sessions::Session;
use db::users::User;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::http_server::current_user::CurrentUser;
use crate::http_server::errors::ApiError;
use crate::http_server::ResponseResult;
use crate::AppState;

#[derive(Deserialize)]
pub(crate) struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Serialize)]
struct TokenResponse {
    auth_token: Uuid,
}

#[axum_macros::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ResponseResult<impl IntoResponse> {
    let user = User::get_by_email(&state.db, &payload.email)
        .await?
        .ok_or(ApiError::Unauthenticated)?;

    let parsed = PasswordHash::new(&user.password_hash)
        .map_err(|e| eyre!("stored password hash for {} unreadable: {e}", user.user_id))?;
    Argon2::default()
        .verify_password(payload.password.as_bytes(), &parsed)
        .map_err(|_| ApiError::Unauthenticated)?;

    let session = Session::create(&state.db, user.user_id).await?;

    Ok(Json(TokenResponse {
        auth_token: session.session_id,
    }))
}

#[axum_macros::debug_handler]
pub async fn logout(
    State(state): State<AppState>,
    current: CurrentUser,
) -> ResponseResult<impl IntoResponse> {
    Session::delete(&state.db, current.session.session_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
