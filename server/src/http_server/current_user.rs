use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::{header, request::Parts};
use db::sessions::Session;
use db::users::User;
use uuid::Uuid;

use crate::http_server::errors::ApiError;
use crate::AppState;

/// The authenticated requester, resolved from the `Authorization:
/// Token <uuid>` header against the sessions table.
pub struct CurrentUser {
    pub user: User,
    pub session: Session,
}

fn auth_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Token ")
}

async fn lookup(state: &AppState, token: &str) -> Result<CurrentUser, ApiError> {
    let session_id = Uuid::parse_str(token.trim()).map_err(|_| ApiError::Unauthenticated)?;

    let session = Session::get_by_id(&state.db, session_id)
        .await?
        .ok_or(ApiError::Unauthenticated)?;

    let user = User::get_by_id(&state.db, session.user_id)
        .await?
        .ok_or(ApiError::Unauthenticated)?;

    Ok(CurrentUser { user, session })
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = auth_token(parts) else {
            return Err(ApiError::Unauthenticated);
        };

        lookup(state, token).await
    }
}

/// `Option<CurrentUser>` for endpoints that only personalize their output:
/// a missing header is anonymous, a present-but-invalid token still 401s.
impl OptionalFromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Option<Self>, Self::Rejection> {
        match auth_token(parts) {
            Some(token) => lookup(state, token).await.map(Some),
            None => Ok(None),
        }
    }
}
