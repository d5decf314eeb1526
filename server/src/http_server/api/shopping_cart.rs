use axum::extract::{Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use db::cart::CartEntry;
use serde::Deserialize;

use crate::http_server::current_user::CurrentUser;
use crate::http_server::ResponseResult;
use crate::shopping::{self, aggregate_lines};
use crate::AppState;

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Format {
    #[default]
    Txt,
    Pdf,
}

#[derive(Deserialize)]
pub(crate) struct DownloadQuery {
    #[serde(default)]
    format: Format,
}

/// `GET /api/recipes/download_shopping_cart` — aggregates the requester's
/// cart and streams it back as an attachment. The cart is re-read on every
/// call; nothing is cached between requests.
#[axum_macros::debug_handler]
pub async fn download(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(query): Query<DownloadQuery>,
) -> ResponseResult {
    let rows = CartEntry::ingredient_rows_for_user(&state.db, current.user.user_id).await?;
    let recipes = CartEntry::recipes_for_user(&state.db, current.user.user_id).await?;

    let lines = aggregate_lines(rows);
    let today = chrono::Utc::now().date_naive();

    let response = match query.format {
        Format::Txt => {
            let body = shopping::text::render_text(today, &lines, &recipes)?;
            (
                [
                    (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
                    (
                        header::CONTENT_DISPOSITION,
                        "attachment; filename=\"shopping_list.txt\"",
                    ),
                ],
                body,
            )
                .into_response()
        }
        Format::Pdf => {
            let body = shopping::pdf::render_pdf(&state.render, &lines, &recipes)?;
            (
                [
                    (header::CONTENT_TYPE, "application/pdf"),
                    (
                        header::CONTENT_DISPOSITION,
                        "attachment; filename=\"shopping_list.pdf\"",
                    ),
                ],
                body,
            )
                .into_response()
        }
    };

    Ok(response)
}
