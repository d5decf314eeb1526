use axum::routing::{get, post};
use axum::Router;

use super::api;
use super::errors::ApiError;
use crate::AppState;

pub(crate) fn make_router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/token/login", post(api::auth::login))
        .route("/api/auth/token/logout", post(api::auth::logout))
        .route(
            "/api/users",
            get(api::users::list_users).post(api::users::create_user),
        )
        .route("/api/users/me", get(api::users::me))
        .route("/api/users/subscriptions", get(api::users::subscriptions))
        .route("/api/users/{id}", get(api::users::get_user))
        .route(
            "/api/users/{id}/subscribe",
            post(api::users::subscribe).delete(api::users::unsubscribe),
        )
        .route("/api/tags", get(api::tags::list_tags))
        .route("/api/tags/{id}", get(api::tags::get_tag))
        .route("/api/ingredients", get(api::ingredients::list_ingredients))
        .route("/api/ingredients/{id}", get(api::ingredients::get_ingredient))
        .route(
            "/api/recipes",
            get(api::recipes::list_recipes).post(api::recipes::create_recipe),
        )
        .route(
            "/api/recipes/download_shopping_cart",
            get(api::shopping_cart::download),
        )
        .route(
            "/api/recipes/{id}",
            get(api::recipes::get_recipe)
                .patch(api::recipes::update_recipe)
                .delete(api::recipes::delete_recipe),
        )
        .route("/api/recipes/{id}/get-link", get(api::recipes::get_link))
        .route(
            "/api/recipes/{id}/favorite",
            post(api::recipes::favorite).delete(api::recipes::unfavorite),
        )
        .route(
            "/api/recipes/{id}/shopping_cart",
            post(api::recipes::add_to_cart).delete(api::recipes::remove_from_cart),
        )
        .route("/s/{id}", get(api::recipes::short_link_redirect))
        .fallback(fallback)
}

async fn fallback() -> ApiError {
    ApiError::NotFound("route")
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use db::cart::CartEntry;
    use db::ingredients::Ingredient;
    use db::recipes::{set_ingredients_for_recipe, Recipe};
    use db::sessions::Session;
    use db::users::User;
    use sqlx::PgPool;
    use tower::ServiceExt;

    use super::make_router;
    use crate::shopping::pdf::RenderConfig;
    use crate::{AppConfig, AppState};

    fn test_state(pool: PgPool) -> AppState {
        AppState {
            app: AppConfig {
                base_url: "http://localhost:3000".parse().unwrap(),
                port: 3000,
            },
            render: RenderConfig::default(),
            db: pool,
        }
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[sqlx::test(migrations = "../db/migrations")]
    async fn download_without_token_is_unauthorized(pool: PgPool) {
        let app = make_router().with_state(test_state(pool));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/recipes/download_shopping_cart")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[sqlx::test(migrations = "../db/migrations")]
    async fn unknown_route_is_not_found(pool: PgPool) {
        let app = make_router().with_state(test_state(pool));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/nonsense")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[sqlx::test(migrations = "../db/migrations")]
    async fn download_renders_the_aggregated_cart(pool: PgPool) {
        let author = User::create(
            &pool,
            "ivanov",
            "ivanov@example.com",
            "Иван",
            "Иванов",
            "not-a-real-hash",
        )
        .await
        .unwrap()
        .unwrap();
        let session = Session::create(&pool, author.user_id).await.unwrap();

        let potato = Ingredient::create(&pool, "картофель", "г")
            .await
            .unwrap()
            .unwrap();

        let borscht = Recipe::create(&pool, "Борщ", "Варить час.", 60, author.user_id, None)
            .await
            .unwrap();
        set_ingredients_for_recipe(&pool, borscht.recipe_id, &[(potato.ingredient_id, 500)])
            .await
            .unwrap();
        let puree = Recipe::create(&pool, "Пюре", "Толочь.", 30, author.user_id, None)
            .await
            .unwrap();
        set_ingredients_for_recipe(&pool, puree.recipe_id, &[(potato.ingredient_id, 200)])
            .await
            .unwrap();

        CartEntry::create(&pool, author.user_id, borscht.recipe_id)
            .await
            .unwrap()
            .unwrap();
        CartEntry::create(&pool, author.user_id, puree.recipe_id)
            .await
            .unwrap()
            .unwrap();

        let app = make_router().with_state(test_state(pool));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/recipes/download_shopping_cart")
                    .header(
                        header::AUTHORIZATION,
                        format!("Token {}", session.session_id),
                    )
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(header::CONTENT_DISPOSITION)
                .unwrap(),
            "attachment; filename=\"shopping_list.txt\""
        );

        let body = body_string(response).await;
        assert!(body.contains(" 01.Картофель - 700г"));
        assert!(body.contains(" Борщ (Иван Иванов)"));
        assert!(body.contains(" Пюре (Иван Иванов)"));
    }

    #[sqlx::test(migrations = "../db/migrations")]
    async fn download_of_an_empty_cart_is_a_validation_error(pool: PgPool) {
        let user = User::create(
            &pool,
            "petrov",
            "petrov@example.com",
            "Пётр",
            "Петров",
            "not-a-real-hash",
        )
        .await
        .unwrap()
        .unwrap();
        let session = Session::create(&pool, user.user_id).await.unwrap();

        let app = make_router().with_state(test_state(pool));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/recipes/download_shopping_cart")
                    .header(
                        header::AUTHORIZATION,
                        format!("Token {}", session.session_id),
                    )
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
