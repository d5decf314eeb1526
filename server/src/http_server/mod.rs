use std::net::SocketAddr;

use axum::response::Response;
use color_eyre::eyre::Context;
use tokio::net::TcpListener;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};

use crate::AppState;

pub(crate) mod errors;

pub(crate) mod api {
    pub mod auth;
    pub mod ingredients;
    pub mod recipes;
    pub mod shopping_cart;
    pub mod tags;
    pub mod users;
}

pub(crate) mod current_user;
pub(crate) mod pagination;
pub(crate) mod routes;
pub(crate) mod serializers;

use errors::ApiError;

pub(crate) type ResponseResult<T = Response> = Result<T, ApiError>;

pub(crate) async fn run_axum(state: AppState) -> color_eyre::Result<()> {
    let port = state.app.port;

    let app = routes::make_router().with_state(state).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().include_headers(true))
            .on_response(DefaultOnResponse::new().include_headers(true)),
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(&addr)
        .await
        .wrap_err("Failed to open port")?;
    let addr = listener.local_addr()?;
    tracing::info!("Listening on {addr}");

    axum::serve(listener, app)
        .await
        .wrap_err("Failed to run server")
}
