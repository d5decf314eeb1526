use color_eyre::Result;

use crate::{http_server, AppState};

pub(crate) async fn serve() -> Result<()> {
    let state = AppState::from_env().await?;

    http_server::run_axum(state).await
}
