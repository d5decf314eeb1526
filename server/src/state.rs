use color_eyre::eyre::Context;
use db::setup_db_pool;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::instrument;
use url::Url;

use crate::shopping::pdf::RenderConfig;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub base_url: Url,
    pub port: u16,
}

impl AppConfig {
    #[instrument(name = "AppConfig::from_env")]
    pub fn from_env() -> color_eyre::Result<Self> {
        let base_url = std::env::var("APP_BASE_URL")
            .wrap_err("Missing APP_BASE_URL, needed for app launch")?;
        let base_url = Url::parse(&base_url).wrap_err("Invalid APP_BASE_URL not parsable")?;

        let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
        let port = port.parse().wrap_err("Invalid PORT not parsable")?;

        Ok(Self { base_url, port })
    }

    pub fn app_url(&self, path: &str) -> String {
        let mut url = self.base_url.clone();

        url.set_path(path);

        url.into()
    }
}

#[derive(Debug, Clone)]
pub(crate) struct AppState {
    pub app: AppConfig,
    pub render: RenderConfig,
    pub db: PgPool,
}

impl AppState {
    #[instrument(name = "AppState::from_env", err)]
    pub async fn from_env() -> color_eyre::Result<Self> {
        let app_state = AppState {
            app: AppConfig::from_env()?,
            render: RenderConfig::from_env()?,
            db: setup_db_pool().await?,
        };

        Ok(app_state)
    }
}
