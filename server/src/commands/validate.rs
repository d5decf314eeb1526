use color_eyre::eyre::ensure;
use color_eyre::Result;

use crate::shopping::pdf::{FontSource, RenderConfig};
use crate::AppConfig;

/// Checks that the environment is launchable without touching the database:
/// config parses and every configured renderer asset is present on disk.
pub(crate) fn validate() -> Result<()> {
    let config = AppConfig::from_env()?;
    println!("base url: {}", config.base_url);

    let render = RenderConfig::from_env()?;
    if let FontSource::File(path) = &render.font {
        ensure!(
            path.is_file(),
            "Shopping PDF font not found at {}",
            path.display()
        );
    }
    for logo in &render.logos {
        ensure!(
            logo.is_file(),
            "Shopping PDF logo not found at {}",
            logo.display()
        );
    }
    println!("render config ok: {} rows per page", render.rows_per_page);

    Ok(())
}
