use std::path::PathBuf;

use clap::Subcommand;
use color_eyre::Result;

pub(crate) mod seed;
pub(crate) mod serve;
pub(crate) mod validate;

#[derive(Subcommand)]
pub(crate) enum Command {
    Serve,
    Validate,
    /// Import the tag and ingredient catalogs from json files.
    Seed {
        /// Directory holding ingredients.json and tags.json
        data_dir: PathBuf,
    },
}

impl Default for Command {
    fn default() -> Self {
        Self::Serve
    }
}

impl Command {
    pub(crate) async fn run(&self) -> Result<()> {
        match self {
            Command::Serve => serve::serve().await,
            Command::Validate => validate::validate(),
            Command::Seed { data_dir } => seed::seed(data_dir).await,
        }
    }
}
