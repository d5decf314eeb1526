use color_eyre::eyre::Context;
use color_eyre::Result;
use tracing_subscriber::{prelude::*, EnvFilter, Registry};
use tracing_tree::HierarchicalLayer;

pub fn setup_tracing() -> Result<()> {
    let rust_log =
        std::env::var("RUST_LOG").unwrap_or_else(|_| "warn,server=trace,tower_http=debug".into());

    let env_filter = EnvFilter::builder()
        .parse(&rust_log)
        .wrap_err_with(|| format!("Couldn't create env filter from {rust_log}"))?;

    let hierarchical = HierarchicalLayer::default()
        .with_writer(std::io::stdout)
        .with_indent_lines(true)
        .with_indent_amount(2)
        .with_thread_names(true)
        .with_thread_ids(true)
        .with_targets(true);

    Registry::default()
        .with(hierarchical)
        .with(env_filter)
        .try_init()
        .wrap_err("Failed to initialize tracing subscriber")?;

    Ok(())
}
