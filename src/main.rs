use tracing::info;
use tracing_subscriber::EnvFilter;

use vstamp::{run_batch, BatchConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries only the normalized documents.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut cfg = BatchConfig::from_env();
    if let Some(root) = std::env::args().nth(1) {
        cfg.sites_dir = root.into();
    }

    let outcomes = run_batch(&cfg).await?;
    for outcome in &outcomes {
        if let Ok(html) = &outcome.result {
            println!("{html}");
        }
    }

    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
    info!(sites = outcomes.len(), failed, "batch complete");
    Ok(())
}
