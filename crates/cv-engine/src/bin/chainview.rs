use anyhow::Context;
use tracing_subscriber::EnvFilter;

use cv_engine::{run, RenderConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = match std::env::var("CHAINVIEW_CONFIG") {
        Ok(path) if !path.trim().is_empty() => RenderConfig::from_file(&path)
            .with_context(|| format!("loading config from {path}"))?,
        _ => RenderConfig::from_env().context("reading CHAINVIEW_* environment")?,
    };

    let output = run(&config).await.context("rendering chain graph")?;
    if config.output.is_none() {
        println!("{}", output.document);
    }
    Ok(())
}
