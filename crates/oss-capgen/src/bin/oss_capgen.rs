//! Capability generator CLI.
//!
//! Fetches an API descriptor, flattens its schemas into capability
//! declarations, and writes the plugin packaging artifacts.

use anyhow::Context;
use clap::Parser;
use oss_capgen::{walk_schemas, write_artifacts};
use oss_client::ApiDescriptor;
use oss_core::DEFAULT_SWAGGER_URL;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "oss-capgen",
    about = "Generate device capability declarations from an API descriptor"
)]
struct Args {
    /// Descriptor URL
    #[arg(default_value = DEFAULT_SWAGGER_URL)]
    url: String,

    /// Plugin project root to write artifacts into
    #[arg(long, default_value = ".")]
    root: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    info!("Fetching descriptor from {}", args.url);
    let payload = reqwest::get(&args.url)
        .await
        .and_then(|r| r.error_for_status())
        .with_context(|| format!("failed to fetch descriptor from {}", args.url))?
        .text()
        .await
        .context("failed to read descriptor body")?;

    let descriptor = ApiDescriptor::parse(&payload, &args.url)?;
    info!("Walking {} schemas", descriptor.schemas.len());

    let generated = walk_schemas(&descriptor.schemas);
    let summary = write_artifacts(&args.root, &generated)?;

    info!(
        "Generated {} capabilities ({} new files, {} left untouched), {} mapping entries",
        generated.capabilities.len(),
        summary.written,
        summary.skipped,
        generated.mapping.len()
    );
    Ok(())
}
