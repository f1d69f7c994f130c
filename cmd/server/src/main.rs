//! animikyoku-server - HTTP API for anime poster identification.

mod server;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use animikyoku_embed::{runtime, ClipServer, EmbedConfig};
use animikyoku_engine::{Dataset, DatasetPaths, Engine};

/// HTTP API for anime poster identification.
#[derive(Parser, Debug)]
#[command(name = "animikyoku-server")]
#[command(about = "HTTP API for anime poster identification")]
struct Args {
    /// Listen address
    #[arg(long, default_value = "127.0.0.1:8000")]
    addr: String,

    /// Data directory (index, catalog, poster assets)
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Embedding server base URL (OpenAI-compatible /embeddings)
    #[arg(long)]
    embed_url: Option<String>,

    /// Disable the vision fallback even when an API key is present
    #[arg(long)]
    index_only: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();

    let mut embed_config = EmbedConfig::default();
    if let Some(url) = &args.embed_url {
        embed_config = embed_config.with_base_url(url);
    }
    let clip = ClipServer::with_config(embed_config).context("embedding client")?;
    let dim = animikyoku_embed::ImageEmbedder::dimension(&clip);
    runtime::init(Arc::new(clip)).context("initialize embedder")?;
    let embedder = runtime::get().context("embedder not ready")?;

    let dataset = Arc::new(
        Dataset::open(DatasetPaths::new(&args.data_dir), dim).context("open dataset")?,
    );

    let anilist = Arc::new(animikyoku_anilist::Client::new().context("anilist client")?);
    let mut builder = Engine::builder()
        .dataset(Arc::clone(&dataset))
        .embedder(embedder)
        .metadata(anilist.clone())
        .primary_themes(Arc::new(
            animikyoku_animethemes::Client::new().context("animethemes client")?,
        ));

    let mut gemini = None;
    match std::env::var("GEMINI_API_KEY") {
        Ok(key) if !args.index_only => {
            let client = Arc::new(
                animikyoku_gemini::Client::builder(key)
                    .build()
                    .context("gemini client")?,
            );
            builder = builder
                .fallback(client.clone())
                .supplemental_themes(client.clone());
            gemini = Some(client);
        }
        _ => {
            tracing::warn!("vision fallback disabled (no GEMINI_API_KEY or --index-only)");
        }
    }

    let engine = Arc::new(builder.build().context("build engine")?);

    server::serve(&args.addr, engine, anilist, gemini).await
}
