//! Development API server for chain reordering
//!
//! Serves the chain endpoints over an in-memory store, optionally seeded from
//! a JSON snapshot, so frontends can be developed without a backend.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin chain-server -- snapshot.json --port 3002
//! ```
//!
//! The port defaults to `CHAIN_API_PORT`, then 3002.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use classroom_core::api::{self, default_api_port};
use classroom_core::db::MemoryStore;
use classroom_core::models::ChainRecord;
use classroom_core::services::{ChainService, ChainServiceConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "chain-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// JSON array of records to seed the store with
    #[arg(value_name = "SNAPSHOT")]
    snapshot: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("chain_server=info,classroom_core=debug,tower_http=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    println!("🔧 Initializing chain-server...");

    let store = match &args.snapshot {
        Some(path) => {
            println!("📂 Loading snapshot {}", path.display());
            let store = MemoryStore::<ChainRecord>::from_json_file(path).await?;
            println!("✅ Loaded {} records", store.snapshot().await.len());
            store
        }
        None => MemoryStore::new(),
    };

    let config = ChainServiceConfig::from_env();
    tracing::info!("Service config: {:?}", config);
    let service = Arc::new(
        ChainService::with_config(Arc::new(store), config).with_client("chain-server"),
    );

    let port = args.port.unwrap_or_else(default_api_port);
    let addr = format!("127.0.0.1:{}", port);
    println!("\n🚀 Chain API available at http://{}/api\n", addr);

    api::serve(service, &addr).await
}
