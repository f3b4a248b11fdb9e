//! ThinkBeyond - business planning canvas backend

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use thinkbeyond::{
    config::Args,
    db::{Collections, MongoClient, SeedData},
    server,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    // Parse command line arguments
    let args = Args::parse();

    // Initialize tracing/logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("thinkbeyond={},info", args.log_level).into());
    let registry = tracing_subscriber::registry().with(filter);
    if args.log_format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    // Validate configuration
    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    // Print startup banner
    info!("======================================");
    info!("  ThinkBeyond - Canvas Planner");
    info!("======================================");
    info!("Node ID: {}", args.node_id);
    info!("Listen: {}", args.listen);
    info!("Mode: {}", if args.dev_mode { "DEVELOPMENT" } else { "PRODUCTION" });
    info!("MongoDB: {} (db '{}')", args.mongodb_uri, args.mongodb_db);
    info!("Methodology: {} / {}", args.methodology_name, args.default_framework);
    info!("======================================");

    // Connect to MongoDB (memory fallback in dev mode)
    let mongo = match MongoClient::new(&args.mongodb_uri, &args.mongodb_db).await {
        Ok(client) => {
            info!("MongoDB connected successfully");
            Some(client)
        }
        Err(e) => {
            if args.dev_mode {
                warn!("MongoDB connection failed (dev mode, using in-memory storage): {}", e);
                None
            } else {
                error!("MongoDB connection failed: {}", e);
                std::process::exit(1);
            }
        }
    };

    let collections = match &mongo {
        Some(client) => Collections::mongo(client).await?,
        None => Collections::memory(),
    };

    if let Some(path) = &args.seed_file {
        let seed = SeedData::load(path).await?;
        let report = seed.apply(&collections).await?;
        info!(
            "Seeded {} cards, {} onboarding cards, {} menu, {} companies from {}",
            report.cards,
            report.progress,
            report.methodology,
            report.companies,
            path.display()
        );
    }

    let state = Arc::new(server::AppState::new(args, mongo, &collections));

    server::run(state).await?;

    Ok(())
}
