//! Peerlink - student collaboration backend

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};

use peerlink::{
    auth::{AuthGate, JwtAuthGate},
    config::Args,
    db::MongoClient,
    logging, server,
    store::{MemoryProfileStore, MongoProfileStore, ProfileStore},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    logging::init(&args);

    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    info!("======================================");
    info!("  Peerlink - student peer matching");
    info!("======================================");
    info!("Node ID: {}", args.node_id);
    info!("Listen: {}", args.listen);
    info!("Mode: {}", if args.dev_mode { "DEVELOPMENT" } else { "PRODUCTION" });
    info!("MongoDB: {} / {}", args.mongodb_uri, args.database_name);
    info!(
        "Peer limits: default {}, max {} ({:?})",
        args.peer_limit_default, args.peer_limit_max, args.skill_ranking
    );
    info!("======================================");

    // Profile store: MongoDB, or memory in dev mode when MongoDB is down
    let (store, backend): (Arc<dyn ProfileStore>, &'static str) =
        match MongoClient::new(&args.mongodb_uri, &args.database_name).await {
            Ok(client) => {
                let store = MongoProfileStore::new(&client, &args.students_collection).await?;
                info!(
                    "MongoDB connected, collection '{}' indexed",
                    args.students_collection
                );
                (Arc::new(store), "mongodb")
            }
            Err(e) => {
                if args.dev_mode {
                    warn!("MongoDB connection failed (dev mode, using in-memory store): {}", e);
                    (Arc::new(MemoryProfileStore::new()), "memory")
                } else {
                    error!("MongoDB connection failed: {}", e);
                    std::process::exit(1);
                }
            }
        };

    let gate: Arc<dyn AuthGate> = match args.gate_config() {
        Some(config) => Arc::new(JwtAuthGate::new(config)?),
        None => {
            warn!("No token verification key configured, using the dev secret");
            Arc::new(JwtAuthGate::new_dev())
        }
    };

    let state = Arc::new(server::AppState::new(args, store, backend, gate));

    if let Err(e) = server::run(state).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
