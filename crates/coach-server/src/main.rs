//! Debate Coach server binary
//!
//! Thin wrapper around `coach-api` for deployments.

use anyhow::Result;
use coach_api::{CoachServer, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    coach_api::server::init_tracing();

    tracing::info!("Starting Debate Coach server...");

    // Hosting platforms hand out the port as $PORT
    if let Ok(port) = std::env::var("PORT") {
        if std::env::var("COACH_PORT").is_err() {
            tracing::info!("Mapping PORT {} to COACH_PORT", port);
            std::env::set_var("COACH_PORT", port);
        }
    }

    // Tokens signed with a per-process secret stop working on restart
    if std::env::var("COACH_JWT_SECRET").is_err() {
        tracing::warn!("COACH_JWT_SECRET not set; generating an ephemeral development secret");
        let secret = format!("{}{}", uuid::Uuid::new_v4().simple(), uuid::Uuid::new_v4().simple());
        std::env::set_var("COACH_JWT_SECRET", secret);
    }

    let config = ServerConfig::from_env();

    let server = CoachServer::new(config).await.map_err(|e| {
        tracing::error!("Failed to initialize server: {}", e);
        e
    })?;

    server.run().await.map_err(|e| {
        tracing::error!("Server error: {}", e);
        e
    })?;

    Ok(())
}
