mod bot;
mod config;
mod data;
mod error;
mod model;
mod scheduler;
mod service;
mod startup;
mod state;

use crate::{
    bot::start::{init_bot, start_bot},
    config::Config,
    error::AppError,
    scheduler::autoresponder_flush,
    state::BotState,
};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    startup::init_logging()?;

    let config = Config::from_env()?;

    let db = startup::connect_to_database(&config).await?;
    let state = BotState::new(db.clone(), config.default_prefix.clone());

    startup::load_autoresponders(&db, &state.store).await?;

    let mut scheduler = autoresponder_flush::start_scheduler(
        db,
        state.store.clone(),
        config.default_prefix.clone(),
    )
    .await?;

    let client = init_bot(&config, state).await?;
    let shard_manager = client.shard_manager.clone();
    let mut bot = tokio::spawn(start_bot(client));

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
            tracing::info!("Shutting down");
            shard_manager.shutdown_all().await;
        }
        result = &mut bot => {
            match result {
                Ok(Ok(())) => tracing::info!("Discord bot stopped"),
                Ok(Err(e)) => tracing::error!("Discord bot error: {}", e),
                Err(e) => tracing::error!("Discord bot task failed: {}", e),
            }
        }
    }

    // Cached changes since the last flush are not written back.
    scheduler.shutdown().await?;

    Ok(())
}
