use sea_orm::DatabaseConnection;
use tracing_subscriber::EnvFilter;

use crate::{
    config::Config, data::guild_config::GuildConfigRepository, error::AppError,
    service::autoresponder::store::AutoResponderStore,
};

/// Filter applied when `RUST_LOG` is not set.
const DEFAULT_LOG_FILTER: &str = "info";

/// Installs the global tracing subscriber.
///
/// The filter is read from `RUST_LOG`, falling back to `info`.
///
/// # Returns
/// - `Ok(())` - Subscriber installed
/// - `Err(AppError::LoggingErr)` - A global subscriber was already set
pub fn init_logging() -> Result<(), AppError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| AppError::LoggingErr(e.to_string()))
}

/// Connects to the Sqlite database and runs pending migrations.
///
/// Establishes a connection pool to the Sqlite database using the connection string from
/// configuration, then automatically runs all pending SeaORM migrations to ensure the database
/// schema is up-to-date. This function must complete successfully before the bot can access
/// the database.
///
/// # Arguments
/// - `config` - Application configuration containing the database URL
///
/// # Returns
/// - `Ok(DatabaseConnection)` - Connected database with migrations applied
/// - `Err(Error)` - Failed to connect to database or run migrations
pub async fn connect_to_database(config: &Config) -> Result<DatabaseConnection, AppError> {
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{ConnectOptions, Database};

    let mut opt = ConnectOptions::new(&config.database_url);
    opt.sqlx_logging(false);

    let db = Database::connect(opt).await?;

    Migrator::up(&db, None).await?;

    Ok(db)
}

/// Populates the autoresponder store from every stored guild document that has an
/// autoresponder section.
///
/// # Returns
/// - `Ok(usize)` - Number of guilds loaded
/// - `Err(AppError)` - Database error
pub async fn load_autoresponders(
    db: &DatabaseConnection,
    store: &AutoResponderStore,
) -> Result<usize, AppError> {
    let configs = GuildConfigRepository::new(db)
        .get_all_with_autoresponders()
        .await?;

    let mut loaded = 0;
    for config in configs {
        if let Some(autoresponders) = config.autoresponder {
            store.insert(config.guild_id, autoresponders);
            loaded += 1;
        }
    }

    tracing::info!("Loaded autoresponders of {} guild(s)", loaded);

    Ok(loaded)
}
