use crate::error::{StorageError, StorageResult};
use sqlx::ConnectOptions;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::env;
use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

/// Environment variable holding the SQLite database path
pub const ENV_DATABASE_PATH: &str = "INSIGHT_DATABASE_PATH";

/// Environment variable holding the maximum pool size
pub const ENV_MAX_CONNECTIONS: &str = "INSIGHT_DB_MAX_CONNECTIONS";

/// Environment variable holding the minimum idle pool size
pub const ENV_MIN_CONNECTIONS: &str = "INSIGHT_DB_MIN_CONNECTIONS";

/// Environment variable toggling migrations on connect (`true`/`false`)
pub const ENV_AUTO_MIGRATE: &str = "INSIGHT_DB_AUTO_MIGRATE";

/// Database connection configuration for SQLite
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file
    pub database_path: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of idle connections to maintain
    pub min_connections: u32,

    /// Maximum lifetime of a connection before it's closed
    pub max_lifetime: Duration,

    /// Timeout for acquiring a connection from the pool
    pub acquire_timeout: Duration,

    /// Whether to create the database file if it doesn't exist
    pub create_if_missing: bool,

    /// Whether to run migrations on connection
    pub auto_migrate: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_path: "insight_places.db".to_string(),
            max_connections: 10,
            min_connections: 2,
            max_lifetime: Duration::from_secs(1800), // 30 minutes
            acquire_timeout: Duration::from_secs(30),
            create_if_missing: true,
            auto_migrate: true,
        }
    }
}

impl DatabaseConfig {
    /// Create a new database configuration with the given path
    pub fn new(database_path: impl Into<String>) -> Self {
        Self {
            database_path: database_path.into(),
            ..Default::default()
        }
    }

    /// Build a configuration from `INSIGHT_*` environment variables.
    ///
    /// Unset variables keep their default. See [`ENV_DATABASE_PATH`],
    /// [`ENV_MAX_CONNECTIONS`], [`ENV_MIN_CONNECTIONS`] and [`ENV_AUTO_MIGRATE`].
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Configuration` when a variable is set but
    /// cannot be parsed.
    pub fn from_env() -> StorageResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    ///
    /// `from_env` delegates here; tests pass a map instead of touching the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> StorageResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup(ENV_DATABASE_PATH) {
            config.database_path = path;
        }
        if let Some(max) = parse_setting::<u32>(&lookup, ENV_MAX_CONNECTIONS)? {
            config.max_connections = max;
        }
        if let Some(min) = parse_setting::<u32>(&lookup, ENV_MIN_CONNECTIONS)? {
            config.min_connections = min;
        }
        if let Some(migrate) = parse_setting::<bool>(&lookup, ENV_AUTO_MIGRATE)? {
            config.auto_migrate = migrate;
        }

        if config.min_connections > config.max_connections {
            return Err(StorageError::Configuration(format!(
                "{ENV_MIN_CONNECTIONS} ({}) exceeds {ENV_MAX_CONNECTIONS} ({})",
                config.min_connections, config.max_connections
            )));
        }

        Ok(config)
    }

    /// Set the maximum number of connections in the pool
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Set the minimum number of idle connections
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Set whether to create the database if it doesn't exist
    pub fn create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = create;
        self
    }

    /// Set whether to run migrations automatically
    pub fn auto_migrate(mut self, migrate: bool) -> Self {
        self.auto_migrate = migrate;
        self
    }
}

fn parse_setting<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> StorageResult<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    lookup(key)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|e| {
                StorageError::Configuration(format!("Invalid value for {key}: {raw:?} ({e})"))
            })
        })
        .transpose()
}

/// Database handle owning the connection pool.
///
/// Constructed by the caller and passed to repositories via [`Database::pool`];
/// there is no global engine. Each query checks a connection out of the pool
/// and returns it when the query future completes or is dropped.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create a new database connection pool with the given configuration
    ///
    /// # Example
    ///
    /// ```no_run
    /// use insight_storage::connection::{Database, DatabaseConfig};
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = DatabaseConfig::new("insight_places.db")
    ///     .max_connections(10)
    ///     .auto_migrate(true);
    ///
    /// let db = Database::new(config).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn new(config: DatabaseConfig) -> StorageResult<Self> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = Path::new(&config.database_path).parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                StorageError::Configuration(format!("Failed to create database directory: {}", e))
            })?;
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", config.database_path))
            .map_err(|e| StorageError::Configuration(format!("Invalid database path: {}", e)))?
            .create_if_missing(config.create_if_missing)
            .foreign_keys(true) // ON DELETE CASCADE / RESTRICT rely on this
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(10))
            .disable_statement_logging();

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .max_lifetime(Some(config.max_lifetime))
            .acquire_timeout(config.acquire_timeout)
            .connect_with(options)
            .await?;

        info!(
            path = %config.database_path,
            max_connections = config.max_connections,
            "database pool ready"
        );

        let db = Self { pool };

        if config.auto_migrate {
            db.migrate().await?;
        }

        Ok(db)
    }

    /// Create an in-memory database (primarily for testing)
    ///
    /// The pool holds exactly one connection that never expires: every
    /// SQLite in-memory connection is its own database.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use insight_storage::connection::Database;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let db = Database::in_memory().await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn in_memory() -> StorageResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.migrate().await?;

        Ok(db)
    }

    /// Run database migrations
    ///
    /// Applies the SQL files in the workspace `migrations/` directory. The
    /// files are embedded at compile time by `sqlx::migrate!`; already
    /// applied migrations are skipped.
    pub async fn migrate(&self) -> StorageResult<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        debug!("migrations applied");
        Ok(())
    }

    /// Get a reference to the underlying connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool
    ///
    /// Waits for checked-out connections to be returned before closing them.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Check if the database connection is healthy
    pub async fn health_check(&self) -> StorageResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
