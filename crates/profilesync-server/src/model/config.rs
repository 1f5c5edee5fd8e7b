//! Configuration management
//!
//! Sources, lowest precedence first: the YAML file, `PROFILESYNC_*`
//! environment variables (`__` separates nested keys, e.g.
//! `PROFILESYNC_NETWORK_SERVER__ADDRESS`), command line overrides.

use std::path::PathBuf;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use profilesync_client::GrpcClientConfig;
use profilesync_common::DEFAULT_REMOTE_TIMEOUT_MS;
use profilesync_core::SyncConfig;
use profilesync_persistence::StorageMode;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use crate::cli::Cli;
use crate::startup::{LogRotation, LoggingConfig};

pub const PERSISTENCE_MODE: &str = "persistence.mode";
pub const EMBEDDED_DATA_DIR: &str = "persistence.embedded.data_dir";
pub const DB_URL: &str = "db.url";
pub const NETWORK_SERVER_ADDRESS: &str = "network_server.address";

/// Application configuration loaded from the config file and environment
#[derive(Clone, Debug, Default)]
pub struct Configuration {
    pub config: Config,
}

impl Configuration {
    pub fn new(cli: &Cli) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .add_source(File::from(cli.config_file.clone()).required(false))
            .add_source(
                Environment::with_prefix("profilesync")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        if let Some(v) = &cli.mode {
            builder = builder.set_override(PERSISTENCE_MODE, v.as_str())?;
        }
        if let Some(v) = &cli.database_url {
            builder = builder.set_override(DB_URL, v.as_str())?;
        }
        if let Some(v) = &cli.data_dir {
            builder = builder.set_override(EMBEDDED_DATA_DIR, v.as_str())?;
        }
        if let Some(v) = &cli.network_server_addr {
            builder = builder.set_override(NETWORK_SERVER_ADDRESS, v.as_str())?;
        }

        Ok(Configuration {
            config: builder.build()?,
        })
    }

    fn get_u64(&self, key: &str, default: u64) -> u64 {
        self.config
            .get_int(key)
            .ok()
            .and_then(|v| u64::try_from(v).ok())
            .unwrap_or(default)
    }

    // ========================================================================
    // Persistence Configuration
    // ========================================================================

    pub fn persistence_mode(&self) -> Result<StorageMode, ConfigError> {
        match self.config.get_string(PERSISTENCE_MODE) {
            Ok(v) => v.parse().map_err(ConfigError::Message),
            Err(ConfigError::NotFound(_)) => Ok(StorageMode::ExternalDb),
            Err(e) => Err(e),
        }
    }

    pub fn embedded_data_dir(&self) -> PathBuf {
        self.config
            .get_string(EMBEDDED_DATA_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data/rocksdb"))
    }

    pub fn database_options(&self) -> Result<ConnectOptions, ConfigError> {
        let url = self.config.get_string(DB_URL)?;

        let mut opt = ConnectOptions::new(url);
        opt.max_connections(self.get_u64("db.pool.max_connections", 10) as u32)
            .min_connections(self.get_u64("db.pool.min_connections", 1) as u32)
            .connect_timeout(Duration::from_secs(
                self.get_u64("db.pool.connect_timeout_secs", 30),
            ))
            .acquire_timeout(Duration::from_secs(
                self.get_u64("db.pool.acquire_timeout_secs", 8),
            ))
            .idle_timeout(Duration::from_secs(
                self.get_u64("db.pool.idle_timeout_secs", 10),
            ))
            .max_lifetime(Duration::from_secs(
                self.get_u64("db.pool.max_lifetime_secs", 1800),
            ))
            .sqlx_logging(
                self.config
                    .get_bool("db.pool.sqlx_logging")
                    .unwrap_or(false),
            );
        Ok(opt)
    }

    pub async fn database_connection(&self) -> anyhow::Result<DatabaseConnection> {
        let opt = self.database_options()?;

        tracing::info!(
            max_connections = ?opt.get_max_connections(),
            min_connections = ?opt.get_min_connections(),
            "Database connection pool configured"
        );

        Ok(Database::connect(opt).await?)
    }

    // ========================================================================
    // Network-server Configuration
    // ========================================================================

    pub fn network_server_addr(&self) -> String {
        self.config
            .get_string(NETWORK_SERVER_ADDRESS)
            .unwrap_or("127.0.0.1:8000".to_string())
    }

    pub fn network_server_request_timeout(&self) -> Duration {
        Duration::from_millis(self.get_u64(
            "network_server.request_timeout_ms",
            DEFAULT_REMOTE_TIMEOUT_MS,
        ))
    }

    pub fn grpc_client_config(&self) -> GrpcClientConfig {
        GrpcClientConfig {
            server_addr: self.network_server_addr(),
            connect_timeout: Duration::from_millis(
                self.get_u64("network_server.connect_timeout_ms", 3000),
            ),
            request_timeout: self.network_server_request_timeout(),
            lazy: self
                .config
                .get_bool("network_server.lazy")
                .unwrap_or(true),
        }
    }

    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            remote_timeout: self.network_server_request_timeout(),
        }
    }

    // ========================================================================
    // Logging Configuration
    // ========================================================================

    /// `PROFILESYNC_LOG_*` variables supply the defaults; `logging.*` keys win.
    pub fn logging_config(&self) -> LoggingConfig {
        let mut logging = LoggingConfig::from_env();

        if let Ok(dir) = self.config.get_string("logging.dir") {
            logging.log_dir = PathBuf::from(dir);
        }
        if let Ok(console) = self.config.get_bool("logging.console") {
            logging.console_output = console;
        }
        if let Ok(file) = self.config.get_bool("logging.file") {
            logging.file_logging = file;
        }
        if let Some(level) = self
            .config
            .get_string("logging.level")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            logging.console_level = level;
            logging.file_level = level;
        }
        if let Some(level) = self
            .config
            .get_string("logging.file_level")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            logging.file_level = level;
        }
        if let Some(rotation) = self
            .config
            .get_string("logging.rotation")
            .ok()
            .and_then(|v| v.parse::<LogRotation>().ok())
        {
            logging.rotation = rotation;
        }

        logging
    }
}
