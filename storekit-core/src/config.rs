//! Connection configuration for the external store collaborators.
//!
//! These structs carry the connection parameters the connector layer needs
//! to build concrete clients (cache, database, document store). The accessor
//! layer itself never reads them; it receives a finished client handle. They
//! are plain injected values, not process-wide globals, so they can be built
//! in tests without side effects.

use crate::error::{Result, StoreError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Connection parameters for the Redis-like cache store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    /// Logical database index
    pub db: u32,
    /// Server address as host:port
    pub addr: String,
    pub username: String,
    pub password: String,
    pub enable_tls: bool,
    /// Cluster mode instead of a single node
    pub is_cluster: bool,
    /// Route reads to the master only (cluster mode)
    pub master_only: bool,
    pub pool_size: u32,
    pub disable_trace: bool,
    pub enable_log: bool,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            db: 0,
            addr: "127.0.0.1:6379".to_string(),
            username: String::new(),
            password: String::new(),
            enable_tls: false,
            is_cluster: false,
            master_only: false,
            pool_size: 10,
            disable_trace: false,
            enable_log: false,
        }
    }
}

impl RedisConfig {
    /// Create a config pointing at the given address
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            ..Self::default()
        }
    }

    /// Set the logical database index
    pub fn with_db(mut self, db: u32) -> Self {
        self.db = db;
        self
    }

    /// Set authentication credentials
    pub fn with_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    /// Enable cluster mode
    pub fn with_cluster(mut self, master_only: bool) -> Self {
        self.is_cluster = true;
        self.master_only = master_only;
        self
    }

    /// Set the connection pool size
    pub fn with_pool_size(mut self, size: u32) -> Self {
        self.pool_size = size;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.addr.is_empty() {
            return Err(StoreError::config("redis address cannot be empty"));
        }
        if self.pool_size == 0 {
            return Err(StoreError::config("redis pool size must be greater than 0"));
        }
        if self.master_only && !self.is_cluster {
            return Err(StoreError::config(
                "master_only is only meaningful in cluster mode",
            ));
        }
        Ok(())
    }
}

/// Connection parameters for the relational database.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MysqlConfig {
    /// Server address as host:port
    pub path: String,
    /// Optional write/read split addresses
    pub write_path: String,
    pub read_path: String,
    /// Extra DSN options appended to the connection string
    pub config: String,
    pub db_name: String,
    pub username: String,
    pub password: String,
    pub max_idle_conns: u32,
    pub max_open_conns: u32,
    /// Idle connection lifetime in seconds
    pub conn_max_lifetime: u64,
    pub disable_trace: bool,
    pub disable_log: bool,
}

impl MysqlConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.path.is_empty() && (self.write_path.is_empty() || self.read_path.is_empty()) {
            return Err(StoreError::config(
                "mysql needs either path or both write_path and read_path",
            ));
        }
        if self.db_name.is_empty() {
            return Err(StoreError::config("mysql db_name cannot be empty"));
        }
        Ok(())
    }
}

/// Connection parameters for the document store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MongoConfig {
    pub database: String,
    pub address: String,
    pub username: String,
    pub password: String,
    pub enable_tls: bool,
    /// Extra connection-string options
    pub cfg: String,
    pub disable_trace: bool,
    pub disable_log: bool,
}

impl MongoConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.address.is_empty() {
            return Err(StoreError::config("mongo address cannot be empty"));
        }
        if self.database.is_empty() {
            return Err(StoreError::config("mongo database cannot be empty"));
        }
        Ok(())
    }
}

/// Bundle of all connector configurations, loadable from one TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectorConfig {
    pub redis: RedisConfig,
    pub mysql: MysqlConfig,
    pub mongo: MongoConfig,
}

impl ConnectorConfig {
    /// Load configuration from a TOML file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw)
            .map_err(|e| StoreError::config(format!("failed to parse {}: {}", path.display(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_redis_defaults() {
        let config = RedisConfig::default();
        assert_eq!(config.addr, "127.0.0.1:6379");
        assert_eq!(config.pool_size, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_redis_builders() {
        let config = RedisConfig::new("cache.internal:6380")
            .with_db(3)
            .with_auth("svc", "secret")
            .with_pool_size(32);
        assert_eq!(config.db, 3);
        assert_eq!(config.username, "svc");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_redis_validation() {
        let mut config = RedisConfig::default();
        config.pool_size = 0;
        assert!(config.validate().is_err());

        let mut config = RedisConfig::default();
        config.master_only = true;
        assert!(config.validate().is_err());
        config.is_cluster = true;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_mysql_validation() {
        let mut config = MysqlConfig::default();
        assert!(config.validate().is_err());
        config.path = "db.internal:3306".to_string();
        config.db_name = "app".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_connector_from_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "[redis]\naddr = \"10.0.0.5:6379\"\npool_size = 4\n\n[mongo]\naddress = \"10.0.0.6:27017\"\ndatabase = \"docs\"\n"
        )
        .unwrap();

        let config = ConnectorConfig::from_path(file.path()).unwrap();
        assert_eq!(config.redis.addr, "10.0.0.5:6379");
        assert_eq!(config.redis.pool_size, 4);
        assert_eq!(config.mongo.database, "docs");
        // Sections absent from the file fall back to defaults
        assert_eq!(config.mysql.max_idle_conns, 0);
    }
}
