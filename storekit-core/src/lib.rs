//! Core types and abstractions for the storekit accessor layer.
//!
//! This crate provides the foundational pieces shared by every storekit
//! component: the error type, the wire codec contract, connection
//! configuration, and logging initialization.

pub mod codec;
pub mod config;
pub mod error;
pub mod logging;

pub use codec::{Json, WireValue};
pub use config::{ConnectorConfig, MongoConfig, MysqlConfig, RedisConfig};
pub use error::{Result, StoreError};
pub use logging::{LogConfig, LogFormat, LogLevel};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::codec::{Json, WireValue};
    pub use crate::config::{ConnectorConfig, RedisConfig};
    pub use crate::error::{Result, StoreError};
    pub use crate::logging::{LogConfig, LogFormat, LogLevel};
}
