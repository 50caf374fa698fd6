//! Error types for the storekit accessor layer.

/// Result type alias for storekit operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Main error type for the storekit accessor layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A stored wire string could not be decoded into the requested type
    #[error("conversion error: cannot decode {raw:?} as {target}: {reason}")]
    Conversion {
        target: &'static str,
        raw: String,
        reason: String,
    },

    /// Remote store failures (network, server-side command failure, protocol)
    #[error("store error: {0}")]
    Store(String),

    /// Invalid input errors
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped anyhow errors for compatibility
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StoreError {
    /// Create a new conversion error for a failed decode into `target`
    pub fn conversion(
        target: &'static str,
        raw: impl Into<String>,
        reason: impl std::fmt::Display,
    ) -> Self {
        Self::Conversion {
            target,
            raw: raw.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a new remote store error
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Create a new invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a new config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Check if this is a conversion error
    pub fn is_conversion(&self) -> bool {
        matches!(self, Self::Conversion { .. })
    }

    /// Check if this is a remote store error
    pub fn is_store(&self) -> bool {
        matches!(self, Self::Store(_))
    }

    /// Check if this is an invalid input error
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_error_message() {
        let err = StoreError::conversion("i64", "abc", "invalid digit");
        assert!(err.is_conversion());
        let msg = err.to_string();
        assert!(msg.contains("\"abc\""));
        assert!(msg.contains("i64"));
    }

    #[test]
    fn test_predicates() {
        assert!(StoreError::store("down").is_store());
        assert!(StoreError::invalid_input("empty").is_invalid_input());
        assert!(!StoreError::config("bad").is_store());
    }
}
