use thiserror::Error;

#[derive(Debug, Error)]
pub enum SecureStorageError {
    #[error("secure storage backend failed: {0}")]
    Backend(String),
}

/// Low-level platform-secure key/value storage (system keyring or
/// file-based keystore). Implementations are selected once at startup;
/// business logic never branches on platform.
pub trait SecureStoragePort: Send + Sync {
    /// Load the stored value, if any.
    fn get(&self, key: &str) -> Result<Option<String>, SecureStorageError>;

    /// Store a value. Must be idempotent (overwrite if exists).
    fn set(&self, key: &str, value: &str) -> Result<(), SecureStorageError>;

    /// Remove a value. Deleting a missing key is not an error.
    fn delete(&self, key: &str) -> Result<(), SecureStorageError>;
}
