//! # ci-platform
//!
//! Platform-specific secure credential storage for ClinIntake: capability
//! detection, the system keyring backend, the file-based fallback backend
//! and the token store facade consumed by the auth flow.

pub mod capability;
pub mod file_storage;
pub mod keyring_storage;
pub mod token_store;

pub use capability::{detect_storage_capability, SecureStorageCapability};
pub use file_storage::FileSecureStorage;
pub use keyring_storage::SystemKeyringStorage;
pub use token_store::{create_default_token_store, TokenStore, TokenStoreFactoryError};
