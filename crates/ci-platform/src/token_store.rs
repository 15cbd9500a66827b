//! Token store facade and default backend selection.
//!
//! The facade holds one opaque session credential under a fixed key and
//! swallows every backend failure: a missing credential only forces a
//! fresh login, which is always recoverable, so callers never see storage
//! errors.

use std::{path::PathBuf, sync::Arc};

use ci_core::ports::{SecureStoragePort, TokenStorePort};

use crate::{
    capability::{detect_storage_capability, SecureStorageCapability},
    file_storage::FileSecureStorage,
    keyring_storage::SystemKeyringStorage,
};

/// Fixed key the session credential is persisted under.
const TOKEN_KEY: &str = "session_token";

#[derive(Debug, thiserror::Error)]
pub enum TokenStoreFactoryError {
    #[error("failed to initialize file-based credential storage: {0}")]
    FileBasedInit(#[from] std::io::Error),
}

/// Credential store over a platform-selected secure storage backend.
pub struct TokenStore {
    backend: Arc<dyn SecureStoragePort>,
}

impl TokenStore {
    pub fn new(backend: Arc<dyn SecureStoragePort>) -> Self {
        Self { backend }
    }
}

impl TokenStorePort for TokenStore {
    fn get(&self) -> Option<String> {
        match self.backend.get(TOKEN_KEY) {
            Ok(value) => value,
            Err(err) => {
                log::warn!("credential read failed, treating as absent: {err}");
                None
            }
        }
    }

    fn set(&self, credential: &str) {
        if let Err(err) = self.backend.set(TOKEN_KEY, credential) {
            log::warn!("credential write failed: {err}");
        }
    }

    fn clear(&self) {
        if let Err(err) = self.backend.delete(TOKEN_KEY) {
            log::warn!("credential delete failed: {err}");
        }
    }
}

/// Build the token store for this platform, detected once at startup.
pub fn create_default_token_store(
    app_data_root: PathBuf,
) -> Result<Arc<TokenStore>, TokenStoreFactoryError> {
    let capability = detect_storage_capability();
    log::debug!("detected secure storage capability: {capability:?}");

    let backend: Arc<dyn SecureStoragePort> = match capability {
        SecureStorageCapability::SystemKeyring => {
            log::info!("using system keyring for credential storage");
            Arc::new(SystemKeyringStorage::new())
        }
        SecureStorageCapability::FileBasedKeystore => {
            log::warn!("using file-based credential storage (insecure dev fallback)");
            Arc::new(FileSecureStorage::new_in_app_data_root(app_data_root)?)
        }
    };

    Ok(Arc::new(TokenStore::new(backend)))
}
