use ci_core::ports::{SecureStorageError, SecureStoragePort};
use keyring::Entry;

const SERVICE_NAME: &str = "ClinIntake";

/// OS-backed secure storage: macOS Keychain, Windows Credential Manager or
/// the Linux Secret Service.
#[derive(Clone, Default)]
pub struct SystemKeyringStorage;

impl SystemKeyringStorage {
    pub fn new() -> Self {
        Self
    }

    fn entry(key: &str) -> Result<Entry, SecureStorageError> {
        Entry::new(SERVICE_NAME, key)
            .map_err(|err| SecureStorageError::Backend(format!("keyring entry failed: {err}")))
    }
}

impl SecureStoragePort for SystemKeyringStorage {
    fn get(&self, key: &str) -> Result<Option<String>, SecureStorageError> {
        match Self::entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(err) => Err(SecureStorageError::Backend(format!(
                "keyring read failed: {err}"
            ))),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SecureStorageError> {
        Self::entry(key)?
            .set_password(value)
            .map_err(|err| SecureStorageError::Backend(format!("keyring write failed: {err}")))
    }

    fn delete(&self, key: &str) -> Result<(), SecureStorageError> {
        match Self::entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(err) => Err(SecureStorageError::Backend(format!(
                "keyring delete failed: {err}"
            ))),
        }
    }
}
