use std::fs;
use std::io;
use std::path::PathBuf;

use ci_core::ports::{SecureStorageError, SecureStoragePort};

/// File-based secure storage for WSL/headless environments.
///
/// Values are written atomically (temp file + rename) with `0600`
/// permissions. This is a fallback, not real at-rest encryption.
#[derive(Clone)]
pub struct FileSecureStorage {
    base_dir: PathBuf,
}

impl FileSecureStorage {
    /// Create file secure storage rooted at `<app_data_root>/keystore`.
    pub fn new_in_app_data_root(app_data_root: PathBuf) -> Result<Self, io::Error> {
        let base_dir = app_data_root.join("keystore");
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    /// Construct with a concrete base directory.
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    fn file_path(&self, key: &str) -> PathBuf {
        self.base_dir.join(format!("{key}.cred"))
    }

    fn map_io_error(context: &str, err: io::Error) -> SecureStorageError {
        SecureStorageError::Backend(format!("{context}: {err}"))
    }
}

impl SecureStoragePort for FileSecureStorage {
    fn get(&self, key: &str) -> Result<Option<String>, SecureStorageError> {
        let path = self.file_path(key);
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(Self::map_io_error("failed to read credential file", err)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SecureStorageError> {
        let path = self.file_path(key);
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, value)
            .map_err(|err| Self::map_io_error("failed to write credential temp file", err))?;
        fs::rename(&temp_path, &path)
            .map_err(|err| Self::map_io_error("failed to rename credential file", err))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&path)
                .map_err(|err| Self::map_io_error("failed to read credential metadata", err))?
                .permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&path, perms)
                .map_err(|err| Self::map_io_error("failed to set credential permissions", err))?;
        }

        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), SecureStorageError> {
        let path = self.file_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(Self::map_io_error("failed to delete credential file", err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get_round_trips() {
        let dir = tempfile::TempDir::new().unwrap();
        let storage = FileSecureStorage::with_base_dir(dir.path().to_path_buf());
        storage.set("session_token", "tok-123").unwrap();
        assert_eq!(
            storage.get("session_token").unwrap(),
            Some("tok-123".to_string())
        );
    }

    #[test]
    fn set_overwrites_existing_value() {
        let dir = tempfile::TempDir::new().unwrap();
        let storage = FileSecureStorage::with_base_dir(dir.path().to_path_buf());
        storage.set("session_token", "old").unwrap();
        storage.set("session_token", "new").unwrap();
        assert_eq!(
            storage.get("session_token").unwrap(),
            Some("new".to_string())
        );
    }

    #[test]
    fn get_missing_key_is_absent() {
        let dir = tempfile::TempDir::new().unwrap();
        let storage = FileSecureStorage::with_base_dir(dir.path().to_path_buf());
        assert_eq!(storage.get("session_token").unwrap(), None);
    }

    #[test]
    fn delete_is_idempotent() {
        let dir = tempfile::TempDir::new().unwrap();
        let storage = FileSecureStorage::with_base_dir(dir.path().to_path_buf());
        storage.set("session_token", "tok").unwrap();
        storage.delete("session_token").unwrap();
        storage.delete("session_token").unwrap();
        assert_eq!(storage.get("session_token").unwrap(), None);
    }

    #[cfg(unix)]
    #[test]
    fn credential_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::TempDir::new().unwrap();
        let storage = FileSecureStorage::with_base_dir(dir.path().to_path_buf());
        storage.set("session_token", "tok").unwrap();
        let mode = std::fs::metadata(dir.path().join("session_token.cred"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
