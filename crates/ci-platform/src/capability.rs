//! Platform capability detection for secure storage.
//!
//! Detects whether the platform supports a system keyring or requires the
//! file-based fallback. The decision is made once at startup; business
//! logic only ever sees the selected backend.

/// Represents the secure storage capability of the current platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecureStorageCapability {
    /// Platform has a working system keyring (macOS Keychain, Windows
    /// Credential Manager, Linux Secret Service).
    SystemKeyring,
    /// Platform requires file-based storage (WSL, headless Linux).
    FileBasedKeystore,
}

/// Detect the secure storage capability of the current platform.
///
/// - **macOS** / **Windows**: always `SystemKeyring`.
/// - **Linux**: `SystemKeyring` when a desktop session is present,
///   `FileBasedKeystore` under WSL or headless.
/// - Anything else: `FileBasedKeystore`.
pub fn detect_storage_capability() -> SecureStorageCapability {
    #[cfg(target_os = "macos")]
    {
        return SecureStorageCapability::SystemKeyring;
    }

    #[cfg(target_os = "windows")]
    {
        return SecureStorageCapability::SystemKeyring;
    }

    #[cfg(target_os = "linux")]
    {
        if is_wsl() {
            log::warn!("WSL environment detected; using file-based credential storage");
            return SecureStorageCapability::FileBasedKeystore;
        }

        if has_desktop_environment() {
            return SecureStorageCapability::SystemKeyring;
        }

        log::warn!("no desktop environment detected; using file-based credential storage");
        SecureStorageCapability::FileBasedKeystore
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
    {
        log::warn!("unrecognized platform; using file-based credential storage");
        SecureStorageCapability::FileBasedKeystore
    }
}

/// Detect if running under WSL (Windows Subsystem for Linux).
#[cfg(target_os = "linux")]
fn is_wsl() -> bool {
    if let Ok(version) = std::fs::read_to_string("/proc/version") {
        if version.contains("Microsoft") || version.contains("WSL") {
            return true;
        }
    }

    std::env::var("WSL_DISTRO_NAME").is_ok() || std::env::var("WSL_INTEROP").is_ok()
}

/// Detect if running in a Linux desktop environment.
///
/// Keyring daemons (gnome-keyring, kwallet) need both a display server and
/// a D-Bus session bus.
#[cfg(target_os = "linux")]
fn has_desktop_environment() -> bool {
    std::env::var("DISPLAY").is_ok() && std::env::var("DBUS_SESSION_BUS_ADDRESS").is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detection_returns_a_supported_capability() {
        // Whatever the host, the detected capability must be usable.
        let capability = detect_storage_capability();
        assert!(matches!(
            capability,
            SecureStorageCapability::SystemKeyring | SecureStorageCapability::FileBasedKeystore
        ));
    }
}
