/// The session credential store consumed by the auth flow.
///
/// Deliberately infallible: a missing credential is always a safe,
/// recoverable state (it forces a fresh login), so implementations swallow
/// backend failures and surface them as "absent" instead of propagating
/// errors the caller could not act on anyway.
///
/// Single-writer discipline: only the auth flow writes through this port;
/// the HTTP client reads it for request authorization.
pub trait TokenStorePort: Send + Sync {
    /// The persisted credential, or `None` if absent or unreadable.
    fn get(&self) -> Option<String>;

    /// Persist the credential. Failures are logged, never propagated.
    fn set(&self, credential: &str);

    /// Remove the credential. Clearing an empty store is a no-op.
    fn clear(&self);
}
