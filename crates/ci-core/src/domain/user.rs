use serde::{Deserialize, Serialize};

/// Identity record of an authenticated staff member (doctor or secretary).
///
/// Present only while a session is established; owned exclusively by the
/// auth flow, which sets it on successful login/bootstrap and clears it on
/// logout or failed credential verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffUser {
    /// Backend-assigned identifier. Opaque to the client.
    pub id: String,
    /// The identifier the user logs in with (institutional e-mail).
    pub login_identifier: String,
    /// Name shown in the app header and audit trail.
    pub display_name: String,
}
