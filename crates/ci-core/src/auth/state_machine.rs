//! Session lifecycle state machine.
//!
//! Defines a pure state transition function for the authentication flow.
//! Side effects (network calls, credential persistence) are expressed as
//! [`AuthAction`]s and executed by the application-layer flow.

use crate::domain::StaffUser;

/// Session lifecycle state.
///
/// `PendingVerification` is entered only via registration, never via login.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum AuthState {
    /// Process start; nothing read from storage yet.
    Uninitialized,
    /// Stored credential being verified against the backend.
    Bootstrapping,
    /// No session. The login and registration screens are reachable.
    Unauthenticated,
    /// Established session.
    Authenticated { user: StaffUser, token: String },
    /// Registration accepted; waiting for the e-mail confirmation code.
    PendingVerification { email: String },
}

impl AuthState {
    pub fn user(&self) -> Option<&StaffUser> {
        match self {
            AuthState::Authenticated { user, .. } => Some(user),
            _ => None,
        }
    }

    pub fn token(&self) -> Option<&str> {
        match self {
            AuthState::Authenticated { token, .. } => Some(token),
            _ => None,
        }
    }

    pub fn pending_email(&self) -> Option<&str> {
        match self {
            AuthState::PendingVerification { email } => Some(email),
            _ => None,
        }
    }
}

/// Events that drive the session lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    /// Process start; begin restoring a session from storage.
    StartBootstrap,
    /// Stored credential accepted by the backend.
    CredentialVerified { user: StaffUser, token: String },
    /// No credential was stored.
    NoStoredCredential,
    /// A credential was stored but the backend rejected it.
    StoredCredentialRejected,
    /// Bootstrap verification could not reach the backend.
    BootstrapUnreachable,
    /// Login request accepted.
    LoginSucceeded { user: StaffUser, token: String },
    /// Login request denied.
    LoginFailed,
    /// Registration accepted for this e-mail.
    RegistrationAccepted { email: String },
    /// Confirmation code accepted for the pending e-mail.
    EmailVerified,
    /// Confirmation code rejected; the pending e-mail is kept.
    EmailCodeRejected,
    /// User-triggered logout.
    LogoutRequested,
}

/// Side-effects produced by state transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthAction {
    /// Read the token store and verify the credential with the backend.
    VerifyStoredCredential,
    /// Persist the session credential in the token store.
    PersistCredential { token: String },
    /// Remove the persisted credential (stale-credential cleanup, logout).
    ClearStoredCredential,
    /// Best-effort server-side session invalidation.
    RemoteLogout,
    /// Send the confirmation code to the freshly registered e-mail.
    SendVerificationEmail { email: String },
}

/// Pure session state machine: no side effects, no I/O.
pub struct AuthStateMachine;

impl AuthStateMachine {
    pub fn transition(state: AuthState, event: AuthEvent) -> (AuthState, Vec<AuthAction>) {
        match (state, event) {
            (AuthState::Uninitialized, AuthEvent::StartBootstrap) => (
                AuthState::Bootstrapping,
                vec![AuthAction::VerifyStoredCredential],
            ),
            (AuthState::Bootstrapping, AuthEvent::CredentialVerified { user, token }) => {
                (AuthState::Authenticated { user, token }, Vec::new())
            }
            (AuthState::Bootstrapping, AuthEvent::NoStoredCredential) => {
                (AuthState::Unauthenticated, Vec::new())
            }
            // Clearing here prevents an endless verify-fail loop on every
            // subsequent launch with the same stale credential.
            (AuthState::Bootstrapping, AuthEvent::StoredCredentialRejected) => (
                AuthState::Unauthenticated,
                vec![AuthAction::ClearStoredCredential],
            ),
            // Transport failure keeps the credential: it may be perfectly
            // valid once the backend is reachable again.
            (AuthState::Bootstrapping, AuthEvent::BootstrapUnreachable) => {
                (AuthState::Unauthenticated, Vec::new())
            }
            // A login over an existing session overwrites it: last write
            // wins, and the new credential replaces the stored one.
            (
                AuthState::Unauthenticated | AuthState::Authenticated { .. },
                AuthEvent::LoginSucceeded { user, token },
            ) => (
                AuthState::Authenticated {
                    user,
                    token: token.clone(),
                },
                vec![AuthAction::PersistCredential { token }],
            ),
            (AuthState::Unauthenticated, AuthEvent::LoginFailed) => {
                (AuthState::Unauthenticated, Vec::new())
            }
            (AuthState::Unauthenticated, AuthEvent::RegistrationAccepted { email }) => (
                AuthState::PendingVerification {
                    email: email.clone(),
                },
                vec![AuthAction::SendVerificationEmail { email }],
            ),
            // NOTE: verification deliberately does NOT establish a session.
            // The user still logs in with their new credentials afterwards.
            // Whether this is defense in depth or an oversight is an open
            // product question; keep the separate-login behavior until it
            // is settled.
            (AuthState::PendingVerification { .. }, AuthEvent::EmailVerified) => {
                (AuthState::Unauthenticated, Vec::new())
            }
            (AuthState::PendingVerification { email }, AuthEvent::EmailCodeRejected) => {
                (AuthState::PendingVerification { email }, Vec::new())
            }
            // Logout is accepted from any state and always performs the
            // full local reset; remote invalidation is best-effort.
            (_, AuthEvent::LogoutRequested) => (
                AuthState::Unauthenticated,
                vec![AuthAction::RemoteLogout, AuthAction::ClearStoredCredential],
            ),
            (state, _event) => (state, Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AuthAction, AuthEvent, AuthState, AuthStateMachine};
    use crate::domain::StaffUser;

    fn user() -> StaffUser {
        StaffUser {
            id: "u-1".into(),
            login_identifier: "a@b.com".into(),
            display_name: "Dra. A".into(),
        }
    }

    #[test]
    fn bootstrap_verifies_stored_credential() {
        let (next, actions) =
            AuthStateMachine::transition(AuthState::Uninitialized, AuthEvent::StartBootstrap);
        assert_eq!(next, AuthState::Bootstrapping);
        assert_eq!(actions, vec![AuthAction::VerifyStoredCredential]);
    }

    #[test]
    fn rejected_stored_credential_is_cleared() {
        let (next, actions) = AuthStateMachine::transition(
            AuthState::Bootstrapping,
            AuthEvent::StoredCredentialRejected,
        );
        assert_eq!(next, AuthState::Unauthenticated);
        assert_eq!(actions, vec![AuthAction::ClearStoredCredential]);
    }

    #[test]
    fn unreachable_backend_keeps_credential() {
        let (next, actions) =
            AuthStateMachine::transition(AuthState::Bootstrapping, AuthEvent::BootstrapUnreachable);
        assert_eq!(next, AuthState::Unauthenticated);
        assert!(actions.is_empty());
    }

    #[test]
    fn login_persists_the_credential() {
        let (next, actions) = AuthStateMachine::transition(
            AuthState::Unauthenticated,
            AuthEvent::LoginSucceeded {
                user: user(),
                token: "tok-1".into(),
            },
        );
        assert_eq!(next.token(), Some("tok-1"));
        assert_eq!(
            actions,
            vec![AuthAction::PersistCredential {
                token: "tok-1".into()
            }]
        );
    }

    #[test]
    fn registration_enters_pending_verification_and_sends_email() {
        let (next, actions) = AuthStateMachine::transition(
            AuthState::Unauthenticated,
            AuthEvent::RegistrationAccepted {
                email: "a@b.com".into(),
            },
        );
        assert_eq!(next.pending_email(), Some("a@b.com"));
        assert_eq!(
            actions,
            vec![AuthAction::SendVerificationEmail {
                email: "a@b.com".into()
            }]
        );
    }

    #[test]
    fn rejected_code_keeps_pending_email() {
        let state = AuthState::PendingVerification {
            email: "a@b.com".into(),
        };
        let (next, actions) = AuthStateMachine::transition(state, AuthEvent::EmailCodeRejected);
        assert_eq!(next.pending_email(), Some("a@b.com"));
        assert!(actions.is_empty());
    }

    #[test]
    fn verified_email_does_not_establish_a_session() {
        let state = AuthState::PendingVerification {
            email: "a@b.com".into(),
        };
        let (next, actions) = AuthStateMachine::transition(state, AuthEvent::EmailVerified);
        assert_eq!(next, AuthState::Unauthenticated);
        assert!(actions.is_empty());
    }

    #[test]
    fn logout_resets_from_any_state() {
        for state in [
            AuthState::Unauthenticated,
            AuthState::Authenticated {
                user: user(),
                token: "tok".into(),
            },
            AuthState::PendingVerification {
                email: "a@b.com".into(),
            },
        ] {
            let (next, actions) =
                AuthStateMachine::transition(state, AuthEvent::LogoutRequested);
            assert_eq!(next, AuthState::Unauthenticated);
            assert_eq!(
                actions,
                vec![AuthAction::RemoteLogout, AuthAction::ClearStoredCredential]
            );
        }
    }

    #[test]
    fn relogin_overwrites_the_existing_session() {
        let state = AuthState::Authenticated {
            user: user(),
            token: "tok-old".into(),
        };
        let (next, actions) = AuthStateMachine::transition(
            state,
            AuthEvent::LoginSucceeded {
                user: user(),
                token: "tok-new".into(),
            },
        );
        assert_eq!(next.token(), Some("tok-new"));
        assert_eq!(
            actions,
            vec![AuthAction::PersistCredential {
                token: "tok-new".into()
            }]
        );
    }

    #[test]
    fn login_while_pending_verification_is_ignored() {
        let state = AuthState::PendingVerification {
            email: "a@b.com".into(),
        };
        let (next, actions) = AuthStateMachine::transition(
            state.clone(),
            AuthEvent::LoginSucceeded {
                user: user(),
                token: "tok".into(),
            },
        );
        assert_eq!(next, state);
        assert!(actions.is_empty());
    }
}
