//! Session flow: drives the pure auth state machine and executes its side
//! effects against the auth API and the token store.
//!
//! This is the single source of truth for `{user, token, pending_email}`.
//! Only this object writes the token store; the HTTP client reads it for
//! request authorization.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use ci_core::auth::{AuthAction, AuthEvent, AuthState, AuthStateMachine};
use ci_core::domain::{Registration, StaffUser};
use ci_core::ports::{AuthApiError, AuthApiPort, TokenStorePort};

/// Errors surfaced to the render boundary.
///
/// Server denials and transport failures deliberately collapse into one
/// message-bearing variant: the screens show a single alert either way.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthFlowError {
    /// The operation did not complete; show the message to the user.
    #[error("{0}")]
    Denied(String),

    /// A logout raced this operation; its outcome was discarded.
    #[error("Operação cancelada")]
    Superseded,

    /// No registration is awaiting e-mail confirmation.
    #[error("Nenhum cadastro aguardando confirmação")]
    NoPendingVerification,
}

/// Read-only view of the session handed to screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSnapshot {
    pub user: Option<StaffUser>,
    pub token: Option<String>,
    pub pending_email: Option<String>,
    /// True while the bootstrap window is open.
    pub is_loading: bool,
    /// True while a login/register/verify call is in flight. Screens are
    /// expected to disable their triggers on this flag; the flow itself
    /// does not serialize overlapping calls (documented limitation).
    pub is_auth_loading: bool,
}

pub struct AuthFlow {
    state: Mutex<AuthState>,
    is_loading: AtomicBool,
    is_auth_loading: AtomicBool,
    /// Bumped on logout; an in-flight operation whose epoch no longer
    /// matches discards its result instead of resurrecting a session.
    epoch: AtomicU64,
    bootstrapped: AtomicBool,
    api: Arc<dyn AuthApiPort>,
    tokens: Arc<dyn TokenStorePort>,
}

impl AuthFlow {
    pub fn new(api: Arc<dyn AuthApiPort>, tokens: Arc<dyn TokenStorePort>) -> Self {
        Self {
            state: Mutex::new(AuthState::Uninitialized),
            is_loading: AtomicBool::new(false),
            is_auth_loading: AtomicBool::new(false),
            epoch: AtomicU64::new(0),
            bootstrapped: AtomicBool::new(false),
            api,
            tokens,
        }
    }

    /// Apply one event to the state machine; the state change is committed
    /// before any side effect runs, so local consistency never waits on
    /// the network.
    fn dispatch(&self, event: AuthEvent) -> Vec<AuthAction> {
        let mut guard = self.state.lock().expect("auth state poisoned");
        let (next, actions) = AuthStateMachine::transition(guard.clone(), event);
        *guard = next;
        actions
    }

    /// Execute machine actions in the order they were emitted.
    async fn run_actions(&self, actions: Vec<AuthAction>) {
        for action in actions {
            match action {
                AuthAction::PersistCredential { token } => self.tokens.set(&token),
                AuthAction::ClearStoredCredential => self.tokens.clear(),
                AuthAction::RemoteLogout => {
                    if let Err(err) = self.api.logout().await {
                        warn!("remote logout failed, local state cleared anyway: {err}");
                    }
                }
                AuthAction::SendVerificationEmail { email } => {
                    if let Err(err) = self.api.send_verification_email(&email).await {
                        warn!("confirmation e-mail send failed: {err}");
                    }
                }
                // Bootstrap verification is driven inline by `initialize`.
                AuthAction::VerifyStoredCredential => {}
            }
        }
    }

    async fn apply(&self, event: AuthEvent) {
        let actions = self.dispatch(event);
        self.run_actions(actions).await;
    }

    /// Restore a session from the persisted credential. Invoked exactly
    /// once at process start; later calls are no-ops.
    pub async fn initialize(&self) {
        if self.bootstrapped.swap(true, Ordering::SeqCst) {
            debug!("bootstrap already ran, skipping");
            return;
        }
        self.is_loading.store(true, Ordering::SeqCst);

        let actions = self.dispatch(AuthEvent::StartBootstrap);
        debug_assert_eq!(actions, vec![AuthAction::VerifyStoredCredential]);

        match self.tokens.get() {
            None => {
                debug!("no stored credential");
                self.apply(AuthEvent::NoStoredCredential).await;
            }
            Some(stored) => match self.api.verify_current_user().await {
                Ok(user) => {
                    // Mirror whatever the store holds right now so the
                    // in-memory token can never drift from the persisted one.
                    let token = self.tokens.get().unwrap_or(stored);
                    info!(user = %user.login_identifier, "session restored");
                    self.apply(AuthEvent::CredentialVerified { user, token }).await;
                }
                Err(AuthApiError::Network(reason)) => {
                    // Backend unreachable: the credential may still be good,
                    // keep it for the next launch.
                    warn!("bootstrap verification unreachable: {reason}");
                    self.apply(AuthEvent::BootstrapUnreachable).await;
                }
                Err(err) => {
                    warn!("stored credential rejected: {err}");
                    self.apply(AuthEvent::StoredCredentialRejected).await;
                }
            },
        }

        self.is_loading.store(false, Ordering::SeqCst);
    }

    pub async fn login(&self, identifier: &str, password: &str) -> Result<(), AuthFlowError> {
        self.is_auth_loading.store(true, Ordering::SeqCst);
        let epoch = self.epoch.load(Ordering::SeqCst);

        let result = self.api.login(identifier, password).await;
        let outcome = if self.epoch.load(Ordering::SeqCst) != epoch {
            debug!("login superseded by logout, discarding response");
            Err(AuthFlowError::Superseded)
        } else {
            match result {
                Ok(success) => {
                    info!(user = %success.user.login_identifier, "login succeeded");
                    self.apply(AuthEvent::LoginSucceeded {
                        user: success.user,
                        token: success.token,
                    })
                    .await;
                    Ok(())
                }
                Err(err) => {
                    debug!("login denied: {err}");
                    self.apply(AuthEvent::LoginFailed).await;
                    Err(AuthFlowError::Denied(err.to_string()))
                }
            }
        };

        self.is_auth_loading.store(false, Ordering::SeqCst);
        outcome
    }

    /// Create an account and immediately request the confirmation e-mail.
    ///
    /// A failed confirmation send does not roll the registration back: the
    /// account exists either way, so the flow still advances to pending
    /// verification and the screen offers a resend action.
    pub async fn register(&self, registration: &Registration) -> Result<(), AuthFlowError> {
        self.is_auth_loading.store(true, Ordering::SeqCst);
        let epoch = self.epoch.load(Ordering::SeqCst);

        let result = self.api.register(registration).await;
        let outcome = if self.epoch.load(Ordering::SeqCst) != epoch {
            Err(AuthFlowError::Superseded)
        } else {
            match result {
                Ok(()) => {
                    self.apply(AuthEvent::RegistrationAccepted {
                        email: registration.email.clone(),
                    })
                    .await;
                    Ok(())
                }
                Err(err) => Err(AuthFlowError::Denied(err.to_string())),
            }
        };

        self.is_auth_loading.store(false, Ordering::SeqCst);
        outcome
    }

    /// Resend the confirmation code to the pending e-mail.
    pub async fn resend_verification_email(&self) -> Result<(), AuthFlowError> {
        let email = self
            .pending_email()
            .ok_or(AuthFlowError::NoPendingVerification)?;
        self.api
            .send_verification_email(&email)
            .await
            .map_err(|err| AuthFlowError::Denied(err.to_string()))
    }

    /// Confirm the pending registration with the received code.
    ///
    /// NOTE: a successful confirmation does NOT establish a session; the
    /// user still logs in separately afterwards. See the state machine for
    /// the open product question around this.
    pub async fn handle_email_verification(&self, code: &str) -> Result<(), AuthFlowError> {
        let email = self
            .pending_email()
            .ok_or(AuthFlowError::NoPendingVerification)?;

        self.is_auth_loading.store(true, Ordering::SeqCst);
        let epoch = self.epoch.load(Ordering::SeqCst);

        let result = self.api.verify_email_code(&email, code).await;
        let outcome = if self.epoch.load(Ordering::SeqCst) != epoch {
            Err(AuthFlowError::Superseded)
        } else {
            match result {
                Ok(()) => {
                    info!(email = %email, "e-mail confirmed");
                    self.apply(AuthEvent::EmailVerified).await;
                    Ok(())
                }
                Err(err) => {
                    // The pending e-mail survives a bad code.
                    self.apply(AuthEvent::EmailCodeRejected).await;
                    Err(AuthFlowError::Denied(err.to_string()))
                }
            }
        };

        self.is_auth_loading.store(false, Ordering::SeqCst);
        outcome
    }

    /// Full local reset. The remote invalidation is best-effort: local
    /// state and the stored credential are cleared even when the server
    /// call fails. Calling this while already unauthenticated is a no-op.
    pub async fn logout(&self) {
        // Invalidate any in-flight login/register/verify response.
        self.epoch.fetch_add(1, Ordering::SeqCst);

        // The machine orders the remote call before the credential wipe so
        // the invalidation request still carries the bearer header.
        self.apply(AuthEvent::LogoutRequested).await;
        info!("logged out");
    }

    pub fn snapshot(&self) -> AuthSnapshot {
        let state = self.state.lock().expect("auth state poisoned");
        AuthSnapshot {
            user: state.user().cloned(),
            token: state.token().map(str::to_string),
            pending_email: state.pending_email().map(str::to_string),
            is_loading: self.is_loading.load(Ordering::SeqCst),
            is_auth_loading: self.is_auth_loading.load(Ordering::SeqCst),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.state
            .lock()
            .expect("auth state poisoned")
            .user()
            .is_some()
    }

    fn pending_email(&self) -> Option<String> {
        self.state
            .lock()
            .expect("auth state poisoned")
            .pending_email()
            .map(str::to_string)
    }
}
