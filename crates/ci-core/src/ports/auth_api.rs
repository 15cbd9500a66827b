use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::{Registration, StaffUser};

/// How a backend call failed.
///
/// The three variants collapse to one user-facing message at the flow
/// boundary, but callers (and tests) can distinguish a request that never
/// reached the server from one the server explicitly denied or answered
/// ambiguously.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthApiError {
    /// Request never reached the server (DNS, refused, timeout).
    #[error("falha de conexão: {0}")]
    Network(String),

    /// Server responded but denied the operation (bad credentials,
    /// validation rejection, unknown code).
    #[error("{message}")]
    Rejected { message: String },

    /// Response arrived but its success flag was missing or ambiguous.
    #[error("resposta inesperada do servidor: {0}")]
    Malformed(String),
}

/// Successful login payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginSuccess {
    pub user: StaffUser,
    pub token: String,
}

/// Stateless request wrappers around the backend, one per operation.
///
/// This layer performs no storage side effects: `login` does not persist
/// the returned token (the auth flow does), and the token store is only
/// read for request authorization.
#[async_trait]
pub trait AuthApiPort: Send + Sync {
    async fn login(&self, identifier: &str, password: &str) -> Result<LoginSuccess, AuthApiError>;

    /// Re-validate whatever credential the token store currently holds.
    /// Used only at bootstrap.
    async fn verify_current_user(&self) -> Result<StaffUser, AuthApiError>;

    async fn register(&self, registration: &Registration) -> Result<(), AuthApiError>;

    async fn send_verification_email(&self, email: &str) -> Result<(), AuthApiError>;

    /// The code is matched against the specific pending e-mail, not any
    /// arbitrary address.
    async fn verify_email_code(&self, email: &str, code: &str) -> Result<(), AuthApiError>;

    /// Server-side session invalidation, best-effort.
    async fn logout(&self) -> Result<(), AuthApiError>;

    /// Submit the whole accumulated intake record.
    async fn submit_intake(&self, record: &Map<String, Value>) -> Result<(), AuthApiError>;
}
