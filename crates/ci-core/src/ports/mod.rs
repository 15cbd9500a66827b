//! Port interfaces for the application layer.
//!
//! Ports define the contract between the application logic (stores/flows)
//! and infrastructure implementations, keeping the core business logic
//! independent of concrete storage backends and HTTP transports.

mod auth_api;
mod draft_store;
mod secure_storage;
mod token_store;

pub use auth_api::{AuthApiError, AuthApiPort, LoginSuccess};
pub use draft_store::DraftStorePort;
pub use secure_storage::{SecureStorageError, SecureStoragePort};
pub use token_store::TokenStorePort;
