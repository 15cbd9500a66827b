//! # ci-core
//!
//! Core domain models and business logic for ClinIntake.
//!
//! This crate contains pure business logic without any infrastructure dependencies.

// Public module exports
pub mod auth;
pub mod domain;
pub mod intake;
pub mod ports;

// Re-export commonly used types at the crate root
pub use auth::{AuthAction, AuthEvent, AuthState, AuthStateMachine};
pub use domain::{Registration, StaffUser};
pub use intake::{FieldError, IntakeRecord, StepProjection, STEPS};
