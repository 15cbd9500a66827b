//! # ci-app
//!
//! Application layer for ClinIntake: the two stateful flows every screen
//! talks to. [`AuthFlow`] owns the session lifecycle, [`IntakeWizard`] owns
//! the six-step form accumulator. Views never mutate state directly; every
//! mutation goes through a named method on one of these objects.

pub mod auth_flow;
pub mod wizard;

pub use auth_flow::{AuthFlow, AuthFlowError, AuthSnapshot};
pub use wizard::{FinalizeError, IntakeWizard, StepSubmitError};
