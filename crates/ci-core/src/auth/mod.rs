//! Session/authentication lifecycle domain.

mod state_machine;

pub use state_machine::{AuthAction, AuthEvent, AuthState, AuthStateMachine};
