//! # clinintake
//!
//! Facade crate for the ClinIntake staff client core: wires the platform
//! credential store, the HTTP client and the file-backed draft store into
//! the two application flows every screen talks to.
//!
//! ```no_run
//! use clinintake::AppBuilder;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let app = AppBuilder::new("https://api.clinintake.example").build()?;
//! app.auth.initialize().await;
//! app.wizard.load().await;
//! # Ok(())
//! # }
//! ```

mod builder;

pub use builder::{AppBuilder, ClinIntakeApp};

pub use ci_app::{AuthFlow, AuthFlowError, AuthSnapshot, FinalizeError, IntakeWizard, StepSubmitError};
pub use ci_core::{AuthState, FieldError, IntakeRecord, Registration, StaffUser};

/// Install the process-wide tracing subscriber, honoring `RUST_LOG`.
/// `log`-based records from the platform and network layers are captured
/// through the same subscriber.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init();
}
