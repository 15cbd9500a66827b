//! Clinical intake form domain: master schema, step projections, field
//! validation and the accumulated record.
//!
//! The form is one master schema of ~50 fields partitioned into six ordered
//! step projections. Each projection validates only its own slice; the
//! accumulated record is the union of everything submitted so far.

mod fields;
mod record;
mod validate;
pub mod validators;

pub use fields::{step, Constraint, FieldSpec, StepProjection, STEPS};
pub use record::IntakeRecord;
pub use validate::{validate_step, FieldError};
