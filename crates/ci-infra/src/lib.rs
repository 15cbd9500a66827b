//! # ci-infra
//!
//! Infrastructure persistence adapters for ClinIntake.

pub mod draft;

pub use draft::FileDraftStore;
