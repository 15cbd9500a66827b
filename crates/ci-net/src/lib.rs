//! # ci-net
//!
//! HTTP client for the ClinIntake backend: a [`ci_core::ports::AuthApiPort`]
//! implementation over one base URL with JSON bodies and a bearer-style
//! credential header read from the token store.

mod client;

pub use client::AuthApiClient;
