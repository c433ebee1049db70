//! Service layer for business logic orchestration
//!
//! Wires the reconciler to concrete collaborators so main.rs only deals with
//! argument parsing and output.

pub mod pull_secret;

pub use pull_secret::PullSecretService;
