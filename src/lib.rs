pub mod auth;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod naming;
pub mod reference;
pub mod secret;
pub mod service;

pub use error::{PullSecretError, Result};
