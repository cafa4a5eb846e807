//! Careguard daemon library
//!
//! Components for the `careguardd` service:
//! - REST API exposing the access evaluator and route gate
//! - Layered configuration
//! - Server lifecycle management

pub mod api;
pub mod config;
pub mod error;
pub mod server;

pub use config::DaemonConfig;
pub use error::{ApiError, DaemonError};
pub use server::Server;
