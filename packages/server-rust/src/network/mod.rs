//! Networking: configuration, HTTP middleware, handlers, server lifecycle and request draining.

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod module;
pub mod drain;

pub use config::*;
pub use handlers::AppState;
pub use module::NetworkModule;
pub use drain::{DrainState, HealthState, RequestGuard};
