//! HTTP API surface.

mod ai;
mod routes;
mod tasks;
mod types;

pub use routes::{router, serve, AppState};
pub use types::ApiError;
