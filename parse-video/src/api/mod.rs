//! REST API module.

pub mod error;
pub mod models;
pub mod routes;
pub mod server;

pub use server::{ApiServer, AppState};
