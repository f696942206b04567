//! PaperVault API Library
//!
//! This crate provides the HTTP handlers, admin authentication, and application setup.

// Module declarations
mod api_doc;
mod handlers;
mod telemetry;
mod utils;

// Public modules
pub mod auth;
pub mod error;
pub mod setup;
pub mod state;

// Re-exports
pub use error::ErrorResponse;
pub use setup::routes::setup_routes;
pub use state::{AppState, Stores};
