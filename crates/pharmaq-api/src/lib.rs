//! Pharmaq API crate - axum HTTP server and route handlers.
//!
//! Exposes the session store, chat responder, report builder, and exporters
//! over HTTP for the browser page served at `/ui`.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod sessions;
pub mod state;

pub use error::ApiError;
pub use routes::{create_router, start_server};
pub use sessions::SessionStore;
pub use state::AppState;
