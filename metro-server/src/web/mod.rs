//! Web layer for the metro service.
//!
//! Provides HTTP endpoints for listing networks, station autocomplete and
//! routing.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
