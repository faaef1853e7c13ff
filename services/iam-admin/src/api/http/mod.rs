//! REST API (axum)

pub mod dto;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use routes::router;
pub use state::AppState;
