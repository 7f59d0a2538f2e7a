//! # Debate Coach API
//!
//! HTTP and WebSocket surface for the debate coach.
//!
//! Features:
//! - Axum-based web server with graceful shutdown
//! - JWT authentication, with a demo token for local use
//! - Tower middleware (request id, tracing, CORS, timeout, body limit, gzip)
//! - WebSocket channel for live debates

pub mod auth;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;
pub mod ws;

pub use auth::{AuthUser, Claims, JwtAuth};
pub use error::{ApiError, ApiResult};
pub use server::{CoachServer, ServerConfig};
pub use state::AppState;
