//! Middleware for the ctpl server

mod auth;

pub use auth::{AuthLayer, auth_middleware};
