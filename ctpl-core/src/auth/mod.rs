//! Authentication module for bearer JWT validation

mod config;
mod context;
mod error;
mod validator;

pub use config::AuthConfig;
pub use context::{AuthContext, Identity};
pub use error::AuthError;
pub use validator::JwtValidator;
