//! Core Module - Infrastructure components
//!
//! - Authentication and JWT
//! - Configuration
//! - Database bootstrap
//! - Error handling
//! - Application state

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod state;

// Re-exports
pub use auth::{
    Claims, admin_middleware, authentication_middleware, decode_jwt, encode_jwt, require_role,
};
pub use config::Config;
pub use error::AppError;
pub use state::AppState;
