//! Shared types, errors, and configuration for OASYS.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - The API response envelope and pagination types
//! - JWT token handling and auth payloads
//! - Application-wide error types
//! - Configuration management

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;
pub mod types;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use jwt::{Claims, JwtConfig, JwtError, JwtService};
