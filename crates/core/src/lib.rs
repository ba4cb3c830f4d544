//! Core business logic for OASYS.
//!
//! This crate contains pure business logic with ZERO web or database
//! dependencies. All domain types, validation rules, and calculations live
//! here.
//!
//! # Modules
//!
//! - `fiscal` - Fiscal year/period lifecycle, posting rules, year-end close
//! - `auth` - Password hashing

pub mod auth;
pub mod fiscal;
