//! # facilityhub-core
//!
//! Core crate for FacilityHub Console. Contains configuration schemas,
//! typed identifiers, the REST response envelope types, and the unified
//! error system.
//!
//! This crate has **no** internal dependencies on other FacilityHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
