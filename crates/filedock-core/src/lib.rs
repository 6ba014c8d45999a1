//! # filedock-core
//!
//! Core crate for Filedock. Contains the external-collaborator traits
//! (blob storage, access control, identity lookup), configuration schemas,
//! and the unified error system.
//!
//! This crate has **no** internal dependencies on other Filedock crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::AppError;
pub use result::AppResult;
