//! # filedock-storage
//!
//! Version blob storage for Filedock. Provides the [`VersionStore`] facade
//! used by the checkout engine and the retention sweeper, the deterministic
//! object-key scheme, and [`StorageProvider`] implementations for the local
//! filesystem and S3-compatible object stores.

pub mod keys;
pub mod providers;
pub mod version_store;

pub use version_store::VersionStore;
