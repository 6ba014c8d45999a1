//! # filedock-service
//!
//! Business logic for Filedock. The checkout state machine
//! ([`file::checkout::CheckoutService`]) serializes pull/push/cancel
//! transitions per file; [`file::service::FileService`] carries the file
//! lifecycle around it; [`file::content::ContentService`] streams version
//! blobs and [`file::version::VersionService`] manages version history and
//! retention pins.

pub mod context;
pub mod file;

pub use context::RequestContext;
