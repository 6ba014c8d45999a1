//! Background processing for Filedock.
//!
//! This crate provides:
//! - The retention sweeper that reclaims storage from expired, non-retained
//!   versions
//! - A cron scheduler that runs the sweep on a periodic cadence

pub mod scheduler;
pub mod sweeper;

pub use scheduler::RetentionScheduler;
pub use sweeper::{RetentionSweeper, SweepReport};
