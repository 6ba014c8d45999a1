//! Traits at the seams to external collaborators.
//!
//! The blob store, the access-control layer, and the identity directory are
//! all injected into the engine through the traits defined here; there are
//! no process-wide singletons.

pub mod access;
pub mod identity;
pub mod storage;
