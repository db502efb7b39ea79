//! Domain model for the reconciliation core.
//!
//! # Responsibility
//! - Define canonical entity shapes shared by merge, propagation and events.
//! - Keep identity-key and content-fingerprint rules next to the data they
//!   read.
//!
//! # Invariants
//! - Every entity is identified by a stable UUID that is never reused.
//! - Ownership is explicit: a news belongs to exactly one feed or one bin.
//! - Deletion of news is tombstoned (`NewsState::Deleted`) before any
//!   physical purge.

pub mod feed;
pub mod folder;
pub mod label;
pub mod news;
pub mod reference;
