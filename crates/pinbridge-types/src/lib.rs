//! Shared domain types for pinbridge.
//!
//! This crate contains the core domain types used across the workspace:
//! identity records, registration sessions, inbound chat events,
//! configuration, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod config;
pub mod error;
pub mod event;
pub mod identity;
pub mod session;
