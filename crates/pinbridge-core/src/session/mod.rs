//! Registration sessions: persistence port, in-memory backend, and the
//! registry service that enforces the open/completed lifecycle.

pub mod memory;
pub mod registry;
pub mod repository;
