//! Durable identity records and the store that creates them.

pub mod repository;
pub mod store;
