//! Registration flow and repository trait definitions for pinbridge.
//!
//! This crate defines the "ports" (repository traits) that the infrastructure
//! layer implements, plus the services built on them: the identity store,
//! the session registry, the reconciler that drives inbound chat events,
//! and the read-only user query. It depends only on `pinbridge-types` --
//! never on `pinbridge-infra` or any database/IO crate.

pub mod consumer;
pub mod identity;
pub mod query;
pub mod reconcile;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;
