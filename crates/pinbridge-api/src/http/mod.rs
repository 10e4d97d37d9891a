//! HTTP/REST API layer for pinbridge.
//!
//! Flat JSON bodies: resources on success, `{ "error": ... }` on failure.

pub mod error;
pub mod handlers;
pub mod router;
