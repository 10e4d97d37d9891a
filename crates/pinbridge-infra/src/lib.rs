//! Infrastructure layer for pinbridge.
//!
//! Contains implementations of the repository traits defined in `pinbridge-core`
//! (SQLite storage and a backend switch for sessions), the configuration file
//! loader, and the Telegram long-poll client that feeds inbound chat events.

pub mod config;
pub mod session_backend;
pub mod sqlite;
pub mod telegram;
