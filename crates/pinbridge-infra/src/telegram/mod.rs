//! Telegram Bot API transport.
//!
//! Long-polls `getUpdates` and forwards each text message as an
//! [`InboundEvent`](pinbridge_types::event::InboundEvent) into the consumer
//! channel. Delivery is at-least-once: the offset only advances once an
//! update has been handed to the channel.

pub mod poller;
pub mod types;

pub use poller::{TelegramError, TelegramPoller};
