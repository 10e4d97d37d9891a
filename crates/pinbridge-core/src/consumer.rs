//! Single consumer for the inbound chat event stream.
//!
//! Events are handled strictly one at a time, in channel order. A failed
//! event is logged and skipped; the stream keeps going. Cancellation is
//! checked between events and raced against the event in flight, and each
//! event runs under a deadline.

use std::sync::Arc;
use std::time::Duration;

use pinbridge_types::error::RegistrationError;
use pinbridge_types::event::{InboundEvent, Outcome};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::identity::repository::IdentityRepository;
use crate::reconcile::Reconciler;
use crate::session::repository::SessionRepository;

/// Counters reported when the consumer stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsumerStats {
    pub handled: u64,
    pub failed: u64,
}

pub struct EventConsumer<S: SessionRepository, I: IdentityRepository> {
    reconciler: Arc<Reconciler<S, I>>,
    event_timeout: Duration,
}

impl<S: SessionRepository, I: IdentityRepository> EventConsumer<S, I> {
    pub fn new(reconciler: Arc<Reconciler<S, I>>, event_timeout: Duration) -> Self {
        Self {
            reconciler,
            event_timeout,
        }
    }

    /// Consume events until the channel closes or `cancel` fires.
    pub async fn run(
        &self,
        mut events: mpsc::Receiver<InboundEvent>,
        cancel: CancellationToken,
    ) -> ConsumerStats {
        let mut stats = ConsumerStats::default();
        info!("Event consumer started");

        loop {
            let event = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                next = events.recv() => match next {
                    Some(event) => event,
                    None => break,
                },
            };

            match self.handle(&event, &cancel).await {
                Ok(outcome) => {
                    stats.handled += 1;
                    debug!(chat_id = event.chat_id, ?outcome, "Event handled");
                }
                Err(e) => {
                    stats.failed += 1;
                    warn!(chat_id = event.chat_id, error = %e, "Event failed");
                }
            }
        }

        info!(handled = stats.handled, failed = stats.failed, "Event consumer stopped");
        stats
    }

    /// Handle one event under the deadline, aborting if `cancel` fires.
    ///
    /// Dropping the in-flight future leaves only what already committed.
    pub async fn handle(
        &self,
        event: &InboundEvent,
        cancel: &CancellationToken,
    ) -> Result<Outcome, RegistrationError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(RegistrationError::StorageUnavailable(
                "cancelled".to_string(),
            )),
            result = tokio::time::timeout(self.event_timeout, self.reconciler.handle_event(event)) => {
                result.unwrap_or_else(|_| {
                    Err(RegistrationError::StorageUnavailable(format!(
                        "deadline of {:?} exceeded",
                        self.event_timeout
                    )))
                })
            }
        }
    }
}
