//! Reconciliation of inbound chat events into identity records.
//!
//! Each chat goes through `open -> pin received -> identity persisted`:
//!
//! 1. Every event finds or creates the chat's open session.
//! 2. The event that creates the session only contributes the display name;
//!    its text is ignored.
//! 3. Any later event while the session is open is the pin submission: the
//!    pin is attached, the identity is persisted, then the session is
//!    completed. The identity write comes first, so a crash before the state
//!    flip leaves an open session with a pin, which [`Reconciler::recover_pending`]
//!    (or the next event) finishes.
//! 4. Once completed, the next event opens a fresh session; its pin resolves
//!    to the chat's existing user id.

use std::sync::Arc;

use pinbridge_types::error::RegistrationError;
use pinbridge_types::event::{InboundEvent, Outcome};
use pinbridge_types::identity::UserId;
use pinbridge_types::session::ChatSession;
use tracing::{debug, info, instrument, warn};

use crate::identity::repository::IdentityRepository;
use crate::identity::store::IdentityStore;
use crate::session::registry::{SessionLookup, SessionRegistry};
use crate::session::repository::SessionRepository;

pub struct Reconciler<S: SessionRepository, I: IdentityRepository> {
    sessions: Arc<SessionRegistry<S>>,
    identities: Arc<IdentityStore<I>>,
}

impl<S: SessionRepository, I: IdentityRepository> Reconciler<S, I> {
    pub fn new(sessions: Arc<SessionRegistry<S>>, identities: Arc<IdentityStore<I>>) -> Self {
        Self {
            sessions,
            identities,
        }
    }

    pub fn sessions(&self) -> &SessionRegistry<S> {
        &self.sessions
    }

    pub fn identities(&self) -> &IdentityStore<I> {
        &self.identities
    }

    /// Drive one inbound event through the state machine.
    ///
    /// While a session is open, every event counts as the pin submission,
    /// except one whose text is blank after trimming: that one yields
    /// [`Outcome::Ignored`] and the session stays open, so a repeated empty
    /// first contact never registers an empty pin. Non-blank text is stored
    /// verbatim.
    ///
    /// Errors abort this event only; whatever already committed stays.
    #[instrument(skip_all, fields(chat_id = event.chat_id))]
    pub async fn handle_event(&self, event: &InboundEvent) -> Result<Outcome, RegistrationError> {
        let lookup = self
            .sessions
            .find_or_create_session(event.chat_id, &event.display_name)
            .await?;

        let session = match lookup {
            SessionLookup::Created(session) => {
                return Ok(Outcome::SessionOpened {
                    session_id: session.id,
                });
            }
            SessionLookup::Existing(session) => session,
        };

        if event.text.trim().is_empty() {
            debug!(session_id = %session.id, "Blank pin submission ignored");
            return Ok(Outcome::Ignored {
                session_id: session.id,
            });
        }

        self.sessions.attach_pin(session.id, &event.text).await?;
        let user_id = self.reconcile(&session).await?;

        Ok(Outcome::Registered {
            session_id: session.id,
            user_id,
        })
    }

    /// Complete every open session that already has a pin.
    ///
    /// Returns the number of sessions completed. A failure on one session is
    /// logged and does not stop the sweep.
    pub async fn recover_pending(&self) -> Result<usize, RegistrationError> {
        let pending = self.sessions.pending_sessions().await?;
        let mut recovered = 0;

        for session in &pending {
            match self.reconcile(session).await {
                Ok(user_id) => {
                    info!(session_id = %session.id, user_id = %user_id, "Recovered pending session");
                    recovered += 1;
                }
                Err(e) => {
                    warn!(session_id = %session.id, error = %e, "Failed to recover pending session");
                }
            }
        }

        Ok(recovered)
    }

    /// Persist the identity for `session`, then mark it completed.
    async fn reconcile(&self, session: &ChatSession) -> Result<UserId, RegistrationError> {
        let user_id = self
            .identities
            .persist(session.chat_id, &session.display_name)
            .await?;
        self.sessions.complete_session(session.id).await?;
        Ok(user_id)
    }
}
