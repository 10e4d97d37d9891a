//! Read-only user lookup for the HTTP interface and CLI.

use std::sync::Arc;

use pinbridge_types::error::RegistrationError;
use pinbridge_types::identity::{UserId, UserView};

use crate::identity::repository::IdentityRepository;
use crate::identity::store::IdentityStore;

pub struct UserQuery<I: IdentityRepository> {
    identities: Arc<IdentityStore<I>>,
}

impl<I: IdentityRepository> UserQuery<I> {
    pub fn new(identities: Arc<IdentityStore<I>>) -> Self {
        Self { identities }
    }

    /// Resolve a raw user id to its public view.
    ///
    /// Malformed input fails with `InvalidIdentifier` before any store call.
    pub async fn resolve(&self, raw_id: &str) -> Result<UserView, RegistrationError> {
        let user_id: UserId = raw_id
            .trim()
            .parse()
            .map_err(|_| RegistrationError::InvalidIdentifier(raw_id.to_string()))?;

        let record = self.identities.fetch(&user_id).await?;
        Ok(record.into())
    }
}
