//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both the CLI and the
//! REST API. Services are generic over repository traits, but AppState pins
//! them to the concrete infra implementations.

use std::sync::Arc;

use pinbridge_core::identity::store::IdentityStore;
use pinbridge_core::query::UserQuery;
use pinbridge_core::reconcile::Reconciler;
use pinbridge_core::session::registry::SessionRegistry;
use pinbridge_infra::session_backend::AnySessionRepository;
use pinbridge_infra::sqlite::identity::SqliteIdentityRepository;
use pinbridge_infra::sqlite::pool::DatabasePool;
use pinbridge_types::config::{AppConfig, SessionBackend};

/// Concrete type aliases for the service generics pinned to infra implementations.
pub type ConcreteReconciler = Reconciler<AnySessionRepository, SqliteIdentityRepository>;

pub type ConcreteUserQuery = UserQuery<SqliteIdentityRepository>;

/// Shared application state holding all services.
#[derive(Clone)]
pub struct AppState {
    pub reconciler: Arc<ConcreteReconciler>,
    pub user_query: Arc<ConcreteUserQuery>,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Connect to the database (running migrations) and wire services.
    pub async fn init(config: &AppConfig) -> anyhow::Result<Self> {
        let db_pool = DatabasePool::new(&config.database.url).await?;
        Ok(Self::from_pool(db_pool, config.sessions.backend))
    }

    pub fn from_pool(db_pool: DatabasePool, backend: SessionBackend) -> Self {
        // The reconciler and the query facade share one identity store.
        let identities = Arc::new(IdentityStore::new(SqliteIdentityRepository::new(
            db_pool.clone(),
        )));
        let sessions = Arc::new(SessionRegistry::new(AnySessionRepository::from_config(
            backend, &db_pool,
        )));

        Self {
            reconciler: Arc::new(Reconciler::new(sessions, Arc::clone(&identities))),
            user_query: Arc::new(UserQuery::new(identities)),
            db_pool,
        }
    }
}
