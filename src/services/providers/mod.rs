/// Data sources the recommendation pipeline reads from
///
/// The pipeline only needs two narrow read interfaces: a user directory
/// and an event catalog. Both are implemented over PostgreSQL for
/// production and over an in-memory JSON snapshot for demos and tests.
use std::sync::Arc;

use crate::{
    config::Config,
    error::AppResult,
    models::{CatalogEvent, User},
};

pub mod postgres;
pub mod snapshot;

pub use postgres::PgStore;
pub use snapshot::SnapshotStore;

/// Resolves users and their accepted friends
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait UserDirectory: Send + Sync {
    /// Looks up a user by id
    async fn get_user(&self, user_id: &str) -> AppResult<Option<User>>;

    /// Lists accepted friends of a user, in either direction of the friendship
    async fn list_friends(&self, user_id: &str) -> AppResult<Vec<User>>;
}

/// Lists events annotated for a viewer
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait EventCatalog: Send + Sync {
    /// Every event, ordered by start time with unknown starts last.
    ///
    /// Each event carries the viewer's friends attending it whose
    /// visibility mode lets friends see their attendance.
    async fn list_events_for_viewer(&self, viewer_id: &str) -> AppResult<Vec<CatalogEvent>>;
}

/// Both collaborators, usually backed by the same store
pub struct DataSources {
    pub users: Arc<dyn UserDirectory>,
    pub catalog: Arc<dyn EventCatalog>,
}

impl DataSources {
    pub fn from_store<S>(store: S) -> Self
    where
        S: UserDirectory + EventCatalog + 'static,
    {
        let store = Arc::new(store);
        Self {
            users: store.clone(),
            catalog: store,
        }
    }

    /// Opens the snapshot when one is configured, PostgreSQL otherwise
    pub async fn connect(config: &Config) -> anyhow::Result<Self> {
        if let Some(path) = &config.snapshot_path {
            let store = SnapshotStore::from_path(path)?;
            tracing::info!(
                path = %path,
                users = store.user_count(),
                events = store.event_count(),
                "Serving from snapshot"
            );
            return Ok(Self::from_store(store));
        }

        let pool = crate::db::create_pool(&config.database_url).await?;
        tracing::info!("Connected to PostgreSQL");
        Ok(Self::from_store(PgStore::new(pool)))
    }
}
