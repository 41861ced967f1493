use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Semaphore;

use crate::{
    config::RankingConfig,
    error::{AppError, AppResult},
    graph,
    models::{EventCandidate, FriendRef, GraphResponse},
    services::providers::{EventCatalog, UserDirectory},
};

/// Generates the personalized event graph for a user
///
/// Loads the user, their friends and the viewer-annotated catalog, drops
/// events that already ended and ranks the rest on the blocking pool.
/// Ranking is CPU-bound, so the number of concurrent runs is bounded by
/// a semaphore.
pub struct RecommendationService {
    users: Arc<dyn UserDirectory>,
    catalog: Arc<dyn EventCatalog>,
    config: RankingConfig,
    permits: Arc<Semaphore>,
    timeout: Option<Duration>,
}

impl RecommendationService {
    pub fn new(
        users: Arc<dyn UserDirectory>,
        catalog: Arc<dyn EventCatalog>,
        config: RankingConfig,
    ) -> Self {
        Self {
            users,
            catalog,
            config,
            permits: Arc::new(Semaphore::new(4)),
            timeout: None,
        }
    }

    /// Caps concurrent ranking runs, at least one
    pub fn with_concurrency(mut self, max_concurrent: usize) -> Self {
        self.permits = Arc::new(Semaphore::new(max_concurrent.max(1)));
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Recommends events for `user_id` as of now
    pub async fn recommend(&self, user_id: &str, debug: bool) -> AppResult<GraphResponse> {
        let work = self.recommend_at(user_id, debug, Utc::now());
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, work)
                .await
                .map_err(|_| AppError::Timeout(limit.as_millis() as u64))?,
            None => work.await,
        }
    }

    /// Recommends events for `user_id` with an explicit clock
    pub async fn recommend_at(
        &self,
        user_id: &str,
        debug: bool,
        now: DateTime<Utc>,
    ) -> AppResult<GraphResponse> {
        let user = self
            .users
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let catalog = self.catalog.list_events_for_viewer(user_id).await?;
        let total = catalog.len();
        let events: Vec<EventCandidate> = catalog
            .iter()
            .filter(|event| !event.has_ended(now))
            .map(|event| event.to_candidate())
            .collect();

        tracing::debug!(
            user_id = %user_id,
            total,
            upcoming = events.len(),
            "Filtered ended events"
        );

        if events.is_empty() {
            return Err(AppError::NoContent("No upcoming events found".to_string()));
        }

        let friends: Vec<FriendRef> = self
            .users
            .list_friends(user_id)
            .await?
            .iter()
            .map(FriendRef::from)
            .collect();

        let ego = FriendRef::from(&user);
        let config = RankingConfig {
            debug: self.config.debug || debug,
            ..self.config.clone()
        };

        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| AppError::Internal(format!("Ranking pool closed: {}", e)))?;

        // The permit rides along with the blocking task so a caller that
        // times out does not free the slot while ranking is still running
        let response = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            graph::build_graph_and_rank(&ego, &events, &friends, &config, now)
        })
        .await
        .map_err(|e| AppError::Internal(format!("Ranking task failed: {}", e)))?;

        tracing::info!(
            user_id = %user_id,
            ranked = response.scores.len(),
            nodes = response.nodes.len(),
            edges = response.edges.len(),
            "Recommendations generated"
        );

        Ok(response)
    }
}
