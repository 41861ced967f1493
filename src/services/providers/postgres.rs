/// PostgreSQL-backed user directory and event catalog
///
/// Friendships are stored once per pair with `user_id < friend_id`, so
/// every friend lookup unions both directions.
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::{
    error::AppResult,
    models::{CatalogEvent, FriendRef, User},
    services::providers::{EventCatalog, UserDirectory},
};

const FRIEND_IDS: &str = r#"
    SELECT friend_id AS other FROM friendships WHERE user_id = $1 AND status = 'accepted'
    UNION ALL
    SELECT user_id AS other FROM friendships WHERE friend_id = $1 AND status = 'accepted'
"#;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct EventRow {
    id: String,
    name: String,
    description: Option<String>,
    category: Option<String>,
    starts_at: Option<DateTime<Utc>>,
    ends_at: Option<DateTime<Utc>>,
    attendee_count: i64,
}

#[derive(sqlx::FromRow)]
struct AttendingFriendRow {
    event_id: String,
    id: String,
    username: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
}

impl AttendingFriendRow {
    fn into_parts(self) -> (String, User) {
        (
            self.event_id,
            User {
                id: self.id,
                username: self.username,
                first_name: self.first_name,
                last_name: self.last_name,
            },
        )
    }
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Visible friends of `viewer_id` attending each event, keyed by event id
    async fn friends_attending(&self, viewer_id: &str) -> AppResult<HashMap<String, Vec<FriendRef>>> {
        let sql = format!(
            r#"
            SELECT a.event_id, u.id, u.username, u.first_name, u.last_name
            FROM event_attendance a
            INNER JOIN users u ON u.id = a.user_id
            INNER JOIN ({}) f ON f.other = u.id
            WHERE u.visibility_mode IN ('friends', 'all')
            ORDER BY a.event_id, u.id
            "#,
            FRIEND_IDS
        );

        let rows = sqlx::query_as::<_, AttendingFriendRow>(&sql)
            .bind(viewer_id)
            .fetch_all(&self.pool)
            .await?;

        let mut by_event: HashMap<String, Vec<FriendRef>> = HashMap::new();
        for row in rows {
            let (event_id, user) = row.into_parts();
            by_event.entry(event_id).or_default().push(FriendRef::from(&user));
        }
        Ok(by_event)
    }
}

#[async_trait::async_trait]
impl UserDirectory for PgStore {
    async fn get_user(&self, user_id: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, first_name, last_name FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn list_friends(&self, user_id: &str) -> AppResult<Vec<User>> {
        let sql = format!(
            r#"
            SELECT u.id, u.username, u.first_name, u.last_name
            FROM users u
            INNER JOIN ({}) f ON f.other = u.id
            ORDER BY u.id
            "#,
            FRIEND_IDS
        );

        let friends = sqlx::query_as::<_, User>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!(user_id = %user_id, friends = friends.len(), "Friends loaded");
        Ok(friends)
    }
}

#[async_trait::async_trait]
impl EventCatalog for PgStore {
    async fn list_events_for_viewer(&self, viewer_id: &str) -> AppResult<Vec<CatalogEvent>> {
        let rows = sqlx::query_as::<_, EventRow>(
            r#"
            SELECT e.id, e.name, e.description, e.category, e.starts_at, e.ends_at,
                   (SELECT COUNT(*) FROM event_attendance a WHERE a.event_id = e.id) AS attendee_count
            FROM events e
            ORDER BY e.starts_at ASC NULLS LAST, e.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut attending = self.friends_attending(viewer_id).await?;

        let events: Vec<CatalogEvent> = rows
            .into_iter()
            .map(|row| CatalogEvent {
                friends_attending: attending.remove(&row.id).unwrap_or_default(),
                id: row.id,
                name: row.name,
                description: row.description,
                category: row.category,
                starts_at: row.starts_at,
                ends_at: row.ends_at,
                attendee_count: row.attendee_count,
            })
            .collect();

        tracing::debug!(
            viewer_id = %viewer_id,
            events = events.len(),
            "Catalog loaded"
        );

        Ok(events)
    }
}
