/// In-memory store loaded from a JSON snapshot
///
/// Mirrors the relational layout (users, friendships, events, attendance)
/// so demos and integration tests run without a database.
use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{
    error::AppResult,
    graph::temporal,
    models::{CatalogEvent, FriendRef, FriendshipStatus, User, VisibilityMode},
    services::providers::{EventCatalog, UserDirectory},
};

#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotUser {
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub visibility_mode: VisibilityMode,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotFriendship {
    pub user_id: String,
    pub friend_id: String,
    #[serde(default)]
    pub status: FriendshipStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotEvent {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "temporal::deserialize_lenient")]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "temporal::deserialize_lenient")]
    pub ends_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotAttendance {
    pub user_id: String,
    pub event_id: String,
}

/// On-disk snapshot layout
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub users: Vec<SnapshotUser>,
    #[serde(default)]
    pub friendships: Vec<SnapshotFriendship>,
    #[serde(default)]
    pub events: Vec<SnapshotEvent>,
    #[serde(default)]
    pub attendance: Vec<SnapshotAttendance>,
}

#[derive(Debug, Clone)]
pub struct SnapshotStore {
    users: HashMap<String, SnapshotUser>,
    friends: HashMap<String, Vec<String>>,
    events: Vec<SnapshotEvent>,
    attendees: HashMap<String, Vec<String>>,
}

impl SnapshotUser {
    fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            username: self.username.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
        }
    }
}

impl SnapshotStore {
    pub fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
        Self::from_json_str(&raw)
            .with_context(|| format!("Failed to parse snapshot {}", path.display()))
    }

    pub fn from_json_str(raw: &str) -> anyhow::Result<Self> {
        let snapshot: Snapshot = serde_json::from_str(raw)?;
        Ok(Self::from_snapshot(snapshot))
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let users: HashMap<String, SnapshotUser> = snapshot
            .users
            .into_iter()
            .map(|user| (user.id.clone(), user))
            .collect();

        let mut friends: HashMap<String, Vec<String>> = HashMap::new();
        for link in snapshot
            .friendships
            .iter()
            .filter(|f| f.status == FriendshipStatus::Accepted && f.user_id != f.friend_id)
        {
            friends.entry(link.user_id.clone()).or_default().push(link.friend_id.clone());
            friends.entry(link.friend_id.clone()).or_default().push(link.user_id.clone());
        }
        for ids in friends.values_mut() {
            ids.sort();
            ids.dedup();
        }

        let mut attendees: HashMap<String, Vec<String>> = HashMap::new();
        for row in snapshot.attendance {
            let ids = attendees.entry(row.event_id).or_default();
            if !ids.contains(&row.user_id) {
                ids.push(row.user_id);
            }
        }

        let mut events = snapshot.events;
        // Unknown starts last, then by id
        events.sort_by(|a, b| match (a.starts_at, b.starts_at) {
            (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.id.cmp(&b.id)),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.id.cmp(&b.id),
        });

        Self {
            users,
            friends,
            events,
            attendees,
        }
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    fn friend_ids(&self, user_id: &str) -> &[String] {
        self.friends.get(user_id).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[async_trait::async_trait]
impl UserDirectory for SnapshotStore {
    async fn get_user(&self, user_id: &str) -> AppResult<Option<User>> {
        Ok(self.users.get(user_id).map(SnapshotUser::to_user))
    }

    async fn list_friends(&self, user_id: &str) -> AppResult<Vec<User>> {
        Ok(self
            .friend_ids(user_id)
            .iter()
            .filter_map(|id| self.users.get(id))
            .map(SnapshotUser::to_user)
            .collect())
    }
}

#[async_trait::async_trait]
impl EventCatalog for SnapshotStore {
    async fn list_events_for_viewer(&self, viewer_id: &str) -> AppResult<Vec<CatalogEvent>> {
        let friends: HashSet<&str> = self.friend_ids(viewer_id).iter().map(String::as_str).collect();

        let events = self
            .events
            .iter()
            .map(|event| {
                let attending = self
                    .attendees
                    .get(&event.id)
                    .map(Vec::as_slice)
                    .unwrap_or(&[]);

                let mut friends_attending: Vec<FriendRef> = attending
                    .iter()
                    .filter(|id| friends.contains(id.as_str()))
                    .filter_map(|id| self.users.get(id))
                    .filter(|user| user.visibility_mode.visible_to_friends())
                    .map(|user| FriendRef::from(&user.to_user()))
                    .collect();
                friends_attending.sort_by(|a, b| a.id.cmp(&b.id));

                CatalogEvent {
                    id: event.id.clone(),
                    name: event.name.clone(),
                    description: event.description.clone(),
                    category: event.category.clone(),
                    starts_at: event.starts_at,
                    ends_at: event.ends_at,
                    friends_attending,
                    attendee_count: attending.len() as i64,
                }
            })
            .collect();

        Ok(events)
    }
}
