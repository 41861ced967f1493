use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::FriendRef;

/// Topic assigned to events without a category
pub const DEFAULT_TOPIC: &str = "Other";

/// An event as listed by the event catalog, annotated for one viewer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogEvent {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    /// The viewer's friends attending, already filtered by their visibility mode
    pub friends_attending: Vec<FriendRef>,
    /// Total attendance rows for the event
    pub attendee_count: i64,
}

impl CatalogEvent {
    /// True when the end time is known and not after `now`
    pub fn has_ended(&self, now: DateTime<Utc>) -> bool {
        self.ends_at.is_some_and(|end| end <= now)
    }

    /// Converts the catalog row into a ranking candidate
    pub fn to_candidate(&self) -> EventCandidate {
        EventCandidate {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
            starts_at: self.starts_at,
            ends_at: self.ends_at,
            friend_count: self.friends_attending.len(),
        }
    }
}

/// Input to the ranking engine, immutable for one request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventCandidate {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    /// Number of the ego's friends attending
    pub friend_count: usize,
}

impl EventCandidate {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            category: None,
            starts_at: None,
            ends_at: None,
            friend_count: 0,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_start(mut self, starts_at: DateTime<Utc>) -> Self {
        self.starts_at = Some(starts_at);
        self
    }

    pub fn with_friends(mut self, friend_count: usize) -> Self {
        self.friend_count = friend_count;
        self
    }

    /// Name, description and category joined by single spaces, skipping empty parts
    pub fn text(&self) -> String {
        [
            Some(self.name.as_str()),
            self.description.as_deref(),
            self.category.as_deref(),
        ]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
    }

    /// Trimmed category, "Other" when the category is missing or empty.
    ///
    /// A category made only of whitespace has no topic at all.
    pub fn topic(&self) -> Option<String> {
        match self.category.as_deref() {
            Some(category) if !category.is_empty() => {
                let trimmed = category.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            _ => Some(DEFAULT_TOPIC.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_text_skips_missing_parts() {
        let event = EventCandidate::new("1", "Rust Meetup").with_category("Tech");
        assert_eq!(event.text(), "Rust Meetup Tech");

        let event = EventCandidate::new("2", "Jazz Night")
            .with_description("")
            .with_category("Music");
        assert_eq!(event.text(), "Jazz Night Music");
    }

    #[test]
    fn test_topic_defaults() {
        assert_eq!(EventCandidate::new("1", "a").topic().as_deref(), Some("Other"));
        assert_eq!(
            EventCandidate::new("1", "a").with_category("").topic().as_deref(),
            Some("Other")
        );
        assert_eq!(
            EventCandidate::new("1", "a").with_category("  Music ").topic().as_deref(),
            Some("Music")
        );
        assert_eq!(EventCandidate::new("1", "a").with_category("   ").topic(), None);
    }

    #[test]
    fn test_has_ended() {
        let now = Utc::now();
        let mut event = CatalogEvent {
            id: "1".to_string(),
            name: "Talk".to_string(),
            description: None,
            category: None,
            starts_at: Some(now + Duration::hours(2)),
            ends_at: Some(now - Duration::hours(1)),
            friends_attending: vec![],
            attendee_count: 0,
        };
        assert!(event.has_ended(now));

        event.ends_at = None;
        assert!(!event.has_ended(now));

        event.ends_at = Some(now + Duration::minutes(5));
        assert!(!event.has_ended(now));
    }

    #[test]
    fn test_to_candidate_counts_friends() {
        let event = CatalogEvent {
            id: "9".to_string(),
            name: "Hackathon".to_string(),
            description: Some("48h of code".to_string()),
            category: Some("Workshops".to_string()),
            starts_at: None,
            ends_at: None,
            friends_attending: vec![
                FriendRef { id: "a".into(), label: "a".into() },
                FriendRef { id: "b".into(), label: "b".into() },
            ],
            attendee_count: 12,
        };
        let candidate = event.to_candidate();
        assert_eq!(candidate.friend_count, 2);
        assert_eq!(candidate.id, "9");
    }
}
