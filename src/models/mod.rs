use serde::{ser::SerializeMap, Deserialize, Serialize, Serializer};
use std::fmt::Display;

pub mod event;
pub mod user;

pub use event::{CatalogEvent, EventCandidate, DEFAULT_TOPIC};
pub use user::{FriendRef, FriendshipStatus, User, VisibilityMode};

/// Kind of node in the recommendation graph
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Event,
    Person,
}

/// Relation carried by a graph edge
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    /// Textual similarity between two events
    Content,
    /// Start times close to each other
    Time,
    /// Friends of the ego attend the target event
    Social,
}

impl Display for EdgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EdgeKind::Content => write!(f, "content"),
            EdgeKind::Time => write!(f, "time"),
            EdgeKind::Social => write!(f, "social"),
        }
    }
}

// ============================================================================
// Ranking response types
// ============================================================================

/// A node of the trimmed graph with its ranking score
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RankedNode {
    /// `event:<id>` or `person:<id>`
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub label: String,
    /// Recency bucket for events, -1 for people
    pub ring: i32,
    pub topic: Option<String>,
    /// Start time in RFC 3339 (UTC), when known
    pub starts_at: Option<String>,
    pub score: f64,
    /// Friends of the ego attending (events only)
    pub social_count: usize,
}

/// A directed, weighted edge of the trimmed graph
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EdgeView {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub kind: EdgeKind,
    pub weight: f64,
}

/// Human-readable reasons an event was recommended
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct Explanation {
    pub reasons: Vec<String>,
}

/// String-keyed map that serializes its entries in insertion order
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<V>(Vec<(String, V)>);

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<V> OrderedMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry; keys are expected to be unique
    pub fn push(&mut self, key: impl Into<String>, value: V) {
        self.0.push((key.into(), value));
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<V> FromIterator<(String, V)> for OrderedMap<V> {
    fn from_iter<I: IntoIterator<Item = (String, V)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Result of one personalized ranking run
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GraphResponse {
    /// Every person node plus the kept top-K event nodes
    pub nodes: Vec<RankedNode>,
    /// Edges touching at least one kept event
    pub edges: Vec<EdgeView>,
    /// Scores of the kept events, best first
    pub scores: OrderedMap<f64>,
    /// Reasons for every candidate event, in input order
    pub explanations: OrderedMap<Explanation>,
}

impl GraphResponse {
    /// Event nodes of the response in ranked order
    pub fn ranked_event_ids(&self) -> Vec<&str> {
        self.scores.keys().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_kind_serialization() {
        assert_eq!(serde_json::to_string(&EdgeKind::Content).unwrap(), "\"content\"");
        assert_eq!(serde_json::to_string(&EdgeKind::Social).unwrap(), "\"social\"");
        assert_eq!(EdgeKind::Time.to_string(), "time");
    }

    #[test]
    fn test_ordered_map_keeps_insertion_order() {
        let mut map = OrderedMap::new();
        map.push("event:b", 0.7);
        map.push("event:a", 0.2);
        map.push("event:c", 0.1);

        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"event:b":0.7,"event:a":0.2,"event:c":0.1}"#);
        assert_eq!(map.get("event:a"), Some(&0.2));
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn test_ranked_node_field_names() {
        let node = RankedNode {
            id: "person:1".to_string(),
            kind: NodeKind::Person,
            label: "ada".to_string(),
            ring: -1,
            topic: None,
            starts_at: None,
            score: 0.5,
            social_count: 0,
        };
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(value["type"], "person");
        assert_eq!(value["ring"], -1);
        assert!(value["topic"].is_null());
    }
}
