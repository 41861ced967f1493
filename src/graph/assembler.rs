//! Weighted directed graph over event and person nodes

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

use super::content::content_edges;
use super::proximity::time_edges;
use super::ranker::Personalization;
use super::social::social_edges;
use super::temporal::{classify, PERSON_RING};
use crate::config::RankingConfig;
use crate::models::{EdgeKind, EventCandidate, FriendRef, NodeKind};

pub type NodeIndex = usize;

pub fn event_node_id(event_id: &str) -> String {
    format!("event:{}", event_id)
}

pub fn person_node_id(person_id: &str) -> String {
    format!("person:{}", person_id)
}

/// Node attributes, fixed by the first insertion
#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    pub id: String,
    pub kind: NodeKind,
    pub label: String,
    pub ring: i32,
    pub topic: Option<String>,
    pub starts_at: Option<String>,
    /// Friends of the ego attending (events only)
    pub social_count: usize,
}

impl GraphNode {
    pub fn event(candidate: &EventCandidate, now: DateTime<Utc>) -> Self {
        Self {
            id: event_node_id(&candidate.id),
            kind: NodeKind::Event,
            label: candidate.name.clone(),
            ring: classify(candidate.starts_at, now).as_i32(),
            topic: candidate.topic(),
            starts_at: candidate.starts_at.map(|s| s.to_rfc3339()),
            social_count: candidate.friend_count,
        }
    }

    pub fn person(person: &FriendRef) -> Self {
        Self {
            id: person_node_id(&person.id),
            kind: NodeKind::Person,
            label: person.label.clone(),
            ring: PERSON_RING,
            topic: None,
            starts_at: None,
            social_count: 0,
        }
    }

    pub fn is_event(&self) -> bool {
        self.kind == NodeKind::Event
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraphEdge {
    pub source: NodeIndex,
    pub target: NodeIndex,
    pub kind: EdgeKind,
    pub weight: f64,
}

/// Arena of nodes with per-node outgoing adjacency lists.
///
/// At most one edge exists per (source, target, kind); adding the same
/// triple again accumulates its weight.
#[derive(Debug, Default)]
pub struct EventGraph {
    nodes: Vec<GraphNode>,
    index: HashMap<String, NodeIndex>,
    edges: Vec<GraphEdge>,
    edge_index: HashMap<(NodeIndex, NodeIndex, EdgeKind), usize>,
    outgoing: Vec<Vec<usize>>,
}

impl EventGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `node` unless its id already exists; returns the node's index
    pub fn add_node(&mut self, node: GraphNode) -> NodeIndex {
        if let Some(&existing) = self.index.get(&node.id) {
            return existing;
        }
        let idx = self.nodes.len();
        self.index.insert(node.id.clone(), idx);
        self.nodes.push(node);
        self.outgoing.push(Vec::new());
        idx
    }

    pub fn add_edge(&mut self, source: NodeIndex, target: NodeIndex, kind: EdgeKind, weight: f64) {
        if let Some(&existing) = self.edge_index.get(&(source, target, kind)) {
            self.edges[existing].weight += weight;
            return;
        }
        let edge_idx = self.edges.len();
        self.edges.push(GraphEdge {
            source,
            target,
            kind,
            weight,
        });
        self.edge_index.insert((source, target, kind), edge_idx);
        self.outgoing[source].push(edge_idx);
    }

    pub fn node_index(&self, id: &str) -> Option<NodeIndex> {
        self.index.get(id).copied()
    }

    pub fn node(&self, idx: NodeIndex) -> &GraphNode {
        &self.nodes[idx]
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    pub fn outgoing(&self, idx: NodeIndex) -> impl Iterator<Item = &GraphEdge> {
        self.outgoing[idx].iter().map(move |&e| &self.edges[e])
    }

    /// Sum of outgoing edge weights; zero for dangling nodes
    pub fn out_weight(&self, idx: NodeIndex) -> f64 {
        self.outgoing(idx).map(|e| e.weight).sum()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn count_edges(&self, kind: EdgeKind) -> usize {
        self.edges.iter().filter(|e| e.kind == kind).count()
    }
}

/// Graph ready for ranking
#[derive(Debug)]
pub struct AssembledGraph {
    pub graph: EventGraph,
    pub personalization: Personalization,
    /// Event nodes in candidate order
    pub event_nodes: Vec<NodeIndex>,
}

/// Composes content, time and social edges into one graph
pub struct GraphAssembler<'a> {
    config: &'a RankingConfig,
    now: DateTime<Utc>,
}

impl<'a> GraphAssembler<'a> {
    pub fn new(config: &'a RankingConfig, now: DateTime<Utc>) -> Self {
        Self { config, now }
    }

    pub fn assemble(
        &self,
        ego: &FriendRef,
        events: &[EventCandidate],
        friends: &[FriendRef],
    ) -> AssembledGraph {
        let mut graph = EventGraph::new();

        // Duplicate event ids keep their first occurrence
        let mut seen = HashSet::new();
        let events: Vec<&EventCandidate> = events
            .iter()
            .filter(|event| seen.insert(event.id.as_str()))
            .collect();

        let event_nodes: Vec<NodeIndex> = events
            .iter()
            .map(|event| graph.add_node(GraphNode::event(event, self.now)))
            .collect();

        let texts: Vec<String> = events.iter().map(|event| event.text()).collect();
        for pair in content_edges(&texts, self.config.w_content, self.config.cosine_min) {
            graph.add_edge(
                event_nodes[pair.from],
                event_nodes[pair.to],
                EdgeKind::Content,
                pair.weight,
            );
        }

        let starts: Vec<_> = events.iter().map(|event| event.starts_at).collect();
        for pair in time_edges(&starts, self.now, self.config.w_time, self.config.time_min) {
            graph.add_edge(
                event_nodes[pair.from],
                event_nodes[pair.to],
                EdgeKind::Time,
                pair.weight,
            );
        }

        let ego_node = graph.add_node(GraphNode::person(ego));
        let counts: Vec<usize> = events.iter().map(|event| event.friend_count).collect();
        for edge in social_edges(&counts, self.config.social_cap, self.config.w_social) {
            graph.add_edge(ego_node, event_nodes[edge.event], EdgeKind::Social, edge.weight);
        }

        let mut personalization = Personalization::new();
        personalization.insert(person_node_id(&ego.id), self.config.ego_weight);
        for friend in friends {
            graph.add_node(GraphNode::person(friend));
            personalization.insert(person_node_id(&friend.id), self.config.friend_weight);
        }

        AssembledGraph {
            graph,
            personalization,
            event_nodes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()
    }

    fn person(id: &str) -> FriendRef {
        FriendRef {
            id: id.to_string(),
            label: format!("user {}", id),
        }
    }

    #[test]
    fn test_add_node_first_write_wins() {
        let mut graph = EventGraph::new();
        let a = graph.add_node(GraphNode::person(&person("1")));
        let b = graph.add_node(GraphNode::person(&FriendRef {
            id: "1".to_string(),
            label: "renamed".to_string(),
        }));
        assert_eq!(a, b);
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.node(a).label, "user 1");
    }

    #[test]
    fn test_parallel_edges_of_different_kinds() {
        let mut graph = EventGraph::new();
        let a = graph.add_node(GraphNode::event(&EventCandidate::new("a", "A"), now()));
        let b = graph.add_node(GraphNode::event(&EventCandidate::new("b", "B"), now()));
        graph.add_edge(a, b, EdgeKind::Content, 0.4);
        graph.add_edge(a, b, EdgeKind::Time, 0.5);
        graph.add_edge(a, b, EdgeKind::Time, 0.1);

        assert_eq!(graph.edge_count(), 2);
        assert!((graph.out_weight(a) - 1.0).abs() < 1e-12);
        assert_eq!(graph.out_weight(b), 0.0);
    }

    #[test]
    fn test_assemble_zero_events() {
        let config = RankingConfig::default();
        let assembled = GraphAssembler::new(&config, now()).assemble(&person("ego"), &[], &[]);
        assert!(assembled.event_nodes.is_empty());
        assert_eq!(assembled.graph.node_count(), 1);
        assert_eq!(assembled.graph.edge_count(), 0);
    }

    #[test]
    fn test_assemble_builds_all_edge_kinds() {
        let config = RankingConfig::default();
        let now = now();
        let events = vec![
            EventCandidate::new("1", "Rust workshop")
                .with_category("Workshops")
                .with_start(now + Duration::hours(2))
                .with_friends(2),
            EventCandidate::new("2", "Rust meetup")
                .with_category("Tech")
                .with_start(now + Duration::hours(3)),
            EventCandidate::new("3", "Jazz night"),
        ];
        let friends = vec![person("f1"), person("f2")];
        let assembled = GraphAssembler::new(&config, now).assemble(&person("ego"), &events, &friends);
        let graph = &assembled.graph;

        assert_eq!(graph.node_count(), 6);
        assert_eq!(graph.count_edges(EdgeKind::Content), 2);
        assert_eq!(graph.count_edges(EdgeKind::Time), 2);
        assert_eq!(graph.count_edges(EdgeKind::Social), 1);

        let ego = graph.node_index("person:ego").unwrap();
        let social: Vec<_> = graph.outgoing(ego).collect();
        assert_eq!(social.len(), 1);
        assert_eq!(graph.node(social[0].target).id, "event:1");
        assert_eq!(social[0].weight, 4.0);

        let friend = graph.node_index("person:f1").unwrap();
        assert_eq!(graph.node(friend).ring, -1);
        assert_eq!(graph.node(friend).label, "user f1");
    }

    #[test]
    fn test_assemble_deduplicates_event_ids() {
        let config = RankingConfig::default();
        let events = vec![
            EventCandidate::new("1", "First"),
            EventCandidate::new("1", "Second"),
        ];
        let assembled = GraphAssembler::new(&config, now()).assemble(&person("ego"), &events, &[]);
        assert_eq!(assembled.event_nodes.len(), 1);
        let node = assembled.graph.node(assembled.event_nodes[0]);
        assert_eq!(node.label, "First");
    }

    #[test]
    fn test_event_node_attributes() {
        let now = now();
        let candidate = EventCandidate::new("7", "Poster session")
            .with_start(now + Duration::days(3))
            .with_friends(1);
        let node = GraphNode::event(&candidate, now);
        assert_eq!(node.id, "event:7");
        assert_eq!(node.ring, 1);
        assert_eq!(node.topic.as_deref(), Some("Other"));
        assert_eq!(node.starts_at.as_deref(), Some("2025-03-13T12:00:00+00:00"));
        assert_eq!(node.social_count, 1);
    }
}
