//! Reasons per event and top-K trimming of the ranked graph

use std::collections::HashSet;

use super::assembler::{EventGraph, GraphNode, NodeIndex};
use super::temporal::Ring;
use crate::models::{EdgeView, Explanation, OrderedMap, RankedNode};

/// Reasons for an event node, in a fixed order. People get none.
pub fn explain(node: &GraphNode) -> Vec<String> {
    let mut reasons = Vec::new();
    if !node.is_event() {
        return reasons;
    }

    if node.social_count > 0 {
        reasons.push(format!("{} friends interested/going", node.social_count));
    }

    if node.ring == Ring::Today.as_i32() {
        reasons.push("happening today".to_string());
    } else if node.ring == Ring::ThisWeek.as_i32() {
        reasons.push("coming this week".to_string());
    }

    if let Some(topic) = node.topic.as_deref().filter(|t| !t.is_empty()) {
        reasons.push(format!("matches topic: {}", topic));
    }

    reasons
}

/// Explanations for every event, keyed by node id in candidate order
pub fn explain_events(graph: &EventGraph, event_nodes: &[NodeIndex]) -> OrderedMap<Explanation> {
    event_nodes
        .iter()
        .map(|&idx| {
            let node = graph.node(idx);
            (node.id.clone(), Explanation { reasons: explain(node) })
        })
        .collect()
}

/// Graph restricted to the best events
#[derive(Debug, Clone, PartialEq)]
pub struct TrimmedGraph {
    pub nodes: Vec<RankedNode>,
    pub edges: Vec<EdgeView>,
    pub scores: OrderedMap<f64>,
}

/// Keeps the `top_k` highest-scored events.
///
/// Ties keep candidate order. Every person node survives; an edge survives
/// when either end is a kept event.
pub fn trim_top_k(
    graph: &EventGraph,
    event_nodes: &[NodeIndex],
    scores: &[f64],
    top_k: usize,
) -> TrimmedGraph {
    let score_of = |idx: NodeIndex| scores.get(idx).copied().unwrap_or(0.0);

    let mut ranked: Vec<NodeIndex> = event_nodes.to_vec();
    ranked.sort_by(|&a, &b| score_of(b).total_cmp(&score_of(a)));
    ranked.truncate(top_k);

    let kept: HashSet<NodeIndex> = ranked.iter().copied().collect();

    let nodes = graph
        .nodes()
        .iter()
        .enumerate()
        .filter(|(idx, node)| !node.is_event() || kept.contains(idx))
        .map(|(idx, node)| RankedNode {
            id: node.id.clone(),
            kind: node.kind,
            label: node.label.clone(),
            ring: node.ring,
            topic: node.topic.clone(),
            starts_at: node.starts_at.clone(),
            score: score_of(idx),
            social_count: node.social_count,
        })
        .collect();

    let edges = graph
        .edges()
        .iter()
        .filter(|edge| kept.contains(&edge.source) || kept.contains(&edge.target))
        .map(|edge| EdgeView {
            source: graph.node(edge.source).id.clone(),
            target: graph.node(edge.target).id.clone(),
            kind: edge.kind,
            weight: edge.weight,
        })
        .collect();

    let scores = ranked
        .iter()
        .map(|&idx| (graph.node(idx).id.clone(), score_of(idx)))
        .collect();

    TrimmedGraph {
        nodes,
        edges,
        scores,
    }
}
