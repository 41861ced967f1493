//! Event recommendation graph
//!
//! Builds a weighted directed graph over events and people from three
//! signals (text similarity, start-time proximity, friends attending) and
//! ranks events with a personalized random walk seeded at the ego.

/// Logs a pipeline stage at info when the run is in debug mode, debug otherwise
macro_rules! stage {
    ($debug:expr, $($arg:tt)+) => {
        if $debug {
            tracing::info!(target: "graph", $($arg)+);
        } else {
            tracing::debug!(target: "graph", $($arg)+);
        }
    };
}

pub mod assembler;
pub mod content;
pub mod explain;
pub mod proximity;
pub mod ranker;
pub mod social;
pub mod stopwords;
pub mod temporal;

pub use assembler::{AssembledGraph, EventGraph, GraphAssembler, GraphEdge, GraphNode};
pub use ranker::{PersonalizedRanker, Personalization, RankRun, RankerConfig};
pub use temporal::Ring;

use chrono::{DateTime, Utc};

use crate::config::RankingConfig;
use crate::models::{EdgeKind, EventCandidate, FriendRef, GraphResponse};

/// Directed, weighted pair of positions in the candidate list
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedPair {
    pub from: usize,
    pub to: usize,
    pub weight: f64,
}

/// Builds the graph, ranks it and trims it to the best `top_k` events.
///
/// Pure function of its inputs: `now` fixes every time-relative decision.
/// Zero events yield an empty event set rather than an error.
pub fn build_graph_and_rank(
    ego: &FriendRef,
    events: &[EventCandidate],
    friends: &[FriendRef],
    config: &RankingConfig,
    now: DateTime<Utc>,
) -> GraphResponse {
    let debug = config.debug;
    stage!(debug, events = events.len(), friends = friends.len(), "Building recommendation graph");

    let AssembledGraph {
        graph,
        personalization,
        event_nodes,
    } = GraphAssembler::new(config, now).assemble(ego, events, friends);

    stage!(
        debug,
        nodes = graph.node_count(),
        content_edges = graph.count_edges(EdgeKind::Content),
        time_edges = graph.count_edges(EdgeKind::Time),
        social_edges = graph.count_edges(EdgeKind::Social),
        "Graph assembled"
    );

    let run = PersonalizedRanker::new(RankerConfig::from(config)).rank(&graph, &personalization);
    stage!(
        debug,
        iterations = run.iterations,
        residual = run.residual,
        converged = run.converged,
        "Personalized ranking finished"
    );

    let explanations = explain::explain_events(&graph, &event_nodes);
    let trimmed = explain::trim_top_k(&graph, &event_nodes, &run.scores, config.top_k);

    stage!(
        debug,
        top_events = trimmed.scores.len(),
        total_nodes = trimmed.nodes.len(),
        edges = trimmed.edges.len(),
        "Graph trimmed"
    );

    GraphResponse {
        nodes: trimmed.nodes,
        edges: trimmed.edges,
        scores: trimmed.scores,
        explanations,
    }
}
