//! Personalized PageRank by power iteration over an [`EventGraph`]

use std::collections::BTreeMap;

use super::assembler::EventGraph;
use crate::config::RankingConfig;

/// Ranker configuration
#[derive(Debug, Clone)]
pub struct RankerConfig {
    /// Probability of following an outgoing edge; the walk teleports otherwise
    pub alpha: f64,

    /// Maximum iterations
    pub max_iterations: usize,

    /// Per-node convergence tolerance
    pub tolerance: f64,
}

impl Default for RankerConfig {
    fn default() -> Self {
        Self {
            alpha: 0.15,
            max_iterations: 100,
            tolerance: 1e-6,
        }
    }
}

impl From<&RankingConfig> for RankerConfig {
    fn from(config: &RankingConfig) -> Self {
        Self {
            alpha: config.alpha,
            max_iterations: config.max_iterations,
            tolerance: config.tolerance,
        }
    }
}

/// Teleport weights keyed by node id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Personalization {
    weights: BTreeMap<String, f64>,
}

impl Personalization {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a weight unless the node already has one
    pub fn insert(&mut self, node_id: impl Into<String>, weight: f64) {
        self.weights.entry(node_id.into()).or_insert(weight);
    }

    /// Teleport distribution over the graph's nodes, `None` when no node of
    /// the graph carries positive weight
    fn teleport_vector(&self, graph: &EventGraph) -> Option<Vec<f64>> {
        let mut teleport = vec![0.0; graph.node_count()];
        for (id, weight) in &self.weights {
            if let Some(idx) = graph.node_index(id) {
                teleport[idx] = weight.max(0.0);
            }
        }
        let total: f64 = teleport.iter().sum();
        if total <= 0.0 {
            return None;
        }
        teleport.iter_mut().for_each(|w| *w /= total);
        Some(teleport)
    }
}

/// Outcome of one ranking run
#[derive(Debug, Clone, PartialEq)]
pub struct RankRun {
    /// Score per node index; sums to 1 unless nothing was personalized
    pub scores: Vec<f64>,
    pub iterations: usize,
    /// L1 change of the last iteration
    pub residual: f64,
    pub converged: bool,
}

/// Personalized PageRank scorer
pub struct PersonalizedRanker {
    config: RankerConfig,
}

impl PersonalizedRanker {
    /// Create a new ranker
    pub fn new(config: RankerConfig) -> Self {
        Self { config }
    }

    /// Runs the walk until the L1 change drops below `n * tolerance` or the
    /// iteration bound is hit. A run that hits the bound is still returned.
    pub fn rank(&self, graph: &EventGraph, personalization: &Personalization) -> RankRun {
        let n = graph.node_count();
        if n == 0 {
            return RankRun {
                scores: Vec::new(),
                iterations: 0,
                residual: 0.0,
                converged: true,
            };
        }

        let Some(teleport) = personalization.teleport_vector(graph) else {
            return RankRun {
                scores: vec![0.0; n],
                iterations: 0,
                residual: 0.0,
                converged: true,
            };
        };

        let alpha = self.config.alpha;
        let out_weight: Vec<f64> = (0..n).map(|idx| graph.out_weight(idx)).collect();

        let mut scores = vec![1.0 / n as f64; n];
        let mut next = vec![0.0; n];
        let mut iterations = 0;
        let mut residual = f64::INFINITY;
        let mut converged = false;

        for _ in 0..self.config.max_iterations {
            iterations += 1;

            // Dangling nodes hand their mass to the teleport distribution
            let dangling: f64 = (0..n)
                .filter(|&idx| out_weight[idx] <= 0.0)
                .map(|idx| scores[idx])
                .sum();
            let restart = alpha * dangling + (1.0 - alpha);
            for (slot, &p) in next.iter_mut().zip(&teleport) {
                *slot = restart * p;
            }

            for (source, &total) in out_weight.iter().enumerate() {
                if total <= 0.0 {
                    continue;
                }
                let share = alpha * scores[source] / total;
                for edge in graph.outgoing(source) {
                    next[edge.target] += share * edge.weight;
                }
            }

            residual = scores.iter().zip(&next).map(|(old, new)| (old - new).abs()).sum();
            std::mem::swap(&mut scores, &mut next);

            if residual < n as f64 * self.config.tolerance {
                converged = true;
                break;
            }
        }

        if !converged {
            tracing::warn!(
                iterations,
                residual,
                "Personalized ranking did not converge, returning last iterate"
            );
        }

        RankRun {
            scores,
            iterations,
            residual,
            converged,
        }
    }
}
