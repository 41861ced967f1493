//! Gaussian time-proximity edges between events

use chrono::{DateTime, Utc};

use super::temporal::epoch_seconds;
use super::WeightedPair;

const MIN_SIGMA_SECS: f64 = 2.0 * 3600.0;
const DEFAULT_HORIZON_SECS: f64 = 24.0 * 3600.0;
const HORIZON_DIVISOR: f64 = 30.0;

/// Kernel bandwidth in seconds.
///
/// Scales with how far ahead the latest upcoming event starts, never
/// below two hours.
pub fn bandwidth(starts: &[Option<DateTime<Utc>>], now: DateTime<Utc>) -> f64 {
    let now_secs = epoch_seconds(now);
    let horizon = starts
        .iter()
        .flatten()
        .map(|&start| epoch_seconds(start))
        .filter(|&start| start > now_secs)
        .fold(None, |latest: Option<f64>, start| {
            Some(latest.map_or(start, |l| l.max(start)))
        })
        .map_or(DEFAULT_HORIZON_SECS, |latest| latest - now_secs);

    (horizon / HORIZON_DIVISOR).max(MIN_SIGMA_SECS)
}

/// exp(-dt² / 2σ²) for two start times given in epoch seconds
pub fn proximity(a: f64, b: f64, sigma: f64) -> f64 {
    let dt = (a - b).abs();
    (-(dt * dt) / (2.0 * sigma * sigma)).exp()
}

/// Directed time edges between every ordered pair of events with known
/// start times whose proximity exceeds `min_proximity`
pub fn time_edges(
    starts: &[Option<DateTime<Utc>>],
    now: DateTime<Utc>,
    weight: f64,
    min_proximity: f64,
) -> Vec<WeightedPair> {
    let sigma = bandwidth(starts, now);
    let seconds: Vec<Option<f64>> = starts.iter().map(|s| s.map(epoch_seconds)).collect();

    let mut edges = Vec::new();
    for (i, ti) in seconds.iter().enumerate() {
        let Some(ti) = *ti else { continue };
        for (j, tj) in seconds.iter().enumerate() {
            if i == j {
                continue;
            }
            let Some(tj) = *tj else { continue };
            let p = proximity(ti, tj, sigma);
            if p > min_proximity {
                edges.push(WeightedPair {
                    from: i,
                    to: j,
                    weight: weight * p,
                });
            }
        }
    }
    edges
}
