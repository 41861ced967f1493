//! Ego → event edges from friend attendance

/// One outbound social edge from the ego
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SocialEdge {
    /// Position of the event in the candidate list
    pub event: usize,
    /// Friend count after capping
    pub capped_count: usize,
    pub weight: f64,
}

/// Builds one edge per event with at least one attending friend.
///
/// The count is capped at `cap` so a single popular event cannot absorb
/// the whole walk.
pub fn social_edges(friend_counts: &[usize], cap: usize, weight: f64) -> Vec<SocialEdge> {
    friend_counts
        .iter()
        .enumerate()
        .filter_map(|(event, &count)| {
            let capped_count = count.min(cap);
            (capped_count > 0).then(|| SocialEdge {
                event,
                capped_count,
                weight: weight * capped_count as f64,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_edge_without_friends() {
        assert!(social_edges(&[0, 0], 5, 2.0).is_empty());
    }

    #[test]
    fn test_count_is_capped() {
        let edges = social_edges(&[9], 5, 2.0);
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].capped_count, 5);
        assert_eq!(edges[0].weight, 10.0);
    }

    #[test]
    fn test_edges_keep_event_positions() {
        let edges = social_edges(&[0, 3, 0, 1], 5, 2.0);
        let positions: Vec<usize> = edges.iter().map(|e| e.event).collect();
        assert_eq!(positions, vec![1, 3]);
        assert_eq!(edges[0].weight, 6.0);
    }

    #[test]
    fn test_zero_cap_disables_social_edges() {
        assert!(social_edges(&[4, 2], 0, 2.0).is_empty());
    }
}
