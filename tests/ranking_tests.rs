use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};

use event_graph_api::{
    config::RankingConfig,
    error::AppError,
    graph::build_graph_and_rank,
    models::{EdgeKind, EventCandidate, FriendRef, GraphResponse, NodeKind},
    services::{RecommendationService, SnapshotStore},
};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, 9, 30, 0).unwrap()
}

fn person(id: &str) -> FriendRef {
    FriendRef {
        id: id.to_string(),
        label: format!("u{}", id),
    }
}

fn city_events() -> Vec<EventCandidate> {
    let now = now();
    vec![
        EventCandidate::new("1", "Intro to Rust")
            .with_description("A beginner workshop on ownership and borrowing")
            .with_category("Workshops")
            .with_start(now + Duration::hours(5))
            .with_friends(3),
        EventCandidate::new("2", "Advanced Rust async")
            .with_description("Workshop on async runtimes and borrowing across awaits")
            .with_category("Workshops")
            .with_start(now + Duration::hours(8)),
        EventCandidate::new("3", "Jazz quartet")
            .with_description("Live jazz by the river")
            .with_category("Music")
            .with_start(now + Duration::days(3))
            .with_friends(1),
        EventCandidate::new("4", "Farmers market")
            .with_category("Food")
            .with_start(now + Duration::days(12)),
        EventCandidate::new("5", "Mystery meetup"),
        EventCandidate::new("6", "Night jazz session")
            .with_description("Late jazz jam")
            .with_category("Music")
            .with_start(now + Duration::days(3) + Duration::hours(4))
            .with_friends(9),
    ]
}

fn rank(events: &[EventCandidate], config: &RankingConfig) -> GraphResponse {
    build_graph_and_rank(
        &person("ego"),
        events,
        &[person("a"), person("b")],
        config,
        now(),
    )
}

#[test]
fn test_scores_sum_to_one() {
    let response = rank(&city_events(), &RankingConfig::default());
    let total: f64 = response.nodes.iter().map(|n| n.score).sum();
    assert!((total - 1.0).abs() < 1e-6, "total = {}", total);
    assert!(response.nodes.iter().all(|n| n.score >= 0.0));
}

#[test]
fn test_ego_dominates_single_social_edge() {
    let events = vec![EventCandidate::new("1", "Solo gig").with_friends(1)];
    let response = build_graph_and_rank(
        &person("ego"),
        &events,
        &[],
        &RankingConfig::default(),
        now(),
    );

    let score = |id: &str| response.nodes.iter().find(|n| n.id == id).unwrap().score;
    assert!(score("event:1") > 0.0);
    assert!(score("person:ego") > score("event:1"));
    assert!(score("person:ego") > 0.5);
}

#[test]
fn test_identical_inputs_give_identical_outputs() {
    let events = city_events();
    let config = RankingConfig::default();
    let first = rank(&events, &config);
    let second = rank(&events, &config);

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_no_self_edges() {
    let response = rank(&city_events(), &RankingConfig::default());
    assert!(!response.edges.is_empty());
    assert!(response.edges.iter().all(|e| e.source != e.target));
}

#[test]
fn test_edge_thresholds() {
    let config = RankingConfig::default();
    let response = rank(&city_events(), &config);

    for edge in &response.edges {
        match edge.kind {
            EdgeKind::Content => assert!(edge.weight / config.w_content > config.cosine_min),
            EdgeKind::Time => assert!(edge.weight / config.w_time > config.time_min),
            EdgeKind::Social => assert!(edge.source.starts_with("person:")),
        }
    }
    assert!(response.edges.iter().any(|e| e.kind == EdgeKind::Content));
    assert!(response.edges.iter().any(|e| e.kind == EdgeKind::Time));
}

#[test]
fn test_event_without_start_has_no_time_edges() {
    let response = rank(&city_events(), &RankingConfig::default());
    assert!(response
        .edges
        .iter()
        .filter(|e| e.kind == EdgeKind::Time)
        .all(|e| e.source != "event:5" && e.target != "event:5"));

    let mystery = response.nodes.iter().find(|n| n.id == "event:5").unwrap();
    assert_eq!(mystery.ring, 2);
    assert!(mystery.starts_at.is_none());
}

#[test]
fn test_top_k_is_min_of_k_and_candidates() {
    let events = city_events();
    for top_k in [1, 3, 6, 30] {
        let config = RankingConfig {
            top_k,
            ..RankingConfig::default()
        };
        let response = rank(&events, &config);
        let kept = response
            .nodes
            .iter()
            .filter(|n| n.kind == NodeKind::Event)
            .count();
        assert_eq!(kept, top_k.min(events.len()));
        assert_eq!(response.scores.len(), kept);
        assert_eq!(response.explanations.len(), events.len());
    }
}

#[test]
fn test_scores_are_in_ranked_order() {
    let response = rank(&city_events(), &RankingConfig::default());
    let scores: Vec<f64> = response.scores.iter().map(|(_, s)| *s).collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn test_explanation_ordering() {
    let response = rank(&city_events(), &RankingConfig::default());
    assert_eq!(
        response.explanations.get("event:1").unwrap().reasons,
        vec![
            "3 friends interested/going",
            "happening today",
            "matches topic: Workshops"
        ]
    );
    assert_eq!(
        response.explanations.get("event:5").unwrap().reasons,
        vec!["matches topic: Other"]
    );
}

#[test]
fn test_social_cap() {
    let config = RankingConfig::default();
    let response = rank(&city_events(), &config);
    let edge = response
        .edges
        .iter()
        .find(|e| e.kind == EdgeKind::Social && e.target == "event:6")
        .unwrap();
    assert_eq!(edge.source, "person:ego");
    assert!((edge.weight - config.w_social * 5.0).abs() < 1e-12);

    let node = response.nodes.iter().find(|n| n.id == "event:6").unwrap();
    assert_eq!(node.social_count, 9);
}

fn snapshot_with_events(events: serde_json::Value) -> SnapshotStore {
    let snapshot = serde_json::json!({
        "users": [{"id": "1", "username": "ego"}],
        "events": events,
    });
    SnapshotStore::from_json_str(&snapshot.to_string()).unwrap()
}

fn service(store: SnapshotStore) -> RecommendationService {
    let store = Arc::new(store);
    RecommendationService::new(store.clone(), store, RankingConfig::default())
}

#[tokio::test]
async fn test_ended_event_with_future_start_is_dropped() {
    let now = now();
    let store = snapshot_with_events(serde_json::json!([
        {
            "id": "1",
            "name": "Inconsistent",
            "starts_at": (now + Duration::hours(2)).to_rfc3339(),
            "ends_at": (now - Duration::hours(1)).to_rfc3339()
        },
        {
            "id": "2",
            "name": "Fine",
            "starts_at": (now + Duration::hours(2)).to_rfc3339()
        }
    ]));

    let response = service(store).recommend_at("1", false, now).await.unwrap();
    assert!(response.explanations.get("event:1").is_none());
    assert_eq!(response.ranked_event_ids(), vec!["event:2"]);
}

#[tokio::test]
async fn test_no_upcoming_events_is_no_content() {
    let now = now();
    let store = snapshot_with_events(serde_json::json!([
        {
            "id": "1",
            "name": "Over",
            "starts_at": (now - Duration::hours(3)).to_rfc3339(),
            "ends_at": (now - Duration::hours(1)).to_rfc3339()
        }
    ]));

    let err = service(store).recommend_at("1", false, now).await.unwrap_err();
    assert!(matches!(err, AppError::NoContent(_)));
}
