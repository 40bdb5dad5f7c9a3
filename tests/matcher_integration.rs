//! End-to-end matcher tests: dataset file → encode-or-load → search / similar.

mod common;

use std::sync::Arc;
use std::thread;

use common::fixtures::{
    ProjectBuilder, Workspace, generated_projects, ids, scenario_encoder, scenario_projects,
};
use hopon::dataset::load_projects;
use hopon::{
    EncodeOutcome, EncoderHandle, MatcherState, ProjectMatcher, ScoreKind, SearchOutcome,
    cosine_similarity,
};

#[test]
fn test_dataset_file_to_ranked_search() {
    let workspace = Workspace::new();
    let path = workspace.write_dataset("projects.json", &scenario_projects());
    let projects = load_projects(&path).expect("Failed to load dataset");

    let encoder = scenario_encoder();
    let matcher = workspace.matcher(&encoder);
    assert!(matcher.encode_projects(&projects).is_ready());

    let SearchOutcome::Ranked(ranking) = matcher.search("Solar", &projects, None) else {
        panic!("expected ranked search");
    };

    let order: Vec<&str> = ranking.iter().map(|row| row.item.id.as_str()).collect();
    assert_eq!(order, vec!["1", "2", "3"]);

    let scores = ranking.scores();
    assert!((scores[0] - 1.0).abs() < 1e-6);
    assert!((scores[1] - cosine_similarity(&[1.0, 0.0], &[0.9, 0.1])).abs() < 1e-6);
    assert!(scores[2].abs() < 1e-6);
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));

    let rows = ranking.to_json_rows().expect("Failed to render rows");
    assert_eq!(rows[0]["acronym"], "GREEN");
    assert!(rows[0].get("relevance_score").is_some());
}

#[test]
fn test_similar_projects_from_dataset() {
    let workspace = Workspace::new();
    let projects = scenario_projects();
    let encoder = scenario_encoder();
    let matcher = workspace.matcher(&encoder);
    matcher.encode_projects(&projects);

    let ranking = matcher.similar("1", &projects, 3);

    assert_eq!(ranking.kind(), ScoreKind::Similarity);
    let order: Vec<&str> = ranking.iter().map(|row| row.item.id.as_str()).collect();
    assert_eq!(order, vec!["2", "3"]);

    let rows = ranking.to_json_rows().expect("Failed to render rows");
    assert!(rows.iter().all(|row| row.get("similarity_score").is_some()));
}

#[test]
fn test_restart_reuses_cache_without_encoding() {
    let workspace = Workspace::new();
    let projects = scenario_projects();

    let first = scenario_encoder();
    assert_eq!(
        workspace.matcher(&first).encode_projects(&projects),
        EncodeOutcome::Computed {
            count: 3,
            persisted: true
        }
    );

    let second = scenario_encoder();
    let restarted = workspace.matcher(&second);
    assert_eq!(
        restarted.encode_projects(&projects),
        EncodeOutcome::Loaded { count: 3 }
    );
    assert_eq!(second.batch_calls(), 0);

    // Queries still encode the query text, but never the corpus.
    restarted.search("Solar", &projects, None);
    assert_eq!(second.batch_calls(), 1);
    assert_eq!(second.texts_encoded(), 1);
}

#[test]
fn test_dataset_change_invalidates_cache() {
    let workspace = Workspace::new();
    let mut projects = scenario_projects();

    let encoder = scenario_encoder();
    workspace.matcher(&encoder).encode_projects(&projects);

    projects.push(
        ProjectBuilder::new("4")
            .title("Neural Networks")
            .objective("Brain-inspired computing")
            .build(),
    );

    let fresh = scenario_encoder();
    let matcher = workspace.matcher(&fresh);
    let outcome = matcher.encode_projects(&projects);

    assert!(matches!(outcome, EncodeOutcome::Computed { count: 4, .. }));
    assert_eq!(fresh.batch_calls(), 1);
    assert_eq!(fresh.texts_encoded(), 4);

    let info = workspace.cache().info().expect("cache written");
    assert_eq!(info.items, 4);
}

#[test]
fn test_corrupt_cache_is_rebuilt() {
    let workspace = Workspace::new();
    let projects = scenario_projects();
    std::fs::create_dir_all(workspace.cache_path().parent().expect("parent")).expect("mkdir");
    std::fs::write(workspace.cache_path(), b"garbage bytes").expect("write");

    let encoder = scenario_encoder();
    let outcome = workspace.matcher(&encoder).encode_projects(&projects);

    assert!(matches!(
        outcome,
        EncodeOutcome::Computed {
            persisted: true,
            ..
        }
    ));
    let info = workspace.cache().info().expect("cache rewritten");
    assert_eq!(info.items, 3);
    assert_eq!(info.embedding_dim, 2);
}

#[test]
fn test_degraded_mode_end_to_end() {
    let workspace = Workspace::new();
    let projects = scenario_projects();
    let matcher = ProjectMatcher::new(
        EncoderHandle::unavailable("model directory missing"),
        workspace.cache(),
    );

    assert!(!matcher.encode_projects(&projects).is_ready());
    assert!(matches!(matcher.state(), MatcherState::Unavailable { .. }));

    let outcome = matcher.search("Solar", &projects, None);
    assert_eq!(outcome, SearchOutcome::Passthrough(projects.clone()));
    assert!(matcher.similar("1", &projects, 3).is_empty());
    assert!(!workspace.cache_path().exists());
}

#[test]
fn test_concurrent_encode_runs_encoder_once() {
    let workspace = Workspace::new();
    let projects = Arc::new(generated_projects(50));
    let encoder = scenario_encoder();
    let matcher = Arc::new(workspace.matcher(&encoder));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let matcher = Arc::clone(&matcher);
            let projects = Arc::clone(&projects);
            thread::spawn(move || matcher.encode_projects(&projects))
        })
        .collect();

    let outcomes: Vec<EncodeOutcome> = handles
        .into_iter()
        .map(|h| h.join().expect("thread panicked"))
        .collect();

    assert!(outcomes.iter().all(EncodeOutcome::is_ready));
    assert_eq!(
        outcomes
            .iter()
            .filter(|o| matches!(o, EncodeOutcome::Computed { .. }))
            .count(),
        1
    );
    assert_eq!(encoder.batch_calls(), 1);
    assert_eq!(encoder.texts_encoded(), 50);
}

#[test]
fn test_queries_during_reencode_see_whole_tables() {
    let workspace = Workspace::new();
    let small = scenario_projects();
    let mut large = scenario_projects();
    large.extend(generated_projects(20));

    let encoder = scenario_encoder();
    let matcher = Arc::new(workspace.matcher(&encoder));
    matcher.encode_projects(&small);

    let reader = {
        let matcher = Arc::clone(&matcher);
        let candidates = large.clone();
        thread::spawn(move || {
            for _ in 0..50 {
                if let MatcherState::Ready(table) = matcher.state() {
                    assert!(table.len() == 3 || table.len() == 23);
                    assert_eq!(table.as_flat().len(), table.len() * table.embedding_dim());
                }
                let outcome = matcher.search("Solar", &candidates, Some(5));
                assert!(outcome.len() <= 5);
            }
        })
    };

    matcher.encode_projects(&large);
    reader.join().expect("reader panicked");

    let state = matcher.state();
    assert_eq!(state.table().expect("ready").len(), 23);
    assert_eq!(state.table().expect("ready").ids()[..3], ids(&small)[..]);
}
