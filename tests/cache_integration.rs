//! Integration tests for the embedding cache with the stub sentence encoder.

mod common;

use common::fixtures::{Workspace, generated_projects, ids};
use hopon::cache::{CacheLookup, MissReason};
use hopon::dataset::CorpusItem;
use hopon::embedding::{EncoderConfig, EncoderHandle, SentenceEncoder, TextEncoder};
use hopon::storage::{ArchivedEmbeddingRecord, SnapshotFile};
use hopon::{EncodeOutcome, ProjectMatcher, SaveOutcome, VectorTable};

fn stub_table(count: usize) -> VectorTable {
    let encoder = SentenceEncoder::load(EncoderConfig::stub()).expect("stub encoder");
    let projects = generated_projects(count);
    let corpus: Vec<String> = projects.iter().map(|p| p.corpus_text()).collect();
    let texts: Vec<&str> = corpus.iter().map(String::as_str).collect();
    let vectors = encoder.encode_batch(&texts).expect("encode");
    let ids = ids(&projects).iter().map(|id| id.to_string()).collect();
    VectorTable::from_rows(ids, vectors).expect("valid table")
}

#[test]
fn test_full_dimension_roundtrip() {
    let workspace = Workspace::new();
    let cache = workspace.cache();
    let table = stub_table(64);
    assert_eq!(table.embedding_dim(), 384);

    assert!(matches!(cache.save(&table), SaveOutcome::Written { .. }));

    let loaded = cache
        .load(table.ids())
        .into_table()
        .expect("expected cache hit");
    assert_eq!(loaded, table);
}

#[test]
fn test_record_is_readable_through_snapshot() {
    let workspace = Workspace::new();
    let table = stub_table(5);
    workspace.cache().save(&table);

    let snapshot = SnapshotFile::new(workspace.cache_path());
    let handle = snapshot.open().expect("open snapshot");
    let archived = handle
        .access_archived::<ArchivedEmbeddingRecord>()
        .expect("valid archive");

    assert!(archived.is_consistent());
    assert!(archived.ids_match(table.ids()));
    assert_eq!(archived.vectors.len(), 5 * 384);
}

#[test]
fn test_single_id_change_misses() {
    let workspace = Workspace::new();
    let cache = workspace.cache();
    let table = stub_table(10);
    cache.save(&table);

    let mut changed: Vec<String> = table.ids().to_vec();
    changed[9] = "p-renamed".to_string();

    match cache.load(&changed) {
        CacheLookup::Miss(MissReason::Stale {
            cached_len,
            expected_len,
        }) => {
            assert_eq!(cached_len, 10);
            assert_eq!(expected_len, 10);
        }
        other => panic!("expected stale miss, got {:?}", other),
    }
}

#[test]
fn test_stub_matcher_roundtrip_through_cache() {
    let workspace = Workspace::new();
    let projects = generated_projects(12);

    let first = ProjectMatcher::new(
        EncoderHandle::load(EncoderConfig::stub()),
        workspace.cache(),
    );
    assert!(matches!(
        first.encode_projects(&projects),
        EncodeOutcome::Computed {
            count: 12,
            persisted: true
        }
    ));

    let second = ProjectMatcher::new(
        EncoderHandle::load(EncoderConfig::stub()),
        workspace.cache(),
    );
    assert_eq!(
        second.encode_projects(&projects),
        EncodeOutcome::Loaded { count: 12 }
    );

    let from_first = first.similar("p3", &projects, 4);
    let from_second = second.similar("p3", &projects, 4);
    assert_eq!(from_first, from_second);
    assert_eq!(from_first.len(), 4);
    assert!(from_first.iter().all(|row| row.item.id != "p3"));

    let query = projects[7].corpus_text();
    let ranking = second
        .search(&query, &projects, Some(1))
        .ranking()
        .cloned()
        .expect("ranked");
    assert_eq!(ranking.rows()[0].item.id, "p7");
    assert!((ranking.rows()[0].score - 1.0).abs() < 1e-5);
}

#[test]
fn test_clear_then_recompute() {
    let workspace = Workspace::new();
    let projects = generated_projects(3);
    let cache = workspace.cache();

    let matcher = ProjectMatcher::new(EncoderHandle::load(EncoderConfig::stub()), cache.clone());
    matcher.encode_projects(&projects);
    assert!(cache.clear().expect("clear"));
    assert!(cache.info().is_none());

    let fresh = ProjectMatcher::new(EncoderHandle::load(EncoderConfig::stub()), cache.clone());
    assert!(matches!(
        fresh.encode_projects(&projects),
        EncodeOutcome::Computed { .. }
    ));
    assert!(workspace.path().join("processed").is_dir());
}
