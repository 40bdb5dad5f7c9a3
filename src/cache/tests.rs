use super::*;
use tempfile::TempDir;

fn create_test_cache() -> (EmbeddingCache, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let cache = EmbeddingCache::new(dir.path().join("processed").join("embeddings.rkyv"));
    (cache, dir)
}

fn ids(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

fn sample_table() -> VectorTable {
    VectorTable::from_rows(
        ids(&["1", "2", "3"]),
        vec![vec![1.0, 0.0], vec![0.9, 0.1], vec![0.0, 1.0]],
    )
    .expect("valid table")
}

#[test]
fn test_load_without_record_is_absent() {
    let (cache, _dir) = create_test_cache();

    let lookup = cache.load(&["1", "2", "3"]);

    assert!(matches!(lookup, CacheLookup::Miss(MissReason::Absent)));
    assert!(cache.info().is_none());
}

#[test]
fn test_save_then_load_is_bit_exact() {
    let (cache, _dir) = create_test_cache();
    let table = VectorTable::from_rows(
        ids(&["a", "b"]),
        vec![vec![0.1, -0.2, 1.0e-7], vec![f32::MIN_POSITIVE, 0.333_333_34, -1.0]],
    )
    .expect("valid table");

    let outcome = cache.save(&table);
    assert!(outcome.is_written());

    let loaded = cache
        .load(&["a", "b"])
        .into_table()
        .expect("should be a cache hit");

    assert_eq!(loaded.ids(), table.ids());
    for (a, b) in loaded.as_flat().iter().zip(table.as_flat()) {
        assert_eq!(a.to_bits(), b.to_bits());
    }
}

#[test]
fn test_reordered_ids_miss() {
    let (cache, _dir) = create_test_cache();
    cache.save(&sample_table());

    let lookup = cache.load(&["2", "1", "3"]);

    assert!(matches!(
        lookup,
        CacheLookup::Miss(MissReason::Stale { cached_len: 3, expected_len: 3 })
    ));
}

#[test]
fn test_membership_change_is_stale() {
    let (cache, _dir) = create_test_cache();
    cache.save(&sample_table());

    match cache.load(&["1", "2", "3", "4"]) {
        CacheLookup::Miss(MissReason::Stale {
            cached_len,
            expected_len,
        }) => {
            assert_eq!(cached_len, 3);
            assert_eq!(expected_len, 4);
        }
        other => panic!("expected stale miss, got {:?}", other),
    }

    assert!(!cache.load(&["1", "2"]).is_hit());
    assert!(!cache.load(&["1", "2", "9"]).is_hit());
    assert!(!cache.load::<&str>(&[]).is_hit());
}

#[test]
fn test_garbage_file_is_corrupt() {
    let (cache, _dir) = create_test_cache();
    std::fs::create_dir_all(cache.path().parent().expect("parent")).expect("mkdir");
    std::fs::write(cache.path(), b"definitely not an rkyv archive").expect("write");

    let lookup = cache.load(&["1"]);

    assert!(matches!(lookup, CacheLookup::Miss(MissReason::Corrupt(_))));
    assert!(cache.info().is_none());
}

#[test]
fn test_empty_file_is_corrupt() {
    let (cache, _dir) = create_test_cache();
    std::fs::create_dir_all(cache.path().parent().expect("parent")).expect("mkdir");
    std::fs::write(cache.path(), b"").expect("write");

    assert!(matches!(
        cache.load(&["1"]),
        CacheLookup::Miss(MissReason::Corrupt(_))
    ));
}

#[test]
fn test_save_replaces_previous_record() {
    let (cache, _dir) = create_test_cache();
    cache.save(&sample_table());

    let replacement =
        VectorTable::from_rows(ids(&["9"]), vec![vec![0.5, 0.5]]).expect("valid table");
    cache.save(&replacement);

    assert!(!cache.load(&["1", "2", "3"]).is_hit());
    assert!(cache.load(&["9"]).is_hit());
}

#[test]
fn test_save_failure_is_reported() {
    let dir = TempDir::new().expect("temp dir");
    let blocker = dir.path().join("not_a_dir");
    std::fs::write(&blocker, b"file").expect("write blocker");

    let cache = EmbeddingCache::new(blocker.join("embeddings.rkyv"));
    let outcome = cache.save(&sample_table());

    assert!(matches!(outcome, SaveOutcome::Failed { .. }));
    assert!(matches!(
        cache.load(&["1", "2", "3"]),
        CacheLookup::Miss(MissReason::Absent) | CacheLookup::Miss(MissReason::Corrupt(_))
    ));
}

#[test]
fn test_info_and_clear() {
    let (cache, _dir) = create_test_cache();
    let outcome = cache.save(&sample_table());
    let SaveOutcome::Written { bytes } = outcome else {
        panic!("save should succeed");
    };

    let info = cache.info().expect("record present");
    assert_eq!(info.items, 3);
    assert_eq!(info.embedding_dim, 2);
    assert_eq!(info.bytes, bytes);

    assert!(cache.clear().expect("clear"));
    assert!(!cache.clear().expect("second clear"));
    assert!(matches!(
        cache.load(&["1", "2", "3"]),
        CacheLookup::Miss(MissReason::Absent)
    ));
}

#[test]
fn test_miss_reason_display() {
    assert_eq!(MissReason::Absent.as_str(), "absent");
    let stale = MissReason::Stale {
        cached_len: 3,
        expected_len: 4,
    };
    assert_eq!(stale.as_str(), "stale");
    assert!(stale.to_string().contains("3 cached ids"));
}
