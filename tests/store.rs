#[allow(dead_code)]
mod common;

use std::time::Duration;

use roster::prelude::*;

fn ids(view: &DerivedView) -> Vec<String> {
    view.ids()
}

fn pair() -> Vec<Record> {
    vec![
        Record::new("1", "Naruto", Location::Konoha, Health::Healthy, 100),
        Record::new("2", "Gaara", Location::Suna, Health::Critical, 200),
    ]
}

async fn loaded(remote: &LocalRemote) -> RecordStore {
    let mut store = RecordStore::new();
    assert_eq!(store.load(remote).await, LoadOutcome::Applied);
    store
}

#[tokio::test]
async fn filter_sort_and_clear() {
    let remote = LocalRemote::new(pair());
    let mut store = loaded(&remote).await;

    store.toggle_health_filter(Health::Critical);
    assert_eq!(ids(&store.view()), vec!["2"]);

    store.cycle_sort();
    assert_eq!(store.criteria().sort, SortState::Ascending);
    assert_eq!(ids(&store.view()), vec!["2"]);

    store.clear_health_filters();
    let view = store.view();
    assert_eq!(ids(&view), vec!["1", "2"]);
    assert_eq!(view.get(0).map(|r| r.power), Some(100));
    assert_eq!(view.get(1).map(|r| r.power), Some(200));
}

#[tokio::test]
async fn search_matches_location() {
    let remote = LocalRemote::new(pair());
    let mut store = loaded(&remote).await;
    store.set_search("suNA");
    assert_eq!(store.visible_ids(), vec!["2"]);
    store.set_search("");
    assert_eq!(store.visible_ids().len(), 2);
}

#[tokio::test]
async fn commit_updates_local_and_remote() {
    let remote = LocalRemote::new(common::records(5));
    let mut store = loaded(&remote).await;

    let outcome = store
        .apply_bulk_viewed_change(&remote, vec![String::from("1"), String::from("3")], true)
        .await;
    assert!(matches!(outcome, Ok(MutationState::Committed)));
    let mut viewed: Vec<_> = store.viewed_ids().iter().cloned().collect();
    viewed.sort();
    assert_eq!(viewed, vec!["1", "3"]);
    assert!(store.record("1").is_some_and(|r| r.viewed));
    assert_eq!(remote.snapshot().iter().filter(|r| r.viewed).count(), 2);
    assert_eq!(store.error(), None);
}

#[tokio::test]
async fn commit_keeps_earlier_viewed_records() {
    let mut records = common::records(5);
    records[2].viewed = true;
    let remote = LocalRemote::new(records);
    let mut store = loaded(&remote).await;
    assert!(store.is_viewed("2"));

    let outcome = store
        .apply_bulk_viewed_change(&remote, vec![String::from("1"), String::from("3")], true)
        .await;
    assert!(matches!(outcome, Ok(MutationState::Committed)));
    let mut viewed: Vec<_> = store.viewed_ids().iter().cloned().collect();
    viewed.sort();
    assert_eq!(viewed, vec!["1", "2", "3"]);
    let server: Vec<bool> = remote.snapshot().iter().map(|r| r.viewed).collect();
    assert_eq!(server, vec![false, true, true, true, false]);
}

#[tokio::test]
async fn rollback_restores_mixed_values() {
    let remote = LocalRemote::new(common::records(3));
    let mut store = loaded(&remote).await;
    store
        .apply_bulk_viewed_change(&remote, vec![String::from("0")], true)
        .await
        .unwrap();

    remote.set_fail_patch(true);
    let outcome = store
        .apply_bulk_viewed_change(&remote, vec![String::from("0"), String::from("1")], false)
        .await;
    assert!(matches!(outcome, Ok(MutationState::RolledBack)));
    assert!(store.is_viewed("0"));
    assert!(!store.is_viewed("1"));
    assert_eq!(store.error(), Some("Failed to update records: injected failure"));
    assert!(!store.is_mutating());
}

#[tokio::test]
async fn rejected_batches_touch_nothing() {
    let remote = LocalRemote::new(common::records(3));
    let mut store = loaded(&remote).await;

    let empty = store.apply_bulk_viewed_change(&remote, vec![], true).await;
    assert!(empty.is_err());
    let unknown = store
        .apply_bulk_viewed_change(&remote, vec![String::from("42")], true)
        .await;
    assert!(unknown.is_err());
    assert!(store.error().is_some());
    assert!(store.viewed_ids().is_empty());
    assert_eq!(remote.patch_calls(), 0);
}

#[tokio::test]
async fn newer_load_wins() {
    let slow = LocalRemote::new(common::records(3)).with_latency(Duration::from_millis(30), Duration::ZERO);
    let fast = LocalRemote::new(common::records(7));
    let mut store = RecordStore::new();

    let first = store.begin_load();
    let second = store.begin_load();
    let (old, new) = tokio::join!(slow.fetch_all(), fast.fetch_all());
    assert_eq!(store.finish_load(second, new), LoadOutcome::Applied);
    assert_eq!(store.finish_load(first, old), LoadOutcome::Stale);
    assert_eq!(store.records().len(), 7);
    assert!(!store.is_loading());
}

#[tokio::test]
async fn load_failure_then_recovery() {
    let remote = LocalRemote::new(common::records(4));
    remote.set_fail_fetch(true);
    let mut store = RecordStore::new();
    assert_eq!(store.load(&remote).await, LoadOutcome::Failed);
    assert!(store.load_failed());
    assert_eq!(store.error(), Some("Failed to load records: injected failure"));

    remote.set_fail_fetch(false);
    assert_eq!(store.load(&remote).await, LoadOutcome::Applied);
    assert_eq!(store.records().len(), 4);
    assert_eq!(store.error(), None);
}

#[tokio::test]
async fn file_backed_source_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("characters.json");
    std::fs::write(&path, serde_json::to_string(&pair()).unwrap()).unwrap();

    let remote = LocalRemote::from_file(&path).await.unwrap();
    let mut store = loaded(&remote).await;
    store.toggle_select("2");
    let pending = store.mark_selected_viewed(true).unwrap();
    let result = remote.patch_viewed(pending.request().clone()).await;
    assert_eq!(store.settle_bulk_viewed(&pending, result), Some(MutationState::Committed));

    let reopened = LocalRemote::from_file(&path).await.unwrap();
    let mut store = loaded(&reopened).await;
    assert!(store.is_viewed("2"));
    assert!(!store.is_viewed("1"));
    store.reset();
    assert!(store.records().is_empty());
}
