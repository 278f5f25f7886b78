use rest_queryset::{Manager, MemorySource, QueryError, QuerySetConfig, RecordSource, TotalCount};
use serde_json::json;
use std::sync::Arc;

use crate::common::*;

fn manager_over(source: MemorySource, request_limit: usize) -> (Manager<Post>, Arc<CountingSource>) {
    let counting = counted(Arc::new(source));
    let manager = Manager::new(
        counting.clone() as Arc<dyn RecordSource>,
        QuerySetConfig::new(request_limit),
    )
    .expect("building the manager failed");
    (manager, counting)
}

fn posts(n: u64) -> Vec<serde_json::Value> {
    (1..=n).map(|id| Post::record(id, 1, id)).collect()
}

#[test]
fn test_count_issues_single_fetch() {
    let (manager, counting) = setup::<Post>(10);
    let mut qs = manager.objects();

    assert_eq!(qs.count().unwrap(), TotalCount::Exact(25));
    assert_eq!(qs.count().unwrap(), TotalCount::Exact(25));
    assert!(qs.exists().unwrap());

    assert_eq!(counting.fetches(), 1, "count should be answered from the cache after the first page");
}

#[test]
fn test_iteration_fetches_each_page_once() {
    let (manager, counting) = setup::<Post>(10);
    let mut qs = manager.objects();

    // 1. A full pass pages through the collection.
    let ids: Vec<u64> = qs.iter().map(|p| p.unwrap().id).collect();
    assert_eq!(ids, (1..=25).collect::<Vec<_>>());
    assert_eq!(counting.offsets(), vec![0, 10, 20]);

    // 2. A second pass is served from the cache.
    let again = qs.iter().count();
    assert_eq!(again, 25);
    assert_eq!(counting.fetches(), 3, "second pass should not hit the source");
}

#[test]
fn test_small_collection_fits_one_page() {
    let (manager, counting) = manager_over(
        {
            let source = MemorySource::new();
            source.insert("post", posts(2)).unwrap();
            source
        },
        10,
    );
    let mut qs = manager.objects();

    assert_eq!(qs.iter().count(), 2);
    assert_eq!(qs.count().unwrap(), TotalCount::Exact(2));
    assert_eq!(counting.fetches(), 1);
}

#[test]
fn test_unbounded_total_stops_on_short_page() {
    let source = MemorySource::new().without_total_count();
    source.insert("post", posts(13)).unwrap();
    let (manager, counting) = manager_over(source, 10);
    let mut qs = manager.objects();

    let items: Vec<Post> = qs.iter().collect::<Result<_, _>>().unwrap();
    assert_eq!(items.len(), 13);
    assert_eq!(counting.offsets(), vec![0, 10]);

    assert_eq!(qs.count().unwrap(), TotalCount::Unbounded);
    assert!(qs.exists().unwrap());
}

#[test]
fn test_unbounded_total_stops_on_empty_page() {
    let source = MemorySource::new().without_total_count();
    source.insert("post", posts(20)).unwrap();
    let (manager, counting) = manager_over(source, 10);
    let mut qs = manager.objects();

    assert_eq!(qs.iter().count(), 20);
    assert_eq!(counting.offsets(), vec![0, 10, 20], "the empty third page ends the pass");
}

#[test]
fn test_empty_collection() {
    let (manager, counting) = manager_over(MemorySource::new(), 10);
    let mut qs = manager.objects();

    assert_eq!(qs.count().unwrap(), TotalCount::Exact(0));
    assert!(!qs.exists().unwrap());
    assert!(qs.is_empty().unwrap());
    assert_eq!(qs.iter().count(), 0);
    assert_eq!(counting.fetches(), 1);
}

#[test]
fn test_request_limit_controls_page_size() {
    let (manager, counting) = setup::<Post>(10);
    let mut qs = manager.objects();
    qs.set_request_limit(4).unwrap();

    assert_eq!(qs.iter().count(), 25);
    assert_eq!(counting.offsets(), vec![0, 4, 8, 12, 16, 20, 24]);

    assert_eq!(qs.set_request_limit(0).unwrap_err(), QueryError::InvalidRequestLimit);
    assert_eq!(qs.request_limit(), 4);
}

#[test]
fn test_request_limit_change_keeps_cached_pages() {
    let (manager, counting) = setup::<Post>(10);
    let mut qs = manager.objects();

    // 1. Counting caches the first ten records at the old page size.
    assert_eq!(qs.count().unwrap(), TotalCount::Exact(25));

    // 2. Smaller pages from here on; the cached ones are still read.
    qs.set_request_limit(4).unwrap();
    let ids: Vec<u64> = qs.iter().map(|p| p.unwrap().id).collect();
    assert_eq!(ids, (1..=25).collect::<Vec<_>>());

    // The first miss falls inside the page starting at 8.
    assert_eq!(counting.offsets(), vec![0, 8, 12, 16, 20, 24]);
}

#[test]
fn test_iteration_around_an_unaligned_page() {
    let (manager, counting) = setup::<Post>(10);
    let mut qs = manager.objects();

    // 1. Cache ten records starting mid-page.
    qs.cache_page(5).unwrap();
    assert_eq!(qs.cache().len(), 10);

    // 2. A full pass fills the gaps on both sides.
    let ids: Vec<u64> = qs.iter().map(|p| p.unwrap().id).collect();
    assert_eq!(ids, (1..=25).collect::<Vec<_>>());
    assert_eq!(counting.offsets(), vec![5, 0, 10, 20]);
}

#[test]
fn test_zero_request_limit_is_rejected_up_front() {
    let source = Arc::new(MemorySource::new()) as Arc<dyn RecordSource>;
    let err = Manager::<Post>::new(source, QuerySetConfig::new(0)).unwrap_err();
    assert_eq!(err, QueryError::InvalidRequestLimit);

    let config = QuerySetConfig::from_json(r#"{ "request_limit": 0 }"#);
    assert_eq!(config.unwrap_err(), QueryError::InvalidRequestLimit);
}

#[test]
fn test_config_loaded_from_json() {
    let config = QuerySetConfig::from_json(&json!({ "request_limit": 5 }).to_string()).unwrap();
    let counting = counted(Arc::new(seeded_source()));
    let manager = Manager::<Post>::new(counting.clone() as Arc<dyn RecordSource>, config).unwrap();

    assert_eq!(manager.objects().iter().count(), 25);
    assert_eq!(counting.offsets(), vec![0, 5, 10, 15, 20]);
}
