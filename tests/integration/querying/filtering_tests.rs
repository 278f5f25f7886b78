use rest_queryset::{Filters, QueryError, Sorts, TotalCount};
use serde_json::{json, Value};

use crate::common::*;

fn ids<I: Iterator<Item = Result<Post, QueryError>>>(iter: I) -> Vec<u64> {
    iter.map(|p| p.expect("post should materialize").id).collect()
}

#[test]
fn test_equality_filter() {
    let (manager, _counting) = setup::<Post>(10);
    let mut qs = manager.objects().filter([("author_id__eq", 1)]).unwrap();

    assert_eq!(qs.count().unwrap(), TotalCount::Exact(8));
    assert_eq!(ids(qs.iter()), vec![3, 6, 9, 12, 15, 18, 21, 24]);
}

#[test]
fn test_range_filters_combine() {
    let (manager, _counting) = setup::<Post>(10);
    let mut qs = manager
        .objects()
        .filter([("views__gt", 100)])
        .unwrap()
        .filter([("views__lt", 200)])
        .unwrap();

    assert_eq!(ids(qs.iter()), (11..=19).collect::<Vec<_>>());
    assert_eq!(
        qs.filters(),
        &Filters::from_exprs([("views__gt", 100), ("views__lt", 200)]).unwrap()
    );
}

#[test]
fn test_in_and_not_equal() {
    let (manager, _counting) = setup::<Post>(10);

    let mut within = manager.objects().filter([("id__in", json!([1, 2, 99]))]).unwrap();
    assert_eq!(ids(within.iter()), vec![1, 2]);

    let mut others = manager.objects().filter([("author_id__ne", 1)]).unwrap();
    assert_eq!(others.count().unwrap(), TotalCount::Exact(17));
}

#[test]
fn test_null_filters() {
    let (manager, _counting) = setup::<Post>(10);

    let mut missing = manager.objects().filter([("subtitle__eq", Value::Null)]).unwrap();
    assert_eq!(ids(missing.iter()), vec![5, 10, 15, 20, 25]);

    let mut present = manager.objects().filter([("subtitle__ne", Value::Null)]).unwrap();
    assert_eq!(present.count().unwrap(), TotalCount::Exact(20));
}

#[test]
fn test_null_with_ordering_operator_fails_remotely() {
    let (manager, counting) = setup::<Post>(10);

    // Building is fine; the request is what cannot be expressed.
    let mut qs = manager.objects().filter([("subtitle__gt", Value::Null)]).unwrap();
    let err = qs.count().unwrap_err();
    assert!(err.is_remote(), "unexpected error: {}", err);
    assert_eq!(counting.fetches(), 1);
}

#[test]
fn test_malformed_filter_fails_at_call_time() {
    let (manager, counting) = setup::<Post>(10);

    for key in ["views__gte", "views", "views__gt__lt", "__eq"] {
        let res = manager.objects().filter([(key, 1)]);
        assert!(matches!(res, Err(QueryError::Parse { .. })), "{} should not parse", key);
    }
    assert_eq!(counting.fetches(), 0);
}

#[test]
fn test_ordering() {
    let (manager, _counting) = setup::<Post>(10);

    let mut newest = manager.objects().order_by(["-views"]).unwrap();
    assert!(newest.ordered());
    assert_eq!(newest.get(0).unwrap().id, 25);

    let mut grouped = manager.objects().order_by(["author_id", "-id"]).unwrap();
    let first: Vec<u64> = ids(grouped.slice(None, Some(3), None).unwrap());
    assert_eq!(first, vec![24, 21, 18]);
    assert_eq!(grouped.sorts(), &Sorts::from_exprs(["author_id", "-id"]).unwrap());
}

#[test]
fn test_reordering_a_field_replaces_its_direction() {
    let (manager, _counting) = setup::<Post>(10);

    let mut qs = manager
        .objects()
        .order_by(["-id"])
        .unwrap()
        .order_by(["id"])
        .unwrap();
    assert_eq!(qs.sorts().len(), 1);
    assert_eq!(qs.get(0).unwrap().id, 1);
}

#[test]
fn test_filtering_leaves_the_original_untouched() {
    let (manager, _counting) = setup::<Post>(10);
    let mut base = manager.objects();
    base.count().unwrap();

    let mut narrowed = base.filter([("author_id__eq", 2)]).unwrap();
    assert!(narrowed.cache().is_empty());
    assert_eq!(narrowed.count().unwrap(), TotalCount::Exact(9));

    assert!(base.filters().is_empty());
    assert_eq!(base.count().unwrap(), TotalCount::Exact(25));
}
