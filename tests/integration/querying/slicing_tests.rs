use rest_queryset::{QueryError, TotalCount};

use crate::common::*;

#[test]
fn test_get_fetches_only_the_needed_page() {
    let (manager, counting) = setup::<Post>(10);
    let mut qs = manager.objects();

    let post = qs.get(17).unwrap();
    assert_eq!(post.id, 18);
    // The first page answers the count, the second holds index 17.
    assert_eq!(counting.offsets(), vec![0, 10]);

    // Neighbouring indices come from the cache.
    assert_eq!(qs.get(12).unwrap().id, 13);
    assert_eq!(qs.get(3).unwrap().id, 4);
    assert_eq!(counting.fetches(), 2);
}

#[test]
fn test_get_out_of_range() {
    let (manager, _counting) = setup::<Post>(10);
    let mut qs = manager.objects();

    assert_eq!(
        qs.get(25).unwrap_err(),
        QueryError::IndexOutOfRange {
            index: 25,
            count: TotalCount::Exact(25)
        }
    );
    assert_eq!(qs.get(24).unwrap().id, 25);
}

#[test]
fn test_negative_arguments_never_fetch() {
    let (manager, counting) = setup::<Post>(10);
    let mut qs = manager.objects();

    assert_eq!(qs.get(-3).unwrap_err(), QueryError::NegativeIndex { value: -3 });
    assert!(qs.slice(Some(-1), None, None).is_err());
    assert!(qs.slice(None, Some(-5), None).is_err());
    assert!(qs.slice(None, None, Some(-1)).is_err());
    assert!(matches!(
        qs.slice(None, None, Some(0)),
        Err(QueryError::InvalidStep { step: 0 })
    ));

    assert_eq!(counting.fetches(), 0, "invalid arguments must be rejected before any request");
}

#[test]
fn test_slice_with_step() {
    let (manager, counting) = setup::<Post>(10);
    let mut qs = manager.objects();

    let ids: Vec<u64> = qs
        .slice(Some(2), Some(23), Some(5))
        .unwrap()
        .map(|p| p.unwrap().id)
        .collect();
    assert_eq!(ids, vec![3, 8, 13, 18, 23]);
    assert_eq!(counting.offsets(), vec![0, 10, 20]);
}

#[test]
fn test_open_slice_stops_at_count() {
    let (manager, counting) = setup::<Post>(10);
    let mut qs = manager.objects();

    let ids: Vec<u64> = qs
        .slice(Some(20), None, None)
        .unwrap()
        .map(|p| p.unwrap().id)
        .collect();
    assert_eq!(ids, vec![21, 22, 23, 24, 25]);
    assert_eq!(counting.offsets(), vec![0, 20], "pages between are skipped");
}

#[test]
fn test_slice_past_the_end_is_empty() {
    let (manager, counting) = setup::<Post>(10);
    let mut qs = manager.objects();

    assert_eq!(qs.slice(Some(30), Some(40), None).unwrap().count(), 0);
    assert_eq!(counting.fetches(), 1);
}
