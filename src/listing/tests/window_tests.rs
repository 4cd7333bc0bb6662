//! Incremental list and paginator behaviour
//!
//! Covers re-entrancy, source replacement and clamping, plus property tests
//! for the window invariants.

use proptest::prelude::*;
use std::sync::Arc;
use std::time::Duration;
use storynest_listing::{IncrementalList, ListConfig, Paginator, ScrollMetrics, ScrollObserver};

fn stories(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("story-{i}")).collect()
}

// ============================================================================
// INFINITE SCROLL
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_fifty_items_page_of_twelve() {
    let list = IncrementalList::with_page_size(stories(50), 12).unwrap();
    assert_eq!(list.loaded_count(), 12);
    assert!(list.has_more());

    assert!(list.load_more().await);
    assert_eq!(list.loaded_count(), 24);
}

#[tokio::test(start_paused = true)]
async fn test_rapid_double_trigger_applies_once() {
    let list = IncrementalList::with_page_size(stories(50), 12).unwrap();

    let (first, second) = tokio::join!(list.load_more(), list.load_more());

    assert!(first);
    assert!(!second);
    assert_eq!(list.loaded_count(), 24);
}

#[tokio::test(start_paused = true)]
async fn test_background_triggers_collapse() {
    let list = IncrementalList::with_page_size(stories(50), 12).unwrap();

    let handle = list.trigger_load_more().unwrap();
    assert!(list.trigger_load_more().is_none());
    assert!(list.trigger_load_more().is_none());

    handle.await.unwrap();
    assert_eq!(list.loaded_count(), 24);
}

#[tokio::test(start_paused = true)]
async fn test_source_change_resets_immediately() {
    let list = IncrementalList::with_page_size(stories(50), 12).unwrap();
    list.load_more().await;
    list.load_more().await;
    assert_eq!(list.loaded_count(), 36);

    assert!(list.replace_items(stories(8)));

    let snapshot = list.snapshot();
    assert_eq!(snapshot.loaded_count, 8);
    assert_eq!(snapshot.total_count, 8);
    assert!(!snapshot.has_more);
    assert_eq!(snapshot.visible_items.len(), 8);
}

#[tokio::test(start_paused = true)]
async fn test_same_source_keeps_window() {
    let items: Arc<[String]> = stories(50).into();
    let list = IncrementalList::with_page_size(Arc::clone(&items), 12).unwrap();
    list.load_more().await;

    assert!(!list.replace_items(Arc::clone(&items)));
    assert_eq!(list.loaded_count(), 24);

    // Same contents, different allocation: treated as a new collection.
    assert!(list.replace_items(stories(50)));
    assert_eq!(list.loaded_count(), 12);
}

#[tokio::test(start_paused = true)]
async fn test_replacement_discards_pending_expansion() {
    let list = IncrementalList::with_page_size(stories(50), 12).unwrap();

    let handle = list.trigger_load_more().unwrap();
    list.replace_items(stories(30));

    assert!(!handle.await.unwrap());
    assert_eq!(list.loaded_count(), 12);
    assert!(!list.is_loading_more());

    // The new collection accepts triggers again.
    assert!(list.load_more().await);
    assert_eq!(list.loaded_count(), 24);
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_load_more_still_completes() {
    let list = IncrementalList::with_page_size(stories(50), 12).unwrap();

    let cancelled = tokio::time::timeout(Duration::from_millis(10), list.load_more()).await;
    assert!(cancelled.is_err());
    assert!(list.is_loading_more());

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert!(!list.is_loading_more());
    assert_eq!(list.loaded_count(), 24);

    assert!(list.load_more().await);
    assert_eq!(list.loaded_count(), 36);
}

#[tokio::test(start_paused = true)]
async fn test_settle_delay_is_respected() {
    let list = IncrementalList::new(
        stories(20),
        ListConfig {
            page_size: 5,
            settle_delay: Duration::from_millis(300),
        },
    )
    .unwrap();

    let handle = list.trigger_load_more().unwrap();
    tokio::time::sleep(Duration::from_millis(299)).await;
    assert_eq!(list.loaded_count(), 5);
    assert!(list.is_loading_more());

    handle.await.unwrap();
    assert_eq!(list.loaded_count(), 10);
}

#[tokio::test(start_paused = true)]
async fn test_scroll_to_end_reveals_everything() {
    let list = IncrementalList::with_page_size(stories(50), 12).unwrap();
    let observer = ScrollObserver::default();
    let at_bottom = ScrollMetrics::new(2900.0, 800.0, 3800.0);

    while let Some(handle) = observer.observe(&at_bottom, &list) {
        handle.await.unwrap();
    }

    assert_eq!(list.loaded_count(), 50);
    assert!(!list.has_more());
    assert_eq!(list.visible_items().last().map(String::as_str), Some("story-50"));
}

#[test]
fn test_snapshot_serializes() {
    let list = IncrementalList::with_page_size(stories(3), 2).unwrap();
    let json = serde_json::to_value(list.snapshot()).unwrap();

    assert_eq!(json["loaded_count"], 2);
    assert_eq!(json["has_more"], true);
    assert_eq!(json["visible_items"][1], "story-2");
}

// ============================================================================
// PAGINATION
// ============================================================================

#[test]
fn test_go_to_page_is_idempotent() {
    let mut pager = Paginator::new(stories(25), 10).unwrap();

    pager.go_to_page(2);
    let first = pager.page_items().to_vec();
    pager.go_to_page(2);

    assert_eq!(pager.page_items(), first.as_slice());
}

// ============================================================================
// PROPERTIES
// ============================================================================

proptest! {
    #[test]
    fn test_page_is_always_in_range(len in 0usize..200, size in 1usize..30, page in 0usize..50) {
        let mut pager = Paginator::new((0..len).collect::<Vec<_>>(), size).unwrap();
        let selected = pager.go_to_page(page);

        prop_assert!(selected >= 1 && selected <= pager.total_pages());
        prop_assert!(pager.page_items().len() <= size);
        prop_assert_eq!(pager.total_pages(), std::cmp::max(1, (len + size - 1) / size));
    }

    #[test]
    fn test_pages_partition_collection(len in 0usize..120, size in 1usize..25) {
        let mut pager = Paginator::new((0..len).collect::<Vec<_>>(), size).unwrap();
        let mut seen = Vec::new();
        for page in 1..=pager.total_pages() {
            pager.go_to_page(page);
            seen.extend_from_slice(pager.page_items());
        }
        prop_assert_eq!(seen, (0..len).collect::<Vec<_>>());
    }

    #[test]
    fn test_window_grows_monotonically(len in 0usize..100, size in 1usize..20, steps in 0usize..12) {
        tokio_test::block_on(async {
            let list = IncrementalList::new(
                (0..len).collect::<Vec<_>>(),
                ListConfig { page_size: size, settle_delay: Duration::ZERO },
            )
            .unwrap();

            let mut previous = list.loaded_count();
            assert_eq!(previous, size.min(len));
            for _ in 0..steps {
                list.load_more().await;
                let current = list.loaded_count();
                assert!(current >= previous);
                assert!(current <= len);
                assert_eq!(list.has_more(), current < len);
                previous = current;
            }
        });
    }
}
