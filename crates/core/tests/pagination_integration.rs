//! Integration tests for the pagination engine's safety stops and retries.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use edgebulk_core::pagination::{collect_all, PaginationError, Paginator};
use edgebulk_domain::{Page, PaginationConfig, StopReason};

fn config() -> PaginationConfig {
    PaginationConfig::default().with_retries(3, Duration::from_millis(2))
}

/// Validates loop detection.
///
/// # Test Steps
/// 1. Fetch always returns the same non-empty cursor
/// 2. Verify the run stops after the cursor is observed a second time
/// 3. Verify the stop carries a warning naming the cursor
#[tokio::test]
async fn test_repeated_cursor_stops_with_warning() {
    let paginator = Paginator::new(config());
    let (items, summary) = collect_all(&paginator, |_cursor| async {
        Ok::<_, String>(Page::new(vec!["key"], "same"))
    })
    .await
    .unwrap();

    assert_eq!(summary.pages_fetched, 2);
    assert_eq!(items.len(), 2);
    assert_eq!(summary.stop_reason, StopReason::CursorLoop { cursor: "same".to_string() });
    assert!(summary.warning().unwrap().contains("same"));
}

/// A cursor cycle longer than one page is detected too.
#[tokio::test]
async fn test_cursor_cycle_detected() {
    let paginator = Paginator::new(config());
    let (_, summary) = collect_all(&paginator, |cursor: String| async move {
        let next = match cursor.as_str() {
            "" | "b" => "a",
            _ => "b",
        };
        Ok::<_, String>(Page::new(vec![cursor], next))
    })
    .await
    .unwrap();

    // "" -> a, a -> b, b -> a (seen)
    assert_eq!(summary.pages_fetched, 3);
    assert_eq!(summary.stop_reason, StopReason::CursorLoop { cursor: "a".to_string() });
}

/// Validates retry exhaustion.
///
/// # Test Steps
/// 1. Configure 3 retries
/// 2. Make every fetch fail
/// 3. Verify exactly 4 attempts and a `FetchFailed` error for page 1
#[tokio::test]
async fn test_retry_exhaustion_is_fatal() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&attempts);
    let paginator = Paginator::new(config());

    let err = collect_all(&paginator, move |_cursor| {
        let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
        async move { Err::<Page<u8>, _>(format!("connection reset #{n}")) }
    })
    .await
    .unwrap_err();

    assert_eq!(attempts.load(Ordering::SeqCst), 4);
    match err {
        PaginationError::FetchFailed { page, attempts, source } => {
            assert_eq!(page, 1);
            assert_eq!(attempts, 4);
            assert_eq!(source, "connection reset #4");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

/// A later page failing after earlier pages succeeded still aborts.
#[tokio::test]
async fn test_fetch_failure_on_later_page() {
    let paginator = Paginator::new(PaginationConfig::default().with_retries(0, Duration::ZERO));
    let mut processed = Vec::new();

    let err = paginator
        .run(
            |cursor: String| async move {
                if cursor.is_empty() {
                    Ok(Page::new(vec![1, 2], "next"))
                } else {
                    Err("gateway timeout".to_string())
                }
            },
            |items| {
                processed.extend(items);
                Ok(())
            },
        )
        .await
        .unwrap_err();

    assert_eq!(processed, vec![1, 2]);
    assert!(matches!(err, PaginationError::FetchFailed { page: 2, attempts: 1, .. }));
}

/// Validates the page limit.
///
/// # Test Steps
/// 1. Fetch an endless listing with a page limit of 5
/// 2. Verify exactly 5 pages were fetched and a warning is reported
#[tokio::test]
async fn test_page_limit_stops_after_exact_count() {
    let fetches = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&fetches);
    let paginator = Paginator::new(config().with_page_limit(5));

    let (items, summary) = collect_all(&paginator, move |_cursor| {
        let n = counter.fetch_add(1, Ordering::SeqCst);
        async move { Ok::<_, String>(Page::new(vec![n], format!("cursor-{n}"))) }
    })
    .await
    .unwrap();

    assert_eq!(fetches.load(Ordering::SeqCst), 5);
    assert_eq!(items, vec![0, 1, 2, 3, 4]);
    assert_eq!(summary.stop_reason, StopReason::PageLimitReached);
    assert!(summary.warning().is_some());
}

/// Validates the wall-clock timeout.
///
/// # Test Steps
/// 1. Fetch an endless listing where each page takes 20ms, with a 50ms budget
/// 2. Verify the run stops with `TimedOut`, partial items and a warning
#[tokio::test]
async fn test_timeout_returns_partial_results() {
    let paginator = Paginator::new(config().with_timeout(Duration::from_millis(50)));
    let fetches = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&fetches);

    let (items, summary) = collect_all(&paginator, move |_cursor| {
        let n = counter.fetch_add(1, Ordering::SeqCst);
        async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok::<_, String>(Page::new(vec![n], format!("cursor-{n}")))
        }
    })
    .await
    .unwrap();

    assert_eq!(summary.stop_reason, StopReason::TimedOut);
    assert!(summary.pages_fetched >= 2);
    assert_eq!(items.len(), summary.pages_fetched);
    assert!(summary.elapsed >= Duration::from_millis(50));
    assert!(summary.warning().unwrap().contains("timed out"));
}

/// Termination order: the page limit is checked before the completion flag.
#[tokio::test]
async fn test_page_limit_checked_before_completion() {
    let paginator = Paginator::new(config().with_page_limit(1));
    let (_, summary) =
        collect_all(&paginator, |_cursor| async { Ok::<_, String>(Page::last(vec![1])) })
            .await
            .unwrap();

    assert_eq!(summary.stop_reason, StopReason::PageLimitReached);
}
