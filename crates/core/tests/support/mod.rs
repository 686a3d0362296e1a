//! Shared test helpers for `edgebulk-core` integration tests.
//!
//! Lightweight fakes so engine tests can focus on behaviour instead of
//! boilerplate.

#![allow(dead_code)]

pub mod directory;
pub mod probe;

use edgebulk_domain::ProgressEvent;

/// Assert the executor's progress contract: `completed` rises by exactly one
/// per event, reaches the total only on the last event, and the successful
/// count never decreases.
pub fn assert_progress_contract(events: &[ProgressEvent], total_chunks: usize) {
    assert_eq!(events.len(), total_chunks, "one event per chunk");
    let mut last_successful = 0;
    for (position, event) in events.iter().enumerate() {
        assert_eq!(event.completed_chunks, position + 1);
        assert_eq!(event.total_chunks, total_chunks);
        assert!(event.successful_count >= last_successful, "successful count went backwards");
        assert_eq!(event.is_final(), position + 1 == total_chunks);
        last_successful = event.successful_count;
    }
}
