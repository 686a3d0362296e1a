//! Integration tests for resilience module
//!
//! Exercises the concurrency gate and the retry executor together the way the
//! bulk engine composes them.

#![cfg(feature = "runtime")]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use edgebulk_common::error::CommonError;
use edgebulk_common::resilience::{
    policies, ConcurrencyGate, GateConfig, RetryConfig, RetryError, RetryExecutor,
};

/// Validates retry recovery from transient failures with a fixed backoff.
///
/// # Test Steps
/// 1. Configure two retries with a 5ms fixed backoff
/// 2. Fail the first two attempts
/// 3. Succeed on the third attempt
/// 4. Verify attempts and accumulated delay
#[tokio::test(flavor = "multi_thread")]
async fn test_fixed_backoff_recovers_on_last_attempt() {
    let attempt_count = Arc::new(AtomicU32::new(0));
    let executor =
        RetryExecutor::new(RetryConfig::fixed(2, Duration::from_millis(5)), policies::AlwaysRetry);

    let outcome = executor
        .execute_with_outcome(|| {
            let attempt_count = Arc::clone(&attempt_count);
            async move {
                let n = attempt_count.fetch_add(1, Ordering::SeqCst) + 1;
                if n < 3 {
                    Err(CommonError::backend("zones", "503", true))
                } else {
                    Ok(n)
                }
            }
        })
        .await;

    assert_eq!(outcome.attempts, 3);
    assert_eq!(outcome.total_delay, Duration::from_millis(10));
    assert_eq!(outcome.into_result().unwrap(), 3);
}

/// Validates that the classified policy stops immediately on a permanent
/// error and honours the retry-after hint on rate limiting.
///
/// # Test Steps
/// 1. Run an operation that fails with a non-retryable backend error
/// 2. Verify a single attempt and a `NonRetryable` error
/// 3. Run an operation that is rate limited once with a 1ms hint
/// 4. Verify it succeeds on the second attempt
#[tokio::test]
async fn test_classified_policy() {
    let executor = RetryExecutor::new(
        RetryConfig::fixed(5, Duration::from_secs(60)),
        policies::ClassifiedRetry,
    );

    let result: Result<(), _> =
        executor.execute(|| async { Err(CommonError::backend("kv", "400", false)) }).await;
    assert!(matches!(result, Err(RetryError::NonRetryable { attempts: 1, .. })));

    let calls = Arc::new(AtomicU32::new(0));
    let started = Instant::now();
    let value = executor
        .execute(|| {
            let calls = Arc::clone(&calls);
            async move {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(CommonError::rate_limit(Some(Duration::from_millis(1))))
                } else {
                    Ok("done")
                }
            }
        })
        .await
        .unwrap();

    assert_eq!(value, "done");
    assert!(started.elapsed() < Duration::from_secs(5), "retry-after hint was ignored");
}

/// Validates that a gate shared across many tasks bounds in-flight work.
///
/// # Test Steps
/// 1. Create a gate admitting 4 operations
/// 2. Spawn 40 tasks that each hold the permit briefly
/// 3. Track the observed maximum inside the operation
/// 4. Verify the maximum never exceeds 4 and all tasks complete
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_gate_bounds_parallel_tasks() {
    let gate = ConcurrencyGate::new(GateConfig::new(4));
    let current = Arc::new(AtomicU32::new(0));
    let observed_max = Arc::new(AtomicU32::new(0));

    let mut handles = Vec::new();
    for _ in 0..40 {
        let gate = gate.clone();
        let current = Arc::clone(&current);
        let observed_max = Arc::clone(&observed_max);
        handles.push(tokio::spawn(async move {
            gate.run(|| async move {
                let now = current.fetch_add(1, Ordering::SeqCst) + 1;
                observed_max.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(2)).await;
                current.fetch_sub(1, Ordering::SeqCst);
            })
            .await
        }));
    }

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert!(observed_max.load(Ordering::SeqCst) <= 4);
    let metrics = gate.metrics();
    assert_eq!(metrics.total_admitted, 40);
    assert!(metrics.peak_in_flight <= 4);
    assert_eq!(metrics.in_flight, 0);
}
