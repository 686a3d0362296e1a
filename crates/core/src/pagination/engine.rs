//! Pagination state machine

use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::time::Instant;

use edgebulk_common::resilience::{policies, RetryConfig, RetryError, RetryExecutor};
use edgebulk_domain::{EdgeBulkError, Page, PaginationConfig, PaginationSummary, StopReason};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// Hard failures that abort a pagination run
#[derive(Debug, Error)]
pub enum PaginationError<E> {
    /// Fetching a page failed on every attempt
    #[error("fetching page {page} failed after {attempts} attempts: {source}")]
    FetchFailed { page: usize, attempts: u32, source: E },

    /// The page processor rejected a page
    #[error("processing page {page} failed: {source}")]
    ProcessFailed { page: usize, source: E },

    /// The paginator settings cannot be turned into a retry configuration
    #[error("invalid pagination configuration: {message}")]
    InvalidConfiguration { message: String },
}

impl<E> PaginationError<E> {
    /// One-based number of the page the run failed on, if any
    pub fn page(&self) -> Option<usize> {
        match self {
            Self::FetchFailed { page, .. } | Self::ProcessFailed { page, .. } => Some(*page),
            Self::InvalidConfiguration { .. } => None,
        }
    }

    /// Consume the error and return the fetch or process error, if any
    pub fn into_source(self) -> Option<E> {
        match self {
            Self::FetchFailed { source, .. } | Self::ProcessFailed { source, .. } => Some(source),
            Self::InvalidConfiguration { .. } => None,
        }
    }
}

impl From<PaginationError<EdgeBulkError>> for EdgeBulkError {
    fn from(err: PaginationError<EdgeBulkError>) -> Self {
        match err {
            PaginationError::FetchFailed { source, .. }
            | PaginationError::ProcessFailed { source, .. } => source,
            PaginationError::InvalidConfiguration { message } => Self::Config(message),
        }
    }
}

/// Drives cursor-paginated listings.
#[derive(Debug, Clone, Default)]
pub struct Paginator {
    config: PaginationConfig,
}

impl Paginator {
    /// Paginator running with `config`.
    pub fn new(config: PaginationConfig) -> Self {
        Self { config }
    }

    /// Stop and retry settings in use.
    pub fn config(&self) -> &PaginationConfig {
        &self.config
    }

    /// Fetch pages starting from the empty cursor, handing each page's items
    /// to `process` in page order.
    ///
    /// After every page the run stops on, in order: timeout, page limit, the
    /// page's completion flag, an empty next cursor, or a cursor already
    /// seen in this run.
    #[instrument(
        name = "paginate",
        skip_all,
        fields(page_limit = ?self.config.page_limit, timeout = ?self.config.timeout)
    )]
    pub async fn run<T, E, F, Fut, P>(
        &self,
        mut fetch: F,
        mut process: P,
    ) -> Result<PaginationSummary, PaginationError<E>>
    where
        E: fmt::Debug,
        F: FnMut(String) -> Fut,
        Fut: Future<Output = Result<Page<T>, E>>,
        P: FnMut(Vec<T>) -> Result<(), E>,
    {
        let started = Instant::now();
        let retry = RetryExecutor::new(
            RetryConfig::fixed(self.config.max_retries, self.config.retry_backoff),
            policies::AlwaysRetry,
        );

        let mut seen_cursors: HashSet<String> = HashSet::new();
        let mut cursor = String::new();
        let mut pages_fetched = 0usize;
        let mut items_processed = 0usize;
        let mut retries = 0u32;

        let stop_reason = loop {
            let page_number = pages_fetched + 1;
            let outcome = retry.execute_with_outcome(|| fetch(cursor.clone())).await;
            retries += outcome.retries();

            let page = outcome.result.map_err(|err| match err {
                RetryError::AttemptsExhausted { attempts, source }
                | RetryError::NonRetryable { attempts, source } => {
                    PaginationError::FetchFailed { page: page_number, attempts, source }
                }
                RetryError::InvalidConfiguration { message } => {
                    PaginationError::InvalidConfiguration { message }
                }
            })?;

            let Page { items, next_cursor, is_complete } = page;
            let item_count = items.len();
            process(items)
                .map_err(|source| PaginationError::ProcessFailed { page: page_number, source })?;

            pages_fetched = page_number;
            items_processed += item_count;
            debug!(page = page_number, items = item_count, next_cursor = %next_cursor, "page processed");

            if self.config.timeout.is_some_and(|timeout| started.elapsed() >= timeout) {
                break StopReason::TimedOut;
            }
            if self.config.page_limit.is_some_and(|limit| pages_fetched >= limit) {
                break StopReason::PageLimitReached;
            }
            if is_complete {
                break StopReason::Completed;
            }
            if next_cursor.is_empty() {
                break StopReason::CursorExhausted;
            }
            if !seen_cursors.insert(next_cursor.clone()) {
                break StopReason::CursorLoop { cursor: next_cursor };
            }
            cursor = next_cursor;
        };

        let summary = PaginationSummary {
            pages_fetched,
            items_processed,
            retries,
            elapsed: started.elapsed(),
            stop_reason,
        };

        match summary.warning() {
            Some(warning) => warn!(pages = pages_fetched, items = items_processed, "{warning}"),
            None => {
                info!(pages = pages_fetched, items = items_processed, retries, "pagination finished");
            }
        }
        Ok(summary)
    }
}

/// Fetch every page and collect the items into one vector.
pub async fn collect_all<T, E, F, Fut>(
    paginator: &Paginator,
    fetch: F,
) -> Result<(Vec<T>, PaginationSummary), PaginationError<E>>
where
    E: fmt::Debug,
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<Page<T>, E>>,
{
    let mut collected = Vec::new();
    let summary = paginator
        .run(fetch, |items| {
            collected.extend(items);
            Ok(())
        })
        .await?;
    Ok((collected, summary))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn quick(config: PaginationConfig) -> Paginator {
        let retries = config.max_retries;
        Paginator::new(config.with_retries(retries, Duration::from_millis(1)))
    }

    #[tokio::test]
    async fn follows_cursors_until_exhausted() {
        let paginator = quick(PaginationConfig::default());
        let mut requested = Vec::new();

        let (items, summary) = collect_all(&paginator, |cursor: String| {
            requested.push(cursor.clone());
            async move {
                Ok::<_, String>(match cursor.as_str() {
                    "" => Page::new(vec![1, 2], "c1"),
                    "c1" => Page::new(vec![3], "c2"),
                    _ => Page::new(vec![4], ""),
                })
            }
        })
        .await
        .unwrap();

        assert_eq!(items, vec![1, 2, 3, 4]);
        assert_eq!(requested, vec!["", "c1", "c2"]);
        assert_eq!(summary.pages_fetched, 3);
        assert_eq!(summary.stop_reason, StopReason::CursorExhausted);
        assert!(summary.warning().is_none());
    }

    #[tokio::test]
    async fn completion_flag_wins_over_cursor() {
        let paginator = quick(PaginationConfig::default());
        let (_, summary) = collect_all(&paginator, |_cursor| async {
            Ok::<_, String>(Page { items: vec![1], next_cursor: "more".into(), is_complete: true })
        })
        .await
        .unwrap();

        assert_eq!(summary.stop_reason, StopReason::Completed);
        assert_eq!(summary.pages_fetched, 1);
    }

    #[tokio::test]
    async fn processing_error_aborts() {
        let paginator = quick(PaginationConfig::default());
        let err = paginator
            .run(
                |cursor: String| async move {
                    if cursor.is_empty() {
                        Ok::<_, String>(Page::new(vec![1], "next"))
                    } else {
                        Ok(Page::last(vec![2]))
                    }
                },
                |items: Vec<i32>| if items == vec![2] { Err("bad page".to_string()) } else { Ok(()) },
            )
            .await
            .unwrap_err();

        assert_eq!(err.page(), Some(2));
        assert!(matches!(err, PaginationError::ProcessFailed { .. }));
        assert_eq!(err.into_source().as_deref(), Some("bad page"));
    }

    #[tokio::test]
    async fn transient_fetch_errors_are_retried() {
        let paginator = quick(PaginationConfig::default());
        let mut calls = 0;

        let (items, summary) = collect_all(&paginator, |_cursor| {
            calls += 1;
            let attempt = calls;
            async move {
                if attempt < 3 {
                    Err(format!("timeout {attempt}"))
                } else {
                    Ok(Page::last(vec!["k"]))
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(items, vec!["k"]);
        assert_eq!(summary.retries, 2);
        assert_eq!(calls, 3);
    }
}
