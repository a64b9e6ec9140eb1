//! Waiting for asynchronous embedding generation.
//!
//! The store embeds documents out of band after they are written. The
//! fixed wait sleeps for a set duration and assumes the backfill has
//! converged; the poll wait probes the index build status instead.
//! Neither verifies that every inserted document has been embedded.

use std::time::{Duration, Instant};

use autovec_core::model::SearchIndexStatus;
use backon::{ExponentialBuilder, Retryable};
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};
use crate::store::SearchStore;

/// Backoff settings for polling an index's build status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    /// Delay before the second probe; later delays double up to 4x this.
    pub interval: Duration,
    /// Total number of probes, including the first.
    pub max_attempts: usize,
}

impl PollSettings {
    fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.interval)
            .with_max_delay(self.interval.saturating_mul(4))
            .with_max_times(self.max_attempts.saturating_sub(1))
    }
}

/// Configured wait mode; [`Config::wait_strategy`](crate::Config::wait_strategy)
/// turns it into a [`WaitStrategy`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaitMode {
    #[default]
    Fixed,
    Poll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitStrategy {
    /// Sleep for a fixed duration.
    Fixed(Duration),
    /// Probe the index status until it is ready or attempts run out.
    Poll(PollSettings),
}

/// What happened while waiting.
#[derive(Debug, Clone, PartialEq)]
pub enum WaitOutcome {
    Slept(Duration),
    Ready {
        status: SearchIndexStatus,
        elapsed: Duration,
    },
    /// Attempts ran out while the index was still building. The caller
    /// queries anyway; results may be incomplete.
    GaveUp { last_status: String, elapsed: Duration },
}

impl WaitOutcome {
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        match self {
            Self::Slept(elapsed) | Self::Ready { elapsed, .. } | Self::GaveUp { elapsed, .. } => {
                *elapsed
            }
        }
    }
}

impl WaitStrategy {
    /// Wait for `index` on `collection` according to this strategy.
    ///
    /// # Errors
    /// Poll mode propagates store errors other than "not ready yet",
    /// including a missing index.
    pub async fn wait<S: SearchStore + ?Sized>(
        &self,
        store: &S,
        collection: &str,
        index: &str,
    ) -> StoreResult<WaitOutcome> {
        match self {
            Self::Fixed(duration) => {
                log::info!("Sleeping {:?} for embeddings to be generated", duration);
                tokio::time::sleep(*duration).await;
                Ok(WaitOutcome::Slept(*duration))
            }
            Self::Poll(settings) => poll_until_ready(store, collection, index, settings).await,
        }
    }
}

async fn poll_until_ready<S: SearchStore + ?Sized>(
    store: &S,
    collection: &str,
    index: &str,
    settings: &PollSettings,
) -> StoreResult<WaitOutcome> {
    let started = Instant::now();

    let result = (|| store.probe_ready(collection, index))
        .retry(settings.backoff())
        .sleep(tokio::time::sleep)
        .when(StoreError::is_not_ready)
        .notify(|err, delay| log::debug!("{}; probing again in {:?}", err, delay))
        .await;

    match result {
        Ok(status) => {
            log::info!(
                "Search index '{}' is {} after {:?}",
                index,
                status.status_label(),
                started.elapsed()
            );
            Ok(WaitOutcome::Ready {
                status,
                elapsed: started.elapsed(),
            })
        }
        Err(StoreError::IndexNotReady { status, .. }) => {
            log::warn!(
                "Search index '{}' still {} after {} probes; querying anyway",
                index,
                status,
                settings.max_attempts
            );
            Ok(WaitOutcome::GaveUp {
                last_status: status,
                elapsed: started.elapsed(),
            })
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use autovec_core::model::{
        Article, IndexDefinition, SearchResults, VectorSearchQuery,
    };
    use bson::doc;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Reports a scripted sequence of index statuses, one per probe.
    #[derive(Debug)]
    struct ScriptedStatus {
        statuses: Mutex<VecDeque<Option<&'static str>>>,
        probes: Mutex<usize>,
    }

    impl ScriptedStatus {
        fn new(statuses: &[Option<&'static str>]) -> Self {
            Self {
                statuses: Mutex::new(statuses.iter().copied().collect()),
                probes: Mutex::new(0),
            }
        }

        fn probes(&self) -> usize {
            *self.probes.lock().unwrap()
        }
    }

    #[async_trait]
    impl SearchStore for ScriptedStatus {
        fn namespace(&self, collection: &str) -> String {
            format!("test.{collection}")
        }

        async fn ensure_collection(&self, _collection: &str) -> StoreResult<bool> {
            Ok(false)
        }

        async fn create_search_index(
            &self,
            _collection: &str,
            definition: &IndexDefinition,
        ) -> StoreResult<String> {
            Ok(definition.name.clone())
        }

        async fn list_search_indexes(
            &self,
            _collection: &str,
            name: Option<&str>,
        ) -> StoreResult<Vec<SearchIndexStatus>> {
            *self.probes.lock().unwrap() += 1;
            let next = self.statuses.lock().unwrap().pop_front().flatten();
            let Some(status) = next else {
                return Ok(Vec::new());
            };
            let entry = SearchIndexStatus::from_document(doc! {
                "name": name.unwrap_or("vector_index"),
                "type": "vectorSearch",
                "status": status,
                "queryable": status == "READY",
            })?;
            Ok(vec![entry])
        }

        async fn insert_articles(&self, _collection: &str, articles: &[Article]) -> StoreResult<usize> {
            Ok(articles.len())
        }

        async fn count_documents(&self, _collection: &str) -> StoreResult<u64> {
            Ok(0)
        }

        async fn vector_search(
            &self,
            _collection: &str,
            _query: &VectorSearchQuery,
        ) -> StoreResult<SearchResults> {
            Ok(SearchResults::default())
        }
    }

    fn quick_poll(max_attempts: usize) -> WaitStrategy {
        WaitStrategy::Poll(PollSettings {
            interval: Duration::from_millis(1),
            max_attempts,
        })
    }

    #[test]
    fn test_backoff_with_huge_interval() {
        let settings = PollSettings {
            interval: Duration::from_secs(u64::MAX / 2),
            max_attempts: 3,
        };
        let _ = settings.backoff();
    }

    #[tokio::test]
    async fn test_fixed_wait_sleeps() {
        let store = ScriptedStatus::new(&[]);
        let outcome = WaitStrategy::Fixed(Duration::from_millis(5))
            .wait(&store, "articles", "vector_index")
            .await
            .unwrap();
        assert_eq!(outcome, WaitOutcome::Slept(Duration::from_millis(5)));
        assert_eq!(store.probes(), 0);
    }

    #[tokio::test]
    async fn test_poll_until_ready() {
        let store = ScriptedStatus::new(&[Some("PENDING"), Some("BUILDING"), Some("READY")]);
        let outcome = quick_poll(10)
            .wait(&store, "articles", "vector_index")
            .await
            .unwrap();
        match outcome {
            WaitOutcome::Ready { status, .. } => assert!(status.is_ready()),
            other => panic!("Expected Ready, got {other:?}"),
        }
        assert_eq!(store.probes(), 3);
    }

    #[tokio::test]
    async fn test_poll_gives_up() {
        let store = ScriptedStatus::new(&[Some("BUILDING"); 5]);
        let outcome = quick_poll(3)
            .wait(&store, "articles", "vector_index")
            .await
            .unwrap();
        match outcome {
            WaitOutcome::GaveUp { last_status, .. } => assert_eq!(last_status, "BUILDING"),
            other => panic!("Expected GaveUp, got {other:?}"),
        }
        assert_eq!(store.probes(), 3);
    }

    #[tokio::test]
    async fn test_poll_missing_index_fails_fast() {
        let store = ScriptedStatus::new(&[None, Some("READY")]);
        let err = quick_poll(10)
            .wait(&store, "articles", "vector_index")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::IndexNotFound { .. }));
        assert_eq!(store.probes(), 1);
    }
}
