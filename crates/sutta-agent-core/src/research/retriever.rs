//! Retrieval that never returns a passage twice within a session

use crate::error::{AgentError, ResearchPhase, Result};
use crate::search::{Passage, PassageStore, Query};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

/// Wraps a `PassageStore`, over-fetching so that filtering out already
/// seen passages still leaves a full batch.
pub struct DeduplicatingRetriever {
    store: Arc<dyn PassageStore>,
    over_fetch_factor: f64,
    timeout: Duration,
}

impl DeduplicatingRetriever {
    pub fn new(store: Arc<dyn PassageStore>, over_fetch_factor: f64, timeout: Duration) -> Self {
        Self {
            store,
            over_fetch_factor: over_fetch_factor.max(1.0),
            timeout,
        }
    }

    /// Number of candidates requested from the store for `count` results
    pub fn fetch_size(&self, count: usize) -> usize {
        let scaled = (count as f64 * self.over_fetch_factor).ceil() as usize;
        scaled.max(count + 1)
    }

    /// Up to `count` passages for `query` that are not in `seen`.
    ///
    /// Returned ids are added to `seen`. An empty result means the corpus
    /// has nothing new for this query.
    pub async fn retrieve(
        &self,
        query: &Query,
        count: usize,
        seen: &mut HashSet<String>,
    ) -> Result<Vec<Passage>> {
        let text = query.text().trim();
        if text.is_empty() {
            return Err(AgentError::InvalidInput(
                "retrieval query must not be empty".to_string(),
            ));
        }
        if count == 0 {
            return Err(AgentError::InvalidInput(
                "retrieval count must be positive".to_string(),
            ));
        }

        let fetch = self.fetch_size(count);
        let candidates = match tokio::time::timeout(self.timeout, self.store.query(text, fetch)).await
        {
            Ok(Ok(candidates)) => candidates,
            Ok(Err(e)) => return Err(unavailable(text, e.to_string())),
            Err(_) => {
                return Err(unavailable(
                    text,
                    format!("passage store timed out after {:?}", self.timeout),
                ))
            }
        };

        let fetched = candidates.len();
        let mut batch_ids: HashSet<String> = HashSet::new();
        let fresh: Vec<Passage> = candidates
            .into_iter()
            .filter(|p| {
                !seen.contains(&p.id) && !query.is_excluded(&p.id) && batch_ids.insert(p.id.clone())
            })
            .take(count)
            .collect();

        seen.extend(fresh.iter().map(|p| p.id.clone()));

        tracing::debug!(
            "Retrieved {} new passages for {:?} ({} fetched, {} seen)",
            fresh.len(),
            text,
            fetched,
            seen.len()
        );

        Ok(fresh)
    }
}

fn unavailable(query: &str, reason: String) -> AgentError {
    AgentError::RetrievalUnavailable {
        question: query.to_string(),
        phase: ResearchPhase::Search,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use proptest::prelude::*;

    /// Returns a fixed candidate list regardless of the query
    struct FixedStore {
        passages: Vec<Passage>,
    }

    #[async_trait]
    impl PassageStore for FixedStore {
        async fn query(&self, _text: &str, k: usize) -> Result<Vec<Passage>> {
            Ok(self.passages.iter().take(k).cloned().collect())
        }
    }

    struct FailingStore;

    #[async_trait]
    impl PassageStore for FailingStore {
        async fn query(&self, _text: &str, _k: usize) -> Result<Vec<Passage>> {
            Err(AgentError::ExternalError("index offline".to_string()))
        }
    }

    struct SlowStore;

    #[async_trait]
    impl PassageStore for SlowStore {
        async fn query(&self, _text: &str, _k: usize) -> Result<Vec<Passage>> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(Vec::new())
        }
    }

    fn passages(ids: &[(&str, &str)]) -> Vec<Passage> {
        ids.iter()
            .map(|(doc, pos)| Passage::new(*doc, *pos, *doc, "text", 0.5))
            .collect()
    }

    fn retriever(store: impl PassageStore + 'static) -> DeduplicatingRetriever {
        DeduplicatingRetriever::new(Arc::new(store), 1.5, Duration::from_secs(5))
    }

    #[test]
    fn test_fetch_size() {
        let r = retriever(FailingStore);
        assert_eq!(r.fetch_size(10), 15);
        assert_eq!(r.fetch_size(1), 2);
        assert_eq!(r.fetch_size(3), 5);

        let exact = DeduplicatingRetriever::new(Arc::new(FailingStore), 1.0, Duration::from_secs(1));
        assert_eq!(exact.fetch_size(10), 11);
    }

    #[tokio::test]
    async fn test_skips_seen_and_records_new() {
        let r = retriever(FixedStore {
            passages: passages(&[("mn1", "1"), ("mn1", "2"), ("mn2", "1")]),
        });
        let mut seen: HashSet<String> = ["mn1#1".to_string()].into_iter().collect();

        let got = r.retrieve(&Query::new("q"), 2, &mut seen).await.unwrap();
        let ids: Vec<&str> = got.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["mn1#2", "mn2#1"]);
        assert!(seen.contains("mn2#1"));
        assert_eq!(seen.len(), 3);
    }

    #[tokio::test]
    async fn test_exclusions_and_in_batch_duplicates() {
        let r = retriever(FixedStore {
            passages: passages(&[("a", "1"), ("a", "1"), ("b", "1"), ("c", "1")]),
        });
        let mut seen = HashSet::new();
        let query = Query::new("q").excluding(["b#1"]);

        let got = r.retrieve(&query, 3, &mut seen).await.unwrap();
        let ids: Vec<&str> = got.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a#1", "c#1"]);
    }

    #[tokio::test]
    async fn test_exhausted_corpus_is_empty_not_error() {
        let r = retriever(FixedStore {
            passages: passages(&[("a", "1")]),
        });
        let mut seen = HashSet::new();
        assert_eq!(r.retrieve(&Query::new("q"), 5, &mut seen).await.unwrap().len(), 1);
        assert!(r.retrieve(&Query::new("q"), 5, &mut seen).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_input() {
        let r = retriever(FixedStore { passages: vec![] });
        let mut seen = HashSet::new();
        assert!(matches!(
            r.retrieve(&Query::new("   "), 5, &mut seen).await,
            Err(AgentError::InvalidInput(_))
        ));
        assert!(matches!(
            r.retrieve(&Query::new("q"), 0, &mut seen).await,
            Err(AgentError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_store_failure_is_retrieval_unavailable() {
        let r = retriever(FailingStore);
        let mut seen = HashSet::new();
        let err = r
            .retrieve(&Query::new("dependent origination"), 5, &mut seen)
            .await
            .unwrap_err();
        assert_eq!(err.phase(), Some(ResearchPhase::Search));
        assert_eq!(err.question(), Some("dependent origination"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_timeout_is_retrieval_unavailable() {
        let r = DeduplicatingRetriever::new(Arc::new(SlowStore), 1.5, Duration::from_millis(50));
        let mut seen = HashSet::new();
        let err = r.retrieve(&Query::new("q"), 5, &mut seen).await.unwrap_err();
        assert!(matches!(err, AgentError::RetrievalUnavailable { .. }));
    }

    proptest! {
        #[test]
        fn prop_retrieved_ids_never_repeat(
            ids in prop::collection::vec(0u8..40, 0..120),
            count in 1usize..12,
            rounds in 1usize..6,
        ) {
            let pool: Vec<Passage> = ids
                .iter()
                .map(|n| Passage::new(format!("doc{}", n % 7), n.to_string(), "t", "x", 0.5))
                .collect();
            let r = retriever(FixedStore { passages: pool });
            let rt = tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap();

            let mut seen = HashSet::new();
            let mut all = Vec::new();
            for _ in 0..rounds {
                let batch = rt.block_on(r.retrieve(&Query::new("q"), count, &mut seen)).unwrap();
                prop_assert!(batch.len() <= count);
                all.extend(batch.into_iter().map(|p| p.id));
            }

            let unique: HashSet<&String> = all.iter().collect();
            prop_assert_eq!(unique.len(), all.len());
            for id in &all {
                prop_assert!(seen.contains(id));
            }
        }
    }
}
