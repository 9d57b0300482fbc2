use crate::errors::SuggestError;
use crate::services::candidate_source::CandidateSource;
use crate::services::config::CachePolicy;
use crate::services::logger::Logger;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use tokio::sync::Mutex as AsyncMutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateOrigin {
    Fetched,
    Cached,
}

/// Page-lifetime holder of the Candidate Set.
///
/// Under `Session` policy the slot lock is held across the fetch, so
/// concurrent first lookups share one request. Failed fetches are never
/// stored.
#[derive(Clone)]
pub struct CandidateCache {
    logger: Logger,
    policy: CachePolicy,
    slot: Arc<AsyncMutex<Option<Arc<[String]>>>>,
    stats: Arc<Mutex<CacheStats>>,
}

#[derive(Default)]
struct CacheStats {
    hits: u64,
    misses: u64,
    fetches: u64,
    failures: u64,
}

impl CandidateCache {
    pub fn new(logger: Logger, policy: CachePolicy) -> Self {
        Self {
            logger: logger.child("cache"),
            policy,
            slot: Arc::new(AsyncMutex::new(None)),
            stats: Arc::new(Mutex::new(CacheStats::default())),
        }
    }

    pub async fn get_or_fetch(
        &self,
        source: &dyn CandidateSource,
    ) -> Result<(Arc<[String]>, CandidateOrigin), SuggestError> {
        if self.policy == CachePolicy::PerQuery {
            self.bump(|s| s.misses += 1);
            let fetched = self.fetch(source).await?;
            return Ok((fetched, CandidateOrigin::Fetched));
        }

        let mut slot = self.slot.lock().await;
        if let Some(existing) = slot.as_ref() {
            self.bump(|s| s.hits += 1);
            return Ok((existing.clone(), CandidateOrigin::Cached));
        }
        self.bump(|s| s.misses += 1);
        let fetched = self.fetch(source).await?;
        *slot = Some(fetched.clone());
        Ok((fetched, CandidateOrigin::Fetched))
    }

    async fn fetch(&self, source: &dyn CandidateSource) -> Result<Arc<[String]>, SuggestError> {
        self.bump(|s| s.fetches += 1);
        match source.fetch().await {
            Ok(candidates) => Ok(Arc::from(candidates)),
            Err(err) => {
                self.bump(|s| s.failures += 1);
                Err(err)
            }
        }
    }

    pub async fn invalidate(&self) -> bool {
        let dropped = self.slot.lock().await.take().is_some();
        if dropped {
            self.logger.debug("Dropped cached candidate set", None);
        }
        dropped
    }

    pub async fn cached_len(&self) -> Option<usize> {
        self.slot.lock().await.as_ref().map(|set| set.len())
    }

    fn bump(&self, update: impl FnOnce(&mut CacheStats)) {
        if let Ok(mut stats) = self.stats.lock() {
            update(&mut stats);
        }
    }

    pub fn stats(&self) -> serde_json::Value {
        let stats = self.stats.lock().unwrap_or_else(|err| err.into_inner());
        serde_json::json!({
            "policy": self.policy,
            "hits": stats.hits,
            "misses": stats.misses,
            "fetches": stats.fetches,
            "failures": stats.failures,
        })
    }
}
