use crate::managers::suggest::{SuggestManager, SuggestionSource, Suggestions};
use serde::Serialize;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSuggestions {
    #[serde(flatten)]
    pub suggestions: Suggestions,
    /// Generation of the term when the refresh started.
    pub requested_generation: u64,
    /// Generation of the term the matches were computed for.
    pub generation: u64,
    /// The term changed while the Candidate Set was in flight.
    pub stale: bool,
}

impl SessionSuggestions {
    pub fn is_unavailable(&self) -> bool {
        self.suggestions.source == SuggestionSource::Unavailable
    }
}

#[derive(Debug, Default)]
struct TermState {
    generation: u64,
    term: String,
}

/// Keystroke-driven view over a [`SuggestManager`].
///
/// A refresh filters with whatever term is current when the Candidate Set
/// arrives, not the term that triggered it. Superseded refreshes are not
/// cancelled; `stale` reports the mismatch.
#[derive(Clone)]
pub struct SuggestSession {
    manager: Arc<SuggestManager>,
    state: Arc<Mutex<TermState>>,
}

impl SuggestSession {
    pub fn new(manager: Arc<SuggestManager>) -> Self {
        Self {
            manager,
            state: Arc::new(Mutex::new(TermState::default())),
        }
    }

    pub fn manager(&self) -> &Arc<SuggestManager> {
        &self.manager
    }

    pub fn set_term(&self, term: &str) -> u64 {
        let mut state = self.state.lock().unwrap_or_else(|err| err.into_inner());
        state.generation += 1;
        state.term = term.to_string();
        state.generation
    }

    pub fn current_term(&self) -> (u64, String) {
        let state = self.state.lock().unwrap_or_else(|err| err.into_inner());
        (state.generation, state.term.clone())
    }

    pub async fn refresh(&self) -> SessionSuggestions {
        let (requested_generation, _) = self.current_term();
        let fetched = self.manager.candidates().await;
        let (generation, term) = self.current_term();
        let suggestions = self
            .manager
            .suggestions_from(&term, fetched, self.manager.config().limit);

        SessionSuggestions {
            suggestions,
            requested_generation,
            generation,
            stale: generation != requested_generation,
        }
    }

    pub async fn input(&self, term: &str) -> SessionSuggestions {
        self.set_term(term);
        self.refresh().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SuggestError;
    use crate::services::candidate_source::{CandidateSource, StaticCandidateSource};
    use crate::services::config::{CachePolicy, SuggestConfig};
    use crate::services::logger::Logger;
    use async_trait::async_trait;
    use tokio::sync::Notify;

    /// Holds the fetch open until released.
    struct GatedSource {
        gate: Arc<Notify>,
        started: Arc<Notify>,
    }

    #[async_trait]
    impl CandidateSource for GatedSource {
        async fn fetch(&self) -> Result<Vec<String>, SuggestError> {
            self.started.notify_one();
            self.gate.notified().await;
            Ok(vec!["parler".to_string(), "partir".to_string(), "manger".to_string()])
        }

        fn describe(&self) -> String {
            "gated".to_string()
        }
    }

    fn session_over(source: Arc<dyn CandidateSource>) -> SuggestSession {
        let manager = SuggestManager::new(
            Logger::new("test"),
            SuggestConfig::default().with_cache_policy(CachePolicy::PerQuery),
            source,
        );
        SuggestSession::new(Arc::new(manager))
    }

    #[tokio::test]
    async fn input_filters_current_term() {
        let session = session_over(Arc::new(StaticCandidateSource::new(["sein", "haben"])));
        let result = session.input("ab").await;
        assert_eq!(result.suggestions.matches, vec!["haben"]);
        assert_eq!(result.generation, 1);
        assert!(!result.stale);
        assert!(!result.is_unavailable());
    }

    #[tokio::test]
    async fn term_change_during_fetch_is_flagged_stale() {
        let gate = Arc::new(Notify::new());
        let started = Arc::new(Notify::new());
        let session = session_over(Arc::new(GatedSource {
            gate: gate.clone(),
            started: started.clone(),
        }));

        session.set_term("par");
        let in_flight = {
            let session = session.clone();
            tokio::spawn(async move { session.refresh().await })
        };
        started.notified().await;
        session.set_term("man");
        gate.notify_one();

        let result = in_flight.await.unwrap();
        assert!(result.stale);
        assert_eq!(result.requested_generation, 1);
        assert_eq!(result.generation, 2);
        assert_eq!(result.suggestions.term, "man");
        assert_eq!(result.suggestions.matches, vec!["manger"]);
    }
}
