use crate::constants::limits;
use crate::errors::SuggestError;
use crate::services::cache::{CandidateCache, CandidateOrigin};
use crate::services::candidate_source::CandidateSource;
use crate::services::config::SuggestConfig;
use crate::services::logger::Logger;
use crate::utils::filter::matches;
use crate::utils::suggest::suggest;
use crate::utils::tool_errors::unknown_action_error;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

const SUGGEST_ACTIONS: &[&str] = &["suggest", "resolve", "refresh", "stats"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionSource {
    Fetched,
    Cached,
    /// The Candidate Set could not be obtained; no suggestions are shown.
    Unavailable,
}

impl From<CandidateOrigin> for SuggestionSource {
    fn from(origin: CandidateOrigin) -> Self {
        match origin {
            CandidateOrigin::Fetched => SuggestionSource::Fetched,
            CandidateOrigin::Cached => SuggestionSource::Cached,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestions {
    pub term: String,
    pub matches: Vec<String>,
    /// Matches before the display limit was applied.
    pub total: usize,
    pub source: SuggestionSource,
}

impl Suggestions {
    fn unavailable(term: &str) -> Self {
        Self {
            term: term.to_string(),
            matches: Vec::new(),
            total: 0,
            source: SuggestionSource::Unavailable,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Resolution {
    Found { infinitive: String, url: String },
    NotFound { term: String, did_you_mean: Vec<String> },
}

#[derive(Clone)]
pub struct SuggestManager {
    logger: Logger,
    config: SuggestConfig,
    source: Arc<dyn CandidateSource>,
    cache: CandidateCache,
}

impl SuggestManager {
    pub fn new(logger: Logger, config: SuggestConfig, source: Arc<dyn CandidateSource>) -> Self {
        let logger = logger.child("suggest");
        let cache = CandidateCache::new(logger.clone(), config.cache_policy);
        Self {
            logger,
            config,
            source,
            cache,
        }
    }

    pub fn config(&self) -> &SuggestConfig {
        &self.config
    }

    pub async fn candidates(&self) -> Result<(Arc<[String]>, CandidateOrigin), SuggestError> {
        self.cache.get_or_fetch(self.source.as_ref()).await
    }

    fn log_unavailable(&self, err: &SuggestError) {
        self.logger.warn(
            "Candidate set unavailable; no suggestions",
            Some(&serde_json::json!({
                "source": self.source.describe(),
                "code": err.code,
                "error": err.message,
            })),
        );
    }

    pub async fn suggest(&self, term: &str) -> Suggestions {
        self.suggest_with_limit(term, self.config.limit).await
    }

    pub async fn suggest_with_limit(&self, term: &str, limit: Option<usize>) -> Suggestions {
        let fetched = self.candidates().await;
        self.suggestions_from(term, fetched, limit)
    }

    /// Filters an already settled fetch. A failed fetch degrades to no
    /// suggestions.
    pub(crate) fn suggestions_from(
        &self,
        term: &str,
        fetched: Result<(Arc<[String]>, CandidateOrigin), SuggestError>,
        limit: Option<usize>,
    ) -> Suggestions {
        let (candidates, origin) = match fetched {
            Ok(found) => found,
            Err(err) => {
                self.log_unavailable(&err);
                return Suggestions::unavailable(term);
            }
        };
        let suggestions = filter_into(term, &candidates, origin, limit);
        self.logger.debug(
            "Filtered candidates",
            Some(&serde_json::json!({
                "term": term,
                "total": suggestions.total,
                "shown": suggestions.matches.len(),
                "source": suggestions.source,
            })),
        );
        suggestions
    }

    /// Exact, case-insensitive lookup, as a search submission would do.
    pub async fn resolve(&self, term: &str) -> Result<Resolution, SuggestError> {
        let wanted = term.trim();
        let candidates = match self.candidates().await {
            Ok((candidates, _)) => candidates,
            Err(err) => {
                self.log_unavailable(&err);
                return Ok(Resolution::NotFound {
                    term: wanted.to_string(),
                    did_you_mean: Vec::new(),
                });
            }
        };
        let lowered = wanted.to_lowercase();
        let found = (!lowered.is_empty())
            .then(|| {
                candidates
                    .iter()
                    .find(|candidate| candidate.to_lowercase() == lowered)
            })
            .flatten();
        match found {
            Some(infinitive) => Ok(Resolution::Found {
                infinitive: infinitive.clone(),
                url: self.config.conjugation_url(infinitive)?.to_string(),
            }),
            None => Ok(Resolution::NotFound {
                term: wanted.to_string(),
                did_you_mean: suggest(wanted, &candidates, limits::DID_YOU_MEAN),
            }),
        }
    }

    pub async fn refresh(&self) -> bool {
        self.cache.invalidate().await
    }

    pub async fn stats(&self) -> Value {
        serde_json::json!({
            "source": self.source.describe(),
            "cached_candidates": self.cache.cached_len().await,
            "cache": self.cache.stats(),
            "log": self.logger.stats(),
        })
    }

    pub async fn handle_action(&self, args: Value) -> Result<Value, SuggestError> {
        let action = args.get("action").and_then(|v| v.as_str());
        match action {
            Some("suggest") => {
                let term = read_term(&args)?;
                let limit = read_limit(&args)?.unwrap_or(self.config.limit);
                serde_json::to_value(self.suggest_with_limit(&term, limit).await)
                    .map_err(|err| SuggestError::internal(err.to_string()))
            }
            Some("resolve") => {
                let term = read_term(&args)?;
                serde_json::to_value(self.resolve(&term).await?)
                    .map_err(|err| SuggestError::internal(err.to_string()))
            }
            Some("refresh") => Ok(serde_json::json!({ "dropped": self.refresh().await })),
            Some("stats") => Ok(self.stats().await),
            _ => Err(unknown_action_error("suggest", args.get("action"), SUGGEST_ACTIONS)),
        }
    }
}

fn filter_into(
    term: &str,
    candidates: &[String],
    origin: CandidateOrigin,
    limit: Option<usize>,
) -> Suggestions {
    let found = matches(term, candidates);
    let total = found.clone().count();
    let matches: Vec<String> = found
        .take(limit.unwrap_or(usize::MAX))
        .map(str::to_string)
        .collect();
    Suggestions {
        term: term.to_string(),
        matches,
        total,
        source: origin.into(),
    }
}

fn read_term(args: &Value) -> Result<String, SuggestError> {
    match args.get("term") {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(term)) => Ok(term.clone()),
        Some(_) => Err(SuggestError::invalid_params("term must be a string")),
    }
}

/// `None` when the caller left the limit out; `Some(None)` for an explicit 0,
/// which shows every match.
fn read_limit(args: &Value) -> Result<Option<Option<usize>>, SuggestError> {
    let invalid = || SuggestError::invalid_params("limit must be a non-negative integer");
    match args.get("limit") {
        None | Some(Value::Null) => Ok(None),
        Some(value) => {
            let n = value.as_u64().ok_or_else(invalid)?;
            let n = usize::try_from(n).map_err(|_| invalid())?;
            Ok(Some((n > 0).then_some(n)))
        }
    }
}
