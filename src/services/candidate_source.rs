use crate::constants::{limits, network};
use crate::errors::SuggestError;
use crate::services::config::SuggestConfig;
use crate::services::logger::Logger;
use crate::utils::text::body_preview;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::{Duration, Instant};
use url::Url;

/// Where the Candidate Set comes from.
#[async_trait]
pub trait CandidateSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<String>, SuggestError>;

    fn describe(&self) -> String;
}

/// Fixed list, for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticCandidateSource {
    candidates: Vec<String>,
}

impl StaticCandidateSource {
    pub fn new<I, S>(candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            candidates: candidates.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl CandidateSource for StaticCandidateSource {
    async fn fetch(&self) -> Result<Vec<String>, SuggestError> {
        Ok(self.candidates.clone())
    }

    fn describe(&self) -> String {
        format!("static({} candidates)", self.candidates.len())
    }
}

/// `GET <base_url><autocomplete_path>` returning a JSON array of strings.
#[derive(Clone)]
pub struct HttpCandidateSource {
    logger: Logger,
    client: Client,
    url: Url,
    timeout_ms: Option<u64>,
}

impl HttpCandidateSource {
    pub fn new(logger: Logger, config: &SuggestConfig) -> Result<Self, SuggestError> {
        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::limited(network::MAX_REDIRECTS))
            .build()
            .map_err(|err| {
                SuggestError::internal(format!("Failed to build HTTP client: {}", err))
            })?;
        Ok(Self {
            logger: logger.child("source"),
            client,
            url: config.autocomplete_url()?,
            timeout_ms: config.timeout_ms,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl CandidateSource for HttpCandidateSource {
    async fn fetch(&self) -> Result<Vec<String>, SuggestError> {
        let started = Instant::now();
        let mut req = self
            .client
            .get(self.url.clone())
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(timeout_ms) = self.timeout_ms {
            req = req.timeout(Duration::from_millis(timeout_ms));
        }

        let response = req.send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(SuggestError::status(status.as_u16())
                .with_details(serde_json::json!({
                    "status": status.as_u16(),
                    "url": self.url.as_str(),
                })));
        }

        let body = response.bytes().await?;
        let candidates = parse_candidates(&body).unwrap_or_else(|| {
            self.logger.warn(
                "Autocomplete body is not a JSON array of strings; using an empty set",
                Some(&serde_json::json!({
                    "url": self.url.as_str(),
                    "bytes": body.len(),
                    "preview": body_preview(&body, limits::BODY_PREVIEW_BYTES),
                })),
            );
            Vec::new()
        });

        self.logger.debug(
            "Fetched candidate set",
            Some(&serde_json::json!({
                "url": self.url.as_str(),
                "count": candidates.len(),
                "duration_ms": started.elapsed().as_millis() as u64,
            })),
        );
        Ok(candidates)
    }

    fn describe(&self) -> String {
        self.url.to_string()
    }
}

/// `None` when the body is not a JSON array of strings. An empty body is an
/// empty set.
pub fn parse_candidates(body: &[u8]) -> Option<Vec<String>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Some(Vec::new());
    }
    match serde_json::from_slice::<Value>(body).ok()? {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(text) => Some(text),
                _ => None,
            })
            .collect(),
        _ => None,
    }
}
