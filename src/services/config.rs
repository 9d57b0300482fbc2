use crate::constants::{env as env_keys, network, protocols::ALLOWED_HTTP};
use crate::errors::SuggestError;
use serde::Serialize;
use std::env;
use std::str::FromStr;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CachePolicy {
    /// Fetch once and keep the Candidate Set for the lifetime of the manager.
    Session,
    /// Fetch again for every query.
    PerQuery,
}

impl FromStr for CachePolicy {
    type Err = SuggestError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_lowercase().replace('_', "-").as_str() {
            "session" | "page" => Ok(CachePolicy::Session),
            "per-query" | "query" | "none" => Ok(CachePolicy::PerQuery),
            other => Err(SuggestError::invalid_config(format!(
                "Unknown cache policy: {}",
                other
            ))
            .with_hint("Use one of: session, per-query.")),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SuggestConfig {
    #[serde(serialize_with = "serialize_url")]
    pub base_url: Url,
    pub autocomplete_path: String,
    pub timeout_ms: Option<u64>,
    pub cache_policy: CachePolicy,
    pub limit: Option<usize>,
}

fn serialize_url<S: serde::Serializer>(url: &Url, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(url.as_str())
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(network::DEFAULT_BASE_URL).expect("default base url is valid"),
            autocomplete_path: network::AUTOCOMPLETE_PATH.to_string(),
            timeout_ms: normalize_timeout(network::TIMEOUT_AUTOCOMPLETE_MS),
            cache_policy: CachePolicy::Session,
            limit: None,
        }
    }
}

fn env_value(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
}

fn normalize_timeout(ms: u64) -> Option<u64> {
    if ms == 0 {
        None
    } else {
        Some(ms)
    }
}

fn parse_number<T: FromStr>(key: &str, raw: &str) -> Result<T, SuggestError> {
    raw.trim().parse::<T>().map_err(|_| {
        SuggestError::invalid_config(format!("{} must be a non-negative integer", key))
            .with_details(serde_json::json!({ "value": raw }))
    })
}

pub fn parse_base_url(raw: &str) -> Result<Url, SuggestError> {
    let mut url = Url::parse(raw.trim()).map_err(|err| {
        SuggestError::invalid_config(format!("Invalid base URL: {}", err))
            .with_hint("Provide an absolute origin such as http://127.0.0.1:8000/.")
    })?;
    if !scheme_allowed(url.scheme()) {
        return Err(SuggestError::invalid_config(
            "Only http/https base URLs are supported",
        ));
    }
    if url.cannot_be_a_base() {
        return Err(SuggestError::invalid_config("Base URL cannot carry paths"));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

fn scheme_allowed(scheme: &str) -> bool {
    let normalized = scheme.trim_end_matches(':');
    ALLOWED_HTTP
        .iter()
        .any(|allowed| allowed.trim_end_matches(':') == normalized)
}

/// Raw, unparsed settings from one origin (environment or command line).
///
/// Layers are merged before anything is parsed, so a value that a later
/// layer replaces is never validated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigLayer {
    pub base_url: Option<String>,
    pub autocomplete_path: Option<String>,
    pub timeout_ms: Option<String>,
    pub cache: Option<String>,
    pub limit: Option<String>,
}

impl ConfigLayer {
    pub fn from_env() -> Self {
        Self {
            base_url: env_value(env_keys::BASE_URL),
            autocomplete_path: env_value(env_keys::AUTOCOMPLETE_PATH),
            timeout_ms: env_value(env_keys::TIMEOUT_MS),
            cache: env_value(env_keys::CACHE),
            limit: env_value(env_keys::LIMIT),
        }
    }

    /// Values set in `over` win.
    pub fn overlay(self, over: ConfigLayer) -> Self {
        Self {
            base_url: over.base_url.or(self.base_url),
            autocomplete_path: over.autocomplete_path.or(self.autocomplete_path),
            timeout_ms: over.timeout_ms.or(self.timeout_ms),
            cache: over.cache.or(self.cache),
            limit: over.limit.or(self.limit),
        }
    }
}

impl SuggestConfig {
    pub fn from_env() -> Result<Self, SuggestError> {
        Self::from_layer(ConfigLayer::from_env())
    }

    pub fn from_layer(layer: ConfigLayer) -> Result<Self, SuggestError> {
        let mut config = Self::default();
        if let Some(raw) = layer.base_url.as_deref() {
            config.base_url = parse_base_url(raw)?;
        }
        if let Some(raw) = layer.autocomplete_path {
            config.autocomplete_path = raw;
        }
        if let Some(raw) = layer.timeout_ms.as_deref() {
            config.timeout_ms = normalize_timeout(parse_number(env_keys::TIMEOUT_MS, raw)?);
        }
        if let Some(raw) = layer.cache.as_deref() {
            config.cache_policy = raw.parse()?;
        }
        if let Some(raw) = layer.limit.as_deref() {
            let limit: usize = parse_number(env_keys::LIMIT, raw)?;
            config.limit = if limit == 0 { None } else { Some(limit) };
        }
        config.validate()?;
        Ok(config)
    }

    pub fn with_base_url(mut self, raw: &str) -> Result<Self, SuggestError> {
        self.base_url = parse_base_url(raw)?;
        Ok(self)
    }

    pub fn with_autocomplete_path(mut self, path: impl Into<String>) -> Self {
        self.autocomplete_path = path.into();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = normalize_timeout(timeout_ms);
        self
    }

    pub fn with_cache_policy(mut self, policy: CachePolicy) -> Self {
        self.cache_policy = policy;
        self
    }

    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit.filter(|n| *n > 0);
        self
    }

    pub fn validate(&self) -> Result<(), SuggestError> {
        self.autocomplete_url().map(|_| ())
    }

    /// Absolute paths are resolved against the origin, relative ones against
    /// the base URL's path.
    pub fn autocomplete_url(&self) -> Result<Url, SuggestError> {
        let path = self.autocomplete_path.trim();
        if path.is_empty() {
            return Err(SuggestError::invalid_config("Autocomplete path is empty"));
        }
        let url = self.base_url.join(path).map_err(|err| {
            SuggestError::invalid_config(format!("Invalid autocomplete path: {}", err))
        })?;
        if !scheme_allowed(url.scheme()) || url.origin() != self.base_url.origin() {
            return Err(SuggestError::invalid_config(
                "Autocomplete path must stay on the configured origin",
            )
            .with_details(serde_json::json!({ "path": path })));
        }
        Ok(url)
    }

    pub fn conjugation_url(&self, infinitive: &str) -> Result<Url, SuggestError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SuggestError::invalid_config("Base URL cannot carry paths"))?
            .pop_if_empty()
            .push(network::CONJUGATION_SEGMENT)
            .push(infinitive)
            .push("");
        Ok(url)
    }
}
