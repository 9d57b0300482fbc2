pub mod network {
    pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/";
    pub const AUTOCOMPLETE_PATH: &str = "/autocomplete";
    pub const CONJUGATION_SEGMENT: &str = "conjugation";
    pub const MAX_REDIRECTS: usize = 10;
    /// Zero disables the per-request timeout.
    pub const TIMEOUT_AUTOCOMPLETE_MS: u64 = 0;
}

pub mod limits {
    pub const DID_YOU_MEAN: usize = 5;
    pub const NEAR_MISS_SCAN: usize = 2_000;
    pub const BODY_PREVIEW_BYTES: usize = 120;
    pub const KNOWN_ACTIONS_SHOWN: usize = 24;
}

pub mod protocols {
    pub const ALLOWED_HTTP: &[&str] = &["http:", "https:"];
}

pub mod env {
    pub const BASE_URL: &str = "VERBSUGGEST_BASE_URL";
    pub const AUTOCOMPLETE_PATH: &str = "VERBSUGGEST_AUTOCOMPLETE_PATH";
    pub const TIMEOUT_MS: &str = "VERBSUGGEST_TIMEOUT_MS";
    pub const CACHE: &str = "VERBSUGGEST_CACHE";
    pub const LIMIT: &str = "VERBSUGGEST_LIMIT";
    pub const LOG_LEVEL: &str = "VERBSUGGEST_LOG_LEVEL";
    pub const LOG_LEVEL_FALLBACK: &str = "LOG_LEVEL";
}
