//! Stream configuration.

use serde::{Deserialize, Serialize};

/// Base URL of the public Wikimedia EventStreams service.
pub const DEFAULT_ENDPOINT: &str = "https://stream.wikimedia.org/v2/stream/";

const ENV_ENDPOINT: &str = "WIKISTREAMS_ENDPOINT";
const ENV_SINCE: &str = "WIKISTREAMS_SINCE";
const ENV_ORIGIN: &str = "WIKISTREAMS_ORIGIN";

/// Connection settings shared by every stream kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Base URL; the stream's path segment is appended verbatim
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// ISO 8601 resume cursor, sent once as `?since=`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub since: Option<String>,
    /// Glob-style domain filter, e.g. "*.wikipedia.org"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_filter: Option<String>,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            since: None,
            origin_filter: None,
        }
    }
}

impl StreamConfig {
    /// Defaults overridden by `WIKISTREAMS_ENDPOINT`, `WIKISTREAMS_SINCE`
    /// and `WIKISTREAMS_ORIGIN` when set and non-empty.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let mut config = Self::default();
        if let Some(endpoint) = get(ENV_ENDPOINT) {
            config.endpoint = endpoint;
        }
        config.since = get(ENV_SINCE);
        config.origin_filter = get(ENV_ORIGIN);
        config
    }
}
