//! SSE client configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for [`SseTransport`](crate::SseTransport).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SseClientConfig {
    /// Sent as `User-Agent`; Wikimedia asks clients to identify themselves
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Time allowed to establish the TCP/TLS connection. The stream itself
    /// has no read timeout.
    #[serde(default = "default_connect_timeout", with = "duration_secs")]
    pub connect_timeout: Duration,
    /// Extra request headers (name, value)
    #[serde(default)]
    pub headers: Vec<(String, String)>,
}

fn default_user_agent() -> String {
    format!("wikistreams/{}", env!("CARGO_PKG_VERSION"))
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(30)
}

impl Default for SseClientConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            connect_timeout: default_connect_timeout(),
            headers: vec![],
        }
    }
}

impl SseClientConfig {
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(d)?))
    }
}
