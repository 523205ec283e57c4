//! `SseTransport`: [`FrameTransport`] over HTTP Server-Sent Events.

use async_trait::async_trait;
use bytes::Bytes;
use eventsource_stream::Eventsource;
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CACHE_CONTROL};
use tracing::{info, trace, warn};

use wikistreams_core::error::StreamError;
use wikistreams_core::transport::{Frame, FrameStream, FrameTransport};

use crate::config::SseClientConfig;

/// Longest response body kept in a [`StreamError::Status`].
const BODY_SNIPPET_LEN: usize = 256;

/// Server-Sent Events transport.
///
/// A fresh HTTP client is built per `connect`, so the connection lives
/// exactly as long as the returned [`FrameStream`].
///
/// SSE is a UTF-8 text protocol. A chunk that is not valid UTF-8 is treated
/// as a protocol violation: it yields [`StreamError::Protocol`] and ends the
/// run, rather than surfacing as a per-frame decode error.
#[derive(Debug, Clone, Default)]
pub struct SseTransport {
    config: SseClientConfig,
}

impl SseTransport {
    pub fn new(config: SseClientConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SseClientConfig {
        &self.config
    }

    fn build_client(&self, url: &str) -> Result<reqwest::Client, StreamError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("text/event-stream"));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        for (name, value) in &self.config.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| StreamError::Other(format!("invalid header name {name}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| StreamError::Other(format!("invalid header value for {}: {e}", name.as_str())))?;
            headers.insert(name, value);
        }

        reqwest::Client::builder()
            .user_agent(self.config.user_agent.as_str())
            .connect_timeout(self.config.connect_timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| StreamError::Connect {
                url: url.to_string(),
                reason: e.to_string(),
            })
    }
}

#[async_trait]
impl FrameTransport for SseTransport {
    async fn connect(&self, url: &str) -> Result<FrameStream, StreamError> {
        info!(url = %url, "connecting to event stream");
        let client = self.build_client(url)?;

        let resp = client.get(url).send().await.map_err(|e| {
            warn!(url = %url, error = %e, "event stream connect failed");
            StreamError::Connect {
                url: url.to_string(),
                reason: e.to_string(),
            }
        })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(url = %url, status = status.as_u16(), "event stream rejected");
            return Err(StreamError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body: body.chars().take(BODY_SNIPPET_LEN).collect(),
            });
        }
        info!(url = %url, "event stream connected");

        let stream = resp.bytes_stream().eventsource().map(|item| match item {
            Ok(evt) => {
                trace!(event = %evt.event, id = %evt.id, len = evt.data.len(), "SSE frame");
                Ok(Frame {
                    event: evt.event,
                    id: evt.id,
                    data: Bytes::from(evt.data),
                })
            }
            Err(e) => {
                warn!(error = %e, "event stream error");
                Err(StreamError::Protocol(e.to_string()))
            }
        });

        Ok(Box::pin(stream))
    }
}
