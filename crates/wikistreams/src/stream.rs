//! `StreamCore` and the typed `EventStream` built on it.

use futures::StreamExt;
use std::marker::PhantomData;
use tracing::{debug, trace};
use url::form_urlencoded;

use wikistreams_core::{
    FilterError, Frame, FrameError, FrameTransport, OriginFilter, StreamError, Validator,
};
use wikistreams_sse::SseTransport;

use crate::config::{StreamConfig, DEFAULT_ENDPOINT};
use crate::dispatch::{classify, Outcome};
use crate::kind::{RecentChanges, StreamKind};

/// Connection settings plus the transport that serves them.
///
/// Configuration methods take `&mut self` and `run` takes `&self`, so a
/// stream cannot be reconfigured while it is running. Changes made after
/// `run` returns apply to the next `run`.
pub struct StreamCore<T = SseTransport> {
    endpoint: String,
    since: Option<String>,
    origin: Option<OriginFilter>,
    transport: T,
}

impl<T: FrameTransport> StreamCore<T> {
    pub fn new(transport: T) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            since: None,
            origin: None,
            transport,
        }
    }

    /// Build from `config`, compiling its origin filter if present.
    pub fn from_config(config: &StreamConfig, transport: T) -> Result<Self, FilterError> {
        let mut core = Self::new(transport);
        core.set_endpoint(config.endpoint.as_str());
        if let Some(since) = &config.since {
            core.resume_since(since.as_str());
        }
        if let Some(pattern) = &config.origin_filter {
            core.filter_by_origin(pattern.as_str())?;
        }
        Ok(core)
    }

    /// Override the base URL. Not validated; a bad URL fails at `run`.
    /// An empty string restores the default endpoint.
    pub fn set_endpoint(&mut self, url: impl Into<String>) -> &mut Self {
        self.endpoint = url.into();
        self
    }

    /// Only deliver events whose `meta.domain` matches `pattern`, either a
    /// literal domain ("en.wikipedia.org") or a masked one ("*.wikibooks.org").
    /// On error the previous filter is kept.
    pub fn filter_by_origin(&mut self, pattern: impl Into<String>) -> Result<&mut Self, FilterError> {
        self.origin = Some(OriginFilter::compile(pattern)?);
        Ok(self)
    }

    /// Start reading from an ISO 8601 timestamp in the past, typically the
    /// `meta.dt` of the last event handled before a disconnect.
    pub fn resume_since(&mut self, timestamp: impl Into<String>) -> &mut Self {
        self.since = Some(timestamp.into());
        self
    }

    pub fn endpoint(&self) -> &str {
        if self.endpoint.is_empty() {
            DEFAULT_ENDPOINT
        } else {
            &self.endpoint
        }
    }

    pub fn origin_filter(&self) -> Option<&OriginFilter> {
        self.origin.as_ref()
    }

    pub fn since(&self) -> Option<&str> {
        self.since.as_deref()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Full request URL for the stream at `path`.
    pub fn request_url(&self, path: &str) -> String {
        let mut url = format!("{}{}", self.endpoint(), path);
        if let Some(since) = &self.since {
            url.push_str("?since=");
            url.extend(form_urlencoded::byte_serialize(since.as_bytes()));
        }
        url
    }

    /// Connect to `path` and call `on_frame` for every non-empty frame until
    /// the connection ends. Returns `Ok(())` on a clean close and the
    /// transport's error otherwise. The connection is released on return.
    pub async fn run<F>(
        &self,
        path: &str,
        expected_schema: &str,
        mut on_frame: F,
    ) -> Result<(), StreamError>
    where
        F: FnMut(&Frame, &Validator<'_>),
    {
        let url = self.request_url(path);
        let validator = Validator::new(expected_schema, self.origin.as_ref());
        let mut frames = self.transport.connect(&url).await?;

        while let Some(item) = frames.next().await {
            let frame = item?;
            if frame.is_empty() {
                trace!("skipping empty frame");
                continue;
            }
            on_frame(&frame, &validator);
        }

        debug!(url = %url, "event stream closed");
        Ok(())
    }
}

/// A stream bound to one feed kind `K`.
pub struct EventStream<K: StreamKind, T = SseTransport> {
    core: StreamCore<T>,
    _kind: PhantomData<fn() -> K>,
}

/// Stream of every change on every Wikimedia wiki.
pub type RecentChangesStream<T = SseTransport> = EventStream<RecentChanges, T>;

impl<K: StreamKind> EventStream<K, SseTransport> {
    /// Stream with default settings over the SSE transport.
    pub fn new() -> Self {
        Self::with_transport(SseTransport::default())
    }

    pub fn from_config(config: &StreamConfig) -> Result<Self, FilterError> {
        Self::from_config_with_transport(config, SseTransport::default())
    }
}

impl<K: StreamKind> Default for EventStream<K, SseTransport> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: StreamKind, T: FrameTransport> EventStream<K, T> {
    pub fn with_transport(transport: T) -> Self {
        Self {
            core: StreamCore::new(transport),
            _kind: PhantomData,
        }
    }

    pub fn from_config_with_transport(config: &StreamConfig, transport: T) -> Result<Self, FilterError> {
        Ok(Self {
            core: StreamCore::from_config(config, transport)?,
            _kind: PhantomData,
        })
    }

    /// See [`StreamCore::set_endpoint`].
    pub fn set_endpoint(&mut self, url: impl Into<String>) -> &mut Self {
        self.core.set_endpoint(url);
        self
    }

    /// See [`StreamCore::filter_by_origin`].
    pub fn filter_by_origin(&mut self, pattern: impl Into<String>) -> Result<&mut Self, FilterError> {
        self.core.filter_by_origin(pattern)?;
        Ok(self)
    }

    /// See [`StreamCore::resume_since`].
    pub fn resume_since(&mut self, timestamp: impl Into<String>) -> &mut Self {
        self.core.resume_since(timestamp);
        self
    }

    pub fn core(&self) -> &StreamCore<T> {
        &self.core
    }

    pub fn request_url(&self) -> String {
        self.core.request_url(K::PATH)
    }

    /// Connect and process events until the connection ends.
    ///
    /// Each frame is decoded and validated before the next one is read.
    /// `receive` gets every accepted event, `handle_error` every decode
    /// failure or schema mismatch; neither stops the stream. Events from
    /// domains rejected by the origin filter are dropped silently.
    ///
    /// Returns the terminal connection error, or `Ok(())` if the server
    /// closed the stream. No reconnect is attempted; to cancel, drop the
    /// future (e.g. from `tokio::select!`), which closes the connection.
    pub async fn run<R, H>(&self, mut receive: R, mut handle_error: H) -> Result<(), StreamError>
    where
        R: FnMut(&K::Event),
        H: FnMut(FrameError),
    {
        self.core
            .run(K::PATH, K::SCHEMA, |frame, validator| {
                match classify::<K::Event>(&frame.data, validator) {
                    Outcome::Accepted(event) => receive(&event),
                    Outcome::Rejected(err) => handle_error(err),
                    Outcome::Dropped => trace!("event dropped by origin filter"),
                }
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_url() {
        let stream = RecentChangesStream::new();
        assert_eq!(stream.core().since(), None);
        assert!(stream.core().transport().config().user_agent.starts_with("wikistreams/"));
        assert_eq!(
            stream.request_url(),
            "https://stream.wikimedia.org/v2/stream/recentchange"
        );
    }

    #[test]
    fn since_is_percent_encoded() {
        let mut stream = RecentChangesStream::new();
        stream.resume_since("2023-01-01T00:00:00Z");
        assert_eq!(stream.core().since(), Some("2023-01-01T00:00:00Z"));
        assert_eq!(
            stream.request_url(),
            "https://stream.wikimedia.org/v2/stream/recentchange?since=2023-01-01T00%3A00%3A00Z"
        );
    }

    #[test]
    fn since_with_offset_encodes_plus() {
        let mut stream = RecentChangesStream::new();
        stream.resume_since("2023-01-01T00:00:00+02:00");
        assert!(stream.request_url().ends_with("?since=2023-01-01T00%3A00%3A00%2B02%3A00"));
    }

    #[test]
    fn custom_endpoint_is_used_verbatim() {
        let mut stream = RecentChangesStream::new();
        stream.set_endpoint("http://localhost:8092/v2/stream/");
        assert_eq!(stream.request_url(), "http://localhost:8092/v2/stream/recentchange");

        stream.set_endpoint("");
        assert_eq!(stream.core().endpoint(), DEFAULT_ENDPOINT);
    }

    #[test]
    fn bad_filter_keeps_previous_one() {
        let mut stream = RecentChangesStream::new();
        stream.filter_by_origin("*.wikipedia.org").unwrap();
        assert!(stream.filter_by_origin("[").is_err());
        assert_eq!(stream.core().origin_filter().map(|f| f.pattern()), Some("*.wikipedia.org"));
    }

    #[test]
    fn from_config_applies_every_field() {
        let config = StreamConfig {
            endpoint: "http://127.0.0.1:9000/".into(),
            since: Some("2023-06-01T10:00:00Z".into()),
            origin_filter: Some("*.wiktionary.org".into()),
        };
        let stream = RecentChangesStream::from_config(&config).unwrap();
        assert_eq!(
            stream.request_url(),
            "http://127.0.0.1:9000/recentchange?since=2023-06-01T10%3A00%3A00Z"
        );
        assert!(stream.core().origin_filter().unwrap().matches("fr.wiktionary.org"));
    }

    #[test]
    fn from_config_rejects_bad_filter() {
        let config = StreamConfig {
            origin_filter: Some("(".into()),
            ..Default::default()
        };
        assert!(RecentChangesStream::from_config(&config).is_err());
    }
}
