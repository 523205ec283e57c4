//! The `FrameTransport` trait: abstraction over the streaming connection.
//!
//! A transport opens one persistent connection per `connect` call and yields
//! frames in wire order. Reconnect policy, if any, belongs to the transport;
//! the stream treats the first `Err` item as terminal.

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::StreamError;

/// One discrete message delivered by the transport.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    /// Event type name, if the protocol carries one (SSE `event:` field)
    pub event: String,
    /// Last-event id, if the protocol carries one (SSE `id:` field)
    pub id: String,
    pub data: Bytes,
}

impl Frame {
    /// Frame with only a payload.
    pub fn data(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            ..Default::default()
        }
    }

    /// Keep-alive frames carry no payload.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Frames from a single connection. Dropping it closes the connection.
pub type FrameStream = Pin<Box<dyn Stream<Item = Result<Frame, StreamError>> + Send>>;

#[async_trait]
pub trait FrameTransport: Send + Sync {
    /// Connect to `url` and start streaming frames.
    async fn connect(&self, url: &str) -> Result<FrameStream, StreamError>;
}

#[async_trait]
impl<T: FrameTransport + ?Sized> FrameTransport for Arc<T> {
    async fn connect(&self, url: &str) -> Result<FrameStream, StreamError> {
        (**self).connect(url).await
    }
}
