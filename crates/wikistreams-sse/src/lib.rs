//! wikistreams-sse: Server-Sent Events transport for WikiStreams.
//!
//! Implements [`FrameTransport`](wikistreams_core::FrameTransport) on top of
//! `reqwest` + `eventsource-stream`. Each `connect` issues one long-lived
//! `GET` and yields every SSE event as a [`Frame`](wikistreams_core::Frame).
//! No reconnect is attempted: a dropped connection ends the frame stream.

pub mod client;
pub mod config;

pub use client::SseTransport;
pub use config::SseClientConfig;
