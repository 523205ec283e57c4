//! # wikistreams
//!
//! Client for the Wikimedia EventStreams service.
//!
//! Connects to a streaming endpoint, decodes every frame into a typed event,
//! checks its schema and origin domain, and hands accepted events to the
//! caller, one frame at a time and in wire order.
//!
//! ## Architecture
//! ```text
//! FrameTransport (SSE by default)
//!       │  frames, wire order
//!       ▼
//! StreamCore              ← drops empty keep-alive frames
//!       │
//!       ▼
//! dispatch::classify      ← JSON decode + Validator (schema, origin)
//!       │
//!       ├── Accepted  → receive(&event)
//!       ├── Rejected  → handle_error(err)
//!       └── Dropped   (origin filter miss, silent)
//! ```
//!
//! ## Usage
//! ```no_run
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! use wikistreams::RecentChangesStream;
//!
//! let mut stream = RecentChangesStream::new();
//! stream.filter_by_origin("*.wikipedia.org")?;
//! // After a reconnect, resume from the last event seen:
//! // stream.resume_since("2023-01-01T00:00:00Z");
//!
//! stream
//!     .run(
//!         |event| println!("{} edited {}", event.user, event.title),
//!         |err| eprintln!("{err}"),
//!     )
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dispatch;
pub mod kind;
pub mod stream;

pub use config::{StreamConfig, DEFAULT_ENDPOINT};
pub use dispatch::{classify, Outcome};
pub use kind::{RecentChanges, StreamKind};
pub use stream::{EventStream, RecentChangesStream, StreamCore};

pub use wikistreams_core::{
    Event, FilterError, Frame, FrameError, FrameStream, FrameTransport, HasMetadata, Metadata,
    NewOld, OriginFilter, RecentChangesEvent, StreamError, UnexpectedSchemaError, Validator,
};
pub use wikistreams_sse::{SseClientConfig, SseTransport};
