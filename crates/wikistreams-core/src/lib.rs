//! wikistreams-core: foundation types for WikiStreams.
//!
//! # Overview
//!
//! WikiStreams consumes the Wikimedia EventStreams feeds: a server-pushed,
//! unbounded sequence of JSON change notifications. The core crate defines:
//!
//! - [`Metadata`] / [`Event`] / [`RecentChangesEvent`]: wire types
//! - [`OriginFilter`]: glob-style domain matcher (`*.wikipedia.org`)
//! - [`Validator`]: pure schema + origin check applied to every event
//! - [`FrameTransport`]: the trait a streaming transport implements
//! - [`error`] module: per-frame and terminal error types

pub mod error;
pub mod event;
pub mod filter;
pub mod transport;
pub mod validate;

pub use error::{FilterError, FrameError, StreamError, UnexpectedSchemaError};
pub use event::{from_object_slice, Event, HasMetadata, Metadata, NewOld, RecentChangesEvent};
pub use filter::OriginFilter;
pub use transport::{Frame, FrameStream, FrameTransport};
pub use validate::Validator;
