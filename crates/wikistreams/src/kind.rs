//! Stream kinds: fixed bindings of path segment, schema id and event type.
//!
//! Supporting another EventStreams feed means adding one more `StreamKind`
//! impl; the connection, decode and dispatch machinery is shared.

use serde::de::DeserializeOwned;
use wikistreams_core::{HasMetadata, RecentChangesEvent};

pub trait StreamKind {
    /// Path segment appended to the endpoint, e.g. "recentchange"
    const PATH: &'static str;
    /// Exact `meta.schema_uri` every event of this feed must carry
    const SCHEMA: &'static str;
    /// Decode target for each frame payload
    type Event: DeserializeOwned + HasMetadata;
}

/// The `recentchange` feed: every edit, page creation and log action.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecentChanges;

impl StreamKind for RecentChanges {
    const PATH: &'static str = "recentchange";
    const SCHEMA: &'static str = "mediawiki/recentchange/2";
    type Event = RecentChangesEvent;
}
