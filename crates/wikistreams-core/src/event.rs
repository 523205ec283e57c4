//! Wire types for EventStreams payloads.
//!
//! Field names follow the upstream JSON exactly. Decoding is lenient in the
//! same way the feed's producers expect: absent fields and explicit `null`s
//! take their zero value, unknown fields are ignored. Structured values must
//! still be JSON objects; arrays are never read positionally.

use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Attributes common to every event, found under the `meta` key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metadata {
    /// Domain of the wiki the event originated from, e.g. "en.wikipedia.org"
    #[serde(deserialize_with = "null_as_default")]
    pub domain: String,
    /// ISO 8601 event time; pass it to `resume_since` after a reconnect
    #[serde(deserialize_with = "null_as_default")]
    pub dt: String,
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub request_id: String,
    /// Identifies the payload shape and version
    #[serde(deserialize_with = "null_as_default")]
    pub schema_uri: String,
    #[serde(deserialize_with = "null_as_default")]
    pub topic: String,
    #[serde(deserialize_with = "null_as_default")]
    pub uri: String,
    #[serde(deserialize_with = "null_as_default")]
    pub partition: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub offset: u64,
}

/// Gives uniform access to the metadata header every event type carries.
pub trait HasMetadata {
    fn meta(&self) -> &Metadata;
}

/// Base event: metadata only. Useful for feeds whose body is not needed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Event {
    #[serde(deserialize_with = "object_or_null")]
    pub meta: Metadata,
}

impl HasMetadata for Event {
    fn meta(&self) -> &Metadata {
        &self.meta
    }
}

/// A before/after pair, used for page length and revision ids.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewOld {
    #[serde(deserialize_with = "null_as_default")]
    pub new: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub old: i64,
}

/// One entry of the `recentchange` feed: edits, page creations, log actions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecentChangesEvent {
    #[serde(deserialize_with = "object_or_null")]
    pub meta: Metadata,
    #[serde(deserialize_with = "null_as_default")]
    pub bot: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub comment: String,
    /// Page length in bytes before and after the change
    #[serde(deserialize_with = "object_or_null")]
    pub length: NewOld,
    #[serde(deserialize_with = "null_as_default")]
    pub minor: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub namespace: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub patrolled: bool,
    #[serde(deserialize_with = "object_or_null")]
    pub revision: NewOld,
    #[serde(deserialize_with = "null_as_default")]
    pub server_name: String,
    /// Unix seconds
    #[serde(deserialize_with = "null_as_default")]
    pub timestamp: i64,
    /// "edit" | "new" | "log" | "categorize" | "external"
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(deserialize_with = "null_as_default")]
    pub log_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub user: String,
    #[serde(deserialize_with = "null_as_default")]
    pub wiki: String,
}

impl HasMetadata for RecentChangesEvent {
    fn meta(&self) -> &Metadata {
        &self.meta
    }
}

impl RecentChangesEvent {
    /// Page length delta in bytes (positive for additions).
    pub fn length_delta(&self) -> i64 {
        self.length.new - self.length.old
    }
}

/// Decode `payload` as `T`, requiring a JSON object at the top level.
pub fn from_object_slice<T: DeserializeOwned>(payload: &[u8]) -> Result<T, serde_json::Error> {
    let object: Map<String, Value> = serde_json::from_slice(payload)?;
    T::deserialize(Value::Object(object))
}

fn object_or_null<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + DeserializeOwned,
{
    match Option::<Map<String, Value>>::deserialize(deserializer)? {
        Some(object) => T::deserialize(Value::Object(object)).map_err(de::Error::custom),
        None => Ok(T::default()),
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EDIT: &str = r#"{
        "$schema": "/mediawiki/recentchange/1.0.0",
        "meta": {
            "uri": "https://en.wikipedia.org/wiki/Rust_(programming_language)",
            "request_id": "c0ffee00-1234-4abc-9def-000000000001",
            "id": "7d8b2f4e-0000-4000-8000-000000000002",
            "dt": "2023-01-01T00:00:05Z",
            "domain": "en.wikipedia.org",
            "schema_uri": "mediawiki/recentchange/2",
            "topic": "eqiad.mediawiki.recentchange",
            "partition": 0,
            "offset": 4477042411
        },
        "id": 1584783457,
        "type": "edit",
        "namespace": 0,
        "title": "Rust (programming language)",
        "comment": "/* History */ copyedit",
        "timestamp": 1672531205,
        "user": "ExampleUser",
        "bot": false,
        "minor": true,
        "patrolled": true,
        "length": {"old": 120345, "new": 120398},
        "revision": {"old": 1130000000, "new": 1130000001},
        "server_url": "https://en.wikipedia.org",
        "server_name": "en.wikipedia.org",
        "server_script_path": "/w",
        "wiki": "enwiki",
        "parsedcomment": "copyedit"
    }"#;

    #[test]
    fn decode_edit_event() {
        let ev: RecentChangesEvent = serde_json::from_str(EDIT).unwrap();
        assert_eq!(ev.meta.domain, "en.wikipedia.org");
        assert_eq!(ev.meta.dt, "2023-01-01T00:00:05Z");
        assert_eq!(ev.meta.schema_uri, "mediawiki/recentchange/2");
        assert_eq!(ev.meta.offset, 4_477_042_411);
        assert_eq!(ev.kind, "edit");
        assert_eq!(ev.title, "Rust (programming language)");
        assert_eq!(ev.length, NewOld { new: 120398, old: 120345 });
        assert_eq!(ev.length_delta(), 53);
        assert_eq!(ev.revision.new, 1_130_000_001);
        assert_eq!(ev.server_name, "en.wikipedia.org");
        assert_eq!(ev.wiki, "enwiki");
        assert!(ev.minor && ev.patrolled && !ev.bot);
        assert_eq!(ev.log_type, "");
    }

    #[test]
    fn missing_and_null_fields_take_zero_values() {
        let json = r#"{
            "meta": {"domain": "commons.wikimedia.org", "schema_uri": "mediawiki/recentchange/2", "partition": null},
            "type": "log",
            "log_type": "upload",
            "comment": null,
            "length": null
        }"#;
        let ev: RecentChangesEvent = serde_json::from_str(json).unwrap();
        assert_eq!(ev.kind, "log");
        assert_eq!(ev.log_type, "upload");
        assert_eq!(ev.comment, "");
        assert_eq!(ev.length, NewOld::default());
        assert_eq!(ev.revision, NewOld::default());
        assert_eq!(ev.meta.partition, 0);
    }

    #[test]
    fn type_mismatch_is_a_decode_error() {
        let json = r#"{"meta": {"domain": "x"}, "namespace": "zero"}"#;
        assert!(serde_json::from_str::<RecentChangesEvent>(json).is_err());
    }

    #[test]
    fn top_level_must_be_an_object() {
        let payloads: [&[u8]; 5] = [b"[]", b"42", b"\"edit\"", b"null", br#"[{"domain":"x"}, true, "hi"]"#];
        for payload in payloads {
            assert!(
                from_object_slice::<RecentChangesEvent>(payload).is_err(),
                "accepted {}",
                String::from_utf8_lossy(payload)
            );
        }
        let ev: RecentChangesEvent = from_object_slice(EDIT.as_bytes()).unwrap();
        assert_eq!(ev.meta.offset, 4_477_042_411);
    }

    #[test]
    fn nested_values_must_be_objects() {
        let cases = [
            r#"{"meta": ["en.wikipedia.org", "2023-01-01T00:00:00Z"]}"#,
            r#"{"meta": {"schema_uri": "mediawiki/recentchange/2"}, "length": [15, 10]}"#,
            r#"{"meta": {"schema_uri": "mediawiki/recentchange/2"}, "revision": [101, 100]}"#,
        ];
        for json in cases {
            assert!(serde_json::from_str::<RecentChangesEvent>(json).is_err(), "accepted {json}");
        }
        assert!(serde_json::from_str::<Event>(r#"{"meta": []}"#).is_err());
    }

    #[test]
    fn base_event_reads_metadata_only() {
        let ev: Event = serde_json::from_str(EDIT).unwrap();
        assert_eq!(ev.meta().topic, "eqiad.mediawiki.recentchange");
    }

    #[test]
    fn serializes_with_upstream_field_names() {
        let ev: RecentChangesEvent = serde_json::from_str(EDIT).unwrap();
        let v = serde_json::to_value(&ev).unwrap();
        assert_eq!(v["type"], "edit");
        assert_eq!(v["meta"]["schema_uri"], "mediawiki/recentchange/2");
        assert_eq!(v["revision"]["new"], 1_130_000_001i64);
    }
}
