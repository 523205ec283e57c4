//! Metadata validation.

use crate::error::UnexpectedSchemaError;
use crate::event::Metadata;
use crate::filter::OriginFilter;

/// Checks an event's metadata against the stream's expected schema and
/// optional origin filter. Holds no state beyond its borrowed inputs.
#[derive(Debug, Clone, Copy)]
pub struct Validator<'a> {
    expected_schema: &'a str,
    origin: Option<&'a OriginFilter>,
}

impl<'a> Validator<'a> {
    pub fn new(expected_schema: &'a str, origin: Option<&'a OriginFilter>) -> Self {
        Self {
            expected_schema,
            origin,
        }
    }

    pub fn expected_schema(&self) -> &str {
        self.expected_schema
    }

    /// `Err` on schema mismatch; `Ok(false)` when the origin filter rejects
    /// the event's domain; `Ok(true)` when the event should be delivered.
    pub fn validate(&self, meta: &Metadata) -> Result<bool, UnexpectedSchemaError> {
        if meta.schema_uri != self.expected_schema {
            return Err(UnexpectedSchemaError::new(
                meta.schema_uri.as_str(),
                self.expected_schema,
            ));
        }
        if let Some(origin) = self.origin {
            if !origin.matches(&meta.domain) {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
