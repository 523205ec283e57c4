//! Per-frame decode, validate and classify step.

use serde::de::DeserializeOwned;
use wikistreams_core::{from_object_slice, FrameError, HasMetadata, Validator};

/// What to do with one frame.
#[derive(Debug)]
pub enum Outcome<E> {
    /// Decoded and valid: deliver to the receive callback.
    Accepted(E),
    /// Decoded, right schema, but the origin filter rejected its domain.
    Dropped,
    /// Decode failure or schema mismatch: deliver to the error callback.
    Rejected(FrameError),
}

/// Decode `payload` as `E` and check its metadata with `validator`.
///
/// The payload must be a JSON object; any other JSON value is a decode error.
pub fn classify<E>(payload: &[u8], validator: &Validator<'_>) -> Outcome<E>
where
    E: DeserializeOwned + HasMetadata,
{
    let event: E = match from_object_slice(payload) {
        Ok(event) => event,
        Err(e) => return Outcome::Rejected(FrameError::Decode(e)),
    };
    match validator.validate(event.meta()) {
        Ok(true) => Outcome::Accepted(event),
        Ok(false) => Outcome::Dropped,
        Err(e) => Outcome::Rejected(FrameError::UnexpectedSchema(e)),
    }
}
