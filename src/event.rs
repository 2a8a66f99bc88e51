//! Event identity.
//!
//! Events are propositions introduced by utterances. An event is identified
//! by the sentence that introduces it and its ordinal position within that
//! sentence, written in annotation files as a decimal: `3.2` is the second
//! event introduced in sentence 3.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AnnotationError;

/// Stable identifier for an event within one transcript.
///
/// Identifiers order by (sentence, ordinal), so introduction order is
/// preserved even when a sentence introduces ten or more events — the
/// decimal spelling is only a serialization, never arithmetic.
///
/// # Examples
///
/// ```
/// use coground::EventId;
///
/// let id: EventId = "3.2".parse().unwrap();
/// assert_eq!(id.sentence(), 3);
/// assert_eq!(id.ordinal(), 2);
/// assert_eq!(id.to_string(), "3.2");
/// assert!(id < "3.5".parse().unwrap());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct EventId {
    sentence: u32,
    ordinal: u32,
}

impl EventId {
    /// Creates an event id from a sentence index and an ordinal within it.
    #[must_use]
    pub const fn new(sentence: u32, ordinal: u32) -> Self {
        Self { sentence, ordinal }
    }

    /// The 1-based index of the sentence that introduces the event.
    #[must_use]
    pub const fn sentence(&self) -> u32 {
        self.sentence
    }

    /// The 1-based position of the event within its sentence.
    ///
    /// An annotation written without a fractional part (`"3"`) parses with
    /// ordinal 0.
    #[must_use]
    pub const fn ordinal(&self) -> u32 {
        self.ordinal
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.sentence, self.ordinal)
    }
}

impl FromStr for EventId {
    type Err = AnnotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AnnotationError::InvalidEventId { raw: s.to_string() };
        let (whole, fraction) = match s.split_once('.') {
            Some((whole, fraction)) => (whole, Some(fraction)),
            None => (s, None),
        };
        let sentence: u32 = whole.parse().map_err(|_| invalid())?;
        let ordinal: u32 = match fraction {
            Some(fraction) if !fraction.is_empty() => {
                // Reject a second '.' and any sign/whitespace noise.
                if !fraction.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(invalid());
                }
                fraction.parse().map_err(|_| invalid())?
            }
            Some(_) => return Err(invalid()),
            None => 0,
        };
        Ok(Self::new(sentence, ordinal))
    }
}

impl TryFrom<String> for EventId {
    type Error = AnnotationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EventId> for String {
    fn from(id: EventId) -> Self {
        id.to_string()
    }
}
