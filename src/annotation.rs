//! Annotation-cell parsing.
//!
//! A raw cell is one of three forms: a bare decimal number, the literal
//! `"None"`, or a comma-separated list of `"LABEL eventid"` pairs. The two
//! numeric-ish forms are export artifacts carrying no real annotation and
//! parse to the empty mapping. The pair form is validated strictly: an
//! unknown label, a label from the other vocabulary, or a malformed event
//! id rejects the cell (and with it the transcript).

use std::collections::BTreeMap;
use std::str::FromStr;

use crate::error::AnnotationError;
use crate::event::EventId;
use crate::label::{BeliefLabel, CommonGroundLabel};

/// A speaker's belief about each annotated event.
pub type BeliefState = BTreeMap<EventId, BeliefLabel>;

/// The common-ground status of each annotated event for one speaker.
pub type CommonGroundState = BTreeMap<EventId, CommonGroundLabel>;

/// Parses a belief annotation cell.
///
/// ```
/// use coground::annotation::parse_beliefs;
/// use coground::{BeliefLabel, EventId};
///
/// let state = parse_beliefs("PS 3.5,CT- 3.2,CT- 3.1").unwrap();
/// assert_eq!(state.len(), 3);
/// assert_eq!(state[&EventId::new(3, 2)], BeliefLabel::CertainFalse);
/// assert!(parse_beliefs("None").unwrap().is_empty());
/// assert!(parse_beliefs("3.5").unwrap().is_empty());
/// ```
///
/// # Errors
///
/// Returns [`AnnotationError`] for an unrecognized label, a common-ground
/// label in a belief cell, or a malformed pair or event id.
pub fn parse_beliefs(raw: &str) -> Result<BeliefState, AnnotationError> {
    parse_cell(raw, "belief", |label| {
        CommonGroundLabel::from_str(label).is_ok()
    })
}

/// Parses a common-ground annotation cell.
///
/// Same contract as [`parse_beliefs`], with the vocabularies swapped.
///
/// # Errors
///
/// Returns [`AnnotationError`] for an unrecognized label, a belief label in
/// a common-ground cell, or a malformed pair or event id.
pub fn parse_common_ground(raw: &str) -> Result<CommonGroundState, AnnotationError> {
    parse_cell(raw, "common-ground", |label| {
        BeliefLabel::from_str(label).is_ok()
    })
}

/// Shared parse path for both vocabularies.
///
/// `other_vocabulary` recognizes labels of the vocabulary this column is
/// NOT annotated with, so the error can say "wrong vocabulary" instead of
/// "unrecognized".
fn parse_cell<L: FromStr<Err = AnnotationError>>(
    raw: &str,
    expected: &'static str,
    other_vocabulary: impl Fn(&str) -> bool,
) -> Result<BTreeMap<EventId, L>, AnnotationError> {
    let raw = raw.trim();
    // Cells that are a bare number are export mistakes: an event listed with
    // no label. They are not real annotations.
    if raw == "None" || raw.parse::<f64>().is_ok() {
        return Ok(BTreeMap::new());
    }
    let mut state = BTreeMap::new();
    for pair in raw.split(',') {
        let (label, event) = pair
            .split_once(' ')
            .ok_or_else(|| AnnotationError::MalformedPair {
                pair: pair.to_string(),
            })?;
        let label = L::from_str(label).map_err(|err| {
            if other_vocabulary(label) {
                AnnotationError::WrongVocabulary {
                    label: label.to_string(),
                    expected,
                }
            } else {
                err
            }
        })?;
        let event: EventId = event.parse()?;
        // Later pairs overwrite earlier ones for the same event.
        state.insert(event, label);
    }
    Ok(state)
}
