//! Belief and common-ground label vocabularies.
//!
//! Annotation cells carry labels from two closed, unrelated vocabularies:
//! belief labels describe a speaker's private epistemic stance toward an
//! event, common-ground labels describe the social status of that stance
//! between the speakers. Both are validated at the parse boundary; raw
//! strings never travel past it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AnnotationError;

/// A speaker's epistemic stance toward a propositional event.
///
/// # Examples
///
/// ```
/// use coground::BeliefLabel;
///
/// let label: BeliefLabel = "CT+".parse().unwrap();
/// assert_eq!(label, BeliefLabel::CertainTrue);
/// assert_eq!(label.to_string(), "CT+");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BeliefLabel {
    /// `CT+` — the speaker is certain the event is true.
    #[serde(rename = "CT+")]
    CertainTrue,

    /// `CT-` — the speaker is certain the event is false.
    #[serde(rename = "CT-")]
    CertainFalse,

    /// `PS` — the speaker considers the event possibly true.
    #[serde(rename = "PS")]
    PossiblyTrue,

    /// `NB` — the speaker has formed no belief about the event yet.
    #[serde(rename = "NB")]
    NoBelief,

    /// `None` — the cell carried no real annotation (export artifact).
    #[serde(rename = "None")]
    None,
}

impl BeliefLabel {
    /// The annotation-vocabulary spelling of this label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CertainTrue => "CT+",
            Self::CertainFalse => "CT-",
            Self::PossiblyTrue => "PS",
            Self::NoBelief => "NB",
            Self::None => "None",
        }
    }
}

impl fmt::Display for BeliefLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BeliefLabel {
    type Err = AnnotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CT+" => Ok(Self::CertainTrue),
            "CT-" => Ok(Self::CertainFalse),
            "PS" => Ok(Self::PossiblyTrue),
            "NB" => Ok(Self::NoBelief),
            "None" => Ok(Self::None),
            _ => Err(AnnotationError::UnrecognizedLabel {
                token: s.to_string(),
            }),
        }
    }
}

/// The social-epistemic status of an event between the two speakers.
///
/// Common ground records how a belief has been taken up in the dialogue:
/// accepted by both, accepted by one, rejected, or not annotated at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CommonGroundLabel {
    /// `JA` — jointly accepted by both speakers.
    #[serde(rename = "JA")]
    JointlyAccepted,

    /// `IN` — individually accepted by this speaker only.
    #[serde(rename = "IN")]
    IndividuallyAccepted,

    /// `RT` — rejected.
    #[serde(rename = "RT")]
    Rejected,

    /// `NA` — no common-ground status recorded.
    #[serde(rename = "NA")]
    NotAnnotated,
}

impl CommonGroundLabel {
    /// The annotation-vocabulary spelling of this label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::JointlyAccepted => "JA",
            Self::IndividuallyAccepted => "IN",
            Self::Rejected => "RT",
            Self::NotAnnotated => "NA",
        }
    }

    /// Returns true if the event has been accepted into the common ground,
    /// jointly or individually.
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::JointlyAccepted | Self::IndividuallyAccepted)
    }
}

impl fmt::Display for CommonGroundLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommonGroundLabel {
    type Err = AnnotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "JA" => Ok(Self::JointlyAccepted),
            "IN" => Ok(Self::IndividuallyAccepted),
            "RT" => Ok(Self::Rejected),
            "NA" => Ok(Self::NotAnnotated),
            _ => Err(AnnotationError::UnrecognizedLabel {
                token: s.to_string(),
            }),
        }
    }
}
