//! Transcript model.
//!
//! A transcript is an ordered sequence of utterance rows, one per event
//! introduction. Several rows can share a sentence index when a sentence
//! introduces more than one event; each row carries the per-utterance
//! annotation cells for both speakers (never cumulative state).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AnnotationError, PipelineError};
use crate::event::EventId;

/// One of the two dialogue participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Speaker {
    /// Speaker A.
    A,
    /// Speaker B.
    B,
}

impl Speaker {
    /// The other participant.
    #[must_use]
    pub const fn other(&self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => f.write_str("A"),
            Self::B => f.write_str("B"),
        }
    }
}

impl FromStr for Speaker {
    type Err = AnnotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(Self::A),
            "B" => Ok(Self::B),
            _ => Err(AnnotationError::UnrecognizedLabel {
                token: s.to_string(),
            }),
        }
    }
}

/// One annotation row: an event introduction inside a sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utterance {
    /// Identifier of the event this row introduces.
    pub eno: EventId,

    /// 1-based sentence index (the sentence part of `eno`).
    pub sno: u32,

    /// Who uttered the sentence.
    pub speaker: Speaker,

    /// Full sentence text, including the speaker prefix.
    pub sentence: String,

    /// Literal text of the introduced event.
    pub event: String,

    /// Raw belief annotation cell for speaker A, this utterance only.
    pub belief_a: String,

    /// Raw belief annotation cell for speaker B, this utterance only.
    pub belief_b: String,

    /// Raw common-ground annotation cell for speaker A, this utterance only.
    pub cg_a: String,

    /// Raw common-ground annotation cell for speaker B, this utterance only.
    pub cg_b: String,
}

/// An ordered, validated sequence of utterances for one conversation as
/// annotated by one annotator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    cid: u32,
    annotator: String,
    utterances: Vec<Utterance>,
}

impl Transcript {
    /// Builds a transcript, validating introduction order.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::EmptyTranscript`] for an utterance-free
    /// transcript, and [`PipelineError::OutOfOrderEvent`] when event ids do
    /// not strictly increase with row order or disagree with their row's
    /// sentence index.
    pub fn new(
        cid: u32,
        annotator: impl Into<String>,
        utterances: Vec<Utterance>,
    ) -> Result<Self, PipelineError> {
        if utterances.is_empty() {
            return Err(PipelineError::EmptyTranscript);
        }
        let mut prev: Option<EventId> = None;
        for utt in &utterances {
            if utt.sno != utt.eno.sentence() || prev.is_some_and(|p| p >= utt.eno) {
                return Err(PipelineError::OutOfOrderEvent {
                    eno: utt.eno,
                    sno: utt.sno,
                });
            }
            prev = Some(utt.eno);
        }
        Ok(Self {
            cid,
            annotator: annotator.into(),
            utterances,
        })
    }

    /// The conversation id.
    #[must_use]
    pub const fn cid(&self) -> u32 {
        self.cid
    }

    /// The annotator name.
    #[must_use]
    pub fn annotator(&self) -> &str {
        &self.annotator
    }

    /// All utterance rows in introduction order.
    #[must_use]
    pub fn utterances(&self) -> &[Utterance] {
        &self.utterances
    }

    /// Highest sentence index in the transcript.
    #[must_use]
    pub fn max_sno(&self) -> u32 {
        // Validated non-empty in `new`.
        self.utterances.last().map_or(0, |u| u.sno)
    }

    /// The literal text of the event introduced as `eno`, if any.
    #[must_use]
    pub fn event_text(&self, eno: EventId) -> Option<&str> {
        self.utterances
            .iter()
            .find(|u| u.eno == eno)
            .map(|u| u.event.as_str())
    }

    /// One `(sno, sentence)` pair per distinct sentence, in order.
    ///
    /// Rows of the same sentence share the (forward-filled) sentence text;
    /// the first row of each sentence supplies it.
    #[must_use]
    pub fn sentences(&self) -> Vec<(u32, &str)> {
        let mut out: Vec<(u32, &str)> = Vec::new();
        for utt in &self.utterances {
            if out.last().map_or(true, |(sno, _)| *sno != utt.sno) {
                out.push((utt.sno, utt.sentence.as_str()));
            }
        }
        out
    }

    /// The last utterance row of each sentence (maximum event ordinal).
    #[must_use]
    pub fn last_per_sentence(&self) -> Vec<&Utterance> {
        let mut out: Vec<&Utterance> = Vec::new();
        for utt in &self.utterances {
            match out.last_mut() {
                Some(last) if last.sno == utt.sno => *last = utt,
                _ => out.push(utt),
            }
        }
        out
    }
}
