//! Event resolution.
//!
//! Turns the cumulative timeline into a dense table with one row per
//! (event, sentence) pair. Beliefs at a sentence are read from that
//! sentence's final utterance row; the two speakers' rows are joined on
//! (event, sentence) so neither side's events are dropped, and every event
//! is padded back to sentence 1 with "no belief / not annotated" rows for
//! the sentences before it was first annotated.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{CgError, PipelineError};
use crate::event::EventId;
use crate::label::{BeliefLabel, CommonGroundLabel};
use crate::timeline::BeliefTimeline;
use crate::transcript::{Speaker, Transcript};

/// Both speakers' resolved annotation state for one event at one sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRow {
    /// The event.
    pub eno: EventId,

    /// The sentence index the state is resolved at.
    pub sno: u32,

    /// Literal text of the event.
    pub event: String,

    /// Speaker A's belief about the event as of this sentence.
    pub belief_a: BeliefLabel,

    /// Speaker B's belief about the event as of this sentence.
    pub belief_b: BeliefLabel,

    /// Common-ground status recorded by speaker A's annotations.
    pub cg_a: CommonGroundLabel,

    /// Common-ground status recorded by speaker B's annotations.
    pub cg_b: CommonGroundLabel,
}

impl EventRow {
    /// Speaker's belief at this row.
    #[must_use]
    pub const fn belief(&self, speaker: Speaker) -> BeliefLabel {
        match speaker {
            Speaker::A => self.belief_a,
            Speaker::B => self.belief_b,
        }
    }

    /// Speaker's common-ground status at this row.
    #[must_use]
    pub const fn common_ground(&self, speaker: Speaker) -> CommonGroundLabel {
        match speaker {
            Speaker::A => self.cg_a,
            Speaker::B => self.cg_b,
        }
    }
}

/// Dense (event × sentence) table for one transcript.
///
/// For every event the table covers every sentence index from 1 through the
/// transcript's last sentence exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventTable {
    rows: Vec<EventRow>,
    min_sno: u32,
    max_sno: u32,
}

impl EventTable {
    /// Resolves the timeline into a dense table.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::CommonGroundWithoutBelief`] when a speaker
    /// has a common-ground entry for an event they hold no belief about,
    /// and [`PipelineError::UnknownEvent`] when an annotated event id has
    /// no introducing utterance to take its text from.
    pub fn resolve(transcript: &Transcript, timeline: &BeliefTimeline) -> Result<Self, CgError> {
        let max_sno = transcript.max_sno();
        let mut rows: Vec<EventRow> = Vec::new();

        for snapshot in timeline.last_per_sentence() {
            // Common ground presupposes belief, per speaker, per sentence.
            for (speaker, beliefs, cg) in [
                (Speaker::A, &snapshot.belief_a, &snapshot.cg_a),
                (Speaker::B, &snapshot.belief_b, &snapshot.cg_b),
            ] {
                if let Some(eno) = cg.keys().find(|eno| !beliefs.contains_key(*eno)) {
                    return Err(PipelineError::CommonGroundWithoutBelief {
                        speaker,
                        eno: *eno,
                        sno: snapshot.sno,
                    }
                    .into());
                }
            }

            // Join the speakers on the union of their annotated events, so
            // an event only one side has annotated still gets a row. The
            // absent side reads as "no belief / not annotated".
            let events: BTreeSet<EventId> = snapshot
                .belief_a
                .keys()
                .chain(snapshot.belief_b.keys())
                .copied()
                .collect();
            for eno in events {
                let event = transcript
                    .event_text(eno)
                    .ok_or(PipelineError::UnknownEvent { eno })?;
                rows.push(EventRow {
                    eno,
                    sno: snapshot.sno,
                    event: event.to_string(),
                    belief_a: snapshot
                        .belief_a
                        .get(&eno)
                        .copied()
                        .unwrap_or(BeliefLabel::NoBelief),
                    belief_b: snapshot
                        .belief_b
                        .get(&eno)
                        .copied()
                        .unwrap_or(BeliefLabel::NoBelief),
                    cg_a: snapshot
                        .cg_a
                        .get(&eno)
                        .copied()
                        .unwrap_or(CommonGroundLabel::NotAnnotated),
                    cg_b: snapshot
                        .cg_b
                        .get(&eno)
                        .copied()
                        .unwrap_or(CommonGroundLabel::NotAnnotated),
                });
            }
        }

        // Pad each event back to sentence 1: before its first annotation
        // both speakers hold no belief and nothing is in the common ground.
        let mut padded: Vec<EventRow> = Vec::new();
        let events: BTreeSet<EventId> = rows.iter().map(|r| r.eno).collect();
        for eno in events {
            let present: BTreeSet<u32> = rows
                .iter()
                .filter(|r| r.eno == eno)
                .map(|r| r.sno)
                .collect();
            let event = transcript
                .event_text(eno)
                .ok_or(PipelineError::UnknownEvent { eno })?;
            for sno in (1..=max_sno).filter(|sno| !present.contains(sno)) {
                padded.push(EventRow {
                    eno,
                    sno,
                    event: event.to_string(),
                    belief_a: BeliefLabel::NoBelief,
                    belief_b: BeliefLabel::NoBelief,
                    cg_a: CommonGroundLabel::NotAnnotated,
                    cg_b: CommonGroundLabel::NotAnnotated,
                });
            }
        }
        rows.extend(padded);
        rows.sort_by_key(|r| (r.eno, r.sno));

        let min_sno = rows.iter().map(|r| r.sno).min().unwrap_or(1);
        Ok(Self {
            rows,
            min_sno,
            max_sno,
        })
    }

    /// All rows, sorted by (event, sentence).
    #[must_use]
    pub fn rows(&self) -> &[EventRow] {
        &self.rows
    }

    /// Lowest sentence index covered.
    #[must_use]
    pub const fn min_sno(&self) -> u32 {
        self.min_sno
    }

    /// Highest sentence index covered.
    #[must_use]
    pub const fn max_sno(&self) -> u32 {
        self.max_sno
    }

    /// Rows for one event, in sentence order.
    #[must_use]
    pub fn event_rows(&self, eno: EventId) -> Vec<&EventRow> {
        self.rows.iter().filter(|r| r.eno == eno).collect()
    }

    /// Distinct events covered by the table, in introduction order.
    #[must_use]
    pub fn events(&self) -> Vec<EventId> {
        let mut events: Vec<EventId> = self.rows.iter().map(|r| r.eno).collect();
        events.dedup();
        events
    }
}
