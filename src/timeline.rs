//! Cumulative belief timeline.
//!
//! Annotation cells describe only what changed at an utterance. The
//! timeline folds them into the state the annotations describe: for each of
//! the four columns (belief and common ground, per speaker) a running
//! right-biased union over utterances, so every snapshot holds the full
//! state known up to that row. Keys accumulate and are never removed;
//! values are overwritten by later annotations.

use crate::annotation::{parse_beliefs, parse_common_ground, BeliefState, CommonGroundState};
use crate::error::AnnotationError;
use crate::event::EventId;
use crate::transcript::Transcript;

/// The cumulative annotation state as of one utterance row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineSnapshot {
    /// The event introduced by this row.
    pub eno: EventId,

    /// The row's sentence index.
    pub sno: u32,

    /// Speaker A's beliefs about every event annotated so far.
    pub belief_a: BeliefState,

    /// Speaker B's beliefs about every event annotated so far.
    pub belief_b: BeliefState,

    /// Common-ground status per event, from speaker A's annotations.
    pub cg_a: CommonGroundState,

    /// Common-ground status per event, from speaker B's annotations.
    pub cg_b: CommonGroundState,
}

/// One snapshot per utterance row, aligned with the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeliefTimeline {
    snapshots: Vec<TimelineSnapshot>,
}

impl BeliefTimeline {
    /// Parses every annotation cell and folds the per-utterance mappings
    /// into cumulative state.
    ///
    /// # Errors
    ///
    /// Returns the first [`AnnotationError`] encountered; a single bad cell
    /// rejects the whole transcript.
    pub fn build(transcript: &Transcript) -> Result<Self, AnnotationError> {
        let mut belief_a = BeliefState::new();
        let mut belief_b = BeliefState::new();
        let mut cg_a = CommonGroundState::new();
        let mut cg_b = CommonGroundState::new();
        let mut snapshots = Vec::with_capacity(transcript.utterances().len());

        for utt in transcript.utterances() {
            belief_a.extend(parse_beliefs(&utt.belief_a)?);
            belief_b.extend(parse_beliefs(&utt.belief_b)?);
            cg_a.extend(parse_common_ground(&utt.cg_a)?);
            cg_b.extend(parse_common_ground(&utt.cg_b)?);
            snapshots.push(TimelineSnapshot {
                eno: utt.eno,
                sno: utt.sno,
                belief_a: belief_a.clone(),
                belief_b: belief_b.clone(),
                cg_a: cg_a.clone(),
                cg_b: cg_b.clone(),
            });
        }

        Ok(Self { snapshots })
    }

    /// All snapshots, one per utterance row, in introduction order.
    #[must_use]
    pub fn snapshots(&self) -> &[TimelineSnapshot] {
        &self.snapshots
    }

    /// The final snapshot of each sentence (maximum event ordinal).
    ///
    /// Beliefs are resolved against the last embedded proposition of the
    /// sentence, which carries the sentence's complete annotation state.
    #[must_use]
    pub fn last_per_sentence(&self) -> Vec<&TimelineSnapshot> {
        let mut out: Vec<&TimelineSnapshot> = Vec::new();
        for snapshot in &self.snapshots {
            match out.last_mut() {
                Some(last) if last.sno == snapshot.sno => *last = snapshot,
                _ => out.push(snapshot),
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::BeliefLabel;
    use crate::transcript::{Speaker, Utterance};

    fn utt(eno: &str, belief_a: &str, cg_a: &str) -> Utterance {
        let eno: EventId = eno.parse().unwrap();
        Utterance {
            eno,
            sno: eno.sentence(),
            speaker: Speaker::A,
            sentence: format!("A: sentence {}", eno.sentence()),
            event: format!("event {eno}"),
            belief_a: belief_a.to_string(),
            belief_b: "None".to_string(),
            cg_a: cg_a.to_string(),
            cg_b: "None".to_string(),
        }
    }

    fn transcript(utterances: Vec<Utterance>) -> Transcript {
        Transcript::new(4245, "Magda", utterances).unwrap()
    }

    #[test]
    fn test_cumulative_merge_accumulates_and_overwrites() {
        // Mirrors the running-union contract: keys accumulate, later values
        // win for the same key.
        let transcript = transcript(vec![
            utt("1.1", "CT+ 1.1,PS 1.2", "None"),
            utt("1.2", "None", "None"),
            utt("2.1", "CT- 1.2,NB 2.1", "None"),
        ]);
        let timeline = BeliefTimeline::build(&transcript).unwrap();
        let snapshots = timeline.snapshots();
        assert_eq!(snapshots.len(), 3);

        assert_eq!(snapshots[0].belief_a.len(), 2);
        // "None" merges nothing; state carries forward unchanged.
        assert_eq!(snapshots[1].belief_a, snapshots[0].belief_a);

        let last = &snapshots[2].belief_a;
        assert_eq!(last.len(), 3);
        assert_eq!(last[&EventId::new(1, 1)], BeliefLabel::CertainTrue);
        assert_eq!(last[&EventId::new(1, 2)], BeliefLabel::CertainFalse);
        assert_eq!(last[&EventId::new(2, 1)], BeliefLabel::NoBelief);
    }

    #[test]
    fn test_domain_is_monotone() {
        let transcript = transcript(vec![
            utt("1.1", "PS 1.1", "None"),
            utt("2.1", "CT+ 1.1", "IN 1.1"),
            utt("3.1", "None", "JA 1.1"),
        ]);
        let timeline = BeliefTimeline::build(&transcript).unwrap();
        let mut prev_len = 0;
        for snapshot in timeline.snapshots() {
            assert!(snapshot.belief_a.len() >= prev_len);
            prev_len = snapshot.belief_a.len();
        }
    }

    #[test]
    fn test_bad_cell_rejects_transcript() {
        let transcript = transcript(vec![utt("1.1", "CT* 1.1", "None")]);
        assert!(BeliefTimeline::build(&transcript).is_err());
    }

    #[test]
    fn test_last_per_sentence_picks_max_ordinal() {
        let transcript = transcript(vec![
            utt("1.1", "PS 1.1", "None"),
            utt("1.2", "CT+ 1.1", "None"),
            utt("2.1", "None", "None"),
        ]);
        let timeline = BeliefTimeline::build(&transcript).unwrap();
        let last = timeline.last_per_sentence();
        assert_eq!(last.len(), 2);
        assert_eq!(last[0].eno, EventId::new(1, 2));
        assert_eq!(
            last[0].belief_a[&EventId::new(1, 1)],
            BeliefLabel::CertainTrue
        );
        assert_eq!(last[1].eno, EventId::new(2, 1));
    }
}
