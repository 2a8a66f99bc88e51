//! Question-site selection.
//!
//! Not every (event, sentence) row is worth asking about. Two filters pick
//! the interesting ones:
//!
//! 1. Speech-act exclusion drops events that describe an embedding speech
//!    act ("A asks whether X", "B said that Y") rather than a
//!    belief-bearing proposition. Such an event is recognized by its
//!    leading tokens together with an embedded companion event introduced
//!    in the same sentence whose text it extends.
//! 2. Change-point sampling keeps, per event, the sentences where the
//!    joint belief pair (A, B) changes, plus the midpoint between
//!    consecutive change points. The transcript's first and last sentences
//!    are never kept: boundary rows say nothing about belief change.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::event::EventId;
use crate::resolve::{EventRow, EventTable};
use crate::transcript::Transcript;

/// Why a row was selected for question generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContextType {
    /// A belief-update point.
    #[serde(rename = "end")]
    End,

    /// The midpoint between two consecutive update points.
    #[serde(rename = "mid")]
    Mid,
}

impl ContextType {
    /// Wire spelling of this classification.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::End => "end",
            Self::Mid => "mid",
        }
    }
}

impl fmt::Display for ContextType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A selected row: one event at one sentence, with its classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionSite {
    /// The resolved row questions are generated from.
    pub row: EventRow,

    /// Whether this is an update point or a midpoint.
    pub context_type: ContextType,
}

/// Site-selection configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiteConfig {
    /// Drop speech-act events entirely.
    pub exclude_speech_acts: bool,

    /// Also keep the midpoints between consecutive update points.
    pub keep_midpoints: bool,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            exclude_speech_acts: true,
            keep_midpoints: true,
        }
    }
}

/// Verbs whose embedding report excludes an event from question generation.
const EMBEDDING_VERBS: [&str; 2] = ["asks", "jokes"];

/// Events that are embedding speech acts rather than propositions.
///
/// An event is excluded when its second token is an embedding verb
/// ("asks", "jokes") and another event introduced in the same sentence is a
/// strict suffix of its text (the embedded proposition), or when its second
/// and third tokens are "said that".
#[must_use]
pub fn speech_act_events(transcript: &Transcript) -> BTreeSet<EventId> {
    let mut excluded = BTreeSet::new();
    let utterances = transcript.utterances();
    for utt in utterances {
        let mut tokens = utt.event.split_whitespace().skip(1);
        let (second, third) = (tokens.next(), tokens.next());
        if second == Some("said") && third == Some("that") {
            excluded.insert(utt.eno);
            continue;
        }
        if !second.is_some_and(|t| EMBEDDING_VERBS.contains(&t)) {
            continue;
        }
        let embeds_sibling = utterances.iter().any(|other| {
            other.sno == utt.sno
                && other.eno != utt.eno
                && utt.event.len() > other.event.len()
                && utt.event.ends_with(&other.event)
                && prefix_second_token(&utt.event, &other.event)
                    .is_some_and(|t| EMBEDDING_VERBS.contains(&t))
        });
        if embeds_sibling {
            excluded.insert(utt.eno);
        }
    }
    excluded
}

/// Second whitespace token of the prefix left after removing `suffix`.
fn prefix_second_token<'a>(text: &'a str, suffix: &str) -> Option<&'a str> {
    let prefix = &text[..text.len() - suffix.len()];
    prefix.split_whitespace().nth(1)
}

/// Selects question sites from a dense event table.
///
/// For each surviving event, the belief-update sentences (excluding the
/// transcript's first and last) are kept as [`ContextType::End`] sites and,
/// when configured, the truncated midpoints between consecutive update
/// points as [`ContextType::Mid`] sites.
#[must_use]
pub fn select_sites(
    transcript: &Transcript,
    table: &EventTable,
    config: &SiteConfig,
) -> Vec<QuestionSite> {
    let excluded = if config.exclude_speech_acts {
        speech_act_events(transcript)
    } else {
        BTreeSet::new()
    };

    let (min_sno, max_sno) = (table.min_sno(), table.max_sno());
    let mut sites = Vec::new();
    for eno in table.events() {
        if excluded.contains(&eno) {
            continue;
        }
        let rows = table.event_rows(eno);

        let mut ends: BTreeSet<u32> = [min_sno, max_sno].into();
        for pair in rows.windows(2) {
            let changed = (pair[0].belief_a, pair[0].belief_b)
                != (pair[1].belief_a, pair[1].belief_b);
            if changed {
                ends.insert(pair[1].sno);
            }
        }
        let bounds: Vec<u32> = ends.iter().copied().collect();
        let mids: BTreeSet<u32> = bounds
            .windows(2)
            .map(|w| (w[0] + w[1]) / 2)
            .filter(|mid| !ends.contains(mid))
            .collect();

        for row in rows {
            // Boundary sentences never generate questions.
            if row.sno == min_sno || row.sno == max_sno {
                continue;
            }
            let context_type = if ends.contains(&row.sno) {
                ContextType::End
            } else if config.keep_midpoints && mids.contains(&row.sno) {
                ContextType::Mid
            } else {
                continue;
            };
            sites.push(QuestionSite {
                row: (*row).clone(),
                context_type,
            });
        }
    }
    sites
}
