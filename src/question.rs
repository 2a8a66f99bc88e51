//! Nested-belief yes/no questions and their resolution rules.
//!
//! Every selected site yields eighteen questions: both speakers crossed
//! with the three queried modalities (certainly not / certainly /
//! possibly), at nesting orders one through three. Answers are derived
//! deterministically from the four annotation labels at the site — the
//! annotations are the ground truth, no judgment call is involved.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::event::EventId;
use crate::filter::{ContextType, QuestionSite};
use crate::label::{BeliefLabel, CommonGroundLabel};
use crate::transcript::Speaker;

/// Unique identifier for a generated question.
///
/// Completions are paired back to their question through this id, never
/// through arrival order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(Uuid);

impl QuestionId {
    /// Creates a new random question ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for QuestionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The modalities a question can query. `NB`/`None` are states a speaker
/// can be in, not things one asks about.
pub const QUERIED_BELIEFS: [BeliefLabel; 3] = [
    BeliefLabel::CertainFalse,
    BeliefLabel::CertainTrue,
    BeliefLabel::PossiblyTrue,
];

/// English rendering of a queried modality inside question text.
#[must_use]
pub const fn modality(label: BeliefLabel) -> &'static str {
    match label {
        BeliefLabel::CertainFalse => "certainly not",
        BeliefLabel::CertainTrue => "certainly",
        BeliefLabel::PossiblyTrue => "possibly",
        // Never queried.
        BeliefLabel::NoBelief | BeliefLabel::None => "certainly",
    }
}

/// A generated yes/no question with its derived answer and provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Pairing identity for completion collection.
    pub id: QuestionId,

    /// Sentence index of the source site.
    pub sno: u32,

    /// Event of the source site.
    pub eno: EventId,

    /// Speaker A's belief at the site.
    pub belief_a: BeliefLabel,

    /// Speaker B's belief at the site.
    pub belief_b: BeliefLabel,

    /// The queried modality.
    pub belief_q: BeliefLabel,

    /// Speaker A's common-ground status at the site.
    pub cg_a: CommonGroundLabel,

    /// Speaker B's common-ground status at the site.
    pub cg_b: CommonGroundLabel,

    /// Nesting depth: 1, 2, or 3.
    pub order: u8,

    /// The speaker chain, outermost first.
    pub speakers: Vec<Speaker>,

    /// Literal event text the question is about.
    pub event: String,

    /// Full question text.
    pub question: String,

    /// Derived ground-truth answer.
    pub answer: bool,

    /// Site classification the question came from.
    pub context_type: ContextType,

    /// Conversation id.
    pub cid: u32,

    /// Annotator name.
    pub annotator: String,
}

impl Question {
    /// The answer as it is persisted.
    #[must_use]
    pub const fn answer_text(&self) -> &'static str {
        if self.answer {
            "Yes"
        } else {
            "No"
        }
    }
}

/// Resolves "Does S believe it is Q true that E?".
///
/// True when the queried modality matches the speaker's belief, or when
/// possibility is queried and the speaker is certain: certainty entails
/// possibility.
#[must_use]
pub fn resolve_first_order(question: BeliefLabel, belief: BeliefLabel) -> bool {
    question == belief
        || (question == BeliefLabel::PossiblyTrue && belief == BeliefLabel::CertainTrue)
}

/// Resolves "Does S1 believe that S2 believes it is Q true that E?".
///
/// Positive-polarity questions (Q is PS or CT+) are answered yes only when
/// S1 has the event in the common ground (jointly or individually
/// accepted) and S1's own belief matches the query. Negative-polarity
/// questions (Q is CT-) are answered yes when S1 has rejected the event
/// and *S2's* belief is CT-: a rejection entering the common ground means
/// S1 knows the other side's disbelief.
#[must_use]
pub fn resolve_second_order(
    question: BeliefLabel,
    belief1: BeliefLabel,
    belief2: BeliefLabel,
    cg1: CommonGroundLabel,
    _cg2: CommonGroundLabel,
) -> bool {
    let positive = matches!(
        question,
        BeliefLabel::PossiblyTrue | BeliefLabel::CertainTrue
    ) && cg1.is_accepted()
        && (question == belief1
            || (question == BeliefLabel::PossiblyTrue && belief1 == BeliefLabel::CertainTrue));
    if positive {
        return true;
    }
    question == BeliefLabel::CertainFalse
        && cg1 == CommonGroundLabel::Rejected
        && question == belief2
}

/// Resolves "Does S1 believe that S2 believes that S1 believes it is Q
/// true that E?".
///
/// The positive branch is identical to the second-order rule. The negative
/// branch differs: it accepts rejected *or unannotated* common ground and
/// checks S1's own belief rather than S2's.
#[must_use]
pub fn resolve_third_order(
    question: BeliefLabel,
    belief1: BeliefLabel,
    _belief2: BeliefLabel,
    cg1: CommonGroundLabel,
    _cg2: CommonGroundLabel,
) -> bool {
    let positive = matches!(
        question,
        BeliefLabel::PossiblyTrue | BeliefLabel::CertainTrue
    ) && cg1.is_accepted()
        && (question == belief1
            || (question == BeliefLabel::PossiblyTrue && belief1 == BeliefLabel::CertainTrue));
    if positive {
        return true;
    }
    question == BeliefLabel::CertainFalse
        && matches!(
            cg1,
            CommonGroundLabel::Rejected | CommonGroundLabel::NotAnnotated
        )
        && question == belief1
}

/// Generates all eighteen questions for one site.
#[must_use]
pub fn questions_for_site(site: &QuestionSite, cid: u32, annotator: &str) -> Vec<Question> {
    let row = &site.row;
    let mut questions = Vec::with_capacity(18);

    let mut push = |order: u8, speakers: Vec<Speaker>, belief_q: BeliefLabel, text: String, answer: bool| {
        questions.push(Question {
            id: QuestionId::new(),
            sno: row.sno,
            eno: row.eno,
            belief_a: row.belief_a,
            belief_b: row.belief_b,
            belief_q,
            cg_a: row.cg_a,
            cg_b: row.cg_b,
            order,
            speakers,
            event: row.event.clone(),
            question: text,
            answer,
            context_type: site.context_type,
            cid,
            annotator: annotator.to_string(),
        });
    };

    for speaker in [Speaker::A, Speaker::B] {
        for belief_q in QUERIED_BELIEFS {
            push(
                1,
                vec![speaker],
                belief_q,
                format!(
                    "Does {speaker} believe it is {} true that {}?",
                    modality(belief_q),
                    row.event
                ),
                resolve_first_order(belief_q, row.belief(speaker)),
            );
        }
    }

    for s1 in [Speaker::A, Speaker::B] {
        let s2 = s1.other();
        for belief_q in QUERIED_BELIEFS {
            push(
                2,
                vec![s1, s2],
                belief_q,
                format!(
                    "Does {s1} believe that {s2} believes it is {} true that {}?",
                    modality(belief_q),
                    row.event
                ),
                resolve_second_order(
                    belief_q,
                    row.belief(s1),
                    row.belief(s2),
                    row.common_ground(s1),
                    row.common_ground(s2),
                ),
            );
        }
    }

    // Third-order chains always return to the asking speaker.
    for s1 in [Speaker::A, Speaker::B] {
        let s2 = s1.other();
        for belief_q in QUERIED_BELIEFS {
            push(
                3,
                vec![s1, s2, s1],
                belief_q,
                format!(
                    "Does {s1} believe that {s2} believes that {s1} believes it is {} true that {}?",
                    modality(belief_q),
                    row.event
                ),
                resolve_third_order(
                    belief_q,
                    row.belief(s1),
                    row.belief(s2),
                    row.common_ground(s1),
                    row.common_ground(s2),
                ),
            );
        }
    }

    questions
}
