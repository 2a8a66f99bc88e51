//! # Coground — common-ground belief tracking for dialogue
//!
//! Coground turns per-utterance "common ground" annotations of two-party
//! dialogue transcripts into a dense event/belief timeline, and from it
//! synthesizes batteries of nested yes/no theory-of-mind questions
//! ("does A believe that B believes that event E is true?") whose
//! ground-truth answers are derived deterministically from the
//! annotations.
//!
//! ## Core Concepts
//!
//! - **Event**: a proposition introduced by an utterance, identified by
//!   its sentence and ordinal within it
//! - **BeliefLabel / CommonGroundLabel**: the two closed annotation
//!   vocabularies — private epistemic stance and social uptake
//! - **BeliefTimeline**: the cumulative annotation state after each
//!   utterance, folded from per-utterance deltas
//! - **EventTable**: one resolved row per (event, sentence), dense over
//!   the whole transcript
//! - **Question**: a generated yes/no question with its derived answer
//!   and full provenance
//!
//! ## Usage
//!
//! ```rust,ignore
//! use coground::{QuestionPipeline, TranscriptLoader};
//!
//! let loader = TranscriptLoader::new("data/cg");
//! let transcript = loader.load(4245, "Magda")?;
//! let questions = QuestionPipeline::default().run(&transcript)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Core types
pub mod annotation;
pub mod error;
pub mod event;
pub mod label;
pub mod transcript;

// Pipeline stages
pub mod filter;
pub mod pipeline;
pub mod question;
pub mod resolve;
pub mod sample;
pub mod timeline;

// Collaborators
pub mod completion;
pub mod eval;
pub mod store;

// Re-export primary types at crate root for convenience
pub use annotation::{BeliefState, CommonGroundState};
pub use error::{AnnotationError, CgError, CgResult, CompletionError, PipelineError, StoreError};
pub use event::EventId;
pub use filter::{select_sites, speech_act_events, ContextType, QuestionSite, SiteConfig};
pub use label::{BeliefLabel, CommonGroundLabel};
pub use pipeline::{PipelineConfig, QuestionPipeline};
pub use question::{
    questions_for_site, resolve_first_order, resolve_second_order, resolve_third_order, Question,
    QuestionId, QUERIED_BELIEFS,
};
pub use resolve::{EventRow, EventTable};
pub use sample::{downsample, SamplerConfig};
pub use timeline::{BeliefTimeline, TimelineSnapshot};
pub use transcript::{Speaker, Transcript, Utterance};

// Collaborator re-exports
pub use completion::{
    CompletionClient, CompletionRecord, CompletionRequest, CompletionRunner, PromptTemplate,
    RunnerConfig,
};
pub use eval::{score, Evaluation, LabelMetrics};
pub use store::{QuestionRecord, QuestionStore, TranscriptLoader};
