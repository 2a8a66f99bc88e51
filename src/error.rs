//! Error types for coground.
//!
//! All errors are strongly typed using thiserror. Annotation problems are
//! rejected at the parse boundary; pipeline invariant violations are fatal
//! for the transcript being processed; completion failures distinguish
//! retryable rate limits from fatal API errors.

use thiserror::Error;

use crate::event::EventId;
use crate::transcript::Speaker;

/// Errors raised while parsing raw annotation cells.
///
/// Any of these rejects the entire transcript load: a cell that cannot be
/// parsed safely means the annotation export cannot be trusted.
#[derive(Debug, Error)]
pub enum AnnotationError {
    /// A label token outside both the belief and common-ground vocabularies.
    #[error("unrecognized annotation label '{token}'")]
    UnrecognizedLabel {
        /// The offending token.
        token: String,
    },

    /// A label from the other vocabulary appeared in this column.
    #[error("label '{label}' does not belong to the {expected} vocabulary")]
    WrongVocabulary {
        /// The label that was found.
        label: String,
        /// The vocabulary the column is annotated with.
        expected: &'static str,
    },

    /// A `"LABEL eventid"` pair that does not split into two tokens.
    #[error("malformed annotation pair '{pair}'")]
    MalformedPair {
        /// The raw pair text.
        pair: String,
    },

    /// An event identifier that is not of the `<sentence>.<ordinal>` form.
    #[error("invalid event identifier '{raw}'")]
    InvalidEventId {
        /// The raw identifier text.
        raw: String,
    },
}

/// Invariant violations detected while resolving the event table.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A transcript with no utterances cannot produce a timeline.
    #[error("transcript is empty")]
    EmptyTranscript,

    /// Event ordinals must strictly increase with order of introduction.
    #[error("event {eno} at sentence {sno} is out of introduction order")]
    OutOfOrderEvent {
        /// The event that broke the ordering.
        eno: EventId,
        /// The sentence index it was introduced at.
        sno: u32,
    },

    /// A common-ground entry without a matching belief entry.
    ///
    /// A common-ground status presupposes that the speaker holds a belief
    /// about the event by the same sentence.
    #[error("speaker {speaker} has common ground for event {eno} at sentence {sno} but no belief")]
    CommonGroundWithoutBelief {
        /// The speaker whose annotation is inconsistent.
        speaker: Speaker,
        /// The annotated event.
        eno: EventId,
        /// The sentence index the inconsistency was observed at.
        sno: u32,
    },

    /// An annotated event id with no introducing utterance in the transcript.
    #[error("no utterance introduces event {eno}")]
    UnknownEvent {
        /// The event id that could not be resolved to text.
        eno: EventId,
    },

    /// A sampling ratio outside (0.0, 1.0].
    #[error("keep ratio {ratio} is out of range (0.0, 1.0]")]
    KeepRatioOutOfRange {
        /// The rejected ratio.
        ratio: f64,
    },

    /// Predictions and references of different lengths cannot be scored.
    #[error("got {predictions} predictions for {references} references")]
    ScoringLengthMismatch {
        /// Number of predictions supplied.
        predictions: usize,
        /// Number of references supplied.
        references: usize,
    },
}

/// Errors raised by the transcript and question stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying filesystem failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A required column is missing from the annotation file header.
    #[error("annotation file is missing required column '{name}'")]
    MissingColumn {
        /// The column name.
        name: String,
    },

    /// A row whose event ordinal cell is blank or unparseable.
    #[error("line {line}: missing or invalid event ordinal")]
    MissingEventOrdinal {
        /// 1-based line number in the file.
        line: usize,
    },

    /// The first data row has a blank sentence, so nothing can fill forward.
    #[error("line {line}: blank sentence with no previous sentence to fill from")]
    LeadingBlankSentence {
        /// 1-based line number in the file.
        line: usize,
    },

    /// A sentence whose speaker prefix is not a known speaker.
    #[error("line {line}: unknown speaker '{raw}'")]
    UnknownSpeaker {
        /// The raw speaker prefix.
        raw: String,
        /// 1-based line number in the file.
        line: usize,
    },

    /// A conversation id outside the corpus.
    #[error("unknown conversation id {cid}")]
    UnknownConversation {
        /// The rejected conversation id.
        cid: u32,
    },

    /// An annotator outside the corpus.
    #[error("unknown annotator '{name}'")]
    UnknownAnnotator {
        /// The rejected annotator name.
        name: String,
    },

    /// No corpus file matches the (conversation, annotator) pattern.
    #[error("no file matching '{pattern}'")]
    NoMatchingFile {
        /// The file-name pattern that was searched for.
        pattern: String,
    },

    /// More than one corpus file matches the (conversation, annotator) pattern.
    #[error("{count} files match '{pattern}', expected exactly one")]
    AmbiguousFiles {
        /// The file-name pattern that was searched for.
        pattern: String,
        /// How many files matched.
        count: usize,
    },

    /// A persisted question row that cannot be parsed back.
    #[error("line {line}: malformed question row: {reason}")]
    MalformedRow {
        /// 1-based line number in the file.
        line: usize,
        /// What went wrong.
        reason: String,
    },
}

/// Errors surfaced by completion clients and the batch runner.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// The provider rejected the request due to rate limiting. Retryable.
    #[error("rate limited: {message}")]
    RateLimited {
        /// Provider-supplied detail.
        message: String,
    },

    /// Any other provider failure. Fatal for the single request.
    #[error("api error: {message}")]
    Api {
        /// Provider-supplied detail.
        message: String,
    },

    /// Retries were exhausted without a successful completion.
    #[error("gave up after {attempts} rate-limited attempts")]
    RetriesExhausted {
        /// Total attempts made.
        attempts: u32,
    },

    /// A worker disappeared before replying.
    #[error("completion worker disconnected")]
    Disconnected,
}

/// Top-level error type for coground.
///
/// This enum encompasses all possible errors that can occur when loading
/// annotations, resolving events, generating questions, or collecting
/// completions.
#[derive(Debug, Error)]
pub enum CgError {
    /// Annotation parse error.
    #[error("annotation error: {0}")]
    Annotation(#[from] AnnotationError),

    /// Pipeline invariant violation.
    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Store failure.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Completion failure.
    #[error("completion error: {0}")]
    Completion(#[from] CompletionError),

    /// Internal error.
    #[error("internal error: {message}")]
    Internal {
        /// What went wrong.
        message: String,
    },
}

impl CgError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is an annotation parse error.
    #[must_use]
    pub const fn is_annotation(&self) -> bool {
        matches!(self, Self::Annotation(_))
    }

    /// Returns true if this is a pipeline invariant violation.
    #[must_use]
    pub const fn is_pipeline(&self) -> bool {
        matches!(self, Self::Pipeline(_))
    }

    /// Returns true if this is a store failure.
    #[must_use]
    pub const fn is_store(&self) -> bool {
        matches!(self, Self::Store(_))
    }

    /// Returns true if this error is retryable.
    ///
    /// Only provider rate limits are retryable; everything else is either a
    /// hard invariant violation or a fatal per-request failure.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Completion(e) => matches!(e, CompletionError::RateLimited { .. }),
            _ => false,
        }
    }
}

/// Result type alias for coground operations.
pub type CgResult<T> = Result<T, CgError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotation_error_display() {
        let err = AnnotationError::UnrecognizedLabel {
            token: "CT?".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("CT?"));
        assert!(msg.contains("unrecognized"));
    }

    #[test]
    fn test_wrong_vocabulary_display() {
        let err = AnnotationError::WrongVocabulary {
            label: "JA".to_string(),
            expected: "belief",
        };
        let msg = format!("{err}");
        assert!(msg.contains("JA"));
        assert!(msg.contains("belief"));
    }

    #[test]
    fn test_pipeline_error_cg_without_belief() {
        let err = PipelineError::CommonGroundWithoutBelief {
            speaker: Speaker::A,
            eno: EventId::new(3, 2),
            sno: 5,
        };
        let msg = format!("{err}");
        assert!(msg.contains('A'));
        assert!(msg.contains("3.2"));
        assert!(msg.contains('5'));
    }

    #[test]
    fn test_store_error_ambiguous_files() {
        let err = StoreError::AmbiguousFiles {
            pattern: "4245*Magda*".to_string(),
            count: 2,
        };
        let msg = format!("{err}");
        assert!(msg.contains("4245*Magda*"));
        assert!(msg.contains("exactly one"));
    }

    #[test]
    fn test_cg_error_from_annotation() {
        let err: CgError = AnnotationError::MalformedPair {
            pair: "CT-".to_string(),
        }
        .into();
        assert!(err.is_annotation());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_cg_error_retryable() {
        let rate_limited: CgError = CompletionError::RateLimited {
            message: "slow down".to_string(),
        }
        .into();
        assert!(rate_limited.is_retryable());

        let api: CgError = CompletionError::Api {
            message: "bad key".to_string(),
        }
        .into();
        assert!(!api.is_retryable());

        let internal = CgError::internal("unexpected state");
        assert!(!internal.is_retryable());
        assert!(format!("{internal}").contains("unexpected state"));
    }
}
