//! Completion collection against language-model providers.
//!
//! The pipeline itself never talks to a network; providers are injected
//! behind [`CompletionClient`]. The contract toward the pipeline is small:
//! given a prompt and a model name, return a completion string, or fail
//! with a retryable rate-limit error or a fatal API error. Completions are
//! paired back to their originating question through the question's id,
//! never through arrival order.

mod runner;

pub use runner::{BackoffPolicy, CompletionOutcome, CompletionRunner, RunnerConfig};

use std::io::{BufRead, BufReader, Read, Write};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CgResult, CompletionError, StoreError};
use crate::question::{Question, QuestionId};
use crate::transcript::Transcript;

/// Marker appended to the focal sentence of a question's context window.
pub const FOCUS_MARKER: &str = "🛑";

/// Default number of sentences shown on each side of the focal sentence.
pub const DEFAULT_CONTEXT_WINDOW: usize = 5;

/// Default zero-shot prompt template.
pub const ZERO_SHOT_TEMPLATE: &str = "\
Below is a dialogue between two speakers, A and B. The sentence the \
question is about is marked with 🛑.

Dialogue:
{context}

Answer the question with Yes or No only.
Question: {question}
Answer:";

/// A successful provider response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// The concrete model that produced the text.
    pub model: String,

    /// The completion text.
    pub text: String,
}

/// A language-model provider.
///
/// Implementations decide batching-unrelated details (transport,
/// authentication, temperature). They must be callable from several worker
/// threads at once.
pub trait CompletionClient: Send + Sync {
    /// Requests one completion.
    ///
    /// # Errors
    ///
    /// [`CompletionError::RateLimited`] is retried by the runner with
    /// exponential backoff; any other error is fatal for this request only.
    fn complete(&self, prompt: &str, model: &str) -> Result<Completion, CompletionError>;
}

/// One request: a question plus the dialogue context to show the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    /// Identity carried through to the response.
    pub id: QuestionId,

    /// Dialogue context, focal sentence marked.
    pub context: String,

    /// Question text.
    pub question: String,
}

impl CompletionRequest {
    /// Builds the request for one question, windowing the transcript's
    /// sentences around the question's focal sentence.
    #[must_use]
    pub fn for_question(question: &Question, transcript: &Transcript, window: usize) -> Self {
        Self {
            id: question.id,
            context: windowed_context(transcript, question.sno, window),
            question: question.question.clone(),
        }
    }
}

/// A collected completion with its provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRecord {
    /// The originating question.
    pub id: QuestionId,

    /// The fully rendered prompt.
    pub prompt: String,

    /// Fingerprint of the template the prompt was rendered from.
    pub template_fingerprint: String,

    /// The model that answered.
    pub model: String,

    /// When the completion was received.
    pub timestamp: DateTime<Utc>,

    /// The completion text.
    pub generation: String,
}

/// A prompt template with `{context}` and `{question}` slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    text: String,
}

impl PromptTemplate {
    /// Creates a template from arbitrary text.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// The built-in zero-shot template.
    #[must_use]
    pub fn zero_shot() -> Self {
        Self::new(ZERO_SHOT_TEMPLATE)
    }

    /// Renders the template for one request.
    #[must_use]
    pub fn render(&self, context: &str, question: &str) -> String {
        self.text
            .replace("{context}", context)
            .replace("{question}", question)
    }

    /// Stable short fingerprint of the template text, for naming runs.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        blake3::hash(self.text.as_bytes()).to_hex()[..16].to_string()
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::zero_shot()
    }
}

/// Joins the sentences within `window` of the focal sentence, appending
/// the focus marker to the focal sentence itself.
#[must_use]
pub fn windowed_context(transcript: &Transcript, focus_sno: u32, window: usize) -> String {
    let window = window as i64;
    let focus = i64::from(focus_sno);
    let mut lines = Vec::new();
    for (sno, text) in transcript.sentences() {
        let distance = i64::from(sno) - focus;
        if distance.abs() > window {
            continue;
        }
        if sno == focus_sno {
            lines.push(format!("{text} {FOCUS_MARKER}"));
        } else {
            lines.push(text.to_string());
        }
    }
    lines.join("\n")
}

/// Writes completion records as JSON lines.
///
/// # Errors
///
/// Propagates writer and serialization failures.
pub fn write_records<W: Write>(mut writer: W, records: &[CompletionRecord]) -> CgResult<()> {
    for record in records {
        let line = serde_json::to_string(record)
            .map_err(|e| StoreError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?;
        writeln!(writer, "{line}").map_err(StoreError::Io)?;
    }
    Ok(())
}

/// Reads completion records from JSON lines.
///
/// # Errors
///
/// Returns [`StoreError::MalformedRow`] for lines that do not deserialize.
pub fn read_records<R: Read>(reader: R) -> CgResult<Vec<CompletionRecord>> {
    let reader = BufReader::new(reader);
    let mut records = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(StoreError::Io)?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line).map_err(|e| StoreError::MalformedRow {
            line: idx + 1,
            reason: e.to_string(),
        })?;
        records.push(record);
    }
    Ok(records)
}
