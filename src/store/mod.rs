//! Persistence for annotation inputs and question outputs.
//!
//! Two stores, both file-based:
//! - transcript loading from tab-separated annotation exports (a fixed
//!   external contract: columns, delimiter, and blank-cell conventions are
//!   the exporter's, not ours),
//! - question persistence as CSV, one row per generated question.
//!
//! Everything in between (timelines, event tables, sites) is recomputed on
//! every run and never persisted.

mod questions;
mod transcripts;

pub use questions::{read_questions, write_questions, QuestionRecord, QuestionStore};
pub use transcripts::{parse_transcript, TranscriptLoader, ANNOTATORS, CONVERSATIONS};
