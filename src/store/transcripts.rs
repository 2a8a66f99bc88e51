//! Transcript loading from tab-separated annotation exports.

use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use regex::Regex;

use crate::error::{CgError, CgResult, StoreError};
use crate::event::EventId;
use crate::transcript::{Speaker, Transcript, Utterance};

/// The conversations in the annotated corpus.
pub const CONVERSATIONS: [u32; 4] = [4245, 4248, 4310, 4431];

/// The annotators who produced annotation files.
pub const ANNOTATORS: [&str; 4] = ["Erica", "Lana", "Lee", "Magda"];

const COLUMNS: [&str; 7] = [
    "Sentence",
    "Eno.",
    "Event",
    "Bel(A)",
    "Bel(B)",
    "CG(A)",
    "CG(B)",
];

/// Loads annotation files from a corpus directory.
///
/// Each (conversation, annotator) pair must match exactly one file named
/// `{cid}*{annotator}*.tsv`; zero or several matches is an error, never
/// silently resolved.
#[derive(Debug, Clone)]
pub struct TranscriptLoader {
    dir: PathBuf,
    cids: Vec<u32>,
    annotators: Vec<String>,
}

impl TranscriptLoader {
    /// Creates a loader over the default corpus.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cids: CONVERSATIONS.to_vec(),
            annotators: ANNOTATORS.iter().map(|a| (*a).to_string()).collect(),
        }
    }

    /// Creates a loader over a custom conversation/annotator set.
    #[must_use]
    pub fn with_corpus(
        dir: impl Into<PathBuf>,
        cids: Vec<u32>,
        annotators: Vec<String>,
    ) -> Self {
        Self {
            dir: dir.into(),
            cids,
            annotators,
        }
    }

    /// The conversation ids this loader accepts.
    #[must_use]
    pub fn cids(&self) -> &[u32] {
        &self.cids
    }

    /// Loads the transcript for one (conversation, annotator) pair.
    ///
    /// # Errors
    ///
    /// Fails for unknown conversation ids or annotators, for zero or
    /// multiple matching files, and for any parse error in the file.
    pub fn load(&self, cid: u32, annotator: &str) -> CgResult<Transcript> {
        if !self.cids.contains(&cid) {
            return Err(StoreError::UnknownConversation { cid }.into());
        }
        if !self.annotators.iter().any(|a| a == annotator) {
            return Err(StoreError::UnknownAnnotator {
                name: annotator.to_string(),
            }
            .into());
        }
        let path = self.find_file(cid, annotator)?;
        let content = fs::read_to_string(&path).map_err(StoreError::Io)?;
        parse_transcript(cid, annotator, &content)
    }

    /// Loads every conversation for one annotator.
    ///
    /// # Errors
    ///
    /// Fails on the first conversation that cannot be loaded.
    pub fn load_annotator(&self, annotator: &str) -> CgResult<Vec<Transcript>> {
        self.cids
            .clone()
            .into_iter()
            .map(|cid| self.load(cid, annotator))
            .collect()
    }

    fn find_file(&self, cid: u32, annotator: &str) -> Result<PathBuf, StoreError> {
        let pattern = format!("{cid}*{annotator}*.tsv");
        let matcher = Regex::new(&format!("^{cid}.*{}.*\\.tsv$", regex::escape(annotator)))
            .expect("corpus file pattern is always a valid regex");

        let mut matches: Vec<PathBuf> = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name();
            if matcher.is_match(&name.to_string_lossy()) {
                matches.push(entry.path());
            }
        }
        match matches.len() {
            0 => Err(StoreError::NoMatchingFile { pattern }),
            1 => Ok(matches.remove(0)),
            count => Err(StoreError::AmbiguousFiles { pattern, count }),
        }
    }
}

/// Parses the content of one annotation file.
///
/// Blank `Sentence` cells fill forward from the previous row (several
/// events of one sentence share its text); blank annotation cells read as
/// `"None"`. Every other precondition failure is fatal.
///
/// # Errors
///
/// Returns [`StoreError`] for structural problems (missing columns, blank
/// leading sentence, unparseable event ordinals, unknown speakers) and
/// propagates annotation and ordering errors from transcript construction.
pub fn parse_transcript(cid: u32, annotator: &str, content: &str) -> CgResult<Transcript> {
    let mut lines = content.lines().enumerate();
    let (_, header) = lines
        .next()
        .ok_or(StoreError::MissingColumn {
            name: COLUMNS[0].to_string(),
        })?;
    let header_fields: Vec<&str> = header.split('\t').map(str::trim).collect();
    let mut indices = [0usize; 7];
    for (slot, name) in indices.iter_mut().zip(COLUMNS) {
        *slot = header_fields
            .iter()
            .position(|f| *f == name)
            .ok_or_else(|| StoreError::MissingColumn {
                name: name.to_string(),
            })?;
    }
    let [sentence_col, eno_col, event_col, bel_a_col, bel_b_col, cg_a_col, cg_b_col] = indices;

    let mut utterances = Vec::new();
    let mut carried: Option<(String, Speaker)> = None;
    for (idx, raw_line) in lines {
        if raw_line.trim().is_empty() {
            continue;
        }
        let line = idx + 1;
        let fields: Vec<&str> = raw_line.split('\t').collect();
        let field = |col: usize| fields.get(col).map_or("", |f| f.trim());

        let eno = EventId::from_str(field(eno_col))
            .map_err(|_| StoreError::MissingEventOrdinal { line })?;

        let (sentence, speaker) = if field(sentence_col).is_empty() {
            carried
                .clone()
                .ok_or(StoreError::LeadingBlankSentence { line })?
        } else {
            let sentence = field(sentence_col).to_string();
            let prefix = sentence.split(':').next().unwrap_or("").trim();
            let speaker = Speaker::from_str(prefix).map_err(|_| StoreError::UnknownSpeaker {
                raw: prefix.to_string(),
                line,
            })?;
            (sentence, speaker)
        };
        carried = Some((sentence.clone(), speaker));

        let cell = |col: usize| {
            let value = field(col);
            if value.is_empty() {
                "None".to_string()
            } else {
                value.to_string()
            }
        };

        utterances.push(Utterance {
            eno,
            sno: eno.sentence(),
            speaker,
            sentence,
            event: cell(event_col),
            belief_a: cell(bel_a_col),
            belief_b: cell(bel_b_col),
            cg_a: cell(cg_a_col),
            cg_b: cell(cg_b_col),
        });
    }

    Transcript::new(cid, annotator, utterances).map_err(CgError::from)
}
