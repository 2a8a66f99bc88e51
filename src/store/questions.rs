//! Question persistence as CSV.
//!
//! One row per generated question, in the fixed column order consumed by
//! downstream evaluation. Fields are quoted only when they need to be;
//! no field may contain a line break (sentence and event text are
//! single-line by construction).

use std::borrow::Cow;
use std::fs;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CgResult, StoreError};
use crate::event::EventId;
use crate::filter::ContextType;
use crate::label::{BeliefLabel, CommonGroundLabel};
use crate::question::Question;

const COLUMNS: [&str; 13] = [
    "sno",
    "eno",
    "belief_A",
    "belief_B",
    "belief_Q",
    "cg_A",
    "cg_B",
    "order",
    "question",
    "answer",
    "context_type",
    "cid",
    "annotator",
];

/// One persisted question row.
///
/// This mirrors the CSV contract exactly; in-process pairing ids are not
/// part of it and are reassigned when questions are re-derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
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
    /// Nesting depth.
    pub order: u8,
    /// Full question text.
    pub question: String,
    /// `"Yes"` or `"No"`.
    pub answer: String,
    /// Site classification.
    pub context_type: ContextType,
    /// Conversation id.
    pub cid: u32,
    /// Annotator name.
    pub annotator: String,
}

impl From<&Question> for QuestionRecord {
    fn from(q: &Question) -> Self {
        Self {
            sno: q.sno,
            eno: q.eno,
            belief_a: q.belief_a,
            belief_b: q.belief_b,
            belief_q: q.belief_q,
            cg_a: q.cg_a,
            cg_b: q.cg_b,
            order: q.order,
            question: q.question.clone(),
            answer: q.answer_text().to_string(),
            context_type: q.context_type,
            cid: q.cid,
            annotator: q.annotator.clone(),
        }
    }
}

/// Writes questions as CSV, header included.
///
/// # Errors
///
/// Propagates writer failures.
pub fn write_questions<W: Write>(writer: W, questions: &[Question]) -> std::io::Result<()> {
    let mut writer = BufWriter::new(writer);
    writeln!(writer, "{}", COLUMNS.join(","))?;
    for question in questions {
        let record = QuestionRecord::from(question);
        let fields = [
            record.sno.to_string(),
            record.eno.to_string(),
            record.belief_a.to_string(),
            record.belief_b.to_string(),
            record.belief_q.to_string(),
            record.cg_a.to_string(),
            record.cg_b.to_string(),
            record.order.to_string(),
            record.question,
            record.answer,
            record.context_type.to_string(),
            record.cid.to_string(),
            record.annotator,
        ];
        let line: Vec<Cow<'_, str>> = fields.iter().map(|f| escape(f)).collect();
        writeln!(writer, "{}", line.join(","))?;
    }
    writer.flush()
}

/// Reads question rows back from CSV.
///
/// # Errors
///
/// Returns [`StoreError`] for header mismatches and rows that do not parse
/// back into the typed record.
pub fn read_questions<R: Read>(mut reader: R) -> Result<Vec<QuestionRecord>, StoreError> {
    let mut content = String::new();
    reader.read_to_string(&mut content)?;

    let mut lines = content.lines().enumerate();
    let header = lines.next().map(|(_, l)| l).unwrap_or_default();
    if header != COLUMNS.join(",") {
        return Err(StoreError::MalformedRow {
            line: 1,
            reason: format!("unexpected header '{header}'"),
        });
    }

    let mut records = Vec::new();
    for (idx, raw_line) in lines {
        if raw_line.is_empty() {
            continue;
        }
        let line = idx + 1;
        let fields = split_row(raw_line, line)?;
        if fields.len() != COLUMNS.len() {
            return Err(StoreError::MalformedRow {
                line,
                reason: format!("expected {} fields, got {}", COLUMNS.len(), fields.len()),
            });
        }
        let bad = |reason: &str| StoreError::MalformedRow {
            line,
            reason: reason.to_string(),
        };
        records.push(QuestionRecord {
            sno: fields[0].parse().map_err(|_| bad("sno"))?,
            eno: EventId::from_str(&fields[1]).map_err(|_| bad("eno"))?,
            belief_a: BeliefLabel::from_str(&fields[2]).map_err(|_| bad("belief_A"))?,
            belief_b: BeliefLabel::from_str(&fields[3]).map_err(|_| bad("belief_B"))?,
            belief_q: BeliefLabel::from_str(&fields[4]).map_err(|_| bad("belief_Q"))?,
            cg_a: CommonGroundLabel::from_str(&fields[5]).map_err(|_| bad("cg_A"))?,
            cg_b: CommonGroundLabel::from_str(&fields[6]).map_err(|_| bad("cg_B"))?,
            order: fields[7].parse().map_err(|_| bad("order"))?,
            question: fields[8].clone(),
            answer: match fields[9].as_str() {
                "Yes" | "No" => fields[9].clone(),
                _ => return Err(bad("answer")),
            },
            context_type: match fields[10].as_str() {
                "end" => ContextType::End,
                "mid" => ContextType::Mid,
                _ => return Err(bad("context_type")),
            },
            cid: fields[11].parse().map_err(|_| bad("cid"))?,
            annotator: fields[12].clone(),
        });
    }
    Ok(records)
}

/// Directory of question files, one per (conversation, annotator).
#[derive(Debug, Clone)]
pub struct QuestionStore {
    dir: PathBuf,
}

impl QuestionStore {
    /// Creates a store rooted at `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Persists one conversation's questions, returning the file path.
    ///
    /// # Errors
    ///
    /// Propagates filesystem failures.
    pub fn save(&self, cid: u32, annotator: &str, questions: &[Question]) -> CgResult<PathBuf> {
        fs::create_dir_all(&self.dir).map_err(StoreError::Io)?;
        let path = self.dir.join(format!("{cid}_{annotator}_yn_questions.csv"));
        let file = fs::File::create(&path).map_err(StoreError::Io)?;
        write_questions(file, questions).map_err(StoreError::Io)?;
        Ok(path)
    }

    /// Reads every question file in the store.
    ///
    /// # Errors
    ///
    /// Propagates filesystem and row-parse failures.
    pub fn load_all(&self) -> CgResult<Vec<QuestionRecord>> {
        let mut records = Vec::new();
        let mut paths: Vec<PathBuf> = fs::read_dir(&self.dir)
            .map_err(StoreError::Io)?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "csv"))
            .collect();
        paths.sort();
        for path in paths {
            records.extend(self.load_file(&path)?);
        }
        Ok(records)
    }

    fn load_file(&self, path: &Path) -> CgResult<Vec<QuestionRecord>> {
        let file = fs::File::open(path).map_err(StoreError::Io)?;
        Ok(read_questions(file)?)
    }
}

fn escape(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

fn split_row(line: &str, line_no: usize) -> Result<Vec<String>, StoreError> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars().peekable();
    let mut quoted = false;
    while let Some(c) = chars.next() {
        match c {
            '"' if current.is_empty() && !quoted => quoted = true,
            '"' if quoted => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    current.push('"');
                } else {
                    quoted = false;
                }
            }
            ',' if !quoted => {
                fields.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    if quoted {
        return Err(StoreError::MalformedRow {
            line: line_no,
            reason: "unterminated quote".to_string(),
        });
    }
    fields.push(current);
    Ok(fields)
}
