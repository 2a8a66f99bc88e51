//! End-to-end question generation.
//!
//! Chains the stages: cumulative timeline, dense event resolution, site
//! selection, question generation, downsampling. Each stage is pure; the
//! pipeline owns nothing but configuration and can be rerun against any
//! number of transcripts.

use crate::error::CgResult;
use crate::filter::{select_sites, SiteConfig};
use crate::question::{questions_for_site, Question};
use crate::resolve::EventTable;
use crate::sample::{downsample, SamplerConfig};
use crate::timeline::BeliefTimeline;
use crate::transcript::Transcript;

/// Configuration for the full pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PipelineConfig {
    /// Site-selection settings.
    pub sites: SiteConfig,

    /// Downsampling settings.
    pub sampler: SamplerConfig,
}

/// Generates nested-belief questions from annotated transcripts.
#[derive(Debug, Clone, Default)]
pub struct QuestionPipeline {
    config: PipelineConfig,
}

impl QuestionPipeline {
    /// Creates a pipeline with the given configuration.
    #[must_use]
    pub const fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// The pipeline's configuration.
    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs every stage against one transcript.
    ///
    /// # Errors
    ///
    /// Propagates annotation parse errors and event-resolution invariant
    /// violations; any error rejects the transcript as a whole.
    pub fn run(&self, transcript: &Transcript) -> CgResult<Vec<Question>> {
        let timeline = BeliefTimeline::build(transcript)?;
        let table = EventTable::resolve(transcript, &timeline)?;
        let sites = select_sites(transcript, &table, &self.config.sites);

        let mut questions = Vec::with_capacity(sites.len() * 18);
        for site in &sites {
            questions.extend(questions_for_site(
                site,
                transcript.cid(),
                transcript.annotator(),
            ));
        }
        Ok(downsample(questions, &self.config.sampler))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventId;
    use crate::transcript::{Speaker, Utterance};

    fn utt(eno: &str, event: &str, cells: [&str; 4]) -> Utterance {
        let eno: EventId = eno.parse().unwrap();
        Utterance {
            eno,
            sno: eno.sentence(),
            speaker: Speaker::A,
            sentence: format!("A: sentence {}", eno.sentence()),
            event: event.to_string(),
            belief_a: cells[0].to_string(),
            belief_b: cells[1].to_string(),
            cg_a: cells[2].to_string(),
            cg_b: cells[3].to_string(),
        }
    }

    #[test]
    fn test_run_produces_provenance_stamped_questions() {
        let transcript = Transcript::new(
            4310,
            "Lee",
            vec![
                utt("1.1", "the keys are lost", ["PS 1.1", "None", "None", "None"]),
                utt("2.1", "filler", ["CT+ 1.1", "CT+ 1.1", "IN 1.1", "IN 1.1"]),
                utt("3.1", "filler", ["None", "None", "None", "None"]),
            ],
        )
        .unwrap();

        let pipeline = QuestionPipeline::default();
        let questions = pipeline.run(&transcript).unwrap();

        // One interior update point (sentence 2) times 18 questions; the
        // (CT+, CT+, IN, IN) state is not downsampled.
        assert_eq!(questions.len(), 18);
        for q in &questions {
            assert_eq!(q.cid, 4310);
            assert_eq!(q.annotator, "Lee");
            assert_eq!(q.sno, 2);
            assert_eq!(q.eno, EventId::new(1, 1));
        }
    }

    #[test]
    fn test_run_rejects_malformed_annotations() {
        let transcript = Transcript::new(
            4310,
            "Lee",
            vec![utt("1.1", "x", ["BAD 1.1", "None", "None", "None"])],
        )
        .unwrap();
        assert!(QuestionPipeline::default().run(&transcript).is_err());
    }
}
