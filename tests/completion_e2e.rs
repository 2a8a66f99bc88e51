use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use coground::completion::{
    read_records, write_records, BackoffPolicy, Completion, CompletionRunner, FOCUS_MARKER,
};
use coground::store::parse_transcript;
use coground::{
    score, CompletionClient, CompletionError, CompletionRequest, PipelineConfig, PromptTemplate,
    QuestionPipeline, RunnerConfig, SamplerConfig, SiteConfig,
};

const HEADER: &str = "Sentence\tEno.\tEvent\tBel(A)\tBel(B)\tCG(A)\tCG(B)";

fn transcript() -> coground::Transcript {
    let content = format!(
        "{HEADER}\n\
         A: the house is red\t1.1\tthe house is red\tPS 1.1\t\t\t\n\
         B: it really is\t2.1\tit really is\tCT+ 1.1\tCT+ 1.1\tJA 1.1\tJA 1.1\n\
         A: told you\t3.1\ttold you\t\t\t\t\n"
    );
    parse_transcript(4431, "Erica", &content).unwrap()
}

/// A scripted model that answers "Yes" to questions about certainty and
/// "No" otherwise, after one rate-limited attempt per prompt.
struct FlakyCertaintyModel {
    attempts: std::sync::Mutex<HashMap<String, u32>>,
}

impl CompletionClient for FlakyCertaintyModel {
    fn complete(&self, prompt: &str, model: &str) -> Result<Completion, CompletionError> {
        let mut attempts = self.attempts.lock().unwrap();
        let seen = attempts.entry(prompt.to_string()).or_insert(0);
        *seen += 1;
        if *seen == 1 {
            return Err(CompletionError::RateLimited {
                message: "first call always throttled".to_string(),
            });
        }
        let text = if prompt.contains("certainly true") {
            "Yes"
        } else {
            "No"
        };
        Ok(Completion {
            model: model.to_string(),
            text: text.to_string(),
        })
    }
}

#[test]
fn questions_collect_score_round_trip() {
    let transcript = transcript();
    let pipeline = QuestionPipeline::new(PipelineConfig {
        sites: SiteConfig::default(),
        sampler: SamplerConfig::new(1.0, 17).unwrap(),
    });
    let questions = pipeline.run(&transcript).unwrap();
    assert_eq!(questions.len(), 18);

    // Window the dialogue context around each question's focal sentence.
    let requests: Vec<CompletionRequest> = questions
        .iter()
        .map(|q| CompletionRequest::for_question(q, &transcript, 5))
        .collect();
    for request in &requests {
        assert!(request.context.contains(FOCUS_MARKER));
    }

    let runner = CompletionRunner::new(RunnerConfig {
        workers: 4,
        batch_size: 6,
        batch_delay: Duration::from_millis(1),
        queue_capacity: 8,
        backoff: BackoffPolicy {
            initial: Duration::from_millis(1),
            multiplier: 2,
            max_retries: 2,
        },
    });
    let outcomes = runner.collect(
        Arc::new(FlakyCertaintyModel {
            attempts: std::sync::Mutex::new(HashMap::new()),
        }),
        &PromptTemplate::zero_shot(),
        "scripted-model",
        requests,
    );

    // Every request recovered from its first throttled attempt, and
    // outcomes pair to questions by id in request order.
    assert_eq!(outcomes.len(), questions.len());
    let records: Vec<_> = outcomes
        .iter()
        .zip(&questions)
        .map(|(outcome, question)| {
            assert_eq!(outcome.id, question.id);
            outcome.result.as_ref().unwrap().clone()
        })
        .collect();

    // Persist and reload the run.
    let mut buffer = Vec::new();
    write_records(&mut buffer, &records).unwrap();
    let reloaded = read_records(buffer.as_slice()).unwrap();
    assert_eq!(reloaded, records);

    // Score the scripted model: it answers every "certainly" question Yes,
    // which is right exactly when the annotations agree.
    let predictions: Vec<&str> = records.iter().map(|r| r.generation.as_str()).collect();
    let references: Vec<&str> = questions.iter().map(|q| q.answer_text()).collect();
    let evaluation = score(&predictions, &references).unwrap();
    assert!(evaluation.accuracy > 0.0);
    assert!(evaluation.per_label.contains_key("Yes"));
    assert!(evaluation.per_label.contains_key("No"));
}
