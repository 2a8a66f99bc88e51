//! Batched, rate-limit-aware completion collection.
//!
//! A small bounded, thread-based pool drives an ordered sequence of
//! requests against an injected [`CompletionClient`]. Requests go out in
//! fixed-size batches separated by a fixed delay; each request retries
//! rate limits with exponential backoff, independently of the others. A
//! fatal error fails its own request only. Results are paired to requests
//! by question id, so nothing depends on response arrival order.

use std::collections::HashMap;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::Utc;
use crossbeam_channel::{bounded, Receiver, Sender};

use crate::error::CompletionError;
use crate::question::QuestionId;

use super::{CompletionClient, CompletionRecord, CompletionRequest, PromptTemplate};

/// Exponential-backoff policy for rate-limited requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    /// Delay before the first retry.
    pub initial: Duration,

    /// Multiplier applied per retry.
    pub multiplier: u32,

    /// Retries before giving up.
    pub max_retries: u32,
}

impl BackoffPolicy {
    /// Delay before retry number `attempt` (0-based).
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.initial
            .saturating_mul(self.multiplier.saturating_pow(attempt))
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            initial: Duration::from_millis(500),
            multiplier: 2,
            max_retries: 6,
        }
    }
}

/// Runner configuration.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Worker threads issuing requests.
    pub workers: usize,

    /// Requests per batch.
    pub batch_size: usize,

    /// Fixed pause between batches.
    pub batch_delay: Duration,

    /// Maximum queued jobs.
    pub queue_capacity: usize,

    /// Retry policy for rate limits.
    pub backoff: BackoffPolicy,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            workers: 2,
            batch_size: 60,
            batch_delay: Duration::from_secs(1),
            queue_capacity: 64,
            backoff: BackoffPolicy::default(),
        }
    }
}

/// The result of one request, paired by question id.
#[derive(Debug)]
pub struct CompletionOutcome {
    /// The originating question.
    pub id: QuestionId,

    /// The collected record, or the fatal error for this request.
    pub result: Result<CompletionRecord, CompletionError>,
}

struct Job {
    id: QuestionId,
    prompt: String,
}

/// Drives a sequence of requests to completion.
pub struct CompletionRunner {
    config: RunnerConfig,
}

impl CompletionRunner {
    /// Creates a runner.
    #[must_use]
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    /// Collects a completion for every request.
    ///
    /// Returns one outcome per request, in request order, regardless of
    /// the order responses arrived in.
    #[must_use]
    pub fn collect(
        &self,
        client: Arc<dyn CompletionClient>,
        template: &PromptTemplate,
        model: &str,
        requests: Vec<CompletionRequest>,
    ) -> Vec<CompletionOutcome> {
        let order: Vec<QuestionId> = requests.iter().map(|r| r.id).collect();
        let expected = requests.len();

        let workers = self.config.workers.max(1);
        let (job_tx, job_rx) = bounded::<Job>(self.config.queue_capacity.max(1));
        let (result_tx, result_rx) =
            bounded::<(QuestionId, Result<CompletionRecord, CompletionError>)>(expected.max(1));

        let handles = self.spawn_workers(workers, &client, template, model, &job_rx, &result_tx);
        drop(result_tx);

        // Feed batches; the bounded job queue applies backpressure.
        for (batch_no, batch) in requests.chunks(self.config.batch_size.max(1)).enumerate() {
            if batch_no > 0 {
                thread::sleep(self.config.batch_delay);
            }
            for request in batch {
                let job = Job {
                    id: request.id,
                    prompt: template.render(&request.context, &request.question),
                };
                if job_tx.send(job).is_err() {
                    break;
                }
            }
        }
        drop(job_tx);

        let mut results: HashMap<QuestionId, Result<CompletionRecord, CompletionError>> =
            HashMap::with_capacity(expected);
        while let Ok((id, result)) = result_rx.recv() {
            results.insert(id, result);
        }
        for handle in handles {
            let _ = handle.join();
        }

        order
            .into_iter()
            .map(|id| CompletionOutcome {
                id,
                result: results
                    .remove(&id)
                    .unwrap_or(Err(CompletionError::Disconnected)),
            })
            .collect()
    }

    fn spawn_workers(
        &self,
        workers: usize,
        client: &Arc<dyn CompletionClient>,
        template: &PromptTemplate,
        model: &str,
        job_rx: &Receiver<Job>,
        result_tx: &Sender<(QuestionId, Result<CompletionRecord, CompletionError>)>,
    ) -> Vec<JoinHandle<()>> {
        let mut handles = Vec::with_capacity(workers);
        for idx in 0..workers {
            let rx = job_rx.clone();
            let tx = result_tx.clone();
            let client = Arc::clone(client);
            let backoff = self.config.backoff;
            let fingerprint = template.fingerprint();
            let model = model.to_string();
            let handle = thread::Builder::new()
                .name(format!("coground-completion-{idx}"))
                .spawn(move || {
                    while let Ok(job) = rx.recv() {
                        let result =
                            complete_with_retry(client.as_ref(), &job.prompt, &model, backoff)
                                .map(|completion| CompletionRecord {
                                    id: job.id,
                                    prompt: job.prompt.clone(),
                                    template_fingerprint: fingerprint.clone(),
                                    model: completion.model,
                                    timestamp: Utc::now(),
                                    generation: completion.text,
                                });
                        let _ = tx.send((job.id, result));
                    }
                })
                .expect("failed to spawn completion worker");
            handles.push(handle);
        }
        handles
    }
}

fn complete_with_retry(
    client: &dyn CompletionClient,
    prompt: &str,
    model: &str,
    backoff: BackoffPolicy,
) -> Result<super::Completion, CompletionError> {
    let mut attempt = 0;
    loop {
        match client.complete(prompt, model) {
            Ok(completion) => return Ok(completion),
            Err(CompletionError::RateLimited { .. }) if attempt < backoff.max_retries => {
                thread::sleep(backoff.delay_for(attempt));
                attempt += 1;
            }
            Err(CompletionError::RateLimited { .. }) => {
                return Err(CompletionError::RetriesExhausted {
                    attempts: attempt + 1,
                })
            }
            Err(err) => return Err(err),
        }
    }
}
