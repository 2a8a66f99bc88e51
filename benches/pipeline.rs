use criterion::{criterion_group, criterion_main, Criterion, Throughput};

use coground::{
    EventId, PipelineConfig, QuestionPipeline, SamplerConfig, SiteConfig, Speaker, Transcript,
    Utterance,
};

/// A synthetic dialogue: `sentences` sentences, one event introduced per
/// sentence, each event's belief pair updated twice over its lifetime.
fn make_transcript(sentences: u32) -> Transcript {
    let mut utterances = Vec::with_capacity(sentences as usize);
    for sno in 1..=sentences {
        let eno = EventId::new(sno, 1);
        let speaker = if sno % 2 == 0 { Speaker::B } else { Speaker::A };
        // Annotate the freshly introduced event, and upgrade a belief from
        // a few sentences back.
        let mut belief_a = format!("PS {eno}");
        if sno > 3 {
            belief_a.push_str(&format!(",CT+ {}", EventId::new(sno - 3, 1)));
        }
        let cg_a = if sno > 3 {
            format!("JA {}", EventId::new(sno - 3, 1))
        } else {
            "None".to_string()
        };
        utterances.push(Utterance {
            eno,
            sno,
            speaker,
            sentence: format!("{speaker}: sentence number {sno}"),
            event: format!("event number {sno}"),
            belief_a,
            belief_b: format!("PS {eno}"),
            cg_a,
            cg_b: "None".to_string(),
        });
    }
    Transcript::new(4245, "Magda", utterances).unwrap()
}

fn bench_pipeline_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline/run");
    for sentences in [16u32, 64, 128] {
        let transcript = make_transcript(sentences);
        let pipeline = QuestionPipeline::new(PipelineConfig {
            sites: SiteConfig::default(),
            sampler: SamplerConfig::new(1.0, 17).unwrap(),
        });
        group.throughput(Throughput::Elements(u64::from(sentences)));
        group.bench_function(format!("{sentences}_sentences"), |b| {
            b.iter(|| pipeline.run(&transcript).unwrap());
        });
    }
    group.finish();
}

fn bench_downsampling(c: &mut Criterion) {
    let transcript = make_transcript(64);
    let questions = QuestionPipeline::new(PipelineConfig {
        sites: SiteConfig::default(),
        sampler: SamplerConfig::new(1.0, 17).unwrap(),
    })
    .run(&transcript)
    .unwrap();

    c.bench_function("pipeline/downsample", |b| {
        b.iter(|| {
            coground::downsample(questions.clone(), &SamplerConfig::default())
        });
    });
}

criterion_group!(benches, bench_pipeline_run, bench_downsampling);
criterion_main!(benches);
