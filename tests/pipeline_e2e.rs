use coground::store::{parse_transcript, QuestionStore};
use coground::{
    BeliefLabel, BeliefTimeline, CommonGroundLabel, ContextType, EventId, EventTable,
    PipelineConfig, QuestionPipeline, QuestionRecord, QuestionSite, SamplerConfig, SiteConfig,
    Speaker,
};

const HEADER: &str = "Sentence\tEno.\tEvent\tBel(A)\tBel(B)\tCG(A)\tCG(B)";

/// A two-sentence dialogue: A asserts one event, B never reacts.
fn tiny_transcript() -> coground::Transcript {
    let content = format!(
        "{HEADER}\n\
         A: the keys are on the table\t1.1\tthe keys are on the table\tCT+ 1.1\t\tJA 1.1\t\n\
         B: okay\t2.1\tokay\t\t\t\t\n"
    );
    parse_transcript(4245, "Magda", &content).unwrap()
}

#[test]
fn resolved_answers_match_annotations() {
    let transcript = tiny_transcript();
    let timeline = BeliefTimeline::build(&transcript).unwrap();
    let table = EventTable::resolve(&transcript, &timeline).unwrap();

    // The single annotated event covers both sentences.
    let eno = EventId::new(1, 1);
    let rows = table.event_rows(eno);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].belief_a, BeliefLabel::CertainTrue);
    assert_eq!(rows[1].belief_b, BeliefLabel::NoBelief);
    assert_eq!(rows[1].cg_a, CommonGroundLabel::JointlyAccepted);
    assert_eq!(rows[1].cg_b, CommonGroundLabel::NotAnnotated);

    let site = QuestionSite {
        row: rows[1].clone(),
        context_type: ContextType::End,
    };
    let questions = coground::questions_for_site(&site, 4245, "Magda");
    assert_eq!(questions.len(), 18);

    let answer = |text: &str| {
        questions
            .iter()
            .find(|q| q.question == text)
            .unwrap_or_else(|| panic!("no question {text:?}"))
            .answer_text()
    };

    // A is certain, so certainty and possibility both hold.
    assert_eq!(
        answer("Does A believe it is certainly true that the keys are on the table?"),
        "Yes"
    );
    assert_eq!(
        answer("Does A believe it is possibly true that the keys are on the table?"),
        "Yes"
    );
    // B has formed no belief.
    assert_eq!(
        answer("Does B believe it is certainly true that the keys are on the table?"),
        "No"
    );
    // A's joint acceptance lets A attribute the belief to B; B's side is
    // unannotated so the reverse attribution fails.
    assert_eq!(
        answer(
            "Does A believe that B believes it is certainly true that the keys are on the table?"
        ),
        "Yes"
    );
    assert_eq!(
        answer(
            "Does B believe that A believes it is certainly true that the keys are on the table?"
        ),
        "No"
    );
}

/// A five-sentence dialogue with an embedded speech act and belief change.
fn conversation() -> coground::Transcript {
    let content = format!(
        "{HEADER}\n\
         A: I left the keys at home\t1.1\tI left the keys at home\tCT+ 1.1\t\tIN 1.1\t\n\
         B: do you think the store is open?\t2.1\tB asks whether the store is open\tPS 2.1\t\t\t\n\
         \t2.2\tthe store is open\tPS 2.2\tPS 2.2\t\t\n\
         A: yes it is\t3.1\tit is open\tCT+ 2.2,CT+ 3.1\tPS 2.2\tJA 2.2\t\n\
         B: right\t4.1\tright\t\tCT+ 2.2\t\tJA 2.2\n\
         A: anyway\t5.1\tanyway\t\t\t\t\n"
    );
    parse_transcript(4310, "Lee", &content).unwrap()
}

#[test]
fn full_pipeline_selects_interior_change_points() {
    let transcript = conversation();
    let config = PipelineConfig {
        sites: SiteConfig::default(),
        // Keep everything: this test is about selection, not sampling.
        sampler: SamplerConfig::new(1.0, 17).unwrap(),
    };
    let questions = QuestionPipeline::new(config).run(&transcript).unwrap();

    // 7 sites (one mid for 1.1, three ends for 2.2, end plus two mids for
    // 3.1) at 18 questions each.
    assert_eq!(questions.len(), 126);

    // Boundary sentences are never asked about.
    assert!(questions.iter().all(|q| q.sno != 1 && q.sno != 5));

    // The embedding speech act contributes nothing.
    assert!(questions.iter().all(|q| q.eno != EventId::new(2, 1)));

    // The embedded proposition is asked about at each update point.
    let store_snos: Vec<u32> = {
        let mut snos: Vec<u32> = questions
            .iter()
            .filter(|q| q.eno == EventId::new(2, 2))
            .map(|q| q.sno)
            .collect();
        snos.sort_unstable();
        snos.dedup();
        snos
    };
    assert_eq!(store_snos, vec![2, 3, 4]);

    // Provenance fields are stamped on every question.
    for q in &questions {
        assert_eq!(q.cid, 4310);
        assert_eq!(q.annotator, "Lee");
        assert_eq!(q.speakers.len(), usize::from(q.order));
    }

    // Midpoints between update points are classified "mid".
    let mid = questions
        .iter()
        .find(|q| q.eno == EventId::new(3, 1) && q.sno == 2)
        .unwrap();
    assert_eq!(mid.context_type, ContextType::Mid);
    let end = questions
        .iter()
        .find(|q| q.eno == EventId::new(3, 1) && q.sno == 3)
        .unwrap();
    assert_eq!(end.context_type, ContextType::End);
}

#[test]
fn full_pipeline_downsamples_saturated_states() {
    let transcript = conversation();
    let questions = QuestionPipeline::default().run(&transcript).unwrap();

    // Two of the seven sites carry overrepresented states — (CT+,CT+,JA,JA)
    // at the store event's last update and (NB,NB,NA,NA) at a midpoint —
    // so 36 of 126 questions face 10% sampling.
    assert!(questions.len() <= 126);
    assert!(questions.len() >= 90);

    // The sampler never touches other states.
    let kept_interesting = questions
        .iter()
        .filter(|q| q.eno == EventId::new(2, 2) && q.sno == 2)
        .count();
    assert_eq!(kept_interesting, 18);
}

#[test]
fn boundary_only_transcripts_yield_no_questions() {
    // Both sentences of the tiny dialogue are transcript boundaries, so
    // nothing is selected.
    let questions = QuestionPipeline::default().run(&tiny_transcript()).unwrap();
    assert!(questions.is_empty());
}

#[test]
fn third_order_chains_return_to_asker() {
    let transcript = conversation();
    let all = QuestionPipeline::new(PipelineConfig {
        sites: SiteConfig::default(),
        sampler: SamplerConfig::new(1.0, 17).unwrap(),
    })
    .run(&transcript)
    .unwrap();
    for q in all.iter().filter(|q| q.order == 3) {
        assert_eq!(q.speakers[0], q.speakers[2]);
        assert_eq!(q.speakers[1], q.speakers[0].other());
    }
}

#[test]
fn questions_survive_store_round_trip() {
    let transcript = conversation();
    let questions = QuestionPipeline::default().run(&transcript).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let store = QuestionStore::new(dir.path());
    store.save(4310, "Lee", &questions).unwrap();

    let records = store.load_all().unwrap();
    assert_eq!(records.len(), questions.len());
    let expected: Vec<QuestionRecord> = questions.iter().map(QuestionRecord::from).collect();
    assert_eq!(records, expected);
    assert!(records
        .iter()
        .all(|r| r.answer == "Yes" || r.answer == "No"));
}

#[test]
fn speaker_prefixes_drive_speaker_ids() {
    let transcript = conversation();
    let speakers: Vec<Speaker> = transcript
        .utterances()
        .iter()
        .map(|u| u.speaker)
        .collect();
    assert_eq!(
        speakers,
        vec![
            Speaker::A,
            Speaker::B,
            Speaker::B,
            Speaker::A,
            Speaker::B,
            Speaker::A
        ]
    );
}
