use exampaper::{
    config::ExamConfig,
    gen::html::ExamMeta,
    orchestrator::{Orchestrator, Outcome},
    provider::{Attachment, CannedProvider},
};

fn main() {
    //! Title and exam body are requested in parallel, then rendered
    //!
    //! A canned provider stands in for a real one here

    // RUST_LOG=exampaper=debug shows every classification decision
    tracing_subscriber::fmt::init();

    let workpath = demos_util::demo_dir("basic_exam");
    let (generated, output) =
        demos_util::setup_io(workpath.join("input.txt"), workpath.join("orchestrated.html")).unwrap();

    let provider = CannedProvider::new("Calculus Fundamentals", generated);
    let orchestrator = Orchestrator::new(provider);

    let config = ExamConfig {
        mcq_count: 2,
        short_answer_count: 3,
        ..ExamConfig::new("Calculus", "not-a-real-key")
    };
    // second attachment is ignored, with a warning
    let attachments = [
        Attachment::pdf(b"%PDF-1.4 syllabus".to_vec()),
        Attachment::pdf(b"%PDF-1.4 past paper".to_vec()),
    ];

    let Outcome::Generation(generation) = orchestrator.generate(&config, attachments).unwrap() else {
        unreachable!("Nothing else was started")
    };
    let Some(outcome) = generation.render() else {
        panic!("Exam request failed: {:?}", generation.body);
    };

    let mut meta = outcome
        .document()
        .map(ExamMeta::collect)
        .unwrap_or_default()
        .with_topic(&config.topic);
    if let Some(title) = generation.title.title() {
        meta = meta.with_title(title);
    }

    exampaper::gen(&outcome, &meta, output).unwrap();
}
