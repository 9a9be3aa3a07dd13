use exampaper::{
    gen::html::{ExamMeta, HtmlExam, Style},
    math_engine::PrimitiveEngine,
    FmtToIo,
};

fn main() {
    //! Renders generated exam text into a print-ready html page
    //!
    //! The binary does the same through `exampaper render`

    let workpath = demos_util::demo_dir("basic_exam");
    let (input, output) =
        demos_util::setup_io(workpath.join("input.txt"), workpath.join("output.html")).unwrap();
    let mut output = FmtToIo::new(output);

    // parse; this never fails, problems are reported as warnings instead
    let outcome = exampaper::render(&input);
    let document = outcome.document().expect("Input is not empty");
    for warning in &document.warnings {
        eprintln!("warning: {warning:?}");
    }

    // cover page is filled from the document itself, plus what only the caller knows
    let meta = ExamMeta::collect(document)
        .with_title("Calculus Fundamentals")
        .with_topic("Calculus")
        .with_date("18 October 2026")
        .with_duration("1 hour 30 minutes");

    let style = Style {
        graph_size: 360,
        ..Default::default()
    };
    HtmlExam::new(PrimitiveEngine, style)
        .write_page(&mut output, &meta, &outcome)
        // this part is just for debug purposes
        .map_err(|err| (err, output.get_error()))
        .unwrap();
}
