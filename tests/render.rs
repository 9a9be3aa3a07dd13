use std::ffi::OsString;

use exampaper::{
    data::{Block, DocumentStats, Element, GroupItem, ParseWarning, RenderOutcome, Token},
    gen::html::ExamMeta,
};

const CLEAR: &str = "\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n";
const INPUT_DIR: &str = "./tests/input_files";

fn input_files() -> impl Iterator<Item = (OsString, String)> {
    std::fs::read_dir(INPUT_DIR)
        .expect("Should be able to access input directory")
        .map(|file| {
            let file_path = file
                .expect("Should be able to access files in input directory")
                .path();
            let input =
                std::fs::read_to_string(&file_path).expect("Should be able to read input files");
            (
                file_path
                    .file_name()
                    .expect("Files have names")
                    .to_os_string(),
                input,
            )
        })
}

fn input_file(name: &str) -> String {
    std::fs::read_to_string(format!("{INPUT_DIR}/{name}")).expect("Should be able to read input file")
}

/// Prints rendered documents into the stdout, for inspection
#[ignore = "manual"]
#[test]
fn show_render() {
    for (filename, input) in input_files() {
        println!("{}", filename.to_string_lossy());
        println!("{:#?}", exampaper::render(&input));
        std::io::stdin()
            .read_line(&mut String::new())
            .expect("Should be able to read a line");
        println!("{CLEAR}");
    }
}

#[test]
fn every_file_renders() {
    for (filename, input) in input_files() {
        let outcome = exampaper::render(&input);
        let document = outcome
            .document()
            .unwrap_or_else(|| panic!("{filename:?} is not empty"));

        // groups start at question headers, and nothing else has one
        for placed in &document.elements {
            match &placed.element {
                Element::Group { group } => {
                    assert!(group.header.is_question_header(), "{filename:?}");
                    assert!(placed.keep_together, "{filename:?}");
                    assert!(group.blocks().skip(1).all(|block| !block.is_question_header()
                        && !block.is_section_header()));
                }
                Element::Block { block } => {
                    assert!(!block.is_question_header(), "{filename:?}");
                }
            }
        }
        // no leading or trailing spacing
        assert!(!matches!(
            document.elements.first().map(|placed| &placed.element),
            Some(Element::Block {
                block: Block::Spacing
            })
        ));
        assert!(!matches!(
            document.elements.last().map(|placed| &placed.element),
            Some(Element::Block {
                block: Block::Spacing
            })
        ));

        let meta = ExamMeta::collect(document);
        exampaper::gen_to_string(&outcome, &meta)
            .unwrap_or_else(|err| panic!("{filename:?} should generate: {err}"));
    }
}

#[test]
fn full_exam() {
    let input = input_file("full_exam.txt");

    let outcome = exampaper::render(&input);

    let document = outcome.document().expect("Should not be empty");
    assert_eq!(
        document.stats,
        DocumentStats {
            sections: 2,
            questions: 5,
            mcq_questions: 2,
            short_answer_questions: 3,
            total_marks: 15,
        }
    );
    assert!(document.warnings.is_empty());
    assert_eq!(document.elements.len(), 17);
    let breaks: Vec<_> = document
        .elements
        .iter()
        .filter(|placed| placed.page_break_before)
        .map(|placed| &placed.element)
        .collect();
    assert!(matches!(
        breaks.as_slice(),
        [Element::Block { block }] if block.token() == Some(&Token::SectionHeader {
            title: "SECTION B".into(),
            subtitle: Some("Short Answer Questions".into())
        })
    ));

    // deferred stem of question 2
    let groups: Vec<_> = document
        .elements
        .iter()
        .filter_map(|placed| match &placed.element {
            Element::Group { group } => Some(group),
            Element::Block { .. } => None,
        })
        .collect();
    assert_eq!(
        groups[1].header.token(),
        Some(&Token::QuestionHeader {
            number: "2".into(),
            stem: "Which of the following is \\(\\int 2x \\, dx\\)?".into()
        })
    );
    // multi-line display math of question 3
    assert!(groups[2].blocks().any(|block| block.token()
        == Some(&Token::DisplayMath {
            expression: "f(x) = \\frac{x^3 - 1}{x + 2}".into()
        })));
    assert!(groups[4]
        .blocks()
        .any(|block| block.token() == Some(&Token::WorkingPlaceholder { line_count: 8 })));
}

#[test]
fn unclosed_display_math_stays_text() {
    let input = input_file("malformed.txt");

    let outcome = exampaper::render(&input);

    let document = outcome.document().expect("Should not be empty");
    assert_eq!(
        document.warnings,
        vec![ParseWarning::UnterminatedDisplayMath { line: 2 }]
    );
    assert_eq!(document.stats.questions, 1);
    let Element::Group { group } = &document.elements[0].element else {
        panic!("Expected a question group");
    };
    let texts: Vec<_> = group
        .items
        .iter()
        .map(|item| match item {
            GroupItem::Block { block } => block.token().cloned(),
            GroupItem::Options { .. } => None,
        })
        .collect();
    assert_eq!(
        texts,
        vec![
            Some(Token::text("$$")),
            Some(Token::text("x^2 + 2x + 1")),
            Some(Token::text("Question 2: What now?")),
        ]
    );
}

#[test]
fn mcq_only() {
    let input = input_file("mcq_only.txt");

    let outcome = exampaper::render(&input);

    let document = outcome.document().expect("Should not be empty");
    assert_eq!(
        document.stats,
        DocumentStats {
            sections: 1,
            questions: 2,
            mcq_questions: 2,
            short_answer_questions: 0,
            total_marks: 2,
        }
    );
    assert!(document.elements.iter().all(|placed| !placed.page_break_before));
}

#[test]
fn windows_line_endings() {
    let input = input_file("windows_line_endings.txt");

    let outcome = exampaper::render(&input);

    let document = outcome.document().expect("Should not be empty");
    // header, one spacing for the whole blank run, question
    assert_eq!(document.elements.len(), 3);
    assert_eq!(document.stats.total_marks, 6);
    assert_eq!(document.stats.short_answer_questions, 1);
    let Element::Group { group } = &document.elements[2].element else {
        panic!("Expected a question group");
    };
    assert!(group
        .blocks()
        .any(|block| block.token() == Some(&Token::WorkingPlaceholder { line_count: 10 })));
}

#[test]
fn page_from_full_exam() {
    let input = input_file("full_exam.txt");
    let outcome = exampaper::render(&input);
    let meta = ExamMeta::collect(outcome.document().expect("Should not be empty"))
        .with_title("Calculus Fundamentals");

    let page = exampaper::gen_to_string(&outcome, &meta).expect("Should generate");

    assert_eq!(page.matches("<section class=\"question").count(), 5);
    assert_eq!(page.matches("class=\"option\"").count(), 8);
    assert_eq!(page.matches("<figure class=\"graph\"").count(), 1);
    assert!(page.contains("aria-label=\"6 working lines\""));
    assert!(page.contains("aria-label=\"8 working lines\""));
    assert!(page.contains("<th>Pass Mark:</th><td>8</td>"));
    assert!(page.contains("<div class=\"page-break-before\">\n<h2 class=\"section-header\">SECTION B"));
}

#[test]
fn nothing_generated() {
    let outcome = exampaper::render("\n\n   \n");

    assert_eq!(outcome, RenderOutcome::Empty);
    let page = exampaper::gen_to_string(&outcome, &ExamMeta::default()).expect("Should generate");
    assert!(page.contains("No exam content was generated."));
}

#[cfg(feature = "serde")]
#[test]
fn json_tree() {
    let input = input_file("mcq_only.txt");
    let outcome = exampaper::render(&input);

    let json = serde_json::to_value(&outcome).expect("Should serialize");

    assert_eq!(json["outcome"], "document");
    assert_eq!(json["document"]["stats"]["questions"], 2);
}
