//! Print-ready html output.
//!
//! Math is left for the [`MathEngine`] to deal with, and page hints become css classes:
//! `page-break-before` and `avoid-break`.

mod context;
mod meta;
mod style;

pub use context::Context;
pub use meta::ExamMeta;
pub use style::Style;

use std::fmt::Write;

use crate::{
    data::{
        marks_label, Block, Element, GroupItem, Placed, QuestionGroup, RenderOutcome, Segment, Token,
        MAX_WORKING_LINES,
    },
    math_engine::{MathEngine, MathMode},
    util::escape_html,
};

use super::{GenerationError, OutputGenerator, Res};

// graph paper is drawn in this many viewBox units, whatever its rendered size is
const GRAPH_VIEW: u32 = 600;

#[derive(Debug, Clone)]
pub struct HtmlExam<ME> {
    math: ME,
    style: Style,
}

impl<ME: MathEngine> HtmlExam<ME> {
    pub fn new(math: ME, style: Style) -> Self {
        Self { math, style }
    }

    pub fn style(&self) -> &Style {
        &self.style
    }

    fn write_math<W: Write + ?Sized>(&self, output: &mut W, expression: &str, mode: MathMode) -> Res {
        self.math
            .render(output, expression, mode)
            .map_err(|err| GenerationError::Math(Box::new(err)))
    }

    fn write_graph<W: Write + ?Sized>(&self, output: &mut W) -> Res {
        let size = self.style.graph_size;
        let mid = GRAPH_VIEW / 2;
        write!(
            output,
            "<figure class=\"graph\"><figcaption>Graph Paper</figcaption>\
            <svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{size}\" height=\"{size}\" viewBox=\"0 0 {GRAPH_VIEW} {GRAPH_VIEW}\">"
        )?;
        for offset in (0..GRAPH_VIEW).step_by(self.style.graph_grid.max(1) as usize) {
            write!(
                output,
                "<line class=\"grid\" x1=\"{offset}\" y1=\"0\" x2=\"{offset}\" y2=\"{GRAPH_VIEW}\"/>\
                <line class=\"grid\" x1=\"0\" y1=\"{offset}\" x2=\"{GRAPH_VIEW}\" y2=\"{offset}\"/>"
            )?;
        }
        write!(
            output,
            "<line class=\"axis\" x1=\"0\" y1=\"{mid}\" x2=\"{GRAPH_VIEW}\" y2=\"{mid}\"/>\
            <line class=\"axis\" x1=\"{mid}\" y1=\"0\" x2=\"{mid}\" y2=\"{GRAPH_VIEW}\"/>\
            <rect class=\"frame\" x=\"0\" y=\"0\" width=\"{GRAPH_VIEW}\" height=\"{GRAPH_VIEW}\"/>\
            <text x=\"{y_label}\" y=\"15\">y</text><text x=\"{x_label}\" y=\"{x_label_y}\">x</text>\
            </svg></figure>\n",
            y_label = mid + 5,
            x_label = GRAPH_VIEW - 15,
            x_label_y = mid - 5,
        )?;
        Ok(())
    }

    /// Tokens may be built by hand, so the count is clamped here as well as in the grammar
    fn write_working<W: Write + ?Sized>(&self, output: &mut W, lines: u32) -> Res {
        let lines = lines.min(MAX_WORKING_LINES);
        let spacing = self.style.working_line_spacing;
        let padding = spacing / 2;
        let height = padding
            .saturating_mul(2)
            .saturating_add(lines.saturating_sub(1).saturating_mul(spacing));
        write!(
            output,
            "<svg class=\"working\" xmlns=\"http://www.w3.org/2000/svg\" width=\"100%\" height=\"{height}\" \
            viewBox=\"0 0 100 {height}\" preserveAspectRatio=\"none\" role=\"img\" aria-label=\"{lines} working lines\">"
        )?;
        for line in 0..lines {
            let y = padding.saturating_add(line.saturating_mul(spacing));
            write!(output, "<line x1=\"0\" y1=\"{y}\" x2=\"100\" y2=\"{y}\"/>")?;
        }
        output.write_str("</svg>\n")?;
        Ok(())
    }

    fn write_placeholder<W: Write + ?Sized>(&self, output: &mut W, token: &Token<'_>) -> Res {
        match token {
            Token::GraphPlaceholder => self.write_graph(output),
            Token::WorkingPlaceholder { line_count } => self.write_working(output, *line_count),
            Token::AnswerBoxPlaceholder => {
                output.write_str(
                    "<div class=\"answer-box\"><span class=\"answer-label\">Answer</span></div>\n",
                )?;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Writes a text field. Segments are preferred, the raw field is only used when there are none
    fn write_text<W: Write + ?Sized>(&self, output: &mut W, field: &str, segments: &[Segment<'_>]) -> Res {
        if segments.is_empty() {
            output.write_str(&escape_html(field))?;
            return Ok(());
        }
        for segment in segments {
            match &segment.token {
                Token::PlainText { text } => output.write_str(&escape_html(text))?,
                Token::InlineMath { expression } => {
                    self.write_math(output, expression, MathMode::Inline)?
                }
                Token::DisplayMath { expression } => {
                    self.write_math(output, expression, MathMode::Display)?
                }
                token if token.is_placeholder() => self.write_placeholder(output, token)?,
                _ => output.write_str(&escape_html(&segment.source))?,
            }
        }
        Ok(())
    }

    fn write_block<W: Write + ?Sized>(&self, output: &mut W, context: &mut Context, block: &Block<'_>) -> Res {
        let Block::Token {
            token, segments, ..
        } = block
        else {
            output.write_str("<div class=\"spacing\"></div>\n")?;
            return Ok(());
        };
        match token {
            Token::SectionHeader { title, subtitle } => {
                write!(output, "<h2 class=\"section-header\">{}", escape_html(title))?;
                if let Some(subtitle) = subtitle {
                    output.write_str(": <span class=\"section-subtitle\">")?;
                    self.write_text(output, subtitle, segments)?;
                    output.write_str("</span>")?;
                }
                output.write_str("</h2>\n")?;
            }
            // stems may carry placeholders and display math, which can't live inside of `<h3>`
            Token::QuestionHeader { number, stem } => {
                let id = escape_html(&context.question_id(number)).into_owned();
                write!(
                    output,
                    "<div class=\"question-header\" role=\"heading\" aria-level=\"3\" id=\"{id}\"><span class=\"question-number\">Question {}:</span> ",
                    escape_html(number)
                )?;
                self.write_text(output, stem, segments)?;
                output.write_str("</div>\n")?;
            }
            Token::McqOption { letter, text } => {
                write!(output, "<div class=\"option\"><span class=\"option-letter\">{letter}.</span> ")?;
                self.write_text(output, text, segments)?;
                output.write_str("</div>\n")?;
            }
            Token::MarksAnnotation { count } => {
                let class = if context.inside_group {
                    "marks"
                } else {
                    "marks standalone"
                };
                writeln!(output, "<div class=\"{class}\">{}</div>", marks_label(*count))?;
            }
            Token::DisplayMath { expression } => {
                self.write_math(output, expression, MathMode::Display)?;
                output.write_char('\n')?;
            }
            Token::InlineMath { expression } => {
                self.write_math(output, expression, MathMode::Inline)?;
                output.write_char('\n')?;
            }
            Token::GraphPlaceholder | Token::WorkingPlaceholder { .. } | Token::AnswerBoxPlaceholder => {
                self.write_placeholder(output, token)?;
            }
            Token::PlainText { text } => {
                output.write_str("<div class=\"text\">")?;
                self.write_text(output, text, segments)?;
                output.write_str("</div>\n")?;
            }
            Token::MarkdownHeading { level, text } => {
                let level = (*level).clamp(1, 6);
                write!(output, "<h{level} class=\"heading\">")?;
                self.write_text(output, text, segments)?;
                writeln!(output, "</h{level}>")?;
            }
            Token::InstructionNote { kind, text } => {
                write!(output, "<div class=\"note\"><strong>{}:</strong> ", escape_html(kind))?;
                self.write_text(output, text, segments)?;
                output.write_str("</div>\n")?;
            }
        }
        Ok(())
    }

    fn write_group<W: Write + ?Sized>(&self, output: &mut W, context: &mut Context, group: &QuestionGroup<'_>) -> Res {
        context.inside_group = true;
        self.write_block(output, context, &group.header)?;
        for item in &group.items {
            match item {
                GroupItem::Block { block } => self.write_block(output, context, block)?,
                GroupItem::Options { blocks } => {
                    output.write_str("<div class=\"options\">\n")?;
                    for block in blocks {
                        self.write_block(output, context, block)?;
                    }
                    output.write_str("</div>\n")?;
                }
            }
        }
        context.inside_group = false;
        Ok(())
    }

    fn write_cover<W: Write + ?Sized>(&self, output: &mut W, meta: &ExamMeta) -> Res {
        let title = escape_html(&meta.title);
        let topic = escape_html(meta.topic.as_deref().unwrap_or(""));
        let date = escape_html(meta.date.as_deref().unwrap_or(""));
        let duration = escape_html(&meta.duration);
        write!(
            output,
            "<section class=\"cover page-break-after avoid-break\">\n\
            <div class=\"cover-title\"><h2>EXAMINATION</h2><h3>{title}</h3></div>\n\
            <table class=\"cover-details\">\n\
            <tr><th>Subject:</th><td>{topic}</td><th>Multiple Choice:</th><td>{mcq} questions</td></tr>\n\
            <tr><th>Date:</th><td>{date}</td><th>Short Answer:</th><td>{short} questions</td></tr>\n\
            <tr><th>Duration:</th><td>{duration}</td><th>Total Marks:</th><td><strong>{total}</strong></td></tr>\n\
            <tr><th>Total Questions:</th><td>{questions}</td><th>Pass Mark:</th><td>{pass}</td></tr>\n\
            </table>\n",
            mcq = meta.mcq_questions,
            short = meta.short_answer_questions,
            total = meta.total_marks,
            questions = meta.total_questions(),
            pass = meta.pass_mark(),
        )?;
        output.write_str("<div class=\"candidate avoid-break\"><h3>CANDIDATE INFORMATION</h3>\n")?;
        for field in ["Name", "Student ID", "Signature"] {
            writeln!(output, "<div class=\"candidate-line\"><span>{field}:</span><div></div></div>")?;
        }
        output.write_str(
            "</div>\n<div class=\"instructions avoid-break\"><h3>INSTRUCTIONS TO CANDIDATES</h3>\n<ol>\n",
        )?;
        for instruction in meta.instructions() {
            writeln!(output, "<li>{}</li>", escape_html(&instruction))?;
        }
        output.write_str("</ol>\n</div>\n</section>\n")?;
        Ok(())
    }

    /// Writes a complete html page: cover, the document itself and a print footer
    pub fn write_page<W: Write + ?Sized>(&self, output: &mut W, meta: &ExamMeta, outcome: &RenderOutcome<'_>) -> Res {
        let title = escape_html(&meta.title);
        let katex = escape_html(&self.style.katex_url);
        write!(
            output,
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n\
            <link rel=\"stylesheet\" href=\"{katex}/katex.min.css\">\n\
            <script defer src=\"{katex}/katex.min.js\"></script>\n\
            <script defer src=\"{katex}/contrib/auto-render.min.js\" onload=\"renderMathInElement(document.body)\"></script>\n\
            <style>\n{css}</style>\n</head>\n<body>\n",
            css = self.style.css(),
        )?;
        if self.style.cover_page {
            self.write_cover(output, meta)?;
        }
        output.write_str("<main class=\"exam\">\n")?;
        match outcome {
            RenderOutcome::Empty => {
                output.write_str("<p class=\"empty\">No exam content was generated.</p>\n")?;
            }
            RenderOutcome::Document { document } => {
                self.write_document_to(output, meta, &mut Context::default(), document)?;
            }
        }
        write!(
            output,
            "</main>\n<footer class=\"print-footer\"><span>{title}</span><span class=\"page-number\"></span><span>Turn over</span></footer>\n</body>\n</html>\n"
        )?;
        Ok(())
    }
}

impl<'source, ME: MathEngine> OutputGenerator<'source, ExamMeta, Context> for HtmlExam<ME> {
    fn write_to<'meta, 'context, 'element, W: Write + ?Sized>(
        &self,
        output: &mut W,
        _meta: &'meta ExamMeta,
        context: &'context mut Context,
        placed: &'element Placed<'source>,
    ) -> Res
    where
        'source: 'meta + 'context + 'element,
    {
        let mut classes = Vec::with_capacity(3);
        if placed.page_break_before {
            classes.push("page-break-before");
        }
        if placed.keep_together {
            classes.push("avoid-break");
        }
        match &placed.element {
            Element::Block { block } if classes.is_empty() => self.write_block(output, context, block),
            Element::Block { block } => {
                writeln!(output, "<div class=\"{}\">", classes.join(" "))?;
                self.write_block(output, context, block)?;
                output.write_str("</div>\n")?;
                Ok(())
            }
            Element::Group { group } => {
                classes.insert(0, "question");
                writeln!(output, "<section class=\"{}\">", classes.join(" "))?;
                self.write_group(output, context, group)?;
                output.write_str("</section>\n")?;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{data::OptionLetter, math_engine::PrimitiveEngine};

    macro_rules! html_sim {
        ($a:expr, $b:expr) => {
            let real = $a
                .chars()
                .filter(|c| !c.is_ascii_whitespace())
                .collect::<String>();
            let expected = $b
                .chars()
                .filter(|c| !c.is_ascii_whitespace())
                .collect::<String>();

            text_diff::assert_diff(real.as_str(), expected.as_str(), "", 0);
        };
    }

    macro_rules! test {
        {$name:ident, $placed:expr, $b:expr} => {
            #[test]
            fn $name() {
                // arrange
                let placed = $placed;
                let generator = HtmlExam::new(PrimitiveEngine, Style::default());
                let mut output_target = String::new();

                // act
                generator
                    .write_to(&mut output_target, &ExamMeta::default(), &mut Context::default(), &placed)
                    .expect("Should be able to write");

                // assert
                html_sim!(output_target, $b);
            }
        };
    }

    fn block(token: Token<'static>, segments: Vec<Segment<'static>>) -> Block<'static> {
        Block::Token {
            token,
            segments,
            line: 1,
        }
    }

    fn bare(block: Block<'static>) -> Placed<'static> {
        Placed {
            element: Element::Block { block },
            page_break_before: false,
            keep_together: false,
        }
    }

    fn seg(token: Token<'static>, source: &'static str) -> Segment<'static> {
        Segment {
            source: source.into(),
            token,
        }
    }

    test! {plain_text, bare(block(Token::text("a < b"), Vec::new())), "<div class=\"text\">a &lt; b</div>"}
    test! {segmented_text, bare(block(Token::text("Solve $x$"), vec![
        seg(Token::text("Solve "), "Solve "),
        seg(Token::InlineMath { expression: "x".into() }, "$x$"),
    ])), "<div class=\"text\">Solve <span class=\"math inline\">\\(x\\)</span></div>"}
    test! {marks_standalone, bare(block(Token::MarksAnnotation { count: 1 }, Vec::new())), "<div class=\"marks standalone\">[1 mark]</div>"}
    test! {section_page_break, Placed {
        element: Element::Block { block: block(Token::SectionHeader { title: "Section B".into(), subtitle: Some("Short".into()) }, vec![seg(Token::text("Short"), "Short")]) },
        page_break_before: true,
        keep_together: false,
    }, "<div class=\"page-break-before\"><h2 class=\"section-header\">Section B: <span class=\"section-subtitle\">Short</span></h2></div>"}
    test! {display_math_kept_together, Placed {
        element: Element::Block { block: block(Token::DisplayMath { expression: "a+b".into() }, Vec::new()) },
        page_break_before: false,
        keep_together: true,
    }, "<div class=\"avoid-break\"><div class=\"math display\">\\[a+b\\]</div></div>"}
    test! {note, bare(block(Token::InstructionNote { kind: "Note".into(), text: "be quick".into() }, Vec::new())), "<div class=\"note\"><strong>Note:</strong> be quick</div>"}
    test! {heading, bare(block(Token::MarkdownHeading { level: 2, text: "Part".into() }, Vec::new())), "<h2 class=\"heading\">Part</h2>"}
    test! {working, bare(block(Token::WorkingPlaceholder { line_count: 2 }, Vec::new())),
        "<svg class=\"working\" xmlns=\"http://www.w3.org/2000/svg\" width=\"100%\" height=\"60\" viewBox=\"0 0 100 60\" preserveAspectRatio=\"none\" role=\"img\" aria-label=\"2 working lines\">\
        <line x1=\"0\" y1=\"15\" x2=\"100\" y2=\"15\"/><line x1=\"0\" y1=\"45\" x2=\"100\" y2=\"45\"/></svg>"}
    test! {answer_box, bare(block(Token::AnswerBoxPlaceholder, Vec::new())), "<div class=\"answer-box\"><span class=\"answer-label\">Answer</span></div>"}
    test! {group, Placed {
        element: Element::Group { group: QuestionGroup {
            header: block(Token::QuestionHeader { number: "1".into(), stem: "Pick".into() }, Vec::new()),
            items: vec![
                GroupItem::Options { blocks: vec![
                    block(Token::McqOption { letter: OptionLetter::A, text: "0".into() }, Vec::new()),
                    block(Token::McqOption { letter: OptionLetter::B, text: "1".into() }, Vec::new()),
                ] },
                GroupItem::Block { block: block(Token::MarksAnnotation { count: 2 }, Vec::new()) },
            ],
        } },
        page_break_before: false,
        keep_together: true,
    }, "<section class=\"question avoid-break\">\
        <div class=\"question-header\" role=\"heading\" aria-level=\"3\" id=\"question-1\"><span class=\"question-number\">Question 1:</span> Pick</div>\
        <div class=\"options\">\
        <div class=\"option\"><span class=\"option-letter\">A.</span> 0</div>\
        <div class=\"option\"><span class=\"option-letter\">B.</span> 1</div>\
        </div>\
        <div class=\"marks\">[2 marks]</div>\
        </section>"}

    #[test]
    fn graph_paper() {
        let generator = HtmlExam::new(PrimitiveEngine, Style::default());
        let mut output = String::new();
        generator
            .write_graph(&mut output)
            .expect("Should be able to write");
        // 30 cells each way, a vertical and a horizontal line per cell
        assert_eq!(output.matches("class=\"grid\"").count(), 60);
        assert_eq!(output.matches("class=\"axis\"").count(), 2);
        assert!(output.contains("width=\"400\" height=\"400\" viewBox=\"0 0 600 600\""));
        assert!(output.contains(">y</text>") && output.contains(">x</text>"));
    }

    #[test]
    fn working_lines_are_bounded() {
        // arrange
        let generator = HtmlExam::new(
            PrimitiveEngine,
            Style {
                working_line_spacing: u32::MAX,
                ..Default::default()
            },
        );
        let mut output = String::new();

        // act
        generator
            .write_working(&mut output, u32::MAX)
            .expect("Should be able to write");

        // assert
        assert_eq!(output.matches("<line ").count(), MAX_WORKING_LINES as usize);
        assert!(output.contains(&format!("height=\"{}\"", u32::MAX)));
    }

    #[test]
    fn generated_working_count_is_bounded() {
        let outcome = crate::render("Question 1: Show working\n{working(4000000000)}\n[2 marks]");

        let page = crate::gen_to_string(&outcome, &ExamMeta::default()).expect("Should generate");

        assert!(page.contains("aria-label=\"100 working lines\""));
        assert_eq!(page.matches("<line x1=\"0\"").count(), 100);
        assert!(page.len() < 100_000);
    }

    #[test]
    fn placeholder_in_stem_is_not_inside_heading() {
        let outcome = crate::render("Question 1: Sketch the curve {graph}");

        let page = crate::gen_to_string(&outcome, &ExamMeta::default()).expect("Should generate");

        assert!(!page.contains("<h3 class=\"question-header\""));
        html_sim!(
            page.split("<main class=\"exam\">").nth(1).expect("Page has a main part").split("</main>").next().expect("Main is closed"),
            format!(
                "<section class=\"question avoid-break\">\
                <div class=\"question-header\" role=\"heading\" aria-level=\"3\" id=\"question-1\"><span class=\"question-number\">Question 1:</span> Sketch the curve {}</div>\
                </section>",
                {
                    let mut graph = String::new();
                    HtmlExam::new(PrimitiveEngine, Style::default())
                        .write_graph(&mut graph)
                        .expect("Should be able to write");
                    graph
                }
            )
        );
    }

    #[test]
    fn empty_outcome_page() {
        let generator = HtmlExam::new(
            PrimitiveEngine,
            Style {
                cover_page: false,
                ..Default::default()
            },
        );
        let mut output = String::new();
        generator
            .write_page(&mut output, &ExamMeta::default(), &RenderOutcome::Empty)
            .expect("Should be able to write");
        assert!(output.contains("No exam content was generated."));
        assert!(!output.contains("CANDIDATE INFORMATION"));
        assert!(output.contains("<span>Examination</span>"));
    }

    #[test]
    fn cover_page() {
        let generator = HtmlExam::new(PrimitiveEngine, Style::default());
        let meta = ExamMeta {
            mcq_questions: 4,
            short_answer_questions: 1,
            total_marks: 13,
            ..Default::default()
        }
        .with_title("Algebra <Basics>")
        .with_topic("Algebra");
        let mut output = String::new();
        generator
            .write_page(&mut output, &meta, &RenderOutcome::Empty)
            .expect("Should be able to write");
        assert!(output.contains("<h3>Algebra &lt;Basics&gt;</h3>"));
        assert!(output.contains("<td>Algebra</td>"));
        assert!(output.contains("<td><strong>13</strong></td>"));
        assert!(output.contains("<th>Pass Mark:</th><td>7</td>"));
        assert!(output.contains("<td>2 hours</td>"));
        assert_eq!(output.matches("<li>").count(), 10);
    }
}
