//! Turns AI-generated exam text into a structured, print-ready exam paper.
//!
//! Language models are not strict encoders of any markup. They merge lines, drop blank lines, forget to close
//! delimiters. So parsing here never fails: anything that is not recognized stays as plain text, and the few
//! problems that are worth reporting come back as [`data::ParseWarning`]s on the document.
//!
//! # Pipeline
//! 1. [`normalize`] line endings and blank line runs
//! 2. [`lex`]: every line is classified ([`classify`]) into a token, multi-line display math is accumulated,
//!    free text fields are split into inline [`segment`]s
//! 3. [`group`]: a question header collects everything up to the next question or section header,
//!    consecutive options become one run
//! 4. [`assemble`]: page-break and keep-together hints are attached, statistics collected
//!
//! [`render`] does all of the above, and [`gen`] writes the result as a standalone html page.
//!
//! Parsed data borrows from the input wherever it can. Anything can be detached from the input with
//! [`ToStaticExt::to_static`].
//!
//! Talking to the text-generation provider is out of this crate's core: [`orchestrator`] only describes
//! how title and exam requests are issued, through the [`provider::TextProvider`] seam.

use std::borrow::Cow;

pub mod config;
pub mod data;
pub mod gen;
pub mod math_engine;
pub mod orchestrator;
pub mod provider;

mod assembler;
mod grammar;
mod grouper;
mod inline;
mod lexer;
/// Small helpers that have nothing to do with exams
mod util;

pub use assembler::assemble;
pub use data::ToStaticExt;
pub use grammar::{classify, LineClass};
pub use grouper::{group, Grouped};
pub use inline::segment;
pub use lexer::{lex, Lexed};
pub use util::{escape_html, normalize, FmtToIo};

use data::{RenderOutcome, RenderedDocument};
use gen::{
    html::{ExamMeta, HtmlExam, Style},
    GenerationError,
};
use math_engine::PrimitiveEngine;

/// Parses already normalized text
pub fn parse(normalized: &str) -> RenderedDocument<'_> {
    let Lexed { blocks, warnings } = lex(normalized);
    assemble(group(blocks), warnings)
}

/// Renders whatever the provider generated.
///
/// Text that is empty or whitespace only is "nothing generated" ([`RenderOutcome::Empty`]), which is not an error.
pub fn render(generated: &str) -> RenderOutcome<'_> {
    if generated.trim().is_empty() {
        return RenderOutcome::Empty;
    }
    let document = match normalize(generated) {
        Cow::Borrowed(normalized) => parse(normalized),
        Cow::Owned(normalized) => parse(&normalized).to_static(),
    };
    RenderOutcome::Document { document }
}

/// Writes a standalone html page with default styling
pub fn gen(
    outcome: &RenderOutcome<'_>,
    meta: &ExamMeta,
    output: impl std::io::Write,
) -> Result<(), GenerationError> {
    let mut output = FmtToIo::new(output);
    HtmlExam::new(PrimitiveEngine, Style::default())
        .write_page(&mut output, meta, outcome)
        .map_err(|err| match (err, output.get_error()) {
            (GenerationError::IOs(_), Some(io)) => GenerationError::Io(io),
            (err, _) => err,
        })
}

pub fn gen_to_string(outcome: &RenderOutcome<'_>, meta: &ExamMeta) -> Result<String, GenerationError> {
    let mut buf = String::new();
    HtmlExam::new(PrimitiveEngine, Style::default()).write_page(&mut buf, meta, outcome)?;
    Ok(buf)
}
